//! Progress reporting: the library stays UI-free and only emits typed events through a sink; the
//! CLI is the one place that attaches a visible progress bar.

/// Events the local and cluster dispatchers emit as a run proceeds. Each variant is deliberately
/// plain data (no formatting) so a sink can render it however it likes, or ignore it.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// A scan/job started.
    Started { scan_id: String },
    /// A scan/job finished successfully.
    Finished { scan_id: String },
    /// A scan/job failed and was skipped; the run continues.
    Skipped { scan_id: String, reason: String },
    /// All scans/jobs have been dispatched; `total` is how many were started.
    AllDispatched { total: usize },
}

/// A destination for [`ProgressEvent`]s. The default (no-op) implementation on `()` lets callers
/// that don't care about progress pass it without writing a stub type.
pub trait ProgressSink: Send + Sync {
    /// Records one event.
    fn report(&self, event: ProgressEvent);
}

impl ProgressSink for () {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards every event to `tracing`, at a level appropriate to the event kind. This is the
/// ambient default for non-interactive runs (cron jobs, cluster workers); the CLI's interactive
/// progress bar is a separate sink built on top of `indicatif`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { scan_id } => {
                tracing::debug!(scan_id = %scan_id, "scan started");
            }
            ProgressEvent::Finished { scan_id } => {
                tracing::debug!(scan_id = %scan_id, "scan finished");
            }
            ProgressEvent::Skipped { scan_id, reason } => {
                tracing::warn!(scan_id = %scan_id, reason = %reason, "scan skipped");
            }
            ProgressEvent::AllDispatched { total } => {
                tracing::info!(total, "all scans dispatched");
            }
        }
    }
}
