//! An interactive `indicatif` progress bar, driven by the library's [`ProgressSink`] events.

use indicatif::{ProgressBar, ProgressStyle};
use qspace::dispatcher::{ProgressEvent, ProgressSink};
use std::sync::Mutex;

/// Renders dispatcher events to a terminal progress bar; grows its length on
/// [`ProgressEvent::AllDispatched`] and advances one tick per finished or skipped scan.
pub struct IndicatifProgressSink {
    bar: Mutex<ProgressBar>,
}

impl IndicatifProgressSink {
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self {
            bar: Mutex::new(bar),
        }
    }
}

impl Default for IndicatifProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for IndicatifProgressSink {
    fn report(&self, event: ProgressEvent) {
        let bar = self.bar.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match event {
            ProgressEvent::AllDispatched { total } => {
                bar.set_length(total as u64);
            }
            ProgressEvent::Started { scan_id } => {
                bar.set_message(scan_id);
            }
            ProgressEvent::Finished { .. } => {
                bar.inc(1);
            }
            ProgressEvent::Skipped { scan_id, reason } => {
                bar.println(format!("skipped {scan_id}: {reason}"));
                bar.inc(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_full_run_without_panicking() {
        let sink = IndicatifProgressSink::new();
        sink.report(ProgressEvent::AllDispatched { total: 2 });
        sink.report(ProgressEvent::Started {
            scan_id: "a".to_owned(),
        });
        sink.report(ProgressEvent::Finished {
            scan_id: "a".to_owned(),
        });
        sink.report(ProgressEvent::Skipped {
            scan_id: "b".to_owned(),
            reason: "bad row".to_owned(),
        });
    }
}
