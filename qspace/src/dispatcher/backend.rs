//! Input backends: the source of raw per-scan image jobs the local and cluster dispatchers feed
//! through a [`crate::dispatcher::projection::Projection`] and the aggregation kernel.

use crate::error::Result;

/// One scan's worth of raw detector frames: per-pixel pre-projection coordinates (whatever the
/// input backend natively produces — detector angles, motor positions, pixel indices) and the
/// matching intensity values, already flattened to equal-length parallel arrays.
#[derive(Clone, Debug)]
pub struct ImageJob {
    /// An opaque, backend-defined scan identifier, used only for logging and output naming.
    pub scan_id: String,
    /// One array per raw coordinate dimension, each the same length as `intensity`.
    pub coordinates: Vec<Vec<f64>>,
    /// The per-sample intensity/weight values.
    pub intensity: Vec<f64>,
}

/// A source of [`ImageJob`]s, one per scan. Implementations own whatever I/O is needed to read
/// frames (an HDF5 file, a spec file, a directory of images); the dispatcher only ever sees the
/// [`ImageJob`] contract.
pub trait InputBackend: Send + Sync {
    /// The scan identifiers this backend will produce jobs for, in order.
    fn scan_ids(&self) -> Vec<String>;

    /// Reads one scan's image job.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan cannot be read; per the dispatcher's failure semantics, this
    /// is caught by the caller and logged rather than propagated.
    fn load(&self, scan_id: &str) -> Result<ImageJob>;
}

/// A backend with no scans, useful as a default/placeholder and in tests that exercise the
/// dispatcher plumbing without real input data.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBackend;

impl InputBackend for NullBackend {
    fn scan_ids(&self) -> Vec<String> {
        Vec::new()
    }

    fn load(&self, scan_id: &str) -> Result<ImageJob> {
        Err(crate::error::Error::FormatError(format!(
            "NullBackend has no scan {scan_id:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_backend_has_no_scans() {
        assert!(NullBackend.scan_ids().is_empty());
        assert!(NullBackend.load("1").is_err());
    }
}
