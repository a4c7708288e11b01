//! Local-mode dispatch: a `rayon` worker pool over scans, folding partial spaces into a single
//! accumulator that never exceeds the memory of one full-range `Space`.

use crate::axis::Axis;
use crate::dispatcher::backend::InputBackend;
use crate::dispatcher::progress::{ProgressEvent, ProgressSink};
use crate::dispatcher::projection::Projection;
use crate::error::Result;
use crate::space::Space;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

/// Runs every scan in `backend` through `projection` and the aggregation kernel, in parallel
/// across `workers` threads, and folds the results into one `Space` over `target_axes`.
///
/// A scan whose load or aggregation fails is logged via `progress` and contributes nothing; it
/// never aborts the run (per the dispatcher's failure semantics). Returns `Ok(None)` only if every
/// single scan failed or `backend` had none to begin with.
///
/// # Errors
///
/// Returns an error only for a `rayon` thread-pool construction failure; per-scan errors are
/// reported through `progress` and do not propagate.
pub fn run_local(
    target_axes: Vec<Axis>,
    backend: &dyn InputBackend,
    projection: &dyn Projection,
    progress: &dyn ProgressSink,
    workers: usize,
) -> Result<Option<Space>> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| crate::error::Error::Other(e.into()))?;

    let scan_ids = backend.scan_ids();
    progress.report(ProgressEvent::AllDispatched {
        total: scan_ids.len(),
    });

    let partials: Vec<Space> = pool.install(|| {
        scan_ids
            .into_par_iter()
            .filter_map(|scan_id| {
                progress.report(ProgressEvent::Started {
                    scan_id: scan_id.clone(),
                });
                match process_scan(&target_axes, backend, projection, &scan_id) {
                    Ok(space) => {
                        progress.report(ProgressEvent::Finished {
                            scan_id: scan_id.clone(),
                        });
                        Some(space)
                    }
                    Err(e) => {
                        progress.report(ProgressEvent::Skipped {
                            scan_id: scan_id.clone(),
                            reason: e.to_string(),
                        });
                        None
                    }
                }
            })
            .collect()
    });

    Ok(fold_partials(partials))
}

fn process_scan(
    target_axes: &[Axis],
    backend: &dyn InputBackend,
    projection: &dyn Projection,
    scan_id: &str,
) -> Result<Space> {
    let job = backend.load(scan_id)?;
    let projected = projection.project(&job.coordinates);
    let coord_refs: Vec<&[f64]> = projected.iter().map(Vec::as_slice).collect();

    let mut space = Space::new(target_axes.to_vec())?;
    space.process_image(&coord_refs, &job.intensity)?;
    Ok(space)
}

/// Folds any number of partial spaces into one, treating "no partials yet" as the additive
/// identity (`empty + A == A`, invariant 1) rather than allocating a zeroed `Space` up front —
/// there may be no target axes known until the first partial arrives.
fn fold_partials(partials: Vec<Space>) -> Option<Space> {
    partials.into_iter().fold(None, |acc, next| match acc {
        None => Some(next),
        Some(mut acc) => {
            acc.merge(&next).expect("all partials share target_axes");
            Some(acc)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::backend::ImageJob;
    use std::sync::Mutex;

    struct FixedBackend {
        jobs: Vec<(String, ImageJob)>,
    }

    impl InputBackend for FixedBackend {
        fn scan_ids(&self) -> Vec<String> {
            self.jobs.iter().map(|(id, _)| id.clone()).collect()
        }

        fn load(&self, scan_id: &str) -> Result<ImageJob> {
            self.jobs
                .iter()
                .find(|(id, _)| id == scan_id)
                .map(|(_, job)| job.clone())
                .ok_or_else(|| crate::error::Error::FormatError("no such scan".to_owned()))
        }
    }

    fn axis(label: &str, min: f64, max: f64, res: f64) -> Axis {
        Axis::new(label, min, max, res).unwrap()
    }

    #[test]
    fn merges_every_scan_into_one_space() {
        let backend = FixedBackend {
            jobs: vec![
                (
                    "1".to_owned(),
                    ImageJob {
                        scan_id: "1".to_owned(),
                        coordinates: vec![vec![0.0, 0.5]],
                        intensity: vec![1.0, 2.0],
                    },
                ),
                (
                    "2".to_owned(),
                    ImageJob {
                        scan_id: "2".to_owned(),
                        coordinates: vec![vec![0.5, 1.0]],
                        intensity: vec![3.0, 4.0],
                    },
                ),
            ],
        };

        let result = run_local(
            vec![axis("q", 0.0, 1.0, 0.5)],
            &backend,
            &crate::dispatcher::projection::IdentityProjection,
            &(),
            1,
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            result.photons().iter().copied().collect::<Vec<_>>(),
            vec![1.0, 5.0, 4.0]
        );
    }

    #[test]
    fn a_failing_scan_is_skipped_not_fatal() {
        struct FailBackend;
        impl InputBackend for FailBackend {
            fn scan_ids(&self) -> Vec<String> {
                vec!["bad".to_owned()]
            }
            fn load(&self, scan_id: &str) -> Result<ImageJob> {
                Err(crate::error::Error::FormatError(format!("{scan_id} is unreadable")))
            }
        }

        let reported = Mutex::new(Vec::new());
        struct RecordingSink<'a>(&'a Mutex<Vec<String>>);
        impl ProgressSink for RecordingSink<'_> {
            fn report(&self, event: ProgressEvent) {
                if let ProgressEvent::Skipped { scan_id, .. } = event {
                    self.0.lock().unwrap().push(scan_id);
                }
            }
        }

        let result = run_local(
            vec![axis("q", 0.0, 1.0, 0.5)],
            &FailBackend,
            &crate::dispatcher::projection::IdentityProjection,
            &RecordingSink(&reported),
            1,
        )
        .unwrap();

        assert!(result.is_none());
        assert_eq!(reported.lock().unwrap().as_slice(), &["bad".to_owned()]);
    }
}
