//! Coordinate transform: re-projects a space's bin-center grid through a user function onto a
//! freshly-built target space.

use crate::axis::Axis;
use crate::error::{Error, Result};
use crate::space::Space;
use itertools::Itertools;

/// One axis of a transform's target: its label and bin resolution. Bounds are derived from the
/// transformed coordinates themselves, not supplied up front.
#[derive(Clone, Debug)]
pub struct TransformAxis {
    /// The new axis's label.
    pub label: String,
    /// The new axis's bin resolution.
    pub res: f64,
}

impl Space {
    /// Builds a new space by evaluating `project` at every bin-center of `self` and re-aggregating
    /// `photons`/`contributions` onto the axes described by `targets`.
    ///
    /// `project` receives one old-axis coordinate tuple (in the order of [`Space::axes`]) per call
    /// and must return exactly `targets.len()` new coordinates, in the order of `targets`.
    ///
    /// The transform is lossy in both directions: several source bins can land in one target bin
    /// (their `photons`/`contributions` are summed, not averaged, matching
    /// [`Space::process_image`]), and a target resolution finer than the source's leaves some
    /// target bins empty. It never fabricates data for bins no source point reaches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionError`] if `targets` is empty or `project` returns the wrong
    /// number of coordinates for any grid point.
    pub fn transform<F>(&self, targets: &[TransformAxis], project: F) -> Result<Self>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        if targets.is_empty() {
            return Err(Error::DimensionError(
                "a transform must produce at least one axis".to_owned(),
            ));
        }

        let ranges: Vec<std::ops::Range<usize>> = self.shape().iter().map(|&n| 0..n).collect();
        let mut new_coords: Vec<Vec<f64>> = vec![Vec::with_capacity(self.len()); targets.len()];
        let mut source_photons = Vec::with_capacity(self.len());
        let mut source_contributions = Vec::with_capacity(self.len());

        for indices in ranges.into_iter().multi_cartesian_product() {
            let point: Vec<f64> = indices
                .iter()
                .zip(&self.axes)
                .map(|(&i, axis)| axis.coord(i))
                .collect();
            let projected = project(&point);
            if projected.len() != targets.len() {
                return Err(Error::DimensionError(format!(
                    "transform function returned {} coordinates, expected {}",
                    projected.len(),
                    targets.len()
                )));
            }
            for (slot, value) in new_coords.iter_mut().zip(&projected) {
                slot.push(*value);
            }
            let (photon, contribution) = self.bin(&indices)?;
            source_photons.push(photon);
            source_contributions.push(f64::from(contribution));
        }

        let new_axes = targets
            .iter()
            .zip(&new_coords)
            .map(|(target, coords)| {
                let min = coords.iter().copied().fold(f64::INFINITY, f64::min);
                let max = coords.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                Axis::new(target.label.clone(), min, max, target.res)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut target_space = Self::new(new_axes)?;
        let coord_refs: Vec<&[f64]> = new_coords.iter().map(Vec::as_slice).collect();

        // A paired accumulation: every source bin contributes its own photons and its own
        // contribution count to whichever target bin its projected coordinates land in. Weighting
        // `process_image` by `source_contributions` (rather than letting it count samples) is what
        // makes an all-empty source bin (contribution 0) leave the target bin untouched.
        target_space.process_image(&coord_refs, &source_photons)?;
        let mut contribution_shadow = Self::new(target_space.axes.clone())?;
        contribution_shadow.process_image(&coord_refs, &source_contributions)?;
        target_space.contributions = contribution_shadow
            .photons
            .mapv(|v| v.round().max(0.0) as u32);

        Ok(target_space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;

    fn axis(label: &str, min: f64, max: f64, res: f64) -> Axis {
        Axis::new(label, min, max, res).unwrap()
    }

    #[test]
    fn identity_like_transform_preserves_totals() {
        let mut space = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        space.photons[[0]] = 1.0;
        space.photons[[1]] = 2.0;
        space.photons[[2]] = 3.0;
        space.contributions.fill(1);

        let targets = vec![TransformAxis {
            label: "q2".to_owned(),
            res: 0.5,
        }];
        let transformed = space.transform(&targets, |c| vec![c[0]]).unwrap();

        assert!((transformed.photons().sum() - space.photons().sum()).abs() < 1e-9);
        assert_eq!(transformed.axes()[0].label(), "q2");
    }

    #[test]
    fn merges_bins_that_land_on_the_same_target_cell() {
        let mut space = Space::new(vec![axis("q", 0.0, 3.0, 1.0)]).unwrap();
        space.photons.fill(1.0);
        space.contributions.fill(1);

        // folds every source bin onto a single target coordinate
        let targets = vec![TransformAxis {
            label: "folded".to_owned(),
            res: 1.0,
        }];
        let transformed = space.transform(&targets, |_| vec![0.0]).unwrap();

        assert_eq!(transformed.shape(), &[1]);
        assert_eq!(transformed.photons()[[0]], 4.0);
    }

    #[test]
    fn wrong_arity_projection_errors() {
        let space = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        let targets = vec![
            TransformAxis {
                label: "a".to_owned(),
                res: 0.5,
            },
            TransformAxis {
                label: "b".to_owned(),
                res: 0.5,
            },
        ];
        assert!(matches!(
            space.transform(&targets, |c| vec![c[0]]),
            Err(Error::DimensionError(_))
        ));
    }
}
