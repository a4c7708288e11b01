//! The aggregation kernel: the hot path that turns per-photon coordinates and intensities into
//! grouped bin sums.

use crate::error::{Error, Result};
use crate::space::Space;

impl Space {
    /// Accumulates one image's worth of samples into this space in place.
    ///
    /// `coordinates` holds one coordinate array per axis (all the same length); `intensity` holds
    /// the corresponding per-sample weight. Non-finite intensities are dropped before indexing, so
    /// a detector frame with masked-out (`NaN`) pixels can be passed through unfiltered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionError`] if `coordinates.len()` doesn't match [`Space::dimension`]
    /// or the coordinate arrays don't all have the length of `intensity`, and propagates
    /// [`Error::OutOfRange`] from [`crate::axis::Axis::index_of`] for any coordinate that falls
    /// outside its axis.
    pub fn process_image(&mut self, coordinates: &[&[f64]], intensity: &[f64]) -> Result<()> {
        if coordinates.len() != self.axes.len() {
            return Err(Error::DimensionError(format!(
                "expected {} coordinate arrays, got {}",
                self.axes.len(),
                coordinates.len()
            )));
        }
        for (j, coord) in coordinates.iter().enumerate() {
            if coord.len() != intensity.len() {
                return Err(Error::DimensionError(format!(
                    "coordinate array {j} has length {}, intensity has length {}",
                    coord.len(),
                    intensity.len()
                )));
            }
        }

        let valid: Vec<usize> = intensity
            .iter()
            .enumerate()
            .filter(|(_, &v)| v.is_finite())
            .map(|(i, _)| i)
            .collect();
        if valid.is_empty() {
            return Ok(());
        }

        let shape = self.shape().to_vec();
        let strides = c_order_strides(&shape);

        let mut flat_indices = Vec::with_capacity(valid.len());
        let mut weights = Vec::with_capacity(valid.len());
        for &i in &valid {
            let mut flat = 0usize;
            for (axis, (coord, &stride)) in self.axes.iter().zip(coordinates.iter().zip(&strides)) {
                flat += axis.index_of(coord[i])? * stride;
            }
            flat_indices.push(flat);
            weights.push(intensity[i]);
        }

        let photons = self
            .photons
            .as_slice_mut()
            .expect("Space arrays are always standard C-order layout");
        let contributions = self
            .contributions
            .as_slice_mut()
            .expect("Space arrays are always standard C-order layout");
        for (&flat, &w) in flat_indices.iter().zip(&weights) {
            photons[flat] += w;
            contributions[flat] += 1;
        }

        Ok(())
    }

    /// Like [`Space::process_image`], but tolerant of out-of-range coordinates: samples whose
    /// indices would fall outside any axis are silently dropped instead of raising an error, and
    /// the number of dropped samples is returned.
    #[must_use]
    pub fn process_image_lossy(&mut self, coordinates: &[&[f64]], intensity: &[f64]) -> usize {
        if coordinates.len() != self.axes.len() {
            return intensity.len();
        }

        let mut kept_coords: Vec<Vec<f64>> = vec![Vec::new(); self.axes.len()];
        let mut kept_intensity = Vec::new();
        let mut dropped = 0usize;

        for i in 0..intensity.len() {
            if !intensity[i].is_finite() {
                continue;
            }
            let in_range = self
                .axes
                .iter()
                .zip(coordinates)
                .all(|(axis, coord)| axis.index_of(coord[i]).is_ok());
            if in_range {
                for (slot, coord) in kept_coords.iter_mut().zip(coordinates) {
                    slot.push(coord[i]);
                }
                kept_intensity.push(intensity[i]);
            } else {
                dropped += 1;
            }
        }

        let refs: Vec<&[f64]> = kept_coords.iter().map(Vec::as_slice).collect();
        if !kept_intensity.is_empty() {
            self.process_image(&refs, &kept_intensity)
                .expect("coordinates were already filtered to be in range");
        }
        dropped
    }
}

fn c_order_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;

    fn axis(label: &str, min: f64, max: f64, res: f64) -> Axis {
        Axis::new(label, min, max, res).unwrap()
    }

    #[test]
    fn accumulates_matching_bins() {
        let mut space = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        let coords: Vec<f64> = vec![0.0, 0.0, 0.5, 1.0];
        let intensity = vec![1.0, 2.0, 3.0, 4.0];
        space.process_image(&[&coords], &intensity).unwrap();
        assert_eq!(
            space.photons().iter().copied().collect::<Vec<_>>(),
            vec![3.0, 3.0, 4.0]
        );
        assert_eq!(
            space.contributions().iter().copied().collect::<Vec<_>>(),
            vec![2, 1, 1]
        );
    }

    #[test]
    fn drops_non_finite_intensity() {
        let mut space = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        let coords = vec![0.0, 0.5];
        let intensity = vec![f64::NAN, 3.0];
        space.process_image(&[&coords], &intensity).unwrap();
        assert_eq!(space.photons()[[0]], 0.0);
        assert_eq!(space.photons()[[1]], 3.0);
    }

    #[test]
    fn all_non_finite_is_a_no_op() {
        let mut space = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        let coords = vec![0.0];
        let intensity = vec![f64::NAN];
        space.process_image(&[&coords], &intensity).unwrap();
        assert!(space.contributions().iter().all(|&c| c == 0));
    }

    #[test]
    fn out_of_range_coordinate_is_a_hard_error() {
        let mut space = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        let coords = vec![5.0];
        let intensity = vec![1.0];
        assert!(matches!(
            space.process_image(&[&coords], &intensity),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn lossy_variant_drops_out_of_range_instead_of_erroring() {
        let mut space = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        let coords = vec![5.0, 0.5];
        let intensity = vec![1.0, 2.0];
        let dropped = space.process_image_lossy(&[&coords], &intensity);
        assert_eq!(dropped, 1);
        assert_eq!(space.photons()[[1]], 2.0);
    }

    #[test]
    fn flattens_two_axes_in_c_order() {
        let mut space =
            Space::new(vec![axis("a", 0.0, 1.0, 1.0), axis("b", 0.0, 2.0, 1.0)]).unwrap();
        let a = vec![1.0];
        let b = vec![2.0];
        space.process_image(&[&a, &b], &[9.0]).unwrap();
        assert_eq!(space.photons()[[1, 2]], 9.0);
    }

}
