//! Space algebra: union-addition, subtraction, trimming and rebinning.

use crate::axis::Axis;
use crate::error::{Error, Result};
use crate::space::Space;
use itertools::Itertools;
use ndarray::{Array, ArrayD, Axis as NdAxis, Slice};

impl Space {
    /// Merges `other` into `self` in place.
    ///
    /// If every axis of `other` is contained in the corresponding axis of `self`, the values are
    /// added directly into the aligned slice and `self` is never reallocated. Otherwise `self` is
    /// first resized to the union of both axis tuples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AxisMismatch`] if the two spaces don't have the same number of axes, or
    /// pairwise-compatible axes.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        self.check_compatible(other)?;

        let fits = self
            .axes
            .iter()
            .zip(&other.axes)
            .all(|(mine, theirs)| mine.contains(theirs));

        if !fits {
            let union_axes = self
                .axes
                .iter()
                .zip(&other.axes)
                .map(|(mine, theirs)| mine.union(theirs))
                .collect::<Result<Vec<_>>>()?;
            let mut resized = Self::new(union_axes)?;
            resized.merge(self)?;
            resized.merge(other)?;
            *self = resized;
            return Ok(());
        }

        let offsets = self
            .axes
            .iter()
            .zip(&other.axes)
            .map(|(mine, theirs)| mine.index_of(theirs.min()))
            .collect::<Result<Vec<_>>>()?;

        let target_range: Vec<_> = offsets
            .iter()
            .zip(other.shape())
            .map(|(&offset, &len)| offset..offset + len)
            .collect();

        let mut photons_slice = self.photons.view_mut();
        let mut contributions_slice = self.contributions.view_mut();
        for (i, range) in target_range.iter().enumerate() {
            photons_slice = photons_slice.slice_axis_move(NdAxis(i), Slice::from(range.clone()));
            contributions_slice =
                contributions_slice.slice_axis_move(NdAxis(i), Slice::from(range.clone()));
        }
        photons_slice += &other.photons;
        contributions_slice += &other.contributions;

        Ok(())
    }

    /// Returns `self + other` without mutating either operand.
    ///
    /// # Errors
    ///
    /// See [`Space::merge`].
    pub fn union_with(&self, other: &Self) -> Result<Self> {
        let mut copy = self.clone();
        copy.merge(other)?;
        Ok(copy)
    }

    /// Subtracts `other.photons` from `self.photons`, requiring identical axes and identical
    /// contributions (the same sampling support).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleSubtract`] otherwise.
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        if self.axes != other.axes || self.contributions != other.contributions {
            return Err(Error::IncompatibleSubtract);
        }
        let mut result = self.clone();
        result.photons -= &other.photons;
        Ok(result)
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.axes.len() != other.axes.len() {
            return Err(Error::AxisMismatch(format!(
                "cannot combine a {}-dimensional space with a {}-dimensional one",
                self.axes.len(),
                other.axes.len()
            )));
        }
        for (mine, theirs) in self.axes.iter().zip(&other.axes) {
            if !mine.is_compatible(theirs) {
                return Err(Error::AxisMismatch(format!(
                    "axis {:?} is incompatible with axis {:?}",
                    mine.label(),
                    theirs.label()
                )));
            }
        }
        Ok(())
    }

    /// Shrinks each axis to the tightest bounding box containing every bin with
    /// `contributions > 0`. A no-op if the space has no empty bins anywhere on its boundary, and
    /// leaves an entirely-empty space untouched.
    pub fn trim(&mut self) {
        let bounds: Vec<Option<(usize, usize)>> = (0..self.axes.len())
            .map(|axis_index| nonzero_bounds(&self.contributions, axis_index))
            .collect();

        let Some(bounds) = bounds.into_iter().collect::<Option<Vec<_>>>() else {
            return;
        };

        let new_axes = self
            .axes
            .iter()
            .zip(&bounds)
            .map(|(axis, &(lo, hi))| axis.slice(lo, hi + 1))
            .collect::<Result<Vec<_>>>()
            .expect("trim bounds are always a valid sub-range of the original axis");

        let mut photons = self.photons.view();
        let mut contributions = self.contributions.view();
        for (i, &(lo, hi)) in bounds.iter().enumerate() {
            photons = photons.slice_axis(NdAxis(i), Slice::from(lo..hi + 1));
            contributions = contributions.slice_axis(NdAxis(i), Slice::from(lo..hi + 1));
        }

        self.photons = photons.to_owned();
        self.contributions = contributions.to_owned();
        self.axes = new_axes;
    }

    /// Coarsens every axis by its corresponding even integer factor, preserving total photons
    /// and total contributions exactly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionError`] if `factors` has the wrong length, or
    /// [`Error::InvalidFactor`] if any factor is not a positive even integer.
    pub fn rebin(&self, factors: &[u32]) -> Result<Self> {
        if factors.len() != self.axes.len() {
            return Err(Error::DimensionError(format!(
                "expected {} rebin factors, got {}",
                self.axes.len(),
                factors.len()
            )));
        }

        let mut left_pads = Vec::with_capacity(factors.len());
        let mut right_pads = Vec::with_capacity(factors.len());
        let mut new_axes: Vec<Axis> = Vec::with_capacity(factors.len());
        for (axis, &factor) in self.axes.iter().zip(factors) {
            let (left, right, new_axis) = axis.rebin(factor)?;
            left_pads.push(left);
            right_pads.push(right);
            new_axes.push(new_axis);
        }

        let padded_shape: Vec<usize> = self
            .shape()
            .iter()
            .zip(&left_pads)
            .zip(&right_pads)
            .zip(factors)
            .map(|(((&size, &left), &right), &factor)| size + left + right + factor as usize)
            .collect();

        let mut padded_photons: ArrayD<f64> = Array::zeros(padded_shape.clone());
        let mut padded_contributions: ArrayD<u32> = Array::zeros(padded_shape);

        let insert_at: Vec<usize> = left_pads
            .iter()
            .zip(factors)
            .map(|(&left, &factor)| left + factor as usize / 2)
            .collect();

        {
            let mut dst = padded_photons.view_mut();
            let mut dst_c = padded_contributions.view_mut();
            for (i, (&start, &size)) in insert_at.iter().zip(self.shape()).enumerate() {
                dst = dst.slice_axis_move(NdAxis(i), Slice::from(start..start + size));
                dst_c = dst_c.slice_axis_move(NdAxis(i), Slice::from(start..start + size));
            }
            dst.assign(&self.photons);
            dst_c.assign(&self.contributions);
        }

        let new_shape: Vec<usize> = new_axes.iter().map(Axis::length).collect();
        let mut new_photons: ArrayD<f64> = Array::zeros(new_shape.clone());
        let mut new_contributions: ArrayD<u32> = Array::zeros(new_shape.clone());

        let offset_ranges: Vec<Vec<usize>> =
            factors.iter().map(|&f| (0..f as usize).collect()).collect();
        for offsets in offset_ranges.into_iter().multi_cartesian_product() {
            let mut photons_view = padded_photons.view();
            let mut contributions_view = padded_contributions.view();
            for (i, (&offset, &len)) in offsets.iter().zip(&new_shape).enumerate() {
                let factor = factors[i] as isize;
                let start = offset as isize;
                let stop = start + (len as isize) * factor;
                photons_view =
                    photons_view.slice_axis(NdAxis(i), Slice::new(start, Some(stop), factor));
                contributions_view =
                    contributions_view.slice_axis(NdAxis(i), Slice::new(start, Some(stop), factor));
            }
            new_photons += &photons_view;
            new_contributions += &contributions_view;
        }

        Ok(Self {
            axes: new_axes,
            photons: new_photons,
            contributions: new_contributions,
        })
    }
}

/// Returns the inclusive `[lo, hi]` bin range with nonzero contributions along `axis_index`, or
/// `None` if every bin along that axis is empty.
fn nonzero_bounds(contributions: &ArrayD<u32>, axis_index: usize) -> Option<(usize, usize)> {
    let len = contributions.shape()[axis_index];
    let mut bounds = None;
    for i in 0..len {
        let lane = contributions.index_axis(NdAxis(axis_index), i);
        if lane.iter().any(|&c| c > 0) {
            bounds = match bounds {
                None => Some((i, i)),
                Some((lo, _)) => Some((lo, i)),
            };
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;

    fn axis(label: &str, min: f64, max: f64, res: f64) -> Axis {
        Axis::new(label, min, max, res).unwrap()
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let mut a = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        a.photons[[1]] = 4.0;
        a.contributions[[1]] = 1;
        let untouched = a.clone();
        let empty = Space::new(vec![axis("q", 0.5, 0.5, 0.5)]).unwrap();
        a.merge(&empty).unwrap();
        assert_eq!(a.photons(), untouched.photons());
    }

    #[test]
    fn merge_is_commutative_up_to_union() {
        let mut a = Space::new(vec![axis("q", 0.0, 0.5, 0.5)]).unwrap();
        a.photons[[0]] = 1.0;
        a.photons[[1]] = 2.0;
        a.contributions.fill(1);

        let mut b = Space::new(vec![axis("q", 0.5, 1.0, 0.5)]).unwrap();
        b.photons[[0]] = 3.0;
        b.photons[[1]] = 4.0;
        b.contributions.fill(1);

        let ab = a.union_with(&b).unwrap();
        let ba = b.union_with(&a).unwrap();
        assert_eq!(ab.photons(), ba.photons());
        assert_eq!(
            ab.photons().iter().copied().collect::<Vec<_>>(),
            vec![1.0, 5.0, 4.0]
        );
    }

    #[test]
    fn doubling_doubles_both_arrays() {
        let mut a = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        a.photons[[1]] = 4.0;
        a.contributions[[1]] = 1;
        let doubled = a.union_with(&a).unwrap();
        assert_eq!(doubled.photons()[[1]], 8.0);
        assert_eq!(doubled.contributions()[[1]], 2);
    }

    #[test]
    fn trim_shrinks_to_nonzero_bounding_box() {
        let mut space = Space::new(vec![axis("q", 0.0, 2.0, 0.5)]).unwrap();
        space.photons[[2]] = 5.0;
        space.contributions[[2]] = 1;
        space.trim();
        assert_eq!(space.shape(), &[1]);
        assert_eq!(space.photons()[[0]], 5.0);
    }

    #[test]
    fn rebin_preserves_totals() {
        // A 4-bin inclusive-endpoint axis spans an odd number of intervals (3), so rebinning by
        // an even factor necessarily pads one side and not the other -- the result has one more
        // bin than a naive `length / factor` would suggest, but total photons/contributions are
        // still preserved exactly.
        let mut space = Space::new(vec![axis("q", 0.0, 1.5, 0.5)]).unwrap();
        for (i, v) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
            space.photons[[i]] = v;
            space.contributions[[i]] = 1;
        }
        let rebinned = space.rebin(&[2]).unwrap();
        assert_eq!(
            rebinned.photons().iter().copied().collect::<Vec<_>>(),
            vec![1.0, 5.0, 4.0]
        );
        assert_eq!(
            rebinned.contributions().iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 1]
        );
        assert!((rebinned.photons().sum() - space.photons().sum()).abs() < 1e-12);
        assert_eq!(rebinned.contributions().sum(), space.contributions().sum());
    }

    #[test]
    fn subtract_requires_identical_support() {
        let mut a = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        a.contributions.fill(1);
        let b = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
        assert!(matches!(
            a.checked_sub(&b),
            Err(Error::IncompatibleSubtract)
        ));
    }
}
