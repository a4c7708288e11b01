//! Indexing and slicing: tuple keys, axis projection, and single-axis slicing.

use crate::error::{Error, Result};
use crate::selector::AxisSelector;
use crate::space::Space;
use ndarray::{Axis as NdAxis, Slice};

/// One element of a tuple key passed to [`Space::index`].
#[derive(Clone, Copy, Debug)]
pub enum Key {
    /// Collapse this axis to the bin nearest `value` (via [`crate::axis::Axis::index_of`]).
    Value(f64),
    /// Keep this axis, restricted to the contiguous range of bins entirely within
    /// `[lo, hi)` (via [`crate::axis::Axis::restrict`]).
    Range(f64, f64),
    /// Keep this axis in full; equivalent to a Python `:` slice.
    All,
}

enum Resolved {
    Collapse(usize),
    Keep(usize, usize),
}

impl Space {
    /// Looks up a single bin by its integer index tuple, returning `(photons, contributions)`
    /// without building a (possibly zero-dimensional) `Space`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionError`] if `indices` has the wrong length or an index is out of
    /// range for its axis.
    pub fn bin(&self, indices: &[usize]) -> Result<(f64, u32)> {
        if indices.len() != self.axes.len() {
            return Err(Error::DimensionError(format!(
                "expected {} indices, got {}",
                self.axes.len(),
                indices.len()
            )));
        }
        for (i, (&idx, axis)) in indices.iter().zip(&self.axes).enumerate() {
            if idx >= axis.length() {
                return Err(Error::DimensionError(format!(
                    "index {idx} out of range for axis {i} of length {}",
                    axis.length()
                )));
            }
        }
        let idx_dyn = ndarray::IxDyn(indices);
        Ok((self.photons[idx_dyn.clone()], self.contributions[idx_dyn]))
    }

    /// Indexes the space with a tuple key of length [`Space::dimension`]. Each element either
    /// collapses its axis (a [`Key::Value`]) or restricts it to a contiguous coordinate range
    /// (a [`Key::Range`] or [`Key::All`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionError`] if `keys` has the wrong length, any error
    /// [`crate::axis::Axis::index_of`] can return for a [`Key::Value`], or
    /// [`Error::ZeroDimensional`] if every axis would be collapsed.
    pub fn index(&self, keys: &[Key]) -> Result<Self> {
        if keys.len() != self.axes.len() {
            return Err(Error::DimensionError(format!(
                "expected {} keys, got {}",
                self.axes.len(),
                keys.len()
            )));
        }

        let resolved = keys
            .iter()
            .zip(&self.axes)
            .map(|(key, axis)| match *key {
                Key::Value(v) => axis.index_of(v).map(Resolved::Collapse),
                Key::Range(lo, hi) => {
                    let (start, stop) = axis.restrict(lo, hi);
                    Ok(Resolved::Keep(start, stop))
                }
                Key::All => Ok(Resolved::Keep(0, axis.length())),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut new_axes = Vec::new();
        for (resolved, axis) in resolved.iter().zip(&self.axes) {
            if let Resolved::Keep(start, stop) = *resolved {
                new_axes.push(axis.slice(start, stop)?);
            }
        }
        if new_axes.is_empty() {
            return Err(Error::ZeroDimensional);
        }

        let mut photons = self.photons.view();
        let mut contributions = self.contributions.view();
        for (i, resolved) in resolved.iter().enumerate() {
            if let Resolved::Keep(start, stop) = *resolved {
                photons = photons.slice_axis(NdAxis(i), Slice::from(start..stop));
                contributions = contributions.slice_axis(NdAxis(i), Slice::from(start..stop));
            }
        }
        let mut photons = photons.to_owned();
        let mut contributions = contributions.to_owned();
        for (i, resolved) in resolved.iter().enumerate().rev() {
            if let Resolved::Collapse(idx) = *resolved {
                photons = photons.index_axis_move(NdAxis(i), idx);
                contributions = contributions.index_axis_move(NdAxis(i), idx);
            }
        }

        Ok(Self {
            axes: new_axes,
            photons,
            contributions,
        })
    }

    /// Sums along the selected axis and drops it.
    ///
    /// # Errors
    ///
    /// Propagates [`AxisSelector::resolve`] errors, and returns [`Error::ZeroDimensional`] if
    /// this space has only one axis (projecting it away would leave nothing).
    pub fn project(&self, axis: impl Into<AxisSelector<'_>>) -> Result<Self> {
        let index = axis.into().resolve(&self.axes)?;
        if self.axes.len() == 1 {
            return Err(Error::ZeroDimensional);
        }
        let mut new_axes = self.axes.clone();
        new_axes.remove(index);
        let photons = self.photons.sum_axis(NdAxis(index));
        let contributions = self.contributions.sum_axis(NdAxis(index));
        Ok(Self {
            axes: new_axes,
            photons,
            contributions,
        })
    }

    /// Restricts the named axis to `key`, keeping every other axis in full. Equivalent to
    /// indexing with [`Key::All`] on every axis except `axis`.
    ///
    /// # Errors
    ///
    /// Propagates [`AxisSelector::resolve`] and [`Space::index`] errors.
    pub fn slice(&self, axis: impl Into<AxisSelector<'_>>, key: Key) -> Result<Self> {
        let index = axis.into().resolve(&self.axes)?;
        let keys: Vec<Key> = (0..self.axes.len())
            .map(|i| if i == index { key } else { Key::All })
            .collect();
        self.index(&keys)
    }
}
