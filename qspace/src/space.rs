//! The [`Space`] abstraction: an N-dimensional regular-grid accumulator.

use crate::axis::Axis;
use crate::error::{Error, Result};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// An N-dimensional dense histogram over a tuple of [`Axis`] values.
///
/// `photons` holds the summed intensities per bin; `contributions` holds the number of raw
/// samples that landed in each bin. Both arrays always share the shape implied by `axes`, and an
/// empty bin always has `photons == 0.0` and `contributions == 0`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Space {
    pub(crate) axes: Vec<Axis>,
    pub(crate) photons: ArrayD<f64>,
    pub(crate) contributions: ArrayD<u32>,
}

impl Space {
    /// Creates an empty `Space` over `axes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionError`] if `axes` is empty, or [`Error::AmbiguousLabel`] if two
    /// axes share a label under case-insensitive comparison.
    pub fn new(axes: Vec<Axis>) -> Result<Self> {
        if axes.is_empty() {
            return Err(Error::DimensionError(
                "a space must have at least one axis".to_owned(),
            ));
        }
        for i in 0..axes.len() {
            for j in (i + 1)..axes.len() {
                if axes[i].label().eq_ignore_ascii_case(axes[j].label()) {
                    return Err(Error::AmbiguousLabel(axes[i].label().to_owned()));
                }
            }
        }
        let shape: Vec<usize> = axes.iter().map(Axis::length).collect();
        let photons = ArrayD::zeros(shape.clone());
        let contributions = ArrayD::zeros(shape);
        Ok(Self {
            axes,
            photons,
            contributions,
        })
    }

    /// The axes of this space, in order.
    #[must_use]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// The number of axes.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// The shape of the underlying arrays, i.e. the length of each axis.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.photons.shape()
    }

    /// The raw summed-intensity array.
    #[must_use]
    pub fn photons(&self) -> &ArrayD<f64> {
        &self.photons
    }

    /// The raw contribution-count array.
    #[must_use]
    pub fn contributions(&self) -> &ArrayD<u32> {
        &self.contributions
    }

    /// The total number of bins across all axes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.photons.len()
    }

    /// Whether this space has zero bins. Never true since [`Space::new`] rejects empty axis
    /// lists, but provided for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    /// Returns the observable mean (`photons / contributions`) and a mask of empty bins.
    #[must_use]
    pub fn get_masked(&self) -> (ArrayD<f64>, ArrayD<bool>) {
        let mask = self.contributions.mapv(|c| c == 0);
        let mean = ndarray::Zip::from(&self.photons)
            .and(&self.contributions)
            .map_collect(|&p, &c| if c == 0 { 0.0 } else { p / f64::from(c) });
        (mean, mask)
    }
}
