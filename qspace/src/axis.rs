//! The [`Axis`] primitive: a one-dimensional regular grid with inclusive endpoints.

use crate::error::{Error, Result};
use float_cmp::approx_eq;
use serde::{Deserialize, Serialize};

/// Rounds `x` to the nearest integer, breaking exact ties to the nearest even integer.
///
/// This mirrors `numpy.around`, which the original reduction pipeline relies on for
/// `Axis::index_of`. Rust's `f64::round` rounds ties away from zero, so a coordinate sitting
/// exactly on a bin boundary would be assigned to a different bin than the source; we keep the
/// source's behavior rather than silently switching rounding modes (see the open question in
/// `SPEC_FULL.md`).
fn round_ties_even(x: f64) -> f64 {
    let floor = x.floor();
    let diff = x - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64).rem_euclid(2) == 0 {
        floor
    } else {
        floor + 1.0
    }
}

/// Snaps `min` down and `max` up to the nearest multiple of `res`, unless they are already
/// multiples of `res` to within 6 decimal digits.
fn snap_outward(min: f64, max: f64, res: f64) -> (f64, f64) {
    let close_to_integer = |x: f64| {
        let ratio = x / res;
        (ratio - ratio.round()).abs() < 1e-6
    };

    if close_to_integer(min) && close_to_integer(max) {
        (min, max)
    } else {
        ((min / res).floor() * res, (max / res).ceil() * res)
    }
}

/// A one-dimensional regular grid descriptor: a labeled axis with `min`, `max` and `res`
/// (resolution). Bin `i` has its center at `min + i * res`; bins are inclusive of both
/// endpoints, so [`Axis::length`] is `round((max - min) / res) + 1`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Axis {
    label: String,
    min: f64,
    max: f64,
    res: f64,
}

impl PartialEq for Axis {
    fn eq(&self, other: &Self) -> bool {
        approx_eq!(f64, self.res, other.res, ulps = 4)
            && approx_eq!(f64, self.min, other.min, ulps = 4)
            && approx_eq!(f64, self.max, other.max, ulps = 4)
            && self.label.eq_ignore_ascii_case(&other.label)
    }
}

impl Axis {
    /// Constructs a new `Axis`, canonicalizing `min`/`max` outward to multiples of `res` if they
    /// deviate by more than six decimal digits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFactor`] if `res` is not strictly positive, or
    /// [`Error::DimensionError`] if `label` is empty.
    pub fn new(label: impl Into<String>, min: f64, max: f64, res: f64) -> Result<Self> {
        let label = label.into();
        if res <= 0.0 {
            return Err(Error::InvalidFactor(format!(
                "axis resolution must be positive, got {res}"
            )));
        }
        if label.is_empty() {
            return Err(Error::DimensionError("axis label must not be empty".to_owned()));
        }
        let (min, max) = snap_outward(min, max, res);
        Ok(Self { label, min, max, res })
    }

    /// The axis label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The lower bound (inclusive).
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// The upper bound (inclusive).
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// The bin resolution.
    #[must_use]
    pub const fn res(&self) -> f64 {
        self.res
    }

    /// The number of bins, counting both endpoints.
    #[must_use]
    pub fn length(&self) -> usize {
        (((self.max - self.min) / self.res).round() as i64 + 1) as usize
    }

    /// The center coordinate of bin `i`.
    #[must_use]
    pub fn coord(&self, i: usize) -> f64 {
        self.res.mul_add(i as f64, self.min)
    }

    /// Maps a coordinate value to the index of the bin whose center is closest to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `value` is outside `[min, max]`.
    pub fn index_of(&self, value: f64) -> Result<usize> {
        if value < self.min || value > self.max {
            return Err(Error::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(round_ties_even((value - self.min) / self.res) as usize)
    }

    /// Vectorized form of [`Axis::index_of`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] for the first value outside `[min, max]`.
    pub fn index_of_many(&self, values: &[f64]) -> Result<Vec<usize>> {
        values.iter().map(|&v| self.index_of(v)).collect()
    }

    /// Returns a new axis covering bins `[start, stop)` of `self`. Strides are unsupported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionError`] if `start >= stop` or `stop` exceeds [`Axis::length`].
    pub fn slice(&self, start: usize, stop: usize) -> Result<Self> {
        if start >= stop || stop > self.length() {
            return Err(Error::DimensionError(format!(
                "invalid slice [{start}, {stop}) for axis of length {}",
                self.length()
            )));
        }
        Ok(Self {
            label: self.label.clone(),
            min: self.min + (start as f64) * self.res,
            max: self.min + ((stop - 1) as f64) * self.res,
            res: self.res,
            // canonicalization is a no-op here: start/stop are already integers of res
        })
    }

    /// Returns the integer bin range `[start, stop)` whose bins lie entirely within
    /// `[lo, hi)`. Used by [`crate::space::Space`] indexing to resolve coordinate-slice keys.
    #[must_use]
    pub fn restrict(&self, lo: f64, hi: f64) -> (usize, usize) {
        let start = ((lo - self.min) / self.res).ceil().max(0.0) as usize;
        let stop_raw = ((hi - self.min) / self.res).ceil();
        let stop = if stop_raw < 0.0 {
            0
        } else {
            (stop_raw as usize).min(self.length())
        };
        (start, stop.max(start))
    }

    /// Two axes are compatible iff they share the same resolution and (case-insensitive) label.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        approx_eq!(f64, self.res, other.res, ulps = 4) && self.label.eq_ignore_ascii_case(&other.label)
    }

    /// `self` contains `other` iff they are compatible and `self`'s bounds enclose `other`'s.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.is_compatible(other) && self.min <= other.min && self.max >= other.max
    }

    /// The union of two compatible axes: the same resolution/label, spanning both ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AxisMismatch`] if the axes are not compatible.
    pub fn union(&self, other: &Self) -> Result<Self> {
        if !self.is_compatible(other) {
            return Err(Error::AxisMismatch(format!(
                "cannot unite axis {:?} (res={}) with axis {:?} (res={})",
                self.label, self.res, other.label, other.res
            )));
        }
        Ok(Self {
            label: self.label.clone(),
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            res: self.res,
        })
    }

    /// Coarsens the axis by an even integer `factor`.
    ///
    /// Returns the number of zero bins that must be padded on the left and right of the
    /// original data before it can be reshaped onto the returned axis, per [`Space::rebin`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFactor`] unless `factor` is a positive even integer.
    ///
    /// [`Space::rebin`]: crate::space::Space::rebin
    pub fn rebin(&self, factor: u32) -> Result<(usize, usize, Self)> {
        if factor == 0 || factor % 2 != 0 {
            return Err(Error::InvalidFactor(format!(
                "rebin factor must be a positive even integer, got {factor}"
            )));
        }
        let factor_i = i64::from(factor);
        let new_res = self.res * f64::from(factor);

        let left = (self.min / self.res).round() as i64;
        let right = (self.max / self.res).round() as i64;
        let left_pad = left.rem_euclid(factor_i) as usize;
        let right_pad = (-right).rem_euclid(factor_i) as usize;

        let new_min = new_res * (self.min / new_res).floor();
        let new_max = new_res * (self.max / new_res).ceil();

        let new_axis = Self::new(self.label.clone(), new_min, new_max, new_res)?;
        Ok((left_pad, right_pad, new_axis))
    }
}
