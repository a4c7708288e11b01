//! Axis selection: a tagged selector resolved by a single function, replacing the overloaded
//! `int | str | Axis` key of the original implementation.

use crate::axis::Axis;
use crate::error::{Error, Result};

/// Identifies one axis of a [`crate::space::Space`], either by position or by (case-insensitive)
/// label.
#[derive(Clone, Copy, Debug)]
pub enum AxisSelector<'a> {
    /// Select the axis at this position.
    ByIndex(usize),
    /// Select the axis whose label matches, case-insensitively.
    ByLabel(&'a str),
}

impl<'a> From<usize> for AxisSelector<'a> {
    fn from(index: usize) -> Self {
        Self::ByIndex(index)
    }
}

impl<'a> From<&'a str> for AxisSelector<'a> {
    fn from(label: &'a str) -> Self {
        Self::ByLabel(label)
    }
}

impl<'a> AxisSelector<'a> {
    /// Resolves the selector against `axes`, returning its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionError`] for an out-of-range index, [`Error::UnknownLabel`] if no
    /// axis matches the label, or [`Error::AmbiguousLabel`] if more than one does.
    pub fn resolve(&self, axes: &[Axis]) -> Result<usize> {
        match *self {
            Self::ByIndex(index) => {
                if index >= axes.len() {
                    Err(Error::DimensionError(format!(
                        "axis index {index} out of range for {} axes",
                        axes.len()
                    )))
                } else {
                    Ok(index)
                }
            }
            Self::ByLabel(label) => {
                let mut matches = axes
                    .iter()
                    .enumerate()
                    .filter(|(_, axis)| axis.label().eq_ignore_ascii_case(label));
                let Some((index, _)) = matches.next() else {
                    return Err(Error::UnknownLabel(label.to_owned()));
                };
                if matches.next().is_some() {
                    return Err(Error::AmbiguousLabel(label.to_owned()));
                }
                Ok(index)
            }
        }
    }
}
