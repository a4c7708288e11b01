//! Error types shared across the crate.

use thiserror::Error;

/// Catch-all error for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Two axes (or two tuples of axes) had incompatible resolution or label during algebra.
    #[error("incompatible axes: {0}")]
    AxisMismatch(String),
    /// A key, coordinate tuple, or rebin-factor list had the wrong arity.
    #[error("dimension mismatch: {0}")]
    DimensionError(String),
    /// A coordinate fell outside the bounds of its axis during indexing or aggregation.
    #[error("value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// The value that was looked up.
        value: f64,
        /// The axis minimum.
        min: f64,
        /// The axis maximum.
        max: f64,
    },
    /// A slice was requested with a non-unit step.
    #[error("stride is not supported")]
    UnsupportedStride,
    /// An indexing operation would collapse every axis, leaving a zero-dimensional result.
    #[error("zero-dimensional spaces are not supported")]
    ZeroDimensional,
    /// Subtraction was attempted between spaces with different axes or contributions.
    #[error("cannot subtract spaces that are not identical in axes and contributions")]
    IncompatibleSubtract,
    /// A rebin factor was not a positive even integer, or the factor list had the wrong arity.
    #[error("invalid rebin factor: {0}")]
    InvalidFactor(String),
    /// Two or more axes in the same space share a label under case-insensitive comparison.
    #[error("ambiguous axis label {0:?}")]
    AmbiguousLabel(String),
    /// No axis in the space matches the requested label.
    #[error("no axis with label {0:?}")]
    UnknownLabel(String),
    /// The on-disk container had an unrecognized header or was otherwise corrupt.
    #[error("malformed space file: {0}")]
    FormatError(String),
    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
    /// Cooperative cancellation was requested.
    #[error("cancelled")]
    UserCancelled,
    /// Error that does not originate from this crate.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
