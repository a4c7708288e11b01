#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]

//! Reduces synchrotron surface-diffraction detector frames into N-dimensional reciprocal-space
//! histograms.

pub mod algebra;
pub mod axis;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod index;
pub mod kernel;
pub mod selector;
pub mod space;
pub mod transform;

pub use axis::Axis;
pub use error::{Error, Result};
pub use index::Key;
pub use selector::AxisSelector;
pub use space::Space;
pub use transform::TransformAxis;
