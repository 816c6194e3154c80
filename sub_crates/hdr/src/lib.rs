//! Exposure fusion: merges a stack of differently exposed images of a
//! static scene into a single linear radiance image.
//!
//! The stack must be ordered from the shortest exposure to the longest.
//! Camera response and sample weighting are supplied as [`RgbCurve`]s,
//! typically produced by an external calibration step.

mod curve;
mod error;
mod image;
mod merge;

pub use crate::curve::{sigmoid, sigmoid_inv, CurveShape, RgbCurve};
pub use crate::error::Error;
pub use crate::image::Image;
pub use crate::merge::{merge, MergeParams, MAX_LUMINANCE, MIN_WEIGHT_SUM};
