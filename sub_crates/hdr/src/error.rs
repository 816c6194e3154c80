use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("the response curve is empty")]
    EmptyResponseCurve,

    #[error("the weight curve is empty")]
    EmptyWeightCurve,

    #[error("no images to merge")]
    EmptyStack,

    #[error("got {images} images but {times} exposure times")]
    TimeCountMismatch { images: usize, times: usize },

    #[error("image {index} is {found:?} but the stack is {expected:?} (width, height)")]
    DimensionMismatch {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("exposure time {time} of image {index} is not a positive number")]
    InvalidExposureTime { index: usize, time: f32 },

    #[error("pixel buffer holds {found} pixels but {width}x{height} needs {expected}")]
    PixelCountMismatch {
        width: usize,
        height: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown curve shape \"{0}\"")]
    UnknownCurveShape(String),
}
