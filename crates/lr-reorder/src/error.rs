use lr_layout::LayoutError;
use thiserror::Error;

/// Coarse classification callers use to tell a malformed descriptor from an
/// incompatible source/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    InvalidShape,
    InvalidArguments,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    #[error("shape mismatch: source {src:?}, destination {dst:?}")]
    ShapeMismatch { src: Vec<usize>, dst: Vec<usize> },
    #[error("tensor {0:?} has a zero-sized axis")]
    ZeroSizedAxis(Vec<usize>),
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: String, got: String },
    #[error("buffer too small: need {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    #[error("source and destination alias with different layouts")]
    AliasedBuffers,
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("task failed: {0}")]
    Task(String),
}

impl ReorderError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ReorderError::Layout(_) => ErrorClass::InvalidShape,
            _ => ErrorClass::InvalidArguments,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReorderError>;
