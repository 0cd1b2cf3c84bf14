use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("format {format} expects {expected} dimensions, got {got:?}")]
    InvalidShape {
        format: String,
        expected: usize,
        got: Vec<usize>,
    },
    #[error("format {format} over {dims:?} needs more bytes than fit in usize")]
    SizeOverflow { format: String, dims: Vec<usize> },
    #[error("format {format} does not support {dtype} elements")]
    UnsupportedDType { format: String, dtype: String },
    #[error("invalid blocking: {0}")]
    InvalidBlocking(String),
    #[error("unknown format tag: {0}")]
    UnknownFormat(String),
    #[error("unknown data type: {0}")]
    UnknownDType(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
