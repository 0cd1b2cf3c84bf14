//! `lr-reorder` - Converts tensors between physical layouts and element types.
//!
//! This crate provides:
//! - `Reorder`, a validated source/destination pair that transfers every
//!   logical element through the two offset mappers
//! - Element conversion with a fixed round-then-saturate policy
//! - `Buffer`, typed caller-owned storage
//! - `Stream`, a submit/wait wrapper that runs reorders as tasks

pub mod buffer;
pub mod config;
pub mod element;
pub mod error;
pub mod reorder;
pub mod stream;
pub mod validate;

// Re-export primary types at the crate root for convenience.
pub use buffer::Buffer;
pub use config::{ReorderConfig, RoundMode};
pub use element::{convert, Element, Value};
pub use error::{ErrorClass, ReorderError, Result};
pub use reorder::{reorder, Reorder};
pub use stream::{ReorderTask, Stream, StreamKind, TaskHandle};
pub use validate::validate;

pub use lr_layout::{build_layout, DType, FormatTag, LayoutDesc, LayoutError, Scheme};
