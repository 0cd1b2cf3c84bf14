//! `lr-layout` - Physical tensor layouts for layout-reorder.
//!
//! This crate provides:
//! - `DType`, the element types a layout can hold (f32, s32, s16, s8)
//! - `Scheme`, the parametric storage schemes (dense, blocked, dual-blocked,
//!   sub-interleaved, grouped) and the `FormatTag` names that lower to them
//! - `LayoutDesc`, an immutable shape + element type + scheme descriptor
//! - The offset mapper turning logical indices into physical offsets

pub mod dtype;
pub mod error;
pub mod format;
pub mod layout;
pub mod offset;
pub mod scheme;
pub mod shape;

// Re-export primary types at the crate root for convenience.
pub use dtype::DType;
pub use error::{LayoutError, Result};
pub use format::FormatTag;
pub use layout::{build_layout, LayoutDesc};
pub use scheme::{BlockedAxis, Scheme};
pub use shape::{Coords, Shape, MAX_NDIMS};
