//! The reorder primitive.
//!
//! A [`Reorder`] is built from a source and destination layout, which are
//! validated once. Executing it walks the logical index space, reads each
//! element through the source offset mapper, converts it and writes it
//! through the destination offset mapper. Every check happens before the
//! first write, so a failed call leaves the destination untouched.

use std::ops::Range;

use lr_layout::LayoutDesc;
use tracing::debug;

use crate::buffer::Buffer;
use crate::config::ReorderConfig;
use crate::element::{convert, Element};
use crate::error::{ReorderError, Result};
use crate::validate::validate;

/// Dispatch a `&Buffer` to its typed slice.
macro_rules! with_slice {
    ($buf:expr, $s:ident => $body:expr) => {
        match $buf {
            Buffer::F32($s) => $body,
            Buffer::S32($s) => $body,
            Buffer::S16($s) => $body,
            Buffer::S8($s) => $body,
        }
    };
}

#[derive(Debug, Clone)]
pub struct Reorder {
    src: LayoutDesc,
    dst: LayoutDesc,
    logical_size: usize,
    config: ReorderConfig,
}

impl Reorder {
    /// Create a reorder with the default configuration.
    ///
    /// # Errors
    /// `ShapeMismatch` or `ZeroSizedAxis` if the layouts are not compatible.
    pub fn new(src: &LayoutDesc, dst: &LayoutDesc) -> Result<Self> {
        Self::with_config(src, dst, ReorderConfig::default())
    }

    pub fn with_config(src: &LayoutDesc, dst: &LayoutDesc, config: ReorderConfig) -> Result<Self> {
        let logical_size = validate(src, dst).inspect_err(|e| {
            debug!(src = %src, dst = %dst, error = %e, "reorder rejected");
        })?;
        debug!(
            src = %src,
            dst = %dst,
            logical_size,
            src_slots = src.physical_size(),
            dst_slots = dst.physical_size(),
            "reorder created"
        );
        Ok(Reorder {
            src: src.clone(),
            dst: dst.clone(),
            logical_size,
            config,
        })
    }

    pub fn src(&self) -> &LayoutDesc {
        &self.src
    }

    pub fn dst(&self) -> &LayoutDesc {
        &self.dst
    }

    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    /// Number of logical elements transferred by one execution.
    pub fn logical_size(&self) -> usize {
        self.logical_size
    }

    /// Logical index ranges of at most `chunk_len` elements covering the
    /// whole tensor, in order.
    pub fn chunks(&self) -> impl Iterator<Item = Range<usize>> {
        let n = self.logical_size;
        let step = self.config.effective_chunk_len();
        (0..n)
            .step_by(step)
            .map(move |start| start..(start + step).min(n))
    }

    /// Transfer every logical element from `src` into `dst`.
    ///
    /// # Errors
    /// `DTypeMismatch` or `BufferTooSmall` if a buffer does not fit its
    /// layout; nothing is written in that case.
    #[tracing::instrument(level = "debug", skip_all, fields(src = %self.src, dst = %self.dst))]
    pub fn execute(&self, src: &Buffer, dst: &mut Buffer) -> Result<()> {
        self.execute_range(src, dst, 0..self.logical_size)
    }

    /// Transfer the logical indices in `range` only.
    ///
    /// Disjoint ranges touch disjoint destination slots, so a caller may
    /// split one reorder into chunks and run them in any order.
    pub fn execute_range(&self, src: &Buffer, dst: &mut Buffer, range: Range<usize>) -> Result<()> {
        self.check_buffer(&self.src, src)?;
        self.check_buffer(&self.dst, dst)?;
        self.check_range(&range)?;
        with_slice!(src, s => with_slice!(dst, d => self.transfer(s, d, range)));
        Ok(())
    }

    /// Typed entry point for callers holding plain slices.
    ///
    /// # Errors
    /// As [`Reorder::execute`].
    pub fn execute_slices<S: Element, D: Element>(&self, src: &[S], dst: &mut [D]) -> Result<()> {
        check_slice::<S>(&self.src, src.len())?;
        check_slice::<D>(&self.dst, dst.len())?;
        self.transfer(src, dst, 0..self.logical_size);
        Ok(())
    }

    /// Like [`Reorder::execute`], with chunks spread over the rayon pool.
    #[cfg(feature = "rayon")]
    pub fn execute_parallel(&self, src: &Buffer, dst: &mut Buffer) -> Result<()> {
        self.check_buffer(&self.src, src)?;
        self.check_buffer(&self.dst, dst)?;
        with_slice!(src, s => with_slice!(dst, d => self.transfer_parallel(s, d)));
        Ok(())
    }

    fn check_buffer(&self, layout: &LayoutDesc, buf: &Buffer) -> Result<()> {
        if buf.dtype() != layout.dtype() {
            return Err(ReorderError::DTypeMismatch {
                expected: layout.dtype().to_string(),
                got: buf.dtype().to_string(),
            });
        }
        if buf.len() < layout.physical_size() {
            return Err(ReorderError::BufferTooSmall {
                needed: layout.physical_size(),
                got: buf.len(),
            });
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.logical_size {
            return Err(ReorderError::Task(format!(
                "range {:?} outside 0..{}",
                range, self.logical_size
            )));
        }
        Ok(())
    }

    #[inline]
    fn transfer<S: Element, D: Element>(&self, src: &[S], dst: &mut [D], range: Range<usize>) {
        let mode = self.config.round_mode;
        for i in range {
            let value = src[self.src.offset_of(i)];
            dst[self.dst.offset_of(i)] = convert(value, mode);
        }
    }

    #[cfg(feature = "rayon")]
    fn transfer_parallel<S: Element, D: Element>(&self, src: &[S], dst: &mut [D]) {
        use rayon::prelude::*;

        let len = dst.len();
        let out = SharedSlice(dst.as_mut_ptr());
        let mode = self.config.round_mode;
        let chunks: Vec<Range<usize>> = self.chunks().collect();
        chunks.into_par_iter().for_each(|range| {
            for i in range {
                let value = src[self.src.offset_of(i)];
                let off = self.dst.offset_of(i);
                debug_assert!(off < len);
                // SAFETY: see `SharedSlice`.
                unsafe { *out.ptr().add(off) = convert(value, mode) };
            }
        });
    }
}

fn check_slice<T: Element>(layout: &LayoutDesc, len: usize) -> Result<()> {
    if T::DTYPE != layout.dtype() {
        return Err(ReorderError::DTypeMismatch {
            expected: layout.dtype().to_string(),
            got: T::DTYPE.to_string(),
        });
    }
    if len < layout.physical_size() {
        return Err(ReorderError::BufferTooSmall {
            needed: layout.physical_size(),
            got: len,
        });
    }
    Ok(())
}

/// Destination pointer shared by parallel chunks.
///
/// Sound only for a destination slice of at least `physical_size()` slots
/// written through the offset mapper of a validated layout: every logical
/// index maps to a distinct in-bounds slot, so chunks over disjoint logical
/// ranges never write the same slot.
#[cfg(feature = "rayon")]
struct SharedSlice<T>(*mut T);

#[cfg(feature = "rayon")]
impl<T> SharedSlice<T> {
    fn ptr(&self) -> *mut T {
        self.0
    }
}

#[cfg(feature = "rayon")]
unsafe impl<T: Send> Sync for SharedSlice<T> {}

/// Validate `src_layout`/`dst_layout` and transfer `src` into `dst`.
pub fn reorder(
    src_layout: &LayoutDesc,
    src: &Buffer,
    dst_layout: &LayoutDesc,
    dst: &mut Buffer,
) -> Result<()> {
    Reorder::new(src_layout, dst_layout)?.execute(src, dst)
}
