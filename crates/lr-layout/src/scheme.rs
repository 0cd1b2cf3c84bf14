//! Parametric storage schemes.
//!
//! Every named format lowers to one of a handful of schemes. A scheme carries
//! its axis order and blocking factors as data, so the offset mapper has one
//! rule per scheme rather than one per format name.
//!
//! Axis numbers always refer to logical axes of the shape the scheme is
//! applied to. For `Grouped`, the enclosed scheme sees the shape with the
//! group axis removed.

use crate::error::{LayoutError, Result};
use crate::shape::MAX_NDIMS;

/// Blocking factors accepted for a blocked axis.
pub const BLOCK_SIZES: [usize; 2] = [8, 16];

/// Sub-interleave factors accepted by [`Scheme::Interleaved`].
pub const INTERLEAVE_FACTORS: [usize; 2] = [2, 4];

/// Bytes covered by one sub-interleaved group. Fixed-point dot-product
/// instructions consume 32 bits per lane.
pub const INTERLEAVE_LANE_BYTES: usize = 4;

/// A logical axis split into an outer block index and an inner offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockedAxis {
    pub axis: usize,
    pub block: usize,
}

impl BlockedAxis {
    pub const fn new(axis: usize, block: usize) -> Self {
        BlockedAxis { axis, block }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Logical axes stored in `order`, outermost first.
    Dense { order: Vec<usize> },
    /// `axis` split by `block`. The block index takes the axis' place in
    /// `order`; the in-block offset is the fastest-varying physical axis.
    Blocked {
        order: Vec<usize>,
        axis: usize,
        block: usize,
    },
    /// Two axes split. Physical inner nesting is `first` then `second`, with
    /// `second` fastest.
    DualBlocked {
        order: Vec<usize>,
        first: BlockedAxis,
        second: BlockedAxis,
    },
    /// Dual blocking where the inner block of `split` is cut again by `k`.
    /// Physical inner nesting is `split / k`, `other`, `split % k`.
    Interleaved {
        order: Vec<usize>,
        split: BlockedAxis,
        other: BlockedAxis,
        k: usize,
    },
    /// Leading group axis factored out before `inner` lays out the rest.
    /// With `group_block`, the group axis is itself blocked: the group block
    /// index is outermost and the in-block group offset is fastest.
    Grouped {
        group_block: Option<usize>,
        inner: Box<Scheme>,
    },
}

impl Scheme {
    /// Number of logical axes the scheme lays out.
    pub fn ndims(&self) -> usize {
        match self {
            Scheme::Dense { order }
            | Scheme::Blocked { order, .. }
            | Scheme::DualBlocked { order, .. }
            | Scheme::Interleaved { order, .. } => order.len(),
            Scheme::Grouped { inner, .. } => inner.ndims() + 1,
        }
    }

    /// Short family name, used in error messages and logs.
    pub fn family(&self) -> &'static str {
        match self {
            Scheme::Dense { .. } => "dense",
            Scheme::Blocked { .. } => "blocked",
            Scheme::DualBlocked { .. } => "dual-blocked",
            Scheme::Interleaved { .. } => "interleaved",
            Scheme::Grouped { .. } => "grouped",
        }
    }

    /// Sub-interleave factor, if any level of the scheme uses one.
    pub fn interleave(&self) -> Option<usize> {
        match self {
            Scheme::Interleaved { k, .. } => Some(*k),
            Scheme::Grouped { inner, .. } => inner.interleave(),
            _ => None,
        }
    }

    /// Checks that axis orders are permutations and that blocking factors are
    /// supported.
    pub fn validate(&self) -> Result<()> {
        if self.ndims() == 0 || self.ndims() > MAX_NDIMS {
            return Err(LayoutError::InvalidBlocking(format!(
                "rank {} outside 1..={}",
                self.ndims(),
                MAX_NDIMS
            )));
        }
        match self {
            Scheme::Dense { order } => check_order(order),
            Scheme::Blocked { order, axis, block } => {
                check_order(order)?;
                check_block(order.len(), BlockedAxis::new(*axis, *block))
            }
            Scheme::DualBlocked {
                order,
                first,
                second,
            } => {
                check_order(order)?;
                check_block(order.len(), *first)?;
                check_block(order.len(), *second)?;
                check_distinct(*first, *second)
            }
            Scheme::Interleaved {
                order,
                split,
                other,
                k,
            } => {
                check_order(order)?;
                check_block(order.len(), *split)?;
                check_block(order.len(), *other)?;
                check_distinct(*split, *other)?;
                if !INTERLEAVE_FACTORS.contains(k) || split.block % k != 0 {
                    return Err(LayoutError::InvalidBlocking(format!(
                        "interleave factor {} does not divide block {}",
                        k, split.block
                    )));
                }
                Ok(())
            }
            Scheme::Grouped { group_block, inner } => {
                if matches!(**inner, Scheme::Grouped { .. }) {
                    return Err(LayoutError::InvalidBlocking(
                        "nested group axes".to_string(),
                    ));
                }
                if let Some(block) = group_block {
                    check_block(1, BlockedAxis::new(0, *block))?;
                }
                inner.validate()
            }
        }
    }

    /// Blocking factor applied to logical axis `axis`, if it is blocked.
    pub fn block_of(&self, axis: usize) -> Option<usize> {
        let hit = |b: &BlockedAxis| (b.axis == axis).then_some(b.block);
        match self {
            Scheme::Dense { .. } => None,
            Scheme::Blocked { axis: a, block, .. } => (*a == axis).then_some(*block),
            Scheme::DualBlocked { first, second, .. } => hit(first).or_else(|| hit(second)),
            Scheme::Interleaved { split, other, .. } => hit(split).or_else(|| hit(other)),
            Scheme::Grouped { group_block, inner } => match axis {
                0 => *group_block,
                _ => inner.block_of(axis - 1),
            },
        }
    }

    /// Physical extent of logical axis `axis` once its blocked parts are
    /// rounded up to whole blocks.
    pub fn padded_dim(&self, dims: &[usize], axis: usize) -> usize {
        match self.block_of(axis) {
            Some(b) => dims[axis].div_ceil(b) * b,
            None => dims[axis],
        }
    }

    /// Logical dims rounded up to whole blocks on every blocked axis.
    pub fn padded_dims(&self, dims: &[usize]) -> Vec<usize> {
        (0..dims.len()).map(|a| self.padded_dim(dims, a)).collect()
    }

    /// Number of storage slots, padding included.
    ///
    /// Assumes the count fits `usize`; [`Scheme::checked_physical_size`]
    /// is the fallible form.
    pub fn physical_size(&self, dims: &[usize]) -> usize {
        (0..dims.len()).map(|a| self.padded_dim(dims, a)).product()
    }

    /// Number of storage slots, or `None` if a padded axis or the slot count
    /// overflows `usize`.
    pub fn checked_physical_size(&self, dims: &[usize]) -> Option<usize> {
        (0..dims.len()).try_fold(1usize, |acc, a| {
            let padded = match self.block_of(a) {
                Some(b) => dims[a].div_ceil(b).checked_mul(b)?,
                None => dims[a],
            };
            acc.checked_mul(padded)
        })
    }
}

fn check_order(order: &[usize]) -> Result<()> {
    let mut seen = [false; MAX_NDIMS];
    for &axis in order {
        if axis >= order.len() || seen[axis] {
            return Err(LayoutError::InvalidBlocking(format!(
                "axis order {:?} is not a permutation",
                order
            )));
        }
        seen[axis] = true;
    }
    Ok(())
}

fn check_block(ndims: usize, b: BlockedAxis) -> Result<()> {
    if b.axis >= ndims {
        return Err(LayoutError::InvalidBlocking(format!(
            "blocked axis {} out of range for rank {}",
            b.axis, ndims
        )));
    }
    if !BLOCK_SIZES.contains(&b.block) {
        return Err(LayoutError::InvalidBlocking(format!(
            "unsupported block size {}",
            b.block
        )));
    }
    Ok(())
}

fn check_distinct(a: BlockedAxis, b: BlockedAxis) -> Result<()> {
    if a.axis == b.axis {
        return Err(LayoutError::InvalidBlocking(format!(
            "axis {} blocked twice",
            a.axis
        )));
    }
    Ok(())
}
