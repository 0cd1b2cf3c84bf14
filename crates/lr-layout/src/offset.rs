//! Logical coordinate to physical offset mapping.
//!
//! One rule per [`Scheme`] family. All rules build the offset the same way:
//! walk the physical axes from outermost to innermost and accumulate
//! `offset = offset * extent + coordinate`, where blocked axes contribute
//! their block index in the outer walk and their in-block offset at the end.

use crate::scheme::{BlockedAxis, Scheme};
use crate::shape::Shape;

/// Physical offset of the logical element at `coords`.
///
/// `dims` is the logical shape the scheme is applied to and `coords` must be
/// in bounds for it. The result is always below `scheme.physical_size(dims)`.
pub fn offset_of_coords(scheme: &Scheme, dims: &[usize], coords: &[usize]) -> usize {
    match scheme {
        Scheme::Dense { order } => outer_offset(order, dims, coords, &[]),
        Scheme::Blocked { order, axis, block } => {
            let b = BlockedAxis::new(*axis, *block);
            let outer = outer_offset(order, dims, coords, &[b]);
            outer * block + coords[*axis] % block
        }
        Scheme::DualBlocked {
            order,
            first,
            second,
        } => {
            let outer = outer_offset(order, dims, coords, &[*first, *second]);
            let off = outer * first.block + coords[first.axis] % first.block;
            off * second.block + coords[second.axis] % second.block
        }
        Scheme::Interleaved {
            order,
            split,
            other,
            k,
        } => {
            let outer = outer_offset(order, dims, coords, &[*split, *other]);
            let inner = coords[split.axis] % split.block;
            let off = outer * (split.block / k) + inner / k;
            let off = off * other.block + coords[other.axis] % other.block;
            off * k + inner % k
        }
        Scheme::Grouped { group_block, inner } => {
            let rest_dims = &dims[1..];
            let rest = offset_of_coords(inner, rest_dims, &coords[1..]);
            let inner_size = inner.physical_size(rest_dims);
            let g = coords[0];
            match group_block {
                None => g * inner_size + rest,
                Some(b) => ((g / b) * inner_size + rest) * b + g % b,
            }
        }
    }
}

/// Physical offset of the `index`-th element in row-major logical order.
///
/// # Panics
/// Panics if the shape is degenerate.
pub fn offset_of(scheme: &Scheme, shape: &Shape, index: usize) -> usize {
    let coords = shape.unravel(index);
    offset_of_coords(scheme, shape.dims(), &coords[..shape.ndim()])
}

/// Row-major walk over `order`; axes listed in `blocked` contribute their
/// block index instead of their coordinate.
fn outer_offset(
    order: &[usize],
    dims: &[usize],
    coords: &[usize],
    blocked: &[BlockedAxis],
) -> usize {
    order.iter().fold(0, |acc, &axis| {
        match blocked.iter().find(|b| b.axis == axis) {
            Some(b) => acc * dims[axis].div_ceil(b.block) + coords[axis] / b.block,
            None => acc * dims[axis] + coords[axis],
        }
    })
}
