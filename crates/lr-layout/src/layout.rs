use std::fmt;

use crate::dtype::DType;
use crate::error::{LayoutError, Result};
use crate::format::FormatTag;
use crate::offset;
use crate::scheme::{Scheme, INTERLEAVE_LANE_BYTES};
use crate::shape::{Coords, Shape};

/// Immutable description of a tensor: logical shape, element type and the
/// physical storage scheme.
///
/// Shapes containing zero are accepted here; a reorder over such a layout is
/// rejected later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutDesc {
    shape: Shape,
    dtype: DType,
    tag: Option<FormatTag>,
    scheme: Scheme,
}

impl LayoutDesc {
    /// Describe a tensor stored in a named format.
    ///
    /// # Errors
    /// `InvalidShape` if the shape's rank differs from the format's,
    /// `SizeOverflow` if the padded size in bytes does not fit `usize`, and
    /// `UnsupportedDType` if the format's sub-interleave does not fit the
    /// element width.
    pub fn new(shape: impl Into<Shape>, dtype: DType, tag: FormatTag) -> Result<Self> {
        Self::build(shape.into(), dtype, Some(tag), tag.scheme())
    }

    /// Describe a tensor stored in an arbitrary scheme.
    ///
    /// # Errors
    /// As [`LayoutDesc::new`], plus `InvalidBlocking` for malformed schemes.
    pub fn with_scheme(shape: impl Into<Shape>, dtype: DType, scheme: Scheme) -> Result<Self> {
        scheme.validate()?;
        Self::build(shape.into(), dtype, None, scheme)
    }

    fn build(shape: Shape, dtype: DType, tag: Option<FormatTag>, scheme: Scheme) -> Result<Self> {
        let format = match tag {
            Some(t) => t.name().to_string(),
            None => scheme.family().to_string(),
        };
        if shape.ndim() != scheme.ndims() {
            return Err(LayoutError::InvalidShape {
                format,
                expected: scheme.ndims(),
                got: shape.dims().to_vec(),
            });
        }
        let bytes = scheme
            .checked_physical_size(shape.dims())
            .and_then(|n| n.checked_mul(dtype.size_in_bytes()));
        if bytes.is_none() {
            return Err(LayoutError::SizeOverflow {
                format,
                dims: shape.dims().to_vec(),
            });
        }
        if let Some(k) = scheme.interleave() {
            if k * dtype.size_in_bytes() != INTERLEAVE_LANE_BYTES {
                return Err(LayoutError::UnsupportedDType {
                    format,
                    dtype: dtype.to_string(),
                });
            }
        }
        Ok(LayoutDesc {
            shape,
            dtype,
            tag,
            scheme,
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// The named format, if the layout was built from one.
    pub fn tag(&self) -> Option<FormatTag> {
        self.tag
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Number of logical elements.
    pub fn logical_size(&self) -> usize {
        self.shape.numel()
    }

    /// Shape with every blocked axis rounded up to whole blocks.
    pub fn padded_dims(&self) -> Vec<usize> {
        self.scheme.padded_dims(self.shape.dims())
    }

    /// Number of storage slots, padding included.
    pub fn physical_size(&self) -> usize {
        self.scheme.physical_size(self.shape.dims())
    }

    /// Bytes needed to hold every storage slot.
    pub fn size_in_bytes(&self) -> usize {
        self.physical_size() * self.dtype.size_in_bytes()
    }

    /// True if any axis has size zero.
    pub fn is_degenerate(&self) -> bool {
        self.shape.is_degenerate()
    }

    /// Per-axis coordinates of a row-major logical index.
    pub fn coords_of(&self, index: usize) -> Coords {
        self.shape.unravel(index)
    }

    /// Physical offset of the `index`-th logical element (row-major).
    ///
    /// # Panics
    /// Panics on a degenerate layout.
    pub fn offset_of(&self, index: usize) -> usize {
        offset::offset_of(&self.scheme, &self.shape, index)
    }

    /// Physical offset of the element at `coords`.
    pub fn offset_of_coords(&self, coords: &[usize]) -> usize {
        offset::offset_of_coords(&self.scheme, self.shape.dims(), coords)
    }
}

impl fmt::Display for LayoutDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "{}:{}{}", tag, self.dtype, self.shape),
            None => write!(f, "{}:{}{}", self.scheme.family(), self.dtype, self.shape),
        }
    }
}

/// Build a layout descriptor from a named format.
pub fn build_layout(dims: &[usize], dtype: DType, tag: FormatTag) -> Result<LayoutDesc> {
    LayoutDesc::new(dims, dtype, tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::BlockedAxis;

    #[test]
    fn test_arity_mismatch() {
        let err = LayoutDesc::new([2, 32, 4], DType::F32, FormatTag::NChw8c).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidShape {
                format: "nChw8c".to_string(),
                expected: 4,
                got: vec![2, 32, 4],
            }
        );
        assert!(build_layout(&[2, 32, 32, 3, 3], DType::F32, FormatTag::Oihw).is_err());
        assert!(build_layout(&[32, 32, 3, 3], DType::F32, FormatTag::Goihw8g).is_err());
    }

    #[test]
    fn test_blocked_physical_size() {
        let l = build_layout(&[2, 32, 4, 4], DType::F32, FormatTag::NChw8c).unwrap();
        assert_eq!(l.logical_size(), 1024);
        assert_eq!(l.physical_size(), 2 * 4 * 4 * 4 * 8);
        assert_eq!(l.size_in_bytes(), 4096);

        let l = build_layout(&[2, 20, 4, 4], DType::S8, FormatTag::NChw16c).unwrap();
        assert_eq!(l.padded_dims(), vec![2, 32, 4, 4]);
        assert_eq!(l.logical_size(), 640);
        assert_eq!(l.physical_size(), 1024);
        assert_eq!(l.size_in_bytes(), 1024);
    }

    #[test]
    fn test_interleave_needs_matching_width() {
        assert!(build_layout(&[64, 64, 3, 3], DType::S16, FormatTag::OIhw8i16o2i).is_ok());
        assert!(build_layout(&[64, 64, 3, 3], DType::S8, FormatTag::OIhw4i16o4i).is_ok());
        assert!(build_layout(&[2, 64, 64, 3, 3], DType::S16, FormatTag::GOIhw8o16i2o).is_ok());

        let err = build_layout(&[64, 64, 3, 3], DType::F32, FormatTag::OIhw8i16o2i).unwrap_err();
        assert!(matches!(err, LayoutError::UnsupportedDType { .. }));
        assert!(build_layout(&[64, 64, 3, 3], DType::S16, FormatTag::OIhw4i16o4i).is_err());
        assert!(build_layout(&[2, 64, 64, 3, 3], DType::S32, FormatTag::GOIhw4i16o4i).is_err());
    }

    #[test]
    fn test_slot_count_overflow_rejected() {
        let err = build_layout(&[usize::MAX / 8, 9, 1, 1], DType::F32, FormatTag::NChw8c)
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::SizeOverflow {
                format: "nChw8c".to_string(),
                dims: vec![usize::MAX / 8, 9, 1, 1],
            }
        );
        assert!(matches!(
            build_layout(&[1, usize::MAX, 1, 1], DType::F32, FormatTag::NChw16c),
            Err(LayoutError::SizeOverflow { .. })
        ));
        assert!(matches!(
            build_layout(&[usize::MAX / 2, 3], DType::S8, FormatTag::Nc),
            Err(LayoutError::SizeOverflow { .. })
        ));
        // the slot count fits but the byte count does not
        assert!(matches!(
            build_layout(&[usize::MAX / 8, 8, 1, 1], DType::F32, FormatTag::NChw8c),
            Err(LayoutError::SizeOverflow { .. })
        ));
        let l = build_layout(&[usize::MAX / 8, 8, 1, 1], DType::S8, FormatTag::NChw8c).unwrap();
        assert_eq!(l.physical_size(), usize::MAX / 8 * 8);
        assert_eq!(l.size_in_bytes(), usize::MAX / 8 * 8);
    }

    #[test]
    fn test_degenerate_shape_is_describable() {
        let l = build_layout(&[0, 16, 8, 8], DType::F32, FormatTag::NChw8c).unwrap();
        assert!(l.is_degenerate());
        assert_eq!(l.logical_size(), 0);
        assert_eq!(l.physical_size(), 0);
    }

    #[test]
    fn test_custom_scheme() {
        // nhwc with the channel axis blocked by 16
        let scheme = Scheme::Blocked {
            order: vec![0, 2, 3, 1],
            axis: 1,
            block: 16,
        };
        let l = LayoutDesc::with_scheme([1, 20, 2, 2], DType::F32, scheme).unwrap();
        assert_eq!(l.tag(), None);
        assert_eq!(l.physical_size(), 4 * 32);
        assert_eq!(l.to_string(), "blocked:f32[1, 20, 2, 2]");

        let bad = Scheme::DualBlocked {
            order: vec![0, 1, 2, 3],
            first: BlockedAxis::new(0, 8),
            second: BlockedAxis::new(4, 8),
        };
        assert!(matches!(
            LayoutDesc::with_scheme([8, 8, 1, 1], DType::F32, bad),
            Err(LayoutError::InvalidBlocking(_))
        ));
    }

    #[test]
    fn test_offset_of_matches_coords() {
        let l = build_layout(&[2, 3, 4, 5], DType::F32, FormatTag::Nhwc).unwrap();
        let c = l.coords_of(37);
        assert_eq!(&c[..4], &[0, 1, 3, 2]);
        assert_eq!(l.offset_of(37), l.offset_of_coords(&c[..4]));
        assert_eq!(l.offset_of(37), ((3 * 5) + 2) * 3 + 1);
        assert_eq!(l.to_string(), "nhwc:f32[2, 3, 4, 5]");
    }

    fn fitting_dtype(tag: FormatTag) -> DType {
        match tag.scheme().interleave() {
            Some(2) => DType::S16,
            Some(_) => DType::S8,
            None => DType::F32,
        }
    }

    proptest::proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_every_tag_maps_injectively(
            tag in proptest::sample::select(FormatTag::ALL.to_vec()),
            dims in proptest::collection::vec(1usize..10, 5),
        ) {
            let dims = &dims[..tag.ndims()];
            let l = build_layout(dims, fitting_dtype(tag), tag).unwrap();
            let mut seen = std::collections::HashSet::new();
            for i in 0..l.logical_size() {
                let off = l.offset_of(i);
                proptest::prop_assert!(off < l.physical_size());
                proptest::prop_assert!(seen.insert(off));
            }
        }
    }
}
