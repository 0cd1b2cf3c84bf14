use lr_layout::LayoutDesc;

use crate::error::{ReorderError, Result};

/// Check that `src` and `dst` describe the same logical tensor.
///
/// Shapes must match exactly and contain no zero-sized axis; an empty tensor
/// is a caller error rather than a no-op. Returns the shared logical size.
pub fn validate(src: &LayoutDesc, dst: &LayoutDesc) -> Result<usize> {
    if src.dims() != dst.dims() {
        return Err(ReorderError::ShapeMismatch {
            src: src.dims().to_vec(),
            dst: dst.dims().to_vec(),
        });
    }
    if src.is_degenerate() {
        return Err(ReorderError::ZeroSizedAxis(src.dims().to_vec()));
    }
    Ok(src.logical_size())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lr_layout::{DType, FormatTag};

    fn layout(dims: &[usize], tag: FormatTag) -> LayoutDesc {
        LayoutDesc::new(dims, DType::F32, tag).unwrap()
    }

    #[test]
    fn test_same_shape_any_format() {
        let src = layout(&[2, 32, 4, 4], FormatTag::Nchw);
        let dst = layout(&[2, 32, 4, 4], FormatTag::NChw8c);
        assert_eq!(validate(&src, &dst).unwrap(), 1024);
    }

    #[test]
    fn test_no_implicit_reshape() {
        let src = layout(&[2, 32, 4, 4], FormatTag::Nchw);
        let dst = layout(&[2, 4, 4, 32], FormatTag::Nchw);
        assert_eq!(
            validate(&src, &dst),
            Err(ReorderError::ShapeMismatch {
                src: vec![2, 32, 4, 4],
                dst: vec![2, 4, 4, 32],
            })
        );
    }

    #[test]
    fn test_zero_axis_rejected() {
        for dims in [[0, 16, 8, 8], [32, 0, 3, 3], [32, 32, 0, 3], [32, 32, 3, 0]] {
            let src = layout(&dims, FormatTag::OIhw8o8i);
            let dst = layout(&dims, FormatTag::Oihw);
            assert_eq!(
                validate(&src, &dst),
                Err(ReorderError::ZeroSizedAxis(dims.to_vec()))
            );
        }
    }

    #[test]
    fn test_rank_mismatch() {
        let src = layout(&[2, 32, 32, 3, 3], FormatTag::Goihw);
        let dst = layout(&[32, 32, 3, 3], FormatTag::Oihw);
        assert!(matches!(
            validate(&src, &dst),
            Err(ReorderError::ShapeMismatch { .. })
        ));
    }
}
