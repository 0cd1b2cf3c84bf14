use lr_layout::{DType, LayoutDesc};

use crate::element::{Element, Value};
use crate::error::{ReorderError, Result};

/// Caller-owned, contiguous tensor storage, one variant per element type.
///
/// A buffer for a layout holds `physical_size()` slots; padding slots are
/// part of the buffer but never read or written by a reorder.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    F32(Vec<f32>),
    S32(Vec<i32>),
    S16(Vec<i16>),
    S8(Vec<i8>),
}

impl Buffer {
    /// Number of element slots in this buffer.
    pub fn len(&self) -> usize {
        match self {
            Buffer::F32(v) => v.len(),
            Buffer::S32(v) => v.len(),
            Buffer::S16(v) => v.len(),
            Buffer::S8(v) => v.len(),
        }
    }

    /// Returns true if the buffer holds no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element type of this buffer.
    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::S32(_) => DType::S32,
            Buffer::S16(_) => DType::S16,
            Buffer::S8(_) => DType::S8,
        }
    }

    /// Create zero-filled storage for `n` slots of `dtype`.
    pub fn zeros(dtype: DType, n: usize) -> Self {
        match dtype {
            DType::F32 => Buffer::F32(vec![0.0; n]),
            DType::S32 => Buffer::S32(vec![0; n]),
            DType::S16 => Buffer::S16(vec![0; n]),
            DType::S8 => Buffer::S8(vec![0; n]),
        }
    }

    /// Zero-filled storage sized for every slot of `layout`.
    pub fn for_layout(layout: &LayoutDesc) -> Self {
        Buffer::zeros(layout.dtype(), layout.physical_size())
    }

    /// Typed view of the elements.
    ///
    /// # Errors
    /// Returns `DTypeMismatch` if the buffer does not hold `T`.
    pub fn as_slice<T: Element>(&self) -> Result<&[T]> {
        T::slice(self).ok_or_else(|| ReorderError::DTypeMismatch {
            expected: T::DTYPE.to_string(),
            got: self.dtype().to_string(),
        })
    }

    /// Typed mutable view of the elements.
    ///
    /// # Errors
    /// Returns `DTypeMismatch` if the buffer does not hold `T`.
    pub fn as_mut_slice<T: Element>(&mut self) -> Result<&mut [T]> {
        let got = self.dtype().to_string();
        T::slice_mut(self).ok_or(ReorderError::DTypeMismatch {
            expected: T::DTYPE.to_string(),
            got,
        })
    }

    /// The element at physical slot `offset`.
    pub fn get(&self, offset: usize) -> Option<Value> {
        match self {
            Buffer::F32(v) => v.get(offset).copied().map(Value::F32),
            Buffer::S32(v) => v.get(offset).copied().map(Value::S32),
            Buffer::S16(v) => v.get(offset).copied().map(Value::S16),
            Buffer::S8(v) => v.get(offset).copied().map(Value::S8),
        }
    }
}

impl From<Vec<f32>> for Buffer {
    fn from(v: Vec<f32>) -> Self {
        Buffer::F32(v)
    }
}

impl From<Vec<i32>> for Buffer {
    fn from(v: Vec<i32>) -> Self {
        Buffer::S32(v)
    }
}

impl From<Vec<i16>> for Buffer {
    fn from(v: Vec<i16>) -> Self {
        Buffer::S16(v)
    }
}

impl From<Vec<i8>> for Buffer {
    fn from(v: Vec<i8>) -> Self {
        Buffer::S8(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lr_layout::FormatTag;

    #[test]
    fn test_from_vec() {
        let b = Buffer::from(vec![1.0f32, 2.0, 3.0]);
        assert_eq!(b.len(), 3);
        assert!(!b.is_empty());
        assert_eq!(b.dtype(), DType::F32);
        assert_eq!(b.as_slice::<f32>().unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(Buffer::from(vec![1i8]).dtype(), DType::S8);
    }

    #[test]
    fn test_zeros() {
        let b = Buffer::zeros(DType::S16, 5);
        assert_eq!(b.len(), 5);
        assert_eq!(b.as_slice::<i16>().unwrap(), &[0; 5]);
    }

    #[test]
    fn test_wrong_type_view() {
        let mut b = Buffer::zeros(DType::S32, 2);
        assert!(matches!(
            b.as_slice::<f32>(),
            Err(ReorderError::DTypeMismatch { .. })
        ));
        assert!(b.as_mut_slice::<i8>().is_err());
    }

    #[test]
    fn test_for_layout_includes_padding() {
        let l = LayoutDesc::new([1, 20, 2, 2], DType::S8, FormatTag::NChw16c).unwrap();
        assert_eq!(Buffer::for_layout(&l).len(), 32 * 4);
    }

    #[test]
    fn test_get_and_mut_slice() {
        let mut b = Buffer::zeros(DType::S32, 3);
        b.as_mut_slice::<i32>().unwrap()[1] = 42;
        assert_eq!(b.get(1), Some(Value::S32(42)));
        assert_eq!(b.get(3), None);
    }
}
