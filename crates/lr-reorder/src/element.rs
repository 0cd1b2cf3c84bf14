//! Element conversion between the supported numeric types.
//!
//! Policy:
//! - same type: identity, bit for bit
//! - integer to integer: widening is exact, narrowing saturates
//! - integer to f32: nearest representable float
//! - f32 to integer: round per [`RoundMode`], then saturate; NaN becomes 0

use std::fmt::Debug;

use lr_layout::DType;

use crate::buffer::Buffer;
use crate::config::RoundMode;

/// Intermediate form every element widens to before narrowing to the
/// destination. Every supported integer fits `i32` exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Float(f32),
    Int(i32),
}

/// A Rust type that can live in a reorder buffer.
pub trait Element: Copy + Send + Sync + PartialEq + Debug + 'static {
    const DTYPE: DType;

    fn to_scalar(self) -> Scalar;

    fn from_f32(x: f32, mode: RoundMode) -> Self;

    fn from_i32(x: i32) -> Self;

    /// The buffer's elements, if it holds this type.
    fn slice(buf: &Buffer) -> Option<&[Self]>;

    fn slice_mut(buf: &mut Buffer) -> Option<&mut [Self]>;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn to_scalar(self) -> Scalar {
        Scalar::Float(self)
    }

    fn from_f32(x: f32, _mode: RoundMode) -> Self {
        x
    }

    fn from_i32(x: i32) -> Self {
        x as f32
    }

    fn slice(buf: &Buffer) -> Option<&[Self]> {
        match buf {
            Buffer::F32(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    fn slice_mut(buf: &mut Buffer) -> Option<&mut [Self]> {
        match buf {
            Buffer::F32(v) => Some(v.as_mut_slice()),
            _ => None,
        }
    }
}

macro_rules! int_element {
    ($t:ty, $dtype:ident) => {
        impl Element for $t {
            const DTYPE: DType = DType::$dtype;

            fn to_scalar(self) -> Scalar {
                Scalar::Int(i32::from(self))
            }

            fn from_f32(x: f32, mode: RoundMode) -> Self {
                // float-to-int `as` saturates and maps NaN to 0
                mode.apply(x) as $t
            }

            fn from_i32(x: i32) -> Self {
                x.clamp(<$t>::MIN as i32, <$t>::MAX as i32) as $t
            }

            fn slice(buf: &Buffer) -> Option<&[Self]> {
                match buf {
                    Buffer::$dtype(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            fn slice_mut(buf: &mut Buffer) -> Option<&mut [Self]> {
                match buf {
                    Buffer::$dtype(v) => Some(v.as_mut_slice()),
                    _ => None,
                }
            }
        }
    };
}

int_element!(i32, S32);
int_element!(i16, S16);
int_element!(i8, S8);

/// Convert one element from `S` to `D`.
#[inline]
pub fn convert<S: Element, D: Element>(value: S, mode: RoundMode) -> D {
    from_scalar(value.to_scalar(), mode)
}

#[inline]
fn from_scalar<D: Element>(s: Scalar, mode: RoundMode) -> D {
    match s {
        Scalar::Float(x) => D::from_f32(x, mode),
        Scalar::Int(x) => D::from_i32(x),
    }
}

/// A single element tagged with its runtime type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    F32(f32),
    S32(i32),
    S16(i16),
    S8(i8),
}

impl Value {
    pub fn dtype(&self) -> DType {
        match self {
            Value::F32(_) => DType::F32,
            Value::S32(_) => DType::S32,
            Value::S16(_) => DType::S16,
            Value::S8(_) => DType::S8,
        }
    }

    fn scalar(&self) -> Scalar {
        match *self {
            Value::F32(x) => x.to_scalar(),
            Value::S32(x) => x.to_scalar(),
            Value::S16(x) => x.to_scalar(),
            Value::S8(x) => x.to_scalar(),
        }
    }

    /// Convert to `dst` with the same policy the reorder executor uses.
    pub fn convert_to(&self, dst: DType, mode: RoundMode) -> Value {
        let s = self.scalar();
        match dst {
            DType::F32 => Value::F32(from_scalar(s, mode)),
            DType::S32 => Value::S32(from_scalar(s, mode)),
            DType::S16 => Value::S16(from_scalar(s, mode)),
            DType::S8 => Value::S8(from_scalar(s, mode)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NEAREST: RoundMode = RoundMode::Nearest;

    #[test]
    fn test_same_type_is_identity() {
        let nan = f32::from_bits(0x7fc0_1234);
        let back: f32 = convert(nan, NEAREST);
        assert_eq!(back.to_bits(), nan.to_bits());
        assert_eq!(convert::<f32, f32>(-0.0, NEAREST).to_bits(), (-0.0f32).to_bits());
        assert_eq!(convert::<i32, i32>(i32::MIN, NEAREST), i32::MIN);
        assert_eq!(convert::<i16, i16>(-12345, NEAREST), -12345);
        assert_eq!(convert::<i8, i8>(-128, NEAREST), -128);
    }

    #[test]
    fn test_widening_is_exact() {
        assert_eq!(convert::<i8, i32>(-128, NEAREST), -128);
        assert_eq!(convert::<i16, i32>(i16::MAX, NEAREST), 32767);
        assert_eq!(convert::<i8, i16>(127, NEAREST), 127);
        assert_eq!(convert::<i16, f32>(-300, NEAREST), -300.0);
    }

    #[test]
    fn test_integer_narrowing_saturates() {
        assert_eq!(convert::<i32, i8>(300, NEAREST), 127);
        assert_eq!(convert::<i32, i8>(-300, NEAREST), -128);
        assert_eq!(convert::<i32, i16>(70_000, NEAREST), i16::MAX);
        assert_eq!(convert::<i16, i8>(-129, NEAREST), i8::MIN);
        assert_eq!(convert::<i16, i8>(42, NEAREST), 42);
    }

    #[test]
    fn test_float_to_int_rounds_then_saturates() {
        assert_eq!(convert::<f32, i32>(2.5, NEAREST), 2);
        assert_eq!(convert::<f32, i32>(2.5, RoundMode::Down), 2);
        assert_eq!(convert::<f32, i32>(-2.5, RoundMode::Down), -3);
        assert_eq!(convert::<f32, i8>(126.7, NEAREST), 127);
        assert_eq!(convert::<f32, i8>(1.0e6, NEAREST), 127);
        assert_eq!(convert::<f32, i16>(-1.0e9, NEAREST), i16::MIN);
        assert_eq!(convert::<f32, i32>(f32::INFINITY, NEAREST), i32::MAX);
        assert_eq!(convert::<f32, i32>(f32::NAN, NEAREST), 0);
    }

    #[test]
    fn test_large_int_to_float_rounds() {
        let f: f32 = convert(16_777_217i32, NEAREST);
        assert_relative_eq!(f, 16_777_216.0);
    }

    #[test]
    fn test_value_convert_to() {
        let v = Value::S32(-40_000);
        assert_eq!(v.convert_to(DType::S16, NEAREST), Value::S16(i16::MIN));
        assert_eq!(v.convert_to(DType::F32, NEAREST), Value::F32(-40_000.0));
        assert_eq!(Value::F32(3.5).convert_to(DType::S8, NEAREST), Value::S8(4));
        assert_eq!(Value::S8(7).convert_to(DType::S8, NEAREST).dtype(), DType::S8);
    }
}
