use std::fmt;
use std::str::FromStr;

use crate::error::LayoutError;

/// Element types a layout can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating point.
    F32,
    /// 32-bit signed integer.
    S32,
    /// 16-bit signed integer.
    S16,
    /// 8-bit signed integer.
    S8,
}

impl DType {
    pub const ALL: [DType; 4] = [DType::F32, DType::S32, DType::S16, DType::S8];

    /// Returns the size in bytes of a single element.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F32 | DType::S32 => 4,
            DType::S16 => 2,
            DType::S8 => 1,
        }
    }

    /// Short lowercase name, as used in format listings (`f32`, `s8`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::S32 => "s32",
            DType::S16 => "s16",
            DType::S8 => "s8",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DType {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DType::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| LayoutError::UnknownDType(s.to_string()))
    }
}
