use lr_layout::{DType, LayoutDesc};
use lr_reorder::{ReorderConfig, RoundMode};

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LRStatus {
    Success = 0,
    /// A layout descriptor is malformed (rank, format name, element width).
    InvalidShape = 1,
    /// The arguments do not form a valid reorder (shapes, buffers, pointers).
    InvalidArguments = 2,
    Internal = 3,
}

/// Element type selector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LRDataType {
    F32 = 0,
    S32 = 1,
    S16 = 2,
    S8 = 3,
}

impl From<LRDataType> for DType {
    fn from(t: LRDataType) -> Self {
        match t {
            LRDataType::F32 => DType::F32,
            LRDataType::S32 => DType::S32,
            LRDataType::S16 => DType::S16,
            LRDataType::S8 => DType::S8,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LRRoundMode {
    Nearest = 0,
    Down = 1,
}

/// Parameters controlling a reorder.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct LRReorderParams {
    pub round_mode: LRRoundMode,
    pub chunk_len: usize,
}

impl Default for LRReorderParams {
    fn default() -> Self {
        let config = ReorderConfig::default();
        Self {
            round_mode: match config.round_mode {
                RoundMode::Nearest => LRRoundMode::Nearest,
                RoundMode::Down => LRRoundMode::Down,
            },
            chunk_len: config.chunk_len,
        }
    }
}

impl From<&LRReorderParams> for ReorderConfig {
    fn from(p: &LRReorderParams) -> Self {
        let round_mode = match p.round_mode {
            LRRoundMode::Nearest => RoundMode::Nearest,
            LRRoundMode::Down => RoundMode::Down,
        };
        ReorderConfig::default()
            .with_round_mode(round_mode)
            .with_chunk_len(p.chunk_len)
    }
}

/// Opaque handle owning a layout descriptor.
pub struct LRLayout {
    pub desc: LayoutDesc,
}
