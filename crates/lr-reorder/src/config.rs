/// Rounding applied when a float is converted to an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundMode {
    /// Round to nearest, ties to even.
    #[default]
    Nearest,
    /// Round toward negative infinity.
    Down,
}

impl RoundMode {
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            RoundMode::Nearest => x.round_ties_even(),
            RoundMode::Down => x.floor(),
        }
    }
}

/// Parameters controlling a reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderConfig {
    pub round_mode: RoundMode,
    /// Logical elements per work chunk when a reorder is split up.
    /// Zero is treated as one.
    pub chunk_len: usize,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            round_mode: RoundMode::Nearest,
            chunk_len: 4096,
        }
    }
}

impl ReorderConfig {
    pub fn with_round_mode(mut self, round_mode: RoundMode) -> Self {
        self.round_mode = round_mode;
        self
    }

    pub fn with_chunk_len(mut self, chunk_len: usize) -> Self {
        self.chunk_len = chunk_len;
        self
    }

    pub(crate) fn effective_chunk_len(&self) -> usize {
        self.chunk_len.max(1)
    }
}
