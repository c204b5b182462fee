//! Core configuration word.

use crate::regs::config::{NUM_CHANNELS, NUM_CORES};

/// Synthesis-time configuration of the core, read once at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreConfig {
    /// Number of Aurora cores.
    pub num_cores: usize,
    /// Number of channels multiplexed over the link.
    pub num_channels: usize,
}

impl CoreConfig {
    /// Decode a raw `CORE_CONFIG` word.
    #[must_use]
    pub const fn decode(raw: u32) -> Self {
        Self {
            num_cores: NUM_CORES.get(raw) as usize,
            num_channels: NUM_CHANNELS.get(raw) as usize,
        }
    }

    /// Encode as a raw `CORE_CONFIG` word (fields wider than 8 bits are truncated).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn encode(self) -> u32 {
        NUM_CORES.encode(self.num_cores as u32) | NUM_CHANNELS.encode(self.num_channels as u32)
    }
}
