//! Per-channel stop policy.

use crate::regs::STOP_POLICY;

/// What a channel does with traffic from the link while its TX datapath
/// is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopPolicy {
    /// Drop all packets from Aurora until the datapath starts.
    #[default]
    Drop,
    /// Hold packets back until the datapath starts.
    Buffer,
}

impl StopPolicy {
    /// Decode a `CHAN_STOP_POLICY` word.
    #[must_use]
    pub const fn decode(raw: u32) -> Self {
        if STOP_POLICY.is_set(raw) {
            Self::Buffer
        } else {
            Self::Drop
        }
    }

    /// Encode as a `CHAN_STOP_POLICY` word.
    #[must_use]
    pub const fn encode(self) -> u32 {
        match self {
            Self::Drop => 0,
            Self::Buffer => STOP_POLICY.strobe(),
        }
    }
}

impl std::fmt::Display for StopPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Buffer => write!(f, "buffer"),
        }
    }
}

impl std::str::FromStr for StopPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "buffer" => Ok(Self::Buffer),
            other => Err(format!("unknown stop policy '{other}' (expected drop|buffer)")),
        }
    }
}
