//! Channel selection for operations that can fan out

use crate::error::{AuroraError, Result};

/// Target of a per-channel operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSelect {
    /// One channel by index
    Single(usize),
    /// Every channel, in ascending index order
    #[default]
    All,
}

impl ChannelSelect {
    /// Channel indices this selection covers
    ///
    /// # Errors
    ///
    /// Returns [`AuroraError::InvalidChannel`] if a single channel is out of
    /// range.
    pub fn resolve(self, num_channels: usize) -> Result<std::ops::Range<usize>> {
        match self {
            Self::All => Ok(0..num_channels),
            Self::Single(channel) => {
                check_channel(channel, num_channels)?;
                Ok(channel..channel + 1)
            }
        }
    }
}

impl From<usize> for ChannelSelect {
    fn from(channel: usize) -> Self {
        Self::Single(channel)
    }
}

impl From<Option<usize>> for ChannelSelect {
    fn from(channel: Option<usize>) -> Self {
        channel.map_or(Self::All, Self::Single)
    }
}

impl std::fmt::Display for ChannelSelect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(channel) => write!(f, "channel {channel}"),
            Self::All => write!(f, "all channels"),
        }
    }
}

/// Validate a channel index against the configured channel count
pub(crate) fn check_channel(channel: usize, num_channels: usize) -> Result<()> {
    if channel >= num_channels {
        return Err(AuroraError::invalid_channel(channel, num_channels));
    }
    Ok(())
}
