//! Error types for Aurora block operations

use thiserror::Error;

/// Result type alias for Aurora operations
pub type Result<T> = std::result::Result<T, AuroraError>;

/// Errors that can occur while controlling an Aurora core
#[derive(Debug, Error)]
pub enum AuroraError {
    /// Channel index outside `[0, num_channels)`
    #[error("channel {channel} is invalid, Aurora block has only {num_channels} channels")]
    InvalidChannel {
        /// Requested channel
        channel: usize,
        /// Number of channels the core was synthesized with
        num_channels: usize,
    },

    /// Pause count in the range the core does not accept
    #[error("invalid pause count {value} (must be 0 or >= 10)")]
    InvalidPauseCount {
        /// Rejected value
        value: u8,
    },

    /// FPGA image is not compatible with this driver
    #[error("compat mismatch: driver expects major {expected_major}, hardware reports {found_major}.{found_minor}")]
    CompatMismatch {
        /// Major compat number the driver was written for
        expected_major: u16,
        /// Major compat number reported by hardware
        found_major: u16,
        /// Minor compat number reported by hardware
        found_minor: u16,
    },

    /// Hardware configuration the driver cannot work with
    #[error("invalid hardware configuration: {reason}")]
    InvalidConfig {
        /// Reason for failure
        reason: String,
    },

    /// Write attempted to a read-only register
    #[error("register {addr:#06x} is read-only")]
    ReadOnlyRegister {
        /// Absolute register address
        addr: u32,
    },

    /// Register access outside the mapped region
    #[error("out of bounds access: offset={offset:#x}, limit={limit:#x}")]
    OutOfBounds {
        /// Requested byte offset
        offset: usize,
        /// Size of the mapped region
        limit: usize,
    },

    /// I/O error while opening or mapping the register window
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Register transport failed
    #[error("register transfer failed: {reason}")]
    Transfer {
        /// Reason for failure
        reason: String,
    },

    /// Property key not in the property table
    #[error("unknown property '{key}'")]
    UnknownProperty {
        /// Requested key
        key: String,
    },

    /// Write attempted to a read-only property
    #[error("property '{key}' is read-only")]
    ReadOnlyProperty {
        /// Property key
        key: String,
    },

    /// Value of the wrong scalar type for a property
    #[error("property '{key}' expects a {expected} value")]
    PropertyType {
        /// Property key
        key: String,
        /// Expected scalar type
        expected: &'static str,
    },
}

impl AuroraError {
    /// Create an invalid channel error
    pub const fn invalid_channel(channel: usize, num_channels: usize) -> Self {
        Self::InvalidChannel {
            channel,
            num_channels,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a transfer failed error
    pub fn transfer(reason: impl Into<String>) -> Self {
        Self::Transfer {
            reason: reason.into(),
        }
    }

    /// Create an unknown property error
    pub fn unknown_property(key: impl Into<String>) -> Self {
        Self::UnknownProperty { key: key.into() }
    }

    /// True for errors caused by the caller's arguments (nothing was touched)
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidChannel { .. }
                | Self::InvalidPauseCount { .. }
                | Self::UnknownProperty { .. }
                | Self::ReadOnlyProperty { .. }
                | Self::PropertyType { .. }
        )
    }
}
