//! Channel address mapper.
//!
//! Channel `n` owns the region `[(n + 1) * CHANNEL_STRIDE, (n + 2) * CHANNEL_STRIDE)`.
//! Region 0 is reserved for the core registers.

use crate::regs::CHANNEL_STRIDE;

/// Absolute address of per-channel register `offset` for `channel`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn register_address(channel: usize, offset: u32) -> u32 {
    offset + (channel as u32 + 1) * CHANNEL_STRIDE
}

/// Split an absolute address into `(channel, offset)`.
///
/// Returns `None` for core-level addresses.
#[must_use]
pub const fn split_address(addr: u32) -> Option<(usize, u32)> {
    if addr < CHANNEL_STRIDE {
        return None;
    }
    let region = addr / CHANNEL_STRIDE;
    Some(((region - 1) as usize, addr & (CHANNEL_STRIDE - 1)))
}
