//! Register map of the Aurora link core.
//!
//! ```text
//! 0x000 ┬ core registers (compat, config, status, reset, NFC, counters)
//!       │
//! 0x040 ┼ channel 0 region  (TX control, start timestamp, stop policy,
//! 0x080 ┼ channel 1 region   timestamp queue status/control)
//!  ...  │
//! ```
//!
//! Core-level registers live below the first channel region. Channel `n`
//! starts at `(n + 1) * CHANNEL_STRIDE`; see [`crate::channel`].

use crate::field::Field;

/// Address decode width of one channel region (`AURORA_CHAN_ADDR_W`).
pub const CHANNEL_ADDR_WIDTH: u32 = 6;

/// Size of one channel register region.
pub const CHANNEL_STRIDE: u32 = 1 << CHANNEL_ADDR_WIDTH;

/// Size of the whole core register space (`AURORA_CORE_ADDR_W`).
pub const CORE_REGION_SIZE: u32 = 1 << 11;

// ── Core registers ───────────────────────────────────────────────────────────

/// Compat number, `major[16:32) minor[0:16)`. Read-only.
pub const COMPAT: u32 = 0x00;
/// Core configuration (core and channel counts). Read-only.
pub const CORE_CONFIG: u32 = 0x04;
/// Core status snapshot. Read-only.
pub const CORE_STATUS: u32 = 0x08;
/// Core reset strobes. Write-only.
pub const CORE_RESET: u32 = 0x0C;
/// Native flow control pause count.
pub const FC_PAUSE: u32 = 0x10;
/// Native flow control pause/resume thresholds (shared register).
pub const FC_THRESHOLD: u32 = 0x14;
/// Transmitted packet counter (RFNoC to Aurora). Read-only.
pub const TX_PKT_CTR: u32 = 0x18;
/// Received packet counter (Aurora to RFNoC). Read-only.
pub const RX_PKT_CTR: u32 = 0x1C;
/// Words dropped for lack of buffer space. Read-only.
pub const OVERFLOW_CTR: u32 = 0x20;
/// Packets dropped on CRC error. Read-only.
pub const CRC_ERR_CTR: u32 = 0x24;

// ── Per-channel registers (offsets inside a channel region) ──────────────────

/// TX datapath start/stop strobes. Write-only.
pub const CHAN_TX_CTRL: u32 = 0x00;
/// Start timestamp, low word. Write-only.
pub const CHAN_TS_LOW: u32 = 0x04;
/// Start timestamp, high word. Write-only.
pub const CHAN_TS_HIGH: u32 = 0x08;
/// Stop policy (0 = drop, 1 = buffer).
pub const CHAN_STOP_POLICY: u32 = 0x0C;
/// Timestamp queue fullness and capacity. Read-only.
pub const CHAN_TS_QUEUE_STS: u32 = 0x10;
/// Timestamp queue reset strobe. Write-only.
pub const CHAN_TS_QUEUE_CTRL: u32 = 0x14;

// ── Field definitions ────────────────────────────────────────────────────────

/// `CORE_CONFIG` fields.
pub mod config {
    use super::Field;

    /// Number of Aurora cores.
    pub const NUM_CORES: Field = Field::new(0, 8);
    /// Number of channels multiplexed over the link.
    pub const NUM_CHANNELS: Field = Field::new(16, 8);
}

/// `CORE_STATUS` fields.
pub mod status {
    use super::Field;

    /// Number of lane status bits.
    pub const LANE_COUNT: usize = 4;
    /// Per-lane up flags, lane `n` at bit `n`.
    pub const LANES: Field = Field::new(0, 4);
    /// Channel (link) up.
    pub const LINK: Field = Field::bit(4);
    /// Aurora hard error.
    pub const HARD_ERR: Field = Field::bit(8);
    /// Aurora soft error.
    pub const SOFT_ERR: Field = Field::bit(9);
    /// MMCM locked.
    pub const MMCM_LOCK: Field = Field::bit(12);
    /// GT PLL locked.
    pub const PLL_LOCK: Field = Field::bit(13);
}

/// `CORE_RESET` strobes.
pub mod reset {
    use super::Field;

    /// Reset the Aurora IP.
    pub const AURORA: Field = Field::bit(0);
    /// Reset the TX datapath (Aurora to RFNoC).
    pub const TX_DATAPATH: Field = Field::bit(1);
    /// Reset the RX datapath (RFNoC to Aurora).
    pub const RX_DATAPATH: Field = Field::bit(2);

    /// Word written for a full core reset.
    pub const ALL: u32 = AURORA.strobe() | TX_DATAPATH.strobe() | RX_DATAPATH.strobe();
}

/// Native flow control fields.
pub mod fc {
    use super::Field;

    /// `FC_PAUSE`: pause count in cycles.
    pub const PAUSE_COUNT: Field = Field::new(0, 8);
    /// `FC_THRESHOLD`: XOFF threshold.
    pub const PAUSE_THRESHOLD: Field = Field::new(0, 8);
    /// `FC_THRESHOLD`: XON threshold.
    pub const RESUME_THRESHOLD: Field = Field::new(16, 8);

    /// Smallest non-zero pause count the core accepts.
    pub const MIN_PAUSE_COUNT: u8 = 10;
}

/// `CHAN_TX_CTRL` strobes.
pub mod tx_ctrl {
    use super::Field;

    /// Start the channel's TX datapath.
    pub const START: Field = Field::bit(0);
    /// Stop the channel's TX datapath.
    pub const STOP: Field = Field::bit(1);
}

/// Timestamp queue fields.
pub mod ts_queue {
    use super::Field;

    /// `CHAN_TS_QUEUE_STS`: number of queued timestamps.
    pub const FULLNESS: Field = Field::new(0, 16);
    /// `CHAN_TS_QUEUE_STS`: queue capacity.
    pub const CAPACITY: Field = Field::new(16, 16);
    /// `CHAN_TS_QUEUE_CTRL`: flush the queue.
    pub const RESET: Field = Field::bit(0);
}

/// `CHAN_STOP_POLICY` field.
pub const STOP_POLICY: Field = Field::bit(0);

// ── Access classes ───────────────────────────────────────────────────────────

/// How software may access a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Hardware-owned, writes are an error.
    ReadOnly,
    /// Strobe or latch, reads return nothing meaningful.
    WriteOnly,
    /// Plain storage.
    ReadWrite,
}

/// Access class of the register at absolute address `addr`.
#[must_use]
pub fn access(addr: u32) -> Access {
    match crate::channel::split_address(addr) {
        None => match addr {
            COMPAT | CORE_CONFIG | CORE_STATUS | TX_PKT_CTR | RX_PKT_CTR | OVERFLOW_CTR
            | CRC_ERR_CTR => Access::ReadOnly,
            CORE_RESET => Access::WriteOnly,
            _ => Access::ReadWrite,
        },
        Some((_, offset)) => match offset {
            CHAN_TS_QUEUE_STS => Access::ReadOnly,
            CHAN_TX_CTRL | CHAN_TS_LOW | CHAN_TS_HIGH | CHAN_TS_QUEUE_CTRL => {
                Access::WriteOnly
            }
            _ => Access::ReadWrite,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_registers_below_first_channel() {
        for addr in [
            COMPAT, CORE_CONFIG, CORE_STATUS, CORE_RESET, FC_PAUSE, FC_THRESHOLD,
            TX_PKT_CTR, RX_PKT_CTR, OVERFLOW_CTR, CRC_ERR_CTR,
        ] {
            assert!(addr < CHANNEL_STRIDE, "{addr:#x} overlaps channel 0");
        }
    }

    #[test]
    fn channel_registers_fit_stride() {
        assert!(CHAN_TS_QUEUE_CTRL + 4 <= CHANNEL_STRIDE);
        assert!(CHANNEL_STRIDE.is_power_of_two());
    }

    #[test]
    fn reset_all_sets_three_strobes() {
        assert_eq!(reset::ALL, 0b111);
        assert_eq!(reset::TX_DATAPATH.strobe(), 0b010);
    }

    #[test]
    fn access_classes() {
        assert_eq!(access(COMPAT), Access::ReadOnly);
        assert_eq!(access(CORE_RESET), Access::WriteOnly);
        assert_eq!(access(FC_THRESHOLD), Access::ReadWrite);
        assert_eq!(access(CHANNEL_STRIDE + CHAN_TS_QUEUE_STS), Access::ReadOnly);
        assert_eq!(access(2 * CHANNEL_STRIDE + CHAN_TS_HIGH), Access::WriteOnly);
        assert_eq!(access(3 * CHANNEL_STRIDE + CHAN_STOP_POLICY), Access::ReadWrite);
    }
}
