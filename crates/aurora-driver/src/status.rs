//! Link status and counters
//!
//! Every status query performs exactly one read of the status register and
//! decodes all fields from it. Nothing is cached: the per-lane views
//! re-read the register on every call.

use crate::block::AuroraBlock;
use crate::channel::check_channel;
use crate::error::Result;
use aurora_chip::regs;
use aurora_chip::status::CoreStatus;

/// The four hardware counters, read back to back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    /// Packets received (Aurora to RFNoC)
    pub rx_packets: u32,
    /// Packets transmitted (RFNoC to Aurora)
    pub tx_packets: u32,
    /// Data words dropped for lack of buffer space
    pub overflows: u32,
    /// Packets dropped on CRC error
    pub crc_errors: u32,
}

impl AuroraBlock {
    /// Core status snapshot
    ///
    /// # Errors
    ///
    /// Returns error if the status register cannot be read.
    pub fn get_status(&mut self) -> Result<CoreStatus> {
        let raw = self.peek32(regs::CORE_STATUS)?;
        Ok(CoreStatus::decode(raw))
    }

    /// Link (channel) up flag
    ///
    /// # Errors
    ///
    /// Returns error if the status register cannot be read.
    pub fn get_link_status(&mut self) -> Result<bool> {
        Ok(self.get_status()?.link_status)
    }

    /// Lane status for `channel`
    ///
    /// # Errors
    ///
    /// Returns error if `channel` is out of range or the status register
    /// cannot be read.
    pub fn get_lane_status(&mut self, channel: usize) -> Result<bool> {
        check_channel(channel, self.num_channels())?;
        let status = self.get_status()?;
        Ok(status.lane_status.get(channel).copied().unwrap_or(false))
    }

    /// Lane status for every channel, one status read per channel
    ///
    /// # Errors
    ///
    /// Returns error if the status register cannot be read.
    pub fn get_lane_status_all(&mut self) -> Result<Vec<bool>> {
        (0..self.num_channels())
            .map(|channel| self.get_lane_status(channel))
            .collect()
    }

    /// Packets received from the Aurora link
    ///
    /// # Errors
    ///
    /// Returns error if the counter cannot be read.
    pub fn get_rx_packet_counter(&mut self) -> Result<u32> {
        self.peek32(regs::RX_PKT_CTR)
    }

    /// Packets transmitted over the Aurora link
    ///
    /// # Errors
    ///
    /// Returns error if the counter cannot be read.
    pub fn get_tx_packet_counter(&mut self) -> Result<u32> {
        self.peek32(regs::TX_PKT_CTR)
    }

    /// Data words from the link dropped for lack of buffer space
    ///
    /// With flow control enabled this should stay at zero.
    ///
    /// # Errors
    ///
    /// Returns error if the counter cannot be read.
    pub fn get_overflow_counter(&mut self) -> Result<u32> {
        self.peek32(regs::OVERFLOW_CTR)
    }

    /// Packets dropped because of CRC errors
    ///
    /// # Errors
    ///
    /// Returns error if the counter cannot be read.
    pub fn get_crc_error_counter(&mut self) -> Result<u32> {
        self.peek32(regs::CRC_ERR_CTR)
    }

    /// All four counters
    ///
    /// # Errors
    ///
    /// Returns error if any counter cannot be read.
    pub fn get_counters(&mut self) -> Result<Counters> {
        Ok(Counters {
            rx_packets: self.get_rx_packet_counter()?,
            tx_packets: self.get_tx_packet_counter()?,
            overflows: self.get_overflow_counter()?,
            crc_errors: self.get_crc_error_counter()?,
        })
    }
}
