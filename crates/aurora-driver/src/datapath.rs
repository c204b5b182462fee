//! Channel datapath control
//!
//! Operations taking a [`ChannelSelect`] validate the selection first and
//! then write channel by channel in ascending order. The fan-out is not
//! atomic: if a register write fails part way, the channels before it keep
//! the new setting and the error is returned.

use crate::block::AuroraBlock;
use crate::channel::{check_channel, ChannelSelect};
use crate::error::Result;
use aurora_chip::policy::StopPolicy;
use aurora_chip::regs::{self, ts_queue, tx_ctrl};
use tracing::{debug, warn};

/// Timestamp queue occupancy of one channel, decoded from one read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimestampQueueStatus {
    /// Timestamps currently queued
    pub fullness: u16,
    /// Timestamps the queue can hold
    pub capacity: u16,
}

impl std::fmt::Display for TimestampQueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.fullness, self.capacity)
    }
}

impl AuroraBlock {
    /// Start (`on`) or stop the TX datapath of the selected channels
    ///
    /// Stopping a single channel while the link keeps delivering traffic for
    /// it fills the hardware buffers if its stop policy is
    /// [`StopPolicy::Buffer`]. The write still goes through; only a warning
    /// is logged.
    ///
    /// # Errors
    ///
    /// Returns error if the channel is invalid or a register write fails.
    pub fn tx_datapath_enable(&mut self, on: bool, select: impl Into<ChannelSelect>) -> Result<()> {
        let select = select.into();
        let channels = select.resolve(self.num_channels())?;
        if let ChannelSelect::Single(channel) = select {
            warn!(
                "{} TX datapath of channel {channel} only; traffic for stopped channels may back up",
                if on { "Enabling" } else { "Disabling" }
            );
        }

        let strobe = if on {
            tx_ctrl::START.strobe()
        } else {
            tx_ctrl::STOP.strobe()
        };
        for channel in channels {
            debug!(
                "{} TX datapath on channel {channel}",
                if on { "Starting" } else { "Stopping" }
            );
            self.poke_channel(channel, regs::CHAN_TX_CTRL, strobe)?;
        }
        Ok(())
    }

    /// Set the stop policy of the selected channels
    ///
    /// # Errors
    ///
    /// Returns error if the channel is invalid or a register write fails.
    pub fn set_channel_stop_policy(
        &mut self,
        policy: StopPolicy,
        select: impl Into<ChannelSelect>,
    ) -> Result<()> {
        for channel in select.into().resolve(self.num_channels())? {
            debug!("Setting stop policy of channel {channel} to {policy}");
            self.poke_channel(channel, regs::CHAN_STOP_POLICY, policy.encode())?;
        }
        Ok(())
    }

    /// Stop policy of `channel`
    ///
    /// # Errors
    ///
    /// Returns error if the channel is invalid or the register cannot be
    /// read.
    pub fn get_channel_stop_policy(&mut self, channel: usize) -> Result<StopPolicy> {
        check_channel(channel, self.num_channels())?;
        let raw = self.peek_channel(channel, regs::CHAN_STOP_POLICY)?;
        Ok(StopPolicy::decode(raw))
    }

    /// Stop policy of every channel, in channel order
    ///
    /// # Errors
    ///
    /// Returns error if a register cannot be read.
    pub fn get_channel_stop_policies(&mut self) -> Result<Vec<StopPolicy>> {
        (0..self.num_channels())
            .map(|channel| self.get_channel_stop_policy(channel))
            .collect()
    }

    /// Queue a start timestamp (in ticks) on the selected channels
    ///
    /// The low word is written before the high word.
    ///
    /// # Errors
    ///
    /// Returns error if the channel is invalid or a register write fails.
    #[allow(clippy::cast_possible_truncation)]
    pub fn tx_datapath_enqueue_timestamp(
        &mut self,
        timestamp: u64,
        select: impl Into<ChannelSelect>,
    ) -> Result<()> {
        let low = timestamp as u32;
        let high = (timestamp >> 32) as u32;
        for channel in select.into().resolve(self.num_channels())? {
            debug!("Enqueueing start timestamp {timestamp} on channel {channel}");
            self.poke_channel(channel, regs::CHAN_TS_LOW, low)?;
            self.poke_channel(channel, regs::CHAN_TS_HIGH, high)?;
        }
        Ok(())
    }

    /// Timestamp queue fullness and capacity of `channel`
    ///
    /// # Errors
    ///
    /// Returns error if the channel is invalid or the register cannot be
    /// read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_timestamp_queue_status(&mut self, channel: usize) -> Result<TimestampQueueStatus> {
        check_channel(channel, self.num_channels())?;
        let raw = self.peek_channel(channel, regs::CHAN_TS_QUEUE_STS)?;
        Ok(TimestampQueueStatus {
            fullness: ts_queue::FULLNESS.get(raw) as u16,
            capacity: ts_queue::CAPACITY.get(raw) as u16,
        })
    }

    /// Number of timestamps queued on `channel`
    ///
    /// # Errors
    ///
    /// See [`get_timestamp_queue_status`](Self::get_timestamp_queue_status).
    pub fn get_timestamp_queue_fullness(&mut self, channel: usize) -> Result<u16> {
        Ok(self.get_timestamp_queue_status(channel)?.fullness)
    }

    /// Timestamp queue capacity of `channel`
    ///
    /// # Errors
    ///
    /// See [`get_timestamp_queue_status`](Self::get_timestamp_queue_status).
    pub fn get_timestamp_queue_size(&mut self, channel: usize) -> Result<u16> {
        Ok(self.get_timestamp_queue_status(channel)?.capacity)
    }

    /// Timestamp queue fullness of every channel, in channel order
    ///
    /// # Errors
    ///
    /// Returns error if a register cannot be read.
    pub fn get_timestamp_queue_fullness_all(&mut self) -> Result<Vec<u16>> {
        (0..self.num_channels())
            .map(|channel| self.get_timestamp_queue_fullness(channel))
            .collect()
    }

    /// Timestamp queue capacity of every channel, in channel order
    ///
    /// # Errors
    ///
    /// Returns error if a register cannot be read.
    pub fn get_timestamp_queue_size_all(&mut self) -> Result<Vec<u16>> {
        (0..self.num_channels())
            .map(|channel| self.get_timestamp_queue_size(channel))
            .collect()
    }
}
