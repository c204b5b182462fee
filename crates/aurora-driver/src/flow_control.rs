//! Native flow control
//!
//! Pause count has a register of its own. The pause and resume thresholds
//! share `FC_THRESHOLD`, so each threshold setter reads the register,
//! replaces only its own field, and writes the word back.

use crate::block::AuroraBlock;
use crate::config::FlowControlParams;
use crate::error::{AuroraError, Result};
use aurora_chip::field::Field;
use aurora_chip::regs::{self, fc};

impl AuroraBlock {
    /// Pause count, in cycles
    ///
    /// # Errors
    ///
    /// Returns error if the register cannot be read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_fc_pause_count(&mut self) -> Result<u8> {
        let raw = self.peek32(regs::FC_PAUSE)?;
        Ok(fc::PAUSE_COUNT.get(raw) as u8)
    }

    /// Set the pause count
    ///
    /// The core accepts 0 (flow control off) or at least
    /// [`fc::MIN_PAUSE_COUNT`].
    ///
    /// # Errors
    ///
    /// Returns [`AuroraError::InvalidPauseCount`] for 1 through 9, in which
    /// case nothing is written.
    pub fn set_fc_pause_count(&mut self, count: u8) -> Result<()> {
        if count != 0 && count < fc::MIN_PAUSE_COUNT {
            return Err(AuroraError::InvalidPauseCount { value: count });
        }
        self.poke32(regs::FC_PAUSE, fc::PAUSE_COUNT.encode(u32::from(count)))
    }

    /// XOFF threshold
    ///
    /// # Errors
    ///
    /// Returns error if the register cannot be read.
    pub fn get_fc_pause_threshold(&mut self) -> Result<u16> {
        self.get_threshold(fc::PAUSE_THRESHOLD)
    }

    /// Set the XOFF threshold, leaving the XON threshold untouched
    ///
    /// Only the low 8 bits reach the hardware.
    ///
    /// # Errors
    ///
    /// Returns error if the register cannot be read or written.
    pub fn set_fc_pause_threshold(&mut self, threshold: u16) -> Result<()> {
        self.set_threshold(fc::PAUSE_THRESHOLD, threshold)
    }

    /// XON threshold
    ///
    /// # Errors
    ///
    /// Returns error if the register cannot be read.
    pub fn get_fc_resume_threshold(&mut self) -> Result<u16> {
        self.get_threshold(fc::RESUME_THRESHOLD)
    }

    /// Set the XON threshold, leaving the XOFF threshold untouched
    ///
    /// Only the low 8 bits reach the hardware.
    ///
    /// # Errors
    ///
    /// Returns error if the register cannot be read or written.
    pub fn set_fc_resume_threshold(&mut self, threshold: u16) -> Result<()> {
        self.set_threshold(fc::RESUME_THRESHOLD, threshold)
    }

    /// All three parameters as currently held by the hardware
    ///
    /// # Errors
    ///
    /// Returns error if a register cannot be read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_flow_control(&mut self) -> Result<FlowControlParams> {
        let pause_count = self.get_fc_pause_count()?;
        let thresholds = self.peek32(regs::FC_THRESHOLD)?;
        Ok(FlowControlParams {
            pause_count,
            pause_threshold: fc::PAUSE_THRESHOLD.get(thresholds) as u16,
            resume_threshold: fc::RESUME_THRESHOLD.get(thresholds) as u16,
        })
    }

    /// Apply all three parameters
    ///
    /// The pause count is validated before anything is written.
    ///
    /// # Errors
    ///
    /// Returns [`AuroraError::InvalidPauseCount`] without touching the
    /// hardware, or the first register error.
    pub fn set_flow_control(&mut self, params: FlowControlParams) -> Result<()> {
        self.set_fc_pause_count(params.pause_count)?;
        self.set_fc_pause_threshold(params.pause_threshold)?;
        self.set_fc_resume_threshold(params.resume_threshold)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn get_threshold(&mut self, field: Field) -> Result<u16> {
        let raw = self.peek32(regs::FC_THRESHOLD)?;
        Ok(field.get(raw) as u16)
    }

    fn set_threshold(&mut self, field: Field, threshold: u16) -> Result<()> {
        let current = self.peek32(regs::FC_THRESHOLD)?;
        self.poke32(regs::FC_THRESHOLD, field.set(current, u32::from(threshold)))
    }
}
