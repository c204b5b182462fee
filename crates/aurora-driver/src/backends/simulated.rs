//! Simulated Aurora core
//!
//! An in-memory register file that follows the access classes of the real
//! register map:
//!
//! - read-only registers (compat, config, status, counters, timestamp queue
//!   status) return a hardware-side value and reject pokes
//! - write-only registers (reset and TX control strobes, start timestamp,
//!   queue control) latch pokes but read back as zero
//! - everything else is plain storage
//!
//! Clones share state, so a test can keep one handle for inspection while the
//! controller owns the other. This is what the driver's tests and the CLI's
//! `--sim` mode run against.

use crate::backend::{BackendType, RegisterIface};
use crate::error::{AuroraError, Result};
use aurora_chip::compat::CompatNum;
use aurora_chip::config::CoreConfig;
use aurora_chip::regs::{self, Access};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct State {
    /// Values the hardware presents in read-only registers
    hw: HashMap<u32, u32>,
    /// Last value poked per address
    latched: HashMap<u32, u32>,
    /// Every successful poke, in order
    log: Vec<(u32, u32)>,
    /// Pokes to the core reset register
    resets: usize,
    /// Accesses left before an injected transport failure
    fail_after: Option<usize>,
}

impl State {
    fn tick(&mut self, op: &str, addr: u32) -> Result<()> {
        match self.fail_after {
            Some(0) => {
                self.fail_after = None;
                Err(AuroraError::transfer(format!(
                    "injected failure on {op} [{addr:04x}]"
                )))
            }
            Some(n) => {
                self.fail_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Simulated Aurora core register file
#[derive(Debug, Clone)]
pub struct SimulatedCore {
    state: Arc<Mutex<State>>,
}

impl Default for SimulatedCore {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCore {
    /// Core with compat 1.0, one core and four channels
    pub fn new() -> Self {
        Self::with_config(
            CompatNum::EXPECTED,
            CoreConfig {
                num_cores: 1,
                num_channels: 4,
            },
        )
    }

    /// Core reporting the given compat number and configuration
    pub fn with_config(compat: CompatNum, config: CoreConfig) -> Self {
        let core = Self {
            state: Arc::new(Mutex::new(State::default())),
        };
        core.set_hw(regs::COMPAT, compat.to_raw());
        core.set_hw(regs::CORE_CONFIG, config.encode());
        core
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the value hardware presents at `addr`
    ///
    /// For read-only registers this is the only way to change what a peek
    /// returns. For read-write registers it behaves like a poke that is not
    /// logged.
    pub fn set_hw(&self, addr: u32, value: u32) {
        let mut state = self.state();
        if regs::access(addr) == Access::ReadOnly {
            state.hw.insert(addr, value);
        } else {
            state.latched.insert(addr, value);
        }
    }

    /// Last value poked to `addr`, including write-only registers
    pub fn written(&self, addr: u32) -> Option<u32> {
        self.state().latched.get(&addr).copied()
    }

    /// Every poke since construction (or the last [`clear_log`](Self::clear_log))
    pub fn write_log(&self) -> Vec<(u32, u32)> {
        self.state().log.clone()
    }

    /// Forget logged pokes
    pub fn clear_log(&self) {
        self.state().log.clear();
    }

    /// Number of pokes to the core reset register
    pub fn reset_count(&self) -> usize {
        self.state().resets
    }

    /// Let `n` more accesses succeed, then fail the next one
    pub fn fail_after(&self, n: usize) {
        self.state().fail_after = Some(n);
    }
}

impl RegisterIface for SimulatedCore {
    fn peek32(&mut self, addr: u32) -> Result<u32> {
        let mut state = self.state();
        state.tick("peek", addr)?;
        let value = match regs::access(addr) {
            Access::ReadOnly => state.hw.get(&addr).copied().unwrap_or(0),
            Access::WriteOnly => 0,
            Access::ReadWrite => state.latched.get(&addr).copied().unwrap_or(0),
        };
        tracing::trace!("peek [{addr:04x}] = {value:08x}");
        Ok(value)
    }

    fn poke32(&mut self, addr: u32, value: u32) -> Result<()> {
        let mut state = self.state();
        state.tick("poke", addr)?;
        if regs::access(addr) == Access::ReadOnly {
            return Err(AuroraError::ReadOnlyRegister { addr });
        }
        tracing::trace!("poke [{addr:04x}] = {value:08x}");
        state.latched.insert(addr, value);
        state.log.push((addr, value));
        if addr == regs::CORE_RESET {
            state.resets += 1;
        }
        Ok(())
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Simulated
    }
}
