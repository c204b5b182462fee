//! Aurora block controller
//!
//! [`AuroraBlock`] owns the register window of one Aurora core. It is
//! created once per core: construction reads the compat and configuration
//! registers, resets the core, and pushes the initial flow-control values.
//! [`AuroraBlock::attach`] opens a core that is already running and leaves
//! its registers alone.
//! The individual feature areas are implemented in their own modules:
//!
//! | Module | Operations |
//! |--------|------------|
//! | `status` | core status, lane and link status, counters |
//! | `flow_control` | pause count, pause/resume thresholds |
//! | `datapath` | TX enable, stop policy, start timestamps, timestamp queues |
//! | `properties` | uniform key/value access |

use crate::backend::RegisterIface;
use crate::config::{BlockConfig, FlowControlParams, DEFAULT_ASYNC_TIMEOUT};
use crate::error::{AuroraError, Result};
use crate::events::{EventSink, InboundEvent, OutboundEvent};
use crate::properties::PropertyCache;
use crate::queue::BoundedQueue;
use aurora_chip::channel::register_address;
use aurora_chip::compat::CompatNum;
use aurora_chip::config::CoreConfig;
use aurora_chip::regs;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Controller for one Aurora core
#[derive(Debug)]
pub struct AuroraBlock {
    regs: Box<dyn RegisterIface>,
    compat: CompatNum,
    core_config: CoreConfig,
    channels: Vec<usize>,
    rx_queue: Arc<BoundedQueue<InboundEvent>>,
    tx_queue: Arc<BoundedQueue<OutboundEvent>>,
    pub(crate) properties: PropertyCache,
}

impl AuroraBlock {
    /// Open the core behind `backend` and initialize it
    ///
    /// The core is reset and the flow-control values of `config` are pushed
    /// to hardware.
    ///
    /// # Errors
    ///
    /// Returns error if the FPGA image is incompatible, the configuration
    /// register reports no channels, or a register access fails.
    pub fn new(backend: impl RegisterIface + 'static, config: BlockConfig) -> Result<Self> {
        let mut block = Self::open(Box::new(backend), &config)?;
        block.init(config.flow_control)?;
        Ok(block)
    }

    /// Open the core behind `backend` without touching its state
    ///
    /// Compat and configuration are read and validated as in
    /// [`AuroraBlock::new`], but nothing is written. The flow-control
    /// properties start from the values currently in hardware.
    ///
    /// # Errors
    ///
    /// Returns error if the FPGA image is incompatible, the configuration
    /// register reports no channels, or a register access fails.
    pub fn attach(backend: impl RegisterIface + 'static, config: BlockConfig) -> Result<Self> {
        let mut block = Self::open(Box::new(backend), &config)?;
        let fc = block.get_flow_control()?;
        debug!(
            "Attached to running core (pause count {}, thresholds {}/{})",
            fc.pause_count, fc.pause_threshold, fc.resume_threshold
        );
        block.properties.load_flow_control(&fc);
        Ok(block)
    }

    fn open(mut backend: Box<dyn RegisterIface>, config: &BlockConfig) -> Result<Self> {
        let compat = CompatNum::from_raw(backend.peek32(regs::COMPAT)?);
        check_compat(compat, config.expected_compat)?;

        let core_config = CoreConfig::decode(backend.peek32(regs::CORE_CONFIG)?);
        if core_config.num_channels == 0 {
            return Err(AuroraError::invalid_config(
                "core configuration reports zero channels",
            ));
        }

        info!(
            "Opening Aurora block (compat {compat}, {} cores, {} channels, {} backend)",
            core_config.num_cores,
            core_config.num_channels,
            backend.backend_type()
        );

        Ok(Self {
            regs: backend,
            compat,
            core_config,
            channels: (0..core_config.num_channels).collect(),
            rx_queue: Arc::new(BoundedQueue::new(config.queue_depth)),
            tx_queue: Arc::new(BoundedQueue::new(config.queue_depth)),
            properties: PropertyCache::new(&core_config, &config.flow_control),
        })
    }

    /// Reset the core and push `flow_control` to hardware
    ///
    /// This is the initialization [`AuroraBlock::new`] performs. The
    /// flow-control properties become owner-set again.
    ///
    /// # Errors
    ///
    /// Returns error if a register write fails, or
    /// [`AuroraError::InvalidPauseCount`] for a pause count in `1..10`.
    pub fn init(&mut self, flow_control: FlowControlParams) -> Result<()> {
        self.reset()?;
        self.properties.load_flow_control(&flow_control);
        self.resolve_all_properties()
    }

    /// Open a core with the default configuration
    ///
    /// # Errors
    ///
    /// See [`AuroraBlock::new`].
    pub fn with_defaults(backend: impl RegisterIface + 'static) -> Result<Self> {
        Self::new(backend, BlockConfig::default())
    }

    // ── Configuration ────────────────────────────────────────────────────────

    /// Compat number reported by the FPGA image
    pub const fn compat(&self) -> CompatNum {
        self.compat
    }

    /// Configuration read at construction
    pub const fn core_config(&self) -> CoreConfig {
        self.core_config
    }

    /// Number of Aurora cores
    pub const fn num_cores(&self) -> usize {
        self.core_config.num_cores
    }

    /// Number of channels
    pub const fn num_channels(&self) -> usize {
        self.core_config.num_channels
    }

    /// Channel indices, ascending
    pub fn channels(&self) -> &[usize] {
        &self.channels
    }

    // ── Reset ────────────────────────────────────────────────────────────────

    /// Reset the Aurora IP and both datapaths, then flush every channel's
    /// timestamp queue
    ///
    /// # Errors
    ///
    /// Returns error if a register write fails. Channels before the failing
    /// one have already been flushed.
    pub fn reset(&mut self) -> Result<()> {
        info!("Resetting Aurora core");
        self.poke32(regs::CORE_RESET, regs::reset::ALL)?;
        for channel in 0..self.num_channels() {
            self.poke_channel(channel, regs::CHAN_TS_QUEUE_CTRL, regs::ts_queue::RESET.strobe())?;
        }
        Ok(())
    }

    /// Reset only the TX datapath
    ///
    /// # Errors
    ///
    /// Returns error if the register write fails.
    pub fn reset_tx(&mut self) -> Result<()> {
        info!("Resetting Aurora TX datapath");
        self.poke32(regs::CORE_RESET, regs::reset::TX_DATAPATH.strobe())
    }

    // ── Async events ─────────────────────────────────────────────────────────

    /// Producer handle for delivering hardware notifications
    pub fn event_sink(&self) -> EventSink {
        EventSink::new(
            Arc::clone(&self.rx_queue),
            Arc::clone(&self.tx_queue),
            self.num_channels(),
        )
    }

    /// Next inbound (RX) event, waiting up to `timeout`
    pub fn get_rx_async_event(&self, timeout: Duration) -> Option<InboundEvent> {
        self.rx_queue.pop(timeout)
    }

    /// Next outbound (TX) event, waiting up to `timeout`
    pub fn get_tx_async_event(&self, timeout: Duration) -> Option<OutboundEvent> {
        self.tx_queue.pop(timeout)
    }

    /// [`get_rx_async_event`](Self::get_rx_async_event) with the default timeout
    pub fn next_rx_async_event(&self) -> Option<InboundEvent> {
        self.get_rx_async_event(DEFAULT_ASYNC_TIMEOUT)
    }

    /// [`get_tx_async_event`](Self::get_tx_async_event) with the default timeout
    pub fn next_tx_async_event(&self) -> Option<OutboundEvent> {
        self.get_tx_async_event(DEFAULT_ASYNC_TIMEOUT)
    }

    /// Records evicted from the (inbound, outbound) queues by overflow
    pub fn dropped_async_events(&self) -> (u64, u64) {
        (self.rx_queue.dropped(), self.tx_queue.dropped())
    }

    // ── Register access ──────────────────────────────────────────────────────

    pub(crate) fn peek32(&mut self, addr: u32) -> Result<u32> {
        self.regs.peek32(addr)
    }

    pub(crate) fn poke32(&mut self, addr: u32, value: u32) -> Result<()> {
        self.regs.poke32(addr, value)
    }

    pub(crate) fn peek_channel(&mut self, channel: usize, offset: u32) -> Result<u32> {
        self.regs.peek32(register_address(channel, offset))
    }

    pub(crate) fn poke_channel(&mut self, channel: usize, offset: u32, value: u32) -> Result<()> {
        self.regs.poke32(register_address(channel, offset), value)
    }
}

impl Drop for AuroraBlock {
    fn drop(&mut self) {
        debug!("Closing Aurora block ({} backend)", self.regs.backend_type());
    }
}

/// Images before major 2 predate compat enforcement and are accepted as-is.
fn check_compat(found: CompatNum, expected: CompatNum) -> Result<()> {
    if found.major < 2 {
        return Ok(());
    }
    if found.major != expected.major {
        return Err(AuroraError::CompatMismatch {
            expected_major: expected.major,
            found_major: found.major,
            found_minor: found.minor,
        });
    }
    if found.minor != expected.minor {
        warn!("FPGA compat {found} differs from expected {expected} in minor version");
    }
    Ok(())
}
