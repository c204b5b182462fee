//! Host-side controller for the Aurora multi-channel serial link core.
//!
//! The register layout lives in `aurora-chip`; this crate turns it into
//! operations on a running core: flow control, channel datapath control,
//! link status, counters, resets, the async event queues, and a uniform
//! key/value property view.
//!
//! # Backends
//!
//! ```text
//! MmapRegisters   UIO node or PCIe resourceN file, volatile 32-bit access
//! SimulatedCore   in-memory register file, no hardware required
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use aurora_driver::chip::StopPolicy;
//! use aurora_driver::{AuroraBlock, ChannelSelect, MmapRegisters};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let regs = MmapRegisters::open("/dev/uio0", Some(0x800))?;
//! let mut block = AuroraBlock::with_defaults(regs)?;
//!
//! block.set_channel_stop_policy(StopPolicy::Buffer, ChannelSelect::All)?;
//! block.tx_datapath_enqueue_timestamp(1_000_000, ChannelSelect::All)?;
//! block.tx_datapath_enable(true, ChannelSelect::All)?;
//!
//! while let Some(event) = block.next_tx_async_event() {
//!     println!("channel {}: {}", event.channel, event.event_code);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod backend;
pub mod backends;
mod block;
mod channel;
mod config;
mod datapath;
mod error;
pub mod events;
mod flow_control;
mod properties;
mod queue;
mod status;

/// Register model types (re-exported from aurora-chip).
pub mod chip {
    pub use aurora_chip::compat::CompatNum;
    pub use aurora_chip::config::CoreConfig;
    pub use aurora_chip::events::{RxErrorCode, TxEventCode};
    pub use aurora_chip::policy::StopPolicy;
    pub use aurora_chip::status::CoreStatus;
}

pub use backend::{select_backend, BackendSelection, BackendType, RegisterIface};
pub use backends::{MmapRegisters, SimulatedCore};
pub use block::AuroraBlock;
pub use channel::ChannelSelect;
pub use config::{BlockConfig, FlowControlParams, ASYNC_QUEUE_DEPTH, DEFAULT_ASYNC_TIMEOUT};
pub use datapath::TimestampQueueStatus;
pub use error::{AuroraError, Result};
pub use events::{EventSink, InboundEvent, OutboundEvent, RawEvent};
pub use properties::{PropertyRecord, PropertySource, PropertyValue, ValueKind};
pub use queue::BoundedQueue;
pub use status::Counters;

/// Commonly used types.
pub mod prelude {
    pub use crate::chip::{CompatNum, CoreStatus, StopPolicy};
    pub use crate::{
        AuroraBlock, AuroraError, BackendSelection, BlockConfig, ChannelSelect, EventSink,
        FlowControlParams, MmapRegisters, PropertyValue, RawEvent, RegisterIface, Result,
        SimulatedCore,
    };
}
