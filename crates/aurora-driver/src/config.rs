//! Controller configuration

use aurora_chip::compat::CompatNum;
use std::time::Duration;

/// Depth of each async event queue unless configured otherwise.
pub const ASYNC_QUEUE_DEPTH: usize = 128;

/// Wait used by the async event getters when the caller has no preference.
pub const DEFAULT_ASYNC_TIMEOUT: Duration = Duration::from_millis(100);

/// Flow-control values pushed to hardware at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowControlParams {
    /// Pause count in cycles (0 or >= 10)
    pub pause_count: u8,
    /// XOFF threshold in Aurora data words
    pub pause_threshold: u16,
    /// XON threshold in Aurora data words
    pub resume_threshold: u16,
}

impl Default for FlowControlParams {
    fn default() -> Self {
        Self {
            pause_count: 100,
            pause_threshold: 160,
            resume_threshold: 200,
        }
    }
}

/// Aurora block configuration
#[derive(Debug, Clone)]
pub struct BlockConfig {
    /// Capacity of the inbound and outbound event queues
    pub queue_depth: usize,

    /// Initial flow-control parameters
    pub flow_control: FlowControlParams,

    /// Compat number the driver checks the FPGA image against
    pub expected_compat: CompatNum,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            queue_depth: ASYNC_QUEUE_DEPTH,
            flow_control: FlowControlParams::default(),
            expected_compat: CompatNum::EXPECTED,
        }
    }
}

impl BlockConfig {
    /// Set the async event queue capacity (at least 1)
    #[must_use]
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Set the initial flow-control parameters
    #[must_use]
    pub const fn with_flow_control(mut self, params: FlowControlParams) -> Self {
        self.flow_control = params;
        self
    }

    /// Set the compat number to check against
    #[must_use]
    pub const fn with_expected_compat(mut self, compat: CompatNum) -> Self {
        self.expected_compat = compat;
        self
    }
}
