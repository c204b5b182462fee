//! Async event translation
//!
//! Hardware-side notifications arrive as [`RawEvent`]s on whatever thread
//! delivers them. [`EventSink::handle`] decodes each one exactly once into
//! an inbound or outbound record and pushes it into the matching bounded
//! queue. Anything that does not decode is logged and dropped; the
//! producer is never blocked and never sees an error.

use crate::queue::BoundedQueue;
use aurora_chip::events::{RxErrorCode, TxEventCode};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Kind of action a notification was delivered as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    /// Receive-side (inbound) error report
    RxEvent,
    /// Transmit-side (outbound) event report
    TxEvent,
    /// Anything else; never accepted
    Other(String),
}

impl EventAction {
    /// Parse an action key (`"rx_event"`, `"tx_event"`)
    pub fn from_key(key: &str) -> Self {
        match key {
            "rx_event" => Self::RxEvent,
            "tx_event" => Self::TxEvent,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Block edge a notification arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Input port of the block
    Input,
    /// Output port of the block
    Output,
}

/// Undecoded hardware notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Action kind
    pub action: EventAction,
    /// Edge the notification arrived on
    pub edge: EdgeKind,
    /// Port (channel) instance on that edge
    pub instance: usize,
    /// Error code (rx) or event code (tx)
    pub code: u32,
    /// Timestamp in ticks, if the hardware attached one
    pub timestamp: Option<u64>,
}

impl RawEvent {
    /// Inbound error report on input port `channel`
    pub const fn rx(channel: usize, code: u32) -> Self {
        Self {
            action: EventAction::RxEvent,
            edge: EdgeKind::Input,
            instance: channel,
            code,
            timestamp: None,
        }
    }

    /// Outbound event report on output port `channel`
    pub const fn tx(channel: usize, code: u32, timestamp: Option<u64>) -> Self {
        Self {
            action: EventAction::TxEvent,
            edge: EdgeKind::Output,
            instance: channel,
            code,
            timestamp,
        }
    }
}

/// Inbound (RFNoC to Aurora) error record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundEvent {
    /// Reported error
    pub error_code: RxErrorCode,
}

/// Outbound (Aurora to RFNoC) event record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundEvent {
    /// Reported event
    pub event_code: TxEventCode,
    /// Channel the event belongs to
    pub channel: usize,
    /// Hardware timestamp in ticks
    pub timestamp: Option<u64>,
}

impl OutboundEvent {
    /// Timestamp converted to seconds at `tick_rate` Hz
    #[allow(clippy::cast_precision_loss)]
    pub fn time_secs(&self, tick_rate: f64) -> Option<f64> {
        self.timestamp.map(|ticks| ticks as f64 / tick_rate)
    }
}

/// A decoded notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncEvent {
    /// Inbound error record
    Inbound(InboundEvent),
    /// Outbound event record
    Outbound(OutboundEvent),
}

/// Why a notification could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    /// Not an rx or tx event
    #[error("unrecognized action '{0}'")]
    UnknownAction(String),

    /// rx event not on an input edge, or tx event not on an output edge
    #[error("{action} event arrived on {edge:?} edge")]
    WrongEdge {
        /// `"rx"` or `"tx"`
        action: &'static str,
        /// Edge it arrived on
        edge: EdgeKind,
    },

    /// Code outside the known table
    #[error("unknown {action} code {code:#x}")]
    UnknownCode {
        /// `"rx"` or `"tx"`
        action: &'static str,
        /// Raw code
        code: u32,
    },

    /// Port instance is not a channel of this core
    #[error("instance {instance} is not a valid channel (have {num_channels})")]
    InvalidChannel {
        /// Raw instance
        instance: usize,
        /// Channels on this core
        num_channels: usize,
    },
}

/// Decode a raw notification for a core with `num_channels` channels
///
/// # Errors
///
/// Returns the reason the notification is malformed.
pub fn decode(raw: &RawEvent, num_channels: usize) -> Result<AsyncEvent, MalformedEvent> {
    match &raw.action {
        EventAction::RxEvent => {
            if raw.edge != EdgeKind::Input {
                return Err(MalformedEvent::WrongEdge {
                    action: "rx",
                    edge: raw.edge,
                });
            }
            check_instance(raw.instance, num_channels)?;
            let error_code = RxErrorCode::from_code(raw.code).ok_or(MalformedEvent::UnknownCode {
                action: "rx",
                code: raw.code,
            })?;
            Ok(AsyncEvent::Inbound(InboundEvent { error_code }))
        }
        EventAction::TxEvent => {
            if raw.edge != EdgeKind::Output {
                return Err(MalformedEvent::WrongEdge {
                    action: "tx",
                    edge: raw.edge,
                });
            }
            check_instance(raw.instance, num_channels)?;
            let event_code = TxEventCode::from_code(raw.code).ok_or(MalformedEvent::UnknownCode {
                action: "tx",
                code: raw.code,
            })?;
            Ok(AsyncEvent::Outbound(OutboundEvent {
                event_code,
                channel: raw.instance,
                timestamp: raw.timestamp,
            }))
        }
        EventAction::Other(key) => Err(MalformedEvent::UnknownAction(key.clone())),
    }
}

fn check_instance(instance: usize, num_channels: usize) -> Result<(), MalformedEvent> {
    if instance >= num_channels {
        return Err(MalformedEvent::InvalidChannel {
            instance,
            num_channels,
        });
    }
    Ok(())
}

/// Producer-side handle onto a block's event queues
///
/// Cheap to clone and safe to move to the thread that receives hardware
/// notifications.
#[derive(Debug, Clone)]
pub struct EventSink {
    rx: Arc<BoundedQueue<InboundEvent>>,
    tx: Arc<BoundedQueue<OutboundEvent>>,
    num_channels: usize,
}

impl EventSink {
    pub(crate) fn new(
        rx: Arc<BoundedQueue<InboundEvent>>,
        tx: Arc<BoundedQueue<OutboundEvent>>,
        num_channels: usize,
    ) -> Self {
        Self {
            rx,
            tx,
            num_channels,
        }
    }

    /// Decode `raw` and queue it
    ///
    /// Returns `false` if the notification was malformed and dropped.
    pub fn handle(&self, raw: &RawEvent) -> bool {
        match decode(raw, self.num_channels) {
            Ok(AsyncEvent::Inbound(event)) => {
                debug!(
                    "Received RX error on channel {}, error code {}",
                    raw.instance, event.error_code
                );
                if self.rx.push(event) {
                    debug!("RX event queue full, dropped oldest record");
                }
                true
            }
            Ok(AsyncEvent::Outbound(event)) => {
                debug!(
                    "Received TX event on channel {}, event code {}",
                    event.channel, event.event_code
                );
                if self.tx.push(event) {
                    debug!("TX event queue full, dropped oldest record");
                }
                true
            }
            Err(reason) => {
                warn!("Dropping invalid event: {reason}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx_decodes_to_inbound() {
        let event = decode(&RawEvent::rx(1, 0x8), 4).unwrap();
        assert_eq!(
            event,
            AsyncEvent::Inbound(InboundEvent {
                error_code: RxErrorCode::Overflow
            })
        );
    }

    #[test]
    fn tx_keeps_channel_and_timestamp() {
        let event = decode(&RawEvent::tx(3, 0x2, Some(1_000)), 4).unwrap();
        let AsyncEvent::Outbound(out) = event else {
            panic!("expected outbound, got {event:?}");
        };
        assert_eq!(out.event_code, TxEventCode::Underflow);
        assert_eq!(out.channel, 3);
        assert_eq!(out.timestamp, Some(1_000));
        assert_eq!(out.time_secs(1_000.0), Some(1.0));
    }

    #[test]
    fn malformed_outcomes() {
        let mut wrong_edge = RawEvent::rx(0, 0);
        wrong_edge.edge = EdgeKind::Output;
        assert!(matches!(decode(&wrong_edge, 4), Err(MalformedEvent::WrongEdge { .. })));

        assert!(matches!(
            decode(&RawEvent::tx(0, 0x3, None), 4),
            Err(MalformedEvent::UnknownCode { code: 0x3, .. })
        ));
        assert!(matches!(
            decode(&RawEvent::tx(4, 0x1, None), 4),
            Err(MalformedEvent::InvalidChannel { instance: 4, .. })
        ));

        let mut other = RawEvent::rx(0, 0);
        other.action = EventAction::from_key("stream_cmd");
        assert_eq!(
            decode(&other, 4),
            Err(MalformedEvent::UnknownAction("stream_cmd".into()))
        );
    }

    #[test]
    fn sink_routes_by_direction_and_drops_malformed() {
        let rx = Arc::new(BoundedQueue::new(4));
        let tx = Arc::new(BoundedQueue::new(4));
        let sink = EventSink::new(Arc::clone(&rx), Arc::clone(&tx), 2);

        assert!(sink.handle(&RawEvent::rx(0, 0x1)));
        assert!(sink.handle(&RawEvent::tx(1, 0x1, None)));
        assert!(!sink.handle(&RawEvent::tx(1, 0x99, None)));

        assert_eq!(rx.len(), 1);
        assert_eq!(tx.len(), 1);
    }
}
