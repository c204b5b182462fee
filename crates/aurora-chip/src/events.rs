//! Asynchronous event codes reported by the datapaths.
//!
//! Inbound (RX, RFNoC to Aurora) notifications carry an error code; outbound
//! (TX, Aurora to RFNoC) notifications carry an event code. Codes outside
//! these tables are not produced by the core and are treated as malformed.

/// Error code of an inbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RxErrorCode {
    /// No error.
    None,
    /// No packet received within the timeout.
    Timeout,
    /// A stream command was issued in the past.
    LateCommand,
    /// Expected another stream command.
    BrokenChain,
    /// An internal receive buffer filled or a sequence error was detected.
    Overflow,
    /// Multi-channel alignment failed.
    Alignment,
    /// The packet could not be parsed.
    BadPacket,
}

impl RxErrorCode {
    /// Decode a raw error code.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0x0 => Self::None,
            0x1 => Self::Timeout,
            0x2 => Self::LateCommand,
            0x4 => Self::BrokenChain,
            0x8 => Self::Overflow,
            0xC => Self::Alignment,
            0xF => Self::BadPacket,
            _ => return None,
        })
    }

    /// Raw error code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::None => 0x0,
            Self::Timeout => 0x1,
            Self::LateCommand => 0x2,
            Self::BrokenChain => 0x4,
            Self::Overflow => 0x8,
            Self::Alignment => 0xC,
            Self::BadPacket => 0xF,
        }
    }
}

impl std::fmt::Display for RxErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::None => "none",
            Self::Timeout => "timeout",
            Self::LateCommand => "late command",
            Self::BrokenChain => "broken chain",
            Self::Overflow => "overflow",
            Self::Alignment => "alignment",
            Self::BadPacket => "bad packet",
        };
        f.write_str(text)
    }
}

/// Event code of an outbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxEventCode {
    /// A burst was successfully transmitted.
    BurstAck,
    /// An internal send buffer has emptied.
    Underflow,
    /// Packet loss between host and device.
    SeqError,
    /// Packet had time that was late.
    TimeError,
    /// Underflow occurred inside a packet.
    UnderflowInPacket,
    /// Packet loss within a burst.
    SeqErrorInBurst,
    /// Some kind of custom user payload.
    UserPayload,
}

impl TxEventCode {
    /// Decode a raw event code.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0x01 => Self::BurstAck,
            0x02 => Self::Underflow,
            0x04 => Self::SeqError,
            0x08 => Self::TimeError,
            0x10 => Self::UnderflowInPacket,
            0x20 => Self::SeqErrorInBurst,
            0x40 => Self::UserPayload,
            _ => return None,
        })
    }

    /// Raw event code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::BurstAck => 0x01,
            Self::Underflow => 0x02,
            Self::SeqError => 0x04,
            Self::TimeError => 0x08,
            Self::UnderflowInPacket => 0x10,
            Self::SeqErrorInBurst => 0x20,
            Self::UserPayload => 0x40,
        }
    }
}

impl std::fmt::Display for TxEventCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::BurstAck => "burst ack",
            Self::Underflow => "underflow",
            Self::SeqError => "sequence error",
            Self::TimeError => "time error",
            Self::UnderflowInPacket => "underflow in packet",
            Self::SeqErrorInBurst => "sequence error in burst",
            Self::UserPayload => "user payload",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in [0x0, 0x1, 0x2, 0x4, 0x8, 0xC, 0xF] {
            assert_eq!(RxErrorCode::from_code(code).map(RxErrorCode::code), Some(code));
        }
        for shift in 0..7 {
            let code = 1 << shift;
            assert_eq!(TxEventCode::from_code(code).map(TxEventCode::code), Some(code));
        }
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(RxErrorCode::from_code(0x3), None);
        assert_eq!(TxEventCode::from_code(0), None);
        assert_eq!(TxEventCode::from_code(0x80), None);
    }
}
