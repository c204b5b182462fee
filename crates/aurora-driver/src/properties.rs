//! Key/value view of the block
//!
//! A fixed table maps every property key to the way it is kept in sync
//! with the hardware:
//!
//! - **pull** entries (core and channel counts, counters) are read-only
//!   and refreshed from their source on every `get`
//! - **push** entries (flow control) are writable; a `set` writes the
//!   hardware first and updates the cache only if that succeeded, and a
//!   `get` returns the cached value
//!
//! The cache holds the value the caller last set, not the truncated value
//! the register latched. A threshold of 1000 reads back as 1000 even though
//! only its low 8 bits reached the hardware.

use crate::block::AuroraBlock;
use crate::config::FlowControlParams;
use crate::error::{AuroraError, Result};
use aurora_chip::config::CoreConfig;
use std::num::ParseIntError;
use tracing::trace;

/// Scalar type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// 8-bit unsigned
    U8,
    /// 16-bit unsigned
    U16,
    /// 32-bit unsigned
    U32,
    /// Platform-sized count
    Usize,
}

impl ValueKind {
    /// Type name used in error messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::Usize => "usize",
        }
    }

    /// Parse `text` as a value of this kind
    ///
    /// # Errors
    ///
    /// Returns the integer parse error if `text` is not a number in range.
    pub fn parse(self, text: &str) -> std::result::Result<PropertyValue, ParseIntError> {
        let text = text.trim();
        Ok(match self {
            Self::U8 => PropertyValue::U8(text.parse()?),
            Self::U16 => PropertyValue::U16(text.parse()?),
            Self::U32 => PropertyValue::U32(text.parse()?),
            Self::Usize => PropertyValue::Usize(text.parse()?),
        })
    }

    const fn zero(self) -> PropertyValue {
        match self {
            Self::U8 => PropertyValue::U8(0),
            Self::U16 => PropertyValue::U16(0),
            Self::U32 => PropertyValue::U32(0),
            Self::Usize => PropertyValue::Usize(0),
        }
    }
}

/// A typed property value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValue {
    /// 8-bit unsigned
    U8(u8),
    /// 16-bit unsigned
    U16(u16),
    /// 32-bit unsigned
    U32(u32),
    /// Platform-sized count
    Usize(usize),
}

impl PropertyValue {
    /// Scalar type of this value
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::U8(_) => ValueKind::U8,
            Self::U16(_) => ValueKind::U16,
            Self::U32(_) => ValueKind::U32,
            Self::Usize(_) => ValueKind::Usize,
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::Usize(v) => write!(f, "{v}"),
        }
    }
}

/// Who last wrote a cached value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySource {
    /// The block itself (defaults, hardware refresh)
    OwnerSet,
    /// A caller through [`AuroraBlock::set_property`]
    ExternallySet,
}

/// Cached state of one property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyRecord {
    /// Property key
    pub key: &'static str,
    /// Last known value
    pub value: PropertyValue,
    /// Who set it
    pub source: PropertySource,
}

type Pull = fn(&mut AuroraBlock) -> Result<PropertyValue>;
type Push = fn(&mut AuroraBlock, PropertyValue) -> Result<()>;

#[derive(Clone, Copy)]
enum Resolver {
    Pull(Pull),
    Push(Push),
}

struct PropertyDef {
    key: &'static str,
    kind: ValueKind,
    resolver: Resolver,
}

static PROPERTIES: &[PropertyDef] = &[
    PropertyDef {
        key: "num_cores",
        kind: ValueKind::Usize,
        resolver: Resolver::Pull(|block| Ok(PropertyValue::Usize(block.num_cores()))),
    },
    PropertyDef {
        key: "num_channels",
        kind: ValueKind::Usize,
        resolver: Resolver::Pull(|block| Ok(PropertyValue::Usize(block.num_channels()))),
    },
    PropertyDef {
        key: "fc_pause_count",
        kind: ValueKind::U8,
        resolver: Resolver::Push(|block, value| match value {
            PropertyValue::U8(count) => block.set_fc_pause_count(count),
            _ => Err(type_mismatch("fc_pause_count", ValueKind::U8)),
        }),
    },
    PropertyDef {
        key: "fc_pause_threshold",
        kind: ValueKind::U16,
        resolver: Resolver::Push(|block, value| match value {
            PropertyValue::U16(threshold) => block.set_fc_pause_threshold(threshold),
            _ => Err(type_mismatch("fc_pause_threshold", ValueKind::U16)),
        }),
    },
    PropertyDef {
        key: "fc_resume_threshold",
        kind: ValueKind::U16,
        resolver: Resolver::Push(|block, value| match value {
            PropertyValue::U16(threshold) => block.set_fc_resume_threshold(threshold),
            _ => Err(type_mismatch("fc_resume_threshold", ValueKind::U16)),
        }),
    },
    PropertyDef {
        key: "rx_packet_counter",
        kind: ValueKind::U32,
        resolver: Resolver::Pull(|block| block.get_rx_packet_counter().map(PropertyValue::U32)),
    },
    PropertyDef {
        key: "tx_packet_counter",
        kind: ValueKind::U32,
        resolver: Resolver::Pull(|block| block.get_tx_packet_counter().map(PropertyValue::U32)),
    },
    PropertyDef {
        key: "overflow_counter",
        kind: ValueKind::U32,
        resolver: Resolver::Pull(|block| block.get_overflow_counter().map(PropertyValue::U32)),
    },
    PropertyDef {
        key: "crc_error_counter",
        kind: ValueKind::U32,
        resolver: Resolver::Pull(|block| block.get_crc_error_counter().map(PropertyValue::U32)),
    },
];

fn type_mismatch(key: &str, expected: ValueKind) -> AuroraError {
    AuroraError::PropertyType {
        key: key.to_string(),
        expected: expected.name(),
    }
}

fn lookup(key: &str) -> Result<&'static PropertyDef> {
    PROPERTIES
        .iter()
        .find(|def| def.key == key)
        .ok_or_else(|| AuroraError::unknown_property(key))
}

/// Cached records, one per table entry and in table order
#[derive(Debug, Clone)]
pub(crate) struct PropertyCache {
    records: Vec<PropertyRecord>,
}

impl PropertyCache {
    pub(crate) fn new(core: &CoreConfig, fc: &FlowControlParams) -> Self {
        let records = PROPERTIES
            .iter()
            .map(|def| PropertyRecord {
                key: def.key,
                value: match def.key {
                    "num_cores" => PropertyValue::Usize(core.num_cores),
                    "num_channels" => PropertyValue::Usize(core.num_channels),
                    "fc_pause_count" => PropertyValue::U8(fc.pause_count),
                    "fc_pause_threshold" => PropertyValue::U16(fc.pause_threshold),
                    "fc_resume_threshold" => PropertyValue::U16(fc.resume_threshold),
                    _ => def.kind.zero(),
                },
                source: PropertySource::OwnerSet,
            })
            .collect();
        Self { records }
    }

    /// Replace the three flow-control records, marking them owner-set
    pub(crate) fn load_flow_control(&mut self, fc: &FlowControlParams) {
        let source = PropertySource::OwnerSet;
        self.store("fc_pause_count", PropertyValue::U8(fc.pause_count), source);
        self.store("fc_pause_threshold", PropertyValue::U16(fc.pause_threshold), source);
        self.store("fc_resume_threshold", PropertyValue::U16(fc.resume_threshold), source);
    }

    fn get(&self, key: &str) -> Option<&PropertyRecord> {
        self.records.iter().find(|record| record.key == key)
    }

    fn store(&mut self, key: &str, value: PropertyValue, source: PropertySource) {
        if let Some(record) = self.records.iter_mut().find(|record| record.key == key) {
            record.value = value;
            record.source = source;
        }
    }
}

impl AuroraBlock {
    /// Current value of property `key`
    ///
    /// Read-only properties are re-read from hardware on every call.
    ///
    /// # Errors
    ///
    /// Returns [`AuroraError::UnknownProperty`] for a key not in the table,
    /// or the register error of a failed refresh.
    pub fn get_property(&mut self, key: &str) -> Result<PropertyValue> {
        let def = lookup(key)?;
        match def.resolver {
            Resolver::Pull(pull) => {
                let value = pull(self)?;
                trace!("Refreshed property {key} = {value}");
                self.properties.store(def.key, value, PropertySource::OwnerSet);
                Ok(value)
            }
            Resolver::Push(_) => Ok(self.property_record(key)?.value),
        }
    }

    /// Write property `key`
    ///
    /// The hardware is written first; the cache only changes if that write
    /// succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`AuroraError::UnknownProperty`], [`AuroraError::ReadOnlyProperty`]
    /// or [`AuroraError::PropertyType`] without touching anything, or the
    /// error of the hardware write.
    pub fn set_property(&mut self, key: &str, value: PropertyValue) -> Result<()> {
        let def = lookup(key)?;
        let Resolver::Push(push) = def.resolver else {
            return Err(AuroraError::ReadOnlyProperty {
                key: key.to_string(),
            });
        };
        if value.kind() != def.kind {
            return Err(type_mismatch(key, def.kind));
        }
        push(self, value)?;
        self.properties
            .store(def.key, value, PropertySource::ExternallySet);
        Ok(())
    }

    /// Every property key, in table order
    pub fn property_keys(&self) -> impl Iterator<Item = &'static str> {
        PROPERTIES.iter().map(|def| def.key)
    }

    /// True if property `key` can be written
    ///
    /// # Errors
    ///
    /// Returns [`AuroraError::UnknownProperty`] for a key not in the table.
    pub fn is_property_writable(&self, key: &str) -> Result<bool> {
        Ok(matches!(lookup(key)?.resolver, Resolver::Push(_)))
    }

    /// Cached record of property `key`, without touching hardware
    ///
    /// # Errors
    ///
    /// Returns [`AuroraError::UnknownProperty`] for a key not in the table.
    pub fn property_record(&self, key: &str) -> Result<PropertyRecord> {
        self.properties
            .get(key)
            .copied()
            .ok_or_else(|| AuroraError::unknown_property(key))
    }

    /// Bring every property in line with the hardware
    ///
    /// Writable entries push their cached value down, read-only entries are
    /// refreshed from their source.
    pub(crate) fn resolve_all_properties(&mut self) -> Result<()> {
        for def in PROPERTIES {
            match def.resolver {
                Resolver::Pull(pull) => {
                    let value = pull(self)?;
                    trace!("Resolved property {} = {value} from hardware", def.key);
                    self.properties.store(def.key, value, PropertySource::OwnerSet);
                }
                Resolver::Push(push) => {
                    let record = self.property_record(def.key)?;
                    trace!("Resolved property {} = {} to hardware", def.key, record.value);
                    push(self, record.value)?;
                }
            }
        }
        Ok(())
    }
}
