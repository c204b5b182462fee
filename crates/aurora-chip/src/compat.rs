//! Compat number of the FPGA image.

use crate::field::Field;

const MAJOR: Field = Field::new(16, 16);
const MINOR: Field = Field::new(0, 16);

/// Major/minor compat number read from the `COMPAT` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompatNum {
    /// Incremented on incompatible register map changes.
    pub major: u16,
    /// Incremented on backwards-compatible additions.
    pub minor: u16,
}

impl CompatNum {
    /// Compat number this register model was written against.
    pub const EXPECTED: Self = Self::new(1, 0);

    /// Construct from parts.
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Decode a raw `COMPAT` word.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            major: MAJOR.get(raw) as u16,
            minor: MINOR.get(raw) as u16,
        }
    }

    /// Encode as a raw `COMPAT` word.
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        MAJOR.encode(self.major as u32) | MINOR.encode(self.minor as u32)
    }
}

impl std::fmt::Display for CompatNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
