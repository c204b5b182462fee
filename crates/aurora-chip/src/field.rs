//! Register codec.
//!
//! Every field in the register map is a `(pos, mask)` pair where `mask` is
//! right-aligned (e.g. `0xFF` for an 8-bit field). Values wider than the
//! mask are truncated, never rejected: this is what the hardware does when
//! it latches a register write.

/// Extract the field at `pos` with right-aligned `mask` from `word`.
#[must_use]
pub const fn extract(word: u32, pos: u32, mask: u32) -> u32 {
    (word >> pos) & mask
}

/// Return `word` with the field at `pos`/`mask` replaced by `value`.
///
/// Bits outside the field are preserved. `value` is masked to the field
/// width before it is shifted into place.
#[must_use]
pub const fn insert(word: u32, pos: u32, mask: u32, value: u32) -> u32 {
    (word & !(mask << pos)) | ((value & mask) << pos)
}

/// A bitfield inside a 32-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Bit position of the field's LSB.
    pub pos: u32,
    /// Right-aligned mask of the field.
    pub mask: u32,
}

impl Field {
    /// Field of `width` bits starting at `pos`.
    #[must_use]
    pub const fn new(pos: u32, width: u32) -> Self {
        let mask = if width >= 32 { u32::MAX } else { (1 << width) - 1 };
        Self { pos, mask }
    }

    /// Single-bit field at `pos`.
    #[must_use]
    pub const fn bit(pos: u32) -> Self {
        Self { pos, mask: 1 }
    }

    /// Decode this field from `word`.
    #[must_use]
    pub const fn get(self, word: u32) -> u32 {
        extract(word, self.pos, self.mask)
    }

    /// Decode a single-bit field as a flag.
    #[must_use]
    pub const fn is_set(self, word: u32) -> bool {
        self.get(word) != 0
    }

    /// Encode `value` into `word`, preserving the other bits.
    #[must_use]
    pub const fn set(self, word: u32, value: u32) -> u32 {
        insert(word, self.pos, self.mask, value)
    }

    /// Word with only this field set to `value`.
    #[must_use]
    pub const fn encode(self, value: u32) -> u32 {
        self.set(0, value)
    }

    /// Word with this field set to all ones (strobe).
    #[must_use]
    pub const fn strobe(self) -> u32 {
        self.mask << self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_masks_after_shift() {
        assert_eq!(extract(0x0004_0001, 0, 0xFF), 1);
        assert_eq!(extract(0x0004_0001, 16, 0xFF), 4);
        assert_eq!(extract(0xFFFF_FFFF, 16, 0xFFFF), 0xFFFF);
    }

    #[test]
    fn insert_preserves_neighbours() {
        let word = 0x00C8_00A0; // resume=200, pause=160
        assert_eq!(insert(word, 0, 0xFF, 0x11), 0x00C8_0011);
        assert_eq!(insert(word, 16, 0xFF, 0x22), 0x0022_00A0);
    }

    #[test]
    fn insert_truncates_wide_values() {
        // 1000 does not fit in 8 bits; hardware keeps the low byte
        assert_eq!(insert(0, 0, 0xFF, 1000), 1000 & 0xFF);
        assert_eq!(insert(0xFFFF_FFFF, 16, 0xFF, 0x1FF), 0xFFFF_FFFF);
    }

    #[test]
    fn field_widths() {
        assert_eq!(Field::new(16, 8).mask, 0xFF);
        assert_eq!(Field::new(0, 32).mask, u32::MAX);
        assert_eq!(Field::bit(13).strobe(), 1 << 13);
        assert!(Field::bit(4).is_set(0x10));
        assert!(!Field::bit(4).is_set(0x20));
    }
}
