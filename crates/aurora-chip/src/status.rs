//! Core status decoder.
//!
//! All fields are decoded from one `CORE_STATUS` word so that they describe
//! the same hardware instant.

use crate::regs::status::{HARD_ERR, LANES, LANE_COUNT, LINK, MMCM_LOCK, PLL_LOCK, SOFT_ERR};

/// Snapshot of the core status register.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoreStatus {
    /// Lane up flags, lane 0 first.
    pub lane_status: Vec<bool>,
    /// Channel (link) up.
    pub link_status: bool,
    /// Aurora hard error.
    pub hard_error: bool,
    /// Aurora soft error.
    pub soft_error: bool,
    /// MMCM locked.
    pub mmcm_lock: bool,
    /// GT PLL locked.
    pub pll_lock: bool,
}

impl CoreStatus {
    /// Decode a raw `CORE_STATUS` word.
    #[must_use]
    pub fn decode(raw: u32) -> Self {
        let lanes = LANES.get(raw);
        Self {
            lane_status: (0..LANE_COUNT).map(|lane| (lanes >> lane) & 1 == 1).collect(),
            link_status: LINK.is_set(raw),
            hard_error: HARD_ERR.is_set(raw),
            soft_error: SOFT_ERR.is_set(raw),
            mmcm_lock: MMCM_LOCK.is_set(raw),
            pll_lock: PLL_LOCK.is_set(raw),
        }
    }

    /// All lanes up, link up, clocks locked, no hard error.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.lane_status.iter().all(|&up| up)
            && self.link_status
            && !self.hard_error
            && self.mmcm_lock
            && self.pll_lock
    }
}

impl std::fmt::Display for CoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lanes: String = self
            .lane_status
            .iter()
            .map(|&up| if up { '1' } else { '0' })
            .collect();
        write!(
            f,
            "lanes={lanes} link={} hard_err={} soft_err={} mmcm_lock={} pll_lock={}",
            u8::from(self.link_status),
            u8::from(self.hard_error),
            u8::from(self.soft_error),
            u8::from(self.mmcm_lock),
            u8::from(self.pll_lock),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> CoreStatus {
        CoreStatus {
            lane_status: vec![false; LANE_COUNT],
            ..CoreStatus::default()
        }
    }

    #[test]
    fn zero_word_is_all_false() {
        assert_eq!(CoreStatus::decode(0), quiet());
    }

    #[test]
    fn each_lane_bit_maps_to_its_lane() {
        for lane in 0..LANE_COUNT {
            let mut expected = quiet();
            expected.lane_status[lane] = true;
            assert_eq!(CoreStatus::decode(1 << lane), expected);
        }
    }

    #[test]
    fn single_flag_bits() {
        let cases: [(u32, fn(&mut CoreStatus)); 5] = [
            (1 << 4, |s| s.link_status = true),
            (1 << 8, |s| s.hard_error = true),
            (1 << 9, |s| s.soft_error = true),
            (1 << 12, |s| s.mmcm_lock = true),
            (1 << 13, |s| s.pll_lock = true),
        ];
        for (raw, apply) in cases {
            let mut expected = quiet();
            apply(&mut expected);
            assert_eq!(CoreStatus::decode(raw), expected, "raw={raw:#x}");
        }
    }

    #[test]
    fn healthy_link() {
        let raw = 0xF | (1 << 4) | (1 << 12) | (1 << 13);
        assert!(CoreStatus::decode(raw).is_healthy());
        assert!(!CoreStatus::decode(raw | (1 << 8)).is_healthy());
        assert_eq!(
            CoreStatus::decode(raw).to_string(),
            "lanes=1111 link=1 hard_err=0 soft_err=0 mmcm_lock=1 pll_lock=1"
        );
    }
}
