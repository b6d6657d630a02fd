//! Envelope rate conversion.
//!
//! Envelope stages are timed by a (range, value) pair. Each of the four
//! ranges is a linear segment of the board's rate table:
//!
//! ```text
//! range 0:    0 ..  122 ms   value = (ms + 1) / 8
//! range 1:  123 ..  489 ms   value = (ms - 123) / 23
//! range 2:  490 .. 1477 ms   value = (ms - 490) / 62
//! range 3: 1478 .. 4999 ms   value = (ms - 1478) / 231
//!          5000 ms and up    saturates at (3, 15)
//! ```

/// Highest valid range.
pub const RANGE_MAX: u8 = 3;

/// Highest valid value within a range.
pub const VALUE_MAX: u8 = 15;

/// A hardware envelope rate: range tier plus value within the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateSetting {
    /// Range tier (0–3).
    pub range: u8,
    /// Value within the tier (0–15).
    pub value: u8,
}

impl RateSetting {
    pub const fn new(range: u8, value: u8) -> Self {
        Self { range, value }
    }

    /// Pick the setting closest to a duration in milliseconds.
    ///
    /// Total over the whole `u16` domain: durations of 5000 ms or more
    /// saturate at the slowest setting.
    ///
    /// # Example
    /// ```
    /// use buzzkill_driver::RateSetting;
    ///
    /// assert_eq!(RateSetting::from_millis(122), RateSetting::new(0, 15));
    /// assert_eq!(RateSetting::from_millis(123), RateSetting::new(1, 0));
    /// ```
    pub const fn from_millis(ms: u16) -> Self {
        let (range, value) = match ms {
            5000.. => (3, 15),
            1478.. => (3, (ms - 1478) / 231),
            490.. => (2, (ms - 490) / 62),
            123.. => (1, (ms - 123) / 23),
            _ => (0, (ms + 1) / 8),
        };
        Self {
            range,
            value: value as u8,
        }
    }

    /// Whether both fields fit their bitfields.
    pub const fn is_valid(&self) -> bool {
        self.range <= RANGE_MAX && self.value <= VALUE_MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_fastest() {
        assert_eq!(RateSetting::from_millis(0), RateSetting::new(0, 0));
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(RateSetting::from_millis(122), RateSetting::new(0, 15));
        assert_eq!(RateSetting::from_millis(123), RateSetting::new(1, 0));
        assert_eq!(RateSetting::from_millis(489), RateSetting::new(1, 15));
        assert_eq!(RateSetting::from_millis(490), RateSetting::new(2, 0));
        assert_eq!(RateSetting::from_millis(1477), RateSetting::new(2, 15));
        assert_eq!(RateSetting::from_millis(1478), RateSetting::new(3, 0));
        assert_eq!(RateSetting::from_millis(4999), RateSetting::new(3, 15));
    }

    #[test]
    fn rounds_to_nearest_step_in_range_zero() {
        // (ms + 1) / 8 rounds 7 ms up to the first step
        assert_eq!(RateSetting::from_millis(6), RateSetting::new(0, 0));
        assert_eq!(RateSetting::from_millis(7), RateSetting::new(0, 1));
        assert_eq!(RateSetting::from_millis(100), RateSetting::new(0, 12));
    }

    #[test]
    fn saturates_at_and_above_5000() {
        for ms in [5000u16, 5001, 12_345, u16::MAX] {
            assert_eq!(RateSetting::from_millis(ms), RateSetting::new(3, 15));
        }
    }

    #[test]
    fn range_is_monotonic_and_every_result_valid() {
        let mut last = RateSetting::from_millis(0);
        for ms in 1..=u16::MAX {
            let rate = RateSetting::from_millis(ms);
            assert!(rate.is_valid(), "{} ms -> {:?}", ms, rate);
            if ms < 5000 {
                assert!(rate.range >= last.range, "range dropped at {} ms", ms);
                if rate.range == last.range {
                    assert!(rate.value >= last.value, "value dropped at {} ms", ms);
                }
            }
            last = rate;
        }
    }

    #[test]
    fn validity() {
        assert!(RateSetting::new(3, 15).is_valid());
        assert!(!RateSetting::new(4, 0).is_valid());
        assert!(!RateSetting::new(0, 16).is_valid());
    }
}
