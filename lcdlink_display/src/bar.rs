//! Percent-to-bar quantization.
//!
//! A 0–100 value maps to whole "full" glyphs plus at most one partial
//! glyph from a 5-level set: one full glyph per 10 units, partial level
//! from the remainder thresholds 9/7/5/3/1 → levels 5/4/3/2/1. Values
//! above 99 render as 99 so the bar never exceeds ten cells.

/// Fill level of one partial bar glyph. Level five is a full cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarLevel {
    /// 1/5 cell.
    One,
    /// 2/5 cell.
    Two,
    /// 3/5 cell.
    Three,
    /// 4/5 cell.
    Four,
    /// Full cell.
    Five,
}

impl BarLevel {
    /// 1-based level index.
    pub fn index(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    fn from_remainder(rem: u32) -> Option<Self> {
        match rem {
            9.. => Some(Self::Five),
            7..=8 => Some(Self::Four),
            5..=6 => Some(Self::Three),
            3..=4 => Some(Self::Two),
            1..=2 => Some(Self::One),
            0 => None,
        }
    }
}

/// Quantized shape of one bar: full cells then an optional partial cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarPattern {
    /// Number of full (level five) cells.
    pub full: u32,
    /// Trailing partial cell, if the remainder is non-zero.
    pub partial: Option<BarLevel>,
}

impl BarPattern {
    /// Total cells the bar occupies.
    pub fn cell_count(&self) -> u32 {
        self.full + u32::from(self.partial.is_some())
    }
}

/// Quantize a percentage into a bar pattern.
///
/// Pure: equal inputs always produce equal bars. Negative and NaN inputs
/// quantize to an empty bar; values above 99 quantize as 99.
pub fn percent_to_bar(value: f64) -> BarPattern {
    // The saturating cast maps NaN and negatives to 0 and +inf to MAX,
    // so a single clamp covers every degenerate input.
    let v = (value as u32).min(99);

    BarPattern {
        full: v / 10,
        partial: BarLevel::from_remainder(v % 10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn worked_example_73() {
        // 73% → seven full cells plus a level-two partial.
        let bar = percent_to_bar(73.0);
        assert_eq!(bar.full, 7);
        assert_eq!(bar.partial, Some(BarLevel::Two));
        assert_eq!(bar.cell_count(), 8);
    }

    #[test]
    fn exact_tens_have_no_partial() {
        for v in [0.0, 10.0, 50.0, 90.0] {
            let bar = percent_to_bar(v);
            assert_eq!(bar.partial, None, "value {v}");
            assert_eq!(bar.full, v as u32 / 10);
        }
    }

    #[test]
    fn remainder_thresholds() {
        assert_eq!(percent_to_bar(41.0).partial, Some(BarLevel::One));
        assert_eq!(percent_to_bar(43.0).partial, Some(BarLevel::Two));
        assert_eq!(percent_to_bar(45.0).partial, Some(BarLevel::Three));
        assert_eq!(percent_to_bar(47.0).partial, Some(BarLevel::Four));
        assert_eq!(percent_to_bar(49.0).partial, Some(BarLevel::Five));
    }

    #[test]
    fn clamped_above_99() {
        let ceiling = percent_to_bar(99.0);
        assert_eq!(percent_to_bar(100.0), ceiling);
        assert_eq!(percent_to_bar(250.0), ceiling);
        assert_eq!(ceiling.full, 9);
        assert_eq!(ceiling.partial, Some(BarLevel::Five));
    }

    #[test]
    fn degenerate_inputs_are_empty() {
        for v in [-1.0, -100.0, f64::NAN, f64::NEG_INFINITY] {
            let bar = percent_to_bar(v);
            assert_eq!(bar.full, 0);
            assert_eq!(bar.partial, None);
        }
        // Positive infinity clamps like any oversized value.
        assert_eq!(percent_to_bar(f64::INFINITY), percent_to_bar(99.0));
    }

    proptest! {
        #[test]
        fn bar_length_is_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let cells_lo = percent_to_bar(lo).cell_count();
            let cells_hi = percent_to_bar(hi).cell_count();
            prop_assert!(cells_lo <= cells_hi);
        }

        #[test]
        fn bar_never_exceeds_ten_cells(v in any::<f64>()) {
            prop_assert!(percent_to_bar(v).cell_count() <= 10);
        }

        #[test]
        fn quantization_is_pure(v in 0.0f64..=150.0) {
            prop_assert_eq!(percent_to_bar(v), percent_to_bar(v));
        }
    }
}
