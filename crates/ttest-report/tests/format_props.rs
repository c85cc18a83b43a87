//! Properties of fixed-point rounding.

use proptest::prelude::*;
use ttest_report::to_fixed;

proptest! {
    #[test]
    fn rounded_value_is_within_half_a_unit(value in -1.0e6f64..1.0e6, decimals in 0usize..8) {
        let text = to_fixed(value, decimals);
        let parsed: f64 = text.parse().unwrap();
        let unit = 10f64.powi(-i32::try_from(decimals).unwrap());
        prop_assert!((parsed - value).abs() <= unit / 2.0 + 1e-9, "{value} -> {text}");
    }

    #[test]
    fn digit_count_matches_request(value in -1.0e6f64..1.0e6, decimals in 0usize..8) {
        let text = to_fixed(value, decimals);
        let fraction = text.split_once('.').map_or(0, |(_, f)| f.len());
        prop_assert_eq!(fraction, decimals);
    }

    #[test]
    fn symmetric_around_zero(value in 0.0f64..1.0e6, decimals in 0usize..6) {
        let positive = to_fixed(value, decimals);
        let negative = to_fixed(-value, decimals);
        if value == 0.0 {
            prop_assert_eq!(negative, positive);
        } else {
            prop_assert_eq!(negative, format!("-{positive}"));
        }
    }
}
