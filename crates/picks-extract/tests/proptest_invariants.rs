// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use picks_core::ExtractConfig;
use picks_extract::extract_picks;
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn probability_signal() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=1.0, 0..400)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        ..ProptestConfig::default()
    })]

    #[test]
    fn picks_respect_threshold_spacing_and_order(
        signal in probability_signal(),
        threshold in 0.05f64..=1.0,
        min_distance in 1usize..80,
        smooth in any::<bool>(),
    ) {
        let config = ExtractConfig { threshold, min_distance, smooth };
        let extracted = extract_picks(&signal, &config).expect("finite signal should extract");

        prop_assert_eq!(extracted.processed.len(), signal.len());
        for pick in &extracted.picks {
            prop_assert!(pick.index > 0 && pick.index + 1 < signal.len());
            prop_assert!(pick.amplitude >= threshold);
            prop_assert_eq!(pick.amplitude, extracted.processed[pick.index]);
            prop_assert!(pick.prominence > 0.0);
            prop_assert!(pick.width.is_finite() && pick.width > 0.0);
            prop_assert!(pick.left_ip < pick.index as f64 + 0.5);
            prop_assert!(pick.right_ip > pick.index as f64 - 0.5);
        }
        for pair in extracted.picks.windows(2) {
            prop_assert!(pair[1].index - pair[0].index >= min_distance);
        }
    }

    #[test]
    fn extraction_is_deterministic(
        signal in probability_signal(),
        min_distance in 1usize..80,
    ) {
        let config = ExtractConfig { threshold: 0.2, min_distance, smooth: true };
        let first = extract_picks(&signal, &config).expect("first run should extract");
        let second = extract_picks(&signal, &config).expect("second run should extract");
        prop_assert_eq!(first, second);
    }
}
