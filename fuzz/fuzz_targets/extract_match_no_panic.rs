// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use picks_core::ExtractConfig;
use picks_eval::match_picks;
use picks_extract::extract_picks;

const MAX_SAMPLES: usize = 4096;
const MAX_REFERENCES: usize = 16;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let threshold = 0.01 + f64::from(data[0]) / 255.0 * 0.99;
    let min_distance = 1 + usize::from(data[1] % 128);
    let tolerance = 1 + usize::from(data[2] % 64);
    let smooth = data[3] & 1 == 1;
    let rest = &data[4..];

    let reference_count = rest.first().map_or(0, |&raw| usize::from(raw) % (MAX_REFERENCES + 1));
    let references = rest
        .iter()
        .skip(1)
        .take(reference_count * 2)
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|pair| {
            let hi = usize::from(*pair[0]);
            let lo = pair.get(1).map_or(0, |&&byte| usize::from(byte));
            (hi << 8) | lo
        })
        .collect::<Vec<_>>();

    let signal = rest
        .iter()
        .skip(1 + reference_count * 2)
        .take(MAX_SAMPLES)
        .map(|&byte| f64::from(byte) / 255.0)
        .collect::<Vec<_>>();

    let config = ExtractConfig {
        threshold,
        min_distance,
        smooth,
    };
    let extracted = match extract_picks(&signal, &config) {
        Ok(extracted) => extracted,
        Err(_) => return,
    };
    for pair in extracted.picks.windows(2) {
        assert!(pair[1].index - pair[0].index >= min_distance);
    }

    let candidates = extracted.indices();
    let outcome = match_picks(&candidates, &references, tolerance)
        .expect("small indices and positive tolerance must match");
    let stats = outcome.stats;
    assert_eq!(stats.true_positives + stats.false_negatives, stats.total);
    assert_eq!(stats.total, references.len());
    assert!(stats.true_positives <= candidates.len().min(references.len()));
    assert_eq!(
        outcome.fp_residuals.len(),
        outcome.unmatched_candidates.len() * references.len()
    );
});
