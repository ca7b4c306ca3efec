// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Deterministic synthetic windows shared by the benches.

use picks_eval::{EvaluationWindow, PhaseWindow};

pub fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

fn unit(state: &mut u64) -> f64 {
    (lcg_next(state) >> 11) as f64 / (1u64 << 53) as f64
}

/// A low-noise probability trace with Gaussian-shaped arrivals and the
/// arrival positions, jittered by a few samples, as references.
pub fn synthetic_phase(len: usize, arrivals: usize, state: &mut u64) -> PhaseWindow {
    let mut probabilities = (0..len).map(|_| unit(state) * 0.05).collect::<Vec<_>>();
    let mut references = Vec::with_capacity(arrivals);

    for _ in 0..arrivals {
        if len == 0 {
            break;
        }
        let center = (lcg_next(state) as usize) % len;
        let height = 0.4 + unit(state) * 0.6;
        for (idx, value) in probabilities.iter_mut().enumerate() {
            let offset = idx as f64 - center as f64;
            *value = value.max(height * (-(offset * offset) / 50.0).exp());
        }
        let jitter = (lcg_next(state) % 11) as usize;
        references.push((center + jitter).saturating_sub(5).min(len - 1));
    }
    references.sort_unstable();

    PhaseWindow {
        probabilities,
        references,
    }
}

pub fn synthetic_windows(count: usize, len: usize, seed: u64) -> Vec<EvaluationWindow> {
    let mut state = seed;
    (0..count)
        .map(|idx| EvaluationWindow {
            id: Some(format!("synthetic-{idx}")),
            p: synthetic_phase(len, 2, &mut state),
            s: synthetic_phase(len, 2, &mut state),
        })
        .collect()
}
