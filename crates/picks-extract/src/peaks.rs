// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Indices of all local maxima, in signal order.
///
/// A maximum must be strictly higher than its left neighbour and strictly
/// higher than the first differing sample to its right. Flat plateaus resolve
/// to their midpoint (rounded down). The first and last samples are never
/// maxima.
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    let n = values.len();
    let mut maxima = Vec::new();
    if n < 3 {
        return maxima;
    }

    let last = n - 1;
    let mut idx = 1usize;
    while idx < last {
        if values[idx - 1] < values[idx] {
            let mut ahead = idx + 1;
            while ahead < last && values[ahead] == values[idx] {
                ahead += 1;
            }
            if values[ahead] < values[idx] {
                let left_edge = idx;
                let right_edge = ahead - 1;
                maxima.push((left_edge + right_edge) / 2);
                idx = ahead;
            }
        }
        idx += 1;
    }

    maxima
}

/// Keeps peaks whose height is at least `min_height`.
pub fn select_by_height(peaks: &[usize], values: &[f64], min_height: f64) -> Vec<usize> {
    peaks
        .iter()
        .copied()
        .filter(|&peak| values[peak] >= min_height)
        .collect()
}

/// Enforces a minimum spacing of `distance` samples between kept peaks.
///
/// Peaks are visited from highest to lowest; each surviving peak removes all
/// neighbours closer than `distance`. Equal heights are visited right to
/// left. `peaks` must be sorted ascending and the result keeps that order.
pub fn select_by_distance(peaks: &[usize], values: &[f64], distance: usize) -> Vec<usize> {
    if peaks.len() < 2 || distance <= 1 {
        return peaks.to_vec();
    }

    let mut by_priority: Vec<usize> = (0..peaks.len()).collect();
    by_priority.sort_by(|&left, &right| values[peaks[left]].total_cmp(&values[peaks[right]]));

    let mut keep = vec![true; peaks.len()];
    for &position in by_priority.iter().rev() {
        if !keep[position] {
            continue;
        }

        let center = peaks[position];
        let mut k = position;
        while k > 0 && center - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }

        let mut k = position + 1;
        while k < peaks.len() && peaks[k] - center < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&peak, kept)| kept.then_some(peak))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{local_maxima, select_by_distance, select_by_height};

    #[test]
    fn local_maxima_ignores_edges_and_short_signals() {
        assert!(local_maxima(&[]).is_empty());
        assert!(local_maxima(&[1.0, 0.0]).is_empty());
        assert!(local_maxima(&[1.0, 0.5, 0.0]).is_empty());
        assert!(local_maxima(&[0.0, 0.5, 1.0]).is_empty());
        assert_eq!(local_maxima(&[0.0, 1.0, 0.0]), vec![1]);
    }

    #[test]
    fn local_maxima_resolves_plateaus_to_midpoint() {
        assert_eq!(local_maxima(&[0.0, 2.0, 2.0, 2.0, 0.0]), vec![2]);
        assert_eq!(local_maxima(&[0.0, 2.0, 2.0, 0.0]), vec![1]);
    }

    #[test]
    fn local_maxima_skips_plateaus_that_keep_rising_or_touch_the_end() {
        assert!(local_maxima(&[0.0, 1.0, 1.0, 2.0]).is_empty());
        assert!(local_maxima(&[0.0, 1.0, 1.0, 1.0]).is_empty());
        assert_eq!(local_maxima(&[0.0, 1.0, 1.0, 2.0, 0.0]), vec![3]);
    }

    #[test]
    fn local_maxima_returns_all_peaks_in_order() {
        let values = [0.0, 0.4, 0.1, 0.9, 0.2, 0.2, 0.7, 0.0];
        assert_eq!(local_maxima(&values), vec![1, 3, 6]);
    }

    #[test]
    fn height_selection_is_inclusive() {
        let values = [0.0, 0.2, 0.0, 0.19, 0.0, 0.5, 0.0];
        let peaks = local_maxima(&values);
        assert_eq!(select_by_height(&peaks, &values, 0.2), vec![1, 5]);
    }

    #[test]
    fn distance_selection_keeps_the_higher_of_two_close_peaks() {
        let mut values = vec![0.0; 40];
        values[10] = 0.6;
        values[15] = 0.9;
        values[30] = 0.4;
        let peaks = local_maxima(&values);
        assert_eq!(peaks, vec![10, 15, 30]);
        assert_eq!(select_by_distance(&peaks, &values, 10), vec![15, 30]);
        assert_eq!(select_by_distance(&peaks, &values, 16), vec![15]);
        assert_eq!(select_by_distance(&peaks, &values, 5), vec![10, 15, 30]);
    }

    #[test]
    fn distance_selection_suppressed_peaks_do_not_suppress_others() {
        let mut values = vec![0.0; 30];
        values[10] = 0.9;
        values[14] = 0.8;
        values[18] = 0.7;
        let peaks = local_maxima(&values);
        assert_eq!(peaks, vec![10, 14, 18]);
        assert_eq!(select_by_distance(&peaks, &values, 5), vec![10, 18]);
        assert_eq!(select_by_distance(&peaks, &values, 9), vec![10]);
        assert_eq!(select_by_distance(&peaks, &values, 4), vec![10, 14, 18]);
    }

    #[test]
    fn distance_selection_visits_equal_heights_right_to_left() {
        let mut values = vec![0.0; 20];
        values[4] = 0.5;
        values[8] = 0.5;
        let peaks = local_maxima(&values);
        assert_eq!(select_by_distance(&peaks, &values, 6), vec![8]);
    }
}
