//! Derived reading channels: perturbation magnitude and its rolling maximum.

use std::collections::VecDeque;

use crate::{Error, Result};

/// Magnitude of the perturbation vector at each sample. Missing components
/// propagate as NaN.
pub fn magnitude(dbn: &[f64], dbe: &[f64], dbz: &[f64]) -> Result<Vec<f64>> {
    if dbn.len() != dbe.len() || dbn.len() != dbz.len() {
        return Err(Error::InconsistentSeries(format!(
            "component lengths differ: n={}, e={}, z={}",
            dbn.len(),
            dbe.len(),
            dbz.len()
        )));
    }

    Ok(dbn
        .iter()
        .zip(dbe)
        .zip(dbz)
        .map(|((n, e), z)| (n * n + e * e + z * z).sqrt())
        .collect())
}

/// Centered rolling maximum over `window` samples, clipped at the array
/// bounds. Non-finite samples are skipped; a window with no finite sample
/// yields NaN.
pub fn rolling_max(values: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 || window % 2 == 0 {
        return Err(Error::InvalidWindow(window));
    }

    let half = window / 2;
    let n = values.len();
    let mut maxima = Vec::with_capacity(n);

    // Indices of finite samples in the window, values strictly decreasing.
    let mut candidates: VecDeque<usize> = VecDeque::new();
    let mut next = 0;

    for i in 0..n {
        let upper = (i + half).min(n - 1);
        while next <= upper {
            let v = values[next];
            if v.is_finite() {
                while let Some(&back) = candidates.back() {
                    if values[back] <= v {
                        candidates.pop_back();
                    } else {
                        break;
                    }
                }
                candidates.push_back(next);
            }
            next += 1;
        }

        let lower = i.saturating_sub(half);
        while let Some(&front) = candidates.front() {
            if front < lower {
                candidates.pop_front();
            } else {
                break;
            }
        }

        maxima.push(candidates.front().map_or(f64::NAN, |&j| values[j]));
    }

    Ok(maxima)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn brute_force(values: &[f64], window: usize) -> Vec<f64> {
        let half = window / 2;
        (0..values.len())
            .map(|i| {
                let lo = i.saturating_sub(half);
                let hi = (i + half).min(values.len() - 1);
                values[lo..=hi]
                    .iter()
                    .copied()
                    .filter(|v| v.is_finite())
                    .fold(f64::NAN, f64::max)
            })
            .collect()
    }

    #[test]
    fn should_compute_magnitude() {
        let b = magnitude(&[3.0, f64::NAN], &[4.0, 1.0], &[0.0, 1.0]).unwrap();

        assert_eq!(b[0], 5.0);
        assert!(b[1].is_nan());
    }

    #[test]
    fn should_reject_mismatched_components() {
        assert!(magnitude(&[1.0], &[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn should_take_centered_max() {
        let values = [1.0, 5.0, 2.0, 3.0, 0.0, 4.0];
        let maxima = rolling_max(&values, 3).unwrap();

        assert_eq!(maxima, vec![5.0, 5.0, 5.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn should_match_brute_force_with_gaps() {
        let values: Vec<f64> = (0..200)
            .map(|i| {
                if i % 7 == 0 || (40..60).contains(&i) {
                    f64::NAN
                } else {
                    ((i * 37) % 23) as f64
                }
            })
            .collect();

        for window in [1, 3, 5, 11, 61] {
            let fast = rolling_max(&values, window).unwrap();
            let slow = brute_force(&values, window);
            for (i, (a, b)) in fast.iter().zip(&slow).enumerate() {
                assert!(
                    (a.is_nan() && b.is_nan()) || a == b,
                    "window {window}, index {i}: {a} != {b}"
                );
            }
        }
    }

    #[test]
    fn should_be_nan_when_window_has_no_finite_values() {
        let values = [1.0, f64::NAN, f64::NAN, f64::NAN, f64::NAN, 2.0];
        let maxima = rolling_max(&values, 3).unwrap();

        assert_eq!(maxima[1], 1.0);
        assert!(maxima[2].is_nan());
        assert!(maxima[3].is_nan());
        assert_eq!(maxima[4], 2.0);
    }

    #[test]
    fn should_reject_even_or_zero_window() {
        assert!(matches!(rolling_max(&[1.0], 0), Err(Error::InvalidWindow(0))));
        assert!(matches!(rolling_max(&[1.0], 4), Err(Error::InvalidWindow(4))));
    }

    #[test]
    fn should_handle_empty_series() {
        assert!(rolling_max(&[], 61).unwrap().is_empty());
    }
}
