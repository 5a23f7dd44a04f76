//! Pooled reading distributions for diagnostics.

use crate::{constants::MAX_HISTOGRAM_BINS, Dataset, Error, Result};

/// Every finite reading of every station, pooled per channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distributions {
    pub instantaneous: Vec<f64>,
    pub rolling_max: Vec<f64>,
}

impl Distributions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut distributions = Distributions::default();

        for series in dataset.stations().values() {
            distributions
                .instantaneous
                .extend(series.b.iter().copied().filter(|v| v.is_finite()));
            distributions
                .rolling_max
                .extend(series.bmax.iter().copied().filter(|v| v.is_finite()));
        }

        distributions
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub density: f64,
}

/// Probability-density histogram of `values` over `[min, max]` with bins of
/// `width` (the last bin may be narrower). Values outside the range are
/// ignored; densities integrate to one over the range.
pub fn histogram(values: &[f64], min: f64, max: f64, width: f64) -> Result<Vec<Bin>> {
    let invalid = || Error::InvalidHistogram { min, max, width };

    let finite = min.is_finite() && max.is_finite() && width.is_finite();
    if !finite || max <= min || width <= 0.0 {
        return Err(invalid());
    }

    let bins = ((max - min) / width).ceil();
    if !bins.is_finite() || bins > MAX_HISTOGRAM_BINS as f64 {
        return Err(invalid());
    }
    let count = bins as usize;
    let mut counts = vec![0usize; count];
    let mut total = 0usize;

    for &v in values {
        if !v.is_finite() || v < min || v > max {
            continue;
        }
        let index = (((v - min) / width) as usize).min(count - 1);
        counts[index] += 1;
        total += 1;
    }

    let bins = counts
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            let lower = min + i as f64 * width;
            let upper = (lower + width).min(max);
            let density = if total == 0 {
                0.0
            } else {
                n as f64 / (total as f64 * (upper - lower))
            };
            Bin {
                lower,
                upper,
                density,
            }
        })
        .collect();

    Ok(bins)
}

// -- Tests -------------------------------------------------------------------
