//! Shape of the wait-time distribution of a run
//!
//! Percentiles come from an HDR histogram recorded at millisecond resolution
//! (three significant digits); the equal-width histogram is computed exactly
//! from the samples.

use crate::error::MetricsError;
use crate::run_result::RunResult;
use hdrhistogram::Histogram as HdrHistogram;
use serde::{Deserialize, Serialize};

/// Histogram units per minute
const UNITS_PER_MINUTE: f64 = 60_000.0;

/// Bin count of the wait histogram shown by the optimizer front-end
pub const DEFAULT_BINS: usize = 20;

/// One bin of an equal-width histogram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
    /// `count / (total * width)`: the bins integrate to 1
    pub density: f64,
}

/// Percentile summary of waits, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaitPercentiles {
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub max: f64,
}

/// Wait samples of one run with percentile and histogram queries
#[derive(Debug, Clone)]
pub struct WaitDistribution {
    samples: Vec<f64>,
    hdr: HdrHistogram<u64>,
    min: f64,
    max: f64,
}

impl WaitDistribution {
    pub fn from_result(result: &RunResult) -> Result<Self, MetricsError> {
        Self::from_samples(result.wait_times())
    }

    pub fn from_samples(samples: &[f64]) -> Result<Self, MetricsError> {
        if samples.is_empty() {
            return Err(MetricsError::Histogram("no wait samples".to_string()));
        }

        let mut hdr = HdrHistogram::<u64>::new(3)
            .map_err(|e| MetricsError::Histogram(format!("{e:?}")))?;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &wait in samples {
            if !(wait.is_finite() && wait >= 0.0) {
                return Err(MetricsError::Histogram(format!("invalid wait sample {wait}")));
            }
            hdr.record((wait * UNITS_PER_MINUTE).round() as u64)
                .map_err(|e| MetricsError::Histogram(format!("{e:?}")))?;
            min = min.min(wait);
            max = max.max(wait);
        }

        Ok(Self {
            samples: samples.to_vec(),
            hdr,
            min,
            max,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Share of entities that did not wait at all
    pub fn zero_wait_fraction(&self) -> f64 {
        let zeros = self.samples.iter().filter(|w| **w == 0.0).count();
        zeros as f64 / self.samples.len() as f64
    }

    /// Wait at quantile `q` in `[0, 1]`, within the histogram's precision
    pub fn quantile(&self, q: f64) -> f64 {
        self.hdr.value_at_quantile(q.clamp(0.0, 1.0)) as f64 / UNITS_PER_MINUTE
    }

    pub fn percentiles(&self) -> WaitPercentiles {
        WaitPercentiles {
            p50: self.quantile(0.50),
            p90: self.quantile(0.90),
            p99: self.quantile(0.99),
            max: self.max,
        }
    }

    /// Equal-width histogram over `[min, max]` with density normalization
    pub fn histogram(&self, bins: usize) -> Result<Vec<HistogramBin>, MetricsError> {
        if bins == 0 {
            return Err(MetricsError::Histogram("bin count must be positive".to_string()));
        }

        let lower = self.min;
        // All samples equal: give the single value a unit-wide range.
        let upper = if self.max > self.min { self.max } else { self.min + 1.0 };
        let width = (upper - lower) / bins as f64;

        let mut counts = vec![0u64; bins];
        for &wait in &self.samples {
            let index = (((wait - lower) / width).floor() as usize).min(bins - 1);
            counts[index] += 1;
        }

        let total = self.samples.len() as f64;
        Ok(counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lower + i as f64 * width,
                upper: lower + (i + 1) as f64 * width,
                count,
                density: count as f64 / (total * width),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentiles() {
        let samples: Vec<f64> = (1..=100).map(f64::from).collect();
        let dist = WaitDistribution::from_samples(&samples).unwrap();
        let p = dist.percentiles();
        assert!((p.p50 - 50.0).abs() < 0.1, "p50 = {}", p.p50);
        assert!((p.p90 - 90.0).abs() < 0.1, "p90 = {}", p.p90);
        assert!((p.p99 - 99.0).abs() < 0.1, "p99 = {}", p.p99);
        assert_eq!(p.max, 100.0);
        assert_eq!(dist.min(), 1.0);
    }

    #[test]
    fn test_histogram_counts_and_density() {
        let samples = [0.0, 0.0, 0.5, 1.0, 2.5, 4.0];
        let dist = WaitDistribution::from_samples(&samples).unwrap();
        let bins = dist.histogram(4).unwrap();

        assert_eq!(bins.len(), 4);
        let counts: Vec<u64> = bins.iter().map(|b| b.count).collect();
        // Width 1.0: [0,1) [1,2) [2,3) [3,4], the maximum lands in the last bin.
        assert_eq!(counts, vec![3, 1, 1, 1]);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[3].upper, 4.0);

        let area: f64 = bins.iter().map(|b| b.density * (b.upper - b.lower)).sum();
        assert!((area - 1.0).abs() < 1e-12);
        assert_eq!(dist.zero_wait_fraction(), 2.0 / 6.0);
    }

    #[test]
    fn test_histogram_single_value() {
        let dist = WaitDistribution::from_samples(&[0.0, 0.0, 0.0]).unwrap();
        let bins = dist.histogram(DEFAULT_BINS).unwrap();
        assert_eq!(bins.len(), DEFAULT_BINS);
        assert_eq!(bins[0].count, 3);
        assert!(bins[1..].iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            WaitDistribution::from_samples(&[]),
            Err(MetricsError::Histogram(_))
        ));
        assert!(matches!(
            WaitDistribution::from_samples(&[1.0, -2.0]),
            Err(MetricsError::Histogram(_))
        ));
        let dist = WaitDistribution::from_samples(&[1.0]).unwrap();
        assert!(dist.histogram(0).is_err());
    }
}
