//! Distribution traits and implementations for arrival patterns and service times
//!
//! This module provides the random variate generators that drive a service
//! node: exponential inter-arrival gaps for the arrival process and a
//! configurable service-time distribution. Every generator owns a seeded
//! [`ChaCha8Rng`], so a fixed seed reproduces the exact same sample stream.

use crate::error::SimError;
use crate::randomness::{stream_rng, STREAM_ARRIVALS, STREAM_SERVICE};
use crate::{SimTime, SimulationConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Exp, Normal};
use serde::{Deserialize, Serialize};

/// Trait for generating arrival patterns
///
/// This trait abstracts over different arrival patterns for entity generation
/// (Poisson, constant, ...).
pub trait ArrivalPattern: Send {
    /// Get the time until the next arrival
    fn next_arrival_time(&mut self) -> SimTime;
}

/// Trait for sampling service times from a distribution
pub trait ServiceTimeSampler: Send {
    /// Sample the service duration of a single entity
    fn sample(&mut self) -> SimTime;
}

/// Check that a mean time in minutes can parameterize a distribution.
///
/// The mean must be positive and finite and so must its reciprocal rate, which
/// rules out subnormal means whose rate overflows to infinity.
pub fn check_mean(parameter: &'static str, mean: f64) -> Result<(), SimError> {
    if mean.is_finite() && mean > 0.0 && (1.0 / mean).is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidRate { parameter, value: mean })
    }
}

// =============================================================================
// Arrival Pattern Implementations
// =============================================================================

/// Simple constant arrival pattern
///
/// Generates arrivals with a fixed inter-arrival time.
#[derive(Debug, Clone)]
pub struct ConstantArrivalPattern {
    inter_arrival_time: SimTime,
}

impl ConstantArrivalPattern {
    /// Create a new constant arrival pattern
    pub fn new(inter_arrival_time: SimTime) -> Self {
        Self { inter_arrival_time }
    }
}

impl ArrivalPattern for ConstantArrivalPattern {
    fn next_arrival_time(&mut self) -> SimTime {
        self.inter_arrival_time
    }
}

/// Poisson arrival process
///
/// Inter-arrival gaps are exponentially distributed with the given mean
/// (equivalently, rate `1 / mean` arrivals per minute).
#[derive(Debug, Clone)]
pub struct ExponentialArrivals {
    mean: f64,
    rng: ChaCha8Rng,
    exp_dist: Exp<f64>,
}

impl ExponentialArrivals {
    /// Create a new Poisson arrival process
    ///
    /// # Arguments
    ///
    /// * `mean_inter_arrival` - Mean gap between arrivals in minutes
    /// * `seed` - Run seed; the arrival stream is derived from it
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRate`] if the mean is not positive and finite.
    pub fn new(mean_inter_arrival: f64, seed: u64) -> Result<Self, SimError> {
        check_mean("inter_arrival_time", mean_inter_arrival)?;
        let exp_dist = Exp::new(1.0 / mean_inter_arrival).map_err(|_| SimError::InvalidRate {
            parameter: "inter_arrival_time",
            value: mean_inter_arrival,
        })?;

        Ok(Self {
            mean: mean_inter_arrival,
            rng: stream_rng(seed, STREAM_ARRIVALS),
            exp_dist,
        })
    }

    /// Create an arrival process seeded from the simulation configuration
    pub fn from_config(config: &SimulationConfig, mean_inter_arrival: f64) -> Result<Self, SimError> {
        Self::new(mean_inter_arrival, config.seed)
    }

    /// Mean inter-arrival time in minutes
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Arrival rate in entities per minute
    pub fn rate(&self) -> f64 {
        1.0 / self.mean
    }
}

impl ArrivalPattern for ExponentialArrivals {
    fn next_arrival_time(&mut self) -> SimTime {
        SimTime::from_minutes(self.rng.sample(self.exp_dist))
    }
}

// =============================================================================
// Service Time Distribution Implementations
// =============================================================================

/// Constant service time distribution
///
/// Always returns the same service time.
#[derive(Debug, Clone)]
pub struct ConstantServiceTime {
    duration: SimTime,
}

impl ConstantServiceTime {
    /// Create a new constant service time distribution
    pub fn new(duration: SimTime) -> Self {
        Self { duration }
    }
}

impl ServiceTimeSampler for ConstantServiceTime {
    fn sample(&mut self) -> SimTime {
        self.duration
    }
}

/// Exponential service time distribution (the "M" in M/M/s)
#[derive(Debug, Clone)]
pub struct ExponentialServiceTime {
    mean: f64,
    rng: ChaCha8Rng,
    exp_dist: Exp<f64>,
}

impl ExponentialServiceTime {
    /// Create a new exponential service time distribution with the given mean
    /// in minutes.
    pub fn new(mean: f64, seed: u64) -> Result<Self, SimError> {
        check_mean("service_time", mean)?;
        let exp_dist = Exp::new(1.0 / mean).map_err(|_| SimError::InvalidRate {
            parameter: "service_time",
            value: mean,
        })?;

        Ok(Self {
            mean,
            rng: stream_rng(seed, STREAM_SERVICE),
            exp_dist,
        })
    }

    /// Mean service time in minutes
    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl ServiceTimeSampler for ExponentialServiceTime {
    fn sample(&mut self) -> SimTime {
        SimTime::from_minutes(self.rng.sample(self.exp_dist))
    }
}

/// Normal service time distribution clamped at zero
///
/// Negative draws are truncated to `0.0`, not resampled, so the realized mean
/// is slightly above `mean` when `stddev` is large relative to it.
#[derive(Debug, Clone)]
pub struct TruncatedNormalServiceTime {
    mean: f64,
    stddev: f64,
    rng: ChaCha8Rng,
    normal: Normal<f64>,
}

impl TruncatedNormalServiceTime {
    /// Create a truncated normal distribution
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRate`] for a non-positive mean and
    /// [`SimError::Configuration`] for a negative or non-finite stddev.
    pub fn new(mean: f64, stddev: f64, seed: u64) -> Result<Self, SimError> {
        check_mean("service_time", mean)?;
        if !(stddev.is_finite() && stddev >= 0.0) {
            return Err(SimError::Configuration(format!(
                "service time stddev must be finite and non-negative (got {stddev})"
            )));
        }
        let normal = Normal::new(mean, stddev)
            .map_err(|e| SimError::Configuration(format!("normal distribution: {e}")))?;

        Ok(Self {
            mean,
            stddev,
            rng: stream_rng(seed, STREAM_SERVICE),
            normal,
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn stddev(&self) -> f64 {
        self.stddev
    }
}

impl ServiceTimeSampler for TruncatedNormalServiceTime {
    fn sample(&mut self) -> SimTime {
        let draw: f64 = self.rng.sample(self.normal);
        SimTime::from_minutes(draw.max(0.0))
    }
}

/// Configurable service-time distribution of a service node
///
/// This is the serializable description; [`ServiceTimeDistribution::sampler`]
/// turns it into a seeded [`ServiceTimeSampler`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceTimeDistribution {
    /// Exponential with the given mean (M/M/s)
    Exponential { mean: f64 },
    /// Normal with the given mean and stddev, negative draws clamped to 0 (M/G/s)
    TruncatedNormal { mean: f64, stddev: f64 },
    /// Every entity takes exactly `duration` minutes (M/D/s)
    Constant { duration: f64 },
}

impl ServiceTimeDistribution {
    /// Standard deviation used when only a mean service time is given.
    pub const DEFAULT_STDDEV: f64 = 2.0;

    /// Truncated normal with [`Self::DEFAULT_STDDEV`] spread.
    pub fn with_default_spread(mean: f64) -> Self {
        ServiceTimeDistribution::TruncatedNormal {
            mean,
            stddev: Self::DEFAULT_STDDEV,
        }
    }

    /// Nominal mean service time in minutes
    pub fn mean(&self) -> f64 {
        match *self {
            ServiceTimeDistribution::Exponential { mean } => mean,
            ServiceTimeDistribution::TruncatedNormal { mean, .. } => mean,
            ServiceTimeDistribution::Constant { duration } => duration,
        }
    }

    /// Check the distribution parameters without building a sampler
    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            ServiceTimeDistribution::Exponential { mean } => check_mean("service_time", mean),
            ServiceTimeDistribution::TruncatedNormal { mean, stddev } => {
                check_mean("service_time", mean)?;
                if stddev.is_finite() && stddev >= 0.0 {
                    Ok(())
                } else {
                    Err(SimError::Configuration(format!(
                        "service time stddev must be finite and non-negative (got {stddev})"
                    )))
                }
            }
            ServiceTimeDistribution::Constant { duration } => check_mean("service_time", duration),
        }
    }

    /// Build a seeded sampler for this distribution
    pub fn sampler(&self, seed: u64) -> Result<Box<dyn ServiceTimeSampler>, SimError> {
        Ok(match *self {
            ServiceTimeDistribution::Exponential { mean } => {
                Box::new(ExponentialServiceTime::new(mean, seed)?)
            }
            ServiceTimeDistribution::TruncatedNormal { mean, stddev } => {
                Box::new(TruncatedNormalServiceTime::new(mean, stddev, seed)?)
            }
            ServiceTimeDistribution::Constant { duration } => {
                check_mean("service_time", duration)?;
                Box::new(ConstantServiceTime::new(SimTime::from_minutes(duration)))
            }
        })
    }
}
