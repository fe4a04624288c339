//! Simulation time management

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Simulation time measured in minutes
///
/// SimTime represents either a point in simulation time (minutes since the
/// simulation start) or a relative delay. It wraps an `f64` and is totally
/// ordered through [`f64::total_cmp`], so it can live inside the scheduler's
/// priority queue.
///
/// Constructing a SimTime never fails; whether a value is acceptable as a
/// scheduling delay is decided by [`SimTime::is_valid_delay`] and enforced by
/// the [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(f64);

impl SimTime {
    /// Create a new SimTime at the simulation start (time zero)
    pub const fn zero() -> Self {
        SimTime(0.0)
    }

    /// Create a SimTime from minutes
    pub const fn from_minutes(minutes: f64) -> Self {
        SimTime(minutes)
    }

    /// Create a SimTime from hours
    pub fn from_hours(hours: f64) -> Self {
        SimTime(hours * 60.0)
    }

    /// Get the raw number of minutes
    pub const fn as_minutes(&self) -> f64 {
        self.0
    }

    /// Get the value in hours
    pub fn as_hours(&self) -> f64 {
        self.0 / 60.0
    }

    /// Whether the value is finite and not NaN
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Whether this value can be used as a relative scheduling delay
    /// (finite and `>= 0`).
    pub fn is_valid_delay(&self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }

    /// Elapsed time since an earlier instant, saturating at zero
    pub fn duration_since(&self, earlier: SimTime) -> SimTime {
        SimTime((self.0 - earlier.0).max(0.0))
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<SimTime> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> Self::Output {
        SimTime(self.0 + rhs.0)
    }
}

impl AddAssign<SimTime> for SimTime {
    fn add_assign(&mut self, rhs: SimTime) {
        self.0 += rhs.0;
    }
}

impl Sub<SimTime> for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.duration_since(rhs)
    }
}

impl Mul<f64> for SimTime {
    type Output = SimTime;

    fn mul(self, rhs: f64) -> Self::Output {
        SimTime(self.0 * rhs)
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::zero()
    }
}

impl From<f64> for SimTime {
    /// Convert from minutes (as f64) to SimTime
    ///
    /// # Examples
    /// ```
    /// # use qsim_core::SimTime;
    /// let time = SimTime::from(1.5);
    /// assert_eq!(time.as_minutes(), 1.5);
    /// ```
    fn from(minutes: f64) -> Self {
        SimTime(minutes)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.abs() >= 60.0 {
            write!(f, "{:.2}h", self.as_hours())
        } else {
            write!(f, "{:.3}min", self.0)
        }
    }
}
