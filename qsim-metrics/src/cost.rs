//! Cost model: waiting time against server time
//!
//! Waiting is charged per minute of accumulated entity wait, servers per
//! minute of availability over the whole horizon whether busy or idle.

use crate::run_result::RunResult;
use qsim_core::SimError;
use serde::{Deserialize, Serialize};

/// Cost of one minute of waiting and of one server-minute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    pub waiting_per_minute: f64,
    pub server_per_minute: f64,
}

impl CostRates {
    /// 60 per hour of waiting
    pub const DEFAULT_WAITING_PER_HOUR: f64 = 60.0;
    /// 20 per hour per server
    pub const DEFAULT_SERVER_PER_HOUR: f64 = 20.0;

    /// Rates given per hour
    pub fn from_hourly(waiting_per_hour: f64, server_per_hour: f64) -> Self {
        Self {
            waiting_per_minute: waiting_per_hour / 60.0,
            server_per_minute: server_per_hour / 60.0,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        for (name, rate) in [
            ("waiting_per_minute", self.waiting_per_minute),
            ("server_per_minute", self.server_per_minute),
        ] {
            if !(rate.is_finite() && rate >= 0.0) {
                return Err(SimError::Configuration(format!(
                    "cost rate {name} must be finite and non-negative (got {rate})"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CostRates {
    fn default() -> Self {
        Self::from_hourly(Self::DEFAULT_WAITING_PER_HOUR, Self::DEFAULT_SERVER_PER_HOUR)
    }
}

/// Cost of one run split by source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub waiting_cost: f64,
    pub server_cost: f64,
    pub total_cost: f64,
}

/// Price the waiting and the servers of a run
pub fn calculate_costs(
    server_count: usize,
    total_wait: f64,
    horizon: f64,
    rates: &CostRates,
) -> CostBreakdown {
    let waiting_cost = total_wait * rates.waiting_per_minute;
    let server_cost = server_count as f64 * horizon * rates.server_per_minute;
    CostBreakdown {
        waiting_cost,
        server_cost,
        total_cost: waiting_cost + server_cost,
    }
}

impl RunResult {
    /// Costs of this run under `rates`
    pub fn costs(&self, rates: &CostRates) -> CostBreakdown {
        calculate_costs(self.server_count(), self.total_wait(), self.horizon(), rates)
    }
}
