//! Result of one simulation run
//!
//! A [`RunResult`] is built once from the samples a run collected and never
//! changes afterwards. Summary statistics are computed at construction.

use crate::error::MetricsError;
use serde::{Deserialize, Serialize};

/// Parameters identifying a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    pub server_count: usize,
    /// Simulated duration in minutes
    pub horizon: f64,
    pub seed: u64,
}

/// Entity counters at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    /// Entities created by the arrival generator
    pub arrivals: u64,
    /// Entities that released their server
    pub departures: u64,
}

/// Statistics derived from the wait and service samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Mean wait in minutes
    pub avg_wait: f64,
    /// Sum of all waits in minutes
    pub total_wait: f64,
    pub max_wait: f64,
    /// Sum of service times over `server_count * horizon`, not clamped
    pub utilization: f64,
}

/// Outcome of one run: parameters, ordered samples and summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    parameters: RunParameters,
    wait_times: Vec<f64>,
    service_times: Vec<f64>,
    counts: RunCounts,
    summary: RunSummary,
}

impl RunResult {
    /// Build a result from the samples of a finished run.
    ///
    /// `wait_times[i]` and `service_times[i]` belong to the i-th entity that
    /// acquired a server.
    ///
    /// # Errors
    ///
    /// [`MetricsError::EmptyRun`] when no entity acquired a server, and
    /// [`MetricsError::InconsistentSamples`] when the two sequences differ in
    /// length.
    pub fn new(
        parameters: RunParameters,
        wait_times: Vec<f64>,
        service_times: Vec<f64>,
        counts: RunCounts,
    ) -> Result<Self, MetricsError> {
        if wait_times.len() != service_times.len() {
            return Err(MetricsError::InconsistentSamples {
                waits: wait_times.len(),
                services: service_times.len(),
            });
        }
        if wait_times.is_empty() {
            return Err(MetricsError::EmptyRun {
                server_count: parameters.server_count,
            });
        }

        let total_wait: f64 = wait_times.iter().sum();
        let avg_wait = total_wait / wait_times.len() as f64;
        let max_wait = wait_times.iter().copied().fold(0.0, f64::max);
        let total_service: f64 = service_times.iter().sum();
        let capacity = parameters.server_count as f64 * parameters.horizon;

        let summary = RunSummary {
            avg_wait,
            total_wait,
            max_wait,
            utilization: total_service / capacity,
        };

        Ok(Self {
            parameters,
            wait_times,
            service_times,
            counts,
            summary,
        })
    }

    pub fn parameters(&self) -> &RunParameters {
        &self.parameters
    }

    pub fn server_count(&self) -> usize {
        self.parameters.server_count
    }

    pub fn horizon(&self) -> f64 {
        self.parameters.horizon
    }

    pub fn seed(&self) -> u64 {
        self.parameters.seed
    }

    /// Waits in the order service started
    pub fn wait_times(&self) -> &[f64] {
        &self.wait_times
    }

    /// Service durations in the order service started
    pub fn service_times(&self) -> &[f64] {
        &self.service_times
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn avg_wait(&self) -> f64 {
        self.summary.avg_wait
    }

    pub fn total_wait(&self) -> f64 {
        self.summary.total_wait
    }

    pub fn arrivals(&self) -> u64 {
        self.counts.arrivals
    }

    /// Entities that acquired a server
    pub fn served(&self) -> u64 {
        self.wait_times.len() as u64
    }

    pub fn departures(&self) -> u64 {
        self.counts.departures
    }

    /// Entities still queued or in service when the run stopped
    pub fn in_system_at_end(&self) -> u64 {
        self.counts.arrivals.saturating_sub(self.counts.departures)
    }

    /// Raw utilization. Can exceed 1.0: service that started before the
    /// horizon is counted in full even if it ends after it.
    pub fn utilization(&self) -> f64 {
        self.summary.utilization
    }

    /// Utilization clamped to `[0, 1]` for display
    pub fn display_utilization(&self) -> f64 {
        self.summary.utilization.clamp(0.0, 1.0)
    }

    /// Whether the recorded service exceeds the available server time
    pub fn is_overloaded(&self) -> bool {
        self.summary.utilization > 1.0
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, MetricsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(server_count: usize, horizon: f64) -> RunParameters {
        RunParameters {
            server_count,
            horizon,
            seed: 42,
        }
    }

    #[test]
    fn test_summary() {
        let result = RunResult::new(
            params(2, 10.0),
            vec![0.0, 1.0, 5.0],
            vec![4.0, 4.0, 2.0],
            RunCounts {
                arrivals: 4,
                departures: 2,
            },
        )
        .unwrap();

        assert_eq!(result.avg_wait(), 2.0);
        assert_eq!(result.total_wait(), 6.0);
        assert_eq!(result.summary().max_wait, 5.0);
        assert_eq!(result.utilization(), 0.5);
        assert!(!result.is_overloaded());
        assert_eq!(result.served(), 3);
        assert_eq!(result.in_system_at_end(), 2);
    }

    #[test]
    fn test_overload_is_reported_not_clipped() {
        let result = RunResult::new(
            params(1, 10.0),
            vec![0.0, 3.0],
            vec![7.0, 8.0],
            RunCounts::default(),
        )
        .unwrap();
        assert_eq!(result.utilization(), 1.5);
        assert_eq!(result.display_utilization(), 1.0);
        assert!(result.is_overloaded());
    }

    #[test]
    fn test_empty_run() {
        let err = RunResult::new(params(3, 10.0), vec![], vec![], RunCounts::default()).unwrap_err();
        assert!(matches!(err, MetricsError::EmptyRun { server_count: 3 }));
    }

    #[test]
    fn test_inconsistent_samples() {
        let err = RunResult::new(params(1, 10.0), vec![1.0], vec![], RunCounts::default()).unwrap_err();
        assert!(matches!(
            err,
            MetricsError::InconsistentSamples { waits: 1, services: 0 }
        ));
    }

    #[test]
    fn test_json() {
        let result = RunResult::new(params(1, 60.0), vec![0.5], vec![2.0], RunCounts::default()).unwrap();
        let json = result.to_json().unwrap();
        assert!(json.contains("\"server_count\": 1"));
        let back: RunResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
