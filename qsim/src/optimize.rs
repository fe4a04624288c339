//! Server-count sweep: find the cheapest number of servers

use crate::runner::run_with;
use qsim_components::{validate_range, NodeConfig, DEFAULT_SEED};
use qsim_core::SimError;
use qsim_metrics::{record_sweep_metrics, CostRates, SweepRow, SweepTable};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

pub const DEFAULT_MIN_SERVERS: usize = 1;
pub const DEFAULT_MAX_SERVERS: usize = 5;
/// Horizon of the optimizer front-end, in minutes
pub const DEFAULT_HORIZON: f64 = 5000.0;

/// A base configuration evaluated for every server count in
/// `min_servers..=max_servers`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Everything but the server count, which the sweep overrides
    pub base: NodeConfig,
    pub min_servers: usize,
    pub max_servers: usize,
    #[serde(default)]
    pub costs: CostRates,
}

impl SweepConfig {
    pub fn new(base: NodeConfig, min_servers: usize, max_servers: usize) -> Self {
        Self {
            base,
            min_servers,
            max_servers,
            costs: CostRates::default(),
        }
    }

    pub fn with_costs(mut self, costs: CostRates) -> Self {
        self.costs = costs;
        self
    }

    /// Parse a sweep from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: SweepConfig = serde_json::from_str(json)
            .map_err(|e| SimError::Configuration(format!("invalid sweep configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.min_servers == 0 {
            return Err(SimError::InvalidCapacity { server_count: 0 });
        }
        validate_range("min_servers", self.min_servers, 1, self.max_servers)?;
        self.costs.validate()?;
        self.base.with_server_count(self.min_servers).validate()
    }

    /// Node configurations of the sweep, ascending by server count
    pub fn configurations(&self) -> impl Iterator<Item = NodeConfig> + '_ {
        (self.min_servers..=self.max_servers).map(|n| self.base.with_server_count(n))
    }
}

/// Run the default model for each server count in `min_servers..=max_servers`
/// and price every run with the default cost rates.
///
/// Uses seed 42 for every run, so configurations share their arrival and
/// service streams.
///
/// # Example
///
/// ```
/// let table = qsim::optimize(10.0, 8.0, 1000.0, 1, 3).unwrap();
/// assert_eq!(table.rows().len() + table.excluded().len(), 3);
/// let best = table.optimum().unwrap();
/// assert!((1..=3).contains(&best.server_count));
/// ```
pub fn optimize(
    inter_arrival_time: f64,
    service_time: f64,
    horizon: f64,
    min_servers: usize,
    max_servers: usize,
) -> Result<SweepTable, SimError> {
    let base = NodeConfig::new(
        min_servers,
        inter_arrival_time,
        service_time,
        horizon,
        DEFAULT_SEED,
    );
    optimize_with(&SweepConfig::new(base, min_servers, max_servers))
}

/// Evaluate a sweep.
///
/// Every configuration is validated before the first run starts. Server
/// counts whose run served nobody are listed in [`SweepTable::excluded`]
/// instead of being priced.
#[instrument(skip(config), fields(min = config.min_servers, max = config.max_servers))]
pub fn optimize_with(config: &SweepConfig) -> Result<SweepTable, SimError> {
    config.validate()?;

    let mut rows = Vec::new();
    let mut excluded = Vec::new();
    for node in config.configurations() {
        match run_with(&node) {
            Ok(result) => rows.push(SweepRow::from_result(&result, &config.costs)),
            Err(SimError::EmptyRun { server_count }) => {
                warn!(servers = server_count, "No entity served, configuration excluded");
                excluded.push(server_count);
            }
            Err(e) => return Err(e),
        }
    }

    let table = SweepTable::new(rows, excluded);
    match table.optimum() {
        Some(best) => info!(
            servers = best.server_count,
            total_cost = best.total_cost,
            avg_wait = best.avg_wait,
            "Optimal server count found"
        ),
        None => warn!("Every configuration was excluded"),
    }
    record_sweep_metrics(&table);

    Ok(table)
}
