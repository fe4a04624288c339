//! Configuration of a single service node run
//!
//! [`NodeConfig`] is a plain serde struct so runs can be described in JSON:
//!
//! ```
//! use qsim_components::config::{HorizonPolicy, NodeConfig};
//!
//! let config = NodeConfig::from_json_str(
//!     r#"{
//!         "server_count": 3,
//!         "inter_arrival_time": 10.0,
//!         "service": { "kind": "exponential", "mean": 8.0 },
//!         "horizon": 500.0
//!     }"#,
//! )
//! .unwrap();
//! assert_eq!(config.seed, 42);
//! assert_eq!(config.horizon_policy, HorizonPolicy::Truncate);
//! ```

use crate::builder::{require, validate_finite, validate_positive};
use qsim_core::{check_mean, ServiceTimeDistribution, SimError, SimTime, SimulationConfig};
use serde::{Deserialize, Serialize};

/// Seed used when a configuration does not name one
pub const DEFAULT_SEED: u64 = 42;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// What happens to entities still in the system when the horizon is reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonPolicy {
    /// Stop at the horizon. Entities already in service keep their samples,
    /// entities still queued contribute nothing.
    #[default]
    Truncate,
    /// Stop admitting arrivals at the horizon, then keep running until every
    /// entity in the system has departed.
    ///
    /// Utilization still divides by `server_count * horizon`, so service done
    /// after the horizon inflates it and can flag a stable node as overloaded.
    Drain,
}

/// When the first entity arrives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstArrival {
    /// After one sampled inter-arrival gap
    #[default]
    AfterGap,
    /// At time zero; later arrivals follow sampled gaps
    AtStart,
}

/// Parameters of one run of a service node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Number of identical servers (ramps, bays, ...)
    pub server_count: usize,
    /// Mean gap between arrivals in minutes
    pub inter_arrival_time: f64,
    /// Service-time distribution
    pub service: ServiceTimeDistribution,
    /// Simulated duration in minutes
    pub horizon: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub horizon_policy: HorizonPolicy,
    #[serde(default)]
    pub first_arrival: FirstArrival,
}

impl NodeConfig {
    /// Configuration with the default service distribution: normal with
    /// mean `service_time` and a 2 minute spread, clamped at zero.
    pub fn new(
        server_count: usize,
        inter_arrival_time: f64,
        service_time: f64,
        horizon: f64,
        seed: u64,
    ) -> Self {
        Self {
            server_count,
            inter_arrival_time,
            service: ServiceTimeDistribution::with_default_spread(service_time),
            horizon,
            seed,
            horizon_policy: HorizonPolicy::default(),
            first_arrival: FirstArrival::default(),
        }
    }

    pub fn builder() -> NodeConfigBuilder {
        NodeConfigBuilder::default()
    }

    /// Parse a configuration from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: NodeConfig = serde_json::from_str(json)
            .map_err(|e| SimError::Configuration(format!("invalid node configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter. Nothing may be scheduled before this passes.
    ///
    /// Checks run in a fixed order (capacity, rates, horizon) so a
    /// configuration with several problems always reports the same one.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.server_count == 0 {
            return Err(SimError::InvalidCapacity {
                server_count: self.server_count,
            });
        }
        check_mean("inter_arrival_time", self.inter_arrival_time)?;
        self.service.validate()?;
        if validate_positive("horizon", self.horizon).is_err()
            || validate_finite("horizon", self.horizon).is_err()
        {
            return Err(SimError::InvalidHorizon {
                horizon: self.horizon,
            });
        }
        Ok(())
    }

    /// Same configuration with a different server count
    pub fn with_server_count(mut self, server_count: usize) -> Self {
        self.server_count = server_count;
        self
    }

    pub fn horizon_time(&self) -> SimTime {
        SimTime::from_minutes(self.horizon)
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig { seed: self.seed }
    }

    /// Offered load in Erlangs: mean service time over mean inter-arrival time
    pub fn offered_load(&self) -> f64 {
        self.service.mean() / self.inter_arrival_time
    }

    /// Long-run fraction of server capacity the load would use.
    ///
    /// At or above 1.0 the queue grows without bound.
    pub fn nominal_utilization(&self) -> f64 {
        self.offered_load() / self.server_count as f64
    }
}

/// Builder for [`NodeConfig`]
#[derive(Debug, Clone, Default)]
pub struct NodeConfigBuilder {
    server_count: Option<usize>,
    inter_arrival_time: Option<f64>,
    service: Option<ServiceTimeDistribution>,
    horizon: Option<f64>,
    seed: Option<u64>,
    horizon_policy: HorizonPolicy,
    first_arrival: FirstArrival,
}

impl NodeConfigBuilder {
    pub fn server_count(mut self, server_count: usize) -> Self {
        self.server_count = Some(server_count);
        self
    }

    pub fn inter_arrival_time(mut self, minutes: f64) -> Self {
        self.inter_arrival_time = Some(minutes);
        self
    }

    /// Mean service time with the default normal spread
    pub fn service_time(mut self, minutes: f64) -> Self {
        self.service = Some(ServiceTimeDistribution::with_default_spread(minutes));
        self
    }

    pub fn service(mut self, service: ServiceTimeDistribution) -> Self {
        self.service = Some(service);
        self
    }

    pub fn horizon(mut self, minutes: f64) -> Self {
        self.horizon = Some(minutes);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn horizon_policy(mut self, policy: HorizonPolicy) -> Self {
        self.horizon_policy = policy;
        self
    }

    pub fn first_arrival(mut self, first_arrival: FirstArrival) -> Self {
        self.first_arrival = first_arrival;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<NodeConfig, SimError> {
        let config = NodeConfig {
            server_count: require("server_count", self.server_count)?,
            inter_arrival_time: require("inter_arrival_time", self.inter_arrival_time)?,
            service: require("service", self.service)?,
            horizon: require("horizon", self.horizon)?,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            horizon_policy: self.horizon_policy,
            first_arrival: self.first_arrival,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_spread() {
        let config = NodeConfig::new(3, 10.0, 8.0, 500.0, 1);
        assert_eq!(
            config.service,
            ServiceTimeDistribution::TruncatedNormal { mean: 8.0, stddev: 2.0 }
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.offered_load(), 0.8);
    }

    #[test]
    fn test_validation_order() {
        // Capacity is reported first even when the rates are broken too.
        let config = NodeConfig::new(0, -1.0, 8.0, 0.0, 1);
        assert_eq!(config.validate(), Err(SimError::InvalidCapacity { server_count: 0 }));

        let config = NodeConfig::new(1, 0.0, 8.0, 500.0, 1);
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidRate { parameter: "inter_arrival_time", .. })
        ));

        let config = NodeConfig::new(1, 10.0, -8.0, 500.0, 1);
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidRate { parameter: "service_time", .. })
        ));

        let config = NodeConfig::new(1, 10.0, 8.0, 0.0, 1);
        assert_eq!(config.validate(), Err(SimError::InvalidHorizon { horizon: 0.0 }));

        let config = NodeConfig::new(1, 10.0, 8.0, f64::INFINITY, 1);
        assert!(matches!(config.validate(), Err(SimError::InvalidHorizon { .. })));
    }

    #[test]
    fn test_builder() {
        let config = NodeConfig::builder()
            .server_count(2)
            .inter_arrival_time(5.0)
            .service(ServiceTimeDistribution::Exponential { mean: 4.0 })
            .horizon(100.0)
            .horizon_policy(HorizonPolicy::Drain)
            .build()
            .unwrap();
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.horizon_policy, HorizonPolicy::Drain);
        assert_eq!(config.first_arrival, FirstArrival::AfterGap);
    }

    #[test]
    fn test_builder_missing_field() {
        let err = NodeConfig::builder()
            .server_count(2)
            .inter_arrival_time(5.0)
            .horizon(100.0)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SimError::Configuration("Missing required field 'service'".to_string())
        );
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let err = NodeConfig::from_json_str(
            r#"{"server_count":0,"inter_arrival_time":1.0,
                "service":{"kind":"constant","duration":1.0},"horizon":10.0}"#,
        )
        .unwrap_err();
        assert_eq!(err, SimError::InvalidCapacity { server_count: 0 });

        assert!(matches!(
            NodeConfig::from_json_str("{}"),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn test_json_policies() {
        let config = NodeConfig::from_json_str(
            r#"{"server_count":1,"inter_arrival_time":1.0,
                "service":{"kind":"truncated_normal","mean":1.0,"stddev":0.5},
                "horizon":10.0,"seed":7,
                "horizon_policy":"drain","first_arrival":"at_start"}"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.horizon_policy, HorizonPolicy::Drain);
        assert_eq!(config.first_arrival, FirstArrival::AtStart);
    }

    #[test]
    fn test_nominal_utilization() {
        let config = NodeConfig::new(5, 2.0, 8.0, 5000.0, 42);
        assert_eq!(config.nominal_utilization(), 0.8);
        assert_eq!(config.with_server_count(4).nominal_utilization(), 1.0);
    }
}
