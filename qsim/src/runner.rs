//! Single runs of a service node

use qsim_components::{HorizonPolicy, NodeConfig, NodeEvent, ServiceNode};
use qsim_core::logging::{events, simulation_span};
use qsim_core::{Executor, SimError, SimTime, Simulation};
use qsim_metrics::{record_run_metrics, RunCounts, RunParameters, RunResult};
use tracing::{info, instrument, warn};

/// Simulate `server_count` servers for `horizon` minutes.
///
/// Arrivals are Poisson with mean gap `inter_arrival_time`; service times are
/// normal with mean `service_time` and a 2 minute spread, clamped at zero.
/// All times are in minutes.
///
/// # Errors
///
/// Configuration errors ([`SimError::InvalidCapacity`],
/// [`SimError::InvalidRate`], [`SimError::InvalidHorizon`]) are reported before
/// anything is simulated. [`SimError::EmptyRun`] means no entity reached a
/// server within the horizon.
///
/// # Example
///
/// ```
/// let result = qsim::run(3, 10.0, 8.0, 500.0, 42).unwrap();
/// assert!(result.avg_wait() >= 0.0);
/// assert_eq!(result.server_count(), 3);
/// ```
pub fn run(
    server_count: usize,
    inter_arrival_time: f64,
    service_time: f64,
    horizon: f64,
    seed: u64,
) -> Result<RunResult, SimError> {
    run_with(&NodeConfig::new(
        server_count,
        inter_arrival_time,
        service_time,
        horizon,
        seed,
    ))
}

/// Simulate an arbitrary node configuration
#[instrument(skip(config), fields(servers = config.server_count, seed = config.seed))]
pub fn run_with(config: &NodeConfig) -> Result<RunResult, SimError> {
    config.validate()?;

    let node = ServiceNode::from_config(config)?;
    let name = node.name().to_string();
    let _span = simulation_span(&name, config.seed).entered();
    let horizon = config.horizon_time();

    let mut sim = Simulation::new(config.simulation_config());
    let key = sim.add_component(node);
    sim.schedule(SimTime::zero(), key, NodeEvent::Start)?;

    events::simulation_started(&name, horizon);
    sim.run_until(horizon);

    // Service completed while draining still counts against `N * horizon`.
    if config.horizon_policy == HorizonPolicy::Drain {
        if let Some(node) = sim.get_component_mut::<NodeEvent, ServiceNode>(key) {
            node.close();
        }
        sim.execute(Executor::unbound());
    }

    if let Some(fault) = sim.take_fault() {
        return Err(fault);
    }
    events::simulation_completed(&name, sim.time(), sim.events_processed());

    let node = sim
        .remove_component::<NodeEvent, ServiceNode>(key)
        .ok_or_else(|| SimError::Internal(format!("{name} vanished during the run")))?;
    let context = node.into_context();

    let result = RunResult::new(
        RunParameters {
            server_count: config.server_count,
            horizon: config.horizon,
            seed: config.seed,
        },
        context.wait_times,
        context.service_times,
        RunCounts {
            arrivals: context.arrivals,
            departures: context.departures,
        },
    )?;

    if result.is_overloaded() {
        warn!(
            servers = config.server_count,
            utilization = result.utilization(),
            "Recorded service exceeds server capacity over the horizon"
        );
    }
    info!(
        avg_wait = result.avg_wait(),
        utilization = result.utilization(),
        served = result.served(),
        in_system = result.in_system_at_end(),
        "Run finished"
    );
    record_run_metrics(&result);

    Ok(result)
}
