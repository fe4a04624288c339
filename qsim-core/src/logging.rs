//! Structured logging for discrete event simulation debugging
//!
//! The engine logs through `tracing`; this module only installs a subscriber
//! and provides a few span/event helpers shared by the crates of the workspace.
//!
//! # Controlling output
//!
//! ```bash
//! # Default (info level)
//! cargo run --example ramp_optimizer
//!
//! # Pool decisions and run summaries
//! RUST_LOG=debug cargo run --example ramp_optimizer
//!
//! # Every scheduled and processed event (very verbose)
//! RUST_LOG=qsim_core::scheduler=trace cargo run --example single_run
//! ```
//!
//! Level guidelines:
//! - **TRACE**: event scheduling and dispatch
//! - **DEBUG**: server pool grants, queueing, releases
//! - **INFO**: run start/end, sweep progress
//! - **WARN**: overloaded configurations, dropped events
//! - **ERROR**: aborted runs

use crate::SimTime;
use tracing::{info, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the simulation with sensible defaults
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific level
///
/// `RUST_LOG` takes precedence when it is set. Calling this more than once is
/// harmless: later calls keep the first subscriber.
///
/// # Example
/// ```rust
/// use qsim_core::logging::init_simulation_logging_with_level;
///
/// init_simulation_logging_with_level("debug");
/// ```
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{level},qsim_core::scheduler=info").into()
    });

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Simulation logging initialized at level: {}", level);
    }
}

/// Initialize logging with every event of the engine visible
pub fn init_detailed_simulation_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trace,qsim_core=trace,qsim_components=trace,qsim_metrics=debug".into());

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Detailed simulation logging initialized");
    }
}

/// Create a span for tracking simulation execution
pub fn simulation_span(name: &str, seed: u64) -> Span {
    tracing::info_span!("simulation", name = name, seed = seed)
}

/// Create a span for tracking component execution
pub fn component_span(component_name: &str, component_id: &str) -> Span {
    tracing::debug_span!("component", name = component_name, id = component_id)
}

/// Logging utilities for common simulation events
pub mod events {
    use super::*;

    /// Log simulation start
    pub fn simulation_started(name: &str, horizon: SimTime) {
        info!(simulation = name, horizon = %horizon, "Simulation started");
    }

    /// Log simulation completion
    pub fn simulation_completed(name: &str, final_time: SimTime, events_processed: u64) {
        info!(
            simulation = name,
            final_time = %final_time,
            events_processed = events_processed,
            "Simulation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, trace};

    #[test]
    fn test_logging_initialization() {
        init_simulation_logging_with_level("debug");
        // A second call must not panic.
        init_simulation_logging();

        info!("Test info message");
        debug!("Test debug message");
        trace!("Test trace message");
    }

    #[test]
    fn test_span_creation() {
        let _sim_span = simulation_span("test_simulation", 42).entered();
        let _comp_span = component_span("service_node", "node_1");
        events::simulation_started("test_sim", SimTime::from_minutes(500.0));
        events::simulation_completed("test_sim", SimTime::from_minutes(499.0), 100);
    }
}
