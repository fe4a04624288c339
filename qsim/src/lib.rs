//! # qsim - M/G/s queueing simulation
//!
//! qsim simulates a station with a fixed number of identical servers (loading
//! ramps, service bays, repair crews) fed by Poisson arrivals, and finds the
//! server count that minimizes the combined cost of waiting and of running
//! servers.
//!
//! ## Quick Start
//!
//! ```
//! // 3 servers, an arrival every 10 minutes on average, 8 minute service,
//! // 500 simulated minutes, seed 42
//! let result = qsim::run(3, 10.0, 8.0, 500.0, 42).unwrap();
//! println!("average wait: {:.2} min", result.avg_wait());
//!
//! let table = qsim::optimize(10.0, 8.0, 5000.0, 1, 5).unwrap();
//! if let Some(best) = table.optimum() {
//!     println!("cheapest: {} servers at {:.2}", best.server_count, best.total_cost);
//! }
//! ```
//!
//! Identical inputs always produce identical results.

pub mod optimize;
pub mod runner;

pub use qsim_components as components;
pub use qsim_core as engine;
pub use qsim_metrics as metrics;

pub use optimize::{
    optimize, optimize_with, SweepConfig, DEFAULT_HORIZON, DEFAULT_MAX_SERVERS,
    DEFAULT_MIN_SERVERS,
};
pub use runner::{run, run_with};

// Convenience re-exports of commonly used items
pub mod prelude {
    //! Commonly used types and functions

    pub use crate::{optimize, optimize_with, run, run_with, SweepConfig};

    pub use qsim_core::{
        init_simulation_logging, init_simulation_logging_with_level, ServiceTimeDistribution,
        SimError, SimTime,
    };

    pub use qsim_components::{FirstArrival, HorizonPolicy, NodeConfig};

    pub use qsim_metrics::{CostRates, RunResult, SweepRow, SweepTable, WaitDistribution};
}
