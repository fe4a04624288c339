//! Results, costs and statistics of queueing runs
//!
//! This crate turns the samples collected by a run into a [`RunResult`],
//! prices it with a [`CostRates`] model, compares runs across server counts in
//! a [`SweepTable`] and describes the wait distribution. Results can be
//! exported through the `metrics` facade.

pub mod cost;
pub mod distribution;
pub mod error;
pub mod recorder;
pub mod run_result;
pub mod sweep;

pub use cost::{calculate_costs, CostBreakdown, CostRates};
pub use distribution::{HistogramBin, WaitDistribution, WaitPercentiles, DEFAULT_BINS};
pub use error::MetricsError;
pub use recorder::{
    record_run_metrics, record_sweep_metrics, with_snapshot_recorder, MetricsSnapshot,
    SnapshotRecorder,
};
pub use run_result::{RunCounts, RunParameters, RunResult, RunSummary};
pub use sweep::{SweepRow, SweepTable};
