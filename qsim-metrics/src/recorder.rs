//! Export of run and sweep results through the `metrics` facade
//!
//! [`record_run_metrics`] and [`record_sweep_metrics`] emit standard `metrics`
//! gauges, counters and histograms labelled by server count, so any installed
//! exporter picks them up. [`SnapshotRecorder`] collects them in memory
//! instead; install it locally to avoid global state:
//!
//! ```rust
//! use qsim_metrics::recorder::{with_snapshot_recorder, MetricsSnapshot};
//!
//! let ((), snapshot) = with_snapshot_recorder(|| {
//!     metrics::gauge!("qsim_utilization", "servers" => "2").set(0.75);
//! });
//! assert_eq!(snapshot.gauge("qsim_utilization", &[("servers", "2")]), Some(0.75));
//! ```

use crate::run_result::RunResult;
use crate::sweep::SweepTable;
use metrics::{
    counter, gauge, histogram, Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder,
    SharedString, Unit,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Emit the metrics of one run
pub fn record_run_metrics(result: &RunResult) {
    let servers = result.server_count().to_string();

    gauge!("qsim_avg_wait_minutes", "servers" => servers.clone()).set(result.avg_wait());
    gauge!("qsim_max_wait_minutes", "servers" => servers.clone()).set(result.summary().max_wait);
    gauge!("qsim_utilization", "servers" => servers.clone()).set(result.utilization());
    counter!("qsim_entities_arrived_total", "servers" => servers.clone()).increment(result.arrivals());
    counter!("qsim_entities_served_total", "servers" => servers.clone()).increment(result.served());

    let waits = histogram!("qsim_wait_minutes", "servers" => servers);
    for wait in result.wait_times() {
        waits.record(*wait);
    }
}

/// Emit one gauge set per sweep row plus the optimum
pub fn record_sweep_metrics(table: &SweepTable) {
    for row in table.rows() {
        let servers = row.server_count.to_string();
        gauge!("qsim_sweep_avg_wait_minutes", "servers" => servers.clone()).set(row.avg_wait);
        gauge!("qsim_sweep_utilization", "servers" => servers.clone()).set(row.utilization);
        gauge!("qsim_sweep_total_cost", "servers" => servers).set(row.total_cost);
    }
    if let Some(best) = table.optimum() {
        gauge!("qsim_sweep_optimal_servers").set(best.server_count as f64);
    }
    counter!("qsim_sweep_excluded_total").increment(table.excluded().len() as u64);
}

/// Metric values captured by a [`SnapshotRecorder`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, f64>,
    histograms: BTreeMap<String, Vec<f64>>,
}

impl MetricsSnapshot {
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        self.counters.get(&series_key(name, labels)).copied()
    }

    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.gauges.get(&series_key(name, labels)).copied()
    }

    pub fn histogram(&self, name: &str, labels: &[(&str, &str)]) -> Option<&[f64]> {
        self.histograms
            .get(&series_key(name, labels))
            .map(Vec::as_slice)
    }

    /// Every gauge as `(series, value)`, sorted by series
    pub fn gauges(&self) -> impl Iterator<Item = (&str, f64)> {
        self.gauges.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

fn series_key(name: &str, labels: &[(&str, &str)]) -> String {
    let mut labels: Vec<String> = labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
    labels.sort();
    if labels.is_empty() {
        name.to_string()
    } else {
        format!("{name}{{{}}}", labels.join(","))
    }
}

fn owned_series_key(key: &Key) -> String {
    let labels: Vec<(&str, &str)> = key.labels().map(|l| (l.key(), l.value())).collect();
    series_key(key.name(), &labels)
}

type Shared = Arc<Mutex<MetricsSnapshot>>;

fn lock(shared: &Shared) -> MutexGuard<'_, MetricsSnapshot> {
    // A panic while holding the lock cannot leave a half-written value behind.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// `metrics::Recorder` that keeps the latest values in memory
#[derive(Debug, Clone, Default)]
pub struct SnapshotRecorder {
    shared: Shared,
}

impl SnapshotRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> MetricsSnapshot {
        lock(&self.shared).clone()
    }
}

/// Run `f` with a fresh [`SnapshotRecorder`] installed for the current thread
pub fn with_snapshot_recorder<T>(f: impl FnOnce() -> T) -> (T, MetricsSnapshot) {
    let recorder = SnapshotRecorder::new();
    let value = metrics::with_local_recorder(&recorder, f);
    (value, recorder.snapshot())
}

struct Series {
    shared: Shared,
    key: String,
}

impl metrics::CounterFn for Series {
    fn increment(&self, value: u64) {
        *lock(&self.shared).counters.entry(self.key.clone()).or_default() += value;
    }

    fn absolute(&self, value: u64) {
        let mut snapshot = lock(&self.shared);
        let current = snapshot.counters.entry(self.key.clone()).or_default();
        *current = (*current).max(value);
    }
}

impl metrics::GaugeFn for Series {
    fn increment(&self, value: f64) {
        *lock(&self.shared).gauges.entry(self.key.clone()).or_default() += value;
    }

    fn decrement(&self, value: f64) {
        *lock(&self.shared).gauges.entry(self.key.clone()).or_default() -= value;
    }

    fn set(&self, value: f64) {
        lock(&self.shared).gauges.insert(self.key.clone(), value);
    }
}

impl metrics::HistogramFn for Series {
    fn record(&self, value: f64) {
        lock(&self.shared)
            .histograms
            .entry(self.key.clone())
            .or_default()
            .push(value);
    }
}

impl SnapshotRecorder {
    fn series(&self, key: &Key) -> Arc<Series> {
        Arc::new(Series {
            shared: self.shared.clone(),
            key: owned_series_key(key),
        })
    }
}

impl Recorder for SnapshotRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(self.series(key))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(self.series(key))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(self.series(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostRates;
    use crate::run_result::{RunCounts, RunParameters};
    use crate::sweep::{SweepRow, SweepTable};

    fn result(server_count: usize) -> RunResult {
        RunResult::new(
            RunParameters {
                server_count,
                horizon: 100.0,
                seed: 42,
            },
            vec![0.0, 2.0, 4.0],
            vec![10.0, 10.0, 10.0],
            RunCounts {
                arrivals: 5,
                departures: 3,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_run_metrics() {
        let run = result(2);
        let ((), snapshot) = with_snapshot_recorder(|| record_run_metrics(&run));

        let servers = [("servers", "2")];
        assert_eq!(snapshot.gauge("qsim_avg_wait_minutes", &servers), Some(2.0));
        assert_eq!(snapshot.gauge("qsim_utilization", &servers), Some(0.15));
        assert_eq!(snapshot.counter("qsim_entities_arrived_total", &servers), Some(5));
        assert_eq!(snapshot.counter("qsim_entities_served_total", &servers), Some(3));
        assert_eq!(
            snapshot.histogram("qsim_wait_minutes", &servers),
            Some(&[0.0, 2.0, 4.0][..])
        );
        assert_eq!(snapshot.gauge("qsim_avg_wait_minutes", &[("servers", "3")]), None);
    }

    #[test]
    fn test_sweep_metrics() {
        let rates = CostRates::default();
        let table = SweepTable::new(
            vec![
                SweepRow::from_result(&result(1), &rates),
                SweepRow::from_result(&result(2), &rates),
            ],
            vec![3],
        );
        let ((), snapshot) = with_snapshot_recorder(|| record_sweep_metrics(&table));

        assert_eq!(snapshot.gauge("qsim_sweep_optimal_servers", &[]), Some(1.0));
        assert_eq!(snapshot.counter("qsim_sweep_excluded_total", &[]), Some(1));
        assert!(snapshot
            .gauge("qsim_sweep_total_cost", &[("servers", "2")])
            .is_some());
        assert_eq!(snapshot.gauges().count(), 7);
    }

    #[test]
    fn test_series_key_is_label_order_independent() {
        assert_eq!(
            series_key("m", &[("b", "2"), ("a", "1")]),
            series_key("m", &[("a", "1"), ("b", "2")])
        );
        assert_eq!(series_key("m", &[]), "m");
    }
}
