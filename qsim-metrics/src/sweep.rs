//! Comparison of runs that differ only in server count

use crate::cost::{CostBreakdown, CostRates};
use crate::error::MetricsError;
use crate::run_result::RunResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One evaluated server count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub server_count: usize,
    /// Mean wait in minutes
    pub avg_wait: f64,
    pub waiting_cost: f64,
    pub server_cost: f64,
    pub total_cost: f64,
    /// Raw utilization, may exceed 1.0
    pub utilization: f64,
    pub overloaded: bool,
}

impl SweepRow {
    pub fn from_result(result: &RunResult, rates: &CostRates) -> Self {
        let CostBreakdown {
            waiting_cost,
            server_cost,
            total_cost,
        } = result.costs(rates);
        Self {
            server_count: result.server_count(),
            avg_wait: result.avg_wait(),
            waiting_cost,
            server_cost,
            total_cost,
            utilization: result.utilization(),
            overloaded: result.is_overloaded(),
        }
    }
}

/// Rows of a sweep sorted by server count, plus the server counts whose run
/// served nobody
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepTable {
    rows: Vec<SweepRow>,
    excluded: Vec<usize>,
}

impl SweepTable {
    pub fn new(mut rows: Vec<SweepRow>, mut excluded: Vec<usize>) -> Self {
        rows.sort_by_key(|row| row.server_count);
        excluded.sort_unstable();
        Self { rows, excluded }
    }

    /// Evaluated rows, ascending by server count
    pub fn rows(&self) -> &[SweepRow] {
        &self.rows
    }

    /// Server counts left out because their run produced no samples
    pub fn excluded(&self) -> &[usize] {
        &self.excluded
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, server_count: usize) -> Option<&SweepRow> {
        self.rows.iter().find(|row| row.server_count == server_count)
    }

    /// Row with the lowest total cost; the smallest server count wins a tie.
    ///
    /// `None` when every configuration was excluded.
    pub fn optimum(&self) -> Option<&SweepRow> {
        self.rows.iter().min_by(|a, b| {
            a.total_cost
                .total_cmp(&b.total_cost)
                .then(a.server_count.cmp(&b.server_count))
        })
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, MetricsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SweepTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>7} {:>14} {:>14} {:>14} {:>14} {:>8}",
            "servers", "avg wait", "waiting cost", "server cost", "total cost", "util"
        )?;
        let best = self.optimum().map(|row| row.server_count);
        for row in &self.rows {
            let marker = if Some(row.server_count) == best { " *" } else { "" };
            let overload = if row.overloaded { " !" } else { "" };
            writeln!(
                f,
                "{:>7} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>7.1}%{}{}",
                row.server_count,
                row.avg_wait,
                row.waiting_cost,
                row.server_cost,
                row.total_cost,
                row.utilization * 100.0,
                overload,
                marker
            )?;
        }
        for server_count in &self.excluded {
            writeln!(f, "{server_count:>7} (no entity served)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(server_count: usize, total_cost: f64) -> SweepRow {
        SweepRow {
            server_count,
            avg_wait: 0.0,
            waiting_cost: 0.0,
            server_cost: total_cost,
            total_cost,
            utilization: 0.5,
            overloaded: false,
        }
    }

    #[test]
    fn test_rows_sorted() {
        let table = SweepTable::new(vec![row(3, 10.0), row(1, 30.0), row(2, 20.0)], vec![5, 4]);
        let counts: Vec<usize> = table.rows().iter().map(|r| r.server_count).collect();
        assert_eq!(counts, vec![1, 2, 3]);
        assert_eq!(table.excluded(), &[4, 5]);
        assert_eq!(table.row(2).map(|r| r.total_cost), Some(20.0));
    }

    #[test]
    fn test_optimum_prefers_fewer_servers_on_tie() {
        let table = SweepTable::new(vec![row(3, 10.0), row(2, 10.0), row(1, 30.0)], vec![]);
        assert_eq!(table.optimum().map(|r| r.server_count), Some(2));
    }

    #[test]
    fn test_empty_table_has_no_optimum() {
        let table = SweepTable::new(vec![], vec![1, 2]);
        assert!(table.is_empty());
        assert_eq!(table.optimum(), None);
    }

    #[test]
    fn test_display_marks_optimum() {
        let table = SweepTable::new(vec![row(1, 30.0), row(2, 20.0)], vec![3]);
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].ends_with(" *"));
        assert!(!lines[1].ends_with(" *"));
        assert!(lines[3].contains("no entity served"));
    }
}
