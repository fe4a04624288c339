//! Find the number of loading ramps with the lowest total cost
//!
//! ```bash
//! cargo run --example ramp_optimizer -- [inter_arrival] [service_time] [detail_servers]
//! ```
//!
//! Defaults: a truck every 10 minutes, 8 minutes per truck, wait histogram for
//! 2 ramps. Waiting costs 60 per hour, a ramp 20 per hour.

use qsim::prelude::*;
use qsim::metrics::DEFAULT_BINS;
use qsim::{DEFAULT_HORIZON, DEFAULT_MAX_SERVERS, DEFAULT_MIN_SERVERS};

fn arg<T: std::str::FromStr>(index: usize, default: T) -> T {
    std::env::args()
        .nth(index)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn main() -> Result<(), SimError> {
    init_simulation_logging_with_level("warn");

    let inter_arrival_time: f64 = arg(1, 10.0);
    let service_time: f64 = arg(2, 8.0);
    let detail_servers: usize = arg(3, 2);

    println!(
        "Ramp optimizer: arrival every {inter_arrival_time} min, service {service_time} min, {DEFAULT_HORIZON} min simulated\n"
    );

    let table = optimize(
        inter_arrival_time,
        service_time,
        DEFAULT_HORIZON,
        DEFAULT_MIN_SERVERS,
        DEFAULT_MAX_SERVERS,
    )?;

    let Some(best) = table.optimum() else {
        println!("No configuration served anyone. Slow the arrivals down or shorten the service.");
        return Ok(());
    };

    println!("{table}");
    println!(
        "Optimum: {} ramps, total cost {:.2} over {DEFAULT_HORIZON} minutes\n",
        best.server_count, best.total_cost
    );

    let detail = run(
        detail_servers,
        inter_arrival_time,
        service_time,
        DEFAULT_HORIZON,
        qsim::components::DEFAULT_SEED,
    )?;
    let distribution = WaitDistribution::from_result(&detail)?;
    let percentiles = distribution.percentiles();

    println!(
        "Wait distribution for {detail_servers} ramps (avg {:.2} min, p50 {:.2}, p90 {:.2}, p99 {:.2}, max {:.2})",
        detail.avg_wait(),
        percentiles.p50,
        percentiles.p90,
        percentiles.p99,
        percentiles.max
    );

    let bins = distribution.histogram(DEFAULT_BINS)?;
    let peak = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    for bin in &bins {
        let bar = "#".repeat((bin.count * 50 / peak) as usize);
        println!("{:>8.2} - {:>8.2} | {:<50} {}", bin.lower, bin.upper, bar, bin.count);
    }

    Ok(())
}
