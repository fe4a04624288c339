//! One detailed run of a service node
//!
//! ```bash
//! cargo run --example single_run
//! cargo run --example single_run -- config.json --json
//! RUST_LOG=debug cargo run --example single_run
//! ```
//!
//! Without a configuration file the run uses 3 servers, exponential service
//! with mean 8 minutes, an arrival every 10 minutes and 500 simulated minutes.

use qsim::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_simulation_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let as_json = args.iter().any(|a| a == "--json");
    let config = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => NodeConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => NodeConfig::builder()
            .server_count(3)
            .inter_arrival_time(10.0)
            .service(ServiceTimeDistribution::Exponential { mean: 8.0 })
            .horizon(500.0)
            .build()?,
    };

    let result = run_with(&config)?;

    if as_json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    let costs = result.costs(&CostRates::default());
    println!("Servers:           {}", result.server_count());
    println!("Offered load:      {:.2} Erlang", config.offered_load());
    println!("Arrivals:          {}", result.arrivals());
    println!("Served:            {}", result.served());
    println!("Still in system:   {}", result.in_system_at_end());
    println!("Average wait:      {:.3} min", result.avg_wait());
    println!("Maximum wait:      {:.3} min", result.summary().max_wait);
    println!(
        "Utilization:       {:.1}%{}",
        result.display_utilization() * 100.0,
        if result.is_overloaded() { " (overloaded)" } else { "" }
    );
    println!("Waiting cost:      {:.2}", costs.waiting_cost);
    println!("Server cost:       {:.2}", costs.server_cost);
    println!("Total cost:        {:.2}", costs.total_cost);

    Ok(())
}
