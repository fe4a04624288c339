//! Behavioral properties of runs and sweeps

use qsim::prelude::*;
use qsim::DEFAULT_HORIZON;

#[test]
fn identical_inputs_give_identical_results() {
    let a = run(3, 10.0, 8.0, 500.0, 42).unwrap();
    let b = run(3, 10.0, 8.0, 500.0, 42).unwrap();
    assert_eq!(a.wait_times(), b.wait_times());
    assert_eq!(a, b);

    let c = run(3, 10.0, 8.0, 500.0, 43).unwrap();
    assert_ne!(a.wait_times(), c.wait_times());
}

#[test]
fn invalid_parameters_are_rejected_before_running() {
    assert_eq!(
        run(0, 10.0, 8.0, 500.0, 42).unwrap_err(),
        SimError::InvalidCapacity { server_count: 0 }
    );
    assert!(matches!(
        run(1, 0.0, 8.0, 500.0, 42),
        Err(SimError::InvalidRate { parameter: "inter_arrival_time", .. })
    ));
    assert!(matches!(
        run(1, 10.0, -8.0, 500.0, 42),
        Err(SimError::InvalidRate { parameter: "service_time", .. })
    ));
    assert!(matches!(
        run(1, 10.0, 8.0, -1.0, 42),
        Err(SimError::InvalidHorizon { .. })
    ));
    assert!(run(1, f64::NAN, 8.0, 500.0, 42).unwrap_err().is_configuration());
}

#[test]
fn subnormal_inter_arrival_time_is_rejected() {
    // The arrival rate of a subnormal mean overflows to infinity.
    assert!(matches!(
        run(1, 1.0e-320, 8.0, 1.0, 42),
        Err(SimError::InvalidRate { parameter: "inter_arrival_time", .. })
    ));
    assert!(matches!(
        run(1, 10.0, 1.0e-320, 1.0, 42),
        Err(SimError::InvalidRate { parameter: "service_time", .. })
    ));
}

#[test]
fn samples_are_non_negative() {
    let result = run(2, 4.0, 6.0, 2000.0, 7).unwrap();
    assert!(result.wait_times().iter().all(|w| *w >= 0.0));
    assert!(result.service_times().iter().all(|s| *s >= 0.0));
    assert_eq!(result.wait_times().len(), result.service_times().len());
}

#[test]
fn stable_configuration_has_finite_waits() {
    let result = run(5, 2.0, 8.0, 5000.0, 42).unwrap();
    assert!(result.served() > 1000);
    assert!(result.avg_wait().is_finite());
    assert!(result.avg_wait() < 8.0, "avg wait {}", result.avg_wait());
    assert!(result.utilization() < 1.0);
    assert!(!result.is_overloaded());
}

#[test]
fn overloaded_server_waits_grow_with_horizon() {
    let config = |horizon| {
        NodeConfig::builder()
            .server_count(1)
            .inter_arrival_time(5.0)
            .service(ServiceTimeDistribution::Exponential { mean: 8.0 })
            .horizon(horizon)
            .build()
            .unwrap()
    };
    let short = run_with(&config(500.0)).unwrap();
    let long = run_with(&config(5000.0)).unwrap();

    // Same streams: the short run's waits are a prefix of the long run's.
    assert_eq!(&long.wait_times()[..short.wait_times().len()], short.wait_times());
    assert!(long.avg_wait() > 2.0 * short.avg_wait());
    assert!(long.in_system_at_end() > short.in_system_at_end());
}

#[test]
fn one_server_is_heavily_loaded_at_default_rates() {
    let one = run_with(&NodeConfig {
        service: ServiceTimeDistribution::Exponential { mean: 8.0 },
        ..NodeConfig::new(1, 10.0, 8.0, DEFAULT_HORIZON, 42)
    })
    .unwrap();
    let two = run_with(&NodeConfig {
        service: ServiceTimeDistribution::Exponential { mean: 8.0 },
        ..NodeConfig::new(2, 10.0, 8.0, DEFAULT_HORIZON, 42)
    })
    .unwrap();

    // Offered load 0.8: long waits, but the queue is stable.
    assert!(one.utilization() > 0.6);
    assert!(!one.is_overloaded());
    assert!(one.avg_wait() > 5.0 * two.avg_wait());
}

#[test]
fn adding_servers_never_increases_average_wait() {
    let sweep = |policy| {
        let base = NodeConfig {
            horizon_policy: policy,
            ..NodeConfig::new(1, 4.0, 9.0, 3000.0, 11)
        };
        optimize_with(&SweepConfig::new(base, 1, 6)).unwrap()
    };

    for policy in [HorizonPolicy::Drain, HorizonPolicy::Truncate] {
        let table = sweep(policy);
        assert!(table.excluded().is_empty());
        for pair in table.rows().windows(2) {
            assert!(
                pair[1].avg_wait <= pair[0].avg_wait,
                "{policy:?}: {} servers wait {} > {} servers wait {}",
                pair[1].server_count,
                pair[1].avg_wait,
                pair[0].server_count,
                pair[0].avg_wait
            );
        }
    }
}

#[test]
fn drained_service_counts_against_the_horizon() {
    let config = |policy| NodeConfig {
        horizon_policy: policy,
        ..NodeConfig::new(2, 10.0, 8.0, 200.0, 5)
    };
    let truncated = run_with(&config(HorizonPolicy::Truncate)).unwrap();
    let drained = run_with(&config(HorizonPolicy::Drain)).unwrap();

    assert_eq!(drained.in_system_at_end(), 0);
    assert!(drained.served() >= truncated.served());
    assert!(drained.utilization() >= truncated.utilization());
    let busy: f64 = drained.service_times().iter().sum();
    assert!((drained.utilization() - busy / (2.0 * 200.0)).abs() < 1e-9);
}

#[test]
fn sweep_reports_the_cheapest_row() {
    let table = optimize(10.0, 8.0, DEFAULT_HORIZON, 1, 5).unwrap();

    let counts: Vec<usize> = table.rows().iter().map(|r| r.server_count).collect();
    assert_eq!(counts, vec![1, 2, 3, 4, 5]);

    let mut cheapest = table.rows()[0];
    for row in table.rows() {
        if row.total_cost < cheapest.total_cost {
            cheapest = *row;
        }
    }
    assert_eq!(table.optimum(), Some(&cheapest));

    let rates = CostRates::default();
    for row in table.rows() {
        let expected = row.server_count as f64 * DEFAULT_HORIZON * rates.server_per_minute;
        assert!((row.server_cost - expected).abs() < 1e-6);
        assert!((row.total_cost - row.waiting_cost - row.server_cost).abs() < 1e-6);
    }
}

#[test]
fn sweep_rejects_bad_ranges() {
    assert_eq!(
        optimize(10.0, 8.0, 100.0, 0, 3).unwrap_err(),
        SimError::InvalidCapacity { server_count: 0 }
    );
    assert!(matches!(
        optimize(10.0, 8.0, 100.0, 4, 2),
        Err(SimError::Configuration(_))
    ));
    assert!(matches!(
        optimize(-10.0, 8.0, 100.0, 1, 2),
        Err(SimError::InvalidRate { .. })
    ));
}

#[test]
fn runs_without_service_are_excluded_from_sweeps() {
    // The first arrival is expected a million minutes in: nobody shows up.
    assert_eq!(
        run(2, 1.0e6, 8.0, 1.0e-3, 42).unwrap_err(),
        SimError::EmptyRun { server_count: 2 }
    );

    let table = optimize(1.0e6, 8.0, 1.0e-3, 1, 3).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.excluded(), &[1, 2, 3]);
    assert_eq!(table.optimum(), None);
}

#[test]
fn first_arrival_at_start_always_serves_someone() {
    let config = NodeConfig {
        first_arrival: FirstArrival::AtStart,
        ..NodeConfig::new(2, 1.0e6, 8.0, 1.0e-3, 42)
    };
    let result = run_with(&config).unwrap();
    assert_eq!(result.served(), 1);
    assert_eq!(result.wait_times(), &[0.0]);
}

#[test]
fn sweep_config_from_json() {
    let config = SweepConfig::from_json_str(
        r#"{
            "base": {
                "server_count": 1,
                "inter_arrival_time": 10.0,
                "service": { "kind": "truncated_normal", "mean": 8.0, "stddev": 2.0 },
                "horizon": 600.0
            },
            "min_servers": 1,
            "max_servers": 3
        }"#,
    )
    .unwrap();
    assert_eq!(config.costs, CostRates::default());
    assert_eq!(config.base.seed, 42);

    let table = optimize_with(&config).unwrap();
    assert_eq!(table.rows().len() + table.excluded().len(), 3);
    assert_eq!(
        table.to_json().map(|json| json.contains("\"total_cost\"")).ok(),
        Some(true)
    );
}
