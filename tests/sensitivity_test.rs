extern crate rand;
extern crate rand_hc;
extern crate PerfTCO;

use rand::SeedableRng;
use rand_hc::Hc128Rng;
use PerfTCO::analysis::cost::OperatingPoint;
use PerfTCO::analysis::sensitivity::{self, UncertaintyRanges};
use PerfTCO::model::params::{CostParameters, Metric, NUM_PARAMS};

fn operating_point() -> OperatingPoint {
    OperatingPoint {
        count: 64,
        per_node: 8,
        unit_cost: 15000.0,
        perf: 2900.0,
        watts: 340.0,
    }
}

fn rich_params() -> CostParameters {
    // every vector slot nonzero so no epsilon substitution kicks in
    CostParameters {
        node_server: 60000.0,
        node_infrastructure: 15000.0,
        node_facility: 2000.0,
        software: 5000.0,
        electricity_per_kwh: 0.21,
        heat_reuse_per_kwh: 0.05,
        heat_reuse_factor: 0.3,
        pue: 1.2,
        node_maintenance: 400.0,
        usage_hours: 8760.0,
        lifetime_years: 5.0,
        node_baseline_power: 800.0,
        depreciation: 1000.0,
        subscription: 600.0,
        inefficiency: 300.0,
        ..CostParameters::preset_alex()
    }
}

#[test]
fn sobol_indices_are_bounded() {
    let op = operating_point();
    let params = rich_params();
    let ranges = UncertaintyRanges::default();
    let mut rng = Hc128Rng::seed_from_u64(7);
    for metric in Metric::ALL.iter() {
        let row = sensitivity::sobol_row(&op, &params, *metric, &ranges, 2000, &mut rng);
        for (j, s) in row.iter().enumerate() {
            assert!(s.is_finite());
            assert!(
                *s >= -1e-9 && *s <= 105.0,
                "{:?} index {} out of range: {}",
                metric,
                j,
                s
            );
        }
    }
}

#[test]
fn zero_range_parameter_contributes_exactly_zero() {
    let op = operating_point();
    let params = rich_params();
    // pin electricity (5) and lifetime (10)
    let ranges = UncertaintyRanges::uniform(0.1).with(5, 0.0).with(10, 0.0);
    let mut rng = Hc128Rng::seed_from_u64(11);

    let sobol = sensitivity::sobol_row(&op, &params, Metric::Tco, &ranges, 500, &mut rng);
    assert_eq!(sobol[5], 0.0);
    assert_eq!(sobol[10], 0.0);
    assert!(sobol[0] > 0.0);

    let mc = sensitivity::monte_carlo_row(&op, &params, Metric::Tco, &ranges, 500, &mut rng);
    assert_eq!(mc[5], 0.0);
    assert_eq!(mc[10], 0.0);
    assert!(mc[0] > 0.0);
}

#[test]
fn zero_variance_yields_all_zero_not_nan() {
    let op = operating_point();
    let params = rich_params();
    let ranges = UncertaintyRanges::uniform(0.0);
    let mut rng = Hc128Rng::seed_from_u64(3);
    let row = sensitivity::sobol_row(&op, &params, Metric::Tco, &ranges, 200, &mut rng);
    assert_eq!(row, [0.0; NUM_PARAMS]);
}

#[test]
fn seeded_runs_are_reproducible() {
    let op = operating_point();
    let params = rich_params();
    let ranges = UncertaintyRanges::default();

    let mut rng_a = Hc128Rng::seed_from_u64(42);
    let mut rng_b = Hc128Rng::seed_from_u64(42);
    let a = sensitivity::analyse(
        &[op],
        &params,
        Metric::WorkPerCost,
        &ranges,
        400,
        &mut rng_a,
    );
    let b = sensitivity::analyse(
        &[op],
        &params,
        Metric::WorkPerCost,
        &ranges,
        400,
        &mut rng_b,
    );
    assert_eq!(a.elasticity.rows, b.elasticity.rows);
    assert_eq!(a.sobol.rows, b.sobol.rows);
    assert_eq!(a.monte_carlo.rows, b.monte_carlo.rows);
}

#[test]
fn elasticity_matches_uniform_perturbation() {
    let op = operating_point();
    let params = rich_params();
    let row = sensitivity::elasticity_row(&op, &params, Metric::Tco);

    // Summing the per-parameter contributions predicts the relative TCO
    // change under a uniform 1% bump of the whole vector, to first order.
    let predicted = 0.01 * row.iter().sum::<f64>() / 100.0;

    let base = params.to_vector(op.unit_cost);
    let mut bumped = base;
    for v in bumped.iter_mut() {
        *v *= 1.01;
    }
    let (bumped_params, bumped_cost) = params.from_vector(&bumped);
    let bumped_op = OperatingPoint {
        unit_cost: bumped_cost,
        ..op
    };
    let actual = bumped_op.tco(&bumped_params) / op.tco(&params) - 1.0;

    assert!(
        (actual - predicted).abs() < 2e-3,
        "predicted {} vs actual {}",
        predicted,
        actual
    );
}

#[test]
fn elasticity_sign_flips_for_inverse_metrics() {
    let op = operating_point();
    let params = rich_params();
    let tco = sensitivity::elasticity_row(&op, &params, Metric::Tco);
    let wpc = sensitivity::elasticity_row(&op, &params, Metric::WorkPerCost);
    for j in 0..NUM_PARAMS {
        assert_eq!(wpc[j], -tco[j], "parameter {}", j);
    }
}

#[test]
fn elasticity_accelerator_cost_share() {
    // with only the unit cost nonzero, its elasticity is exactly 100%
    let op = OperatingPoint {
        count: 8,
        per_node: 8,
        unit_cost: 1000.0,
        perf: 100.0,
        watts: 100.0,
    };
    let mut params = rich_params();
    params.node_server = 0.0;
    params.node_infrastructure = 0.0;
    params.node_facility = 0.0;
    params.software = 0.0;
    params.electricity_per_kwh = 0.0;
    params.heat_reuse_per_kwh = 0.0;
    params.node_maintenance = 0.0;
    params.depreciation = 0.0;
    params.subscription = 0.0;
    params.inefficiency = 0.0;
    let row = sensitivity::elasticity_row(&op, &params, Metric::Tco);
    assert!((row[0] - 100.0).abs() < 1e-9);
    assert_eq!(row[1], 0.0);
}

#[test]
fn monte_carlo_contributions_are_nonnegative_and_finite() {
    let op = operating_point();
    let params = rich_params();
    let ranges = UncertaintyRanges::default();
    let mut rng = Hc128Rng::seed_from_u64(19);
    for metric in Metric::ALL.iter() {
        let row = sensitivity::monte_carlo_row(&op, &params, *metric, &ranges, 500, &mut rng);
        for s in row.iter() {
            assert!(s.is_finite() && *s >= 0.0);
        }
    }
}

#[test]
fn degenerate_operating_point_yields_zero_rows() {
    // a zero-cost, zero-power point drives the metric non-finite; every
    // estimator must answer with zeros instead of NaN
    let op = OperatingPoint {
        count: 8,
        per_node: 8,
        unit_cost: 0.0,
        perf: 100.0,
        watts: 0.0,
    };
    let mut params = rich_params();
    params.node_server = 0.0;
    params.node_infrastructure = 0.0;
    params.node_facility = 0.0;
    params.software = 0.0;
    params.electricity_per_kwh = 0.0;
    params.heat_reuse_per_kwh = 0.0;
    params.heat_reuse_factor = 0.0;
    params.node_maintenance = 0.0;
    params.node_baseline_power = 0.0;
    params.depreciation = 0.0;
    params.subscription = 0.0;
    params.inefficiency = 0.0;

    let row = sensitivity::elasticity_row(&op, &params, Metric::Tco);
    assert_eq!(row, [0.0; NUM_PARAMS]);

    let mut rng = Hc128Rng::seed_from_u64(5);
    let ranges = UncertaintyRanges::default();
    let mc = sensitivity::monte_carlo_row(&op, &params, Metric::Tco, &ranges, 100, &mut rng);
    assert_eq!(mc, [0.0; NUM_PARAMS]);
}
