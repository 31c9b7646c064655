extern crate PerfTCO;
extern crate rayon;

use rayon::prelude::*;
use PerfTCO::environment::catalog::default_catalog;
use PerfTCO::model::params::{CostParameters, SizingMode};
use PerfTCO::orchestration::resolve;

const MODES: [SizingMode; 4] = [
    SizingMode::BudgetConstrained,
    SizingMode::PowerConstrained,
    SizingMode::PerformanceTarget,
    SizingMode::FixedCount,
];

#[test]
fn counts_are_node_aligned_in_every_mode() {
    let catalog = default_catalog();
    let params = CostParameters::preset_alex();
    for mode in MODES.iter() {
        for p in catalog.iter() {
            for benchmark in ["resnet50", "bert_large", "gpt3_13b"].iter() {
                let sized = resolve::resolve_fleet(p, *mode, &params, "training", benchmark);
                assert_eq!(
                    sized.count % p.per_node,
                    0,
                    "{:?} {} {}: count {} not node-aligned",
                    mode,
                    p.name,
                    benchmark,
                    sized.count
                );
            }
        }
    }
}

#[test]
fn budget_increase_never_shrinks_the_fleet() {
    let catalog = default_catalog();

    // Sweep a budget grid per profile and check monotonicity.
    let counts: Vec<Vec<u32>> = catalog
        .profiles()
        .par_iter()
        .map(|p| {
            (1..200)
                .map(|i| {
                    let params = CostParameters {
                        budget: i as f64 * 100_000.0,
                        ..CostParameters::preset_alex()
                    };
                    resolve::resolve_fleet(
                        p,
                        SizingMode::BudgetConstrained,
                        &params,
                        "training",
                        "resnet50",
                    )
                    .count
                })
                .collect()
        })
        .collect();

    for (p, series) in catalog.iter().zip(&counts) {
        for w in series.windows(2) {
            assert!(w[1] >= w[0], "{}: count dropped from {} to {}", p.name, w[0], w[1]);
        }
    }
}

#[test]
fn budget_below_one_node_is_infeasible() {
    let catalog = default_catalog();
    let a100 = &catalog.profiles()[0];
    let params = CostParameters {
        budget: 50_000.0, // less than one 8-GPU node plus its node costs
        ..CostParameters::preset_alex()
    };
    let sized = resolve::resolve_fleet(
        a100,
        SizingMode::BudgetConstrained,
        &params,
        "training",
        "resnet50",
    );
    assert_eq!(sized.count, 0);
}

#[test]
fn power_cap_divides_by_accelerator_draw() {
    let catalog = default_catalog();
    let a100 = &catalog.profiles()[0];
    // bert_large has no DVFS curve, so the static 385 W table value applies
    let params = CostParameters {
        power_cap_watts: 10_000.0,
        ..CostParameters::preset_alex()
    };
    let sized = resolve::resolve_fleet(
        a100,
        SizingMode::PowerConstrained,
        &params,
        "training",
        "bert_large",
    );
    // floor(10000 / 385) = 25 -> 24 on 8-per-node alignment
    assert_eq!(sized.count, 24);
}

#[test]
fn performance_target_rounds_up_to_nodes() {
    let catalog = default_catalog();
    let a100 = &catalog.profiles()[0];
    let params = CostParameters {
        performance_target: 30_000.0,
        ..CostParameters::preset_alex()
    };
    let sized = resolve::resolve_fleet(
        a100,
        SizingMode::PerformanceTarget,
        &params,
        "training",
        "resnet50",
    );
    // ceil(30000 / 2900) = 11 -> 16 on 8-per-node alignment
    assert_eq!(sized.count, 16);
    assert!(!sized.over_budget);
}

#[test]
fn performance_target_flags_budget_overrun() {
    let catalog = default_catalog();
    let a100 = &catalog.profiles()[0];
    let params = CostParameters {
        performance_target: 30_000.0,
        budget: 10_000.0,
        ..CostParameters::preset_alex()
    };
    let sized = resolve::resolve_fleet(
        a100,
        SizingMode::PerformanceTarget,
        &params,
        "training",
        "resnet50",
    );
    // the target is still met; the overrun is advisory only
    assert_eq!(sized.count, 16);
    assert!(sized.over_budget);
}

#[test]
fn fixed_count_floors_to_whole_nodes() {
    let catalog = default_catalog();
    let a100 = &catalog.profiles()[0]; // 8 per node
    let resolve_with = |fixed_count| {
        let params = CostParameters {
            fixed_count,
            ..CostParameters::preset_alex()
        };
        resolve::resolve_fleet(a100, SizingMode::FixedCount, &params, "training", "resnet50").count
    };
    assert_eq!(resolve_with(20), 16);
    assert_eq!(resolve_with(8), 8);
    // a positive request below one node still gets one node
    assert_eq!(resolve_with(3), 8);
    assert_eq!(resolve_with(0), 0);
}

#[test]
fn unusable_combination_is_zero_in_every_mode() {
    let catalog = default_catalog();
    let a40 = &catalog.profiles()[1]; // gpt3_13b cells are zero
    let params = CostParameters::preset_alex();
    for mode in MODES.iter() {
        let sized = resolve::resolve_fleet(a40, *mode, &params, "training", "gpt3_13b");
        assert_eq!(sized.count, 0, "{:?} should exclude a zero-perf cell", mode);
    }
}
