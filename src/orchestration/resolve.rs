use crate::analysis::cost;
use crate::environment::accelerator::AcceleratorProfile;
use crate::model::params::{CostParameters, SizingMode};
use crate::model::power;

/// Outcome of sizing one catalog entry. `count` is node-aligned and >= 0;
/// zero means the entry is infeasible under the active constraint, which is
/// not an error. `over_budget` is the PerformanceTarget advisory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFleet {
    pub count: u32,
    pub over_budget: bool,
}

impl ResolvedFleet {
    fn excluded() -> ResolvedFleet {
        ResolvedFleet {
            count: 0,
            over_budget: false,
        }
    }
}

/// Size one profile under the active mode. A zero-performance or
/// zero-power cell is force-excluded before any division.
pub fn resolve_fleet(
    p: &AcceleratorProfile,
    mode: SizingMode,
    params: &CostParameters,
    workload: &str,
    benchmark: &str,
) -> ResolvedFleet {
    if !p.supports(workload, benchmark) {
        debug!(target: "resolve", "{}: unusable for ({}, {})", p.name, workload, benchmark);
        return ResolvedFleet::excluded();
    }
    let perf = power::effective_performance(p, workload, benchmark, p.reference_frequency);
    let watts = power::effective_power(p, workload, benchmark, p.reference_frequency);

    match mode {
        SizingMode::BudgetConstrained => budget_constrained(p, params, watts),
        SizingMode::PowerConstrained => power_constrained(p, params, watts),
        SizingMode::PerformanceTarget => performance_target(p, params, workload, benchmark, perf),
        SizingMode::FixedCount => fixed_count(p, params),
    }
}

/// count = floor((budget - baseline) / A), node-aligned down, where A is
/// the marginal cost of adding one accelerator: unit cost, its cooling
/// overhead over the lifetime, and its share of the node-level costs.
fn budget_constrained(
    p: &AcceleratorProfile,
    params: &CostParameters,
    watts: f64,
) -> ResolvedFleet {
    let lifetime_kwh = params.usage_hours * params.lifetime_years / 1000.0;
    let cooling_rate = params.net_energy_rate() * (params.pue - 1.0);

    let node_level = params.node_server
        + params.node_infrastructure
        + params.node_facility
        + params.node_maintenance * params.lifetime_years
        + cooling_rate * params.node_baseline_power * lifetime_kwh;
    let marginal = p.cost + cooling_rate * watts * lifetime_kwh + node_level / p.per_node as f64;
    if marginal <= 0.0 {
        return ResolvedFleet::excluded();
    }

    let headroom = params.budget - params.baseline_cost();
    if headroom <= 0.0 {
        return ResolvedFleet::excluded();
    }
    let raw = (headroom / marginal).floor() as u64;
    aligned_down(raw, p.per_node)
}

fn power_constrained(
    p: &AcceleratorProfile,
    params: &CostParameters,
    watts: f64,
) -> ResolvedFleet {
    if params.power_cap_watts <= 0.0 {
        return ResolvedFleet::excluded();
    }
    let raw = (params.power_cap_watts / watts).floor() as u64;
    aligned_down(raw, p.per_node)
}

/// Round the count up to meet the target, then evaluate the implied cost;
/// exceeding the budget only raises the advisory flag.
fn performance_target(
    p: &AcceleratorProfile,
    params: &CostParameters,
    workload: &str,
    benchmark: &str,
    perf: f64,
) -> ResolvedFleet {
    if params.performance_target <= 0.0 {
        return ResolvedFleet::excluded();
    }
    let raw = (params.performance_target / perf).ceil() as u64;
    let count = align_up(raw, p.per_node);
    if count == 0 {
        return ResolvedFleet::excluded();
    }

    let over_budget = match cost::evaluate(p, count, params, workload, benchmark) {
        Some(r) => r.total_cost > params.budget,
        None => false,
    };
    if over_budget {
        warn!(
            target: "resolve",
            "{}: {} accelerators meet the target but exceed the budget",
            p.name, count
        );
    }
    ResolvedFleet { count, over_budget }
}

fn fixed_count(p: &AcceleratorProfile, params: &CostParameters) -> ResolvedFleet {
    let aligned = params.fixed_count / p.per_node * p.per_node;
    let count = if aligned == 0 && params.fixed_count > 0 {
        // a positive request always gets at least one full node
        p.per_node
    } else {
        aligned
    };
    ResolvedFleet {
        count,
        over_budget: false,
    }
}

/// Round down to a node multiple; below one full node the entry is
/// infeasible.
fn aligned_down(raw: u64, per_node: u32) -> ResolvedFleet {
    let raw = raw.min(u32::MAX as u64);
    let count = (raw / per_node as u64 * per_node as u64) as u32;
    if count < per_node {
        ResolvedFleet::excluded()
    } else {
        ResolvedFleet {
            count,
            over_budget: false,
        }
    }
}

fn align_up(raw: u64, per_node: u32) -> u32 {
    let per = per_node as u64;
    let raw = raw.min(u32::MAX as u64 - per);
    ((raw + per - 1) / per * per) as u32
}
