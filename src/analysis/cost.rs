use crate::environment::accelerator::AcceleratorProfile;
use crate::model::params::{CostParameters, Metric};
use crate::model::power;

/// Scalar operating point of one sized fleet entry: everything the cost
/// model needs without touching the catalog tables again. The sensitivity
/// estimators re-evaluate this point thousands of times, so it carries no
/// strings or maps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub count: u32,
    pub per_node: u32,
    pub unit_cost: f64,
    /// Per-accelerator throughput at the operating frequency.
    pub perf: f64,
    /// Per-accelerator power draw at the operating frequency, in W.
    pub watts: f64,
}

impl OperatingPoint {
    /// Capture a profile at its reference frequency. None when the cell is
    /// disabled (zero throughput or power) or the count is zero.
    pub fn from_profile(
        p: &AcceleratorProfile,
        count: u32,
        workload: &str,
        benchmark: &str,
    ) -> Option<OperatingPoint> {
        OperatingPoint::from_profile_at(p, count, workload, benchmark, p.reference_frequency)
    }

    /// Capture a profile at a requested DVFS frequency.
    pub fn from_profile_at(
        p: &AcceleratorProfile,
        count: u32,
        workload: &str,
        benchmark: &str,
        frequency: f64,
    ) -> Option<OperatingPoint> {
        if count == 0 || !p.supports(workload, benchmark) {
            return None;
        }
        Some(OperatingPoint {
            count,
            per_node: p.per_node,
            unit_cost: p.cost,
            perf: power::effective_performance(p, workload, benchmark, frequency),
            watts: power::effective_power(p, workload, benchmark, frequency),
        })
    }

    pub fn nodes(&self) -> u32 {
        self.count / self.per_node
    }

    /// Total cost of ownership over the lifetime.
    pub fn tco(&self, p: &CostParameters) -> f64 {
        let (capital, operational) = self.components(p);
        capital.iter().sum::<f64>() + operational.iter().sum::<f64>()
    }

    /// Capital components [accelerator, server, infra, facility, software]
    /// and operational components [energy+cooling, maintenance, baseline].
    pub fn components(&self, p: &CostParameters) -> ([f64; 5], [f64; 3]) {
        let count = self.count as f64;
        let nodes = self.nodes() as f64;

        let capital = [
            count * self.unit_cost,
            nodes * p.node_server,
            nodes * p.node_infrastructure,
            nodes * p.node_facility,
            p.software,
        ];

        // kWh-equivalent energy over the lifetime
        let accel_energy = self.watts * p.usage_hours * p.lifetime_years / 1000.0;
        let baseline_energy = p.node_baseline_power * p.usage_hours * p.lifetime_years / 1000.0;
        let operational = [
            p.net_energy_rate() * p.pue * (baseline_energy * nodes + accel_energy * count),
            p.node_maintenance * p.lifetime_years * nodes,
            p.lifetime_years * (p.depreciation + p.subscription + p.inefficiency),
        ];
        (capital, operational)
    }

    /// Useful work over the lifetime, normalized to a daily-equivalent unit.
    pub fn total_work(&self, p: &CostParameters) -> f64 {
        let eff = power::scaling_efficiency(self.count, self.per_node, p.eta_node, p.eta_accel);
        self.perf * self.count as f64 * eff * p.usage_hours * p.lifetime_years / 24.0
    }

    pub fn total_power(&self) -> f64 {
        self.watts * self.count as f64
    }

    /// The selected metric at this operating point. May be non-finite for
    /// degenerate inputs (zero cost); the sensitivity guards handle that.
    pub fn metric(&self, p: &CostParameters, metric: Metric) -> f64 {
        let tco = self.tco(p);
        match metric {
            Metric::Tco => tco,
            Metric::WorkPerCost => self.total_work(p) / tco,
            Metric::PowerPerCost => self.total_power() / tco,
            Metric::WorkPerWattPerCost => self.total_work(p) / self.total_power() / tco,
        }
    }
}

/// Cost/performance breakdown of one sized catalog entry. Constructed
/// fresh on every evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetResult {
    pub name: String,
    pub count: u32,
    pub nodes: u32,
    /// [accelerator, server, infrastructure, facility, software]
    pub capital: [f64; 5],
    /// [energy+cooling, maintenance, baseline-operational]
    pub operational: [f64; 3],
    pub total_cost: f64,
    pub total_work: f64,
    pub total_power: f64,
    pub work_per_cost: f64,
    pub power_per_cost: f64,
    pub work_per_watt_per_cost: f64,
    /// Share of total cost that does not scale with the accelerator count.
    pub baseline_pct: f64,
    /// Advisory from PerformanceTarget sizing; never a rejection.
    pub over_budget: bool,
}

impl FleetResult {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Tco => self.total_cost,
            Metric::WorkPerCost => self.work_per_cost,
            Metric::PowerPerCost => self.power_per_cost,
            Metric::WorkPerWattPerCost => self.work_per_watt_per_cost,
        }
    }
}

/// Evaluate one profile at a resolved count. None excludes the entry from
/// the result list: a zero count or zero total cost is "no result", never a
/// division by zero.
pub fn evaluate(
    p: &AcceleratorProfile,
    count: u32,
    params: &CostParameters,
    workload: &str,
    benchmark: &str,
) -> Option<FleetResult> {
    let op = OperatingPoint::from_profile(p, count, workload, benchmark)?;
    evaluate_point(&p.name, &op, params)
}

pub fn evaluate_point(
    name: &str,
    op: &OperatingPoint,
    params: &CostParameters,
) -> Option<FleetResult> {
    if op.count == 0 {
        return None;
    }
    let (capital, operational) = op.components(params);
    let total_cost = capital.iter().sum::<f64>() + operational.iter().sum::<f64>();
    if total_cost == 0.0 {
        debug!(target: "cost", "{}: zero total cost, excluded", name);
        return None;
    }
    let total_work = op.total_work(params);
    let total_power = op.total_power();

    Some(FleetResult {
        name: name.to_string(),
        count: op.count,
        nodes: op.nodes(),
        capital,
        operational,
        total_cost,
        total_work,
        total_power,
        work_per_cost: total_work / total_cost,
        power_per_cost: total_power / total_cost,
        work_per_watt_per_cost: total_work / total_power / total_cost,
        baseline_pct: 100.0 * (capital[4] + operational[2]) / total_cost,
        over_budget: false,
    })
}
