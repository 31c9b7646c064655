use serde::{Deserialize, Serialize};

/// How the resolver turns cost parameters into an accelerator count.
/// Exactly one mode is active per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SizingMode {
    BudgetConstrained,
    PowerConstrained,
    PerformanceTarget,
    FixedCount,
}

/// The efficiency metric a run is ranked and analysed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Tco,
    WorkPerCost,
    PowerPerCost,
    WorkPerWattPerCost,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Tco,
        Metric::WorkPerCost,
        Metric::PowerPerCost,
        Metric::WorkPerWattPerCost,
    ];
}

/// Number of independently perturbable cost parameters.
pub const NUM_PARAMS: usize = 15;

/// Labels for the sensitivity parameter vector, in index order. All three
/// estimators use this ordering so their outputs line up per parameter.
pub const PARAM_NAMES: [&str; NUM_PARAMS] = [
    "accelerator_cost",
    "node_server",
    "node_infrastructure",
    "node_facility",
    "software",
    "electricity_per_kwh",
    "heat_reuse_per_kwh",
    "pue",
    "node_maintenance",
    "usage_hours",
    "lifetime_years",
    "node_baseline_power",
    "depreciation",
    "subscription",
    "inefficiency",
];

/// All scalar cost and operational inputs of one evaluation. The
/// accelerator unit cost itself comes from the catalog profile.
///
/// The struct is threaded explicitly through every call; nothing reads
/// ambient global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostParameters {
    /// Server cost per node.
    pub node_server: f64,
    /// Cooling distribution, piping and network cost per node.
    pub node_infrastructure: f64,
    /// Housing and floor-space cost per node.
    pub node_facility: f64,
    /// One-off software cost for the whole fleet.
    pub software: f64,
    pub electricity_per_kwh: f64,
    /// Revenue rate for reused heat, per kWh.
    pub heat_reuse_per_kwh: f64,
    /// Fraction of dissipated heat that is actually reused, in [0, 1].
    pub heat_reuse_factor: f64,
    pub pue: f64,
    /// Annual maintenance cost per node.
    pub node_maintenance: f64,
    /// Annual usage in hours.
    pub usage_hours: f64,
    pub lifetime_years: f64,
    /// Node power draw excluding accelerators, in W.
    pub node_baseline_power: f64,
    /// Annual depreciation of the whole fleet.
    pub depreciation: f64,
    /// Annual subscription cost.
    pub subscription: f64,
    /// Annual cost of utilization inefficiency.
    pub inefficiency: f64,

    /// Scaling-efficiency loss per additional node, in (0, 1].
    pub eta_node: f64,
    /// Scaling-efficiency loss per additional accelerator, in (0, 1].
    pub eta_accel: f64,

    // Sizing-mode scalars; only the one matching the active mode is read.
    pub budget: f64,
    pub power_cap_watts: f64,
    pub performance_target: f64,
    pub fixed_count: u32,
}

impl Default for CostParameters {
    fn default() -> CostParameters {
        CostParameters::preset_alex()
    }
}

impl CostParameters {
    /// NHR@FAU Alex-like preset (A100/A40 air-and-water-cooled cluster).
    pub fn preset_alex() -> CostParameters {
        CostParameters {
            node_server: 60000.0,
            node_infrastructure: 15000.0,
            node_facility: 0.0,
            software: 5000.0,
            electricity_per_kwh: 0.21,
            heat_reuse_per_kwh: 0.0,
            heat_reuse_factor: 0.0,
            pue: 1.2,
            node_maintenance: 400.0,
            usage_hours: 8760.0,
            lifetime_years: 5.0,
            node_baseline_power: 800.0,
            depreciation: 0.0,
            subscription: 0.0,
            inefficiency: 0.0,
            eta_node: 0.97,
            eta_accel: 0.99,
            budget: 10_000_000.0,
            power_cap_watts: 2_000_000.0,
            performance_target: 100_000.0,
            fixed_count: 64,
        }
    }

    /// NHR@FAU Helma-like preset (H100 cluster, heavier nodes).
    pub fn preset_helma() -> CostParameters {
        CostParameters {
            node_server: 140000.0,
            ..CostParameters::preset_alex()
        }
    }

    /// The 15-entry sensitivity vector for `unit_cost`, in `PARAM_NAMES`
    /// order. The heat-reuse usage factor and the eta factors are not part
    /// of the vector and stay fixed under perturbation.
    pub fn to_vector(&self, unit_cost: f64) -> [f64; NUM_PARAMS] {
        [
            unit_cost,
            self.node_server,
            self.node_infrastructure,
            self.node_facility,
            self.software,
            self.electricity_per_kwh,
            self.heat_reuse_per_kwh,
            self.pue,
            self.node_maintenance,
            self.usage_hours,
            self.lifetime_years,
            self.node_baseline_power,
            self.depreciation,
            self.subscription,
            self.inefficiency,
        ]
    }

    /// Rebuild a parameter set from a perturbed vector; returns the set and
    /// the accelerator unit cost carried in slot 0.
    pub fn from_vector(&self, v: &[f64; NUM_PARAMS]) -> (CostParameters, f64) {
        let mut p = self.clone();
        p.node_server = v[1];
        p.node_infrastructure = v[2];
        p.node_facility = v[3];
        p.software = v[4];
        p.electricity_per_kwh = v[5];
        p.heat_reuse_per_kwh = v[6];
        p.pue = v[7];
        p.node_maintenance = v[8];
        p.usage_hours = v[9];
        p.lifetime_years = v[10];
        p.node_baseline_power = v[11];
        p.depreciation = v[12];
        p.subscription = v[13];
        p.inefficiency = v[14];
        (p, v[0])
    }

    /// Net electricity rate after heat-reuse revenue.
    pub fn net_energy_rate(&self) -> f64 {
        self.electricity_per_kwh - self.heat_reuse_factor * self.heat_reuse_per_kwh
    }

    /// Fleet-wide annual costs that do not scale with the accelerator
    /// count, summed over the lifetime.
    pub fn baseline_cost(&self) -> f64 {
        self.software
            + self.lifetime_years * (self.depreciation + self.subscription + self.inefficiency)
    }
}
