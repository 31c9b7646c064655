use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Piecewise DVFS power curve for one (workload, benchmark) cell.
///
/// Below `breakpoint` the draw is linear in frequency, above it quadratic;
/// the evaluated value is always clamped to the profile TDP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerCurve {
    pub breakpoint: f64,
    pub slope: f64,
    pub intercept: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl PowerCurve {
    pub fn watts_at(&self, frequency: f64) -> f64 {
        if frequency <= self.breakpoint {
            self.slope * frequency + self.intercept
        } else {
            self.a * frequency * frequency + self.b * frequency + self.c
        }
    }
}

pub type BenchTable = BTreeMap<String, BTreeMap<String, f64>>;
pub type CurveTable = BTreeMap<String, BTreeMap<String, PowerCurve>>;

/// Static description of one accelerator SKU.
///
/// `perf` and `power` are nested workload -> benchmark tables over the same
/// key domain; a zero in either table disables that combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceleratorProfile {
    pub name: String,
    /// Unit acquisition cost.
    pub cost: f64,
    /// Accelerators per node, >= 1.
    pub per_node: u32,
    /// Reference operating frequency in MHz.
    pub reference_frequency: f64,
    /// Thermal design power in W.
    pub tdp: f64,
    pub perf: BenchTable,
    pub power: BenchTable,
    #[serde(default)]
    pub power_curves: CurveTable,
}

impl AcceleratorProfile {
    /// Base throughput for one cell, 0.0 when the cell is absent.
    pub fn base_perf(&self, workload: &str, benchmark: &str) -> f64 {
        lookup(&self.perf, workload, benchmark)
    }

    /// Static power draw for one cell, 0.0 when the cell is absent.
    pub fn base_power(&self, workload: &str, benchmark: &str) -> f64 {
        lookup(&self.power, workload, benchmark)
    }

    pub fn curve(&self, workload: &str, benchmark: &str) -> Option<&PowerCurve> {
        self.power_curves.get(workload).and_then(|t| t.get(benchmark))
    }

    /// A combination with zero throughput or zero power is force-excluded
    /// downstream: the profile cannot run it, which is not an error.
    pub fn supports(&self, workload: &str, benchmark: &str) -> bool {
        self.base_perf(workload, benchmark) > 0.0 && self.base_power(workload, benchmark) > 0.0
    }
}

fn lookup(table: &BenchTable, workload: &str, benchmark: &str) -> f64 {
    table
        .get(workload)
        .and_then(|t| t.get(benchmark))
        .cloned()
        .unwrap_or(0.0)
}
