use crate::environment::accelerator::{AcceleratorProfile, BenchTable, PowerCurve};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog must contain at least one accelerator profile")]
    Empty,

    #[error("profile `{name}`: {reason}")]
    Invalid { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// An ordered, immutable list of accelerator profiles.
///
/// Replacement never mutates in place: a new catalog value is constructed,
/// validated whole, and passed forward; on rejection the previous catalog
/// stays in use.
#[derive(Debug, Clone)]
pub struct Catalog {
    profiles: Vec<AcceleratorProfile>,
}

impl Catalog {
    pub fn new(profiles: Vec<AcceleratorProfile>) -> Result<Catalog> {
        if profiles.is_empty() {
            return Err(CatalogError::Empty);
        }
        for p in &profiles {
            validate(p)?;
        }
        info!(target: "catalog", "accepted catalog with {} profiles", profiles.len());
        Ok(Catalog { profiles })
    }

    /// Parse and validate a user-supplied replacement catalog. Malformed
    /// records reject the whole document, never a partial application.
    pub fn from_json(text: &str) -> Result<Catalog> {
        let profiles: Vec<AcceleratorProfile> = serde_json::from_str(text)?;
        Catalog::new(profiles)
    }

    pub fn profiles(&self) -> &[AcceleratorProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<AcceleratorProfile> {
        self.profiles.iter()
    }
}

fn validate(p: &AcceleratorProfile) -> Result<()> {
    let fail = |reason: String| CatalogError::Invalid {
        name: p.name.clone(),
        reason,
    };

    if p.name.is_empty() {
        return Err(CatalogError::Invalid {
            name: "<unnamed>".to_string(),
            reason: "a profile name is required".to_string(),
        });
    }
    if !(p.cost >= 0.0) || !p.cost.is_finite() {
        return Err(fail(format!("unit cost {} is not a finite non-negative number", p.cost)));
    }
    if p.per_node < 1 {
        return Err(fail("accelerators-per-node must be a positive integer".to_string()));
    }
    if !(p.reference_frequency > 0.0) {
        return Err(fail(format!(
            "reference frequency {} must be positive",
            p.reference_frequency
        )));
    }
    if !(p.tdp > 0.0) {
        return Err(fail(format!("TDP {} must be positive", p.tdp)));
    }
    if p.perf.is_empty() {
        return Err(fail("the perf table has no workloads".to_string()));
    }

    // perf and power must cover exactly the same (workload, benchmark) cells.
    let perf_keys: Vec<(&String, &String)> = cells(&p.perf);
    let power_keys: Vec<(&String, &String)> = cells(&p.power);
    if perf_keys != power_keys {
        return Err(fail(
            "the perf and power tables do not share the same workload/benchmark keys".to_string(),
        ));
    }
    for (w, b) in perf_keys {
        let t = p.perf[w][b];
        let q = p.power[w][b];
        if !t.is_finite() || t < 0.0 || !q.is_finite() || q < 0.0 {
            return Err(fail(format!(
                "perf/power for ({}, {}) must be finite and non-negative",
                w, b
            )));
        }
    }
    for (w, t) in &p.power_curves {
        for b in t.keys() {
            if p.base_perf(w, b) == 0.0 && p.base_power(w, b) == 0.0 {
                return Err(fail(format!(
                    "a power curve for ({}, {}) has no matching perf/power cell",
                    w, b
                )));
            }
        }
    }
    Ok(())
}

fn cells(table: &BenchTable) -> Vec<(&String, &String)> {
    table
        .iter()
        .flat_map(|(w, t)| t.keys().map(move |b| (w, b)))
        .collect()
}

macro_rules! bench_table {
    ($($w:expr => { $($b:expr => $v:expr),* $(,)? }),* $(,)?) => {{
        let mut table = crate::environment::accelerator::BenchTable::new();
        $(
            let mut inner = std::collections::BTreeMap::new();
            $( inner.insert($b.to_string(), $v); )*
            table.insert($w.to_string(), inner);
        )*
        table
    }};
}

/// The built-in default catalog: A100-, A40- and H100-class profiles with
/// throughput in samples/s at the reference frequency. Zero cells mark
/// combinations the card cannot run (e.g. models that do not fit).
pub fn default_catalog() -> Catalog {
    let a100 = AcceleratorProfile {
        name: "A100-80GB".to_string(),
        cost: 15000.0,
        per_node: 8,
        reference_frequency: 1410.0,
        tdp: 400.0,
        perf: bench_table! {
            "training" => { "resnet50" => 2900.0, "bert_large" => 420.0, "gpt3_13b" => 11.0 },
            "inference" => { "resnet50" => 31000.0, "bert_large" => 4100.0, "gpt3_13b" => 95.0 },
        },
        power: bench_table! {
            "training" => { "resnet50" => 340.0, "bert_large" => 385.0, "gpt3_13b" => 395.0 },
            "inference" => { "resnet50" => 290.0, "bert_large" => 320.0, "gpt3_13b" => 370.0 },
        },
        power_curves: {
            let mut curves = std::collections::BTreeMap::new();
            let mut training = std::collections::BTreeMap::new();
            training.insert(
                "resnet50".to_string(),
                // continuous at the breakpoint, ~340 W at 1410 MHz
                PowerCurve {
                    breakpoint: 1100.0,
                    slope: 0.2,
                    intercept: 40.0,
                    a: 0.0002,
                    b: -0.2439,
                    c: 286.3,
                },
            );
            curves.insert("training".to_string(), training);
            curves
        },
    };

    let a40 = AcceleratorProfile {
        name: "A40".to_string(),
        cost: 4500.0,
        per_node: 8,
        reference_frequency: 1740.0,
        tdp: 300.0,
        perf: bench_table! {
            "training" => { "resnet50" => 1500.0, "bert_large" => 190.0, "gpt3_13b" => 0.0 },
            "inference" => { "resnet50" => 17000.0, "bert_large" => 1900.0, "gpt3_13b" => 0.0 },
        },
        power: bench_table! {
            "training" => { "resnet50" => 260.0, "bert_large" => 280.0, "gpt3_13b" => 0.0 },
            "inference" => { "resnet50" => 230.0, "bert_large" => 250.0, "gpt3_13b" => 0.0 },
        },
        power_curves: Default::default(),
    };

    let h100 = AcceleratorProfile {
        name: "H100-SXM".to_string(),
        cost: 30000.0,
        per_node: 4,
        reference_frequency: 1980.0,
        tdp: 700.0,
        perf: bench_table! {
            "training" => { "resnet50" => 5400.0, "bert_large" => 930.0, "gpt3_13b" => 29.0 },
            "inference" => { "resnet50" => 58000.0, "bert_large" => 9100.0, "gpt3_13b" => 260.0 },
        },
        power: bench_table! {
            "training" => { "resnet50" => 580.0, "bert_large" => 650.0, "gpt3_13b" => 680.0 },
            "inference" => { "resnet50" => 490.0, "bert_large" => 560.0, "gpt3_13b" => 640.0 },
        },
        power_curves: {
            let mut curves = std::collections::BTreeMap::new();
            let mut training = std::collections::BTreeMap::new();
            training.insert(
                "resnet50".to_string(),
                // continuous at the breakpoint, ~580 W at 1980 MHz
                PowerCurve {
                    breakpoint: 1500.0,
                    slope: 0.3,
                    intercept: 80.0,
                    a: 0.0001,
                    b: -0.2438,
                    c: 670.7,
                },
            );
            curves.insert("training".to_string(), training);
            curves
        },
    };

    // new() cannot fail on the built-in set
    Catalog::new(vec![a100, a40, h100]).unwrap()
}
