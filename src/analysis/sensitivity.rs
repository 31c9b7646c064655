use crate::analysis::cost::OperatingPoint;
use crate::analysis::numeric;
use crate::model::params::{CostParameters, Metric, NUM_PARAMS};
use rand::Rng;

/// Default sample count per catalog entry for the sampling estimators.
pub const DEFAULT_SAMPLES: usize = 2000;

/// Default shared relative uncertainty per parameter.
pub const DEFAULT_RANGE: f64 = 0.10;

/// Per-parameter relative uncertainty ranges r_j: each sample scales the
/// base value by (1 + u), u uniform in [-r_j, +r_j]. One shared value can
/// be overridden per parameter; r_j = 0 pins the parameter exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyRanges([f64; NUM_PARAMS]);

impl Default for UncertaintyRanges {
    fn default() -> UncertaintyRanges {
        UncertaintyRanges::uniform(DEFAULT_RANGE)
    }
}

impl UncertaintyRanges {
    pub fn uniform(r: f64) -> UncertaintyRanges {
        UncertaintyRanges([r; NUM_PARAMS])
    }

    pub fn per_parameter(rs: [f64; NUM_PARAMS]) -> UncertaintyRanges {
        UncertaintyRanges(rs)
    }

    pub fn with(mut self, index: usize, r: f64) -> UncertaintyRanges {
        self.0[index] = r;
        self
    }

    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }
}

/// One estimator's output for one metric: a row of NUM_PARAMS percentage
/// contributions per surviving catalog entry, in result-list order. Every
/// value is finite; degenerate cases are zeroed at the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityMatrix {
    pub metric: Metric,
    pub rows: Vec<[f64; NUM_PARAMS]>,
}

/// The three estimators side by side, built from the same parameter
/// ordering and the same resolved fleet so they compare directly.
#[derive(Debug, Clone)]
pub struct SensitivityReport {
    pub metric: Metric,
    pub elasticity: SensitivityMatrix,
    pub sobol: SensitivityMatrix,
    pub monte_carlo: SensitivityMatrix,
}

pub fn analyse<R: Rng>(
    points: &[OperatingPoint],
    params: &CostParameters,
    metric: Metric,
    ranges: &UncertaintyRanges,
    samples: usize,
    rng: &mut R,
) -> SensitivityReport {
    let mut elasticity = Vec::with_capacity(points.len());
    let mut sobol = Vec::with_capacity(points.len());
    let mut monte_carlo = Vec::with_capacity(points.len());
    for op in points {
        elasticity.push(elasticity_row(op, params, metric));
        sobol.push(sobol_row(op, params, metric, ranges, samples, rng));
        monte_carlo.push(monte_carlo_row(op, params, metric, ranges, samples, rng));
    }
    debug!(
        target: "sensitivity",
        "{:?}: {} entries x {} parameters, {} samples",
        metric,
        points.len(),
        NUM_PARAMS,
        samples
    );
    SensitivityReport {
        metric,
        elasticity: SensitivityMatrix { metric, rows: elasticity },
        sobol: SensitivityMatrix { metric, rows: sobol },
        monte_carlo: SensitivityMatrix { metric, rows: monte_carlo },
    }
}

/// Local analytic elasticity: 100 * base * dTCO/dparam / TCO, exact to
/// first order since TCO is affine in each parameter individually. For the
/// inverse-style metrics the sign flips: a cost increase decreases them.
pub fn elasticity_row(op: &OperatingPoint, p: &CostParameters, metric: Metric) -> [f64; NUM_PARAMS] {
    let tco = op.tco(p);
    if !tco.is_finite() || tco == 0.0 {
        return [0.0; NUM_PARAMS];
    }
    let base = p.to_vector(op.unit_cost);
    let grad = tco_gradient(op, p);
    let sign = match metric {
        Metric::Tco => 1.0,
        _ => -1.0,
    };
    let mut row = [0.0; NUM_PARAMS];
    for j in 0..NUM_PARAMS {
        row[j] = numeric::finite_or_zero(sign * 100.0 * base[j] * grad[j] / tco);
    }
    row
}

/// Closed-form partial derivatives of TCO with respect to the parameter
/// vector, at the current operating point.
fn tco_gradient(op: &OperatingPoint, p: &CostParameters) -> [f64; NUM_PARAMS] {
    let count = op.count as f64;
    let nodes = op.nodes() as f64;
    let net = p.net_energy_rate();

    // lifetime kWh at the operating point, per node and per accelerator
    let baseline_energy = p.node_baseline_power * p.usage_hours * p.lifetime_years / 1000.0;
    let accel_energy = op.watts * p.usage_hours * p.lifetime_years / 1000.0;
    let fleet_energy = baseline_energy * nodes + accel_energy * count;
    // the same total with one factor removed, for the product-rule terms
    let fleet_energy_per_usage =
        (p.node_baseline_power * nodes + op.watts * count) * p.lifetime_years / 1000.0;
    let fleet_energy_per_lifetime =
        (p.node_baseline_power * nodes + op.watts * count) * p.usage_hours / 1000.0;

    [
        count,                                        // accelerator unit cost
        nodes,                                        // node server
        nodes,                                        // node infrastructure
        nodes,                                        // node facility
        1.0,                                          // software
        p.pue * fleet_energy,                         // electricity
        -p.heat_reuse_factor * p.pue * fleet_energy,  // heat-reuse revenue
        net * fleet_energy,                           // PUE
        p.lifetime_years * nodes,                     // maintenance
        net * p.pue * fleet_energy_per_usage,         // usage hours
        net * p.pue * fleet_energy_per_lifetime
            + p.node_maintenance * nodes
            + p.depreciation
            + p.subscription
            + p.inefficiency,                         // lifetime
        net * p.pue * p.usage_hours * p.lifetime_years / 1000.0 * nodes, // baseline power
        p.lifetime_years,                             // depreciation
        p.lifetime_years,                             // subscription
        p.lifetime_years,                             // inefficiency
    ]
}

/// Sobol total-order index per parameter, via the two-matrix estimator.
///
/// The denominator uses matrix A's sample variance only, not the pooled
/// variance of A and B; this matches the behavior the model was calibrated
/// against and is kept as an intentional approximation.
pub fn sobol_row<R: Rng>(
    op: &OperatingPoint,
    p: &CostParameters,
    metric: Metric,
    ranges: &UncertaintyRanges,
    samples: usize,
    rng: &mut R,
) -> [f64; NUM_PARAMS] {
    let base = guarded_base(op, p);

    let a = sample_matrix(&base, ranges, samples, rng);
    let b = sample_matrix(&base, ranges, samples, rng);

    let y_a: Vec<f64> = a.iter().map(|v| metric_at(op, p, metric, v)).collect();
    if !numeric::all_finite(&y_a) {
        warn!(target: "sensitivity", "non-finite Sobol evaluation, zeroing entry");
        return [0.0; NUM_PARAMS];
    }
    let mean = numeric::mean(&y_a);
    let var = numeric::sample_variance(&y_a, mean);
    if var <= numeric::VARIANCE_FLOOR {
        return [0.0; NUM_PARAMS];
    }

    let mut row = [0.0; NUM_PARAMS];
    for j in 0..NUM_PARAMS {
        let mut sum_sq = 0.0;
        for i in 0..samples {
            let mut hybrid = a[i];
            hybrid[j] = b[i][j];
            let y_h = metric_at(op, p, metric, &hybrid);
            let d = y_a[i] - y_h;
            sum_sq += d * d;
        }
        row[j] = numeric::finite_or_zero(100.0 * sum_sq / samples as f64 / (2.0 * var));
    }
    row
}

/// Monte Carlo uncertainty propagation: perturb one parameter at a time,
/// report 100 * std / |base metric| as that parameter's isolated spread.
pub fn monte_carlo_row<R: Rng>(
    op: &OperatingPoint,
    p: &CostParameters,
    metric: Metric,
    ranges: &UncertaintyRanges,
    samples: usize,
    rng: &mut R,
) -> [f64; NUM_PARAMS] {
    let base = guarded_base(op, p);
    let base_metric = op.metric(p, metric);
    if !base_metric.is_finite() || base_metric.abs() <= numeric::VARIANCE_FLOOR {
        return [0.0; NUM_PARAMS];
    }

    let mut row = [0.0; NUM_PARAMS];
    let mut ys = vec![0.0; samples];
    for j in 0..NUM_PARAMS {
        let r = ranges.get(j);
        if r == 0.0 {
            continue;
        }
        for y in ys.iter_mut() {
            let mut v = base;
            v[j] = base[j] * (1.0 + symmetric(rng, r));
            *y = numeric::finite_or_zero(metric_at(op, p, metric, &v));
        }
        let mean = numeric::mean(&ys);
        let std = numeric::sample_std(&ys, mean);
        row[j] = numeric::finite_or_zero(100.0 * std / base_metric.abs());
    }
    row
}

/// The base vector with zeros replaced by a small epsilon, so relative
/// perturbation never collapses to permanently-zero variance.
fn guarded_base(op: &OperatingPoint, p: &CostParameters) -> [f64; NUM_PARAMS] {
    let mut base = p.to_vector(op.unit_cost);
    for b in base.iter_mut() {
        *b = numeric::guard_base(*b);
    }
    base
}

fn sample_matrix<R: Rng>(
    base: &[f64; NUM_PARAMS],
    ranges: &UncertaintyRanges,
    samples: usize,
    rng: &mut R,
) -> Vec<[f64; NUM_PARAMS]> {
    (0..samples)
        .map(|_| {
            let mut v = *base;
            for j in 0..NUM_PARAMS {
                v[j] = base[j] * (1.0 + symmetric(rng, ranges.get(j)));
            }
            v
        })
        .collect()
}

#[inline]
fn symmetric<R: Rng>(rng: &mut R, r: f64) -> f64 {
    (rng.gen::<f64>() * 2.0 - 1.0) * r
}

/// Re-evaluate the metric with a perturbed parameter vector at the same
/// fixed count; perturbation never re-triggers fleet sizing.
fn metric_at(op: &OperatingPoint, p: &CostParameters, metric: Metric, v: &[f64; NUM_PARAMS]) -> f64 {
    let (params, unit_cost) = p.from_vector(v);
    let point = OperatingPoint { unit_cost, ..*op };
    point.metric(&params, metric)
}
