use crate::analysis::cost::{self, FleetResult, OperatingPoint};
use crate::analysis::sensitivity::{self, SensitivityReport, UncertaintyRanges};
use crate::environment::catalog::{Catalog, CatalogError};
use crate::model::params::{CostParameters, Metric, SizingMode};
use crate::orchestration::resolve;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use rand::Rng;

/// Conductor for one evaluation run: size every catalog entry under the
/// active mode, evaluate the survivors and rank them by the chosen metric.
/// Pure pipeline, no state is carried between runs beyond `res`.
#[derive(Debug, Clone)]
pub struct FleetOrchestrate {
    pub catalog: Catalog,
    pub params: CostParameters,
    pub mode: SizingMode,
    pub workload: String,
    pub benchmark: String,
    pub res: Vec<FleetResult>,
}

impl FleetOrchestrate {
    pub fn new(
        catalog: Catalog,
        params: CostParameters,
        mode: SizingMode,
        workload: &str,
        benchmark: &str,
    ) -> FleetOrchestrate {
        FleetOrchestrate {
            catalog,
            params,
            mode,
            workload: workload.to_string(),
            benchmark: benchmark.to_string(),
            res: vec![],
        }
    }

    /// Resolve + evaluate the whole catalog, sort descending by `metric`
    /// and store the ranking in `res`. Infeasible and zero entries are
    /// excluded; an empty `res` means "no solution", not an error.
    pub fn orchestrate(&mut self, metric: Metric) {
        let mut res: Vec<FleetResult> = self
            .catalog
            .iter()
            .filter_map(|p| {
                let sized = resolve::resolve_fleet(
                    p,
                    self.mode,
                    &self.params,
                    &self.workload,
                    &self.benchmark,
                );
                if sized.count == 0 {
                    return None;
                }
                let mut r =
                    cost::evaluate(p, sized.count, &self.params, &self.workload, &self.benchmark)?;
                r.over_budget = sized.over_budget;
                Some(r)
            })
            .collect();
        res.sort_by_key(|r| std::cmp::Reverse(OrderedFloat(r.metric(metric))));

        info!(
            target: "orchestrate",
            "{:?}/{:?}: {} of {} profiles feasible for ({}, {})",
            self.mode,
            metric,
            res.len(),
            self.catalog.len(),
            self.workload,
            self.benchmark
        );
        debug!(
            target: "orchestrate",
            "ranking: {}",
            res.iter().map(|r| r.name.as_str()).join(" > ")
        );
        self.res = res;
    }

    /// Replace the catalog with a validated JSON document. On rejection the
    /// previous catalog stays in use and prior results are untouched.
    pub fn replace_catalog(&mut self, text: &str) -> Result<(), CatalogError> {
        self.catalog = Catalog::from_json(text)?;
        self.res.clear();
        Ok(())
    }

    /// Operating points of the current result list, in `res` order. This is
    /// the fixed fleet the sensitivity estimators perturb around.
    pub fn operating_points(&self) -> Vec<OperatingPoint> {
        self.res
            .iter()
            .filter_map(|r| {
                let p = self.catalog.iter().find(|p| p.name == r.name)?;
                OperatingPoint::from_profile(p, r.count, &self.workload, &self.benchmark)
            })
            .collect()
    }

    /// Sensitivity of one metric over the resolved fleet; rows follow
    /// `res` order, columns follow `PARAM_NAMES` order.
    pub fn sensitivity<R: Rng>(
        &self,
        metric: Metric,
        ranges: &UncertaintyRanges,
        samples: usize,
        rng: &mut R,
    ) -> SensitivityReport {
        sensitivity::analyse(
            &self.operating_points(),
            &self.params,
            metric,
            ranges,
            samples,
            rng,
        )
    }

    /// One report per metric, all built on the same resolved fleet.
    pub fn sensitivity_all<R: Rng>(
        &self,
        ranges: &UncertaintyRanges,
        samples: usize,
        rng: &mut R,
    ) -> Vec<SensitivityReport> {
        let points = self.operating_points();
        Metric::ALL
            .iter()
            .map(|&m| sensitivity::analyse(&points, &self.params, m, ranges, samples, rng))
            .collect()
    }
}
