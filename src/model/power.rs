use crate::environment::accelerator::AcceleratorProfile;

/// Throughput of one accelerator at `frequency`, scaled linearly from the
/// profile's reference frequency. Zero when the cell is disabled.
pub fn effective_performance(
    p: &AcceleratorProfile,
    workload: &str,
    benchmark: &str,
    frequency: f64,
) -> f64 {
    p.base_perf(workload, benchmark) * frequency / p.reference_frequency
}

/// Power draw of one accelerator at `frequency`.
///
/// When a DVFS curve is configured for the cell the draw follows it (linear
/// below the breakpoint, quadratic above) and is clamped to TDP; otherwise
/// the static table value is used as-is.
pub fn effective_power(
    p: &AcceleratorProfile,
    workload: &str,
    benchmark: &str,
    frequency: f64,
) -> f64 {
    match p.curve(workload, benchmark) {
        Some(curve) => f64::min(curve.watts_at(frequency), p.tdp),
        None => p.base_power(workload, benchmark),
    }
}

/// Compounding multi-accelerator scaling loss:
/// eta_node^(nodes - 1) * eta_accel^(n_accel - 1).
pub fn scaling_efficiency(n_accel: u32, per_node: u32, eta_node: f64, eta_accel: f64) -> f64 {
    if n_accel == 0 {
        return 0.0;
    }
    let nodes = n_accel / per_node;
    eta_node.powi(nodes.saturating_sub(1) as i32) * eta_accel.powi((n_accel - 1) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::catalog::default_catalog;

    #[test]
    fn performance_scales_linearly() {
        let c = default_catalog();
        let a100 = &c.profiles()[0];
        let base = a100.base_perf("training", "resnet50");
        let half = effective_performance(a100, "training", "resnet50", a100.reference_frequency / 2.0);
        assert!((half - base / 2.0).abs() < 1e-9);
    }

    #[test]
    fn power_clamps_to_tdp() {
        let c = default_catalog();
        let a100 = &c.profiles()[0];
        // far above the breakpoint the quadratic segment exceeds TDP
        let w = effective_power(a100, "training", "resnet50", 4000.0);
        assert_eq!(w, a100.tdp);
    }

    #[test]
    fn power_falls_back_to_table() {
        let c = default_catalog();
        let a40 = &c.profiles()[1];
        let w = effective_power(a40, "training", "resnet50", 999.0);
        assert_eq!(w, a40.base_power("training", "resnet50"));
    }

    #[test]
    fn single_accelerator_efficiency_is_one() {
        assert_eq!(scaling_efficiency(1, 1, 0.97, 0.99), 1.0);
        assert!(scaling_efficiency(16, 8, 0.97, 0.99) < scaling_efficiency(8, 8, 0.97, 0.99));
        assert_eq!(scaling_efficiency(0, 8, 0.97, 0.99), 0.0);
    }
}
