/// Cost-performance evaluation of a sized fleet
pub mod cost;
/// Shared numeric guards for degenerate inputs
pub mod numeric;
/// The three sensitivity estimators: elasticity, Sobol, Monte Carlo
pub mod sensitivity;
