/// Defines the cost parameters, sizing modes and efficiency metrics
pub mod params;
/// Defines frequency-dependent performance/power and scaling efficiency
pub mod power;
