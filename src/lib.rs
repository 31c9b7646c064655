//! PerfTCO!
//!
//! Sizes a fleet of compute accelerators against a budget, power or
//! performance constraint, derives total-cost-of-ownership metrics and
//! quantifies their sensitivity to the cost parameters.

#![allow(non_snake_case)]

extern crate itertools;
extern crate ordered_float;
extern crate rand;
extern crate serde;
extern crate serde_json;
extern crate thiserror;

#[macro_use]
extern crate log;

/// PerfTCO Cost/Performance Evaluation and Sensitivity Analysis
pub mod analysis;

/// PerfTCO Hardware Environment: accelerator profiles and catalogs
pub mod environment;

/// PerfTCO Cost Model: parameters, power and performance scaling
pub mod model;

/// PerfTCO Fleet Orchestration: sizing resolver and evaluation pipeline
pub mod orchestration;
