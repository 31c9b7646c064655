/// The evaluation pipeline over a whole catalog
pub mod orchestrate;
/// Turns a sizing mode and cost parameters into node-aligned counts
pub mod resolve;
