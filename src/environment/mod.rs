/// Defines how one accelerator SKU is represented
pub mod accelerator;
/// Defines the ordered accelerator catalog and its validation
pub mod catalog;
