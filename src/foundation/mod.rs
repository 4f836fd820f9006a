/// Core value types shared across the pipeline.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;
