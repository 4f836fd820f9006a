//! Token layout: highlighted lines to positioned tokens.

/// Token placement and canvas height helpers.
pub mod engine;
/// Text measurement seam.
pub mod measure;
