//! Deterministic frame-by-frame export.

/// Fixed-rate export loop.
pub mod scheduler;
