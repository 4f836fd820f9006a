//! Interpolation between two adjacent step layouts.

/// Token identity matching and per-frame interpolation.
pub mod diff;
