//! Frame painting: surfaces, fonts, shaping and the CPU renderer.

/// CPU frame renderer.
pub mod cpu;
/// Font loading and system font discovery.
pub mod font;
/// Raster surface and frame buffers.
pub mod surface;
/// Parley text shaping.
pub mod text;
