//! Time-to-state mapping for live playback and export.

/// Pure timeline evaluation.
pub mod playback;
/// Live playback cursor.
pub mod playhead;
