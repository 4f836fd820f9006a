//! Engine state: document, layouts, playback and export lifecycle.

/// Owned engine state and layout build supersession.
pub mod engine;
