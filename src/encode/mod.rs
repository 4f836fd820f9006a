//! Frame sinks: in-memory capture and ffmpeg video encoding.

/// System `ffmpeg` sink.
pub mod ffmpeg;
/// Sink contract.
pub mod sink;
