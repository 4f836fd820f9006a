//! Magic-move turns a series of near-identical code snippets into an animation in which tokens
//! that survive between steps glide to their new place while the rest fade in or out.
//!
//! The pipeline, leaf-first:
//!
//! - [`parse_document`] extracts magic-move blocks and their steps from markdown
//! - a [`Tokenizer`] colours each step, and [`layout_code`] positions its tokens
//! - [`animate`] interpolates two adjacent layouts at a given progress
//! - [`Timeline`] maps elapsed time onto held steps and transitions
//! - [`FrameRenderer`] paints a state onto a [`Surface`]
//! - [`export`] drives the timeline at a fixed rate into a [`FrameSink`]
//!
//! [`EngineState`] owns all of the above for a preview/export host.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Token-diff animation.
pub mod animate;
/// Engine configuration.
pub mod config;
/// Frame sinks.
pub mod encode;
/// Fixed-rate export.
pub mod export;
/// Shared primitives and the error type.
pub mod foundation;
/// Tokenizers.
pub mod highlight;
/// Token layout.
pub mod layout;
/// Markdown parsing.
pub mod parse;
/// Frame rendering.
pub mod render;
/// Engine state.
pub mod session;
/// Playback timeline.
pub mod timeline;

pub use crate::animate::diff::{AnimatedToken, animate};
pub use crate::config::EngineConfig;
pub use crate::encode::ffmpeg::{Container, FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::export::scheduler::{ExportCancel, ExportRequest, ExportStats, export};
pub use crate::foundation::core::{Fps, FrameIndex, Rgb8};
pub use crate::foundation::error::{MagicMoveError, MagicMoveResult};
pub use crate::highlight::syntax::SyntectTokenizer;
pub use crate::highlight::tokenizer::{HighlightedCode, PlainTokenizer, ThemeVariant, Token, Tokenizer};
pub use crate::layout::engine::{Layout, LayoutOpts, PositionedToken, calculate_height, layout_code};
pub use crate::layout::measure::{MonospaceMeasure, TextMeasure};
pub use crate::parse::blocks::{Block, BlockKind, ParsedDocument, Step, parse_document};
pub use crate::parse::meta::StepMeta;
pub use crate::render::cpu::FrameRenderer;
pub use crate::render::font::FontFace;
pub use crate::render::surface::{FrameRGBA, Surface};
pub use crate::session::engine::{EngineState, ExportArtifact, ExportStatus};
pub use crate::timeline::playback::{PlaybackState, Timeline, TimelineDurations};
pub use crate::timeline::playhead::Playhead;
