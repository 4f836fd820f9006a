use crate::config::EngineConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::FrameSink;
use crate::export::scheduler::{
    self, ExportCancel, ExportRequest, ExportStats, even_dimensions, paint_state,
};
use crate::foundation::error::{MagicMoveError, MagicMoveResult};
use crate::highlight::tokenizer::Tokenizer;
use crate::layout::engine::{Layout, LayoutOpts, export_height, layout_code};
use crate::parse::blocks::{ParsedDocument, Step, parse_document};
use crate::render::cpu::FrameRenderer;
use crate::render::surface::{FrameRGBA, Surface};
use crate::timeline::playback::{PlaybackState, Timeline, TimelineDurations};
use crate::timeline::playhead::Playhead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Record of a finished export.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ExportArtifact {
    /// Where the video was written.
    pub path: PathBuf,
    /// Frame statistics.
    pub stats: ExportStats,
}

/// Export lifecycle as seen by a host UI.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ExportStatus {
    /// No export has run, or the last artifact was released.
    #[default]
    Idle,
    /// An export is running.
    Exporting {
        /// Fraction of the timeline captured so far.
        progress: f64,
    },
    /// The last export succeeded.
    Finished(ExportArtifact),
    /// The last export failed; the message is user-facing.
    Failed(String),
}

impl ExportStatus {
    /// `true` while an export is running.
    pub fn is_exporting(&self) -> bool {
        matches!(self, Self::Exporting { .. })
    }
}

/// Ticket identifying one layout build; goes stale when inputs change again.
#[derive(Clone, Debug)]
pub struct BuildToken {
    current: Arc<AtomicU64>,
    issued: u64,
}

impl BuildToken {
    /// Generation this token was issued for.
    pub fn generation(&self) -> u64 {
        self.issued
    }

    /// `false` once a newer build started or inputs changed.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.issued
    }
}

/// An in-flight tokenize-then-layout pass over the active block's steps.
#[derive(Debug)]
pub struct LayoutBuild {
    token: BuildToken,
    steps: Vec<Step>,
    config: EngineConfig,
    layouts: Vec<Layout>,
}

impl LayoutBuild {
    /// Supersession ticket.
    pub fn token(&self) -> &BuildToken {
        &self.token
    }

    /// Every step has a layout.
    pub fn is_complete(&self) -> bool {
        self.layouts.len() == self.steps.len()
    }

    /// Steps laid out so far.
    pub fn progress(&self) -> (usize, usize) {
        (self.layouts.len(), self.steps.len())
    }

    /// Tokenize and lay out the next step.
    ///
    /// Returns `true` while steps remain. A stale build stops without doing work.
    pub fn run_next(&mut self, engine: &mut EngineState) -> MagicMoveResult<bool> {
        if !self.token.is_current() {
            tracing::debug!(generation = self.token.issued, "layout build superseded");
            return Ok(false);
        }
        let Some(step) = self.steps.get(self.layouts.len()) else {
            return Ok(false);
        };
        let code = engine
            .tokenizer
            .tokenize(&step.code, &step.language, &self.config.theme);
        let opts = LayoutOpts::for_step(&self.config, step.meta);
        let layout = layout_code(&code, &opts, engine.renderer.measure())?;
        self.layouts.push(layout);
        Ok(!self.is_complete())
    }
}

/// Everything a preview/export host needs, mutated only through the methods below.
pub struct EngineState {
    config: EngineConfig,
    document: ParsedDocument,
    active_block: Option<usize>,
    layouts: Vec<Layout>,
    layout_error: Option<String>,
    timeline: Timeline,
    playhead: Playhead,
    generation: Arc<AtomicU64>,
    tokenizer: Box<dyn Tokenizer>,
    renderer: FrameRenderer,
    surface: Surface,
    export_status: ExportStatus,
    last_artifact: Option<ExportArtifact>,
}

impl EngineState {
    /// Engine with an empty document.
    pub fn new(
        config: EngineConfig,
        tokenizer: Box<dyn Tokenizer>,
        renderer: FrameRenderer,
    ) -> MagicMoveResult<Self> {
        config.validate()?;
        let surface = Surface::new(config.canvas_width, config.min_export_height.max(1))?;
        let timeline = Timeline::new(0, config.durations());
        Ok(Self {
            config,
            document: ParsedDocument::default(),
            active_block: None,
            layouts: Vec::new(),
            layout_error: None,
            timeline,
            playhead: Playhead::default(),
            generation: Arc::new(AtomicU64::new(0)),
            tokenizer,
            renderer,
            surface,
            export_status: ExportStatus::Idle,
            last_artifact: None,
        })
    }

    /// Current configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Last parse result.
    pub fn document(&self) -> &ParsedDocument {
        &self.document
    }

    /// Index of the block being previewed.
    pub fn active_block(&self) -> Option<usize> {
        self.active_block
    }

    /// Steps of the active block.
    pub fn active_steps(&self) -> &[Step] {
        self.active_block
            .and_then(|i| self.document.blocks.get(i))
            .map_or(&[], |b| b.steps.as_slice())
    }

    /// Committed layouts, one per step of the active block.
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// Message of the last failed build, if it has not been resolved.
    pub fn layout_error(&self) -> Option<&str> {
        self.layout_error.as_deref()
    }

    /// Timeline over the committed layouts.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Live playback cursor.
    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    /// Preview surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Export lifecycle state.
    pub fn export_status(&self) -> &ExportStatus {
        &self.export_status
    }

    /// Artifact of the last successful export.
    pub fn last_artifact(&self) -> Option<&ExportArtifact> {
        self.last_artifact.as_ref()
    }

    /// Pixels currently on the preview surface.
    pub fn frame(&self) -> FrameRGBA {
        self.surface.to_frame()
    }

    /// Parse `text` and activate its first usable block.
    ///
    /// Parse problems are recorded in [`EngineState::document`]; they never fail this call.
    pub fn set_document(&mut self, text: &str) {
        self.document = parse_document(text);
        self.active_block = self.document.first_usable_block();
        self.invalidate();
        self.layouts.clear();
        self.timeline = Timeline::new(0, self.config.durations());
        self.playhead.reset();
    }

    /// Activate block `index`.
    pub fn select_block(&mut self, index: usize) -> MagicMoveResult<()> {
        let block = self.document.blocks.get(index).ok_or_else(|| {
            MagicMoveError::validation(format!(
                "block {index} does not exist ({} blocks)",
                self.document.blocks.len()
            ))
        })?;
        if !block.is_usable() {
            return Err(MagicMoveError::parse(format!(
                "block {index} cannot be previewed: {}",
                block.errors.join("; ")
            )));
        }
        if self.active_block != Some(index) {
            self.active_block = Some(index);
            self.invalidate();
            self.layouts.clear();
            self.timeline = Timeline::new(0, self.config.durations());
            self.playhead.reset();
        }
        Ok(())
    }

    /// Switch the tokenizer theme; layouts must be rebuilt.
    pub fn set_theme(&mut self, theme: impl Into<String>) {
        let theme = theme.into();
        if theme != self.config.theme {
            self.config.theme = theme;
            self.invalidate();
        }
    }

    /// Toggle line numbers on every step; layouts must be rebuilt.
    pub fn set_force_line_numbers(&mut self, on: bool) {
        if on != self.config.force_line_numbers {
            self.config.force_line_numbers = on;
            self.invalidate();
        }
    }

    /// Change hold/transition durations. Layouts stay valid.
    pub fn set_durations(&mut self, durations: TimelineDurations) -> MagicMoveResult<()> {
        let mut next = self.config.clone();
        next.start_hold_ms = durations.start_hold_ms;
        next.between_hold_ms = durations.between_hold_ms;
        next.end_hold_ms = durations.end_hold_ms;
        next.transition_ms = durations.transition_ms;
        next.validate()?;
        self.config = next;
        self.timeline = Timeline::new(self.layouts.len(), self.config.durations());
        self.playhead.seek(self.playhead.elapsed_ms, &self.timeline);
        Ok(())
    }

    fn invalidate(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Start a build for the active block, superseding any build in flight.
    pub fn begin_layout_build(&mut self) -> LayoutBuild {
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LayoutBuild {
            token: BuildToken {
                current: Arc::clone(&self.generation),
                issued,
            },
            steps: self.active_steps().to_vec(),
            config: self.config.clone(),
            layouts: Vec::new(),
        }
    }

    /// Install a finished build.
    ///
    /// Returns `Ok(false)` and discards the results when the build is stale or incomplete.
    pub fn commit_layouts(&mut self, build: LayoutBuild) -> MagicMoveResult<bool> {
        if !build.token.is_current() || !build.is_complete() {
            tracing::debug!(
                generation = build.token.issued,
                "discarding stale or incomplete layout build"
            );
            return Ok(false);
        }
        self.layouts = build.layouts;
        self.layout_error = None;
        self.timeline = Timeline::new(self.layouts.len(), self.config.durations());
        self.playhead.seek(self.playhead.elapsed_ms, &self.timeline);
        let (w, h) = self.preview_dimensions();
        self.surface.resize(w, h)?;
        Ok(true)
    }

    /// Build layouts for the active block to completion and commit them.
    #[tracing::instrument(skip(self), fields(steps = self.active_steps().len()))]
    pub fn rebuild_layouts(&mut self) -> MagicMoveResult<()> {
        let mut build = self.begin_layout_build();
        let outcome = loop {
            match build.run_next(self) {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        if let Err(e) = outcome {
            self.layouts.clear();
            self.timeline = Timeline::new(0, self.config.durations());
            self.layout_error = Some(e.to_string());
            return Err(e);
        }
        self.commit_layouts(build)?;
        Ok(())
    }

    /// Preview size: canvas width by the tallest step's height.
    pub fn preview_dimensions(&self) -> (u32, u32) {
        (
            self.config.canvas_width,
            export_height(&self.layouts, self.config.min_export_height.max(1)),
        )
    }

    /// Advance live playback by `dt_ms`; wraps at the end of the timeline.
    pub fn tick(&mut self, dt_ms: f64) -> MagicMoveResult<PlaybackState> {
        self.ensure_not_exporting()?;
        Ok(self.playhead.advance(dt_ms, &self.timeline))
    }

    /// Jump the playhead to `ms`.
    pub fn seek(&mut self, ms: f64) -> MagicMoveResult<PlaybackState> {
        self.ensure_not_exporting()?;
        Ok(self.playhead.seek(ms, &self.timeline))
    }

    /// Pause or resume live playback.
    pub fn set_playing(&mut self, playing: bool) {
        self.playhead.set_playing(playing);
    }

    /// State at the playhead.
    pub fn current_state(&self) -> PlaybackState {
        self.timeline.state_at(self.playhead.elapsed_ms)
    }

    /// Paint the frame at the playhead onto the preview surface. No-op without layouts.
    pub fn render_current(&mut self) -> MagicMoveResult<()> {
        if self.layouts.is_empty() {
            return Ok(());
        }
        let state = self.current_state();
        paint_state(&mut self.renderer, &mut self.surface, &self.layouts, state)
    }

    fn ensure_not_exporting(&self) -> MagicMoveResult<()> {
        if self.export_status.is_exporting() {
            return Err(MagicMoveError::validation(
                "the surface is owned by a running export",
            ));
        }
        Ok(())
    }

    /// Export the committed layouts into `sink`; `path` names the resulting artifact.
    ///
    /// The previous artifact is released first. Whatever the outcome, the playhead returns to 0,
    /// the preview surface is restored and frame 0 is repainted before this returns.
    #[tracing::instrument(skip(self, sink, cancel, on_progress), fields(path = %path.as_ref().display()))]
    pub fn export_to(
        &mut self,
        sink: &mut dyn FrameSink,
        path: impl AsRef<Path>,
        cancel: &ExportCancel,
        on_progress: &mut dyn FnMut(f64),
    ) -> MagicMoveResult<ExportArtifact> {
        self.ensure_not_exporting()?;
        if self.layouts.is_empty() {
            return Err(MagicMoveError::export(
                "no layouts to export; build the active block first",
            ));
        }
        if let Some(prev) = self.last_artifact.take() {
            tracing::debug!(path = %prev.path.display(), "released previous export artifact");
        }
        self.export_status = ExportStatus::Exporting { progress: 0.0 };

        let fps = self.config.fps()?;
        let (width, height) = even_dimensions(
            self.config.canvas_width,
            export_height(&self.layouts, self.config.min_export_height.max(1)),
        );

        let Self {
            renderer,
            surface,
            layouts,
            timeline,
            export_status,
            ..
        } = self;
        let result = scheduler::export(
            renderer,
            surface,
            ExportRequest {
                layouts,
                timeline,
                fps,
                width,
                height,
            },
            sink,
            cancel,
            &mut |p| {
                *export_status = ExportStatus::Exporting { progress: p };
                on_progress(p);
            },
        );

        self.playhead.reset();
        let (w, h) = self.preview_dimensions();
        if let Err(e) = self
            .surface
            .resize(w, h)
            .and_then(|()| self.render_current())
        {
            tracing::warn!("failed to restore preview after export: {e}");
        }

        match result {
            Ok(stats) => {
                let artifact = ExportArtifact {
                    path: path.as_ref().to_path_buf(),
                    stats,
                };
                self.export_status = ExportStatus::Finished(artifact.clone());
                self.last_artifact = Some(artifact.clone());
                Ok(artifact)
            }
            Err(e) => {
                self.export_status = ExportStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Export to a video file through the system `ffmpeg`.
    pub fn export_video(
        &mut self,
        out_path: impl Into<PathBuf>,
        cancel: &ExportCancel,
        on_progress: &mut dyn FnMut(f64),
    ) -> MagicMoveResult<ExportArtifact> {
        let out_path = out_path.into();
        let mut opts = FfmpegSinkOpts::new(&out_path);
        if let Some(first) = self.layouts.first() {
            opts.bg_rgba = first.background.to_rgba8(1.0);
        }
        let mut sink = FfmpegSink::new(opts);
        self.export_to(&mut sink, &out_path, cancel, on_progress)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/engine.rs"]
mod tests;
