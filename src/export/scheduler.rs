use crate::animate::diff::animate;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MagicMoveError, MagicMoveResult};
use crate::layout::engine::Layout;
use crate::render::cpu::FrameRenderer;
use crate::render::surface::Surface;
use crate::timeline::playback::{PlaybackState, Timeline};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag that stops a running export between frames.
#[derive(Clone, Debug, Default)]
pub struct ExportCancel(Arc<AtomicBool>);

impl ExportCancel {
    /// Fresh, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Inputs of one export run.
#[derive(Clone, Copy, Debug)]
pub struct ExportRequest<'a> {
    /// One layout per step.
    pub layouts: &'a [Layout],
    /// Timeline over those steps.
    pub timeline: &'a Timeline,
    /// Capture rate.
    pub fps: Fps,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

/// Summary of a finished export.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ExportStats {
    /// Frames handed to the sink.
    pub frames: u64,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Timeline duration covered.
    pub duration_ms: f64,
}

/// Frames needed to cover `total_ms`; at least one.
pub fn frame_count(total_ms: f64, fps: Fps) -> u64 {
    fps.ms_to_frames_ceil(total_ms).max(1)
}

/// Timeline position sampled by frame `idx`.
pub fn frame_elapsed_ms(idx: FrameIndex, fps: Fps, total_ms: f64) -> f64 {
    fps.frame_to_ms(idx).min(total_ms)
}

/// Round dimensions up to even values (yuv420p needs them).
pub fn even_dimensions(width: u32, height: u32) -> (u32, u32) {
    (width.next_multiple_of(2), height.next_multiple_of(2))
}

/// Paint the frame for `state`.
///
/// While transitioning, the destination layout supplies background and gutter once progress is
/// above zero.
pub fn paint_state(
    renderer: &mut FrameRenderer,
    surface: &mut Surface,
    layouts: &[Layout],
    state: PlaybackState,
) -> MagicMoveResult<()> {
    match state {
        PlaybackState::Holding(i) => renderer.render(surface, layout_at(layouts, i)?, None),
        PlaybackState::Transitioning { from, to, progress } => {
            let a = layout_at(layouts, from)?;
            let b = layout_at(layouts, to)?;
            let tokens = animate(a, b, progress);
            let base = if progress > 0.0 { b } else { a };
            renderer.render(surface, base, Some(&tokens))
        }
    }
}

fn layout_at(layouts: &[Layout], i: usize) -> MagicMoveResult<&Layout> {
    layouts
        .get(i)
        .ok_or_else(|| MagicMoveError::layout(format!("step {i} has no layout")))
}

/// Drive the timeline at a fixed rate, painting every frame and handing it to `sink`.
///
/// The surface is resized once to the requested size for the whole run. Progress is reported
/// as `elapsed / total` after each frame and as `1.0` on success. Any failure, including
/// cancellation, aborts the sink so partial output is discarded.
#[tracing::instrument(skip_all, fields(w = req.width, h = req.height, fps = req.fps.num))]
pub fn export(
    renderer: &mut FrameRenderer,
    surface: &mut Surface,
    req: ExportRequest<'_>,
    sink: &mut dyn FrameSink,
    cancel: &ExportCancel,
    on_progress: &mut dyn FnMut(f64),
) -> MagicMoveResult<ExportStats> {
    if req.layouts.is_empty() {
        return Err(MagicMoveError::export("nothing to export: no step layouts"));
    }
    if req.layouts.len() < req.timeline.step_count {
        return Err(MagicMoveError::export(format!(
            "timeline has {} steps but only {} layouts",
            req.timeline.step_count,
            req.layouts.len()
        )));
    }

    surface.resize(req.width, req.height)?;
    let total_ms = req.timeline.total_ms;
    let frames = frame_count(total_ms, req.fps);
    tracing::info!(frames, total_ms, "export started");

    match drive(renderer, surface, &req, sink, cancel, on_progress, frames) {
        Ok(()) => {
            on_progress(1.0);
            tracing::info!(frames, "export finished");
            Ok(ExportStats {
                frames,
                width: req.width,
                height: req.height,
                duration_ms: total_ms,
            })
        }
        Err(e) => {
            sink.abort();
            tracing::warn!("export failed: {e}");
            Err(e)
        }
    }
}

fn drive(
    renderer: &mut FrameRenderer,
    surface: &mut Surface,
    req: &ExportRequest<'_>,
    sink: &mut dyn FrameSink,
    cancel: &ExportCancel,
    on_progress: &mut dyn FnMut(f64),
    frames: u64,
) -> MagicMoveResult<()> {
    let total_ms = req.timeline.total_ms;
    sink.begin(SinkConfig {
        width: req.width,
        height: req.height,
        fps: req.fps,
        duration_ms: total_ms,
    })?;
    for i in 0..frames {
        if cancel.is_cancelled() {
            return Err(MagicMoveError::export("export cancelled"));
        }
        let idx = FrameIndex(i);
        let elapsed = frame_elapsed_ms(idx, req.fps, total_ms);
        paint_state(renderer, surface, req.layouts, req.timeline.state_at(elapsed))?;
        let frame = surface.to_frame();
        if frame.width != req.width || frame.height != req.height {
            return Err(MagicMoveError::export(
                "surface size changed during export",
            ));
        }
        sink.push_frame(idx, &frame)?;
        on_progress(if total_ms > 0.0 { elapsed / total_ms } else { 1.0 });
    }
    sink.end()
}

#[cfg(test)]
#[path = "../../tests/unit/export/scheduler.rs"]
mod tests;
