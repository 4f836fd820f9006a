use crate::foundation::core::Fps;
use crate::foundation::error::{MagicMoveError, MagicMoveResult};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Minimum vertical size of exported frames.
pub const DEFAULT_MIN_EXPORT_HEIGHT: u32 = 1080;

/// Engine configuration.
///
/// JSON keys are camelCase (`canvasWidth`, `transitionMs`, ...). Every field has a default, so an
/// empty object is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    /// Width of the virtual canvas (and of exported frames) in pixels.
    pub canvas_width: u32,
    /// Height of one code line.
    pub line_height: f64,
    /// Horizontal padding left of the gutter / code.
    pub padding_x: f64,
    /// Vertical padding above the first and below the last line.
    pub padding_y: f64,
    /// Font size in pixels.
    pub font_size: f64,
    /// Space between the line-number gutter numerals and the code.
    pub gutter_gap: f64,
    /// Floor applied to preview and export heights.
    pub min_export_height: u32,
    /// Export frame rate, 10..=60.
    pub fps: u32,
    /// Duration of one step-to-step transition, 100..=5000 ms.
    pub transition_ms: f64,
    /// Hold on the first step, 0..=2000 ms.
    pub start_hold_ms: f64,
    /// Hold on every intermediate step, 0..=2000 ms.
    pub between_hold_ms: f64,
    /// Hold on the last step, 0..=2000 ms.
    pub end_hold_ms: f64,
    /// Show line numbers on every step regardless of step metadata.
    pub force_line_numbers: bool,
    /// Tokenizer theme name.
    pub theme: String,
    /// Optional font file; a system monospace face is used when absent.
    pub font_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1920,
            line_height: 42.0,
            padding_x: 80.0,
            padding_y: 80.0,
            font_size: 28.0,
            gutter_gap: 32.0,
            min_export_height: DEFAULT_MIN_EXPORT_HEIGHT,
            fps: 30,
            transition_ms: 800.0,
            start_hold_ms: 250.0,
            between_hold_ms: 120.0,
            end_hold_ms: 250.0,
            force_line_numbers: false,
            theme: "base16-ocean.dark".to_owned(),
            font_path: None,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MagicMoveResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MagicMoveError::validation(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MagicMoveResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MagicMoveError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every option against its accepted range.
    pub fn validate(&self) -> MagicMoveResult<()> {
        if self.canvas_width == 0 {
            return Err(MagicMoveError::validation("canvasWidth must be > 0"));
        }
        positive("lineHeight", self.line_height)?;
        positive("fontSize", self.font_size)?;
        non_negative("paddingX", self.padding_x)?;
        non_negative("paddingY", self.padding_y)?;
        non_negative("gutterGap", self.gutter_gap)?;
        if !(10..=60).contains(&self.fps) {
            return Err(MagicMoveError::validation(format!(
                "fps must be within 10..=60 (got {})",
                self.fps
            )));
        }
        in_range("transitionMs", self.transition_ms, 100.0, 5000.0)?;
        in_range("startHoldMs", self.start_hold_ms, 0.0, 2000.0)?;
        in_range("betweenHoldMs", self.between_hold_ms, 0.0, 2000.0)?;
        in_range("endHoldMs", self.end_hold_ms, 0.0, 2000.0)?;
        if self.theme.trim().is_empty() {
            return Err(MagicMoveError::validation("theme must be non-empty"));
        }
        Ok(())
    }

    /// Export frame rate as a validated [`Fps`].
    pub fn fps(&self) -> MagicMoveResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Durations feeding the playback timeline.
    pub fn durations(&self) -> crate::timeline::playback::TimelineDurations {
        crate::timeline::playback::TimelineDurations {
            start_hold_ms: self.start_hold_ms,
            between_hold_ms: self.between_hold_ms,
            end_hold_ms: self.end_hold_ms,
            transition_ms: self.transition_ms,
        }
    }
}

fn positive(name: &str, v: f64) -> MagicMoveResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(MagicMoveError::validation(format!(
            "{name} must be finite and > 0"
        )));
    }
    Ok(())
}

fn non_negative(name: &str, v: f64) -> MagicMoveResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(MagicMoveError::validation(format!(
            "{name} must be finite and >= 0"
        )));
    }
    Ok(())
}

fn in_range(name: &str, v: f64, lo: f64, hi: f64) -> MagicMoveResult<()> {
    if !v.is_finite() || v < lo || v > hi {
        return Err(MagicMoveError::validation(format!(
            "{name} must be within {lo}..={hi} (got {v})"
        )));
    }
    Ok(())
}
