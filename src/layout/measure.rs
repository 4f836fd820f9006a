use crate::foundation::error::MagicMoveResult;

/// Font metrics above and below the baseline, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalMetrics {
    /// Distance from the top of the glyph box to the baseline.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the glyph box.
    pub descent: f64,
}

/// Measures text the way it will later be painted.
pub trait TextMeasure {
    /// Horizontal advance of `text` at `font_size`.
    fn advance(&mut self, text: &str, font_size: f64) -> MagicMoveResult<f64>;

    /// Ascent/descent at `font_size`.
    fn vertical_metrics(&mut self, font_size: f64) -> MagicMoveResult<VerticalMetrics>;
}

/// Fixed-pitch approximation; needs no font and never fails.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasure {
    /// Advance of one character, in ems.
    pub advance_em: f64,
    /// Ascent in ems.
    pub ascent_em: f64,
    /// Descent in ems.
    pub descent_em: f64,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            advance_em: 0.6,
            ascent_em: 0.8,
            descent_em: 0.2,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn advance(&mut self, text: &str, font_size: f64) -> MagicMoveResult<f64> {
        Ok(text.chars().count() as f64 * self.advance_em * font_size)
    }

    fn vertical_metrics(&mut self, font_size: f64) -> MagicMoveResult<VerticalMetrics> {
        Ok(VerticalMetrics {
            ascent: self.ascent_em * font_size,
            descent: self.descent_em * font_size,
        })
    }
}
