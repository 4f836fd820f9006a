use crate::config::EngineConfig;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{MagicMoveError, MagicMoveResult};
use crate::foundation::math::decimal_digits;
use crate::highlight::tokenizer::{HighlightedCode, ThemeVariant, TokenLine};
use crate::layout::measure::TextMeasure;
use crate::parse::meta::StepMeta;

/// Geometry inputs for laying out one step.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOpts {
    /// Width of the virtual canvas. Lines are not wrapped.
    pub canvas_width: u32,
    /// Height of one line.
    pub line_height: f64,
    /// Left padding before the gutter.
    pub padding_x: f64,
    /// Padding above the first line and below the last one.
    pub padding_y: f64,
    /// Font size in pixels.
    pub font_size: f64,
    /// Space between gutter numerals and code.
    pub gutter_gap: f64,
    /// Reserve a gutter and print line numbers.
    pub show_line_numbers: bool,
    /// Number of the first line.
    pub start_line: u32,
}

impl LayoutOpts {
    /// Combine engine configuration with a step's metadata.
    ///
    /// `forceLineNumbers` turns the gutter on regardless of the step's `lines` key.
    pub fn for_step(cfg: &EngineConfig, meta: StepMeta) -> Self {
        Self {
            canvas_width: cfg.canvas_width,
            line_height: cfg.line_height,
            padding_x: cfg.padding_x,
            padding_y: cfg.padding_y,
            font_size: cfg.font_size,
            gutter_gap: cfg.gutter_gap,
            show_line_numbers: meta.show_line_numbers || cfg.force_line_numbers,
            start_line: meta.start_line.max(1),
        }
    }
}

/// A token placed on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedToken {
    /// Text content.
    pub text: String,
    /// Foreground colour.
    pub color: Rgb8,
    /// Left edge.
    pub x: f64,
    /// Top of the line box.
    pub y: f64,
    /// Measured advance.
    pub width: f64,
    /// Line box height.
    pub height: f64,
    /// Baseline y for painting glyphs.
    pub baseline: f64,
}

/// Positioned, coloured representation of one step, ready for painting.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Code tokens in reading order.
    pub tokens: Vec<PositionedToken>,
    /// Right-aligned gutter numerals, one per line (empty without line numbers).
    pub line_numbers: Vec<PositionedToken>,
    /// Number of source lines.
    pub line_count: usize,
    /// Reserved gutter width including the gap, 0 without line numbers.
    pub gutter_width: f64,
    /// Height of the laid-out content including vertical padding.
    pub content_height: f64,
    /// Background colour reported by the tokenizer.
    pub background: Rgb8,
    /// Dark/light classification of the background.
    pub variant: ThemeVariant,
    /// Offset from the top of a line box to its baseline.
    pub baseline_offset: f64,
    /// Options the layout was built with.
    pub opts: LayoutOpts,
}

impl Layout {
    /// Height of the canvas needed for this layout under a minimum floor.
    pub fn required_height(&self, min_height: u32) -> u32 {
        calculate_height(
            self.line_count,
            self.opts.line_height,
            self.opts.padding_y,
            min_height,
        )
    }
}

/// Lay out tokenizer output for one step.
pub fn layout_code(
    code: &HighlightedCode,
    opts: &LayoutOpts,
    measure: &mut dyn TextMeasure,
) -> MagicMoveResult<Layout> {
    layout_lines(&code.lines, code.background, code.variant(), opts, measure)
}

/// Place tokens left-to-right, top-to-bottom.
pub fn layout_lines(
    lines: &[TokenLine],
    background: Rgb8,
    variant: ThemeVariant,
    opts: &LayoutOpts,
    measure: &mut dyn TextMeasure,
) -> MagicMoveResult<Layout> {
    if !opts.line_height.is_finite() || opts.line_height <= 0.0 {
        return Err(MagicMoveError::layout("line height must be finite and > 0"));
    }
    if !opts.font_size.is_finite() || opts.font_size <= 0.0 {
        return Err(MagicMoveError::layout("font size must be finite and > 0"));
    }

    let line_count = lines.len();
    let metrics = measure.vertical_metrics(opts.font_size)?;
    let baseline_offset =
        (opts.line_height - (metrics.ascent + metrics.descent)) / 2.0 + metrics.ascent;

    let mut line_numbers = Vec::new();
    let gutter_width = if opts.show_line_numbers {
        let last = u64::from(opts.start_line) + line_count.max(1) as u64 - 1;
        let digit = measure.advance("0", opts.font_size)?;
        let width = f64::from(decimal_digits(last)) * digit + opts.gutter_gap;
        let right = opts.padding_x + width - opts.gutter_gap;
        let color = variant.gutter_color();
        for i in 0..line_count {
            let text = (u64::from(opts.start_line) + i as u64).to_string();
            let w = measure.advance(&text, opts.font_size)?;
            let y = line_top(opts, i);
            line_numbers.push(PositionedToken {
                text,
                color,
                x: right - w,
                y,
                width: w,
                height: opts.line_height,
                baseline: y + baseline_offset,
            });
        }
        width
    } else {
        0.0
    };

    let code_x = opts.padding_x + gutter_width;
    let mut tokens = Vec::with_capacity(lines.iter().map(Vec::len).sum());
    for (i, line) in lines.iter().enumerate() {
        let y = line_top(opts, i);
        let mut x = code_x;
        for token in line {
            let width = measure.advance(&token.text, opts.font_size)?;
            tokens.push(PositionedToken {
                text: token.text.clone(),
                color: token.color,
                x,
                y,
                width,
                height: opts.line_height,
                baseline: y + baseline_offset,
            });
            x += width;
        }
    }

    Ok(Layout {
        tokens,
        line_numbers,
        line_count,
        gutter_width,
        content_height: content_height(line_count, opts.line_height, opts.padding_y),
        background,
        variant,
        baseline_offset,
        opts: opts.clone(),
    })
}

fn line_top(opts: &LayoutOpts, line: usize) -> f64 {
    opts.padding_y + line as f64 * opts.line_height
}

/// Height of `line_count` lines plus top and bottom padding.
pub fn content_height(line_count: usize, line_height: f64, padding_y: f64) -> f64 {
    line_count as f64 * line_height + 2.0 * padding_y
}

/// Canvas height for `line_count` lines, never below `min_height`.
pub fn calculate_height(line_count: usize, line_height: f64, padding_y: f64, min_height: u32) -> u32 {
    let content = content_height(line_count, line_height, padding_y).ceil();
    if content.is_finite() && content > f64::from(min_height) {
        content.min(f64::from(u32::MAX)) as u32
    } else {
        min_height
    }
}

/// Shared export height: the tallest step decides, never below `min_height`.
pub fn export_height(layouts: &[Layout], min_height: u32) -> u32 {
    layouts
        .iter()
        .map(|l| l.required_height(min_height))
        .max()
        .unwrap_or(min_height)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
