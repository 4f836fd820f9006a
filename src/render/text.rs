use crate::foundation::error::{MagicMoveError, MagicMoveResult};
use crate::layout::measure::{TextMeasure, VerticalMetrics};
use crate::render::font::FontFace;
use std::collections::HashMap;
use std::sync::Arc;

/// One glyph relative to the pen position on the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    /// Glyph id in the face.
    pub id: u32,
    /// Horizontal offset from the pen.
    pub x: f32,
    /// Vertical offset from the baseline.
    pub y: f32,
}

/// Shaped single-line text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedText {
    /// Glyphs in visual order.
    pub glyphs: Vec<ShapedGlyph>,
    /// Sum of glyph advances.
    pub advance: f64,
}

/// Parley-backed shaper for one font face, caching results per `(text, size)`.
pub struct TextShaper {
    face: FontFace,
    family: String,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    shaped: HashMap<(String, u32), Arc<ShapedText>>,
    metrics: HashMap<u32, VerticalMetrics>,
}

impl TextShaper {
    /// Register `face` with a fresh parley font context.
    pub fn new(face: FontFace) -> MagicMoveResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            MagicMoveError::layout(format!("no font families registered from '{}'", face.source))
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MagicMoveError::layout("registered font family has no name"))?
            .to_string();

        Ok(Self {
            face,
            family,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            shaped: HashMap::new(),
            metrics: HashMap::new(),
        })
    }

    /// Face the shaper was built from.
    pub fn face(&self) -> &FontFace {
        &self.face
    }

    /// Family name parley resolved for the face.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Shape `text` on a single line.
    pub fn shape(&mut self, text: &str, font_size: f64) -> MagicMoveResult<Arc<ShapedText>> {
        let key = (text.to_owned(), size_key(font_size)?);
        if let Some(s) = self.shaped.get(&key) {
            return Ok(Arc::clone(s));
        }

        let mut out = ShapedText::default();
        if !text.is_empty() {
            let layout = self.build(text, font_size as f32);
            let mut pen = 0.0f32;
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    for g in run.glyphs() {
                        out.glyphs.push(ShapedGlyph {
                            id: u32::from(g.id),
                            x: pen + g.x,
                            y: -g.y,
                        });
                        pen += g.advance;
                    }
                }
            }
            out.advance = f64::from(pen);
        }

        let shaped = Arc::new(out);
        self.shaped.insert(key, Arc::clone(&shaped));
        Ok(shaped)
    }

    fn build(&mut self, text: &str, size_px: f32) -> parley::Layout<()> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl TextMeasure for TextShaper {
    fn advance(&mut self, text: &str, font_size: f64) -> MagicMoveResult<f64> {
        Ok(self.shape(text, font_size)?.advance)
    }

    fn vertical_metrics(&mut self, font_size: f64) -> MagicMoveResult<VerticalMetrics> {
        let key = size_key(font_size)?;
        if let Some(m) = self.metrics.get(&key) {
            return Ok(*m);
        }
        let layout = self.build("0", font_size as f32);
        let m = layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                VerticalMetrics {
                    ascent: f64::from(m.ascent),
                    descent: f64::from(m.descent),
                }
            })
            .ok_or_else(|| MagicMoveError::layout("font produced no line metrics"))?;
        self.metrics.insert(key, m);
        Ok(m)
    }
}

fn size_key(font_size: f64) -> MagicMoveResult<u32> {
    if !font_size.is_finite() || font_size <= 0.0 {
        return Err(MagicMoveError::layout("font size must be finite and > 0"));
    }
    Ok((font_size as f32).to_bits())
}
