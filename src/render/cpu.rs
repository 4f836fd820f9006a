use crate::animate::diff::AnimatedToken;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{MagicMoveError, MagicMoveResult};
use crate::layout::engine::Layout;
use crate::layout::measure::{MonospaceMeasure, TextMeasure};
use crate::render::font::FontFace;
use crate::render::surface::Surface;
use crate::render::text::TextShaper;

/// CPU painter for code frames.
///
/// Holds the font, the shaper cache and a reusable raster context; every call to
/// [`FrameRenderer::render`] repaints the whole surface.
pub struct FrameRenderer {
    shaper: Option<TextShaper>,
    font: Option<vello_cpu::peniko::FontData>,
    fallback_measure: MonospaceMeasure,
    ctx: Option<vello_cpu::RenderContext>,
}

impl FrameRenderer {
    /// Renderer that shapes and paints with `face`.
    pub fn new(face: FontFace) -> MagicMoveResult<Self> {
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
            face.index,
        );
        Ok(Self {
            shaper: Some(TextShaper::new(face)?),
            font: Some(font),
            fallback_measure: MonospaceMeasure::default(),
            ctx: None,
        })
    }

    /// Renderer with no font: backgrounds paint, glyphs are a layout error.
    pub fn without_font() -> Self {
        Self {
            shaper: None,
            font: None,
            fallback_measure: MonospaceMeasure::default(),
            ctx: None,
        }
    }

    /// Whether glyphs can be painted.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Measurer matching what this renderer paints.
    pub fn measure(&mut self) -> &mut dyn TextMeasure {
        match self.shaper.as_mut() {
            Some(s) => s as &mut dyn TextMeasure,
            None => &mut self.fallback_measure,
        }
    }

    /// Paint `layout` onto `surface`.
    ///
    /// The background covers the surface's allocated size. Line numbers are drawn when the
    /// layout was built with them. Without `tokens` the layout's own tokens are drawn at full
    /// opacity; with it, the animated tokens are drawn instead.
    #[tracing::instrument(skip_all, fields(w = surface.width(), h = surface.height()))]
    pub fn render(
        &mut self,
        surface: &mut Surface,
        layout: &Layout,
        tokens: Option<&[AnimatedToken]>,
    ) -> MagicMoveResult<()> {
        let (w, h) = (surface.width(), surface.height());
        let (w16, h16) = (surface_dim(w)?, surface_dim(h)?);
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w16 && ctx.height() == h16 => ctx,
            _ => vello_cpu::RenderContext::new(w16, h16),
        };
        ctx.reset();

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        set_color(&mut ctx, layout.background);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));

        let painted = self.paint(&mut ctx, layout, tokens);

        if painted.is_ok() {
            ctx.flush();
            ctx.render_to_pixmap(surface.pixmap_mut());
        }
        self.ctx = Some(ctx);
        painted
    }

    fn paint(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &Layout,
        tokens: Option<&[AnimatedToken]>,
    ) -> MagicMoveResult<()> {
        let font_size = layout.opts.font_size;
        for n in &layout.line_numbers {
            self.draw_text(ctx, &n.text, n.color, n.x, n.baseline, font_size, 1.0)?;
        }
        match tokens {
            Some(tokens) => {
                for t in tokens {
                    let baseline = t.y + layout.baseline_offset;
                    self.draw_text(ctx, &t.text, t.color, t.x, baseline, font_size, t.opacity)?;
                }
            }
            None => {
                for t in &layout.tokens {
                    self.draw_text(ctx, &t.text, t.color, t.x, t.baseline, font_size, 1.0)?;
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        color: Rgb8,
        x: f64,
        baseline: f64,
        font_size: f64,
        opacity: f64,
    ) -> MagicMoveResult<()> {
        if opacity <= 0.0 || text.trim().is_empty() {
            return Ok(());
        }
        let (Some(shaper), Some(font)) = (self.shaper.as_mut(), self.font.as_ref()) else {
            return Err(MagicMoveError::layout(
                "no font loaded; cannot paint code glyphs",
            ));
        };
        let shaped = shaper.shape(text, font_size)?;

        let placement = kurbo::Affine::translate(kurbo::Vec2::new(x, baseline));
        ctx.set_transform(affine_to_cpu(placement));
        set_color(ctx, color);
        let layered = opacity < 1.0;
        if layered {
            ctx.push_opacity_layer(opacity as f32);
        }
        let glyphs = shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x,
            y: g.y,
        });
        ctx.glyph_run(font)
            .font_size(font_size as f32)
            .fill_glyphs(glyphs);
        if layered {
            ctx.pop_layer();
        }
        Ok(())
    }
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgb8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255));
}

fn surface_dim(v: u32) -> MagicMoveResult<u16> {
    v.try_into()
        .map_err(|_| MagicMoveError::layout(format!("surface dimension {v} exceeds u16")))
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
