use super::*;
use crate::highlight::tokenizer::{ThemeVariant, Token, TokenLine};
use crate::layout::engine::{LayoutOpts, layout_lines};

const BG: Rgb8 = Rgb8::new(10, 20, 30);

fn opts(show_line_numbers: bool) -> LayoutOpts {
    LayoutOpts {
        canvas_width: 64,
        line_height: 16.0,
        padding_x: 4.0,
        padding_y: 4.0,
        font_size: 12.0,
        gutter_gap: 4.0,
        show_line_numbers,
        start_line: 1,
    }
}

fn code_lines() -> Vec<TokenLine> {
    vec![vec![Token {
        text: "fn main".to_owned(),
        color: Rgb8::new(250, 250, 250),
    }]]
}

fn layout_with(r: &mut FrameRenderer, lines: &[TokenLine], show: bool) -> Layout {
    layout_lines(lines, BG, ThemeVariant::Dark, &opts(show), r.measure()).unwrap()
}

fn system_renderer() -> Option<FrameRenderer> {
    let face = FontFace::system_monospace().ok()?;
    FrameRenderer::new(face).ok()
}

#[test]
fn background_fills_whole_surface_after_growth() {
    let mut r = FrameRenderer::without_font();
    let layout = layout_with(&mut r, &[], false);
    let mut s = Surface::new(8, 8).unwrap();
    r.render(&mut s, &layout, None).unwrap();
    s.resize(32, 24).unwrap();
    r.render(&mut s, &layout, None).unwrap();
    let f = s.to_frame();
    assert_eq!(f.pixel(0, 0), Some([10, 20, 30, 255]));
    assert_eq!(f.pixel(31, 23), Some([10, 20, 30, 255]));
}

#[test]
fn glyphs_without_font_are_layout_errors() {
    let mut r = FrameRenderer::without_font();
    assert!(!r.has_font());
    let layout = layout_with(&mut r, &code_lines(), false);
    let mut s = Surface::new(64, 32).unwrap();
    let err = r.render(&mut s, &layout, None).unwrap_err();
    assert!(matches!(err, MagicMoveError::Layout(_)));
}

#[test]
fn invisible_tokens_are_skipped() {
    let mut r = FrameRenderer::without_font();
    let layout = layout_with(&mut r, &code_lines(), false);
    let tokens = vec![AnimatedToken {
        text: "fn main".to_owned(),
        color: Rgb8::new(255, 255, 255),
        x: 4.0,
        y: 4.0,
        opacity: 0.0,
    }];
    let mut s = Surface::new(64, 32).unwrap();
    r.render(&mut s, &layout, Some(&tokens)).unwrap();
    assert_eq!(s.to_frame().pixel(10, 10), Some([10, 20, 30, 255]));
}

#[test]
fn system_font_paints_glyphs() {
    let Some(mut r) = system_renderer() else {
        return;
    };
    let layout = layout_with(&mut r, &code_lines(), true);
    assert_eq!(layout.line_numbers.len(), 1);
    let mut s = Surface::new(128, 32).unwrap();
    r.render(&mut s, &layout, None).unwrap();
    let f = s.to_frame();
    let bg = [10u8, 20, 30, 255];
    let inked = f.data.chunks_exact(4).filter(|px| *px != bg).count();
    assert!(inked > 0);
}

#[test]
fn faded_tokens_paint_lighter_than_opaque_ones() {
    let Some(mut r) = system_renderer() else {
        return;
    };
    let layout = layout_with(&mut r, &code_lines(), false);
    let token = |opacity| AnimatedToken {
        text: "#####".to_owned(),
        color: Rgb8::new(255, 255, 255),
        x: 4.0,
        y: 4.0,
        opacity,
    };
    let brightness = |r: &mut FrameRenderer, opacity: f64| {
        let mut s = Surface::new(128, 32).unwrap();
        r.render(&mut s, &layout, Some(&[token(opacity)])).unwrap();
        s.to_frame()
            .data
            .chunks_exact(4)
            .map(|px| u64::from(px[0]))
            .sum::<u64>()
    };
    let full = brightness(&mut r, 1.0);
    let half = brightness(&mut r, 0.5);
    assert!(full > half);
}
