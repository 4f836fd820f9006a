use super::*;
use crate::encode::sink::InMemorySink;
use crate::highlight::tokenizer::PlainTokenizer;

// Whitespace-only steps lay out tokens that paint without a font.
const BLANK_DOC: &str = "````md magic-move\n```txt\n   \n```\n```txt\n \n   \n```\n````\n";

const CODE_DOC: &str = "````md magic-move {lines:true}\n```ts\nconst a = 1\n```\n```ts {startLine:4}\nconst a = 2\nconst b = a\n```\n````\n";

fn engine() -> EngineState {
    let cfg = EngineConfig {
        canvas_width: 64,
        min_export_height: 32,
        line_height: 8.0,
        padding_x: 2.0,
        padding_y: 2.0,
        font_size: 6.0,
        gutter_gap: 2.0,
        ..EngineConfig::default()
    };
    EngineState::new(
        cfg,
        Box::new(PlainTokenizer::default()),
        FrameRenderer::without_font(),
    )
    .unwrap()
}

#[test]
fn set_document_selects_first_usable_block() {
    let mut e = engine();
    e.set_document("# nothing here\n");
    assert_eq!(e.active_block(), None);
    assert_eq!(e.document().errors.len(), 1);
    e.set_document(CODE_DOC);
    assert_eq!(e.active_block(), Some(0));
    assert_eq!(e.active_steps().len(), 2);
    assert!(e.layouts().is_empty());
}

#[test]
fn rebuild_lays_out_every_step() {
    let mut e = engine();
    e.set_document(CODE_DOC);
    e.rebuild_layouts().unwrap();
    assert_eq!(e.layouts().len(), 2);
    assert!(e.layouts()[0].opts.show_line_numbers);
    assert_eq!(e.layouts()[1].opts.start_line, 4);
    assert_eq!(e.layouts()[1].line_numbers.len(), 2);
    assert_eq!(e.timeline().step_count, 2);
    assert_eq!(e.timeline().total_ms, 250.0 + 800.0 + 120.0 + 250.0);
}

#[test]
fn superseded_build_is_not_committed() {
    let mut e = engine();
    e.set_document(CODE_DOC);
    let mut stale = e.begin_layout_build();
    assert!(stale.run_next(&mut e).unwrap());
    e.set_theme("InspiredGitHub");
    assert!(!stale.token().is_current());
    assert!(!stale.run_next(&mut e).unwrap());
    assert_eq!(stale.progress(), (1, 2));
    assert!(!e.commit_layouts(stale).unwrap());
    assert!(e.layouts().is_empty());
}

#[test]
fn newer_build_supersedes_older_one() {
    let mut e = engine();
    e.set_document(CODE_DOC);
    let mut first = e.begin_layout_build();
    let mut second = e.begin_layout_build();
    while first.run_next(&mut e).unwrap() {}
    while second.run_next(&mut e).unwrap() {}
    assert!(!first.is_complete());
    assert!(second.is_complete());
    assert!(!e.commit_layouts(first).unwrap());
    assert!(e.commit_layouts(second).unwrap());
    assert_eq!(e.layouts().len(), 2);
}

#[test]
fn force_line_numbers_invalidates_and_applies() {
    let mut e = engine();
    e.set_document(BLANK_DOC);
    e.rebuild_layouts().unwrap();
    assert!(!e.layouts()[0].opts.show_line_numbers);
    let build = e.begin_layout_build();
    e.set_force_line_numbers(true);
    assert!(!build.token().is_current());
    e.rebuild_layouts().unwrap();
    assert!(e.layouts().iter().all(|l| l.opts.show_line_numbers));
}

#[test]
fn painting_code_without_font_fails() {
    let mut e = engine();
    e.set_document(CODE_DOC);
    e.rebuild_layouts().unwrap();
    // Code glyphs need a font at paint time.
    let err = e.render_current().unwrap_err();
    assert!(matches!(err, MagicMoveError::Layout(_)));
}

#[test]
fn tick_wraps_and_seek_clamps() {
    let mut e = engine();
    e.set_document(BLANK_DOC);
    e.rebuild_layouts().unwrap();
    let total = e.timeline().total_ms;
    assert_eq!(e.tick(300.0).unwrap(), PlaybackState::Transitioning {
        from: 0,
        to: 1,
        progress: 50.0 / 800.0,
    });
    e.tick(total).unwrap();
    assert_eq!(e.playhead().elapsed_ms, 0.0);
    assert_eq!(e.seek(total * 10.0).unwrap(), PlaybackState::Holding(1));
    e.render_current().unwrap();
}

#[test]
fn tick_and_seek_rejected_while_exporting() {
    let mut e = engine();
    e.export_status = ExportStatus::Exporting { progress: 0.3 };
    assert!(e.tick(16.0).is_err());
    assert!(e.seek(0.0).is_err());
}

#[test]
fn set_durations_validates_and_recomputes() {
    let mut e = engine();
    e.set_document(BLANK_DOC);
    e.rebuild_layouts().unwrap();
    let d = TimelineDurations {
        start_hold_ms: 0.0,
        between_hold_ms: 0.0,
        end_hold_ms: 0.0,
        transition_ms: 100.0,
    };
    e.set_durations(d).unwrap();
    assert_eq!(e.timeline().total_ms, 100.0);
    let bad = TimelineDurations {
        transition_ms: 50.0,
        ..d
    };
    assert!(matches!(
        e.set_durations(bad),
        Err(MagicMoveError::Validation(_))
    ));
    assert_eq!(e.timeline().total_ms, 100.0);
}

#[test]
fn export_succeeds_and_restores_preview() {
    let mut e = engine();
    e.set_document(BLANK_DOC);
    e.rebuild_layouts().unwrap();
    e.seek(500.0).unwrap();
    let mut sink = InMemorySink::new();
    let mut seen = 0usize;
    let artifact = e
        .export_to(&mut sink, "out.webm", &ExportCancel::new(), &mut |_| seen += 1)
        .unwrap();
    let frames = scheduler::frame_count(e.timeline().total_ms, e.config().fps().unwrap());
    assert_eq!(artifact.stats.frames, frames);
    assert_eq!(sink.frames().len() as u64, frames);
    assert_eq!(seen as u64, frames + 1);
    assert_eq!((artifact.stats.width, artifact.stats.height), (64, 32));
    assert_eq!(e.playhead().elapsed_ms, 0.0);
    assert_eq!(e.export_status(), &ExportStatus::Finished(artifact.clone()));
    assert_eq!(e.last_artifact(), Some(&artifact));
    assert_eq!(
        (e.surface().width(), e.surface().height()),
        e.preview_dimensions()
    );
}

#[test]
fn failed_export_rolls_back() {
    let mut e = engine();
    e.set_document(CODE_DOC);
    e.rebuild_layouts().unwrap();
    e.seek(700.0).unwrap();
    let mut sink = InMemorySink::new();
    let err = e
        .export_to(&mut sink, "out.webm", &ExportCancel::new(), &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, MagicMoveError::Layout(_)));
    assert!(sink.is_aborted());
    assert_eq!(e.playhead().elapsed_ms, 0.0);
    assert!(matches!(e.export_status(), ExportStatus::Failed(_)));
    assert!(e.last_artifact().is_none());
}

#[test]
fn export_without_layouts_is_rejected() {
    let mut e = engine();
    let err = e
        .export_to(&mut InMemorySink::new(), "x.webm", &ExportCancel::new(), &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, MagicMoveError::Export(_)));
    assert_eq!(e.export_status(), &ExportStatus::Idle);
}

#[test]
fn select_block_validates_index() {
    let mut e = engine();
    e.set_document(CODE_DOC);
    assert!(e.select_block(3).is_err());
    e.select_block(0).unwrap();
    assert_eq!(e.active_block(), Some(0));
}
