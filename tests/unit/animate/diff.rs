use super::*;

fn pt(text: &str, x: f64, y: f64, color: Rgb8) -> PositionedToken {
    PositionedToken {
        text: text.to_owned(),
        color,
        x,
        y,
        width: 10.0,
        height: 20.0,
        baseline: y + 15.0,
    }
}

const RED: Rgb8 = Rgb8::new(255, 0, 0);
const BLUE: Rgb8 = Rgb8::new(0, 0, 255);

fn source() -> Vec<PositionedToken> {
    vec![
        pt("let", 0.1, 0.3, RED),
        pt("x", 40.7, 0.3, RED),
        pt("old", 80.0, 0.3, RED),
        pt("x", 0.1, 20.3, RED),
    ]
}

fn dest() -> Vec<PositionedToken> {
    vec![
        pt("x", 5.0, 0.0, BLUE),
        pt("let", 10.0, 20.0, BLUE),
        pt("x", 50.0, 40.0, BLUE),
        pt("new", 90.0, 40.0, BLUE),
    ]
}

#[test]
fn identity_never_drifts_or_fades() {
    let a = source();
    for p in [0.0, 0.13, 0.5, 0.77, 1.0] {
        let out = animate_tokens(&a, &a, p);
        assert_eq!(out.len(), a.len());
        for (o, t) in out.iter().zip(&a) {
            assert_eq!(o.text, t.text);
            assert_eq!((o.x, o.y), (t.x, t.y));
            assert_eq!(o.opacity, 1.0);
        }
    }
}

#[test]
fn progress_zero_equals_source() {
    let out = animate_tokens(&source(), &dest(), 0.0);
    for (o, t) in out.iter().zip(source()) {
        assert_eq!((o.x, o.y, o.color), (t.x, t.y, t.color));
        assert_eq!(o.opacity, 1.0);
    }
    let added = out.last().unwrap();
    assert_eq!(added.text, "new");
    assert_eq!(added.opacity, 0.0);
}

#[test]
fn progress_one_equals_destination() {
    let out = animate_tokens(&source(), &dest(), 1.0);
    let d = dest();
    // let -> d[1], x#0 -> d[0], x#1 -> d[2]
    assert_eq!((out[0].x, out[0].y), (d[1].x, d[1].y));
    assert_eq!((out[1].x, out[1].y), (d[0].x, d[0].y));
    assert_eq!((out[3].x, out[3].y), (d[2].x, d[2].y));
    assert_eq!(out[2].text, "old");
    assert_eq!(out[2].opacity, 0.0);
    assert_eq!(out[4].text, "new");
    assert_eq!(out[4].opacity, 1.0);
    assert!(out.iter().filter(|t| t.text != "old").all(|t| t.color == BLUE));
}

#[test]
fn occurrences_pair_in_order() {
    let fates = match_tokens(&source(), &dest());
    assert_eq!(
        fates,
        vec![
            TokenFate::Matched { from: 0, to: 1 },
            TokenFate::Matched { from: 1, to: 0 },
            TokenFate::Removed { from: 2 },
            TokenFate::Matched { from: 3, to: 2 },
            TokenFate::Added { to: 3 },
        ]
    );
}

#[test]
fn midway_interpolates_and_fades() {
    let out = animate_tokens(&source(), &dest(), 0.5);
    assert!((out[0].x - (0.1 + 10.0) / 2.0).abs() < 1e-9);
    assert_eq!(out[0].color, BLUE);
    assert_eq!(out[2].opacity, 0.5);
    assert_eq!((out[2].x, out[2].y), (80.0, 0.3));
    assert_eq!(out[4].opacity, 0.5);
    assert_eq!((out[4].x, out[4].y), (90.0, 40.0));
}

#[test]
fn progress_is_clamped() {
    let out = animate_tokens(&source(), &dest(), 7.0);
    assert_eq!(out, animate_tokens(&source(), &dest(), 1.0));
    let out = animate_tokens(&source(), &dest(), -1.0);
    assert!(out.iter().all(|t| (0.0..=1.0).contains(&t.opacity)));
    assert_eq!(out, animate_tokens(&source(), &dest(), 0.0));
}

#[test]
fn empty_layouts_give_empty_output() {
    assert!(animate_tokens(&[], &[], 0.5).is_empty());
    let out = animate_tokens(&[], &dest(), 0.25);
    assert_eq!(out.len(), 4);
    assert!(out.iter().all(|t| t.opacity == 0.25));
}

#[test]
fn deterministic() {
    let a = animate_tokens(&source(), &dest(), 0.42);
    let b = animate_tokens(&source(), &dest(), 0.42);
    assert_eq!(a, b);
}
