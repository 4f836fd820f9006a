use super::*;

fn d() -> TimelineDurations {
    TimelineDurations {
        start_hold_ms: 250.0,
        between_hold_ms: 120.0,
        end_hold_ms: 250.0,
        transition_ms: 800.0,
    }
}

#[test]
fn total_for_three_steps() {
    assert_eq!(Timeline::new(3, d()).total_ms, 2340.0);
}

#[test]
fn single_step_total_and_state() {
    let t = Timeline::new(1, d());
    assert_eq!(t.total_ms, 500.0);
    assert_eq!(t.state_at(0.0), PlaybackState::Holding(0));
    assert_eq!(t.state_at(499.0), PlaybackState::Holding(0));
    assert_eq!(Timeline::new(0, d()).state_at(10.0), PlaybackState::Holding(0));
    assert_eq!(Timeline::new(0, d()).total_ms, 500.0);
}

#[test]
fn total_is_monotonic_in_step_count() {
    let mut prev = 0.0;
    for n in 0..10 {
        let total = Timeline::new(n, d()).total_ms;
        assert!(total >= prev);
        prev = total;
    }
}

#[test]
fn walks_holds_and_transitions() {
    let t = Timeline::new(3, d());
    assert_eq!(t.state_at(0.0), PlaybackState::Holding(0));
    assert_eq!(t.state_at(249.0), PlaybackState::Holding(0));
    assert_eq!(
        t.state_at(250.0),
        PlaybackState::Transitioning {
            from: 0,
            to: 1,
            progress: 0.0
        }
    );
    assert_eq!(
        t.state_at(650.0),
        PlaybackState::Transitioning {
            from: 0,
            to: 1,
            progress: 0.5
        }
    );
    assert_eq!(
        t.state_at(1050.0),
        PlaybackState::Transitioning {
            from: 0,
            to: 1,
            progress: 1.0
        }
    );
    assert_eq!(t.state_at(1100.0), PlaybackState::Holding(1));
    assert_eq!(t.state_at(1170.0), PlaybackState::Holding(1));
    assert_eq!(
        t.state_at(1370.0),
        PlaybackState::Transitioning {
            from: 1,
            to: 2,
            progress: 0.25
        }
    );
    assert_eq!(t.state_at(2200.0), PlaybackState::Holding(2));
    assert_eq!(t.state_at(2340.0), PlaybackState::Holding(2));
}

#[test]
fn elapsed_is_clamped() {
    let t = Timeline::new(3, d());
    assert_eq!(t.state_at(-50.0), PlaybackState::Holding(0));
    assert_eq!(t.state_at(1e12), PlaybackState::Holding(2));
    assert_eq!(t.state_at(f64::NAN), PlaybackState::Holding(0));
}

#[test]
fn zero_transition_reports_full_progress() {
    let mut durations = d();
    durations.transition_ms = 0.0;
    durations.between_hold_ms = 0.0;
    let t = Timeline::new(2, durations);
    assert_eq!(t.total_ms, 500.0);
    assert_eq!(
        t.state_at(250.0),
        PlaybackState::Transitioning {
            from: 0,
            to: 1,
            progress: 1.0
        }
    );
}

#[test]
fn helpers_report_indices() {
    assert_eq!(PlaybackState::Holding(4).step_indices(), (4, 4));
    let s = PlaybackState::Transitioning {
        from: 1,
        to: 2,
        progress: 0.3,
    };
    assert_eq!(s.step_indices(), (1, 2));
    assert!(s.is_transitioning());
    assert!(!PlaybackState::Holding(0).is_transitioning());
}
