/// Hold and transition durations in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDurations {
    /// Hold on the first step.
    pub start_hold_ms: f64,
    /// Hold on every step reached by a transition except the last.
    pub between_hold_ms: f64,
    /// Hold on the last step.
    pub end_hold_ms: f64,
    /// Duration of each transition.
    pub transition_ms: f64,
}

impl Default for TimelineDurations {
    fn default() -> Self {
        Self {
            start_hold_ms: 250.0,
            between_hold_ms: 120.0,
            end_hold_ms: 250.0,
            transition_ms: 800.0,
        }
    }
}

/// What the timeline shows at an instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaybackState {
    /// A single step is shown statically.
    Holding(usize),
    /// Adjacent steps are being interpolated.
    Transitioning {
        /// Source step.
        from: usize,
        /// Destination step, always `from + 1`.
        to: usize,
        /// Interpolation position in `[0, 1]`.
        progress: f64,
    },
}

impl PlaybackState {
    /// Source and destination step indices; equal while holding.
    pub fn step_indices(self) -> (usize, usize) {
        match self {
            Self::Holding(i) => (i, i),
            Self::Transitioning { from, to, .. } => (from, to),
        }
    }

    /// `true` between two steps.
    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Transitioning { .. })
    }
}

/// Timeline for a fixed number of steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeline {
    /// Configured durations.
    pub durations: TimelineDurations,
    /// Number of steps; 0 behaves like 1.
    pub step_count: usize,
    /// Total duration.
    pub total_ms: f64,
}

impl Timeline {
    /// Derive a timeline. Negative or non-finite durations count as 0.
    pub fn new(step_count: usize, durations: TimelineDurations) -> Self {
        let d = TimelineDurations {
            start_hold_ms: sanitize(durations.start_hold_ms),
            between_hold_ms: sanitize(durations.between_hold_ms),
            end_hold_ms: sanitize(durations.end_hold_ms),
            transition_ms: sanitize(durations.transition_ms),
        };
        let pairs = step_count.saturating_sub(1) as f64;
        let total_ms = d.start_hold_ms
            + pairs * d.transition_ms
            + pairs * d.between_hold_ms
            + d.end_hold_ms;
        Self {
            durations: d,
            step_count,
            total_ms,
        }
    }

    /// State at `elapsed_ms`, clamped into `[0, total_ms]`.
    pub fn state_at(&self, elapsed_ms: f64) -> PlaybackState {
        if self.step_count <= 1 {
            return PlaybackState::Holding(0);
        }
        let d = &self.durations;
        let mut t = if elapsed_ms.is_nan() {
            0.0
        } else {
            elapsed_ms.clamp(0.0, self.total_ms)
        };
        if t < d.start_hold_ms {
            return PlaybackState::Holding(0);
        }
        t -= d.start_hold_ms;
        for i in 0..self.step_count - 1 {
            if t <= d.transition_ms {
                let progress = if d.transition_ms == 0.0 {
                    1.0
                } else {
                    t / d.transition_ms
                };
                return PlaybackState::Transitioning {
                    from: i,
                    to: i + 1,
                    progress,
                };
            }
            t -= d.transition_ms;
            if t <= d.between_hold_ms {
                return PlaybackState::Holding(i + 1);
            }
            t -= d.between_hold_ms;
        }
        PlaybackState::Holding(self.step_count - 1)
    }
}

fn sanitize(ms: f64) -> f64 {
    if ms.is_finite() && ms > 0.0 { ms } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/playback.rs"]
mod tests;
