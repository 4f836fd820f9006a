use crate::timeline::playback::{PlaybackState, Timeline};

/// Cursor for live playback, advanced by whatever host loop drives the preview.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playhead {
    /// Position on the timeline.
    pub elapsed_ms: f64,
    /// Whether [`Playhead::advance`] moves the cursor.
    pub playing: bool,
}

impl Default for Playhead {
    fn default() -> Self {
        Self {
            elapsed_ms: 0.0,
            playing: true,
        }
    }
}

impl Playhead {
    /// Move forward by `dt_ms` and return the state to display.
    ///
    /// Reaching `total_ms` wraps to 0. Non-positive or non-finite deltas are ignored.
    pub fn advance(&mut self, dt_ms: f64, timeline: &Timeline) -> PlaybackState {
        if self.playing && dt_ms.is_finite() && dt_ms > 0.0 {
            let next = self.elapsed_ms + dt_ms;
            self.elapsed_ms = if next >= timeline.total_ms { 0.0 } else { next };
        }
        timeline.state_at(self.elapsed_ms)
    }

    /// Jump to `ms`, clamped into the timeline.
    pub fn seek(&mut self, ms: f64, timeline: &Timeline) -> PlaybackState {
        self.elapsed_ms = if ms.is_finite() {
            ms.clamp(0.0, timeline.total_ms)
        } else {
            0.0
        };
        timeline.state_at(self.elapsed_ms)
    }

    /// Back to the start.
    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }

    /// Pause or resume.
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }
}
