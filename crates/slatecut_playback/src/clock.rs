use slatecut_core::TimeUs;

/// Monotonic virtual time cursor for the preview. The scheduling loop owns
/// one and advances it between ticks; it never runs backwards except through
/// an explicit seek, and a seek is always clamped to the arrangement.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackClock {
    position: TimeUs,
    playing: bool,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            position: TimeUs::ZERO,
            playing: false,
        }
    }

    pub fn position(&self) -> TimeUs {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Advance by `dt` while playing. Reaching the end of the arrangement
    /// auto-pauses without resetting the cursor. Returns true when this call
    /// hit the end.
    pub fn advance(&mut self, dt: TimeUs, total: TimeUs) -> bool {
        if !self.playing {
            return false;
        }
        self.position = self.position + dt;
        if self.position >= total {
            self.position = total;
            self.playing = false;
            return true;
        }
        false
    }

    /// Manual seek, clamped to `[0, total]`. Play/pause state is untouched.
    pub fn seek(&mut self, t: TimeUs, total: TimeUs) -> TimeUs {
        self.position = t.clamp(TimeUs::ZERO, total);
        self.position
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
