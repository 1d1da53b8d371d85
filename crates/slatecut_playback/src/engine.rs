use crate::clock::PlaybackClock;
use crate::compositor::{FrameCompositor, PresentationSurface};
use crate::slot::{DecodeSlot, MediaGateway};
use crate::sync::{SlotPair, SlotState, Synchronizer};
use slatecut_core::{Arrangement, TimeUs};
use std::time::Duration;

/// Scheduling period, roughly one display refresh.
pub const TICK_INTERVAL: Duration = Duration::from_micros(16_667);

// ---------------------------------------------------------------------------
// PlaybackEngine
// ---------------------------------------------------------------------------

/// Ties the clock, the synchronizer and the compositor into one tick-driven
/// preview. The arrangement is borrowed per call, never held, so edits can
/// land between any two ticks.
pub struct PlaybackEngine<S: DecodeSlot, P: PresentationSurface, G: MediaGateway> {
    pub clock: PlaybackClock,
    pub sync: Synchronizer<S>,
    pub compositor: FrameCompositor,
    pub surface: P,
    media: G,
    last_video_state: SlotState,
}

impl<S: DecodeSlot, P: PresentationSurface, G: MediaGateway> PlaybackEngine<S, P, G> {
    pub fn new(video: SlotPair<S>, audio: SlotPair<S>, surface: P, media: G) -> Self {
        Self {
            clock: PlaybackClock::new(),
            sync: Synchronizer::new(video, audio),
            compositor: FrameCompositor::new(),
            surface,
            media,
            last_video_state: SlotState::Idle,
        }
    }

    pub fn play(&mut self) {
        tracing::debug!(position = %self.clock.position(), "play");
        self.clock.play();
    }

    pub fn pause(&mut self, arrangement: &Arrangement) {
        tracing::debug!(position = %self.clock.position(), "pause");
        self.clock.pause();
        self.converge(arrangement);
        self.compositor.composite(&self.sync, &mut self.surface);
    }

    pub fn seek(&mut self, arrangement: &Arrangement, t: TimeUs) -> TimeUs {
        let position = self.clock.seek(t, arrangement.total_duration_us());
        tracing::debug!(%position, "seek");
        self.converge(arrangement);
        self.compositor.composite(&self.sync, &mut self.surface);
        position
    }

    /// One scheduling step. Slots converge on every tick, paused or not, so
    /// a load kicked off by a paused seek still completes; the surface only
    /// repaints while playing, at the end-of-timeline stop, or when the
    /// video slot's state changes (e.g. that load coming up ready).
    pub fn tick(&mut self, arrangement: &Arrangement, dt: TimeUs) {
        let hit_end = self.clock.advance(dt, arrangement.total_duration_us());
        if hit_end {
            tracing::debug!(position = %self.clock.position(), "reached end of arrangement");
        }
        let state_changed = self.converge(arrangement);
        if self.clock.is_playing() || hit_end || state_changed {
            self.compositor.composite(&self.sync, &mut self.surface);
        }
    }

    /// Drive playback on a tokio timer until the clock pauses, either by
    /// `pause` from another control path or by reaching the end.
    pub async fn run_while_playing(&mut self, arrangement: &Arrangement) {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        let mut last = tokio::time::Instant::now();
        while self.clock.is_playing() {
            interval.tick().await;
            let now = tokio::time::Instant::now();
            let dt = TimeUs((now - last).as_micros() as i64);
            last = now;
            self.tick(arrangement, dt);
        }
    }

    fn converge(&mut self, arrangement: &Arrangement) -> bool {
        self.sync.tick(
            arrangement,
            &self.media,
            self.clock.position(),
            self.clock.is_playing(),
        );
        let changed = self.sync.video_state() != self.last_video_state;
        self.last_video_state = self.sync.video_state();
        changed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
