use crate::slot::{DecodeSlot, Frame, Readiness};
use crate::sync::{SlotState, Synchronizer};

// ---------------------------------------------------------------------------
// PresentationSurface
// ---------------------------------------------------------------------------

/// Wherever frames end up: a GPU texture, a window, a test sink.
pub trait PresentationSurface {
    fn present(&mut self, frame: Frame);
    /// Explicit black. Shown for gaps and while a transition is loading, so
    /// a stale frame from a previous clip can never linger on screen.
    fn present_gap(&mut self);
}

// ---------------------------------------------------------------------------
// FrameCompositor
// ---------------------------------------------------------------------------

/// Pulls the active video slot's current frame onto the surface once per
/// tick. Output is gated on the synchronizer: anything short of a synced,
/// ready slot with a frame in hand renders as a gap.
pub struct FrameCompositor {
    showing_gap: bool,
}

impl FrameCompositor {
    pub fn new() -> Self {
        Self { showing_gap: true }
    }

    pub fn composite<S: DecodeSlot, P: PresentationSurface>(
        &mut self,
        sync: &Synchronizer<S>,
        surface: &mut P,
    ) {
        if sync.video_state() == SlotState::Synced {
            let slot = sync.video.active();
            if slot.readiness() == Readiness::Ready {
                if let Some(frame) = slot.current_frame() {
                    if self.showing_gap {
                        tracing::trace!("video resumed");
                    }
                    self.showing_gap = false;
                    surface.present(frame);
                    return;
                }
            }
        }
        if !self.showing_gap {
            tracing::trace!("rendering gap");
        }
        self.showing_gap = true;
        surface.present_gap();
    }
}

impl Default for FrameCompositor {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_frame, url_source, FakeSlot, StaticGateway};
    use crate::sync::SlotPair;
    use slatecut_core::{Arrangement, Clip, TimeUs, Track, TrackKind, TrackSettings};
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeSurface {
        frames: Vec<Frame>,
        gaps: usize,
    }

    impl PresentationSurface for FakeSurface {
        fn present(&mut self, frame: Frame) {
            self.frames.push(frame);
        }

        fn present_gap(&mut self) {
            self.gaps += 1;
        }
    }

    fn one_clip_arrangement(source_id: Uuid) -> Arrangement {
        let clip = Clip::new(
            source_id,
            0,
            TimeUs::ZERO,
            TimeUs::from_seconds(10.0),
            TimeUs::from_seconds(10.0),
        );
        Arrangement {
            tracks: vec![Arc::new(Track { clips: vec![clip] })],
            settings: vec![TrackSettings::new("Video 1", TrackKind::Video)],
        }
    }

    #[test]
    fn synced_ready_slot_presents_its_frame() {
        let source_id = Uuid::new_v4();
        let arr = one_clip_arrangement(source_id);
        let media = StaticGateway::with([(source_id, url_source("a.mp4"))]);
        let mut sync = Synchronizer::new(
            SlotPair::new(
                FakeSlot::new().with_frame(TimeUs(1)),
                FakeSlot::new().with_frame(TimeUs(2)),
            ),
            SlotPair::new(FakeSlot::new(), FakeSlot::new()),
        );
        let mut surface = FakeSurface::default();
        let mut compositor = FrameCompositor::new();

        sync.tick(&arr, &media, TimeUs::from_seconds(1.0), true);
        sync.tick(&arr, &media, TimeUs::from_seconds(1.0), true);
        compositor.composite(&sync, &mut surface);

        assert_eq!(surface.frames.len(), 1);
        assert_eq!(surface.gaps, 0);
    }

    #[test]
    fn loading_slot_renders_gap() {
        let source_id = Uuid::new_v4();
        let arr = one_clip_arrangement(source_id);
        let media = StaticGateway::with([(source_id, url_source("a.mp4"))]);
        let mut sync = Synchronizer::new(
            SlotPair::new(FakeSlot::manual(), FakeSlot::manual()),
            SlotPair::new(FakeSlot::manual(), FakeSlot::manual()),
        );
        let mut surface = FakeSurface::default();
        let mut compositor = FrameCompositor::new();

        sync.tick(&arr, &media, TimeUs::from_seconds(1.0), true);
        compositor.composite(&sync, &mut surface);

        assert!(surface.frames.is_empty());
        assert_eq!(surface.gaps, 1);
    }

    #[test]
    fn gap_in_timeline_renders_gap() {
        let arr = Arrangement {
            tracks: vec![Arc::new(Track::default())],
            settings: vec![TrackSettings::new("Video 1", TrackKind::Video)],
        };
        let media = StaticGateway::default();
        let mut sync = Synchronizer::new(
            SlotPair::new(FakeSlot::new(), FakeSlot::new()),
            SlotPair::new(FakeSlot::new(), FakeSlot::new()),
        );
        let mut surface = FakeSurface::default();
        let mut compositor = FrameCompositor::new();

        sync.tick(&arr, &media, TimeUs::ZERO, true);
        compositor.composite(&sync, &mut surface);

        assert_eq!(surface.gaps, 1);
    }

    #[test]
    fn synced_slot_without_frame_renders_gap() {
        // A decoder that cannot hand frames back (external window) still
        // must not leave stale content on the surface.
        let source_id = Uuid::new_v4();
        let arr = one_clip_arrangement(source_id);
        let media = StaticGateway::with([(source_id, url_source("a.mp4"))]);
        let mut sync = Synchronizer::new(
            SlotPair::new(FakeSlot::new(), FakeSlot::new()),
            SlotPair::new(FakeSlot::new(), FakeSlot::new()),
        );
        let mut surface = FakeSurface::default();
        let mut compositor = FrameCompositor::new();

        sync.tick(&arr, &media, TimeUs::from_seconds(1.0), true);
        sync.tick(&arr, &media, TimeUs::from_seconds(1.0), true);
        compositor.composite(&sync, &mut surface);

        assert!(surface.frames.is_empty());
        assert_eq!(surface.gaps, 1);
    }

    #[test]
    fn frame_carries_slot_pts() {
        let source_id = Uuid::new_v4();
        let arr = one_clip_arrangement(source_id);
        let media = StaticGateway::with([(source_id, url_source("a.mp4"))]);
        let mut slot_a = FakeSlot::new();
        slot_a.frame = Some(test_frame(TimeUs(42)));
        let mut slot_b = FakeSlot::new();
        slot_b.frame = Some(test_frame(TimeUs(42)));
        let mut sync = Synchronizer::new(
            SlotPair::new(slot_a, slot_b),
            SlotPair::new(FakeSlot::new(), FakeSlot::new()),
        );
        let mut surface = FakeSurface::default();
        let mut compositor = FrameCompositor::new();

        sync.tick(&arr, &media, TimeUs::from_seconds(1.0), true);
        sync.tick(&arr, &media, TimeUs::from_seconds(1.0), true);
        compositor.composite(&sync, &mut surface);

        assert_eq!(surface.frames[0].pts_us, TimeUs(42));
    }
}
