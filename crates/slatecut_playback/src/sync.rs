use crate::select::{self, AudioSelection};
use crate::slot::{DecodeSlot, MediaGateway, Readiness};
use slatecut_core::{Arrangement, TimeUs, TrackKind};
use uuid::Uuid;

/// Maximum divergence between the playback clock and a decoder before the
/// synchronizer issues a corrective seek.
pub const DRIFT_TOLERANCE_PLAYING_US: TimeUs = TimeUs(250_000);
pub const DRIFT_TOLERANCE_PAUSED_US: TimeUs = TimeUs(50_000);

/// How far ahead of the playhead the spare slot starts loading the next clip.
pub const PRELOAD_LOOKAHEAD_US: TimeUs = TimeUs(1_000_000);

// ---------------------------------------------------------------------------
// SlotState
// ---------------------------------------------------------------------------

/// Per-modality synchronizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No clip under the playhead (or its media is unresolvable): a gap.
    Idle,
    /// The winning clip's source is still loading; output is suppressed.
    Loading,
    /// The active slot holds the winning source and tracks the clock.
    Synced,
}

// ---------------------------------------------------------------------------
// SlotPair
// ---------------------------------------------------------------------------

/// Two interchangeable decode slots for one modality. One is on air, the
/// other preloads the next source; a transition is a swap, never a teardown.
pub struct SlotPair<S: DecodeSlot> {
    slots: [S; 2],
    active: usize,
}

impl<S: DecodeSlot> SlotPair<S> {
    pub fn new(a: S, b: S) -> Self {
        Self {
            slots: [a, b],
            active: 0,
        }
    }

    pub fn active(&self) -> &S {
        &self.slots[self.active]
    }

    pub fn active_mut(&mut self) -> &mut S {
        &mut self.slots[self.active]
    }

    pub fn spare(&self) -> &S {
        &self.slots[1 - self.active]
    }

    pub fn spare_mut(&mut self) -> &mut S {
        &mut self.slots[1 - self.active]
    }

    fn swap(&mut self) {
        self.active = 1 - self.active;
    }
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// What one modality's active slot should look like this tick.
struct Target {
    source_id: Uuid,
    offset_us: TimeUs,
    volume: f64,
}

/// Keeps both slot pairs converged on whatever the arrangement says should
/// be playing at the clock position. Purely tick-driven: every call to
/// `tick` observes slot readiness and issues at most one load, seek or swap
/// per modality, so a load that is superseded mid-flight is simply
/// overwritten on the spare before it ever goes on air.
pub struct Synchronizer<S: DecodeSlot> {
    pub video: SlotPair<S>,
    pub audio: SlotPair<S>,
    video_state: SlotState,
    audio_state: SlotState,
}

impl<S: DecodeSlot> Synchronizer<S> {
    pub fn new(video: SlotPair<S>, audio: SlotPair<S>) -> Self {
        Self {
            video,
            audio,
            video_state: SlotState::Idle,
            audio_state: SlotState::Idle,
        }
    }

    pub fn video_state(&self) -> SlotState {
        self.video_state
    }

    pub fn audio_state(&self) -> SlotState {
        self.audio_state
    }

    pub fn tick<G: MediaGateway>(
        &mut self,
        arrangement: &Arrangement,
        media: &G,
        now: TimeUs,
        playing: bool,
    ) {
        // Video slots never emit audio; sound always comes from the audio
        // pair, even when it is playing a video clip's embedded track.
        let video_target = select::winning_video(arrangement, now).map(|active| Target {
            source_id: active.clip.source_id,
            offset_us: active.clip.source_offset_at(now),
            volume: 0.0,
        });
        let audio_target = select::winning_audio(arrangement, now).map(|sel| match sel {
            AudioSelection::Track(active) => Target {
                source_id: active.clip.source_id,
                offset_us: active.clip.source_offset_at(now),
                volume: if active.clip.muted {
                    0.0
                } else {
                    active.clip.volume
                },
            },
            AudioSelection::Embedded(active) => Target {
                source_id: active.clip.source_id,
                offset_us: active.clip.source_offset_at(now),
                volume: active.clip.volume,
            },
        });

        self.video_state = drive(&mut self.video, video_target, media, playing, "video");
        self.audio_state = drive(&mut self.audio, audio_target, media, playing, "audio");

        preload(
            &mut self.video,
            arrangement,
            media,
            TrackKind::Video,
            now,
            self.video_state,
        );
        preload(
            &mut self.audio,
            arrangement,
            media,
            TrackKind::Audio,
            now,
            self.audio_state,
        );
    }
}

fn drive<S: DecodeSlot, G: MediaGateway>(
    pair: &mut SlotPair<S>,
    target: Option<Target>,
    media: &G,
    playing: bool,
    modality: &'static str,
) -> SlotState {
    let Some(target) = target else {
        pair.active_mut().set_playing(false);
        return SlotState::Idle;
    };
    let Some(source) = media.resolve(target.source_id) else {
        tracing::debug!(
            modality,
            source_id = %target.source_id,
            "media unresolved, rendering gap"
        );
        pair.active_mut().set_playing(false);
        return SlotState::Idle;
    };

    if pair.active().loaded_source() == Some(&source) {
        return reconcile_active(pair, &target, playing);
    }

    if pair.spare().loaded_source() == Some(&source) {
        if pair.spare().readiness() == Readiness::Ready {
            pair.active_mut().set_playing(false);
            pair.swap();
            tracing::debug!(modality, "swapped to preloaded slot");
            return reconcile_active(pair, &target, playing);
        }
        pair.active_mut().set_playing(false);
        return SlotState::Loading;
    }

    // Fresh load on the spare; whatever it was loading before is superseded.
    tracing::debug!(
        modality,
        source_id = %target.source_id,
        offset = %target.offset_us,
        "loading"
    );
    pair.active_mut().set_playing(false);
    pair.spare_mut().load(source, target.offset_us);
    SlotState::Loading
}

fn reconcile_active<S: DecodeSlot>(
    pair: &mut SlotPair<S>,
    target: &Target,
    playing: bool,
) -> SlotState {
    let slot = pair.active_mut();
    if slot.readiness() != Readiness::Ready {
        slot.set_playing(false);
        return SlotState::Loading;
    }
    let tolerance = if playing {
        DRIFT_TOLERANCE_PLAYING_US
    } else {
        DRIFT_TOLERANCE_PAUSED_US
    };
    if let Some(position) = slot.position_us() {
        if position.abs_diff(target.offset_us) > tolerance {
            slot.seek(target.offset_us);
        }
    }
    slot.set_playing(playing);
    slot.set_volume(target.volume);
    SlotState::Synced
}

/// Warm the spare with the next clip's source once it is within the
/// lookahead window. Skipped while the spare is needed for the current
/// winner, and when the next clip continues the same source (the active
/// slot just seeks across the boundary). Embedded-audio fallbacks are not
/// anticipated here; they go through the ordinary loading path.
fn preload<S: DecodeSlot, G: MediaGateway>(
    pair: &mut SlotPair<S>,
    arrangement: &Arrangement,
    media: &G,
    kind: TrackKind,
    now: TimeUs,
    state: SlotState,
) {
    if state == SlotState::Loading {
        return;
    }
    let Some(next) = select::next_clip_after(arrangement, kind, now) else {
        return;
    };
    if next.clip.start_us - now > PRELOAD_LOOKAHEAD_US {
        return;
    }
    let Some(source) = media.resolve(next.clip.source_id) else {
        return;
    };
    if pair.active().loaded_source() == Some(&source)
        || pair.spare().loaded_source() == Some(&source)
    {
        return;
    }
    tracing::debug!(?kind, source_id = %next.clip.source_id, "preloading next clip");
    pair.spare_mut().load(source, next.clip.trim_start_us);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
