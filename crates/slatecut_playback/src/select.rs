use slatecut_core::{Arrangement, Clip, TimeUs, TrackKind};

// ---------------------------------------------------------------------------
// ActiveClip
// ---------------------------------------------------------------------------

/// The clip a modality should be playing right now, with the track it came
/// from. Owned copy so the caller can keep it across arrangement edits.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveClip {
    pub clip: Clip,
    pub track_index: usize,
}

/// What feeds the audio slot at a given time.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSelection {
    /// A clip on a dedicated audio track. Wins even when muted: a muted
    /// audio clip occupies the slot (at zero volume) rather than letting the
    /// video clip's embedded audio through.
    Track(ActiveClip),
    /// Embedded audio of the winning video clip, used only when no audio
    /// track has a clip under the playhead.
    Embedded(ActiveClip),
}

// ---------------------------------------------------------------------------
// Winner queries
// ---------------------------------------------------------------------------

fn winning_of_kind(arrangement: &Arrangement, kind: TrackKind, t: TimeUs) -> Option<ActiveClip> {
    let mut best: Option<(i64, ActiveClip)> = None;
    for (index, (track, settings)) in arrangement
        .tracks
        .iter()
        .zip(&arrangement.settings)
        .enumerate()
    {
        if settings.kind != kind || !settings.visible {
            continue;
        }
        let Some(clip) = track.clips.iter().find(|c| c.contains(t)) else {
            continue;
        };
        let priority = settings.priority(index);
        // Strict comparison: on equal priority the earlier track keeps the win.
        if best.as_ref().is_none_or(|(p, _)| priority < *p) {
            best = Some((
                priority,
                ActiveClip {
                    clip: clip.clone(),
                    track_index: index,
                },
            ));
        }
    }
    best.map(|(_, active)| active)
}

/// The video clip to show at `t`: lowest-ordinal visible video track with a
/// clip under the playhead. `None` means a gap.
pub fn winning_video(arrangement: &Arrangement, t: TimeUs) -> Option<ActiveClip> {
    winning_of_kind(arrangement, TrackKind::Video, t)
}

/// The audio to play at `t`. Dedicated audio tracks always override the
/// winning video clip's embedded audio; the embedded fallback only applies
/// when the video clip is not muted.
pub fn winning_audio(arrangement: &Arrangement, t: TimeUs) -> Option<AudioSelection> {
    if let Some(active) = winning_of_kind(arrangement, TrackKind::Audio, t) {
        return Some(AudioSelection::Track(active));
    }
    winning_video(arrangement, t)
        .filter(|active| !active.clip.muted)
        .map(AudioSelection::Embedded)
}

/// Earliest clip of `kind` starting strictly after `t`, for lookahead
/// preloading. Visibility rules match the winner queries.
pub fn next_clip_after(arrangement: &Arrangement, kind: TrackKind, t: TimeUs) -> Option<ActiveClip> {
    let mut best: Option<ActiveClip> = None;
    for (index, (track, settings)) in arrangement
        .tracks
        .iter()
        .zip(&arrangement.settings)
        .enumerate()
    {
        if settings.kind != kind || !settings.visible {
            continue;
        }
        for clip in &track.clips {
            if clip.start_us <= t {
                continue;
            }
            if best
                .as_ref()
                .is_none_or(|b| clip.start_us < b.clip.start_us)
            {
                best = Some(ActiveClip {
                    clip: clip.clone(),
                    track_index: index,
                });
            }
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
