use crate::error::{CoreError, Result};
use crate::types::*;
use uuid::Uuid;

/// Splits closer than this to a clip boundary are discarded.
pub const SPLIT_EPSILON_US: TimeUs = TimeUs(50_000);

/// Shortest clip an edge trim may leave behind.
pub const MIN_CLIP_DURATION_US: TimeUs = TimeUs(1_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipEdge {
    Start,
    End,
}

// ---------------------------------------------------------------------------
// Overwrite resolver
// ---------------------------------------------------------------------------

/// Resolve a placement against a track's existing clips.
///
/// The incoming clip always wins; whatever it overlaps is dropped, truncated,
/// or split into two remnants. One linear pass, no failure mode, and the
/// returned list never contains two overlapping intervals as long as the
/// input list didn't. The incoming clip is appended last.
pub fn resolve_overwrite(existing: &[Clip], incoming: &Clip) -> Vec<Clip> {
    let s = incoming.start_us;
    let e = incoming.end_us();

    let mut out = Vec::with_capacity(existing.len() + 1);
    for c in existing {
        if c.id == incoming.id {
            continue;
        }
        let cs = c.start_us;
        let ce = c.end_us();

        if s >= ce || e <= cs {
            // Disjoint.
            out.push(c.clone());
        } else if s <= cs && e >= ce {
            // Fully covered: drop.
        } else if s > cs && e < ce {
            // Incoming sits strictly inside: left and right remnants.
            let mut left = c.clone();
            left.duration_us = s - cs;

            let mut right = c.clone();
            right.id = Uuid::new_v4();
            right.start_us = e;
            right.duration_us = ce - e;
            right.trim_start_us = c.trim_start_us + (e - cs);

            out.push(left);
            out.push(right);
        } else if s > cs {
            // Tail overlap: truncate to [cs, s).
            let mut left = c.clone();
            left.duration_us = s - cs;
            out.push(left);
        } else {
            // Head overlap: shift to [e, ce).
            let mut right = c.clone();
            right.start_us = e;
            right.duration_us = ce - e;
            right.trim_start_us = c.trim_start_us + (e - cs);
            out.push(right);
        }
    }
    out.push(incoming.clone());
    out
}

// ---------------------------------------------------------------------------
// Edit operations
// ---------------------------------------------------------------------------

impl Arrangement {
    /// Place a clip on a track, overwriting whatever it overlaps.
    pub fn place_clip(&mut self, track_index: usize, mut clip: Clip) -> Result<()> {
        if self.track_settings(track_index)?.locked {
            return Err(CoreError::TrackLocked(track_index));
        }
        clip.track_index = track_index;
        clip.start_us = clip.start_us.max(TimeUs::ZERO);

        let resolved = resolve_overwrite(&self.track(track_index)?.clips, &clip);
        self.set_track(track_index, resolved)
    }

    /// Move a clip, possibly across tracks. Reuses the overwrite resolver at
    /// the destination; the clip is excluded from its own conflict scan.
    pub fn move_clip(
        &mut self,
        clip_id: Uuid,
        new_track_index: usize,
        new_start_us: TimeUs,
    ) -> Result<()> {
        let mut clip = self
            .find_clip(clip_id)
            .cloned()
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let old_track = clip.track_index;

        if self.track_settings(old_track)?.locked {
            return Err(CoreError::TrackLocked(old_track));
        }
        if self.track_settings(new_track_index)?.locked {
            return Err(CoreError::TrackLocked(new_track_index));
        }

        self.track_mut(old_track)?.clips.retain(|c| c.id != clip_id);

        clip.track_index = new_track_index;
        clip.start_us = new_start_us.max(TimeUs::ZERO);

        let resolved = resolve_overwrite(&self.track(new_track_index)?.clips, &clip);
        self.set_track(new_track_index, resolved)
    }

    /// Drag a clip edge. The start edge trims into the source (the content
    /// under the rest of the clip does not move); the end edge only changes
    /// the visible duration. Both are clamped to the source bounds, then the
    /// result is overwrite-resolved against the rest of the track.
    pub fn resize_clip(&mut self, clip_id: Uuid, edge: ClipEdge, new_time_us: TimeUs) -> Result<()> {
        let mut clip = self
            .find_clip(clip_id)
            .cloned()
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let track_index = clip.track_index;

        if self.track_settings(track_index)?.locked {
            return Err(CoreError::TrackLocked(track_index));
        }

        match edge {
            ClipEdge::Start => {
                let lo = (clip.start_us - clip.trim_start_us).max(TimeUs::ZERO);
                let hi = clip.end_us() - MIN_CLIP_DURATION_US;
                let new_start = new_time_us.clamp(lo, hi);
                let delta = new_start - clip.start_us;
                clip.trim_start_us = clip.trim_start_us + delta;
                clip.duration_us = clip.duration_us - delta;
                clip.start_us = new_start;
            }
            ClipEdge::End => {
                let lo = clip.start_us + MIN_CLIP_DURATION_US;
                let hi = clip.start_us + (clip.max_duration_us - clip.trim_start_us);
                let new_end = new_time_us.clamp(lo, hi);
                clip.duration_us = new_end - clip.start_us;
            }
        }

        let resolved = resolve_overwrite(&self.track(track_index)?.clips, &clip);
        self.set_track(track_index, resolved)
    }

    /// Split a clip at a timeline position. Returns the right half's fresh id,
    /// or `None` (and no change) when the position is within epsilon of either
    /// boundary, the clip is missing, or its track is locked.
    pub fn split_clip(&mut self, clip_id: Uuid, split_time_us: TimeUs) -> Option<Uuid> {
        let clip = self.find_clip(clip_id)?.clone();
        let track_index = clip.track_index;
        if self.settings.get(track_index)?.locked {
            return None;
        }
        if split_time_us - clip.start_us < SPLIT_EPSILON_US
            || clip.end_us() - split_time_us < SPLIT_EPSILON_US
        {
            return None;
        }

        let offset = split_time_us - clip.start_us;

        let mut right = clip.clone();
        right.id = Uuid::new_v4();
        right.start_us = split_time_us;
        right.duration_us = clip.duration_us - offset;
        right.trim_start_us = clip.trim_start_us + offset;
        let right_id = right.id;

        let track = self.track_mut(track_index).ok()?;
        let pos = track.clips.iter().position(|c| c.id == clip_id)?;
        track.clips[pos].duration_us = offset;
        track.clips.insert(pos + 1, right);

        Some(right_id)
    }

    /// Remove a clip and its paired sibling, if any. Returns what was removed.
    /// A sibling sitting on a locked track is left in place.
    pub fn remove_clip(&mut self, clip_id: Uuid) -> Result<Vec<Clip>> {
        let clip = self
            .find_clip(clip_id)
            .cloned()
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        if self.track_settings(clip.track_index)?.locked {
            return Err(CoreError::TrackLocked(clip.track_index));
        }

        let mut doomed = vec![clip.clone()];
        if let Some(pair_id) = clip.pair_id {
            if let Some(sibling) = self.find_clip_by_pair(pair_id, clip_id) {
                if self.track_settings(sibling.track_index)?.locked {
                    tracing::debug!(
                        clip = %sibling.id,
                        track = sibling.track_index,
                        "paired clip stays on locked track"
                    );
                } else {
                    doomed.push(sibling.clone());
                }
            }
        }

        for victim in &doomed {
            self.track_mut(victim.track_index)?
                .clips
                .retain(|c| c.id != victim.id);
        }
        Ok(doomed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
