use crate::editing::ClipEdge;
use crate::error::{CoreError, Result};
use crate::gateway::StorageGateway;
use crate::history::{History, Snapshot};
use crate::snapping::{resolve_drop_time, SnapOptions};
use crate::types::*;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Where a drag ended up. `raw_start_us` is pointer position divided by the
/// zoom factor; `snap` is `None` when the disable-snapping modifier is held.
#[derive(Debug, Clone, Copy)]
pub struct DropTime {
    pub raw_start_us: TimeUs,
    pub snap: Option<SnapOptions>,
}

impl DropTime {
    pub fn unsnapped(raw_start_us: TimeUs) -> Self {
        Self {
            raw_start_us,
            snap: None,
        }
    }
}

/// What a library drop places: a source reference and how much of it.
#[derive(Debug, Clone, Copy)]
pub struct PlaceSpec {
    pub source_id: Uuid,
    pub duration_us: TimeUs,
    pub max_duration_us: TimeUs,
}

// ---------------------------------------------------------------------------
// EditSession
// ---------------------------------------------------------------------------

/// The editing surface of one open scene: owns the live arrangement and its
/// history, and persists every settled mutation through the injected storage
/// gateway. One discrete user action is one history entry; rejected edits
/// (boundary splits, missing clips on split) record and save nothing.
pub struct EditSession<S: StorageGateway> {
    arrangement: Arrangement,
    history: History,
    store: S,
    project_id: Uuid,
    scene_id: Uuid,
}

impl<S: StorageGateway> EditSession<S> {
    /// Open a scene, loading its arrangement or starting empty.
    pub fn open(store: S, project_id: Uuid, scene_id: Uuid) -> Result<Self> {
        let arrangement = store
            .load_arrangement(project_id, scene_id)?
            .unwrap_or_default();
        Ok(Self {
            arrangement,
            history: History::default(),
            store,
            project_id,
            scene_id,
        })
    }

    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn settle(&self) -> Result<()> {
        self.store
            .save_arrangement(self.project_id, self.scene_id, &self.arrangement)?;
        tracing::debug!(project = %self.project_id, scene = %self.scene_id, "arrangement saved");
        Ok(())
    }

    fn commit(&mut self, snapshot: Snapshot) -> Result<()> {
        self.history.record(snapshot);
        self.settle()
    }

    // -----------------------------------------------------------------------
    // Edit-surface operations
    // -----------------------------------------------------------------------

    /// Drop a clip from the library onto a track.
    pub fn place(
        &mut self,
        track_index: usize,
        spec: PlaceSpec,
        drop: DropTime,
    ) -> Result<&Arrangement> {
        let start = resolve_drop_time(
            drop.raw_start_us,
            spec.duration_us,
            &self.arrangement,
            None,
            drop.snap,
        );
        let clip = Clip::new(
            spec.source_id,
            track_index,
            start,
            spec.duration_us,
            spec.max_duration_us,
        );

        let snapshot = Snapshot::capture(&self.arrangement);
        self.arrangement.place_clip(track_index, clip)?;
        self.commit(snapshot)?;
        Ok(&self.arrangement)
    }

    /// Place a generated clip together with its embedded-audio counterpart on
    /// a paired audio track. Both halves share a fresh pair id and move and
    /// delete together from then on.
    pub fn place_pair(
        &mut self,
        video_track_index: usize,
        audio_track_index: usize,
        spec: PlaceSpec,
        drop: DropTime,
    ) -> Result<&Arrangement> {
        if self.arrangement.track_settings(video_track_index)?.kind != TrackKind::Video {
            return Err(CoreError::InvalidOperation(format!(
                "track {video_track_index} is not a video track"
            )));
        }
        if self.arrangement.track_settings(audio_track_index)?.kind != TrackKind::Audio {
            return Err(CoreError::InvalidOperation(format!(
                "track {audio_track_index} is not an audio track"
            )));
        }
        // Both locks are checked before the first placement; half a pair must
        // never land.
        if self.arrangement.track_settings(video_track_index)?.locked {
            return Err(CoreError::TrackLocked(video_track_index));
        }
        if self.arrangement.track_settings(audio_track_index)?.locked {
            return Err(CoreError::TrackLocked(audio_track_index));
        }

        let start = resolve_drop_time(
            drop.raw_start_us,
            spec.duration_us,
            &self.arrangement,
            None,
            drop.snap,
        );
        let pair_id = Uuid::new_v4();

        let mut video = Clip::new(
            spec.source_id,
            video_track_index,
            start,
            spec.duration_us,
            spec.max_duration_us,
        );
        video.pair_id = Some(pair_id);

        let mut audio = Clip::new(
            spec.source_id,
            audio_track_index,
            start,
            spec.duration_us,
            spec.max_duration_us,
        );
        audio.pair_id = Some(pair_id);

        let snapshot = Snapshot::capture(&self.arrangement);
        self.arrangement.place_clip(video_track_index, video)?;
        self.arrangement.place_clip(audio_track_index, audio)?;
        self.commit(snapshot)?;
        Ok(&self.arrangement)
    }

    /// Move a clip to a new position and possibly a new track. A paired
    /// sibling follows horizontally on its own track.
    pub fn move_clip(
        &mut self,
        clip_id: Uuid,
        new_track_index: usize,
        drop: DropTime,
    ) -> Result<&Arrangement> {
        let clip = self
            .arrangement
            .find_clip(clip_id)
            .cloned()
            .ok_or(CoreError::ClipNotFound(clip_id))?;

        let start = resolve_drop_time(
            drop.raw_start_us,
            clip.duration_us,
            &self.arrangement,
            Some(clip_id),
            drop.snap,
        );

        let snapshot = Snapshot::capture(&self.arrangement);
        self.arrangement
            .move_clip(clip_id, new_track_index, start)?;

        if let Some(pair_id) = clip.pair_id {
            let sibling = self
                .arrangement
                .find_clip_by_pair(pair_id, clip_id)
                .cloned();
            if let Some(sibling) = sibling {
                if let Err(e) = self
                    .arrangement
                    .move_clip(sibling.id, sibling.track_index, start)
                {
                    tracing::warn!(clip = %sibling.id, error = %e, "paired clip did not follow");
                }
            }
        }

        self.commit(snapshot)?;
        Ok(&self.arrangement)
    }

    /// Drag a clip edge.
    pub fn resize(
        &mut self,
        clip_id: Uuid,
        edge: ClipEdge,
        new_time_us: TimeUs,
    ) -> Result<&Arrangement> {
        let snapshot = Snapshot::capture(&self.arrangement);
        self.arrangement.resize_clip(clip_id, edge, new_time_us)?;
        self.commit(snapshot)?;
        Ok(&self.arrangement)
    }

    /// Split a clip at the given time. A split rejected by the epsilon guard
    /// is silently discarded: no history entry, no save.
    pub fn split(&mut self, clip_id: Uuid, split_time_us: TimeUs) -> Result<&Arrangement> {
        let snapshot = Snapshot::capture(&self.arrangement);
        match self.arrangement.split_clip(clip_id, split_time_us) {
            Some(_) => self.commit(snapshot)?,
            None => tracing::debug!(clip = %clip_id, at = %split_time_us, "split discarded"),
        }
        Ok(&self.arrangement)
    }

    /// Remove a clip (and its paired sibling).
    pub fn remove(&mut self, clip_id: Uuid) -> Result<&Arrangement> {
        let snapshot = Snapshot::capture(&self.arrangement);
        self.arrangement.remove_clip(clip_id)?;
        self.commit(snapshot)?;
        Ok(&self.arrangement)
    }

    /// Undo the last action. A no-op (empty stack) saves nothing.
    pub fn undo(&mut self) -> Result<&Arrangement> {
        if self.history.undo(&mut self.arrangement) {
            self.settle()?;
        }
        Ok(&self.arrangement)
    }

    pub fn redo(&mut self) -> Result<&Arrangement> {
        if self.history.redo(&mut self.arrangement) {
            self.settle()?;
        }
        Ok(&self.arrangement)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
