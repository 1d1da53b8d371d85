use crate::error::{CoreError, Result};
use crate::types::*;
use std::sync::Arc;
use uuid::Uuid;

impl Arrangement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an arrangement with one empty track per settings entry.
    pub fn from_settings(settings: Vec<TrackSettings>) -> Self {
        let tracks = settings.iter().map(|_| Arc::new(Track::default())).collect();
        Self { tracks, settings }
    }

    /// End of the last clip across all tracks, or zero for an empty arrangement.
    pub fn total_duration_us(&self) -> TimeUs {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .map(|c| c.end_us())
            .fold(TimeUs::ZERO, TimeUs::max)
    }

    pub fn track(&self, index: usize) -> Result<&Track> {
        self.tracks
            .get(index)
            .map(Arc::as_ref)
            .ok_or(CoreError::TrackNotFound(index))
    }

    pub fn track_settings(&self, index: usize) -> Result<&TrackSettings> {
        self.settings
            .get(index)
            .ok_or(CoreError::TrackNotFound(index))
    }

    /// Copy-on-write access to a track's clip list.
    pub(crate) fn track_mut(&mut self, index: usize) -> Result<&mut Track> {
        self.tracks
            .get_mut(index)
            .map(Arc::make_mut)
            .ok_or(CoreError::TrackNotFound(index))
    }

    /// Replace a track's clip list wholesale. No invariant checks here; the
    /// overwrite resolver in `editing` owns those.
    pub fn set_track(&mut self, index: usize, clips: Vec<Clip>) -> Result<()> {
        self.track_mut(index)?.clips = clips;
        Ok(())
    }

    pub fn add_track(&mut self, settings: TrackSettings) -> usize {
        self.tracks.push(Arc::new(Track::default()));
        self.settings.push(settings);
        self.tracks.len() - 1
    }

    /// Remove a track and everything on it.
    pub fn remove_track(&mut self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(CoreError::TrackNotFound(index));
        }
        self.tracks.remove(index);
        self.settings.remove(index);
        // Clips on later tracks shift down one lane.
        for (i, track) in self.tracks.iter_mut().enumerate().skip(index) {
            let track = Arc::make_mut(track);
            for clip in &mut track.clips {
                clip.track_index = i;
            }
        }
        Ok(())
    }

    pub fn rename_track(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.settings
            .get_mut(index)
            .ok_or(CoreError::TrackNotFound(index))?
            .name = name.into();
        Ok(())
    }

    /// UI-only; playback and editing never read the height.
    pub fn resize_track_height(&mut self, index: usize, height_px: u32) -> Result<()> {
        self.settings
            .get_mut(index)
            .ok_or(CoreError::TrackNotFound(index))?
            .height_px = height_px;
        Ok(())
    }

    pub fn toggle_lock(&mut self, index: usize) -> Result<bool> {
        let s = self
            .settings
            .get_mut(index)
            .ok_or(CoreError::TrackNotFound(index))?;
        s.locked = !s.locked;
        Ok(s.locked)
    }

    pub fn toggle_visibility(&mut self, index: usize) -> Result<bool> {
        let s = self
            .settings
            .get_mut(index)
            .ok_or(CoreError::TrackNotFound(index))?;
        s.visible = !s.visible;
        Ok(s.visible)
    }

    pub fn find_clip(&self, id: Uuid) -> Option<&Clip> {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .find(|c| c.id == id)
    }

    pub fn find_clip_by_pair(&self, pair_id: Uuid, not: Uuid) -> Option<&Clip> {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .find(|c| c.pair_id == Some(pair_id) && c.id != not)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn two_track_arrangement() -> Arrangement {
        Arrangement::from_settings(vec![
            TrackSettings::new("Video 1", TrackKind::Video),
            TrackSettings::new("Audio 1", TrackKind::Audio),
        ])
    }

    fn clip_at(track_index: usize, start_s: f64, dur_s: f64) -> Clip {
        Clip::new(
            Uuid::new_v4(),
            track_index,
            TimeUs::from_seconds(start_s),
            TimeUs::from_seconds(dur_s),
            TimeUs::from_seconds(dur_s),
        )
    }

    #[test]
    fn empty_arrangement_has_zero_duration() {
        let arr = Arrangement::new();
        assert_eq!(arr.total_duration_us(), TimeUs::ZERO);
    }

    #[test]
    fn total_duration_is_max_clip_end() {
        let mut arr = two_track_arrangement();
        arr.set_track(0, vec![clip_at(0, 0.0, 4.0)]).unwrap();
        arr.set_track(1, vec![clip_at(1, 3.0, 5.0)]).unwrap();
        assert_eq!(arr.total_duration_us(), TimeUs::from_seconds(8.0));
    }

    #[test]
    fn add_and_remove_track() {
        let mut arr = two_track_arrangement();
        let idx = arr.add_track(TrackSettings::new("Video 2", TrackKind::Video));
        assert_eq!(idx, 2);
        assert_eq!(arr.tracks.len(), arr.settings.len());

        arr.remove_track(0).unwrap();
        assert_eq!(arr.tracks.len(), 2);
        assert_eq!(arr.settings[0].name, "Audio 1");
    }

    #[test]
    fn remove_track_reindexes_clips() {
        let mut arr = two_track_arrangement();
        arr.add_track(TrackSettings::new("Video 2", TrackKind::Video));
        arr.set_track(2, vec![clip_at(2, 0.0, 1.0)]).unwrap();

        arr.remove_track(0).unwrap();
        assert_eq!(arr.tracks[1].clips[0].track_index, 1);
    }

    #[test]
    fn remove_track_out_of_bounds_fails() {
        let mut arr = two_track_arrangement();
        assert!(matches!(
            arr.remove_track(5),
            Err(CoreError::TrackNotFound(5))
        ));
    }

    #[test]
    fn rename_and_resize_and_toggles() {
        let mut arr = two_track_arrangement();
        arr.rename_track(0, "Main").unwrap();
        assert_eq!(arr.settings[0].name, "Main");

        arr.resize_track_height(0, 96).unwrap();
        assert_eq!(arr.settings[0].height_px, 96);

        assert!(arr.toggle_lock(0).unwrap());
        assert!(!arr.toggle_lock(0).unwrap());

        assert!(!arr.toggle_visibility(1).unwrap());
        assert!(arr.toggle_visibility(1).unwrap());
    }

    #[test]
    fn find_clip_and_pair_sibling() {
        let mut arr = two_track_arrangement();
        let pair = Uuid::new_v4();
        let mut video = clip_at(0, 0.0, 2.0);
        video.pair_id = Some(pair);
        let mut audio = clip_at(1, 0.0, 2.0);
        audio.pair_id = Some(pair);

        let video_id = video.id;
        let audio_id = audio.id;
        arr.set_track(0, vec![video]).unwrap();
        arr.set_track(1, vec![audio]).unwrap();

        assert_eq!(arr.find_clip(video_id).unwrap().id, video_id);
        assert_eq!(
            arr.find_clip_by_pair(pair, video_id).unwrap().id,
            audio_id
        );
        assert!(arr.find_clip(Uuid::new_v4()).is_none());
    }

    #[test]
    fn set_track_out_of_bounds_fails() {
        let mut arr = Arrangement::new();
        assert!(arr.set_track(0, vec![]).is_err());
    }
}
