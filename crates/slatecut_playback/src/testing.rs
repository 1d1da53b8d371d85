//! In-memory fakes shared by the synchronizer, compositor and engine tests.

use crate::slot::{DecodeSlot, Frame, MediaGateway, MediaSource, Readiness};
use slatecut_core::TimeUs;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// FakeSlot
// ---------------------------------------------------------------------------

/// Scriptable decode slot. With `auto_ready` (the default) every load
/// completes by the next readiness poll; `manual()` slots stay `Loading`
/// until the test calls `finish_load`.
pub struct FakeSlot {
    pub loaded: Option<MediaSource>,
    pub position: TimeUs,
    pub playing: bool,
    pub volume: f64,
    pub frame: Option<Frame>,
    pub loads: Vec<(MediaSource, TimeUs)>,
    pub seeks: Vec<TimeUs>,
    auto_ready: bool,
    ready: bool,
}

impl FakeSlot {
    pub fn new() -> Self {
        Self {
            loaded: None,
            position: TimeUs::ZERO,
            playing: false,
            volume: 1.0,
            frame: None,
            loads: Vec::new(),
            seeks: Vec::new(),
            auto_ready: true,
            ready: false,
        }
    }

    pub fn manual() -> Self {
        Self {
            auto_ready: false,
            ..Self::new()
        }
    }

    pub fn finish_load(&mut self) {
        self.ready = self.loaded.is_some();
    }

    pub fn with_frame(mut self, pts_us: TimeUs) -> Self {
        self.frame = Some(test_frame(pts_us));
        self
    }
}

impl Default for FakeSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeSlot for FakeSlot {
    fn load(&mut self, source: MediaSource, offset_us: TimeUs) {
        self.loads.push((source.clone(), offset_us));
        self.loaded = Some(source);
        self.position = offset_us;
        self.ready = self.auto_ready;
    }

    fn seek(&mut self, offset_us: TimeUs) {
        self.seeks.push(offset_us);
        self.position = offset_us;
    }

    fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn readiness(&self) -> Readiness {
        match (&self.loaded, self.ready) {
            (None, _) => Readiness::Empty,
            (Some(_), false) => Readiness::Loading,
            (Some(_), true) => Readiness::Ready,
        }
    }

    fn position_us(&self) -> Option<TimeUs> {
        self.loaded.as_ref().map(|_| self.position)
    }

    fn loaded_source(&self) -> Option<&MediaSource> {
        self.loaded.as_ref()
    }

    fn current_frame(&self) -> Option<Frame> {
        self.frame.clone()
    }
}

pub fn test_frame(pts_us: TimeUs) -> Frame {
    Frame {
        data: Arc::from(vec![0u8; 16].into_boxed_slice()),
        width: 4,
        height: 1,
        pts_us,
    }
}

// ---------------------------------------------------------------------------
// StaticGateway
// ---------------------------------------------------------------------------

/// Gateway backed by a fixed map; unknown ids resolve to `None`.
#[derive(Default)]
pub struct StaticGateway {
    sources: HashMap<Uuid, MediaSource>,
}

impl StaticGateway {
    pub fn with(entries: impl IntoIterator<Item = (Uuid, MediaSource)>) -> Self {
        Self {
            sources: entries.into_iter().collect(),
        }
    }
}

impl MediaGateway for StaticGateway {
    fn resolve(&self, source_id: Uuid) -> Option<MediaSource> {
        self.sources.get(&source_id).cloned()
    }
}

pub fn url_source(name: &str) -> MediaSource {
    MediaSource::Url(format!("http://127.0.0.1:7878/media/{name}"))
}
