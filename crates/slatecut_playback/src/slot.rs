use slatecut_core::TimeUs;
use std::sync::Arc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// MediaSource
// ---------------------------------------------------------------------------

/// A playable input for a decode slot. A gateway URL (local path served as an
/// HTTP byte stream) and a pre-fetched in-memory buffer are interchangeable;
/// the synchronizer never cares which one it got.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    Url(String),
    Buffer { label: String, bytes: Arc<[u8]> },
}

// ---------------------------------------------------------------------------
// Readiness / Frame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// No source assigned.
    Empty,
    /// Source assigned, not yet presentable at the requested offset.
    Loading,
    /// Enough is buffered to present or play.
    Ready,
}

/// One decoded video frame handed to the presentation surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub pts_us: TimeUs,
}

// ---------------------------------------------------------------------------
// DecodeSlot
// ---------------------------------------------------------------------------

/// One of the two interchangeable decoders per modality.
///
/// Implementations are event-driven underneath: `load` and `seek` only kick
/// work off, and completion is observed through `readiness`/`position_us` on
/// a later tick. Loading over an in-flight load supersedes it, so a stale
/// completion can never surface. Methods must not panic or block the tick
/// loop; failures are logged by the implementation and show up as a slot
/// that simply never becomes `Ready` (the synchronizer renders a gap).
pub trait DecodeSlot {
    fn load(&mut self, source: MediaSource, offset_us: TimeUs);
    fn seek(&mut self, offset_us: TimeUs);
    fn set_playing(&mut self, playing: bool);
    fn set_volume(&mut self, volume: f64);
    fn readiness(&self) -> Readiness;
    fn position_us(&self) -> Option<TimeUs>;
    fn loaded_source(&self) -> Option<&MediaSource>;
    fn current_frame(&self) -> Option<Frame>;
}

// ---------------------------------------------------------------------------
// MediaGateway
// ---------------------------------------------------------------------------

/// Port to whatever serves media bytes. `None` means the source is missing or
/// unreachable; the synchronizer treats that interval as a gap rather than
/// failing the session.
pub trait MediaGateway {
    fn resolve(&self, source_id: Uuid) -> Option<MediaSource>;
}
