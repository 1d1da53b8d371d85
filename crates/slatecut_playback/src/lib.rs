//! Tick-driven preview playback for slatecut arrangements: a virtual clock,
//! double-buffered decode slots per modality, and a readiness-gated frame
//! compositor. Decoders and media resolution sit behind traits so the whole
//! pipeline runs against fakes in tests and against mpv in the preview.

pub mod clock;
pub mod compositor;
pub mod engine;
pub mod error;
pub mod mpv;
pub mod select;
pub mod slot;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::PlaybackClock;
pub use compositor::{FrameCompositor, PresentationSurface};
pub use engine::{PlaybackEngine, TICK_INTERVAL};
pub use error::{PlaybackError, Result};
pub use mpv::MpvSlot;
pub use select::{next_clip_after, winning_audio, winning_video, ActiveClip, AudioSelection};
pub use slot::{DecodeSlot, Frame, MediaGateway, MediaSource, Readiness};
pub use sync::{
    SlotPair, SlotState, Synchronizer, DRIFT_TOLERANCE_PAUSED_US, DRIFT_TOLERANCE_PLAYING_US,
    PRELOAD_LOOKAHEAD_US,
};
