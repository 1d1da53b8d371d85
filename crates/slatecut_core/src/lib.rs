//! Editing core of the slatecut timeline: the in-memory arrangement, the
//! overwrite-style edit operations, snapshot undo/redo, and the storage port.

pub mod editing;
pub mod error;
pub mod gateway;
pub mod history;
pub mod model;
pub mod session;
pub mod snapping;
pub mod types;

pub use editing::{resolve_overwrite, ClipEdge, MIN_CLIP_DURATION_US, SPLIT_EPSILON_US};
pub use error::{CoreError, Result};
pub use gateway::{JsonStore, StorageGateway};
pub use history::{History, Snapshot, DEFAULT_HISTORY_DEPTH};
pub use session::{DropTime, EditSession, PlaceSpec};
pub use snapping::{resolve_drop_time, threshold_us_from_pixels, SnapOptions};
pub use types::{Arrangement, Clip, TimeUs, Track, TrackKind, TrackSettings};
