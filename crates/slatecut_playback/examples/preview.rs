//! Plays a stored scene through mpv-backed decode slots.
//!
//! Usage: preview <project-root> <project-id> <scene-id> [media-dir]
//!
//! Media files are resolved as `<media-dir>/<source-id>` with any extension.

use anyhow::{bail, Context};
use slatecut_core::{JsonStore, StorageGateway, TimeUs};
use slatecut_playback::{
    Frame, MediaGateway, MediaSource, MpvSlot, PlaybackEngine, PresentationSurface, SlotPair,
};
use std::path::PathBuf;
use uuid::Uuid;

/// Looks up media by source id in a flat directory.
struct DirGateway {
    media_dir: PathBuf,
}

impl MediaGateway for DirGateway {
    fn resolve(&self, source_id: Uuid) -> Option<MediaSource> {
        let prefix = source_id.to_string();
        let entries = std::fs::read_dir(&self.media_dir).ok()?;
        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(&prefix) {
                return Some(MediaSource::Url(entry.path().display().to_string()));
            }
        }
        None
    }
}

/// Video lives in the mpv window; this surface only narrates gaps.
struct LogSurface {
    in_gap: bool,
}

impl PresentationSurface for LogSurface {
    fn present(&mut self, _frame: Frame) {
        self.in_gap = false;
    }

    fn present_gap(&mut self) {
        if !self.in_gap {
            tracing::info!("gap");
        }
        self.in_gap = true;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,slatecut_playback=debug".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(root), Some(project_id), Some(scene_id)) = (args.next(), args.next(), args.next())
    else {
        bail!("usage: preview <project-root> <project-id> <scene-id> [media-dir]");
    };
    let media_dir = PathBuf::from(args.next().unwrap_or_else(|| "media".into()));
    let project_id: Uuid = project_id.parse().context("project-id must be a UUID")?;
    let scene_id: Uuid = scene_id.parse().context("scene-id must be a UUID")?;

    let store = JsonStore::new(root);
    let arrangement = store
        .load_arrangement(project_id, scene_id)?
        .context("scene not found")?;
    let total = arrangement.total_duration_us();
    tracing::info!(%total, "scene loaded");

    let video = SlotPair::new(MpvSlot::video("video-a")?, MpvSlot::video("video-b")?);
    let audio = SlotPair::new(MpvSlot::audio("audio-a")?, MpvSlot::audio("audio-b")?);
    let mut engine = PlaybackEngine::new(
        video,
        audio,
        LogSurface { in_gap: true },
        DirGateway { media_dir },
    );

    engine.seek(&arrangement, TimeUs::ZERO);
    engine.play();
    engine.run_while_playing(&arrangement).await;
    tracing::info!(position = %engine.clock.position(), "playback finished");
    Ok(())
}
