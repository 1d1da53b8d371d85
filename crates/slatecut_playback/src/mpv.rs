use crate::error::{PlaybackError, Result};
use crate::slot::{DecodeSlot, Frame, MediaSource, Readiness};
use serde_json::json;
use slatecut_core::TimeUs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Property polls happen on every tick; a wedged mpv must not stall the
/// scheduling loop, so IPC waits are kept well under a tick period's order
/// of magnitude.
const IPC_TIMEOUT: Duration = Duration::from_millis(50);

/// Decode slot backed by an mpv process driven over its JSON IPC socket.
///
/// Video slots present into mpv's own window, so `current_frame` has nothing
/// to hand back and the compositor falls through to its gap path; audio
/// slots run with video disabled entirely. IPC failures after spawn are
/// logged and leave the slot looking `Loading`, which the synchronizer
/// already renders as a gap.
pub struct MpvSlot {
    label: String,
    process: Option<Child>,
    socket_path: PathBuf,
    loaded: Option<MediaSource>,
    spill_path: Option<PathBuf>,
    load_count: u64,
}

impl MpvSlot {
    pub fn video(label: &str) -> Result<Self> {
        Self::spawn(label, true)
    }

    pub fn audio(label: &str) -> Result<Self> {
        Self::spawn(label, false)
    }

    fn spawn(label: &str, video: bool) -> Result<Self> {
        let socket_path =
            std::env::temp_dir().join(format!("slatecut-mpv-{}-{}", std::process::id(), label));
        let _ = std::fs::remove_file(&socket_path);

        let mut args = vec![
            "--idle=yes".to_string(),
            "--keep-open=yes".to_string(),
            "--pause".to_string(),
            "--osc=no".to_string(),
            "--osd-level=0".to_string(),
            format!("--title=slatecut-{label}"),
            format!("--input-ipc-server={}", socket_path.display()),
        ];
        if !video {
            args.push("--no-video".to_string());
        }

        let child = Command::new("mpv")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlaybackError::Slot(format!("failed to start mpv ({label}): {e}")))?;

        let slot = Self {
            label: label.to_string(),
            process: Some(child),
            socket_path,
            loaded: None,
            spill_path: None,
            load_count: 0,
        };

        // Wait for the IPC socket to appear.
        for _ in 0..50 {
            if slot.socket_path.exists() {
                tracing::debug!(label, "mpv slot ready");
                return Ok(slot);
            }
            std::thread::sleep(std::time::Duration::from_millis(100));
        }
        Err(PlaybackError::Slot(format!(
            "mpv socket did not appear ({label})"
        )))
    }

    fn send_command(&self, command: serde_json::Value) -> Result<serde_json::Value> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .map_err(|e| PlaybackError::Slot(format!("connect to mpv failed: {e}")))?;
        stream.set_read_timeout(Some(IPC_TIMEOUT)).ok();
        stream.set_write_timeout(Some(IPC_TIMEOUT)).ok();

        let msg = format!("{}\n", command);
        stream
            .write_all(msg.as_bytes())
            .map_err(|e| PlaybackError::Slot(format!("write to mpv failed: {e}")))?;

        let mut reader = BufReader::new(stream);
        let mut response = String::new();
        reader
            .read_line(&mut response)
            .map_err(|e| PlaybackError::Slot(format!("read from mpv failed: {e}")))?;

        Ok(serde_json::from_str(&response)?)
    }

    fn time_pos(&self) -> Option<f64> {
        let resp = self
            .send_command(json!({ "command": ["get_property", "time-pos"] }))
            .ok()?;
        resp.get("data").and_then(|d| d.as_f64())
    }

    /// In-memory buffers go through a temp file; mpv only takes paths and
    /// URLs. A fresh file per load, so a superseding load never truncates
    /// one mpv is still reading.
    fn spill_buffer(&mut self, bytes: &[u8]) -> Result<PathBuf> {
        let path = std::env::temp_dir().join(format!(
            "slatecut-mpv-{}-{}-{}.bin",
            std::process::id(),
            self.label,
            self.load_count
        ));
        std::fs::write(&path, bytes)?;
        if let Some(old) = self.spill_path.replace(path.clone()) {
            let _ = std::fs::remove_file(old);
        }
        Ok(path)
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.process.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = std::fs::remove_file(&self.socket_path);
        if let Some(path) = self.spill_path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl DecodeSlot for MpvSlot {
    fn load(&mut self, source: MediaSource, offset_us: TimeUs) {
        self.load_count += 1;
        let target = match &source {
            MediaSource::Url(url) => Ok(url.clone()),
            MediaSource::Buffer { bytes, .. } => self
                .spill_buffer(bytes)
                .map(|p| p.display().to_string()),
        };
        let result = target.and_then(|path| {
            self.send_command(json!({ "command": ["loadfile", &path] }))?;
            self.send_command(json!({ "command": ["set_property", "pause", true] }))?;
            self.send_command(json!({
                "command": ["seek", offset_us.as_seconds(), "absolute"]
            }))?;
            Ok(())
        });
        if let Err(e) = result {
            tracing::warn!(label = %self.label, error = %e, "mpv load failed");
        }
        self.loaded = Some(source);
    }

    fn seek(&mut self, offset_us: TimeUs) {
        if let Err(e) = self.send_command(json!({
            "command": ["seek", offset_us.as_seconds(), "absolute"]
        })) {
            tracing::warn!(label = %self.label, error = %e, "mpv seek failed");
        }
    }

    fn set_playing(&mut self, playing: bool) {
        if let Err(e) =
            self.send_command(json!({ "command": ["set_property", "pause", !playing] }))
        {
            tracing::warn!(label = %self.label, error = %e, "mpv pause toggle failed");
        }
    }

    fn set_volume(&mut self, volume: f64) {
        let percent = (volume.clamp(0.0, 1.0) * 100.0).round();
        if let Err(e) =
            self.send_command(json!({ "command": ["set_property", "volume", percent] }))
        {
            tracing::warn!(label = %self.label, error = %e, "mpv volume change failed");
        }
    }

    fn readiness(&self) -> Readiness {
        if self.loaded.is_none() {
            return Readiness::Empty;
        }
        // mpv reports time-pos only once the file is open and seekable.
        if self.time_pos().is_some() {
            Readiness::Ready
        } else {
            Readiness::Loading
        }
    }

    fn position_us(&self) -> Option<TimeUs> {
        self.time_pos().map(TimeUs::from_seconds)
    }

    fn loaded_source(&self) -> Option<&MediaSource> {
        self.loaded.as_ref()
    }

    fn current_frame(&self) -> Option<Frame> {
        // Frames stay inside the mpv window.
        None
    }
}

impl Drop for MpvSlot {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixListener;
    use std::time::Instant;

    // A socket that accepts connections but never answers, like a hung mpv.
    fn wedged_slot(dir: &tempfile::TempDir) -> (MpvSlot, UnixListener) {
        let socket_path = dir.path().join("mpv.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();
        let slot = MpvSlot {
            label: "wedged".to_string(),
            process: None,
            socket_path,
            loaded: Some(MediaSource::Url("clip.mp4".to_string())),
            spill_path: None,
            load_count: 0,
        };
        (slot, listener)
    }

    #[test]
    fn property_poll_on_unresponsive_socket_is_bounded() {
        let dir = tempfile::TempDir::new().unwrap();
        let (slot, _listener) = wedged_slot(&dir);

        let started = Instant::now();
        assert_eq!(slot.readiness(), Readiness::Loading);
        assert!(slot.position_us().is_none());
        // Two polls, each capped by the IPC timeout; nowhere near a tick-loop
        // stall.
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn empty_slot_reports_empty_without_ipc() {
        let dir = tempfile::TempDir::new().unwrap();
        let (mut slot, _listener) = wedged_slot(&dir);
        slot.loaded = None;

        let started = Instant::now();
        assert_eq!(slot.readiness(), Readiness::Empty);
        assert!(started.elapsed() < Duration::from_millis(20));
    }
}
