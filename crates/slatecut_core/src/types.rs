use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::sync::Arc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TimeUs
// ---------------------------------------------------------------------------

/// Timeline time in microseconds. Negative values are legal intermediates
/// (e.g. a drag past the left edge) but never survive an edit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeUs(pub i64);

impl TimeUs {
    pub const ZERO: Self = Self(0);

    pub fn from_seconds(s: f64) -> Self {
        Self((s * 1_000_000.0) as i64)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        Self(self.0.clamp(lo.0, hi.0))
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    pub fn abs_diff(self, other: Self) -> Self {
        Self((self.0 - other.0).abs())
    }
}

impl Add for TimeUs {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeUs {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<i64> for TimeUs {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<i64> for TimeUs {
    type Output = Self;
    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

impl fmt::Display for TimeUs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_us = self.0.unsigned_abs();
        let total_ms = total_us / 1_000;
        let ms = total_ms % 1_000;
        let total_secs = total_ms / 1_000;
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let hours = total_mins / 60;
        if self.0 < 0 {
            write!(f, "-{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        } else {
            write!(f, "{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        }
    }
}

// ---------------------------------------------------------------------------
// TrackKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    /// Infer the kind from a conventional track name ("Audio 2", "A1", ...).
    /// Arrangements loaded from older records carry no explicit kind field.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let ordinal_after = |prefix: &str| {
            lower
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.trim().chars().all(|c| c.is_ascii_digit()))
        };
        if lower.starts_with("audio") || ordinal_after("a") {
            Some(TrackKind::Audio)
        } else if lower.starts_with("video") || ordinal_after("v") {
            Some(TrackKind::Video)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Clip
// ---------------------------------------------------------------------------

/// A placed reference to a segment of source media.
///
/// `trim_start_us` is the offset into the source at which this clip begins;
/// `max_duration_us` is the full source length, so
/// `trim_start_us + duration_us <= max_duration_us` always holds after an edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub id: Uuid,
    pub source_id: Uuid,
    pub track_index: usize,
    pub start_us: TimeUs,
    pub duration_us: TimeUs,
    pub trim_start_us: TimeUs,
    pub max_duration_us: TimeUs,
    pub pair_id: Option<Uuid>,
    pub muted: bool,
    pub volume: f64,
}

impl Clip {
    pub fn new(
        source_id: Uuid,
        track_index: usize,
        start_us: TimeUs,
        duration_us: TimeUs,
        max_duration_us: TimeUs,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            track_index,
            start_us,
            duration_us,
            trim_start_us: TimeUs::ZERO,
            max_duration_us,
            pair_id: None,
            muted: false,
            volume: 1.0,
        }
    }

    pub fn end_us(&self) -> TimeUs {
        self.start_us + self.duration_us
    }

    /// Half-open containment: `[start, end)`.
    pub fn contains(&self, t: TimeUs) -> bool {
        t >= self.start_us && t < self.end_us()
    }

    /// Source offset a decoder must sit at to play this clip at timeline time `t`.
    pub fn source_offset_at(&self, t: TimeUs) -> TimeUs {
        t - self.start_us + self.trim_start_us
    }
}

// ---------------------------------------------------------------------------
// TrackSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackSettings {
    pub name: String,
    pub kind: TrackKind,
    pub locked: bool,
    pub visible: bool,
    pub height_px: u32,
}

impl TrackSettings {
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            name: name.into(),
            kind,
            locked: false,
            visible: true,
            height_px: 64,
        }
    }

    /// Playback priority derived from a trailing ordinal in the name
    /// ("Video 2" -> 2). Tracks without one fall back to their index.
    pub fn priority(&self, fallback: usize) -> i64 {
        let digits: Vec<char> = self
            .name
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits
            .iter()
            .rev()
            .collect::<String>()
            .parse()
            .unwrap_or(fallback as i64)
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// Clips are ordered by insertion, not by position; the no-overlap invariant
/// is restored by the overwrite resolver after every placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Track {
    pub clips: Vec<Clip>,
}

// ---------------------------------------------------------------------------
// Arrangement
// ---------------------------------------------------------------------------

/// The full multi-track arrangement. `tracks` and `settings` are always equal
/// in length and index-aligned. Tracks sit behind `Arc` so history snapshots
/// share unchanged tracks instead of deep-copying the whole arrangement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Arrangement {
    pub tracks: Vec<Arc<Track>>,
    pub settings: Vec<TrackSettings>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_us_arithmetic() {
        let a = TimeUs(5_000_000);
        let b = TimeUs(3_000_000);
        assert_eq!(a + b, TimeUs(8_000_000));
        assert_eq!(a - b, TimeUs(2_000_000));
        assert_eq!(a * 2, TimeUs(10_000_000));
        assert_eq!(a / 5, TimeUs(1_000_000));
    }

    #[test]
    fn time_us_from_seconds_as_seconds() {
        let t = TimeUs::from_seconds(2.5);
        assert_eq!(t, TimeUs(2_500_000));
        assert!((t.as_seconds() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn time_us_clamp() {
        let lo = TimeUs::ZERO;
        let hi = TimeUs(10_000_000);
        assert_eq!(TimeUs(-5).clamp(lo, hi), TimeUs::ZERO);
        assert_eq!(TimeUs(12_000_000).clamp(lo, hi), hi);
        assert_eq!(TimeUs(4_000_000).clamp(lo, hi), TimeUs(4_000_000));
    }

    #[test]
    fn time_us_display() {
        assert_eq!(TimeUs(0).to_string(), "00:00:00.000");
        assert_eq!(TimeUs(1_500_000).to_string(), "00:00:01.500");
        assert_eq!(TimeUs::from_seconds(3661.5).to_string(), "01:01:01.500");
        assert_eq!(TimeUs(-1_500_000).to_string(), "-00:00:01.500");
    }

    #[test]
    fn clip_interval_accessors() {
        let mut clip = Clip::new(
            Uuid::new_v4(),
            0,
            TimeUs(2_000_000),
            TimeUs(4_000_000),
            TimeUs(10_000_000),
        );
        clip.trim_start_us = TimeUs(1_000_000);

        assert_eq!(clip.end_us(), TimeUs(6_000_000));
        assert!(clip.contains(TimeUs(2_000_000)));
        assert!(clip.contains(TimeUs(5_999_999)));
        assert!(!clip.contains(TimeUs(6_000_000)));
        assert!(!clip.contains(TimeUs(1_999_999)));

        // At timeline 3s the decoder sits at 3 - 2 + 1 = 2s into the source.
        assert_eq!(clip.source_offset_at(TimeUs(3_000_000)), TimeUs(2_000_000));
    }

    #[test]
    fn clip_defaults() {
        let clip = Clip::new(
            Uuid::new_v4(),
            1,
            TimeUs::ZERO,
            TimeUs(1_000_000),
            TimeUs(1_000_000),
        );
        assert_eq!(clip.trim_start_us, TimeUs::ZERO);
        assert!(clip.pair_id.is_none());
        assert!(!clip.muted);
        assert!((clip.volume - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn track_kind_from_name() {
        assert_eq!(TrackKind::from_name("Audio 2"), Some(TrackKind::Audio));
        assert_eq!(TrackKind::from_name("A1"), Some(TrackKind::Audio));
        assert_eq!(TrackKind::from_name("Video 1"), Some(TrackKind::Video));
        assert_eq!(TrackKind::from_name("V3"), Some(TrackKind::Video));
        assert_eq!(TrackKind::from_name("Music"), None);
    }

    #[test]
    fn track_priority_from_name() {
        let s = TrackSettings::new("Video 2", TrackKind::Video);
        assert_eq!(s.priority(0), 2);

        let s = TrackSettings::new("V12", TrackKind::Video);
        assert_eq!(s.priority(0), 12);

        let s = TrackSettings::new("Main", TrackKind::Video);
        assert_eq!(s.priority(7), 7);
    }

    #[test]
    fn serde_roundtrip_arrangement() {
        let mut track = Track::default();
        track.clips.push(Clip::new(
            Uuid::new_v4(),
            0,
            TimeUs::ZERO,
            TimeUs(5_000_000),
            TimeUs(5_000_000),
        ));
        let arrangement = Arrangement {
            tracks: vec![Arc::new(track)],
            settings: vec![TrackSettings::new("Video 1", TrackKind::Video)],
        };

        let json = serde_json::to_string(&arrangement).unwrap();
        let back: Arrangement = serde_json::from_str(&json).unwrap();
        assert_eq!(arrangement, back);
    }

    #[test]
    fn serde_roundtrip_clip_with_pair() {
        let mut clip = Clip::new(
            Uuid::new_v4(),
            0,
            TimeUs(1_000_000),
            TimeUs(2_000_000),
            TimeUs(8_000_000),
        );
        clip.pair_id = Some(Uuid::new_v4());
        clip.muted = true;
        clip.volume = 0.5;

        let json = serde_json::to_string(&clip).unwrap();
        let back: Clip = serde_json::from_str(&json).unwrap();
        assert_eq!(clip, back);
    }
}
