use crate::types::*;
use uuid::Uuid;

/// Snap parameters supplied by the edit surface. The threshold is derived
/// from a pixel radius at the current zoom; the caller passes `None` for the
/// whole options block when the disable-snapping modifier is held.
#[derive(Debug, Clone, Copy)]
pub struct SnapOptions {
    pub playhead_us: TimeUs,
    pub threshold_us: TimeUs,
}

/// Convert a pixel snap radius to timeline time at the given zoom.
pub fn threshold_us_from_pixels(pixels: f64, pixels_per_second: f64) -> TimeUs {
    TimeUs::from_seconds(pixels / pixels_per_second)
}

/// Resolve the start time for a drop of a clip with the given duration.
///
/// Candidates are tried in fixed priority order against a running minimum
/// distance initialized to the threshold, with strict `<` so an earlier
/// candidate keeps an exact tie:
///   1. absolute zero,
///   2. the playhead (start aligned),
///   3. the playhead minus the clip's duration (end aligned),
///   4. every other clip's start and end, both start- and end-aligned.
/// If nothing lands under the threshold the raw time is used. The result is
/// clamped to be non-negative either way.
pub fn resolve_drop_time(
    raw_start_us: TimeUs,
    duration_us: TimeUs,
    arrangement: &Arrangement,
    exclude: Option<Uuid>,
    snap: Option<SnapOptions>,
) -> TimeUs {
    let Some(opts) = snap else {
        return raw_start_us.max(TimeUs::ZERO);
    };

    let mut best = raw_start_us;
    let mut best_dist = opts.threshold_us;

    let mut consider = |candidate: TimeUs, best: &mut TimeUs, best_dist: &mut TimeUs| {
        let dist = raw_start_us.abs_diff(candidate);
        if dist < *best_dist {
            *best = candidate;
            *best_dist = dist;
        }
    };

    consider(TimeUs::ZERO, &mut best, &mut best_dist);
    consider(opts.playhead_us, &mut best, &mut best_dist);
    consider(opts.playhead_us - duration_us, &mut best, &mut best_dist);

    for track in &arrangement.tracks {
        for clip in &track.clips {
            if Some(clip.id) == exclude {
                continue;
            }
            for edge in [clip.start_us, clip.end_us()] {
                // Start of the moving clip lands on the edge, or its end does.
                consider(edge, &mut best, &mut best_dist);
                consider(edge - duration_us, &mut best, &mut best_dist);
            }
        }
    }

    best.max(TimeUs::ZERO)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
