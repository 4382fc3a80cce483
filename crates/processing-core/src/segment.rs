//! Segment model (C3): ordering, trimming, gap search, and edit bounds for
//! `ZoomSegment` lists.

use nsc_project_model::event::TimestampMs;
use nsc_project_model::timeline::{ZoomSegment, MIN_SEGMENT_GAP_MS, MIN_SEGMENT_MS};

/// Effective-zoom epsilon used to decide whether a sample counts as
/// "zoomed in" at all (spec §4.2/§4.3).
pub const ZOOM_EPS: f64 = 1e-3;

/// Maximum slot length `findAvailableGap` will ever hand back.
const GAP_SEARCH_CAP_MS: i64 = 1600;

/// Sort segments by `startTs`, ascending.
pub fn sort_segments(segments: &mut [ZoomSegment]) {
    segments.sort_by_key(|s| s.start_ts);
}

/// For auto segments, drop leading target points whose zoom strength is
/// at or below `1+ε`; if none remain, the segment is a no-op and is
/// removed entirely (signalled by returning `None`).
pub fn trim_auto_noop(mut segment: ZoomSegment) -> Option<ZoomSegment> {
    if !segment.is_auto {
        return Some(segment);
    }
    while let Some(first) = segment.target_points.first() {
        if first.rect.zoom_strength() <= 1.0 + ZOOM_EPS {
            segment.target_points.remove(0);
        } else {
            break;
        }
    }
    if segment.target_points.is_empty() && segment.initial_zoom_strength() <= 1.0 + ZOOM_EPS {
        return None;
    }
    Some(segment)
}

/// Scan the gaps between a sorted, non-overlapping segment list (bounded
/// by `MIN_SEGMENT_GAP_MS` on each side), find the one containing
/// `preferred_start_ts`, and return a slot of up to `1600 ms` or the full
/// gap, whichever is smaller. `None` if the usable span is below
/// `MIN_SEGMENT_MS`.
pub fn find_available_gap(
    segments: &[ZoomSegment],
    duration_ms: i64,
    preferred_start_ts: TimestampMs,
) -> Option<(TimestampMs, TimestampMs)> {
    let mut bounds: Vec<(i64, i64)> = Vec::with_capacity(segments.len() + 1);
    let mut cursor = i64::MIN;
    for segment in segments {
        bounds.push((cursor, segment.start_ts as i64));
        cursor = segment.end_ts as i64;
    }
    bounds.push((cursor, i64::MAX));

    let preferred = preferred_start_ts as i64;
    for (prev_end, next_start) in bounds {
        let gap_start = if prev_end == i64::MIN {
            i64::MIN
        } else {
            prev_end + MIN_SEGMENT_GAP_MS
        };
        let gap_end = if next_start == i64::MAX {
            i64::MAX
        } else {
            next_start - MIN_SEGMENT_GAP_MS
        };
        if gap_start == i64::MIN || gap_end == i64::MAX {
            // Unbounded gap at either end of the timeline: only usable if
            // it actually contains the preferred start.
            if !(preferred >= gap_start.max(0) && (gap_end == i64::MAX || preferred < gap_end)) {
                continue;
            }
        } else if !(preferred >= gap_start && preferred < gap_end) {
            continue;
        }

        let usable_start = gap_start.max(0);
        let usable_end = if gap_end == i64::MAX {
            usable_start + duration_ms.min(GAP_SEARCH_CAP_MS)
        } else {
            gap_end
        };
        let span = usable_end - usable_start;
        if span < MIN_SEGMENT_MS {
            return None;
        }
        let slot_len = duration_ms.min(GAP_SEARCH_CAP_MS).min(span);
        if slot_len < MIN_SEGMENT_MS {
            return None;
        }
        let start = preferred.clamp(usable_start, usable_end - slot_len);
        return Some((start as TimestampMs, (start + slot_len) as TimestampMs));
    }
    None
}

/// The `[min_start, max_end)` a segment identified by `id` may occupy
/// while editing, given its sorted neighbors: clamped by
/// `MIN_SEGMENT_GAP_MS` against the previous/next segment and by
/// `duration_ms` against `MIN_SEGMENT_MS`.
pub fn neighbor_bounds(
    segments: &[ZoomSegment],
    id: &str,
    duration_ms: i64,
) -> Option<(TimestampMs, TimestampMs)> {
    let idx = segments.iter().position(|s| s.id == id)?;
    let min_start = if idx == 0 {
        0
    } else {
        segments[idx - 1].end_ts as i64 + MIN_SEGMENT_GAP_MS
    };
    let max_end = if idx + 1 == segments.len() {
        i64::MAX
    } else {
        segments[idx + 1].start_ts as i64 - MIN_SEGMENT_GAP_MS
    };
    let max_end = if max_end == i64::MAX {
        i64::MAX
    } else {
        max_end.max(min_start + duration_ms.max(MIN_SEGMENT_MS))
    };
    Some((min_start as TimestampMs, max_end as TimestampMs))
}
