//! Follow-Cursor target generator (C5): turns a smoothed cursor stream into
//! a dense `TargetPoint` series for a `FollowCursor` segment.
//!
//! Grounded in the teacher's chunk-then-centroid analysis shape, adapted
//! from chunked analysis to a fixed-step dead-zone/hard-edge integrator.

use nsc_project_model::event::TimestampMs;
use nsc_project_model::geometry::NormalizedRect;
use nsc_project_model::timeline::{TargetPoint, ZoomSegment};

use crate::cursor::{interpolate_cursor, CursorSample};

pub const FOLLOW_SAMPLE_STEP_MS: i64 = 75;
pub const DEAD_ZONE_RATIO: f64 = 0.2;
pub const HARD_EDGE_RATIO: f64 = 0.35;
pub const MAX_SPEED_PX_PER_S: f64 = 800.0;

/// Sample the cursor every `FOLLOW_SAMPLE_STEP_MS` across the segment and
/// integrate the camera rect toward it: no movement inside the dead zone,
/// full cursor-speed tracking past the hard edge, and a linear ramp
/// between the two, independently per axis, speed-clamped to
/// `MAX_SPEED_PX_PER_S` (normalized by the matching source dimension).
pub fn generate_follow_targets(
    segment: &ZoomSegment,
    cursor_samples: &[CursorSample],
    source_width: f64,
    source_height: f64,
) -> Vec<TargetPoint> {
    if cursor_samples.is_empty() {
        return Vec::new();
    }

    let mut rect = segment.initial_rect;
    let mut points = Vec::new();
    let mut ts = segment.start_ts;

    while ts < segment.end_ts {
        let Some((cx, cy)) = interpolate_cursor(cursor_samples, ts) else {
            break;
        };
        rect = step_toward(rect, cx, cy, FOLLOW_SAMPLE_STEP_MS as f64 / 1000.0, source_width, source_height);
        points.push(TargetPoint { ts, rect });
        ts += FOLLOW_SAMPLE_STEP_MS as u64;
    }

    if let Some((cx, cy)) = interpolate_cursor(cursor_samples, segment.end_ts) {
        let dt = ((segment.end_ts as i64) - (ts as i64 - FOLLOW_SAMPLE_STEP_MS)).max(0) as f64 / 1000.0;
        rect = step_toward(rect, cx, cy, dt, source_width, source_height);
        points.push(TargetPoint {
            ts: segment.end_ts,
            rect,
        });
    }

    points
}

/// One integration step toward cursor position `(cx, cy)` in normalized
/// space. Per axis: distance from the rect's center past `DEAD_ZONE_RATIO`
/// of the half-extent is ignored; past `HARD_EDGE_RATIO` is chased at full
/// clamped speed; the band between ramps linearly.
fn step_toward(
    rect: NormalizedRect,
    cx: f64,
    cy: f64,
    dt_secs: f64,
    source_width: f64,
    source_height: f64,
) -> NormalizedRect {
    let (rx, ry) = rect.center();
    let half_w = rect.w / 2.0;
    let half_h = rect.h / 2.0;

    let new_cx = integrate_axis(rx, cx, half_w, dt_secs, source_width);
    let new_cy = integrate_axis(ry, cy, half_h, dt_secs, source_height);

    NormalizedRect::centered(new_cx, new_cy, rect.w, rect.h)
}

fn integrate_axis(center: f64, target: f64, half_extent: f64, dt_secs: f64, source_dim: f64) -> f64 {
    if half_extent <= 0.0 {
        return center;
    }
    let offset = target - center;
    let ratio = offset.abs() / half_extent;

    let drive = if ratio <= DEAD_ZONE_RATIO {
        0.0
    } else if ratio >= HARD_EDGE_RATIO {
        1.0
    } else {
        (ratio - DEAD_ZONE_RATIO) / (HARD_EDGE_RATIO - DEAD_ZONE_RATIO)
    };

    if drive <= 0.0 {
        return center;
    }

    let max_step_normalized = (MAX_SPEED_PX_PER_S * dt_secs) / source_dim;
    let step = offset.signum() * max_step_normalized * drive;
    (center + step).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsc_project_model::timeline::{CameraSpring, SegmentMode, SegmentTrigger};

    fn fixed_segment(start: u64, end: u64, rect: NormalizedRect) -> ZoomSegment {
        ZoomSegment {
            id: "s".to_string(),
            start_ts: start,
            end_ts: end,
            initial_rect: rect,
            target_points: Vec::new(),
            spring: CameraSpring::default(),
            mode: SegmentMode::FollowCursor,
            trigger: SegmentTrigger::AutoClick,
            is_auto: true,
            pan_trajectory: Vec::new(),
        }
    }

    #[test]
    fn cursor_inside_dead_zone_does_not_move_camera() {
        let rect = NormalizedRect::centered(0.5, 0.5, 0.4, 0.4);
        let segment = fixed_segment(0, 1000, rect);
        let samples = vec![CursorSample { ts: 0, x: 0.51, y: 0.51 }, CursorSample { ts: 1000, x: 0.51, y: 0.51 }];
        let points = generate_follow_targets(&segment, &samples, 1920.0, 1080.0);
        assert!(points.iter().all(|p| (p.rect.center().0 - 0.5).abs() < 1e-6));
    }

    #[test]
    fn cursor_past_hard_edge_moves_camera_toward_it() {
        let rect = NormalizedRect::centered(0.5, 0.5, 0.4, 0.4);
        let segment = fixed_segment(0, 1000, rect);
        let samples = vec![
            CursorSample { ts: 0, x: 0.9, y: 0.5 },
            CursorSample { ts: 1000, x: 0.9, y: 0.5 },
        ];
        let points = generate_follow_targets(&segment, &samples, 1920.0, 1080.0);
        let last = points.last().unwrap();
        assert!(last.rect.center().0 > 0.5);
    }

    #[test]
    fn speed_is_clamped_by_max_speed_px_per_s() {
        let rect = NormalizedRect::centered(0.1, 0.5, 0.1, 0.1);
        let segment = fixed_segment(0, 75, rect);
        let samples = vec![
            CursorSample { ts: 0, x: 0.95, y: 0.5 },
            CursorSample { ts: 75, x: 0.95, y: 0.5 },
        ];
        let points = generate_follow_targets(&segment, &samples, 1920.0, 1080.0);
        let first = &points[0];
        let moved_px = (first.rect.center().0 - 0.1) * 1920.0;
        let max_px = MAX_SPEED_PX_PER_S * (FOLLOW_SAMPLE_STEP_MS as f64 / 1000.0);
        assert!(moved_px <= max_px + 1e-6);
    }

    #[test]
    fn empty_cursor_stream_produces_no_targets() {
        let rect = NormalizedRect::FULL;
        let segment = fixed_segment(0, 1000, rect);
        assert!(generate_follow_targets(&segment, &[], 1920.0, 1080.0).is_empty());
    }
}
