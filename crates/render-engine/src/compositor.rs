//! Frame compositor (C7): combines the camera track and cursor track into
//! a per-frame render instruction. Pure function — same inputs always
//! produce the same `FrameComposition`, so preview and export share this
//! module and can never disagree about what a frame looks like.
//!
//! Grounded in the teacher's `compute_compositions`/`FrameComposition`/
//! `CursorOverlay` shapes, generalized from a fixed webcam/cut-aware loop
//! over a keyframe `Timeline` to a camera-track + cursor-track sampling
//! model.

use nsc_common::error::{NscError, NscResult};
use nsc_processing_core::camera_track::CameraTrack;
use nsc_processing_core::cursor::{click_pulse_scale, interpolate_cursor, CursorSample};
use nsc_project_model::event::TimestampMs;
use nsc_project_model::geometry::NormalizedRect;

/// Cursor samples are taken this far ahead of the frame's nominal timeline
/// position, compensating for perceived input lag in recorded footage.
pub const CURSOR_TIMING_OFFSET_MS: i64 = 45;
const CURSOR_SIZE_RATIO: f64 = 0.03;
const CURSOR_SIZE_MIN_PX: f64 = 8.0;
const CURSOR_SIZE_MAX_PX: f64 = 280.0;
const CURSOR_PULSE_FLOOR: f64 = 0.25;

/// The vector-cursor asset contract: a 72:110 bounding box with the
/// pointer's tip hotspot near its top-left corner. No SVG rasterization
/// happens here — this is the typed fact the renderer anchors scaling and
/// positioning against.
#[derive(Debug, Clone, Copy)]
pub struct CursorAsset {
    pub aspect_w: u32,
    pub aspect_h: u32,
    pub hotspot_x_ratio: f64,
    pub hotspot_y_ratio: f64,
}

pub const CURSOR_ASSET: CursorAsset = CursorAsset {
    aspect_w: 72,
    aspect_h: 110,
    hotspot_x_ratio: 0.08,
    hotspot_y_ratio: 0.04,
};

/// The frame transform spec.md §4.6 names explicitly: `translate((0.5 −
/// center·scale)·frameSize) · scale(scale)`, in output pixels. Preview and
/// export share `compose_frame`, so this is numerically identical on both
/// paths for the same `t_timeline` — the parity property tested below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

/// A single frame's composition instructions.
#[derive(Debug, Clone, Copy)]
pub struct FrameComposition {
    pub frame_index: u64,
    pub t_timeline: TimestampMs,
    pub camera_rect: NormalizedRect,
    pub transform: FrameTransform,
    pub cursor: Option<CursorOverlay>,
}

/// Cursor rendering instruction for a single frame, in output pixels.
/// `(x, y)` is the hotspot position; `top_left` is already offset for the
/// asset's hotspot so a renderer can blit the asset directly at it.
#[derive(Debug, Clone, Copy)]
pub struct CursorOverlay {
    pub hotspot_x: f64,
    pub hotspot_y: f64,
    pub top_left_x: f64,
    pub top_left_y: f64,
    pub width_px: f64,
    pub height_px: f64,
}

/// Map a preview-scrubber timestamp onto the underlying timeline when the
/// two durations differ (e.g. a UI that reports progress against a
/// slightly different nominal length than `project.durationMs`).
pub fn map_preview_to_timeline(
    t_preview_ms: TimestampMs,
    preview_duration_ms: u64,
    timeline_duration_ms: u64,
) -> TimestampMs {
    if preview_duration_ms == 0 {
        return 0;
    }
    ((t_preview_ms as u128 * timeline_duration_ms as u128) / preview_duration_ms as u128) as u64
}

/// Compose a single frame. `cursor_size_setting` is `project.settings.cursor.size`.
pub fn compose_frame(
    frame_index: u64,
    t_timeline: TimestampMs,
    camera_track: &CameraTrack,
    cursor_samples: &[CursorSample],
    click_timestamps: &[TimestampMs],
    cursor_size_setting: f64,
    frame_width: u32,
    frame_height: u32,
) -> FrameComposition {
    let camera_rect = camera_track.sample_at(t_timeline);
    let transform = frame_transform(&camera_rect, frame_width, frame_height);
    let cursor_ts = t_timeline.saturating_add_signed(CURSOR_TIMING_OFFSET_MS);
    let cursor = interpolate_cursor(cursor_samples, cursor_ts).map(|(cx, cy)| {
        let (lx, ly) = camera_rect
            .to_local(cx, cy)
            .unwrap_or_else(|| clamp_to_local(&camera_rect, cx, cy));

        let base_px = (cursor_size_setting * (frame_width.min(frame_height) as f64) * CURSOR_SIZE_RATIO)
            .clamp(CURSOR_SIZE_MIN_PX, CURSOR_SIZE_MAX_PX);
        let pulse = click_pulse_scale(click_timestamps, cursor_ts).max(CURSOR_PULSE_FLOOR);
        let width_px = base_px * pulse;
        let height_px = width_px * CURSOR_ASSET.aspect_h as f64 / CURSOR_ASSET.aspect_w as f64;

        let hotspot_x = lx * frame_width as f64;
        let hotspot_y = ly * frame_height as f64;
        CursorOverlay {
            hotspot_x,
            hotspot_y,
            top_left_x: hotspot_x - width_px * CURSOR_ASSET.hotspot_x_ratio,
            top_left_y: hotspot_y - height_px * CURSOR_ASSET.hotspot_y_ratio,
            width_px,
            height_px,
        }
    });

    FrameComposition {
        frame_index,
        t_timeline,
        camera_rect,
        transform,
        cursor,
    }
}

fn clamp_to_local(rect: &NormalizedRect, px: f64, py: f64) -> (f64, f64) {
    let lx = ((px - rect.x) / rect.w).clamp(0.0, 1.0);
    let ly = ((py - rect.y) / rect.h).clamp(0.0, 1.0);
    (lx, ly)
}

/// `scale = 1/max(rect.w, rect.h)`, `translate = (0.5 − center·scale)·frameSize`.
fn frame_transform(rect: &NormalizedRect, frame_width: u32, frame_height: u32) -> FrameTransform {
    let scale = rect.zoom_strength();
    let (cx, cy) = rect.center();
    FrameTransform {
        scale,
        translate_x: (0.5 - cx * scale) * frame_width as f64,
        translate_y: (0.5 - cy * scale) * frame_height as f64,
    }
}

/// Compose every frame of an export at `fps` across `[0, duration_ms)`.
pub fn compose_all(
    camera_track: &CameraTrack,
    cursor_samples: &[CursorSample],
    click_timestamps: &[TimestampMs],
    cursor_size_setting: f64,
    frame_width: u32,
    frame_height: u32,
    fps: u32,
    duration_ms: u64,
) -> NscResult<Vec<FrameComposition>> {
    if fps == 0 {
        return Err(NscError::invariant_violation("export fps must be nonzero"));
    }
    let frame_step_ms = 1000.0 / fps as f64;
    let total_frames = (duration_ms as f64 / frame_step_ms).ceil() as u64;
    Ok((0..total_frames)
        .map(|frame_index| {
            let t_timeline = (frame_index as f64 * frame_step_ms).round() as TimestampMs;
            compose_frame(
                frame_index,
                t_timeline.min(duration_ms.saturating_sub(1)),
                camera_track,
                cursor_samples,
                click_timestamps,
                cursor_size_setting,
                frame_width,
                frame_height,
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsc_project_model::timeline::ZoomSegment;

    #[test]
    fn cursor_outside_camera_rect_clamps_to_edge() {
        let track = CameraTrack::build(&Vec::<ZoomSegment>::new(), 1000, 50);
        let samples = vec![
            CursorSample { ts: 0, x: 1.5, y: 0.5 },
            CursorSample { ts: 1000, x: 1.5, y: 0.5 },
        ];
        let frame = compose_frame(0, 0, &track, &samples, &[], 1.0, 1920, 1080);
        let cursor = frame.cursor.unwrap();
        assert!(cursor.hotspot_x <= 1920.0 + 1e-6);
    }

    #[test]
    fn cursor_size_respects_min_and_max_px() {
        let track = CameraTrack::build(&Vec::<ZoomSegment>::new(), 1000, 50);
        let samples = vec![CursorSample { ts: 0, x: 0.5, y: 0.5 }];
        let frame = compose_frame(0, 0, &track, &samples, &[], 100.0, 1920, 1080);
        let cursor = frame.cursor.unwrap();
        assert!(cursor.width_px <= 280.0 + 1e-6);
    }

    #[test]
    fn click_pulse_never_shrinks_cursor_below_floor() {
        let track = CameraTrack::build(&Vec::<ZoomSegment>::new(), 1000, 50);
        let samples = vec![CursorSample { ts: 1000, x: 0.5, y: 0.5 }];
        let frame = compose_frame(0, 1000, &track, &samples, &[1000], 1.0, 1920, 1080);
        let cursor = frame.cursor.unwrap();
        let base_px = (1.0 * 1080.0 * CURSOR_SIZE_RATIO).clamp(CURSOR_SIZE_MIN_PX, CURSOR_SIZE_MAX_PX);
        assert!(cursor.width_px >= base_px * CURSOR_PULSE_FLOOR - 1e-6);
    }

    #[test]
    fn compose_all_produces_duration_times_fps_frames() {
        let track = CameraTrack::build(&Vec::<ZoomSegment>::new(), 2000, 50);
        let frames = compose_all(&track, &[], &[], 1.0, 1920, 1080, 30, 2000).unwrap();
        assert_eq!(frames.len(), 60);
    }

    #[test]
    fn map_preview_to_timeline_scales_proportionally() {
        assert_eq!(map_preview_to_timeline(500, 1000, 2000), 1000);
        assert_eq!(map_preview_to_timeline(0, 0, 2000), 0);
    }

    #[test]
    fn frame_transform_matches_translate_scale_formula() {
        let track = CameraTrack::build(&Vec::<ZoomSegment>::new(), 1000, 50);
        let frame = compose_frame(0, 500, &track, &[], &[], 1.0, 1920, 1080);
        let rect = frame.camera_rect;
        let expected_scale = rect.zoom_strength();
        let (cx, cy) = rect.center();
        let expected_tx = (0.5 - cx * expected_scale) * 1920.0;
        let expected_ty = (0.5 - cy * expected_scale) * 1080.0;
        assert!((frame.transform.scale - expected_scale).abs() < 1e-12);
        assert!((frame.transform.translate_x - expected_tx).abs() < 1e-9);
        assert!((frame.transform.translate_y - expected_ty).abs() < 1e-9);
    }

    /// Preview/export parity (spec §8): the frame transform at the same
    /// `t_timeline` must differ by at most 1e-5 in translation and 1e-6 in
    /// scale between the two call paths. `compose_frame` (the preview
    /// path) and `compose_all` (the export path) share the same function,
    /// so this is an equality check with the stated tolerances.
    #[test]
    fn preview_and_export_transforms_agree_within_tolerance() {
        let segments = vec![ZoomSegment {
            id: "s".to_string(),
            start_ts: 0,
            end_ts: 2000,
            initial_rect: NormalizedRect::centered(0.4, 0.6, 0.3, 0.3),
            target_points: Vec::new(),
            spring: Default::default(),
            mode: nsc_project_model::timeline::SegmentMode::Fixed,
            trigger: nsc_project_model::timeline::SegmentTrigger::Manual,
            is_auto: false,
            pan_trajectory: Vec::new(),
        }];
        let track = CameraTrack::build(&segments, 2000, 50);

        let preview = compose_frame(0, 730, &track, &[], &[], 1.0, 1920, 1080);
        let export_frames = compose_all(&track, &[], &[], 1.0, 1920, 1080, 1000, 2000).unwrap();
        let export = export_frames
            .iter()
            .find(|f| f.t_timeline == 730)
            .expect("frame at t=730 exists at 1000fps");

        assert!((preview.transform.scale - export.transform.scale).abs() < 1e-6);
        assert!((preview.transform.translate_x - export.transform.translate_x).abs() < 1e-5);
        assert!((preview.transform.translate_y - export.transform.translate_y).abs() < 1e-5);
    }
}
