//! Zoom-segment timeline: the mutable aggregate edited by the UI and
//! consumed by the Smart Camera Engine's output and the spring integrator.

use serde::{Deserialize, Serialize};

use crate::event::TimestampMs;
use crate::geometry::NormalizedRect;

/// Minimum permitted length of a zoom segment.
pub const MIN_SEGMENT_MS: i64 = 200;

/// Minimum enforced separation between consecutive segments.
pub const MIN_SEGMENT_GAP_MS: i64 = 200;

/// Second-order spring constants driving the camera-track integrator (C6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSpring {
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
}

impl CameraSpring {
    pub const DEFAULT: CameraSpring = CameraSpring {
        mass: 1.0,
        stiffness: 170.0,
        damping: 26.0,
    };
}

impl Default for CameraSpring {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A camera target sampled at a point in time inside a segment. Step
/// semantics: the active target is the latest point with `ts <= t`, never
/// interpolated — the spring integrator supplies the smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPoint {
    pub ts: TimestampMs,
    pub rect: NormalizedRect,
}

/// How a segment's target rectangle is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentMode {
    /// `targetPoints` is always empty; the active target is `initialRect`.
    Fixed,
    /// `targetPoints` is owned by the Follow-Cursor generator (C5).
    FollowCursor,
}

/// What produced this segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentTrigger {
    AutoClick,
    AutoScroll,
    Manual,
}

/// A zoom segment: `[startTs, endTs)` with a target-rect program and the
/// spring used to chase it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomSegment {
    pub id: String,
    pub start_ts: TimestampMs,
    pub end_ts: TimestampMs,
    pub initial_rect: NormalizedRect,
    #[serde(default)]
    pub target_points: Vec<TargetPoint>,
    #[serde(default)]
    pub spring: CameraSpring,
    pub mode: SegmentMode,
    pub trigger: SegmentTrigger,
    pub is_auto: bool,

    /// Legacy field (§9 REDESIGN FLAG): older project files may carry a
    /// `panTrajectory` array in place of `targetPoints`. Readers translate
    /// it into `targetPoints` in [`Timeline::migrate_legacy_fields`];
    /// writers never emit it again (`skip_serializing`).
    #[serde(default, skip_serializing, rename = "panTrajectory")]
    pub pan_trajectory: Vec<TargetPoint>,
}

impl ZoomSegment {
    pub fn duration_ms(&self) -> i64 {
        self.end_ts as i64 - self.start_ts as i64
    }

    /// Effective zoom strength at the start of the segment, before any
    /// target points are consulted — used by `trim_auto_noop` (C3).
    pub fn initial_zoom_strength(&self) -> f64 {
        self.initial_rect.zoom_strength()
    }

    /// Latest target point with `ts <= t`, if any, via binary search.
    /// Falls back to `initial_rect` for `Fixed` mode or when `t` precedes
    /// the first recorded point.
    pub fn rect_at(&self, t: TimestampMs) -> NormalizedRect {
        if self.target_points.is_empty() {
            return self.initial_rect;
        }
        match self.target_points.binary_search_by_key(&t, |p| p.ts) {
            Ok(idx) => self.target_points[idx].rect,
            Err(0) => self.initial_rect,
            Err(idx) => self.target_points[idx - 1].rect,
        }
    }

    /// Migrate a legacy `panTrajectory` into `targetPoints`, in place. A
    /// one-way shim kept only on the read path (§9).
    pub fn migrate_legacy_fields(&mut self) {
        if self.target_points.is_empty() && !self.pan_trajectory.is_empty() {
            self.target_points = std::mem::take(&mut self.pan_trajectory);
        } else {
            self.pan_trajectory.clear();
        }
    }
}

/// Ordered, non-overlapping collection of zoom segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub zoom_segments: Vec<ZoomSegment>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TimelineError {
    #[error("segment {id} is shorter than MIN_SEGMENT_MS ({duration_ms} ms)")]
    SegmentTooShort { id: String, duration_ms: i64 },

    #[error("segments {first} and {second} are not separated by MIN_SEGMENT_GAP_MS")]
    InsufficientGap { first: String, second: String },

    #[error("segments are not sorted by startTs: {first} then {second}")]
    NotSorted { first: String, second: String },
}

impl Timeline {
    pub fn migrate_legacy_fields(&mut self) {
        for segment in &mut self.zoom_segments {
            segment.migrate_legacy_fields();
        }
    }

    /// Check the ordering/gap invariants of spec §3/§4.2. Used on load and
    /// on edit commit (§5); violations are `InvariantViolation`, never
    /// silently repaired here.
    pub fn check_invariants(&self) -> Result<(), TimelineError> {
        for segment in &self.zoom_segments {
            let duration = segment.duration_ms();
            if duration < MIN_SEGMENT_MS {
                return Err(TimelineError::SegmentTooShort {
                    id: segment.id.clone(),
                    duration_ms: duration,
                });
            }
        }
        for pair in self.zoom_segments.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if b.start_ts < a.start_ts {
                return Err(TimelineError::NotSorted {
                    first: a.id.clone(),
                    second: b.id.clone(),
                });
            }
            if (b.start_ts as i64) - (a.end_ts as i64) < MIN_SEGMENT_GAP_MS {
                return Err(TimelineError::InsufficientGap {
                    first: a.id.clone(),
                    second: b.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// The segment active at `t`, if any (`startTs <= t < endTs`).
    pub fn segment_at(&self, t: TimestampMs) -> Option<&ZoomSegment> {
        self.zoom_segments
            .iter()
            .find(|s| s.start_ts <= t && t < s.end_ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: &str, start: u64, end: u64) -> ZoomSegment {
        ZoomSegment {
            id: id.to_string(),
            start_ts: start,
            end_ts: end,
            initial_rect: NormalizedRect::FULL,
            target_points: Vec::new(),
            spring: CameraSpring::default(),
            mode: SegmentMode::Fixed,
            trigger: SegmentTrigger::Manual,
            is_auto: false,
            pan_trajectory: Vec::new(),
        }
    }

    #[test]
    fn rect_at_uses_step_semantics() {
        let mut seg = segment("a", 0, 1000);
        seg.target_points = vec![
            TargetPoint {
                ts: 100,
                rect: NormalizedRect::new(0.1, 0.1, 0.3, 0.3),
            },
            TargetPoint {
                ts: 300,
                rect: NormalizedRect::new(0.2, 0.2, 0.3, 0.3),
            },
        ];
        assert_eq!(seg.rect_at(0), seg.initial_rect);
        assert_eq!(seg.rect_at(150), seg.target_points[0].rect);
        assert_eq!(seg.rect_at(300), seg.target_points[1].rect);
        assert_eq!(seg.rect_at(999), seg.target_points[1].rect);
    }

    #[test]
    fn migrates_legacy_pan_trajectory() {
        let mut seg = segment("a", 0, 1000);
        seg.pan_trajectory = vec![TargetPoint {
            ts: 50,
            rect: NormalizedRect::new(0.0, 0.0, 0.4, 0.4),
        }];
        seg.migrate_legacy_fields();
        assert_eq!(seg.target_points.len(), 1);
        assert!(seg.pan_trajectory.is_empty());
        let json = serde_json::to_string(&seg).unwrap();
        assert!(!json.contains("panTrajectory"));
    }

    #[test]
    fn timeline_rejects_overlapping_segments() {
        let timeline = Timeline {
            zoom_segments: vec![segment("a", 0, 1000), segment("b", 900, 2000)],
        };
        assert!(matches!(
            timeline.check_invariants(),
            Err(TimelineError::InsufficientGap { .. })
        ));
    }

    #[test]
    fn timeline_rejects_short_segments() {
        let timeline = Timeline {
            zoom_segments: vec![segment("a", 0, 100)],
        };
        assert!(matches!(
            timeline.check_invariants(),
            Err(TimelineError::SegmentTooShort { .. })
        ));
    }

    #[test]
    fn timeline_accepts_properly_spaced_segments() {
        let timeline = Timeline {
            zoom_segments: vec![segment("a", 0, 1000), segment("b", 1200, 2000)],
        };
        assert!(timeline.check_invariants().is_ok());
    }

    #[test]
    fn segment_at_finds_active_segment() {
        let timeline = Timeline {
            zoom_segments: vec![segment("a", 0, 1000), segment("b", 1200, 2000)],
        };
        assert_eq!(timeline.segment_at(500).unwrap().id, "a");
        assert_eq!(timeline.segment_at(1100), None);
        assert_eq!(timeline.segment_at(1500).unwrap().id, "b");
    }
}
