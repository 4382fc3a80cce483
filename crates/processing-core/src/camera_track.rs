//! Spring-integrated camera track (C6): the dense rectangle stream both
//! preview and export composite against, plus the "visually active" bounds
//! query (C6.5) used to scrub straight to zoomed-in footage.

use nsc_project_model::event::TimestampMs;
use nsc_project_model::geometry::NormalizedRect;
use nsc_project_model::timeline::{CameraSpring, ZoomSegment};

use crate::segment::ZOOM_EPS;

/// Integrator step bounds (seconds). A gap between samples larger than
/// `SPRING_DT_MAX` is clamped rather than fed to the spring whole — a huge
/// dt would blow the integration up.
pub const SPRING_DT_MIN: f64 = 1e-4;
pub const SPRING_DT_MAX: f64 = 0.1;

/// Default preview cadence (60 fps).
pub const PREVIEW_STEP_MS: u64 = 1000 / 60;

pub const TIMELINE_VISUAL_RETURN_TAIL_MS: i64 = 200;

#[derive(Debug, Clone, Copy)]
struct AxisState {
    pos: f64,
    vel: f64,
}

impl AxisState {
    fn step(&mut self, target: f64, dt: f64, spring: &CameraSpring) {
        let accel = (-spring.stiffness * (self.pos - target) - spring.damping * self.vel) / spring.mass;
        self.vel += accel * dt;
        self.pos += self.vel * dt;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTrackSample {
    pub ts: TimestampMs,
    pub rect: NormalizedRect,
}

/// A dense, evenly-ish sampled rectangle stream covering `[0, duration_ms]`,
/// with extra samples inserted exactly at segment boundaries so a cut never
/// gets smeared across a step.
#[derive(Debug, Clone)]
pub struct CameraTrack {
    pub samples: Vec<CameraTrackSample>,
}

fn target_rect_at(segments: &[ZoomSegment], t: TimestampMs) -> NormalizedRect {
    match segments.iter().find(|s| s.start_ts <= t && t < s.end_ts) {
        Some(segment) => segment.rect_at(t),
        None => NormalizedRect::FULL,
    }
}

fn active_spring(segments: &[ZoomSegment], t: TimestampMs) -> CameraSpring {
    segments
        .iter()
        .find(|s| s.start_ts <= t && t < s.end_ts)
        .map(|s| s.spring)
        .unwrap_or_default()
}

impl CameraTrack {
    /// Integrate the full track. `step_ms` is the nominal sample cadence
    /// (`PREVIEW_STEP_MS` for scrubbing, `1000/outputFps` for export).
    /// Velocities are never reset at a segment boundary — only the target
    /// changes, so a retarget produces a spring response, not a cut.
    pub fn build(segments: &[ZoomSegment], duration_ms: u64, step_ms: u64) -> CameraTrack {
        let step_ms = step_ms.max(1);
        let mut timestamps: Vec<u64> = (0..=duration_ms).step_by(step_ms as usize).collect();
        if *timestamps.last().unwrap_or(&0) != duration_ms {
            timestamps.push(duration_ms);
        }
        for segment in segments {
            timestamps.push(segment.start_ts.min(duration_ms));
            timestamps.push(segment.end_ts.min(duration_ms));
        }
        timestamps.sort_unstable();
        timestamps.dedup();

        let initial = target_rect_at(segments, 0);
        let mut x = AxisState { pos: initial.x, vel: 0.0 };
        let mut y = AxisState { pos: initial.y, vel: 0.0 };
        let mut w = AxisState { pos: initial.w, vel: 0.0 };
        let mut h = AxisState { pos: initial.h, vel: 0.0 };

        let mut samples = Vec::with_capacity(timestamps.len());
        samples.push(CameraTrackSample { ts: 0, rect: initial });

        for pair in timestamps.windows(2) {
            let (t0, t1) = (pair[0], pair[1]);
            if t1 == t0 {
                continue;
            }
            let dt = ((t1 - t0) as f64 / 1000.0).clamp(SPRING_DT_MIN, SPRING_DT_MAX);
            let target = target_rect_at(segments, t0);
            let spring = active_spring(segments, t0);
            x.step(target.x, dt, &spring);
            y.step(target.y, dt, &spring);
            w.step(target.w, dt, &spring);
            h.step(target.h, dt, &spring);
            let rect = NormalizedRect::new(x.pos, y.pos, w.pos, h.pos);
            samples.push(CameraTrackSample { ts: t1, rect });
        }

        CameraTrack { samples }
    }

    /// Interpolated rect at an arbitrary timestamp, via binary search over
    /// the dense samples. Used for scrubbing between built frames.
    pub fn sample_at(&self, ts: TimestampMs) -> NormalizedRect {
        let Some(first) = self.samples.first() else {
            return NormalizedRect::FULL;
        };
        match self.samples.binary_search_by_key(&ts, |s| s.ts) {
            Ok(idx) => self.samples[idx].rect,
            Err(0) => first.rect,
            Err(idx) if idx >= self.samples.len() => self.samples.last().unwrap().rect,
            Err(idx) => {
                let a = &self.samples[idx - 1];
                let b = &self.samples[idx];
                let span = (b.ts - a.ts) as f64;
                let t = if span > 0.0 { (ts - a.ts) as f64 / span } else { 0.0 };
                NormalizedRect::lerp(&a.rect, &b.rect, t)
            }
        }
    }

    /// The `[start, end)` window around the track's peak zoom that stays
    /// visually active (zoom strength above `1+ε`), widened by
    /// `TIMELINE_VISUAL_RETURN_TAIL_MS` on the way out. `None` if the track
    /// never zooms in.
    pub fn visual_bounds(&self) -> Option<(TimestampMs, TimestampMs)> {
        let (peak_idx, peak) = self
            .samples
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.rect
                    .zoom_strength()
                    .partial_cmp(&b.rect.zoom_strength())
                    .unwrap()
            })?;
        if peak.rect.zoom_strength() <= 1.0 + ZOOM_EPS {
            return None;
        }

        let mut start_idx = peak_idx;
        while start_idx > 0 && self.samples[start_idx - 1].rect.zoom_strength() > 1.0 + ZOOM_EPS {
            start_idx -= 1;
        }
        let mut end_idx = peak_idx;
        while end_idx + 1 < self.samples.len()
            && self.samples[end_idx + 1].rect.zoom_strength() > 1.0 + ZOOM_EPS
        {
            end_idx += 1;
        }

        let last_ts = self.samples.last().unwrap().ts;
        let start_ts = self.samples[start_idx].ts;
        let end_ts = (self.samples[end_idx].ts + TIMELINE_VISUAL_RETURN_TAIL_MS as u64).min(last_ts);
        Some((start_ts, end_ts))
    }
}
