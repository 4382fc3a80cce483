//! Cursor pipeline (C2): EWMA smoothing, interpolation, click-pulse signal.

use nsc_project_model::event::{EventKind, EventsFile, TimestampMs};

/// A normalized cursor sample, strictly non-decreasing in `ts`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorSample {
    pub ts: TimestampMs,
    pub x: f64,
    pub y: f64,
}

/// Bundles the parameters needed by every call site in this module so
/// four loose floats don't get threaded through every function signature.
#[derive(Debug, Clone, Copy)]
pub struct CursorPipelineConfig {
    pub smoothing_factor: f64,
    pub screen_width: f64,
    pub screen_height: f64,
}

impl CursorPipelineConfig {
    pub fn new(smoothing_factor: f64, screen_width: f64, screen_height: f64) -> Self {
        Self {
            smoothing_factor: smoothing_factor.clamp(0.0, 1.0),
            screen_width,
            screen_height,
        }
    }

    /// `α = 1 − 0.9·smoothingFactor`. The `0.9` is a contract, not a
    /// tunable: `smoothingFactor=0` gives identity (`α=1`), `=1` gives
    /// `α=0.1` (strong lag).
    fn alpha(&self) -> f64 {
        1.0 - 0.9 * self.smoothing_factor
    }
}

/// Every pointer-bearing event, normalized to `[0,1]` by the screen
/// dimensions, in recorded order.
fn raw_samples(events: &EventsFile, config: &CursorPipelineConfig) -> Vec<CursorSample> {
    events
        .events
        .iter()
        .filter_map(|event| {
            let (x, y) = match &event.kind {
                EventKind::Move { x, y }
                | EventKind::Click { x, y, .. }
                | EventKind::MouseUp { x, y, .. }
                | EventKind::Scroll { x, y, .. } => (*x, *y),
                EventKind::KeyDown { .. } | EventKind::KeyUp { .. } => return None,
            };
            Some(CursorSample {
                ts: event.ts,
                x: x / config.screen_width,
                y: y / config.screen_height,
            })
        })
        .collect()
}

/// Apply the first-order exponential moving average to the raw pointer
/// stream. `out[0] = in[0]`; `out[i] = out[i-1] + α·(in[i] - out[i-1])`.
pub fn smooth_cursor_samples(events: &EventsFile, config: &CursorPipelineConfig) -> Vec<CursorSample> {
    let raw = raw_samples(events, config);
    if raw.is_empty() {
        return raw;
    }
    let alpha = config.alpha();
    let mut out = Vec::with_capacity(raw.len());
    out.push(raw[0]);
    for sample in &raw[1..] {
        let prev = *out.last().unwrap();
        out.push(CursorSample {
            ts: sample.ts,
            x: prev.x + alpha * (sample.x - prev.x),
            y: prev.y + alpha * (sample.y - prev.y),
        });
    }
    out
}

/// Binary search + linear interpolation between adjacent smoothed
/// samples; clamps to the first/last sample outside the recorded range.
/// Grounded in the teacher's `CursorSmoother::position_at`.
pub fn interpolate_cursor(samples: &[CursorSample], ts: TimestampMs) -> Option<(f64, f64)> {
    if samples.is_empty() {
        return None;
    }
    if ts <= samples[0].ts {
        return Some((samples[0].x, samples[0].y));
    }
    let last = samples.last().unwrap();
    if ts >= last.ts {
        return Some((last.x, last.y));
    }
    let idx = match samples.binary_search_by_key(&ts, |s| s.ts) {
        Ok(idx) => return Some((samples[idx].x, samples[idx].y)),
        Err(idx) => idx,
    };
    let a = samples[idx - 1];
    let b = samples[idx];
    let span = (b.ts - a.ts) as f64;
    if span <= 0.0 {
        return Some((a.x, a.y));
    }
    let t = (ts - a.ts) as f64 / span;
    Some((a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t))
}

const PULSE_SETTLE_MS: i64 = 150;
const PULSE_DOWN_MS: f64 = 65.0;
const PULSE_UP_MS: f64 = 85.0;
const PULSE_MIN_SCALE: f64 = 0.82;

/// Deterministic click-pulse scaling signal. Two-phase ease: a fast
/// down-phase to `0.82` over `65 ms`, then a slower up-phase back to
/// `1.0` over the following `85 ms`. Outside `150 ms` of the latest
/// click, scale is `1.0`.
pub fn click_pulse_scale(click_timestamps: &[TimestampMs], ts: TimestampMs) -> f64 {
    let Some(&tc) = click_timestamps
        .iter()
        .rev()
        .find(|&&tc| tc <= ts)
    else {
        return 1.0;
    };
    let dt = (ts - tc) as i64;
    if dt > PULSE_SETTLE_MS {
        return 1.0;
    }
    let dt = dt as f64;
    if dt <= PULSE_DOWN_MS {
        1.0 - (1.0 - PULSE_MIN_SCALE) * (dt / PULSE_DOWN_MS)
    } else {
        PULSE_MIN_SCALE + (1.0 - PULSE_MIN_SCALE) * ((dt - PULSE_DOWN_MS) / PULSE_UP_MS)
    }
}
