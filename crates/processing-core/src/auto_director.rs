//! Smart Camera Engine (C4): turns click/scroll telemetry into a sorted,
//! non-overlapping list of auto `ZoomSegment`s.
//!
//! Grounded in the teacher's `AutoZoomAnalyzer` shape (a `Config` struct +
//! analyzer entry point returning a flat result) and the pack's
//! click-clustering precedent, generalized from spatial-distance
//! clustering to the temporal-gap clustering this spec calls for.

use nsc_project_model::event::{EventKind, EventsFile, TimestampMs, UiContext};
use nsc_project_model::geometry::NormalizedRect;
use nsc_project_model::timeline::{
    CameraSpring, SegmentMode, SegmentTrigger, TargetPoint, ZoomSegment,
};

use crate::segment::{sort_segments, trim_auto_noop};

pub const CLUSTER_GAP_MS: i64 = 300;
pub const SEMANTIC_PAD: f64 = 0.06;
pub const MAX_ZOOM: f64 = 2.0;
pub const MIN_ZOOM_INTERVAL_MS: i64 = 2000;
pub const PRE_ROLL_MS: i64 = 400;
pub const SLOWDOWN_PX_PER_S: f64 = 300.0;
pub const IDLE_TIMEOUT_MS: i64 = 2000;
pub const GLOBAL_SCROLL_TIMEOUT_MS: i64 = 3000;
pub const CONTAINMENT_MARGIN: f64 = 0.1;
pub const MULTI_CLICK_WINDOW_MS: i64 = 3000;

/// Which events are eligible to start or retarget a locked segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPolicy {
    SingleClick,
    MultiClickWindow,
    CtrlClick,
}

#[derive(Debug, Clone, Copy)]
pub struct AutoDirectorConfig {
    pub trigger_policy: TriggerPolicy,
    pub video_width: u32,
    pub video_height: u32,
}

impl AutoDirectorConfig {
    fn video_aspect(&self) -> f64 {
        self.video_width as f64 / self.video_height as f64
    }
}

struct Click {
    ts: TimestampMs,
    x: f64,
    y: f64,
    ui_context: Option<UiContext>,
}

struct Cluster {
    anchor_ts: TimestampMs,
    anchor_x: f64,
    anchor_y: f64,
    anchor_ctx: Option<UiContext>,
    count: usize,
}

/// Entry point: consume an event log and emit the auto segments produced
/// by the configured trigger policy.
pub fn analyze(events: &EventsFile, config: &AutoDirectorConfig) -> Vec<ZoomSegment> {
    let clicks = collect_clicks(events);
    let ctrl_ranges = ctrl_held_ranges(events);

    let candidates: Vec<&Click> = match config.trigger_policy {
        TriggerPolicy::CtrlClick => clicks
            .iter()
            .filter(|c| ctrl_held_at(&ctrl_ranges, c.ts))
            .collect(),
        _ => clicks.iter().collect(),
    };

    let mut clusters = cluster_clicks(&candidates);
    if config.trigger_policy == TriggerPolicy::MultiClickWindow {
        // CLUSTER_GAP_MS already bounds a cluster's span well under
        // MULTI_CLICK_WINDOW_MS; the policy only adds the count floor.
        clusters.retain(|c| c.count >= 2);
    }

    let scrolls = collect_scrolls(events);
    let screen_width = events.screen_width as f64;
    let screen_height = events.screen_height as f64;

    run_state_machine(
        &clusters,
        &scrolls,
        events,
        config,
        screen_width,
        screen_height,
    )
}

fn collect_clicks(events: &EventsFile) -> Vec<Click> {
    events
        .events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::Click { x, y, ui_context, .. } => Some(Click {
                ts: e.ts,
                x: *x,
                y: *y,
                ui_context: ui_context.clone(),
            }),
            _ => None,
        })
        .collect()
}

struct Scroll {
    ts: TimestampMs,
    dy: f64,
}

fn collect_scrolls(events: &EventsFile) -> Vec<Scroll> {
    events
        .events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::Scroll { delta, .. } => Some(Scroll {
                ts: e.ts,
                dy: delta.dy,
            }),
            _ => None,
        })
        .collect()
}

/// `(start, end)` ranges during which a Ctrl modifier key was held.
fn ctrl_held_ranges(events: &EventsFile) -> Vec<(TimestampMs, TimestampMs)> {
    let mut ranges = Vec::new();
    let mut down_at: Option<TimestampMs> = None;
    for event in &events.events {
        match &event.kind {
            EventKind::KeyDown { key_code } if is_ctrl_key(key_code) => {
                down_at.get_or_insert(event.ts);
            }
            EventKind::KeyUp { key_code } if is_ctrl_key(key_code) => {
                if let Some(start) = down_at.take() {
                    ranges.push((start, event.ts));
                }
            }
            _ => {}
        }
    }
    if let Some(start) = down_at {
        ranges.push((start, TimestampMs::MAX));
    }
    ranges
}

fn is_ctrl_key(key_code: &str) -> bool {
    key_code == "ControlLeft" || key_code == "ControlRight"
}

fn ctrl_held_at(ranges: &[(TimestampMs, TimestampMs)], ts: TimestampMs) -> bool {
    ranges.iter().any(|&(start, end)| ts >= start && ts <= end)
}

/// Merge consecutive eligible clicks within `CLUSTER_GAP_MS` into one
/// cluster, anchored on the last click (§4.3.2).
fn cluster_clicks(clicks: &[&Click]) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let mut current: Option<(TimestampMs, usize)> = None;
    let mut anchor: Option<&Click> = None;

    for click in clicks {
        match current {
            Some((last_ts, count)) if (click.ts as i64 - last_ts as i64) <= CLUSTER_GAP_MS => {
                current = Some((click.ts, count + 1));
                anchor = Some(click);
            }
            _ => {
                if let (Some((_, count)), Some(a)) = (current, anchor) {
                    clusters.push(Cluster {
                        anchor_ts: a.ts,
                        anchor_x: a.x,
                        anchor_y: a.y,
                        anchor_ctx: a.ui_context.clone(),
                        count,
                    });
                }
                current = Some((click.ts, 1));
                anchor = Some(click);
            }
        }
    }
    if let (Some((_, count)), Some(a)) = (current, anchor) {
        clusters.push(Cluster {
            anchor_ts: a.ts,
            anchor_x: a.x,
            anchor_y: a.y,
            anchor_ctx: a.ui_context.clone(),
            count,
        });
    }
    clusters
}

/// Build the semantic focus rectangle for a cluster (§4.3.3).
fn semantic_focus_rect(
    cx_px: f64,
    cy_px: f64,
    ui_context: Option<&UiContext>,
    screen_width: f64,
    screen_height: f64,
    video_aspect: f64,
) -> NormalizedRect {
    let bounding = ui_context.and_then(|ctx| ctx.bounding_rect.as_ref());
    let Some(rect) = bounding else {
        let cx = cx_px / screen_width;
        let cy = cy_px / screen_height;
        return rect_for_zoom(cx, cy, MAX_ZOOM, video_aspect);
    };

    let nx = rect.x / screen_width;
    let ny = rect.y / screen_height;
    let nw = rect.width / screen_width;
    let nh = rect.height / screen_height;
    let pad = SEMANTIC_PAD * nw.max(nh);
    let padded = NormalizedRect::new(nx - pad, ny - pad, nw + 2.0 * pad, nh + 2.0 * pad);
    let aspect_locked = padded.expand_to_aspect(video_aspect);

    let zoom = aspect_locked.zoom_strength();
    if zoom > MAX_ZOOM {
        let (cx, cy) = aspect_locked.center();
        rect_for_zoom(cx, cy, MAX_ZOOM, video_aspect)
    } else {
        aspect_locked
    }
}

fn rect_for_zoom(cx: f64, cy: f64, zoom: f64, aspect: f64) -> NormalizedRect {
    let long_side = 1.0 / zoom;
    let (w, h) = if aspect >= 1.0 {
        (long_side, long_side / aspect)
    } else {
        (long_side * aspect, long_side)
    };
    NormalizedRect::centered(cx, cy, w, h)
}

/// Earliest time in the 400 ms before `anchor_ts` where cursor speed
/// dropped below `SLOWDOWN_PX_PER_S`, else `0` (§4.3.4).
fn compute_pre_roll(events: &EventsFile, anchor_ts: TimestampMs) -> i64 {
    let window_start = anchor_ts.saturating_sub(PRE_ROLL_MS as u64);
    let samples: Vec<(TimestampMs, f64, f64)> = events
        .events
        .iter()
        .filter(|e| e.ts >= window_start && e.ts <= anchor_ts)
        .filter_map(|e| e.pointer_position().map(|(x, y)| (e.ts, x, y)))
        .collect();

    for pair in samples.windows(2) {
        let (t0, x0, y0) = pair[0];
        let (t1, x1, y1) = pair[1];
        let dt = (t1 - t0) as f64 / 1000.0;
        if dt <= 0.0 {
            continue;
        }
        let dist = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        let speed = dist / dt;
        if speed < SLOWDOWN_PX_PER_S {
            return (anchor_ts as i64 - t0 as i64).clamp(0, PRE_ROLL_MS);
        }
    }
    0
}

enum TimelineItem<'a> {
    Cluster(&'a Cluster),
    Scroll(&'a Scroll),
}

fn run_state_machine(
    clusters: &[Cluster],
    scrolls: &[Scroll],
    events: &EventsFile,
    config: &AutoDirectorConfig,
    screen_width: f64,
    screen_height: f64,
) -> Vec<ZoomSegment> {
    let mut items: Vec<(TimestampMs, TimelineItem)> = Vec::new();
    for cluster in clusters {
        items.push((cluster.anchor_ts, TimelineItem::Cluster(cluster)));
    }
    for scroll in scrolls {
        items.push((scroll.ts, TimelineItem::Scroll(scroll)));
    }
    items.sort_by_key(|(ts, _)| *ts);

    let mut segments = Vec::new();
    let mut last_auto_start: Option<TimestampMs> = None;

    struct ActiveLock {
        segment: ZoomSegment,
        last_activity_ts: TimestampMs,
        last_retarget_ts: Option<TimestampMs>,
        scroll_window_start: Option<TimestampMs>,
        cumulative_scroll_px: f64,
        safe_zone_rect: NormalizedRect,
    }

    let mut active: Option<ActiveLock> = None;
    let mut seq = 0usize;

    macro_rules! close_active {
        ($close_ts:expr) => {
            if let Some(lock) = active.take() {
                let mut segment = lock.segment;
                segment.end_ts = $close_ts;
                segments.push(segment);
            }
        };
    }

    for (ts, item) in &items {
        if let Some(lock) = &active {
            if ts.saturating_sub(lock.last_activity_ts) as i64 > IDLE_TIMEOUT_MS {
                let close_ts = lock.last_activity_ts + IDLE_TIMEOUT_MS as u64;
                close_active!(close_ts);
            }
        }

        match item {
            TimelineItem::Cluster(cluster) => {
                let focus = semantic_focus_rect(
                    cluster.anchor_x,
                    cluster.anchor_y,
                    cluster.anchor_ctx.as_ref(),
                    screen_width,
                    screen_height,
                    config.video_aspect(),
                );

                if let Some(lock) = &mut active {
                    let safe_zone = lock.safe_zone_rect;
                    let contained = safe_zone.contains_rect(&focus);
                    let retarget_ready = lock
                        .last_retarget_ts
                        .map(|t| ts.saturating_sub(t) as i64 >= MIN_ZOOM_INTERVAL_MS)
                        .unwrap_or(true);
                    if !contained && retarget_ready {
                        if let Some(last_point) = lock.segment.target_points.last_mut() {
                            last_point.ts = *ts;
                        }
                        lock.segment.target_points.push(TargetPoint {
                            ts: *ts,
                            rect: focus,
                        });
                        lock.last_activity_ts = *ts;
                        lock.last_retarget_ts = Some(*ts);
                        lock.safe_zone_rect = focus.shrink(CONTAINMENT_MARGIN);
                    }
                    // Contained or too soon to retarget: cluster is absorbed
                    // silently, the lock stays on its current target.
                } else {
                    let can_start = last_auto_start
                        .map(|t| ts.saturating_sub(t) as i64 >= MIN_ZOOM_INTERVAL_MS)
                        .unwrap_or(true);
                    if can_start {
                        let pre_roll = compute_pre_roll(events, *ts);
                        let start_ts = ts.saturating_sub(pre_roll as u64);
                        seq += 1;
                        let segment = ZoomSegment {
                            id: format!("auto-{seq}"),
                            start_ts,
                            end_ts: *ts,
                            initial_rect: focus,
                            target_points: vec![TargetPoint {
                                ts: *ts,
                                rect: focus,
                            }],
                            spring: CameraSpring::default(),
                            mode: SegmentMode::FollowCursor,
                            trigger: SegmentTrigger::AutoClick,
                            is_auto: true,
                            pan_trajectory: Vec::new(),
                        };
                        active = Some(ActiveLock {
                            segment,
                            last_activity_ts: *ts,
                            last_retarget_ts: None,
                            scroll_window_start: None,
                            cumulative_scroll_px: 0.0,
                            safe_zone_rect: focus.shrink(CONTAINMENT_MARGIN),
                        });
                        last_auto_start = Some(*ts);
                    }
                }
            }
            TimelineItem::Scroll(scroll) => {
                if let Some(lock) = &mut active {
                    let dy_normalized = scroll.dy / screen_height;
                    let base = lock
                        .segment
                        .target_points
                        .last()
                        .map(|p| p.rect)
                        .unwrap_or(lock.segment.initial_rect);
                    let (cx, cy) = base.center();
                    let shifted = NormalizedRect::centered(
                        cx,
                        (cy + dy_normalized).clamp(0.0, 1.0),
                        base.w,
                        base.h,
                    );
                    lock.segment.target_points.push(TargetPoint {
                        ts: *ts,
                        rect: shifted,
                    });
                    lock.last_activity_ts = *ts;
                    lock.safe_zone_rect = shifted.shrink(CONTAINMENT_MARGIN);

                    let window_start = *lock.scroll_window_start.get_or_insert(*ts);
                    lock.cumulative_scroll_px += scroll.dy.abs();
                    let elapsed = ts.saturating_sub(window_start) as i64;
                    if elapsed > GLOBAL_SCROLL_TIMEOUT_MS
                        || lock.cumulative_scroll_px > 1.5 * screen_height
                    {
                        close_active!(*ts);
                    }
                }
            }
        }
    }

    if let Some(lock) = active {
        let last_ts = lock.last_activity_ts;
        let mut segment = lock.segment;
        segment.end_ts = segment.end_ts.max(last_ts).max(segment.start_ts + 1);
        segments.push(segment);
    }

    let mut trimmed: Vec<ZoomSegment> = segments
        .into_iter()
        .filter_map(trim_auto_noop)
        .filter(|s| s.duration_ms() >= nsc_project_model::timeline::MIN_SEGMENT_MS)
        .collect();
    sort_segments(&mut trimmed);
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsc_project_model::event::{EventsFile, InputEvent, MouseButton, PhysicalRect};

    fn events_file(events: Vec<InputEvent>) -> EventsFile {
        EventsFile {
            schema_version: 1,
            recording_id: "r".to_string(),
            start_time_ms: 0,
            screen_width: 1920,
            screen_height: 1080,
            scale_factor: 1.0,
            events,
        }
    }

    fn config() -> AutoDirectorConfig {
        AutoDirectorConfig {
            trigger_policy: TriggerPolicy::SingleClick,
            video_width: 1920,
            video_height: 1080,
        }
    }

    #[test]
    fn single_click_with_bounding_rect_produces_one_segment() {
        let file = events_file(vec![InputEvent::click_with_context(
            2000,
            400.0,
            300.0,
            MouseButton::Left,
            UiContext {
                app_name: None,
                control_name: None,
                bounding_rect: Some(PhysicalRect {
                    x: 300.0,
                    y: 250.0,
                    width: 200.0,
                    height: 100.0,
                }),
            },
        )]);
        let segments = analyze(&file, &config());
        assert_eq!(segments.len(), 1);
        let segment = &segments[0];
        assert!(segment.start_ts <= 2000 && segment.start_ts >= 1600);
        assert_eq!(segment.mode, SegmentMode::FollowCursor);
        assert!(segment.initial_rect.zoom_strength() <= MAX_ZOOM + 1e-9);
    }

    #[test]
    fn cluster_of_four_clicks_produces_one_segment() {
        let file = events_file(vec![
            InputEvent::click(1000, 500.0, 500.0, MouseButton::Left),
            InputEvent::click(1200, 505.0, 500.0, MouseButton::Left),
            InputEvent::click(1450, 510.0, 500.0, MouseButton::Left),
            InputEvent::click(1700, 515.0, 500.0, MouseButton::Left),
        ]);
        let segments = analyze(&file, &config());
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn no_ui_context_falls_back_to_center_zoom_two() {
        let file = events_file(vec![InputEvent::click(5000, 960.0, 540.0, MouseButton::Left)]);
        let segments = analyze(&file, &config());
        assert_eq!(segments.len(), 1);
        let rect = &segments[0].initial_rect;
        let (cx, cy) = rect.center();
        assert!((cx - 0.5).abs() < 1e-6);
        assert!((cy - 0.5).abs() < 1e-6);
        assert!((rect.zoom_strength() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn ctrl_click_policy_ignores_clicks_without_modifier() {
        let file = events_file(vec![
            InputEvent::click(1000, 500.0, 500.0, MouseButton::Left),
            InputEvent {
                ts: 2900,
                kind: EventKind::KeyDown {
                    key_code: "ControlLeft".to_string(),
                },
            },
            InputEvent::click(3000, 500.0, 500.0, MouseButton::Left),
            InputEvent {
                ts: 3100,
                kind: EventKind::KeyUp {
                    key_code: "ControlLeft".to_string(),
                },
            },
        ]);
        let config = AutoDirectorConfig {
            trigger_policy: TriggerPolicy::CtrlClick,
            ..config()
        };
        let segments = analyze(&file, &config);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].end_ts, 3000);
    }

    #[test]
    fn idle_timeout_closes_segment() {
        let file = events_file(vec![
            InputEvent::click(2000, 500.0, 500.0, MouseButton::Left),
            InputEvent::click(10000, 500.0, 500.0, MouseButton::Left),
        ]);
        let segments = analyze(&file, &config());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].end_ts, 4000);
    }
}
