//! Smoke-check a project bundle: schema, identity, monotonicity, bounds,
//! and duration drift. Grounded in the teacher's `validate`/`check`
//! commands (load, print a summary, report issues) but the checks
//! themselves are new — the teacher checked platform capabilities and
//! source-file presence, this checks the synthesis core's own invariants.

use std::path::PathBuf;

use nsc_common::clock::{DriftMeasurement, DriftSeverity};
use nsc_project_model::event::EventsFile;
use nsc_project_model::geometry::NormalizedRect;
use nsc_project_model::{LoadedProject, PROJECT_SCHEMA_VERSION};

const CURSOR_BOUNDS_TOLERANCE_PX: f64 = 2.0;
const CURSOR_BOUNDS_SCALE_SLACK: f64 = 1.05;

/// Returns `true` if every check passed (the CLI's exit-code signal).
pub fn run(project_path: PathBuf, root: Option<PathBuf>, check_export: bool) -> anyhow::Result<bool> {
    let display_path = root
        .as_ref()
        .and_then(|r| project_path.strip_prefix(r).ok())
        .unwrap_or(&project_path);
    println!("Checking project: {}", display_path.display());

    let loaded = match LoadedProject::load(&project_path) {
        Ok(loaded) => loaded,
        Err(err) => {
            println!("  FAIL: could not load project.json: {err}");
            return Ok(false);
        }
    };

    let mut failures = Vec::new();
    let project = &loaded.project;

    if project.schema_version != PROJECT_SCHEMA_VERSION {
        failures.push(format!(
            "schema version {} is not supported (expected {})",
            project.schema_version, PROJECT_SCHEMA_VERSION
        ));
    }

    let events_path = loaded.root.join(&project.events_path);
    let events = match std::fs::read_to_string(&events_path) {
        Ok(content) => match EventsFile::parse(&content) {
            Ok(events) => Some(events),
            Err(err) => {
                failures.push(format!("events.json failed to parse: {err}"));
                None
            }
        },
        Err(err) => {
            failures.push(format!(
                "events file missing at {}: {err}",
                events_path.display()
            ));
            None
        }
    };

    if let Some(events) = &events {
        if events.recording_id != project.id {
            failures.push(format!(
                "events.recordingId ({}) does not match project.id ({})",
                events.recording_id, project.id
            ));
        }

        if let Err(err) = events.check_monotonic() {
            failures.push(format!("events.json timestamps are not monotonic: {err}"));
        }

        check_cursor_bounds(events, &mut failures);
    }

    check_segment_bounds(project, &mut failures);

    if check_export {
        check_duration_drift(project, events.as_ref(), &mut failures);
    }

    if failures.is_empty() {
        println!(
            "  OK: {} zoom segment(s), {} event(s)",
            project.timeline.zoom_segments.len(),
            events.map(|e| e.events.len()).unwrap_or(0)
        );
        Ok(true)
    } else {
        for failure in &failures {
            println!("  FAIL: {failure}");
        }
        println!("\n{} issue(s) found.", failures.len());
        Ok(false)
    }
}

fn check_cursor_bounds(events: &EventsFile, failures: &mut Vec<String>) {
    let screen_w = events.screen_width as f64 * events.scale_factor;
    let screen_h = events.screen_height as f64 * events.scale_factor;
    let max_x = (screen_w + CURSOR_BOUNDS_TOLERANCE_PX).max(screen_w * CURSOR_BOUNDS_SCALE_SLACK);
    let max_y = (screen_h + CURSOR_BOUNDS_TOLERANCE_PX).max(screen_h * CURSOR_BOUNDS_SCALE_SLACK);

    let mut out_of_bounds = 0usize;
    for event in &events.events {
        if let Some((x, y)) = event.pointer_position() {
            let within = x >= -CURSOR_BOUNDS_TOLERANCE_PX
                && y >= -CURSOR_BOUNDS_TOLERANCE_PX
                && x <= max_x
                && y <= max_y;
            if !within {
                out_of_bounds += 1;
            }
        }
    }

    if out_of_bounds > 0 {
        failures.push(format!(
            "{out_of_bounds} pointer sample(s) fall outside the screen bounds (tolerance {CURSOR_BOUNDS_TOLERANCE_PX}px / {CURSOR_BOUNDS_SCALE_SLACK}x)"
        ));
    }
}

fn check_segment_bounds(project: &nsc_project_model::Project, failures: &mut Vec<String>) {
    let max_end = project.duration_ms + 1;
    for segment in &project.timeline.zoom_segments {
        if segment.end_ts > max_end {
            failures.push(format!(
                "segment {} ends at {} past duration {}",
                segment.id, segment.end_ts, project.duration_ms
            ));
        }
        if !rect_in_unit_square(&segment.initial_rect) {
            failures.push(format!(
                "segment {} initialRect is outside [0,1]^2",
                segment.id
            ));
        }
        for point in &segment.target_points {
            if !rect_in_unit_square(&point.rect) {
                failures.push(format!(
                    "segment {} has a target point outside [0,1]^2",
                    segment.id
                ));
            }
        }
    }
}

fn rect_in_unit_square(rect: &NormalizedRect) -> bool {
    rect.x >= -1e-6 && rect.y >= -1e-6 && rect.right() <= 1.0 + 1e-6 && rect.bottom() <= 1.0 + 1e-6
}

/// Duration drift between `project.durationMs` and the span implied by the
/// events stream. A real video decoder is out of scope for this core, so
/// the events span (last event's timestamp) stands in as the measured
/// duration.
fn check_duration_drift(
    project: &nsc_project_model::Project,
    events: Option<&EventsFile>,
    failures: &mut Vec<String>,
) {
    let Some(events) = events else { return };
    let Some(last) = events.events.last() else {
        return;
    };
    let measured_ms = last.ts;

    let drift = DriftMeasurement {
        reference_ms: project.duration_ms,
        measured_ms,
    };

    match drift.severity() {
        DriftSeverity::Ok => {}
        DriftSeverity::Warning => failures.push(format!(
            "duration drift {:.1}% (warning): recorded {}ms, events span {}ms",
            drift.drift_ratio() * 100.0,
            project.duration_ms,
            measured_ms
        )),
        DriftSeverity::Critical => failures.push(format!(
            "duration drift {:.1}% (critical): recorded {}ms, events span {}ms",
            drift.drift_ratio() * 100.0,
            project.duration_ms,
            measured_ms
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsc_project_model::event::{EventKind, InputEvent};
    use nsc_project_model::{Project, SegmentMode, SegmentTrigger, ZoomSegment, EVENTS_SCHEMA_VERSION};

    fn sample_events(recording_id: &str) -> EventsFile {
        EventsFile {
            schema_version: EVENTS_SCHEMA_VERSION,
            recording_id: recording_id.to_string(),
            start_time_ms: 0,
            screen_width: 1920,
            screen_height: 1080,
            scale_factor: 1.0,
            events: vec![
                InputEvent {
                    ts: 0,
                    kind: EventKind::Move { x: 100.0, y: 100.0 },
                },
                InputEvent {
                    ts: 1000,
                    kind: EventKind::Move { x: 200.0, y: 200.0 },
                },
            ],
        }
    }

    #[test]
    fn cursor_bounds_accepts_in_range_samples() {
        let events = sample_events("r1");
        let mut failures = Vec::new();
        check_cursor_bounds(&events, &mut failures);
        assert!(failures.is_empty());
    }

    #[test]
    fn cursor_bounds_flags_far_out_of_range_samples() {
        let mut events = sample_events("r1");
        events.events.push(InputEvent {
            ts: 2000,
            kind: EventKind::Move {
                x: 5000.0,
                y: 5000.0,
            },
        });
        let mut failures = Vec::new();
        check_cursor_bounds(&events, &mut failures);
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn segment_bounds_flags_segment_past_duration() {
        let mut project = Project::new("t", "v.mp4", "e.json", 1920, 1080, 30);
        project.duration_ms = 1000;
        project.timeline.zoom_segments.push(ZoomSegment {
            id: "s1".to_string(),
            start_ts: 0,
            end_ts: 5000,
            initial_rect: NormalizedRect::FULL,
            target_points: Vec::new(),
            spring: Default::default(),
            mode: SegmentMode::Fixed,
            trigger: SegmentTrigger::Manual,
            is_auto: false,
            pan_trajectory: Vec::new(),
        });
        let mut failures = Vec::new();
        check_segment_bounds(&project, &mut failures);
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn duration_drift_accepts_close_match() {
        let mut project = Project::new("t", "v.mp4", "e.json", 1920, 1080, 30);
        project.duration_ms = 1000;
        let events = sample_events("r1");
        let mut failures = Vec::new();
        check_duration_drift(&project, Some(&events), &mut failures);
        assert!(failures.is_empty());
    }

    #[test]
    fn duration_drift_flags_large_mismatch() {
        let mut project = Project::new("t", "v.mp4", "e.json", 1920, 1080, 30);
        project.duration_ms = 100;
        let events = sample_events("r1");
        let mut failures = Vec::new();
        check_duration_drift(&project, Some(&events), &mut failures);
        assert_eq!(failures.len(), 1);
    }
}
