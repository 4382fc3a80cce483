//! Input telemetry types for `events.json` (schema v1, spec §6.1).
//!
//! Coordinates carried by events are in PHYSICAL screen pixels — capture
//! has already multiplied logical coordinates by `scaleFactor` before
//! writing the file. Timestamps are milliseconds since `startTimeMs`.

use serde::{Deserialize, Serialize};

/// Milliseconds since the recording's `startTimeMs`.
pub type TimestampMs = u64;

/// Schema version this crate reads and writes. Anything else is a
/// `SchemaMismatch` (§7) — the file is never partially imported.
pub const EVENTS_SCHEMA_VERSION: u32 = 1;

/// A single recorded input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub ts: TimestampMs,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Discriminated union of event payloads, matching `events.json`'s `"type"`
/// tag values exactly (`move`, `click`, `mouseUp`, `scroll`, `keyDown`,
/// `keyUp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    Move {
        x: f64,
        y: f64,
    },
    Click {
        x: f64,
        y: f64,
        button: MouseButton,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ui_context: Option<UiContext>,
    },
    MouseUp {
        x: f64,
        y: f64,
        button: MouseButton,
    },
    Scroll {
        x: f64,
        y: f64,
        delta: ScrollDelta,
    },
    KeyDown {
        key_code: String,
    },
    KeyUp {
        key_code: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollDelta {
    pub dx: f64,
    pub dy: f64,
}

/// Optional UI-automation context attached to a click (§4.3.3). A click
/// with no context (or a context with no bounding rect) falls back to the
/// center-zoom path in the Smart Camera Engine — this is `MissingContext`
/// (§7), not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_rect: Option<PhysicalRect>,
}

/// A rectangle in physical screen pixels (not yet normalized).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl InputEvent {
    pub fn mov(ts: TimestampMs, x: f64, y: f64) -> Self {
        Self {
            ts,
            kind: EventKind::Move { x, y },
        }
    }

    pub fn click(ts: TimestampMs, x: f64, y: f64, button: MouseButton) -> Self {
        Self {
            ts,
            kind: EventKind::Click {
                x,
                y,
                button,
                ui_context: None,
            },
        }
    }

    pub fn click_with_context(
        ts: TimestampMs,
        x: f64,
        y: f64,
        button: MouseButton,
        ui_context: UiContext,
    ) -> Self {
        Self {
            ts,
            kind: EventKind::Click {
                x,
                y,
                button,
                ui_context: Some(ui_context),
            },
        }
    }

    pub fn scroll(ts: TimestampMs, x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self {
            ts,
            kind: EventKind::Scroll {
                x,
                y,
                delta: ScrollDelta { dx, dy },
            },
        }
    }

    /// Pointer position carried by this event, if any. `keyDown`/`keyUp`
    /// carry none.
    pub fn pointer_position(&self) -> Option<(f64, f64)> {
        match &self.kind {
            EventKind::Move { x, y }
            | EventKind::Click { x, y, .. }
            | EventKind::MouseUp { x, y, .. }
            | EventKind::Scroll { x, y, .. } => Some((*x, *y)),
            EventKind::KeyDown { .. } | EventKind::KeyUp { .. } => None,
        }
    }

    pub fn is_click(&self) -> bool {
        matches!(self.kind, EventKind::Click { .. })
    }

    pub fn as_click(&self) -> Option<(&UiContext, MouseButton)> {
        match &self.kind {
            EventKind::Click {
                button,
                ui_context: Some(ctx),
                ..
            } => Some((ctx, *button)),
            _ => None,
        }
    }
}

/// `events.json`: a write-once document produced by the capture/input-hook
/// collaborators (out of scope here, §1) and consumed by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsFile {
    pub schema_version: u32,
    pub recording_id: String,
    pub start_time_ms: TimestampMs,
    pub screen_width: u32,
    pub screen_height: u32,
    pub scale_factor: f64,
    pub events: Vec<InputEvent>,
}

#[derive(Debug, thiserror::Error)]
pub enum EventsError {
    #[error("events.json schema version {found} is not supported (expected {expected})")]
    SchemaMismatch { expected: u32, found: u32 },

    #[error("pointer samples are not monotonic in ts: {prev} then {next}")]
    NonMonotonicTimestamps { prev: TimestampMs, next: TimestampMs },

    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EventsFile {
    /// Parse an `events.json` document, rejecting anything but the
    /// supported schema version up front (§7 `SchemaMismatch`: fail load,
    /// never a partial import).
    pub fn parse(json: &str) -> Result<Self, EventsError> {
        let file: EventsFile = serde_json::from_str(json)?;
        if file.schema_version != EVENTS_SCHEMA_VERSION {
            return Err(EventsError::SchemaMismatch {
                expected: EVENTS_SCHEMA_VERSION,
                found: file.schema_version,
            });
        }
        Ok(file)
    }

    pub fn to_json_pretty(&self) -> Result<String, EventsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Strictly non-decreasing `ts` across the event stream (§5 ordering
    /// guarantee). Violations are `InvariantViolation` (§7), checked on
    /// load.
    pub fn check_monotonic(&self) -> Result<(), EventsError> {
        for pair in self.events.windows(2) {
            if pair[1].ts < pair[0].ts {
                return Err(EventsError::NonMonotonicTimestamps {
                    prev: pair[0].ts,
                    next: pair[1].ts,
                });
            }
        }
        Ok(())
    }
}
