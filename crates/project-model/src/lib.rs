//! NeuroScreenCaster project model.
//!
//! Defines the core data contracts for the synthesis core:
//! - **Geometry:** Normalized rectangles shared by every downstream module.
//! - **Events:** Timestamped input telemetry (`events.json`, schema v1).
//! - **Timeline:** Zoom segments, target points, camera springs.
//! - **Project:** Top-level metadata, timeline, and settings (`project.json`).

pub mod event;
pub mod geometry;
pub mod project;
pub mod timeline;

pub use event::{
    EventKind, EventsError, EventsFile, InputEvent, MouseButton, PhysicalRect, ScrollDelta,
    TimestampMs, UiContext, EVENTS_SCHEMA_VERSION,
};
pub use geometry::{GeometryError, NormalizedRect, MIN_RECT_SIZE};
pub use project::{
    CursorSettings, ExportSettings, LoadedProject, Project, ProjectError, ProjectSettings,
    PROJECT_SCHEMA_VERSION,
};
pub use timeline::{
    CameraSpring, SegmentMode, SegmentTrigger, TargetPoint, Timeline, TimelineError, ZoomSegment,
    MIN_SEGMENT_GAP_MS, MIN_SEGMENT_MS,
};
