//! NeuroScreenCaster Processing Core — the Smart Camera Engine.
//!
//! Turns recorded input telemetry into a camera track:
//! - **Cursor pipeline:** EWMA smoothing and the click-pulse signal
//! - **Segment model:** ordering, trimming, and gap/bounds queries for `ZoomSegment`
//! - **Auto-director:** click clustering, semantic focus, and the FreeRoam/LockedFocus state machine
//! - **Follow-cursor:** dead-zone/hard-edge target generation for `FollowCursor` segments
//! - **Camera track:** the spring-integrated rectangle stream preview and export both read
//!
//! Pure computation — no I/O, no platform dependencies. All inputs are
//! data; all outputs are data.

pub mod auto_director;
pub mod camera_track;
pub mod cursor;
pub mod follow_cursor;
pub mod segment;

pub use auto_director::{analyze, AutoDirectorConfig, TriggerPolicy};
pub use camera_track::CameraTrack;
pub use cursor::{click_pulse_scale, interpolate_cursor, smooth_cursor_samples, CursorPipelineConfig, CursorSample};
pub use follow_cursor::generate_follow_targets;
pub use segment::{find_available_gap, neighbor_bounds, sort_segments, trim_auto_noop};
