//! NeuroScreenCaster Render Engine
//!
//! Deterministic frame composition (preview and export share one pure
//! function) plus the export driver that precomputes a camera track and
//! pushes composed frames to an `Encoder` collaborator.
//!
//! # Pipeline
//!
//! ```text
//! zoom segments ──► camera track (spring-integrated)
//! cursor events ──► cursor pipeline (EWMA + click-pulse)
//!                           │
//!                           ▼
//!                    frame compositor
//!                           │
//!                           ▼
//!                    Encoder (out of scope)
//! ```

pub mod compositor;
pub mod export;

pub use compositor::{compose_all, compose_frame, CursorOverlay, FrameComposition, FrameTransform, CURSOR_ASSET, CURSOR_TIMING_OFFSET_MS};
pub use export::{Encoder, ExportJob, ExportStatus};
