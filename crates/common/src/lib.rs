//! NeuroScreenCaster common utilities.
//!
//! Shared infrastructure for all synthesis-core crates:
//! - Error types and result aliases
//! - Timing utilities (duration-drift measurement)
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
