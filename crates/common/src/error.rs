//! Error types shared across NeuroScreenCaster crates.

use std::path::PathBuf;

/// The six kinds of error the synthesis core distinguishes (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum NscError {
    /// A JSON document's `schemaVersion` doesn't match what this crate
    /// understands. Fails the load entirely — never a partial import.
    #[error("schema mismatch in {file}: expected version {expected}, found {found}")]
    SchemaMismatch {
        file: String,
        expected: u32,
        found: u32,
    },

    /// A documented invariant was violated: non-monotonic timestamps,
    /// out-of-range rects, overlapping segments. Fails load; rejects the
    /// edit that would cause it before commit.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },

    /// An optional field the engine would prefer (UI context, bounding
    /// rect) was absent. Recoverable: the engine falls back to a
    /// center-zoom default and continues.
    #[error("missing context: {message}")]
    MissingContext { message: String },

    /// The event stream was empty or missing coordinates. The engine still
    /// runs and emits zero auto segments; this is a warning, not a hard
    /// failure.
    #[error("capture shortfall: {message}")]
    CaptureShortfall { message: String },

    /// An external collaborator (encoder, capture report) was unavailable
    /// or returned a terminal error.
    #[error("resource unavailable: {message}")]
    ResourceUnavailable { message: String },

    /// An export or analysis job was cooperatively cancelled.
    #[error("cancelled")]
    Cancelled,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using [`NscError`].
pub type NscResult<T> = Result<T, NscError>;

impl NscError {
    pub fn schema_mismatch(file: impl Into<String>, expected: u32, found: u32) -> Self {
        Self::SchemaMismatch {
            file: file.into(),
            expected,
            found,
        }
    }

    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: msg.into(),
        }
    }

    pub fn missing_context(msg: impl Into<String>) -> Self {
        Self::MissingContext {
            message: msg.into(),
        }
    }

    pub fn capture_shortfall(msg: impl Into<String>) -> Self {
        Self::CaptureShortfall {
            message: msg.into(),
        }
    }

    pub fn resource_unavailable(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            message: msg.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
