//! Error taxonomy. Nothing below the [`Backend`](crate::backend::Backend)
//! boundary ever unwinds into simulator code; everything collapses to one of
//! these variants, a sentinel return value, or a log line, per the core's
//! error handling design.

use thiserror::Error;

/// Severity classification for a simulator-originated API error, mirrored
/// straight from the backend's own error reporting facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorLevel {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Error)]
pub enum GpiError {
    #[error("operation is not supported on this object")]
    Unsupported,

    #[error("object is const and cannot be written")]
    ConstViolation,

    #[error("value of wrong shape for this object: {0}")]
    TypeCoercion(String),

    #[error("index {0} out of declared range")]
    OutOfRange(i32),

    #[error("backend '{0}' is already registered")]
    DuplicateBackend(String),

    #[error("no backend is registered for this operation")]
    NoBackend,

    #[error("simulator reported a {level:?} error: {message}")]
    Simulator { level: ErrorLevel, message: String },

    #[error("failed to load GPI_EXTRA entry '{symbol}' from '{library}': {reason}")]
    ExtensionLoad {
        library: String,
        symbol: String,
        reason: String,
    },

    #[error("malformed GPI_EXTRA entry '{0}', expected 'path:symbol'")]
    MalformedExtensionSpec(String),
}

pub type Result<T> = std::result::Result<T, GpiError>;
