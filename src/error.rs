//! Unified error types for chatvault.
//!
//! This module provides a single [`ChatvaultError`] enum that covers all error
//! cases in the library, from failed page requests to schema violations during
//! the transform stage.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages
//! - **Developers** get source error chains for debugging
//!
//! Note that running out of pages is *not* an error: an empty `messages` array
//! from the API is the normal exhaustion signal and is reported through
//! [`StopReason`](crate::extractor::StopReason), never through this enum.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatvault operations.
///
/// # Example
///
/// ```rust
/// use chatvault::error::Result;
/// use chatvault::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     // ... operations that may fail
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatvaultError>;

/// The error type for all chatvault operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatvaultError {
    /// An I/O error occurred.
    ///
    /// This typically happens when reading the raw corpus or writing a
    /// normalized output file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing/serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A page request to the remote API failed (network or non-success status).
    ///
    /// Transport errors are never retried. The extraction loop aborts after a
    /// best-effort flush of whatever is buffered, so partial progress is
    /// already on disk when this error reaches the caller.
    #[error("Transport error while {context}: {source}")]
    Transport {
        /// What the client was doing (e.g., "fetching page 4")
        context: String,
        /// The underlying HTTP error
        #[source]
        source: reqwest::Error,
    },

    /// A raw batch file could not be written.
    ///
    /// The sink deliberately does not create the raw-corpus directory: a
    /// missing directory at flush time is reported here instead.
    #[error("Failed to write raw file {}: {source}", path.display())]
    Write {
        /// Target path of the failed write
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A raw record does not match a projection's declared column types.
    ///
    /// The offending projection fails atomically (no partial output file);
    /// other projections are unaffected.
    #[error("Schema violation in {projection} projection{}: {detail}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Schema {
        /// Name of the projection that failed (e.g., "messages")
        projection: &'static str,
        /// Description of the mismatch
        detail: String,
        /// The raw file being read, if known
        path: Option<PathBuf>,
    },

    /// The API token environment variable is not set.
    #[error("Missing API token: set the {var} environment variable")]
    MissingToken {
        /// Name of the environment variable that was expected
        var: &'static str,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatvaultError {
    /// Creates a transport error with request context.
    pub fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
        ChatvaultError::Transport {
            context: context.into(),
            source,
        }
    }

    /// Creates a raw-file write error.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ChatvaultError::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a schema violation for the named projection.
    pub fn schema(
        projection: &'static str,
        detail: impl Into<String>,
        path: Option<PathBuf>,
    ) -> Self {
        ChatvaultError::Schema {
            projection,
            detail: detail.into(),
            path,
        }
    }

    /// Returns `true` if this is a transport error.
    pub fn is_transport(&self) -> bool {
        matches!(self, ChatvaultError::Transport { .. })
    }

    /// Returns `true` if this is a raw-file write error.
    pub fn is_write(&self) -> bool {
        matches!(self, ChatvaultError::Write { .. })
    }

    /// Returns `true` if this is a schema violation.
    pub fn is_schema(&self) -> bool {
        matches!(self, ChatvaultError::Schema { .. })
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatvaultError::Io(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
