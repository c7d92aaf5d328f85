//! # Chatvault
//!
//! A Rust library and CLI for archiving group chat history from the GroupMe
//! API and reshaping it into normalized, flat JSON tables.
//!
//! ## Overview
//!
//! The pipeline has two independent stages:
//!
//! 1. **Extract** — [`Extractor`](extractor::Extractor) pulls a group's
//!    history backward through cursor-based pagination and hands accumulated
//!    batches to a [`BatchSink`](sink::BatchSink), which persists each batch
//!    as an immutable, uniquely named raw JSON file.
//! 2. **Transform** — [`Transformer`](transform::Transformer) rescans the
//!    whole raw corpus and evaluates six independent
//!    [`Projection`](transform::Projection)s: a typed core message table,
//!    four side tables pairing message ids with opaque nested attributes
//!    (attachments, pin timestamps, reactions, events), and a member table
//!    unnested from the group roster.
//!
//! Extraction is a single-threaded, synchronous session: one request at a
//! time, a fixed courtesy delay before each, no retries. The transform stage
//! is a stateless batch job — rerunning it over an unchanged corpus rewrites
//! byte-identical outputs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatvault::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = ExtractConfig::new("secret-token").with_raw_dir("data");
//!
//!     let extractor = Extractor::from_config(&config);
//!     let report = extractor.extract("12345678", 20, None)?;
//!     println!("fetched {} pages ({})", report.pages_fetched, report.stop);
//!
//!     let transformer = Transformer::new(TransformConfig::new("data", "data/formatted"));
//!     let report = transformer.transform(&Projection::ALL)?;
//!     assert!(report.is_success());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`message`] — [`Message`], the raw record with typed scalars and opaque
//!   nested attributes
//! - [`client`] — [`PageSource`](client::PageSource) trait and the blocking
//!   [`ApiClient`](client::ApiClient)
//! - [`extractor`] — the pagination/checkpointing loop
//! - [`sink`] — raw-file persistence and the
//!   [`RawEnvelope`](sink::RawEnvelope) choice
//! - [`transform`] — the declarative projections
//! - [`config`] — explicit configuration values for both stages
//! - [`progress`] — per-page progress callbacks
//! - [`cli`] — clap argument types
//! - [`error`] — unified error types ([`ChatvaultError`], [`Result`])

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod message;
pub mod progress;
pub mod sink;
pub mod transform;

// Re-export the main types at the crate root for convenience
pub use error::{ChatvaultError, Result};
pub use message::Message;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatvault::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Message;

    pub use crate::error::{ChatvaultError, Result};

    pub use crate::config::{ExtractConfig, TransformConfig};

    pub use crate::client::{ApiClient, PageSource};
    pub use crate::extractor::{ExtractReport, Extractor, StopReason};
    pub use crate::sink::{BatchSink, RawEnvelope};

    pub use crate::transform::{Projection, TransformReport, Transformer};

    pub use crate::progress::{Progress, ProgressCallback};
}
