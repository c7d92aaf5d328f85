//! Configuration types for the extract and transform stages.
//!
//! All configuration is explicit: the library never reads environment
//! variables or other ambient state. The CLI resolves the token from the
//! environment once and passes it in here.
//!
//! # Example
//!
//! ```rust
//! use chatvault::config::ExtractConfig;
//! use std::time::Duration;
//!
//! let config = ExtractConfig::new("secret-token")
//!     .with_raw_dir("archive/raw")
//!     .with_page_delay(Duration::from_secs(1));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::sink::RawEnvelope;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.groupme.com/v3";

/// The API caps `limit` at 100 messages per page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Configuration for an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// API access token, sent as the `token` query parameter.
    pub token: String,

    /// Base URL of the remote API (default: GroupMe v3).
    pub base_url: String,

    /// Directory that holds the raw corpus. Must already exist; the sink
    /// never creates it.
    pub raw_dir: PathBuf,

    /// Fixed delay enforced before every page request (default: 2s).
    ///
    /// A static courtesy sleep, not adaptive throttling.
    pub page_delay: Duration,

    /// Flush the in-memory batch to disk every this many pages (default: 10).
    pub flush_every: u32,

    /// Envelope used when writing raw files (default: bare array).
    pub envelope: RawEnvelope,
}

impl ExtractConfig {
    /// Creates a configuration with defaults for everything but the token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            raw_dir: PathBuf::from("data"),
            page_delay: Duration::from_secs(2),
            flush_every: 10,
            envelope: RawEnvelope::Bare,
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the raw-corpus directory.
    #[must_use]
    pub fn with_raw_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.raw_dir = dir.into();
        self
    }

    /// Sets the inter-request delay.
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Sets the flush interval in pages.
    #[must_use]
    pub fn with_flush_every(mut self, pages: u32) -> Self {
        self.flush_every = pages.max(1);
        self
    }

    /// Sets the raw-file envelope.
    #[must_use]
    pub fn with_envelope(mut self, envelope: RawEnvelope) -> Self {
        self.envelope = envelope;
        self
    }
}

/// Configuration for a transform run.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Directory holding the raw corpus to scan.
    pub raw_dir: PathBuf,

    /// Directory the normalized tables are written to.
    pub out_dir: PathBuf,
}

impl TransformConfig {
    /// Creates a configuration over the given corpus and output directories.
    pub fn new(raw_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            out_dir: out_dir.into(),
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self::new("data", "data/formatted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_defaults() {
        let config = ExtractConfig::new("t");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.raw_dir, PathBuf::from("data"));
        assert_eq!(config.page_delay, Duration::from_secs(2));
        assert_eq!(config.flush_every, 10);
        assert_eq!(config.envelope, RawEnvelope::Bare);
    }

    #[test]
    fn test_extract_builders() {
        let config = ExtractConfig::new("t")
            .with_base_url("http://localhost:9999/v3")
            .with_raw_dir("/tmp/corpus")
            .with_page_delay(Duration::ZERO)
            .with_flush_every(3)
            .with_envelope(RawEnvelope::Wrapped);
        assert_eq!(config.base_url, "http://localhost:9999/v3");
        assert_eq!(config.raw_dir, PathBuf::from("/tmp/corpus"));
        assert_eq!(config.page_delay, Duration::ZERO);
        assert_eq!(config.flush_every, 3);
        assert_eq!(config.envelope, RawEnvelope::Wrapped);
    }

    #[test]
    fn test_flush_every_floor() {
        // A zero interval would mean flushing before anything is buffered.
        let config = ExtractConfig::new("t").with_flush_every(0);
        assert_eq!(config.flush_every, 1);
    }

    #[test]
    fn test_transform_defaults() {
        let config = TransformConfig::default();
        assert_eq!(config.raw_dir, PathBuf::from("data"));
        assert_eq!(config.out_dir, PathBuf::from("data/formatted"));
    }
}
