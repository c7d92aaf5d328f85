//! Cursor-based pagination engine.
//!
//! [`Extractor`] walks a group's history backward, newest page first. The
//! cursor is the id of the oldest message seen so far and is sent as the
//! exclusive `before_id` boundary of the next request, so it only ever moves
//! backward and is never set before the first page arrives. Messages
//! accumulate in an in-memory batch that is handed off to the
//! [`BatchSink`](crate::sink::BatchSink) by ownership transfer — the
//! extractor keeps a fresh empty batch after every flush.
//!
//! Flush boundaries:
//! - every `flush_every` pages (default 10), so no batch grows unbounded
//! - when the loop terminates, so nothing buffered is lost on normal exit
//! - best-effort before surfacing a transport error, so partial progress
//!   survives a failed run
//!
//! Exhaustion (an empty page) is the normal end of history, not an error.
//! Transport failures are never retried.

use std::mem;
use std::thread;
use std::time::Duration;

use crate::client::{ApiClient, PageSource};
use crate::config::{ExtractConfig, MAX_PAGE_SIZE};
use crate::error::Result;
use crate::message::Message;
use crate::progress::{Progress, ProgressCallback};
use crate::sink::BatchSink;

/// Why an extraction run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The API returned an empty page: the whole history has been fetched.
    Exhausted,

    /// The run hit its `max_pages` cap with more history still on the server.
    MaxPages,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "history exhausted"),
            StopReason::MaxPages => write!(f, "max pages reached"),
        }
    }
}

/// Summary of a completed extraction run.
#[derive(Debug, Clone)]
pub struct ExtractReport {
    /// Number of non-empty pages fetched.
    pub pages_fetched: u32,

    /// Total messages appended across all pages.
    pub messages_fetched: usize,

    /// Raw filenames written, in write order.
    pub files_written: Vec<String>,

    /// Why the run stopped.
    pub stop: StopReason,
}

/// Drives paginated retrieval for one group and persists batches via the sink.
///
/// Generic over [`PageSource`] so the loop can be exercised without a network.
///
/// # Example
///
/// ```rust,no_run
/// use chatvault::config::ExtractConfig;
/// use chatvault::extractor::Extractor;
///
/// let config = ExtractConfig::new("secret-token");
/// let extractor = Extractor::from_config(&config);
/// let report = extractor.extract("123", 20, Some(5))?;
/// println!("fetched {} pages", report.pages_fetched);
/// # Ok::<(), chatvault::ChatvaultError>(())
/// ```
pub struct Extractor<S: PageSource> {
    source: S,
    sink: BatchSink,
    page_delay: Duration,
    flush_every: u32,
    progress: Option<ProgressCallback>,
}

impl Extractor<ApiClient> {
    /// Builds an extractor over the real HTTP client from a config.
    pub fn from_config(config: &ExtractConfig) -> Self {
        let source = ApiClient::new(config.base_url.clone(), config.token.clone());
        let sink = BatchSink::new(config.raw_dir.clone()).with_envelope(config.envelope);
        Extractor::new(source, sink)
            .with_page_delay(config.page_delay)
            .with_flush_every(config.flush_every)
    }
}

impl<S: PageSource> Extractor<S> {
    /// Creates an extractor with the default delay (2s) and flush interval (10).
    pub fn new(source: S, sink: BatchSink) -> Self {
        Self {
            source,
            sink,
            page_delay: Duration::from_secs(2),
            flush_every: 10,
            progress: None,
        }
    }

    /// Sets the fixed delay enforced before every page request.
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

    /// Installs a per-page progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Extracts the history of `group_id`, newest first.
    ///
    /// `page_size` is clamped to the API's `[1, 100]` range. With
    /// `max_pages: None` the run continues until exhaustion.
    ///
    /// On a transport failure the buffered batch is flushed best-effort and
    /// the error is returned; files written so far stay on disk.
    pub fn extract(
        &self,
        group_id: &str,
        page_size: u32,
        max_pages: Option<u32>,
    ) -> Result<ExtractReport> {
        let limit = page_size.clamp(1, MAX_PAGE_SIZE);
        let mut cursor: Option<String> = None;
        let mut batch: Vec<Message> = Vec::new();
        let mut report = ExtractReport {
            pages_fetched: 0,
            messages_fetched: 0,
            files_written: Vec::new(),
            stop: StopReason::Exhausted,
        };

        loop {
            thread::sleep(self.page_delay);

            let page = match self.source.fetch_page(group_id, limit, cursor.as_deref()) {
                Ok(page) => page,
                Err(err) => {
                    // Best-effort: keep partial progress, then surface the error.
                    if let Ok(Some(filename)) =
                        self.sink.flush(group_id, mem::take(&mut batch))
                    {
                        report.files_written.push(filename);
                    }
                    return Err(err);
                }
            };

            if page.is_empty() {
                report.stop = StopReason::Exhausted;
                break;
            }

            report.pages_fetched += 1;
            report.messages_fetched += page.len();
            // Pages arrive newest-first; the last entry is the oldest and
            // becomes the exclusive boundary for the next request.
            cursor = page.last().map(|m| m.id.clone());
            batch.extend(page);

            if let Some(callback) = &self.progress {
                callback(Progress::new(
                    report.pages_fetched,
                    report.messages_fetched,
                    max_pages,
                ));
            }

            let at_cap = max_pages.is_some_and(|cap| report.pages_fetched >= cap);

            if report.pages_fetched % self.flush_every == 0 || at_cap {
                if let Some(filename) = self.sink.flush(group_id, mem::take(&mut batch))? {
                    report.files_written.push(filename);
                }
            }

            if at_cap {
                report.stop = StopReason::MaxPages;
                break;
            }
        }

        // Whatever the loop left buffered; a no-op when the last boundary
        // coincided with a scheduled flush.
        if let Some(filename) = self.sink.flush(group_id, mem::take(&mut batch))? {
            report.files_written.push(filename);
        }

        Ok(report)
    }
}
