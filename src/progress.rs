//! Progress reporting for extraction runs.
//!
//! Push-based: the extractor invokes the callback once per fetched page, so a
//! CLI can render a progress bar without polling any state.
//!
//! # Example
//!
//! ```rust
//! use chatvault::progress::{Progress, ProgressCallback};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress: Progress| {
//!     if let Some(pct) = progress.percentage() {
//!         println!("Progress: {:.0}%", pct);
//!     } else {
//!         println!("Fetched {} pages", progress.pages_fetched);
//!     }
//! });
//!
//! callback(Progress::new(3, 120, Some(10)));
//! ```

use std::sync::Arc;

/// Progress of an in-flight extraction run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    /// Pages fetched so far.
    pub pages_fetched: u32,

    /// Messages accumulated so far across all pages.
    pub messages_fetched: usize,

    /// Page cap for this run, if one was set.
    ///
    /// Without a cap the total is unknowable up front (the corpus ends when
    /// the API returns an empty page), so no percentage can be computed.
    pub max_pages: Option<u32>,
}

impl Progress {
    /// Creates a progress snapshot.
    pub fn new(pages_fetched: u32, messages_fetched: usize, max_pages: Option<u32>) -> Self {
        Self {
            pages_fetched,
            messages_fetched,
            max_pages,
        }
    }

    /// Returns completion as a percentage, if a page cap was set.
    pub fn percentage(&self) -> Option<f64> {
        self.max_pages.map(|max| {
            if max == 0 {
                100.0
            } else {
                (f64::from(self.pages_fetched) / f64::from(max) * 100.0).min(100.0)
            }
        })
    }
}

/// Callback invoked by the extractor after each fetched page.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;
