//! Raw-file batch sink.
//!
//! [`BatchSink`] persists one in-memory batch as one immutable JSON file in
//! the raw-corpus directory. Files are named deterministically from the group
//! id, the oldest timestamp in the batch, and the id of the last (oldest)
//! message, so a filename is unique per batch and encodes the slice of history
//! it covers. Once written, a raw file is never rewritten or appended to.
//!
//! The sink takes the batch by value: the extractor hands the accumulated
//! messages over and starts a fresh empty batch. An empty batch is a no-op.
//!
//! Known gap: there is no temp-file-then-rename step, so a crash mid-write can
//! leave a truncated file in the corpus.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ChatvaultError, Result};
use crate::message::Message;

/// How a raw file wraps its batch.
///
/// The archive historically contained both shapes, written by two divergent
/// code paths. The sink makes the choice explicit, and the transform stage
/// accepts either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawEnvelope {
    /// A bare JSON array of messages: `[ {...}, {...} ]`.
    #[default]
    Bare,

    /// Messages under a `messages` key: `{"messages": [ {...} ]}`.
    Wrapped,
}

#[derive(Serialize)]
struct WrappedBatch<'a> {
    messages: &'a [Message],
}

/// Writes batches of messages to uniquely named files in the raw corpus.
///
/// # Example
///
/// ```rust,no_run
/// use chatvault::sink::BatchSink;
/// use chatvault::Message;
///
/// let sink = BatchSink::new("data");
/// let batch = vec![Message::new("163", "123", 1714000000)];
/// let filename = sink.flush("123", batch)?;
/// assert_eq!(filename.as_deref(), Some("123_1714000000_163.json"));
/// # Ok::<(), chatvault::ChatvaultError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BatchSink {
    raw_dir: PathBuf,
    envelope: RawEnvelope,
}

impl BatchSink {
    /// Creates a sink over the given raw-corpus directory.
    ///
    /// The directory is not created here; a missing directory surfaces as a
    /// write error at flush time.
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            envelope: RawEnvelope::Bare,
        }
    }

    /// Sets the raw-file envelope.
    #[must_use]
    pub fn with_envelope(mut self, envelope: RawEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Returns the raw-corpus directory this sink writes into.
    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Writes `batch` as one raw file and returns its filename.
    ///
    /// Returns `Ok(None)` without touching the disk when the batch is empty.
    /// Pages arrive newest-first, so the last message in the batch is the
    /// oldest one; its timestamp and id form the filename.
    pub fn flush(&self, group_id: &str, batch: Vec<Message>) -> Result<Option<String>> {
        let Some(oldest) = batch.last() else {
            return Ok(None);
        };

        let filename = format!("{}_{}_{}.json", group_id, oldest.created_at, oldest.id);
        let path = self.raw_dir.join(&filename);

        let json = match self.envelope {
            RawEnvelope::Bare => serde_json::to_string_pretty(&batch)?,
            RawEnvelope::Wrapped => {
                serde_json::to_string_pretty(&WrappedBatch { messages: &batch })?
            }
        };

        let mut file =
            File::create(&path).map_err(|e| ChatvaultError::write(path.clone(), e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| ChatvaultError::write(path, e))?;

        Ok(Some(filename))
    }
}
