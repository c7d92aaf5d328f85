//! End-to-end tests for the extract stage: a scripted page source drives the
//! pagination loop against a real sink on a temp directory, and the transform
//! stage consumes what was written.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;
use tempfile::tempdir;

use chatvault::client::PageSource;
use chatvault::config::TransformConfig;
use chatvault::extractor::{Extractor, StopReason};
use chatvault::sink::{BatchSink, RawEnvelope};
use chatvault::transform::{Projection, Transformer};
use chatvault::{ChatvaultError, Message, Result};

// ============================================================================
// Scripted page source
// ============================================================================

type RequestLog = Rc<RefCell<Vec<Option<String>>>>;

/// Pops pre-built pages in order and records the cursor of every request in a
/// log the test keeps a handle to.
struct ScriptedSource {
    pages: RefCell<VecDeque<Result<Vec<Message>>>>,
    requests: RequestLog,
}

impl ScriptedSource {
    fn new(pages: Vec<Result<Vec<Message>>>) -> (Self, RequestLog) {
        let requests: RequestLog = Rc::default();
        let source = Self {
            pages: RefCell::new(pages.into_iter().collect()),
            requests: Rc::clone(&requests),
        };
        (source, requests)
    }
}

impl PageSource for ScriptedSource {
    fn fetch_page(
        &self,
        _group_id: &str,
        _limit: u32,
        before_id: Option<&str>,
    ) -> Result<Vec<Message>> {
        self.requests
            .borrow_mut()
            .push(before_id.map(ToString::to_string));
        self.pages
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// A page of `count` messages, newest first, ids counting down from `first_id`.
fn page(first_id: u64, count: u64) -> Vec<Message> {
    (0..count)
        .map(|i| {
            let id = first_id - i;
            Message::new(id.to_string(), "123", id as i64 * 100).with_text(format!("msg {id}"))
        })
        .collect()
}

fn extractor(dir: &Path, source: ScriptedSource) -> Extractor<ScriptedSource> {
    Extractor::new(source, BatchSink::new(dir)).with_page_delay(Duration::ZERO)
}

fn count_raw_messages(dir: &Path) -> usize {
    let mut total = 0;
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let records = match value {
            Value::Array(records) => records,
            Value::Object(obj) => obj["messages"].as_array().unwrap().clone(),
            _ => panic!("unexpected raw file shape"),
        };
        total += records.len();
    }
    total
}

// ============================================================================
// Pagination scenarios
// ============================================================================

/// Pages of 20, 20, 5, then empty: three pages fetched, one flush at loop end
/// with all 45 messages, and a filename encoding the oldest timestamp and the
/// id of the 45th message.
#[test]
fn scenario_a_exhaustion_after_three_pages() {
    let dir = tempdir().unwrap();
    let (source, _log) = ScriptedSource::new(vec![
        Ok(page(1000, 20)),
        Ok(page(980, 20)),
        Ok(page(960, 5)),
        Ok(Vec::new()),
    ]);
    let extractor = extractor(dir.path(), source);

    let report = extractor.extract("123", 20, None).unwrap();

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.messages_fetched, 45);
    assert_eq!(report.stop, StopReason::Exhausted);
    // The 45th message is id 956 at timestamp 95600.
    assert_eq!(report.files_written, vec!["123_95600_956.json".to_string()]);
    assert_eq!(count_raw_messages(dir.path()), 45);
}

/// With max_pages = 2 and more history available, extraction stops after
/// exactly two pages, flushes, and never requests a third page.
#[test]
fn scenario_b_max_pages_cap() {
    let dir = tempdir().unwrap();
    let (source, log) = ScriptedSource::new(vec![
        Ok(page(1000, 20)),
        Ok(page(980, 20)),
        Ok(page(960, 20)), // available on the "server", must never be requested
    ]);
    let extractor = extractor(dir.path(), source);

    let report = extractor.extract("123", 20, Some(2)).unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.stop, StopReason::MaxPages);
    assert_eq!(report.files_written.len(), 1);
    assert_eq!(log.borrow().len(), 2);
    assert_eq!(count_raw_messages(dir.path()), 40);
}

// ============================================================================
// Cursor and flush invariants
// ============================================================================

/// The cursor of request n+1 is always the last message id of page n, and the
/// first request carries no cursor.
#[test]
fn cursor_chain_follows_last_ids() {
    let dir = tempdir().unwrap();
    let (source, log) = ScriptedSource::new(vec![
        Ok(page(1000, 10)), // ends at id 991
        Ok(page(990, 10)),  // ends at id 981
        Ok(page(980, 10)),  // ends at id 971
        Ok(Vec::new()),
    ]);
    let extractor = extractor(dir.path(), source);

    extractor.extract("123", 10, None).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            None,
            Some("991".to_string()),
            Some("981".to_string()),
            Some("971".to_string()),
        ]
    );
}

/// Every tenth page triggers a flush; nothing buffered is lost at the end.
#[test]
fn flush_every_ten_pages_and_at_exit() {
    let dir = tempdir().unwrap();
    let mut pages: Vec<Result<Vec<Message>>> = Vec::new();
    for i in 0..13u64 {
        pages.push(Ok(page(1000 - i * 10, 10)));
    }
    pages.push(Ok(Vec::new()));
    let (source, _log) = ScriptedSource::new(pages);
    let extractor = extractor(dir.path(), source);

    let report = extractor.extract("123", 10, None).unwrap();

    assert_eq!(report.pages_fetched, 13);
    // One scheduled flush at page 10 (100 messages), one final flush (30).
    assert_eq!(report.files_written.len(), 2);
    assert_eq!(count_raw_messages(dir.path()), 130);
}

/// A transport failure aborts the run but persists whatever was buffered.
#[test]
fn transport_failure_preserves_partial_progress() {
    let dir = tempdir().unwrap();
    let (source, _log) = ScriptedSource::new(vec![
        Ok(page(1000, 20)),
        Ok(page(980, 20)),
        Err(ChatvaultError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ))),
    ]);
    let extractor = extractor(dir.path(), source);

    let result = extractor.extract("123", 20, None);

    assert!(result.is_err());
    assert_eq!(count_raw_messages(dir.path()), 40);
}

/// Wrapped-envelope runs produce files the transformer can still read.
#[test]
fn wrapped_envelope_round_trips_through_transform() {
    let raw = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (source, _log) = ScriptedSource::new(vec![Ok(page(100, 7)), Ok(Vec::new())]);
    let ext = Extractor::new(
        source,
        BatchSink::new(raw.path()).with_envelope(RawEnvelope::Wrapped),
    )
    .with_page_delay(Duration::ZERO);
    ext.extract("123", 10, None).unwrap();

    let transformer = Transformer::new(TransformConfig::new(raw.path(), out.path()));
    let report = transformer.transform(&[Projection::Messages]).unwrap();
    assert!(report.is_success());
    assert_eq!(report.written[0].rows, 7);
}

/// Full pipeline: extract, then all six projections over the written corpus.
#[test]
fn extract_then_transform_all_projections() {
    let raw = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (source, _log) = ScriptedSource::new(vec![
        Ok(page(1000, 20)),
        Ok(page(980, 20)),
        Ok(page(960, 5)),
        Ok(Vec::new()),
    ]);
    let ext = extractor(raw.path(), source);
    let report = ext.extract("123", 20, None).unwrap();
    assert_eq!(report.messages_fetched, 45);

    let transformer = Transformer::new(TransformConfig::new(raw.path(), out.path()));
    let report = transformer.transform(&Projection::ALL).unwrap();
    assert!(report.is_success());
    assert_eq!(report.written.len(), 6);

    // Core table row count equals the number of distinct message ids.
    let rows: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(out.path().join("messages.json")).unwrap())
            .unwrap();
    assert_eq!(rows.len(), 45);
    let mut ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 45);
}
