//! Declarative projections from the raw corpus to normalized tables.
//!
//! The transform stage is a batch job over the accumulated raw files. It holds
//! no state between runs: every invocation rescans the whole corpus and fully
//! rewrites its outputs, so re-running it over an unchanged corpus is
//! idempotent down to the byte.
//!
//! Six projections, each written to its own fixed-name file:
//!
//! | Projection    | Output             | Shape                                    |
//! |---------------|--------------------|------------------------------------------|
//! | `messages`    | `messages.json`    | typed scalar columns per message          |
//! | `attachments` | `attachments.json` | `{ id, attachments }`, payload opaque     |
//! | `pinned-at`   | `pinned_at.json`   | `{ id, pinned_at }`, payload opaque       |
//! | `reactions`   | `reactions.json`   | `{ id, reactions }`, payload opaque       |
//! | `event`       | `event.json`       | `{ id, event }`, payload opaque           |
//! | `members`     | `members.json`     | one row per group member, plus `group_id` |
//!
//! Projections are independent: a schema violation in one fails that
//! projection atomically (its output file is not written at all) while the
//! others still complete.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::TransformConfig;
use crate::error::{ChatvaultError, Result};

/// Filename of the optional groups capture inside the raw corpus.
///
/// Holds an array of `{ group_id, members: [...] }` records and feeds only
/// the members projection; it is excluded from the message scans.
pub const GROUPS_FILE: &str = "raw_groups.json";

/// One normalized output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Projection {
    /// Core message table with typed scalar columns.
    Messages,
    /// Message id paired with the opaque attachment list.
    Attachments,
    /// Message id paired with the opaque pin timestamp.
    #[value(name = "pinned-at")]
    PinnedAt,
    /// Message id paired with the opaque reaction list.
    Reactions,
    /// Message id paired with the opaque event payload.
    Event,
    /// Group member lists unnested to one row per member.
    Members,
}

impl Projection {
    /// All six projections, in output order.
    pub const ALL: [Projection; 6] = [
        Projection::Messages,
        Projection::Attachments,
        Projection::PinnedAt,
        Projection::Reactions,
        Projection::Event,
        Projection::Members,
    ];

    /// Stable name used in errors and reports.
    pub fn name(self) -> &'static str {
        match self {
            Projection::Messages => "messages",
            Projection::Attachments => "attachments",
            Projection::PinnedAt => "pinned_at",
            Projection::Reactions => "reactions",
            Projection::Event => "event",
            Projection::Members => "members",
        }
    }

    /// Fixed output filename for this projection.
    pub fn output_filename(self) -> &'static str {
        match self {
            Projection::Messages => "messages.json",
            Projection::Attachments => "attachments.json",
            Projection::PinnedAt => "pinned_at.json",
            Projection::Reactions => "reactions.json",
            Projection::Event => "event.json",
            Projection::Members => "members.json",
        }
    }
}

impl std::fmt::Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One successfully written output.
#[derive(Debug, Clone)]
pub struct ProjectionOutput {
    /// The projection that produced the file.
    pub projection: Projection,
    /// Number of rows written.
    pub rows: usize,
    /// Path of the output file.
    pub path: PathBuf,
}

/// Outcome of a transform run.
#[derive(Debug)]
pub struct TransformReport {
    /// Outputs written, in projection order.
    pub written: Vec<ProjectionOutput>,
    /// Projections that failed, with the violation that stopped each.
    pub failed: Vec<(Projection, ChatvaultError)>,
}

impl TransformReport {
    /// Returns `true` if every requested projection was written.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Core table schema
// ----------------------------------------------------------------------------

/// Declared column schema of the core message table.
///
/// Only `id` and `created_at` are required; every other column is nullable.
/// Columns are serialized even when null so each row carries the full schema,
/// and any type mismatch anywhere fails the whole projection.
#[derive(Debug, Serialize, Deserialize)]
struct MessageRow {
    id: String,
    group_id: Option<String>,
    sender_id: Option<String>,
    created_at: i64,
    text: Option<String>,
    system: Option<bool>,
    name: Option<String>,
    avatar_url: Option<String>,
    sender_type: Option<String>,
    source_guid: Option<String>,
    user_id: Option<String>,
    platform: Option<String>,
    favorited_by: Option<Vec<String>>,
    pinned_by: Option<String>,
    deleted_at: Option<i64>,
    deletion_actor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroupRecord {
    group_id: String,
    members: Vec<Value>,
}

/// One raw record with the file it came from, for error context.
struct RawRecord {
    path: PathBuf,
    value: Value,
}

/// Reads the raw corpus and evaluates projections into normalized tables.
///
/// # Example
///
/// ```rust,no_run
/// use chatvault::config::TransformConfig;
/// use chatvault::transform::{Projection, Transformer};
///
/// let transformer = Transformer::new(TransformConfig::new("data", "data/formatted"));
/// let report = transformer.transform(&Projection::ALL)?;
/// assert!(report.is_success());
/// # Ok::<(), chatvault::ChatvaultError>(())
/// ```
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    /// Creates a transformer over the given directories.
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    /// Evaluates the requested projections and writes their output files.
    ///
    /// Returns `Err` only when the corpus itself cannot be read (missing
    /// directory, unreadable or malformed JSON file); per-projection schema
    /// violations are collected in the report instead, and the remaining
    /// projections still run.
    pub fn transform(&self, projections: &[Projection]) -> Result<TransformReport> {
        let needs_messages = projections.iter().any(|p| *p != Projection::Members);
        let records = if needs_messages {
            self.load_message_corpus()?
        } else {
            Vec::new()
        };

        fs::create_dir_all(&self.config.out_dir)?;

        let mut report = TransformReport {
            written: Vec::new(),
            failed: Vec::new(),
        };

        for &projection in projections {
            let rows = match projection {
                Projection::Messages => project_messages(&records),
                Projection::Attachments
                | Projection::PinnedAt
                | Projection::Reactions
                | Projection::Event => project_attribute(&records, projection),
                Projection::Members => self.project_members(),
            };

            match rows {
                Ok(rows) => {
                    let path = self.config.out_dir.join(projection.output_filename());
                    let json = serde_json::to_string_pretty(&rows)?;
                    fs::write(&path, json)?;
                    report.written.push(ProjectionOutput {
                        projection,
                        rows: rows.len(),
                        path,
                    });
                }
                Err(err) => report.failed.push((projection, err)),
            }
        }

        Ok(report)
    }

    /// Loads every raw message file in the corpus, in sorted filename order.
    ///
    /// Sorting keeps output row order (and therefore output bytes) stable
    /// across runs. Both raw envelopes are accepted: a bare array of messages
    /// or a `{"messages": [...]}` wrapper.
    fn load_message_corpus(&self) -> Result<Vec<RawRecord>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.config.raw_dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().is_some_and(|ext| ext == "json")
                    && path.file_name().is_none_or(|name| name != GROUPS_FILE)
            })
            .collect();
        paths.sort();

        let mut records = Vec::new();
        for path in paths {
            let content = fs::read_to_string(&path)?;
            let value: Value = serde_json::from_str(&content)?;
            for record in unwrap_batch(value, &path)? {
                records.push(RawRecord {
                    path: path.clone(),
                    value: record,
                });
            }
        }
        Ok(records)
    }

    /// Unnests `raw_groups.json` into one row per member.
    ///
    /// An absent groups file yields an empty table; the groups capture is
    /// optional. Malformed group records or non-object members are schema
    /// violations.
    fn project_members(&self) -> Result<Vec<Value>> {
        let path = self.config.raw_dir.join(GROUPS_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let groups: Vec<Value> = serde_json::from_str(&content)?;
        let mut rows = Vec::new();
        for group in groups {
            let group: GroupRecord = serde_json::from_value(group).map_err(|e| {
                ChatvaultError::schema("members", e.to_string(), Some(path.clone()))
            })?;
            for member in group.members {
                let Value::Object(mut row) = member else {
                    return Err(ChatvaultError::schema(
                        "members",
                        format!("member of group {} is not an object", group.group_id),
                        Some(path.clone()),
                    ));
                };
                row.insert("group_id".to_string(), Value::String(group.group_id.clone()));
                rows.push(Value::Object(row));
            }
        }
        Ok(rows)
    }
}

/// Decodes one raw file body into its message records.
fn unwrap_batch(value: Value, path: &Path) -> Result<Vec<Value>> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(mut obj) => match obj.remove("messages") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(ChatvaultError::schema(
                "corpus",
                "expected a message array or a {\"messages\": [...]} wrapper",
                Some(path.to_path_buf()),
            )),
        },
        _ => Err(ChatvaultError::schema(
            "corpus",
            "raw file is neither an array nor an object",
            Some(path.to_path_buf()),
        )),
    }
}

/// Core table: decode the declared scalar columns of every record.
fn project_messages(records: &[RawRecord]) -> Result<Vec<Value>> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let row: MessageRow = serde_json::from_value(record.value.clone()).map_err(|e| {
            ChatvaultError::schema("messages", e.to_string(), Some(record.path.clone()))
        })?;
        rows.push(serde_json::to_value(row)?);
    }
    Ok(rows)
}

/// Side tables: pair the message id with one opaque nested attribute.
///
/// The attribute's internal shape is never inspected; an absent attribute
/// becomes an explicit null so every row carries both columns.
fn project_attribute(records: &[RawRecord], projection: Projection) -> Result<Vec<Value>> {
    let column = projection.name();
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let id = record
            .value
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ChatvaultError::schema(column, "record has no string id", Some(record.path.clone()))
            })?;
        let payload = record.value.get(column).cloned().unwrap_or(Value::Null);

        let mut row = Map::new();
        row.insert("id".to_string(), Value::String(id.to_string()));
        row.insert(column.to_string(), payload);
        rows.push(Value::Object(row));
    }
    Ok(rows)
}
