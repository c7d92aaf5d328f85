//! End-to-end CLI tests.
//!
//! Extraction against the live API is not exercised here; these tests cover
//! the argument surface, token resolution, and the transform stage over
//! seeded corpora.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{TempDir, tempdir};

fn chatvault() -> Command {
    Command::cargo_bin("chatvault").expect("binary builds")
}

/// Seeds a raw corpus with one message file and a groups capture.
fn seed_corpus() -> TempDir {
    let dir = tempdir().expect("temp dir");
    fs::write(
        dir.path().join("123_100_1.json"),
        r#"[
  {"id": "2", "group_id": "123", "sender_id": "u2", "created_at": 200, "text": "hi", "system": false},
  {"id": "1", "group_id": "123", "sender_id": "u1", "created_at": 100, "text": "yo", "system": false}
]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("raw_groups.json"),
        r#"[{"group_id": "123", "members": [{"user_id": "u1", "nickname": "Alice"}]}]"#,
    )
    .unwrap();
    dir
}

// ============================================================================
// Argument surface
// ============================================================================

#[test]
fn help_lists_both_stages() {
    chatvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("transform"));
}

#[test]
fn version_flag_works() {
    chatvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("chatvault"));
}

#[test]
fn unknown_subcommand_is_rejected() {
    chatvault().arg("compress").assert().failure();
}

#[test]
fn extract_requires_group_id() {
    chatvault().arg("extract").assert().failure();
}

// ============================================================================
// Extract: token resolution
// ============================================================================

#[test]
fn extract_without_token_fails_fast() {
    chatvault()
        .env_remove("GROUPME_TOKEN")
        .args(["extract", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GROUPME_TOKEN"));
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn transform_writes_all_six_tables() {
    let raw = seed_corpus();
    let out = tempdir().unwrap();

    chatvault()
        .args([
            "transform",
            "--raw-dir",
            raw.path().to_str().unwrap(),
            "--out-dir",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 of 6 projections written"));

    for name in [
        "messages.json",
        "attachments.json",
        "pinned_at.json",
        "reactions.json",
        "event.json",
        "members.json",
    ] {
        assert!(out.path().join(name).exists(), "missing {name}");
    }
}

#[test]
fn transform_stage_selector_limits_outputs() {
    let raw = seed_corpus();
    let out = tempdir().unwrap();

    chatvault()
        .args([
            "transform",
            "--raw-dir",
            raw.path().to_str().unwrap(),
            "--out-dir",
            out.path().to_str().unwrap(),
            "--only",
            "messages",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 projections written"));

    assert!(out.path().join("messages.json").exists());
    assert!(!out.path().join("attachments.json").exists());
}

#[test]
fn transform_missing_raw_dir_fails() {
    let out = tempdir().unwrap();
    chatvault()
        .args([
            "transform",
            "--raw-dir",
            "/definitely/not/a/dir",
            "--out-dir",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .failure();
}

#[test]
fn transform_schema_violation_exits_nonzero() {
    let raw = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(
        raw.path().join("123_100_1.json"),
        r#"[{"id": "1", "created_at": "not-a-number"}]"#,
    )
    .unwrap();

    chatvault()
        .args([
            "transform",
            "--raw-dir",
            raw.path().to_str().unwrap(),
            "--out-dir",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Schema violation"));

    // The failed core projection left no file; side tables still landed.
    assert!(!out.path().join("messages.json").exists());
    assert!(out.path().join("attachments.json").exists());
}
