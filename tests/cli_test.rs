//! Integration tests for the jsonshape CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write_json(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn jsonshape() -> Command {
    Command::cargo_bin("jsonshape").unwrap()
}

// === infer ===

#[test]
fn infer_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_json(dir.path(), "data.json", r#"{"a": 1}"#);

    jsonshape()
        .arg("infer")
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"object""#))
        .stdout(predicate::str::contains(r#""required":["a"]"#))
        .stdout(predicate::str::contains(r#""additionalProperties":false"#));
}

#[test]
fn infer_merges_multiple_files() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_json(dir.path(), "first.json", r#"{"a": 1}"#);
    let second = write_json(dir.path(), "second.json", r#"{"a": "x"}"#);

    jsonshape()
        .arg("infer")
        .arg(&first)
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":["integer","string"]"#));
}

#[test]
fn infer_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_json(dir.path(), "data.json", r#"[1, "x"]"#);
    let out = dir.path().join("schema.json");

    jsonshape()
        .arg("infer")
        .arg(&data)
        .arg("--output")
        .arg(&out)
        .arg("--pretty")
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("\"items\""));
}

#[test]
fn infer_missing_file_is_io_error() {
    jsonshape()
        .arg("infer")
        .arg("does-not-exist.json")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Error reading"));
}

#[test]
fn infer_invalid_json_is_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_json(dir.path(), "broken.json", "{");

    jsonshape()
        .arg("infer")
        .arg(&data)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid JSON"));
}

// === diff ===

#[test]
fn diff_identical_schemas_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let old = write_json(dir.path(), "old.json", r#"{"type": "integer"}"#);
    let new = write_json(dir.path(), "new.json", r#"{"type": "integer"}"#);

    jsonshape()
        .arg("diff")
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences."));
}

#[test]
fn diff_reports_changes_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let old = write_json(dir.path(), "old.json", r#"{"type": "integer"}"#);
    let new = write_json(dir.path(), "new.json", r#"{"type": "string"}"#);

    jsonshape()
        .arg("diff")
        .arg(&old)
        .arg(&new)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#"r .type: "integer" -> "string""#));
}

// === validate ===

#[test]
fn validate_matching_payload() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_json(
        dir.path(),
        "schema.json",
        r#"{"type": "object", "properties": {"a": {"type": "integer"}}, "required": ["a"]}"#,
    );
    let payload = write_json(dir.path(), "payload.json", r#"{"a": 1}"#);

    jsonshape()
        .arg("validate")
        .arg(&schema)
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid"));
}

#[test]
fn validate_mismatch_fails_with_errors() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_json(
        dir.path(),
        "schema.json",
        r#"{"type": "object", "properties": {"a": {"type": "integer"}}, "required": ["a"]}"#,
    );
    let payload = write_json(dir.path(), "payload.json", r#"{}"#);

    jsonshape()
        .arg("validate")
        .arg(&schema)
        .arg(&payload)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Validation failed"));
}

#[test]
fn validate_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_json(dir.path(), "schema.json", r#"{"type": "integer"}"#);
    let payload = write_json(dir.path(), "payload.json", "42");

    jsonshape()
        .arg("validate")
        .arg(&schema)
        .arg(&payload)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"valid":true}"#));
}

// === snapshot ===

#[test]
fn snapshot_missing_without_update_fails() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_json(dir.path(), "data.json", r#"{"a": 1}"#);

    jsonshape()
        .arg("snapshot")
        .arg(&data)
        .arg("--name")
        .arg("api.users")
        .arg("--dir")
        .arg(dir.path().join("__snapshots__"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn snapshot_update_creates_then_passes_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_json(dir.path(), "data.json", r#"{"a": 1}"#);
    let snapshots = dir.path().join("__snapshots__");

    jsonshape()
        .arg("snapshot")
        .arg(&data)
        .arg("--name")
        .arg("api.users")
        .arg("--dir")
        .arg(&snapshots)
        .arg("--update")
        .assert()
        .success()
        .stdout(predicate::str::contains("New schema `api.users` created."));

    assert!(snapshots.join("api.users.schema.json").exists());

    jsonshape()
        .arg("snapshot")
        .arg(&data)
        .arg("--name")
        .arg("api.users")
        .arg("--dir")
        .arg(&snapshots)
        .assert()
        .success()
        .stdout(predicate::str::contains("Schema `api.users` unchanged."));
}

#[test]
fn snapshot_incompatible_payload_fails_with_diff() {
    let dir = tempfile::tempdir().unwrap();
    let snapshots = dir.path().join("__snapshots__");
    let original = write_json(dir.path(), "original.json", r#"{"a": 1}"#);
    let drifted = write_json(dir.path(), "drifted.json", r#"{"a": 1, "b": 2}"#);

    jsonshape()
        .arg("snapshot")
        .arg(&original)
        .arg("--name")
        .arg("api.users")
        .arg("--dir")
        .arg(&snapshots)
        .arg("--update")
        .assert()
        .success();

    // The stored schema is closed, so the extra property both changes the
    // inferred schema and fails validation against the stored one.
    jsonshape()
        .arg("snapshot")
        .arg(&drifted)
        .arg("--name")
        .arg("api.users")
        .arg("--dir")
        .arg(&snapshots)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Validation failed for `api.users`"));
}

#[test]
fn snapshot_update_rewrites_and_prints_diff() {
    let dir = tempfile::tempdir().unwrap();
    let snapshots = dir.path().join("__snapshots__");
    let original = write_json(dir.path(), "original.json", r#"{"a": 1}"#);
    let drifted = write_json(dir.path(), "drifted.json", r#"{"a": "x"}"#);

    jsonshape()
        .arg("snapshot")
        .arg(&original)
        .arg("--name")
        .arg("api.users")
        .arg("--dir")
        .arg(&snapshots)
        .arg("--update")
        .assert()
        .success();

    jsonshape()
        .arg("snapshot")
        .arg(&drifted)
        .arg("--name")
        .arg("api.users")
        .arg("--dir")
        .arg(&snapshots)
        .arg("--update")
        .assert()
        .success()
        .stdout(predicate::str::contains("Schema `api.users` updated."))
        .stdout(predicate::str::contains(
            r#"r a.type: "integer" -> "string""#,
        ));
}
