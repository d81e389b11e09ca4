//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::Command;

fn schemafixture_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_schemafixture"))
}

fn schemas_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("schemas");
    path
}

// ============================================================================
// Generate Command Tests
// ============================================================================

#[test]
fn test_cli_generate_named_schema() {
    let output = Command::new(schemafixture_bin())
        .args(["generate", "library", "--seed", "4", "--count", "3", "--schemas"])
        .arg(schemas_dir())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "generate should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let values: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(values.len(), 3);
    assert!(values.iter().all(|v| v["books"].is_array()));
}

#[test]
fn test_cli_generate_is_reproducible() {
    let run = || {
        Command::new(schemafixture_bin())
            .args(["generate", "string", "--seed", "11", "--count", "5"])
            .output()
            .expect("Failed to execute command")
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_cli_generate_schema_file() {
    let output = Command::new(schemafixture_bin())
        .args(["generate", "--seed", "1"])
        .arg(schemas_dir().join("small_integer.json"))
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let value: i64 = String::from_utf8_lossy(&output.stdout).trim().parse().unwrap();
    assert!((0..=9).contains(&value));
}

#[test]
fn test_cli_generate_unknown_type() {
    let output = Command::new(schemafixture_bin())
        .args(["generate", "magazine"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("magazine"), "should name the unresolved type");
}

// ============================================================================
// Invalid Command Tests
// ============================================================================

#[test]
fn test_cli_invalid_values() {
    let output = Command::new(schemafixture_bin())
        .args(["invalid", "small_integer", "--seed", "2", "--schemas"])
        .arg(schemas_dir())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line == "-7"));
    assert!(stdout.lines().any(|line| line == "16"));
}

// ============================================================================
// Validate Command Tests
// ============================================================================

#[test]
fn test_cli_validate() {
    let dir = tempfile::tempdir().unwrap();
    let valid = dir.path().join("valid.json");
    let invalid = dir.path().join("invalid.json");
    std::fs::write(&valid, r#"{"id": 3, "title": "Dune", "isbn": "978-0441013593"}"#).unwrap();
    std::fs::write(&invalid, r#"{"id": 3, "title": "Dune", "isbn": "0441013593"}"#).unwrap();

    let output = Command::new(schemafixture_bin())
        .args(["validate", "book"])
        .arg(&valid)
        .arg("--schemas")
        .arg(schemas_dir())
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "valid document should pass");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Document is valid"));

    let output = Command::new(schemafixture_bin())
        .args(["validate", "book"])
        .arg(&invalid)
        .arg("--schemas")
        .arg(schemas_dir())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("is an invalid isbn value"));
}

#[test]
fn test_cli_validate_missing_required() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("book.json");
    std::fs::write(&file, r#"{"title": "Dune"}"#).unwrap();

    let output = Command::new(schemafixture_bin())
        .args(["validate", "book"])
        .arg(&file)
        .arg("--schemas")
        .arg(schemas_dir())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));
}

// ============================================================================
// Random Schema Command Tests
// ============================================================================

#[test]
fn test_cli_random_schema() {
    let output = Command::new(schemafixture_bin())
        .args(["random-schema", "--seed", "8"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["name"].as_str().unwrap().len(), 15);
}
