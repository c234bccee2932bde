//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn boxoffice(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_boxoffice"))
        .args(args)
        .env_remove("BOXOFFICE_MANIFEST")
        .env_remove("TMDB_API_KEY")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

fn write_artifacts(dir: &Path) {
    std::fs::write(
        dir.join("columns.json"),
        r#"{"columns": ["budget", "runtime", "main_genre_Action", "main_genre_Drama"]}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("model.json"),
        r#"{"coefficients": [2.0, 0.0, 1000.0, 0.0], "intercept": 10.0}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("record.json"),
        r#"{"title": "Heat", "budget": 100, "runtime": 170, "genres": [{"name": "Action"}], "main_company": "Forward Pass"}"#,
    )
    .unwrap();
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = boxoffice(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Box Office Predictor"), "Should show app name");
    for command in ["predict", "features", "schema", "collect", "discover"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
    assert!(stdout.contains("--format"), "Should show format option");
}

#[test]
fn test_cli_version() {
    let output = boxoffice(&["--version"]);
    assert!(output.status.success(), "CLI version should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("boxoffice"));
}

#[test]
fn test_predict_help() {
    let output = boxoffice(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for option in ["--record", "--title", "--manifest", "--model", "--schema"] {
        assert!(stdout.contains(option), "Should show {} option", option);
    }
    assert!(stdout.contains("BOXOFFICE_MANIFEST"), "Should show env var");
}

#[test]
fn test_predict_requires_input() {
    let output = boxoffice(&["predict", "--manifest", "manifest.json"]);
    assert!(!output.status.success(), "Missing record should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("required") || stderr.contains("error"));
}

#[test]
fn test_predict_from_record_file() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let path = |name: &str| dir.path().join(name).to_string_lossy().into_owned();

    let output = boxoffice(&[
        "predict",
        "--record",
        &path("record.json"),
        "--model",
        &path("model.json"),
        "--schema",
        &path("columns.json"),
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["prediction"], 1210.0);
    assert_eq!(body["model_version"], "unversioned");
}

#[test]
fn test_predict_reports_missing_model() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let record = dir.path().join("record.json");

    let output = boxoffice(&[
        "predict",
        "--record",
        record.to_str().unwrap(),
        "--manifest",
        "/nonexistent/manifest.json",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("manifest"));
}

#[test]
fn test_features_json_lists_schema_columns() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path());
    let record = dir.path().join("record.json");
    let schema = dir.path().join("columns.json");

    let output = boxoffice(&[
        "-f",
        "json",
        "features",
        "--record",
        record.to_str().unwrap(),
        "--schema",
        schema.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        body["columns"],
        serde_json::json!(["budget", "runtime", "main_genre_Action", "main_genre_Drama"])
    );
    assert_eq!(body["values"], serde_json::json!([100.0, 170.0, 1.0, 0.0]));
    assert_eq!(body["dropped"], serde_json::json!(["main_company_Forward Pass"]));
    assert_eq!(
        body["active"],
        serde_json::json!([
            {"column": "budget", "value": 100.0},
            {"column": "runtime", "value": 170.0},
            {"column": "main_genre_Action", "value": 1.0}
        ])
    );
}

#[test]
fn test_collect_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    let titles = dir.path().join("titles.txt");
    std::fs::write(&titles, "Heat\n").unwrap();

    let output = boxoffice(&[
        "collect",
        "--titles",
        titles.to_str().unwrap(),
        "--output",
        dir.path().join("records.jsonl").to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("TMDB_API_KEY"));
}

#[test]
fn test_invalid_command() {
    let output = boxoffice(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error") || stderr.contains("invalid"));
}
