use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn recruitiq(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("recruitiq").unwrap();
    cmd.current_dir(dir.path())
        .env("RECRUITIQ_PROVIDER", "noop")
        .env("NO_COLOR", "1")
        .env_remove("GOOGLE_API_KEY")
        .env_remove("RECRUITIQ_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_feedback_warns_without_calling_model() {
    let dir = tempfile::tempdir().unwrap();
    recruitiq(&dir)
        .arg("feedback")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Please provide feedback through text area or file upload.",
        ));
}

#[test]
fn blank_text_counts_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    recruitiq(&dir)
        .args(["feedback", "--text", "   "])
        .assert()
        .code(2);
}

#[test]
fn noop_provider_reports_neutral_defaults() {
    let dir = tempfile::tempdir().unwrap();
    recruitiq(&dir)
        .args(["feedback", "--text", "I feel overwhelmed by my workload."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sentiment Analysis Report:"))
        .stdout(predicate::str::contains("Sentiment Score: 50 (neutral, #FFC107)"))
        .stdout(predicate::str::contains("Overall Sentiment: Unknown"));
}

#[test]
fn json_output_and_saved_report_from_text_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("exit-interview.txt"), "Great team, poor pay.").unwrap();

    let output = recruitiq(&dir)
        .args([
            "--format",
            "json",
            "feedback",
            "--file",
            "exit-interview.txt",
            "--save-default",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["kind"], "feedback");
    assert_eq!(value["sentiment_score"], 50);
    assert_eq!(value["sentiment_label"], "Unknown");
    assert_eq!(value["label_color"], "default");

    let saved = fs::read_to_string(dir.path().join("sentiment_analysis.txt")).unwrap();
    assert_eq!(value["report"], saved.as_str());
}

#[test]
fn html_fragment_is_written() {
    let dir = tempfile::tempdir().unwrap();
    recruitiq(&dir)
        .args(["feedback", "--text", "ok", "--html", "report.html"])
        .assert()
        .success();
    let html = fs::read_to_string(dir.path().join("report.html")).unwrap();
    assert!(html.starts_with("<div class='result-box'>"));
    assert!(html.contains("<br>"));
    assert!(!html.contains('\n'));
}

#[test]
fn unsupported_document_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.pdf"), "%PDF-1.7").unwrap();
    recruitiq(&dir)
        .args(["feedback", "--file", "notes.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported document type"));
}

#[test]
fn gemini_without_api_key_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    recruitiq(&dir)
        .env("RECRUITIQ_PROVIDER", "gemini")
        .args(["feedback", "--text", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOOGLE_API_KEY"));
}

#[test]
fn config_file_selects_provider() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("recruitiq.toml"),
        "[model]\nprovider = \"noop\"\nmodel = \"gemini-1.5-flash\"\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("recruitiq").unwrap();
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("RECRUITIQ_PROVIDER")
        .env_remove("GOOGLE_API_KEY")
        .args(["--config", "recruitiq.toml", "feedback", "--text", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall Sentiment: Unknown"));
}

#[test]
fn config_file_fills_blank_environment_values() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("recruitiq.toml"), "[model]\nprovider = \"noop\"\n").unwrap();

    let mut cmd = Command::cargo_bin("recruitiq").unwrap();
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env("RECRUITIQ_PROVIDER", "")
        .env_remove("GOOGLE_API_KEY")
        .args(["--config", "recruitiq.toml", "feedback", "--text", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sentiment Score: 50 (neutral, #FFC107)"));
}

#[test]
fn save_writes_to_given_path() {
    let dir = tempfile::tempdir().unwrap();
    recruitiq(&dir)
        .args(["--save", "notes.txt", "feedback", "--text", "hello"])
        .assert()
        .success();
    let saved = fs::read_to_string(dir.path().join("notes.txt")).unwrap();
    assert!(saved.contains("received 2 content part(s)"));
    assert!(!dir.path().join("sentiment_analysis.txt").exists());
}
