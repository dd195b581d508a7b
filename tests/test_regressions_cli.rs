use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_logsieve")
}

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).expect("failed to write test file");
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .arg("--color")
        .arg("never")
        .args(args)
        .env_remove("LOGSIEVE_CONFIG")
        .output()
        .expect("command should run")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

const APP_LOG: &str = "\
2026-01-01 10:00:00 INFO service starting
2026-01-01 10:00:01 ERROR request failed
    at handler.rs:42
2026-01-01 10:00:02 INFO healthcheck ok
2026-01-01 10:00:03 WARN slow db
";

#[test]
fn test_filter_out_hides_matching_lines() {
    let dir = tempdir().expect("temp dir");
    let log = dir.path().join("app.log");
    write_file(&log, APP_LOG);

    let stdout = stdout_of(&run(&[
        "view",
        log.to_str().expect("utf8 path"),
        "-x",
        "healthcheck",
    ]));

    assert!(stdout.contains("service starting"));
    assert!(!stdout.contains("healthcheck"), "got:\n{stdout}");
    assert_eq!(stdout.lines().count(), 4);
}

#[test]
fn test_message_start_keeps_continuation_lines() {
    let dir = tempdir().expect("temp dir");
    let log = dir.path().join("app.log");
    write_file(&log, APP_LOG);

    let stdout = stdout_of(&run(&[
        "view",
        log.to_str().expect("utf8 path"),
        "-i",
        "error",
        "-m",
        r"^\d{4}-",
    ]));

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "got:\n{stdout}");
    assert!(lines[0].contains("request failed"));
    assert!(lines[1].contains("at handler.rs:42"));
    assert!(lines[1].contains("3:"), "line numbers are 1-based");
}

#[test]
fn test_filters_table_reports_hits() {
    let dir = tempdir().expect("temp dir");
    let log = dir.path().join("app.log");
    write_file(&log, APP_LOG);

    let stdout = stdout_of(&run(&[
        "filters",
        log.to_str().expect("utf8 path"),
        "-x",
        "info",
    ]));

    assert!(stdout.contains("info"));
    assert!(stdout.contains("OUT"));
    assert!(stdout.contains("2 of 5 lines hidden"), "got:\n{stdout}");
}

#[test]
fn test_filters_json_output() {
    let dir = tempdir().expect("temp dir");
    let log = dir.path().join("app.log");
    write_file(&log, APP_LOG);

    let stdout = stdout_of(&run(&[
        "-F",
        "json",
        "filters",
        log.to_str().expect("utf8 path"),
        "-i",
        "warn",
    ]));

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let filters = value.as_array().expect("array of filters");
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0]["kind"], "filter-in");
    assert_eq!(filters[0]["hits"], 1);
    assert_eq!(filters[0]["index"], 0);
}

#[test]
fn test_config_filters_apply_before_command_line() {
    let dir = tempdir().expect("temp dir");
    let log = dir.path().join("app.log");
    let config = dir.path().join("logsieve.toml");
    write_file(&log, APP_LOG);
    write_file(
        &config,
        r#"
profile_name = "ops"

[messages]
start_pattern = '^\d{4}-'

[filters]
commands = ["filter-out healthcheck", "filter-out db"]

[output]
line_numbers = false
"#,
    );

    let stdout = stdout_of(&run(&[
        "-c",
        config.to_str().expect("utf8 path"),
        "view",
        log.to_str().expect("utf8 path"),
    ]));

    assert_eq!(
        stdout.lines().map(str::trim_start).collect::<Vec<_>>(),
        vec![
            "2026-01-01 10:00:00 INFO service starting",
            "2026-01-01 10:00:01 ERROR request failed",
            "at handler.rs:42",
        ]
    );
}

#[test]
fn test_export_replays_through_script() {
    let dir = tempdir().expect("temp dir");
    let log = dir.path().join("app.log");
    let script = dir.path().join("filters.txt");
    write_file(&log, APP_LOG);

    let exported = stdout_of(&run(&["export", "-i", "error|warn", "-x", "db"]));
    assert_eq!(exported, "filter-in error|warn\nfilter-out db\n");

    write_file(&script, &exported);
    let stdout = stdout_of(&run(&[
        "view",
        log.to_str().expect("utf8 path"),
        "-s",
        script.to_str().expect("utf8 path"),
    ]));

    assert!(stdout.contains("request failed"));
    assert!(!stdout.contains("slow db"));
    assert!(!stdout.contains("service starting"));
}

#[test]
fn test_export_keeps_disabled_filters() {
    let dir = tempdir().expect("temp dir");
    let script = dir.path().join("filters.txt");
    write_file(
        &script,
        "# noisy lines\nfilter-out debug\n\n:filter-in error\ndisable-filter debug\n",
    );

    let stdout = stdout_of(&run(&["export", "-s", script.to_str().expect("utf8 path")]));
    assert_eq!(
        stdout,
        "filter-out debug\ndisable-filter debug\nfilter-in error\n"
    );
}

#[test]
fn test_marks_and_marked_only() {
    let dir = tempdir().expect("temp dir");
    let log = dir.path().join("app.log");
    write_file(&log, APP_LOG);

    let stdout = stdout_of(&run(&[
        "-F",
        "json",
        "view",
        log.to_str().expect("utf8 path"),
        "-k",
        "4",
        "-g",
        "slow",
        "--marked-only",
    ]));

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let lines = value["lines"].as_array().expect("lines array");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["line"], 4);
    assert_eq!(lines[0]["marks"][0], "user");
    assert_eq!(lines[1]["line"], 5);
    assert_eq!(lines[1]["marks"][0], "search");
    assert_eq!(value["total_lines"], 5);
}

#[test]
fn test_invalid_pattern_fails() {
    let dir = tempdir().expect("temp dir");
    let log = dir.path().join("app.log");
    write_file(&log, APP_LOG);

    let output = run(&["view", log.to_str().expect("utf8 path"), "-i", "error("]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error("), "stderr: {stderr}");
}

#[test]
fn test_mark_out_of_range_fails() {
    let dir = tempdir().expect("temp dir");
    let log = dir.path().join("app.log");
    write_file(&log, APP_LOG);

    let output = run(&["view", log.to_str().expect("utf8 path"), "-k", "99"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("out of range"));
}

#[test]
fn test_missing_log_file_fails() {
    let dir = tempdir().expect("temp dir");
    let missing = dir.path().join("missing.log");

    let output = run(&["view", missing.to_str().expect("utf8 path")]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read log file"));
}

#[test]
fn test_first_line_of_each_file_starts_a_message() {
    let dir = tempdir().expect("temp dir");
    let one = dir.path().join("one.log");
    let two = dir.path().join("two.log");
    write_file(&one, "10: INFO a\n11: ERROR b\n");
    write_file(&two, "    orphan line from file two\n12: INFO c\n");

    let stdout = stdout_of(&run(&[
        "view",
        "-m",
        r"^\d{2}:",
        "-i",
        "error",
        one.to_str().expect("utf8 path"),
        two.to_str().expect("utf8 path"),
    ]));

    assert!(stdout.contains("11: ERROR b"));
    assert!(!stdout.contains("orphan line"), "got:\n{stdout}");
    assert_eq!(stdout.lines().count(), 1);
}
