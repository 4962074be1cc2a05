//! Integration tests for JSON output, dry-run mode and the cache command

use std::path::Path;
use std::process::{Command, Output};

const ENV_VARS: [&str; 9] = [
    "CAUDATA_GENUS",
    "CAUDATA_SPECIES",
    "CAUDATA_SYNONYMS",
    "CAUDATA_RECORD_LIMIT",
    "CAUDATA_ZOOM",
    "CAUDATA_GRID_RESOLUTION",
    "CAUDATA_CACHE_DIR",
    "CAUDATA_OUTPUT_DIR",
    "CAUDATA_BOUNDARY_FILE",
];

/// Run the binary in `dir` with a clean environment
fn caudata(dir: &Path, args: &[&str], env: &[(&str, &Path)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_caudata"));
    command.current_dir(dir).args(args);
    for var in ENV_VARS {
        command.env_remove(var);
    }
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_config_json_lists_sources() {
    let dir = tempfile::tempdir().unwrap();
    let output = caudata(dir.path(), &["config", "--json"], &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "success");
    let rows = parsed["data"].as_array().unwrap();
    let species = rows.iter().find(|row| row["key"] == "species").unwrap();
    assert_eq!(species["value"], "sierrae");
    assert_eq!(species["source"], "Default");

    let keys: Vec<&str> = rows.iter().filter_map(|row| row["key"].as_str()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_config_reports_cli_and_file_sources() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("caudata.toml"), "record_limit = 250\n").unwrap();

    let output = caudata(dir.path(), &["config", "--json"], &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let parsed = stdout_json(&output);
    let rows = parsed["data"].as_array().unwrap();
    let limit = rows.iter().find(|row| row["key"] == "record_limit").unwrap();
    assert_eq!(limit["value"], "250");
    assert_eq!(limit["source"], "File");
}

#[test]
fn test_dry_run_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");
    let cache = dir.path().join("cache");

    let output = caudata(
        dir.path(),
        &["run", "--dry-run", "--json", "-o", out.to_str().unwrap()],
        &[("CAUDATA_CACHE_DIR", &cache)],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let parsed = stdout_json(&output);
    assert_eq!(parsed["data"]["dry_run"], true);
    let actions = parsed["data"]["planned_actions"].as_array().unwrap();
    assert_eq!(actions[0]["action_type"], "fetch_records");
    assert_eq!(actions[1]["action_type"], "fetch_tiles");
    let written: Vec<&str> = actions.iter().filter_map(|a| a["description"].as_str()).collect();
    for file in ["report.md", "month_histogram.svg", "uncertainty_by_year.svg", "render_oblique.png"] {
        assert!(written.iter().any(|d| d.ends_with(file)), "{} missing from the plan", file);
    }
    assert_eq!(parsed["data"]["summary"]["files_written"], 14);

    assert!(!out.exists(), "dry run must not create the output directory");
    assert!(!cache.exists(), "dry run must not touch the cache");
}

#[test]
fn test_cache_status_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");
    std::fs::create_dir_all(cache.join("gbif")).unwrap();
    std::fs::write(cache.join("gbif").join("page-0.json"), b"{\"results\": []}").unwrap();

    let status = caudata(dir.path(), &["cache", "status", "--json"], &[("CAUDATA_CACHE_DIR", &cache)]);
    assert!(status.status.success(), "stderr: {}", String::from_utf8_lossy(&status.stderr));
    let parsed = stdout_json(&status);
    assert_eq!(parsed["data"]["entries"], 1);
    assert_eq!(parsed["data"]["bytes"], 15);

    let dry = caudata(
        dir.path(),
        &["cache", "clear", "--dry-run", "--json"],
        &[("CAUDATA_CACHE_DIR", &cache)],
    );
    assert!(dry.status.success());
    assert!(cache.join("gbif").join("page-0.json").exists());

    let clear = caudata(dir.path(), &["cache", "clear", "--json"], &[("CAUDATA_CACHE_DIR", &cache)]);
    assert!(clear.status.success(), "stderr: {}", String::from_utf8_lossy(&clear.stderr));
    assert_eq!(stdout_json(&clear)["data"]["removed"], 1);
}

#[test]
fn test_invalid_zoom_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = caudata(dir.path(), &["terrain", "--zoom", "40", "--dry-run"], &[]);
    assert!(!output.status.success());
}
