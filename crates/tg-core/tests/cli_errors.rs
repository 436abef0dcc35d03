//! CLI tests for trendguard.
//!
//! These tests verify commands, payloads and exit codes. Every command runs
//! with model discovery pointed at an empty temp dir so that files on the
//! host never change the resolved model.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("test")
        .join("fixtures")
}

fn input(name: &str) -> String {
    fixtures().join("input").join(name).display().to_string()
}

fn model_fixture(name: &str) -> String {
    fixtures().join("config").join(name).display().to_string()
}

/// Get a Command for the trendguard binary with isolated model discovery.
fn trendguard() -> (Command, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let mut cmd = Command::cargo_bin("trendguard").expect("trendguard binary should exist");
    cmd.env_remove("TRENDGUARD_MODEL")
        .env_remove("TG_LOG")
        .env_remove("TG_LOG_FORMAT")
        .env("TRENDGUARD_CONFIG_DIR", dir.path())
        .env("XDG_CONFIG_HOME", dir.path());
    (cmd, dir)
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ============================================================================
// Argument Errors
// ============================================================================

mod invalid_arguments {
    use super::*;

    #[test]
    fn unknown_command_fails() {
        let (mut cmd, _dir) = trendguard();
        cmd.arg("nonexistent-command")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn unknown_config_subcommand_fails() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["config", "nonexistent"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn unknown_preset_fails() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["--preset", "seven_state", "config", "show"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn help_succeeds() {
        let (mut cmd, _dir) = trendguard();
        cmd.arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("analyze"));
    }

    #[test]
    fn unknown_terminal_state_fails() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["analyze", &input("trends.json"), "--terminal-state", "Bogus"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("Bogus"));
    }

    #[test]
    fn unknown_trend_name_fails() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["analyze", &input("trends.json"), "--trend", "nope"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("nope"));
    }

    #[test]
    fn unknown_schema_fails() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["config", "schema", "Bogus"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("ModelConfig"));
    }
}

// ============================================================================
// Decode
// ============================================================================

mod decode {
    use super::*;

    #[test]
    fn state_means_decode_in_lifecycle_order() {
        let (mut cmd, _dir) = trendguard();
        let output = cmd
            .args(["decode", &input("matrix.json")])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json = stdout_json(&output);
        let labels = &json["trends"][0]["labels"];
        assert_eq!(
            labels,
            &serde_json::json!(["Emerging", "Growth", "Peak", "Saturation", "Decline"])
        );
        assert_eq!(json["model"]["source"], "builtin default");
        assert!(json["run_id"].as_str().unwrap().starts_with("run-"));
    }

    #[test]
    fn summary_format_prints_phase_chain() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["decode", &input("matrix.json"), "-f", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "trend-0: Emerging → Growth → Peak → Saturation → Decline (5 points)",
            ));
    }

    #[test]
    fn reads_stdin() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["decode", "-", "-f", "summary"])
            .write_stdin("[[0.3, 0.1, 0.4], [0.8, 0.2, 0.8]]")
            .assert()
            .success()
            .stdout(predicate::str::contains("Emerging → Growth (2 points)"));
    }

    #[test]
    fn ragged_input_is_an_input_error() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["decode", &input("ragged.json")])
            .assert()
            .code(12)
            .stderr(predicate::str::contains("ERR_INPUT"));
    }

    #[test]
    fn missing_input_file_is_an_input_error() {
        let (mut cmd, dir) = trendguard();
        let missing = dir.path().join("missing.json");
        cmd.args(["decode", missing.to_str().unwrap()])
            .assert()
            .code(12);
    }

    #[test]
    fn malformed_json_is_an_input_error() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["decode", "-"])
            .write_stdin("{ not json")
            .assert()
            .code(12);
    }

    #[test]
    fn custom_model_file() {
        let (mut cmd, _dir) = trendguard();
        cmd.args([
            "--model",
            &model_fixture("valid_model.json"),
            "decode",
            "-",
            "-f",
            "summary",
        ])
        .write_stdin("[[0.8, 0.2], [0.2, 0.8]]")
        .assert()
        .success()
        .stdout(predicate::str::contains("Growth → Decline"));
    }
}

// ============================================================================
// Analyze
// ============================================================================

mod analyze {
    use super::*;

    #[test]
    fn decline_sets_exit_code_one() {
        let (mut cmd, _dir) = trendguard();
        let output = cmd
            .args(["analyze", &input("trends.json")])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));

        let json = stdout_json(&output);
        let summary = &json["summary"];
        assert_eq!(summary["total_trends_analyzed"], 2);
        assert_eq!(summary["trends_with_decline"], 1);
        assert_eq!(summary["skipped"][0]["name"], "too-short");

        let burnout = summary["reports"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["name"] == "burnout")
            .unwrap();
        assert_eq!(burnout["decline"]["index"], 4);
        assert_eq!(burnout["decline"]["state"], "Saturation");
    }

    #[test]
    fn healthy_trend_exits_clean() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["analyze", &input("growth_only.json"), "-f", "summary"])
            .assert()
            .code(0)
            .stdout(predicate::str::contains("steady-growth"))
            .stdout(predicate::str::contains("[ok]"));
    }

    #[test]
    fn trend_filter_selects_one() {
        let (mut cmd, _dir) = trendguard();
        cmd.args([
            "analyze",
            &input("trends.json"),
            "--trend",
            "steady-growth",
            "-f",
            "summary",
        ])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("1 analyzed, 0 with decline"));
    }

    #[test]
    fn min_points_zero_keeps_short_trends() {
        let (mut cmd, _dir) = trendguard();
        let output = cmd
            .args(["analyze", &input("trends.json"), "--min-points", "0"])
            .output()
            .unwrap();
        let json = stdout_json(&output);
        assert_eq!(json["summary"]["total_trends_analyzed"], 3);
        assert_eq!(json["summary"]["skipped"], serde_json::json!([]));
    }

    #[test]
    fn markdown_report() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["analyze", &input("trends.json"), "-f", "md"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("# Lifecycle Analysis"))
            .stdout(predicate::str::contains("Decline: **Saturation** at t=4"));
    }
}

// ============================================================================
// Config
// ============================================================================

mod config {
    use super::*;

    #[test]
    fn missing_model_file_is_a_config_error() {
        let (mut cmd, dir) = trendguard();
        let missing = dir.path().join("nope.json");
        cmd.args(["--model", missing.to_str().unwrap(), "config", "show"])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("ERR_CONFIG"));
    }

    #[test]
    fn model_in_config_dir_is_used() {
        let (mut cmd, dir) = trendguard();
        std::fs::copy(
            model_fixture("valid_model.json"),
            dir.path().join("model.json"),
        )
        .unwrap();
        let output = cmd.args(["config", "show"]).output().unwrap();
        assert!(output.status.success());
        let json = stdout_json(&output);
        assert_eq!(json["source"], "config directory");
        assert_eq!(json["model"]["name"], "two_phase");
    }

    #[test]
    fn preset_flag_selects_preset() {
        let (mut cmd, _dir) = trendguard();
        let output = cmd
            .args(["--preset", "three_state", "config", "show"])
            .output()
            .unwrap();
        let json = stdout_json(&output);
        assert_eq!(json["source"], "preset");
        assert_eq!(
            json["model"]["states"],
            serde_json::json!(["Growth", "Saturation", "Decline"])
        );
    }

    #[test]
    fn validate_accepts_good_file() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["config", "validate", &model_fixture("valid_model.json")])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"status\": \"valid\""));
    }

    #[test]
    fn validate_rejects_bad_files() {
        for name in [
            "invalid_model_duplicate_state.json",
            "invalid_model_bad_row_sum.json",
            "invalid_model_version.json",
        ] {
            let (mut cmd, _dir) = trendguard();
            cmd.args(["config", "validate", &model_fixture(name)])
                .assert()
                .code(11);
        }
    }

    #[test]
    fn presets_are_listed() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["config", "presets", "-f", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("five_state_lifecycle"))
            .stdout(predicate::str::contains("three_state_default"));
    }

    #[test]
    fn schema_prints_json_schema() {
        let (mut cmd, _dir) = trendguard();
        let output = cmd
            .args(["config", "schema", "ModelConfig"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let json = stdout_json(&output);
        assert!(json["properties"]["emissions"].is_object());
    }

    #[test]
    fn version_command() {
        let (mut cmd, _dir) = trendguard();
        cmd.args(["version", "-f", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("trendguard "));
    }
}
