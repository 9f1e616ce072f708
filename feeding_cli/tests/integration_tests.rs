//! Integration tests for the neofeed binary.
//!
//! These tests verify end-to-end behavior including:
//! - Schedule calculation and display
//! - Admin unlock flow and stats gating
//! - Suggestion board workflow
//! - Visit logging and CSV rollup

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("neofeed"))
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Newborn feeding volume scheduler"));
}

#[test]
fn test_calc_resident_schedule() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--weight")
        .arg("3")
        .arg("--rate")
        .arg("150")
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily total:  450 mL"))
        .stdout(predicate::str::contains("07:00    55 mL"))
        .stdout(predicate::str::contains("05:00    60 mL"));

    // The invocation was recorded as a visit
    let log_path = data_dir.join("log/visits.wal");
    let log_content = fs::read_to_string(&log_path).expect("Failed to read visit log");
    assert_eq!(log_content.lines().count(), 1);

    let record: serde_json::Value =
        serde_json::from_str(log_content.lines().next().unwrap()).unwrap();
    assert_eq!(record["source"], "calc");
    assert!(record["id"].is_string());
}

#[test]
fn test_calc_admitted_schedule_is_pro_rated() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--weight")
        .arg("2")
        .arg("--rate")
        .arg("120")
        .arg("--admitted")
        .arg("--hour")
        .arg("14")
        .arg("--minute")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily total:  240 mL"))
        .stdout(predicate::str::contains("To be given:  160 mL"))
        .stdout(predicate::str::contains("14:00"))
        .stdout(predicate::str::contains("admission"));
}

#[test]
fn test_calc_missing_rate_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--weight")
        .arg("3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("weight and rate required"));
}

#[test]
fn test_calc_admitted_without_time_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--weight")
        .arg("3")
        .arg("--rate")
        .arg("150")
        .arg("--admitted")
        .assert()
        .failure()
        .stderr(predicate::str::contains("admission time required"));
}

#[test]
fn test_dry_run_does_not_log() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--weight")
        .arg("3")
        .arg("--rate")
        .arg("150")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!data_dir.join("log/visits.wal").exists());
}

#[test]
fn test_stats_requires_admin_mode() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("only shown in admin mode"));
}

#[test]
fn test_sentinel_input_unlocks_admin_mode() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--weight")
        .arg("99.99")
        .arg("--rate")
        .arg("1725")
        .assert()
        .success()
        .stdout(predicate::str::contains("Admin mode enabled"));

    // The unlock itself is not a calculation and leaves no visit
    assert!(!data_dir.join("log/visits.wal").exists());

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Visitors today:  0"))
        .stdout(predicate::str::contains("Visitors total:  0"));

    // Locking returns stats to the gated message
    cli()
        .arg("lock")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Admin mode disabled"));

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("only shown in admin mode"));
}

#[test]
fn test_sentinel_for_admitted_patient_computes_normally() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--weight")
        .arg("99.99")
        .arg("--rate")
        .arg("1725")
        .arg("--admitted")
        .arg("--hour")
        .arg("14")
        .arg("--minute")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("NEWBORN FEEDING SCHEDULE"));
}

#[test]
fn test_board_post_and_list() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("board")
        .arg("post")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--title")
        .arg("Bigger buttons")
        .arg("--content")
        .arg("The calc button is hard to hit on mobile.")
        .assert()
        .success()
        .stdout(predicate::str::contains("Posted suggestion"));

    cli()
        .arg("board")
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bigger buttons"))
        .stdout(predicate::str::contains("(0 replies)"));
}

#[test]
fn test_board_show_and_comment() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let output = cli()
        .arg("board")
        .arg("post")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--title")
        .arg("Night colors")
        .arg("--content")
        .arg("Dim the night feeds.")
        .output()
        .expect("Failed to run post");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let id = stdout
        .trim()
        .rsplit(' ')
        .next()
        .expect("Post output should end with the id");

    cli()
        .arg("board")
        .arg("comment")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg(id)
        .arg("--text")
        .arg("Good idea, will do.")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added reply"));

    cli()
        .arg("board")
        .arg("show")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg(id)
        .assert()
        .success()
        .stdout(predicate::str::contains("Night colors"))
        .stdout(predicate::str::contains("Dim the night feeds."))
        .stdout(predicate::str::contains("Good idea, will do."));
}

#[test]
fn test_board_delete_requires_admin() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let output = cli()
        .arg("board")
        .arg("post")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--title")
        .arg("To be removed")
        .arg("--content")
        .arg("Delete me.")
        .output()
        .expect("Failed to run post");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let id = stdout.trim().rsplit(' ').next().unwrap().to_string();

    cli()
        .arg("board")
        .arg("delete")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg(&id)
        .assert()
        .failure()
        .stderr(predicate::str::contains("admin mode required"));

    // Unlock admin mode and retry
    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--weight")
        .arg("99.99")
        .arg("--rate")
        .arg("1725")
        .assert()
        .success();

    cli()
        .arg("board")
        .arg("delete")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg(&id)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted suggestion"));

    cli()
        .arg("board")
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No suggestions yet"));
}

#[test]
fn test_rollup_creates_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    for _ in 0..3 {
        cli()
            .arg("calc")
            .arg("--data-dir")
            .arg(&data_dir)
            .arg("--weight")
            .arg("3")
            .arg("--rate")
            .arg("150")
            .assert()
            .success();
    }

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 3 visits"));

    assert!(data_dir.join("visits.csv").exists());
    assert!(!data_dir.join("log/visits.wal").exists());
    assert!(data_dir.join("log/visits.wal.processed").exists());

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_rollup_cleanup_removes_processed_logs() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--weight")
        .arg("3")
        .arg("--rate")
        .arg("150")
        .assert()
        .success();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    // A second batch plus cleanup clears the processed file from the first
    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--weight")
        .arg("3")
        .arg("--rate")
        .arg("150")
        .assert()
        .success();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned up"));

    assert!(!data_dir.join("log/visits.wal.processed").exists());

    // Stats still see the archived visits
    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--weight")
        .arg("99.99")
        .arg("--rate")
        .arg("1725")
        .assert()
        .success()
        .stdout(predicate::str::contains("Visitors total:  2"));
}
