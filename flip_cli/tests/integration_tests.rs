//! Integration tests for the flip binary.
//!
//! These tests verify end-to-end behavior including:
//! - Deck seeding and review workflow
//! - Session logging and CSV export
//! - Status persistence across invocations

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
    Command::new(assert_cmd::cargo::cargo_bin!("flip"))
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Swipe-based spaced repetition flashcards",
        ));
}

#[test]
fn test_seed_creates_deck_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("seed")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created sample deck"));

    assert!(data_dir.join("decks/french_starter.json").exists());
}

#[test]
fn test_seed_is_idempotent() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli().arg("seed").arg("--data-dir").arg(&data_dir).assert().success();
    cli()
        .arg("seed")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_review_without_deck_suggests_seed() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("review")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--script")
        .arg("r")
        .assert()
        .failure()
        .stderr(predicate::str::contains("flip seed"));
}

#[test]
fn test_scripted_review_logs_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli().arg("seed").arg("--data-dir").arg(&data_dir).assert().success();

    // Swipe all ten sample cards right
    cli()
        .arg("review")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("rrrrrrrrrr")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session logged"));

    let log_content =
        fs::read_to_string(data_dir.join("sessions.jsonl")).expect("Failed to read session log");
    assert_eq!(log_content.lines().count(), 1);
    assert!(log_content.contains("\"learned_count\":10"));
}

#[test]
fn test_learned_cards_stop_being_due() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli().arg("seed").arg("--data-dir").arg(&data_dir).assert().success();

    cli()
        .arg("review")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("rrrrrrrrrr")
        .assert()
        .success();

    // Everything learned: a second review finds nothing due
    cli()
        .arg("review")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("r")
        .assert()
        .success()
        .stdout(predicate::str::contains("No cards due"));
}

#[test]
fn test_left_swipes_leave_cards_learning() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli().arg("seed").arg("--data-dir").arg(&data_dir).assert().success();

    cli()
        .arg("review")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("rrrrrlllll")
        .assert()
        .success();

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("learned:  5"))
        .stdout(predicate::str::contains("learning: 5"));
}

#[test]
fn test_chapter_scoped_review() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli().arg("seed").arg("--data-dir").arg(&data_dir).assert().success();

    cli()
        .arg("review")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--chapter")
        .arg("verbs")
        .arg("--script")
        .arg("rrrrr")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 cards due"));

    // The other chapter is untouched
    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("new:      5"));
}

#[test]
fn test_undo_in_script_rewinds_a_swipe() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli().arg("seed").arg("--data-dir").arg(&data_dir).assert().success();

    // Ten rights then an undo: undo rewinds the cursor, but the status
    // written by the undone swipe stays in the store, so the summary
    // still reports ten learned with nine counted swipes
    cli()
        .arg("review")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("rrrrrrrrrru")
        .assert()
        .success()
        .stdout(predicate::str::contains("Learned:  10"))
        .stdout(predicate::str::contains("Swipes:   9"));
}

#[test]
fn test_export_rolls_log_to_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli().arg("seed").arg("--data-dir").arg(&data_dir).assert().success();
    cli()
        .arg("review")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("rrrrrrrrrr")
        .assert()
        .success();

    cli()
        .arg("export")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 sessions"));

    assert!(data_dir.join("sessions.csv").exists());
    assert!(!data_dir.join("sessions.jsonl").exists());

    let csv = fs::read_to_string(data_dir.join("sessions.csv")).unwrap();
    assert!(csv.contains("french_starter"));
}

#[test]
fn test_export_cleanup_removes_processed_logs() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli().arg("seed").arg("--data-dir").arg(&data_dir).assert().success();
    cli()
        .arg("review")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("rrrrrrrrrr")
        .assert()
        .success();

    cli()
        .arg("export")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--cleanup")
        .assert()
        .success();

    assert!(!data_dir.join("sessions.jsonl.processed").exists());
}

#[test]
fn test_export_with_no_log() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("export")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to export"));
}

#[test]
fn test_corrupted_deck_fails_cleanly() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("decks")).unwrap();
    fs::write(data_dir.join("decks/bad.json"), "{ not json }").unwrap();

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Corrupted deck file"));
}
