//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::Path;

use assert_cmd::Command;
use listing_qa_test_support::SyntheticImageBuilder;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the user's config, data dir and API key.
fn listing_qa(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("listing-qa").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("GROQ_API_KEY");
    cmd
}

fn photo_dir(home: &TempDir) -> std::path::PathBuf {
    let dir = home.path().join("photos");
    std::fs::create_dir_all(&dir).unwrap();
    SyntheticImageBuilder::write_file(&dir, "strawberry.png", &SyntheticImageBuilder::product_shot())
        .unwrap();
    dir
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// === Missing/Invalid Path Tests ===

#[test]
fn test_missing_path_shows_error() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No paths specified"));
}

#[test]
fn test_nonexistent_path_warns_but_succeeds() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .arg("/nonexistent/path/to/strawberry.jpg")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("does not exist").or(predicate::str::contains("no .jpg")));
}

#[test]
fn test_empty_directory() {
    let home = tempfile::tempdir().unwrap();
    let empty = home.path().join("empty");
    std::fs::create_dir_all(&empty).unwrap();

    listing_qa(&home)
        .arg(arg(&empty))
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_unsupported_files_are_ignored() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("docs");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.join("scan.tiff"), "II*").unwrap();

    listing_qa(&home).arg(arg(&dir)).assert().code(0);
}

// === Classifier Availability ===

#[test]
fn test_missing_classifier_is_fatal() {
    let home = tempfile::tempdir().unwrap();
    let photos = photo_dir(&home);

    listing_qa(&home)
        .arg(arg(&photos))
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("subject classifier unavailable")
                .and(predicate::str::contains("listing-qa models fetch")),
        );
}

#[test]
fn test_models_dir_flag_is_used() {
    let home = tempfile::tempdir().unwrap();
    let photos = photo_dir(&home);
    let models = home.path().join("custom-models");

    listing_qa(&home)
        .arg(arg(&photos))
        .arg("--models-dir")
        .arg(arg(&models))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("custom-models"));
}

#[test]
fn test_corrupt_weights_are_fatal() {
    let home = tempfile::tempdir().unwrap();
    let photos = photo_dir(&home);
    let models = home.path().join("models");
    std::fs::create_dir_all(&models).unwrap();
    std::fs::write(models.join("mobilenetv4_conv_small.safetensors"), b"garbage").unwrap();
    std::fs::write(models.join("imagenet_classes.txt"), "tench\ngoldfish\n").unwrap();

    listing_qa(&home)
        .arg(arg(&photos))
        .arg("--models-dir")
        .arg(arg(&models))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("subject classifier unavailable"));
}

#[test]
fn test_missing_ocr_command_warns_once() {
    let home = tempfile::tempdir().unwrap();
    let photos = photo_dir(&home);
    SyntheticImageBuilder::write_file(&photos, "mug.png", &SyntheticImageBuilder::product_shot())
        .unwrap();
    std::fs::write(
        home.path().join(".listing-qa.toml"),
        "[ocr]\ncommand = \"listing-qa-no-such-ocr\"\n",
    )
    .unwrap();

    let output = listing_qa(&home).arg(arg(&photos)).output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr
            .matches("warning: OCR command `listing-qa-no-such-ocr` could not be started")
            .count(),
        1
    );
}

// === Value Validation Tests ===

#[test]
fn test_blur_threshold_negative_rejected() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .args(["--blur-threshold=-5", "photos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn test_blur_threshold_non_numeric_rejected() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .args(["--blur-threshold", "sharp", "photos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid number"));
}

#[test]
fn test_clusters_out_of_range_rejected() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .args(["--clusters", "0", "photos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1..=64"));
}

#[test]
fn test_top_k_zero_rejected() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .args(["--top-k", "0", "photos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn test_timeout_zero_rejected() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .args(["--timeout", "0", "photos"])
        .assert()
        .failure();
}

#[test]
fn test_valid_values_accepted() {
    let home = tempfile::tempdir().unwrap();
    let empty = home.path().join("empty");
    std::fs::create_dir_all(&empty).unwrap();

    listing_qa(&home)
        .args([
            "--blur-threshold",
            "0",
            "--clusters",
            "64",
            "--top-k",
            "5",
            "--seed",
            "42",
            "--timeout",
            "5",
        ])
        .arg(arg(&empty))
        .assert()
        .code(0);
}

// === Help/Version ===

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--output-dir")
                .and(predicate::str::contains("--api-key"))
                .and(predicate::str::contains("--blur-threshold"))
                .and(predicate::str::contains("models")),
        );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("listing-qa"));
}

#[test]
fn test_check_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let photos = photo_dir(&home);

    listing_qa(&home)
        .arg("check")
        .arg(arg(&photos))
        .arg("--quiet")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("subject classifier unavailable"));
}

#[test]
fn test_verbosity_flags() {
    let home = tempfile::tempdir().unwrap();
    let empty = home.path().join("empty");
    std::fs::create_dir_all(&empty).unwrap();

    for flag in ["-v", "-vv", "-vvv"] {
        listing_qa(&home).arg(flag).arg(arg(&empty)).assert().code(0);
    }
}
