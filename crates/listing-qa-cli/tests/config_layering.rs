//! Integration tests for configuration layering.
//!
//! Tests the full priority chain: hardcoded defaults < XDG config < project config < CLI args

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation warning

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use listing_qa_test_support::SyntheticImageBuilder;
use predicates::prelude::*;
use tempfile::TempDir;

fn listing_qa(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("listing-qa").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("GROQ_API_KEY");
    cmd
}

fn write_xdg_config(home: &TempDir, content: &str) {
    let dir = home.path().join("config/listing-qa");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), content).unwrap();
}

fn write_project_config(home: &TempDir, content: &str) {
    fs::write(home.path().join(".listing-qa.toml"), content).unwrap();
}

fn photo_dir(home: &TempDir) -> PathBuf {
    let dir = home.path().join("photos");
    fs::create_dir_all(&dir).unwrap();
    SyntheticImageBuilder::write_file(&dir, "mug.png", &SyntheticImageBuilder::product_shot())
        .unwrap();
    dir
}

#[test]
fn test_default_models_dir_under_data_home() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .args(["models", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("data/listing-qa/models"));
}

#[test]
fn test_xdg_config_applies() {
    let home = tempfile::tempdir().unwrap();
    write_xdg_config(&home, "[models]\ndir = \"xdg-models\"\n");

    listing_qa(&home)
        .args(["models", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xdg-models"));
}

#[test]
fn test_project_config_overrides_xdg() {
    let home = tempfile::tempdir().unwrap();
    write_xdg_config(&home, "[models]\ndir = \"xdg-models\"\n");
    write_project_config(&home, "[models]\ndir = \"project-models\"\n");

    listing_qa(&home)
        .args(["models", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project-models"));
}

#[test]
fn test_cli_overrides_project_config() {
    let home = tempfile::tempdir().unwrap();
    write_project_config(&home, "[models]\ndir = \"project-models\"\n");

    listing_qa(&home)
        .args(["models", "path", "--models-dir", "cli-models"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cli-models"));
}

#[test]
fn test_project_config_reaches_check() {
    let home = tempfile::tempdir().unwrap();
    let photos = photo_dir(&home);
    write_project_config(&home, "[models]\ndir = \"project-models\"\n");

    listing_qa(&home)
        .arg(photos.to_str().unwrap())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("project-models"));
}

#[test]
fn test_project_config_found_from_subdirectory() {
    let home = tempfile::tempdir().unwrap();
    write_project_config(&home, "[models]\ndir = \"/srv/shared-models\"\n");
    let nested = home.path().join("catalog/summer");
    fs::create_dir_all(&nested).unwrap();

    listing_qa(&home)
        .current_dir(&nested)
        .args(["models", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/srv/shared-models"));
}

#[test]
fn test_invalid_config_value_warns() {
    let home = tempfile::tempdir().unwrap();
    write_project_config(&home, "[color]\nclusters = 0\n");

    listing_qa(&home)
        .args(["models", "path"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: color.clusters"));
}

#[test]
fn test_unparseable_config_is_ignored() {
    let home = tempfile::tempdir().unwrap();
    write_project_config(&home, "[models\ndir = 3");

    listing_qa(&home)
        .args(["models", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("data/listing-qa/models"));
}

#[test]
fn test_models_list_reports_missing_files() {
    let home = tempfile::tempdir().unwrap();
    listing_qa(&home)
        .args(["models", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("mobilenetv4")
                .and(predicate::str::contains("imagenet-labels"))
                .and(predicate::str::contains("0/2 models installed")),
        );
}

#[test]
fn test_models_list_reports_installed_files() {
    let home = tempfile::tempdir().unwrap();
    let models = home.path().join("models");
    fs::create_dir_all(&models).unwrap();
    fs::write(models.join("imagenet_classes.txt"), "tench\n").unwrap();

    listing_qa(&home)
        .args(["models", "list", "--models-dir"])
        .arg(models.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("1/2 models installed"));
}
