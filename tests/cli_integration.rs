//! Integration tests for the gpgpass CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Anything that needs a real gpg key is covered by the store tests
//! instead, so we focus on argument handling and failure paths that
//! stop before gpg is invoked.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: a gpgpass command isolated from the user's config and store.
fn gpgpass(tmp: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("gpgpass").expect("binary should exist");
    cmd.env("GPGPASS_CONFIG", tmp.path().join("missing.toml"))
        .env("GPGPASS_STORE_DIR", tmp.path().join("store"))
        .env_remove("GPGPASS_LOG");
    cmd
}

#[test]
fn help_flag_lists_commands() {
    let tmp = TempDir::new().unwrap();
    let mut assert = gpgpass(&tmp).arg("--help").assert().success();
    for word in [
        "init", "clone", "ls", "find", "show", "insert", "edit", "meta", "mv", "cp", "rm",
        "generate", "git", "completions",
    ] {
        assert = assert.stdout(predicate::str::contains(word));
    }
}

#[test]
fn version_flag_shows_version() {
    let tmp = TempDir::new().unwrap();
    gpgpass(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gpgpass"));
}

#[test]
fn no_args_shows_usage() {
    let tmp = TempDir::new().unwrap();
    gpgpass(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn ls_on_uninitialized_store_fails() {
    let tmp = TempDir::new().unwrap();
    gpgpass(&tmp)
        .arg("ls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn store_flag_overrides_environment() {
    let tmp = TempDir::new().unwrap();
    let other = tmp.child("other");
    gpgpass(&tmp)
        .args(["show", "mail", "--store"])
        .arg(other.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("other"));
    other.assert(predicate::path::is_dir());
}

#[test]
fn show_missing_entry_fails() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.child("store");
    store.child(".gpg-id").write_str("alice@example.com\n").unwrap();

    gpgpass(&tmp)
        .args(["show", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn unparsable_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.child("bad.toml");
    config.write_str("password_length = \"twenty\"").unwrap();

    gpgpass(&tmp)
        .env("GPGPASS_CONFIG", config.path())
        .arg("ls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file error"));
}

#[test]
fn completions_generate_script() {
    let tmp = TempDir::new().unwrap();
    gpgpass(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gpgpass"));
}

#[test]
fn completions_reject_unknown_shell() {
    let tmp = TempDir::new().unwrap();
    gpgpass(&tmp)
        .args(["completions", "csh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown shell"));
}

#[test]
fn meta_help_shows_subcommands() {
    let tmp = TempDir::new().unwrap();
    gpgpass(&tmp)
        .args(["meta", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("unset"));
}
