//! Integration tests for the `assert-version` command.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_matching_version_succeeds() {
    let env = TestEnv::new();
    env.create_database("app.db", 4, &["users"]);

    env.command()
        .args(["assert-version", "app.db", "4"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_mismatched_version_exits_1() {
    let env = TestEnv::new();
    env.create_database("app.db", 4, &["users"]);

    env.command()
        .args(["assert-version", "app.db", "5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected 5"));
}

#[test]
fn test_not_inverts_assertion() {
    let env = TestEnv::new();
    env.create_database("app.db", 4, &["users"]);

    env.command()
        .args(["assert-version", "app.db", "5", "--not"])
        .assert()
        .success();

    env.command()
        .args(["assert-version", "app.db", "4", "--not"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_database_exits_3() {
    let env = TestEnv::new();

    env.command()
        .args(["assert-version", "missing.db", "1"])
        .assert()
        .code(3);

    // Missing is not the same as "not at this version"
    env.command()
        .args(["assert-version", "missing.db", "1", "--not"])
        .assert()
        .code(3);
}

#[test]
fn test_verbose_reports_version() {
    let env = TestEnv::new();
    env.create_database("app.db", 2, &[]);

    env.command()
        .args(["--verbose", "assert-version", "app.db", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("is at version 2"));
}

#[test]
fn test_assert_version_on_wal_database_leaves_no_companion_files() {
    let env = TestEnv::new();
    env.create_managed_database("app.db", 2);

    env.command()
        .args(["assert-version", "app.db", "2"])
        .assert()
        .success();

    assert!(env.companion_files("app.db").is_empty());
}
