use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn setup_test_directory() -> tempfile::TempDir {
    let dir = tempdir().unwrap();

    fs::create_dir_all(dir.path().join("build")).unwrap();
    fs::write(dir.path().join("build/keep.txt"), "keep").unwrap();
    fs::write(dir.path().join("build/out.o"), "obj").unwrap();

    fs::create_dir_all(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("a.log"), vec![b'a'; 100]).unwrap();
    fs::write(dir.path().join("sub/b.log"), vec![b'b'; 50]).unwrap();

    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();

    dir
}

fn ppurge(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ppurge").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG").arg("--root").arg(root);
    cmd
}

#[test]
fn test_reports_matches_without_deleting() {
    let dir = setup_test_directory();

    ppurge(dir.path())
        .arg("--filter")
        .arg("*.log")
        .assert()
        .success()
        .stdout(predicate::str::contains("purge:").and(predicate::str::contains("a.log")))
        .stdout(predicate::str::contains("b.log"))
        .stdout(predicate::str::contains("found 2 purgable locations"));

    assert!(dir.path().join("a.log").exists());
    assert!(dir.path().join("sub/b.log").exists());
}

#[test]
fn test_size_flag_reports_total() {
    let dir = setup_test_directory();

    ppurge(dir.path())
        .arg("-f")
        .arg("*.log")
        .arg("--size")
        .assert()
        .success()
        .stdout(predicate::str::contains("found 2 purgable locations (150 B)"));
}

#[test]
fn test_exclude_rules_are_reported_as_keep() {
    let dir = setup_test_directory();

    ppurge(dir.path())
        .arg("-f")
        .arg("!src;*.log")
        .assert()
        .success()
        .stdout(predicate::str::contains("keep:").and(predicate::str::contains("src")))
        .stdout(predicate::str::contains("main.rs").not())
        .stdout(predicate::str::contains("found 2 purgable locations"));
}

#[test]
fn test_exclude_inside_matched_directory_is_ineffective() {
    let dir = setup_test_directory();

    ppurge(dir.path())
        .arg("-f")
        .arg("build/;!build/keep.txt")
        .arg("--purge")
        .assert()
        .success()
        .stdout(predicate::str::contains("keep.txt").not())
        .stdout(predicate::str::contains("purged:"));

    assert!(!dir.path().join("build").exists());
    assert!(dir.path().join("a.log").exists());
}

#[test]
fn test_purge_flag_deletes_includes_only() {
    let dir = setup_test_directory();

    ppurge(dir.path())
        .arg("-f")
        .arg("!sub;*.log")
        .arg("--purge")
        .assert()
        .success()
        .stdout(predicate::str::contains("PURGING"))
        .stdout(predicate::str::contains("purged 1 locations"));

    assert!(!dir.path().join("a.log").exists());
    assert!(dir.path().join("sub/b.log").exists());
}

#[cfg(unix)]
#[test]
fn test_purge_skips_symlinks() {
    let dir = setup_test_directory();
    let outside = tempdir().unwrap();
    fs::write(outside.path().join("precious.txt"), "data").unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("cache")).unwrap();

    ppurge(dir.path())
        .arg("-f")
        .arg("cache")
        .arg("--purge")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipping symlink:"))
        .stdout(predicate::str::contains("skipped 1 symlinks"));

    assert!(fs::symlink_metadata(dir.path().join("cache")).is_ok());
    assert!(outside.path().join("precious.txt").exists());
}

#[test]
fn test_reads_default_rule_file() {
    let dir = setup_test_directory();
    fs::write(dir.path().join(".ppurge"), "# build outputs\n*.o\n").unwrap();

    ppurge(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("out.o"))
        .stdout(predicate::str::contains("found 1 purgable locations"));
}

#[test]
fn test_explicit_config_file() {
    let dir = setup_test_directory();
    let rules = tempdir().unwrap();
    let rule_file = rules.path().join("rules");
    fs::write(&rule_file, "build\n").unwrap();

    ppurge(dir.path())
        .arg("--config")
        .arg(&rule_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("found 1 purgable locations"));
}

#[test]
fn test_filter_overrides_rule_file_with_warning() {
    let dir = setup_test_directory();
    fs::write(dir.path().join(".ppurge"), "*.o\n").unwrap();

    ppurge(dir.path())
        .arg("-f")
        .arg("*.log")
        .assert()
        .success()
        .stderr(predicate::str::contains("WARN:"))
        .stdout(predicate::str::contains("out.o").not())
        .stdout(predicate::str::contains("found 2 purgable locations"));
}

#[test]
fn test_missing_rules_is_fatal() {
    let dir = setup_test_directory();

    ppurge(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(".ppurge"));

    assert!(dir.path().join("a.log").exists());
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();

    ppurge(&dir.path().join("does-not-exist"))
        .arg("-f")
        .arg("*.log")
        .assert()
        .failure();
}

#[test]
fn test_missing_explicit_config_warns_then_fails() {
    let dir = setup_test_directory();
    let rule_file = dir.path().join("no-such-rules");

    ppurge(dir.path())
        .arg("--config")
        .arg(&rule_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not find a file at"))
        .stderr(predicate::str::contains("no-such-rules"));

    assert!(dir.path().join("a.log").exists());
}
