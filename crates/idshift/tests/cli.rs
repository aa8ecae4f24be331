//! Integration tests for the idshift binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn idshift(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("idshift").unwrap();
    // Keep the host's /etc/idshift/config.toml out of the picture.
    let config = config_dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();
    cmd.env("IDSHIFT_CONFIG", config);
    cmd
}

#[test]
fn test_dry_run_prints_each_entry() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("file"), "x").unwrap();

    idshift(&temp)
        .args(["into", "--dry-run", "-m", "b:0:100000:65536"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("would shift").count(3))
        .stdout(predicate::str::contains("file"));
}

#[test]
fn test_conflicting_maps_fail() {
    let temp = TempDir::new().unwrap();

    idshift(&temp)
        .args(["from", "-n", "-m", "u:0:100000:65536", "-m", "u:100:100500:10"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Conflicting id mapping"));
}

#[test]
fn test_bad_map_fails() {
    let temp = TempDir::new().unwrap();

    idshift(&temp)
        .args(["into", "-n", "-m", "q:0:100000:65536"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("q:0:100000:65536"));
}

#[test]
fn test_missing_dir_fails() {
    let temp = TempDir::new().unwrap();

    idshift(&temp)
        .args(["into", "-n", "-m", "b:0:100000:65536"])
        .arg(temp.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No such file or directory"));
}

#[test]
fn test_no_maps_fails() {
    let temp = TempDir::new().unwrap();

    idshift(&temp)
        .args(["into", "-n"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No ID ranges given"));
}

#[test]
fn test_show_uses_config_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.toml");
    std::fs::write(&config, "mappings = [\"u:0:1000:1\", \"b:1:100000:65535\"]\n").unwrap();

    idshift(&temp)
        .args(["show", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("uid_map:\n0 1000 1\n1 100000 65535"))
        .stdout(predicate::str::contains("gid_map:\n1 100000 65535"));
}
