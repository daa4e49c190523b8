//! End-to-end tests of the CLI commands.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::fixtures_dir;

/// peerlog with HOME pointed at a scratch directory
fn peerlog(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("peerlog").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

#[test]
fn parse_writes_four_reports() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("out");

    peerlog(home.path())
        .arg("parse")
        .arg(fixtures_dir().join("monerod.log"))
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "4 addresses, 2 connections, 2 notifications, 2 blocks (12 lines read)",
        ));

    for name in ["addresses.csv", "connections.csv", "notifications.csv", "blocks.csv"] {
        assert!(out.join(name).exists(), "missing {}", name);
    }
    let connections = fs::read_to_string(out.join("connections.csv")).unwrap();
    assert!(connections.contains("1.1.1.1,2019-01-01 00:00:00.000,2019-01-01 00:00:10.000,tud.reason: idle,"));
}

#[test]
fn parse_with_timestamp_first_notifications() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("out");

    peerlog(home.path())
        .args(["parse", "--notify-columns", "timestamp-first", "-o"])
        .arg(&out)
        .arg(fixtures_dir().join("monerod.log"))
        .assert()
        .success();

    let notifications = fs::read_to_string(out.join("notifications.csv")).unwrap();
    assert!(notifications.starts_with("timestamp,ip-address,\n2019-01-01 00:00:02.000,1.1.1.1,\n"));
}

#[test]
fn parse_filter_from_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    fs::write(&config, "[parse]\nfilter = \"2.2.2.2\"\n").unwrap();
    let out = home.path().join("out");

    peerlog(home.path())
        .arg("--config")
        .arg(&config)
        .arg("parse")
        .arg(fixtures_dir().join("monerod.log"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 addresses, 1 connections"));
}

#[test]
fn parse_missing_log_fails() {
    let home = TempDir::new().unwrap();

    peerlog(home.path())
        .args(["parse", "/nonexistent/monerod.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open log file"));
}

#[test]
fn invalid_config_pattern_fails() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config").join("peerlog");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[patterns]\nnotify = \"[\"\n").unwrap();

    peerlog(home.path())
        .arg("parse")
        .arg(fixtures_dir().join("monerod.log"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid notify pattern"));
}

#[test]
fn compare_blocks_writes_pair_file() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("deltas");

    peerlog(home.path())
        .arg("compare-blocks")
        .arg(fixtures_dir().join("node_a.csv"))
        .arg(fixtures_dir().join("node_b.csv"))
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "node_a_vs_node_b: 2 blocks, min -1.500s, max 1.250s, mean -0.125s",
        ));

    assert_eq!(
        fs::read_to_string(out.join("node_a_vs_node_b.csv")).unwrap(),
        "block-height,difference,\n1780001,1.250,\n1780002,-1.500,\n"
    );
}

#[test]
fn compare_blocks_needs_two_files() {
    let home = TempDir::new().unwrap();
    peerlog(home.path())
        .arg("compare-blocks")
        .arg(fixtures_dir().join("node_a.csv"))
        .assert()
        .failure();
}

#[test]
fn compare_blocks_rejects_colliding_output_names() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("deltas");
    let mut inputs = Vec::new();
    for node in ["a", "b", "c"] {
        let dir = home.path().join(node);
        fs::create_dir_all(&dir).unwrap();
        fs::copy(fixtures_dir().join("node_a.csv"), dir.join("node.csv")).unwrap();
        inputs.push(dir.join("node.csv"));
    }

    peerlog(home.path())
        .arg("compare-blocks")
        .args(&inputs)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("node_vs_node.csv"));
    assert!(!out.exists());
}

#[test]
fn config_path_points_into_home() {
    let home = TempDir::new().unwrap();
    let expected = home.path().join(".config").join("peerlog").join("config.toml");

    peerlog(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn config_show_prints_defaults() {
    let home = TempDir::new().unwrap();
    peerlog(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[enrich]"))
        .stdout(predicate::str::contains("checkpoint_every = 25"))
        .stdout(predicate::str::contains("notify_columns = \"ip-first\""));
}

#[test]
fn config_init_writes_loadable_defaults() {
    let home = TempDir::new().unwrap();
    let path = home.path().join(".config").join("peerlog").join("config.toml");

    peerlog(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));

    let written = fs::read_to_string(&path).unwrap();
    let config: peerlog::Config = toml::from_str(&written).unwrap();
    assert_eq!(config, peerlog::Config::default());
}

#[test]
fn config_init_keeps_existing_file_without_force() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    fs::write(&config, "[parse]\nfilter = \"keep\"\n").unwrap();

    peerlog(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert!(fs::read_to_string(&config).unwrap().contains("keep"));

    peerlog(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "init", "--force"])
        .assert()
        .success();
    assert!(!fs::read_to_string(&config).unwrap().contains("keep"));
}

#[test]
fn completions_for_bash() {
    let home = TempDir::new().unwrap();
    peerlog(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compare-blocks"));
}

#[test]
fn verbose_logs_go_to_stderr() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("out");

    peerlog(home.path())
        .arg("-vv")
        .arg("parse")
        .arg(fixtures_dir().join("monerod.log"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("block announcement without a height"))
        .stdout(predicate::str::contains("block announcement").not());
}
