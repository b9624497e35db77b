use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn sim() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sim"));
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn inspect_counts_classes() {
    sim()
        .arg("--map")
        .arg(fixture("village.tmj"))
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("24 tiles\n").and(predicate::str::contains("desert     4")));
}

#[test]
fn path_goes_around_mountains() {
    sim()
        .arg("--map")
        .arg(fixture("village.tmj"))
        .args(["path", "0", "1", "5", "0"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("cost ")
                .and(predicate::str::contains("(0, 1, -1) -> "))
                .and(predicate::str::contains("(4, 1, -5) -> (5, 0, -5)\n")),
        );
}

#[test]
fn reach_accepts_negative_coordinates() {
    sim()
        .arg("--map")
        .arg(fixture("village.tmj"))
        .args(["reach", "-1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reachable from (-1, 2, -1)").and(predicate::str::contains("mountain").not()));
}

#[test]
fn config_file_selects_the_map() {
    let tmp = tempdir().unwrap();
    let settings = tmp.path().join("sim.toml");
    fs::write(&settings, format!("[map]\npath = {:?}\n", fixture("village.tmj").display().to_string())).unwrap();

    sim()
        .arg("--config")
        .arg(&settings)
        .args(["locate", "0", "0"])
        .assert()
        .success()
        .stdout("(0, 0, 0) grass (cost 1)\n");
}

#[test]
fn missing_map_fails_with_context() {
    let tmp = tempdir().unwrap();
    sim()
        .arg("--map")
        .arg(tmp.path().join("nowhere.tmj"))
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load map"));
}

#[test]
fn simulate_reports_population() {
    sim()
        .arg("--map")
        .arg(fixture("village.tmj"))
        .args(["simulate", "--steps", "8", "--agents", "4", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1 homes, 4 agents\ntime 00000-00-00 02:00 (8 steps)\nliving 4"));
}
