use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

fn grain_track() -> Command {
    Command::cargo_bin("grain-track").expect("binary")
}

fn stdout_angle(output: &std::process::Output) -> f64 {
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .expect("numeric output")
}

#[test]
fn track_writes_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("report.json");

    grain_track()
        .arg("track")
        .arg(testdata("config.json"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("tracked 3 grains over 3 frames"))
        .stdout(predicate::str::contains("[2, 3]"));

    let raw = std::fs::read_to_string(&out).expect("report");
    let report: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(report["labels"]["ebsd_0"], serde_json::json!([1, 2, 3]));
    assert_eq!(report["labels"]["ebsd_1"], serde_json::json!([7, 5, -1]));
    assert_eq!(report["labels"]["ebsd_2"], serde_json::json!([4, 9, 6]));
    assert_eq!(report["errors"]["ebsd_0_to_1"][2], serde_json::json!(-1.0));
    assert_eq!(report["params"]["crystal_class"], "cubic");
    assert_eq!(report["trajectories"].as_array().map(Vec::len), Some(3));
}

#[test]
fn track_reports_missing_config() {
    grain_track()
        .arg("track")
        .arg(testdata("does_not_exist.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}

#[test]
fn track_reports_bad_frame() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "frames": ["only.json", "missing.json"] }"#,
    )
    .expect("write config");
    std::fs::copy(testdata("frame0.json"), dir.path().join("only.json")).expect("copy frame");

    grain_track()
        .arg("track")
        .arg(dir.path().join("config.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("frame 1"))
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn misorientation_reduces_by_symmetry() {
    grain_track()
        .args(["misorientation", "0,0,0", "60,0,0", "--degrees"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30.000000"));

    let output = grain_track()
        .args(["misorientation", "0,0,0", "60,0,0", "--degrees", "--class", "hexagonal"])
        .output()
        .expect("run");
    assert!(output.status.success());
    assert!(stdout_angle(&output) < 1e-4);
}

#[test]
fn misorientation_accepts_negative_angles() {
    let output = grain_track()
        .args(["misorientation", "-10,0,0", "10,0,0", "--degrees"])
        .output()
        .expect("run");
    assert!(output.status.success());
    assert!((stdout_angle(&output) - 20.0).abs() < 1e-4);
}

#[test]
fn misorientation_rejects_bad_input() {
    grain_track()
        .args(["misorientation", "0,0", "0,0,0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("three comma-separated angles"));

    grain_track()
        .args(["misorientation", "0,0,0", "0,0,0", "--class", "triclinic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported crystal class"));
}
