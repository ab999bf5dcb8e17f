//! CLI integration tests
//!
//! These tests verify that the CLI works correctly with various options.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, body) in files {
        let path = dir.path().join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }
    dir
}

fn sample() -> TempDir {
    project(&[
        ("src/index.ts", "import { used } from './lib';\nexport default used;"),
        ("src/lib.ts", "export const used = 1;\nexport const useLegacy = 2;\nexport const forgotten = 3;"),
        ("src/orphan.ts", "export const lonely = 1;"),
        ("src/local.ts", "function dead() {}\nexport const live = 1;"),
    ])
}

fn unused_files(report: &serde_json::Value) -> Vec<String> {
    report["unusedFiles"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f.as_str().map(str::to_string))
        .collect()
}

fn devoid() -> Command {
    let mut cmd = Command::cargo_bin("devoid").unwrap();
    cmd.arg("--no-color").arg("--quiet");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    Command::cargo_bin("devoid")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--track-all-locals"))
        .stdout(predicate::str::contains("--types"));
}

#[test]
fn test_version() {
    Command::cargo_bin("devoid")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_terminal_report() {
    let dir = sample();
    devoid()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary"))
        .stdout(predicate::str::contains("src/orphan.ts"))
        .stdout(predicate::str::contains("forgotten"))
        .stdout(predicate::str::contains("dead"));
}

#[test]
fn test_invalid_root_fails() {
    devoid()
        .arg("/definitely/not/a/project")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_invalid_cwd_fails() {
    devoid()
        .args(["--cwd", "/definitely/not/a/dir", "."])
        .assert()
        .failure();
}

// ============================================================================
// Output Tests
// ============================================================================

#[test]
fn test_json_output() {
    let dir = sample();
    let output = devoid().arg(dir.path()).arg("--json").output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let unused: Vec<&str> = report["unusedExports"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["name"].as_str())
        .collect();
    assert!(unused.contains(&"forgotten"));
    assert!(!unused.contains(&"used"));
    assert_eq!(report["livenessMode"], "entryPoints");
    assert!(report["graphs"]["dependencyGraph"].is_object());
}

#[test]
fn test_output_file() {
    let dir = sample();
    let out = dir.path().join("report.json");
    devoid()
        .arg(dir.path())
        .arg("--json")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
    assert!(report["unusedFiles"].is_array());
}

#[test]
fn test_section_flags() {
    let dir = sample();
    devoid()
        .arg(dir.path())
        .arg("--files")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unused files"))
        .stdout(predicate::str::contains("Unused exports (").not());
}

#[test]
fn test_summary_only() {
    let dir = sample();
    devoid()
        .arg(dir.path())
        .arg("--summary-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary"))
        .stdout(predicate::str::contains("forgotten").not());
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_retain_flag() {
    let dir = sample();
    let output = devoid()
        .arg(dir.path())
        .args(["--json", "--retain", "use*", "--retain", "orphan.ts"])
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    let unused: Vec<&str> = report["unusedExports"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["name"].as_str())
        .collect();
    assert!(!unused.contains(&"useLegacy"));
    assert!(!unused.contains(&"lonely"));
    assert!(!unused_files(&report).iter().any(|f| f.ends_with("orphan.ts")));
}

#[test]
fn test_ignore_flag() {
    let dir = sample();
    let output = devoid()
        .arg(dir.path())
        .args(["--json", "--ignore", "orphan"])
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let files = unused_files(&report);
    assert!(!files.iter().any(|f| f.ends_with("orphan.ts")));
    assert!(files.iter().any(|f| f.ends_with("local.ts")));
}

#[test]
fn test_config_file() {
    let dir = sample();
    std::fs::write(
        dir.path().join(".devoid.yml"),
        "retain_patterns:\n  - forgotten\nreport:\n  format: json\n",
    )
    .unwrap();

    let output = devoid().arg(dir.path()).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let unused: Vec<&str> = report["unusedExports"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["name"].as_str())
        .collect();
    assert!(!unused.contains(&"forgotten"));
}

#[test]
fn test_malformed_explicit_config_fails() {
    let dir = sample();
    let config = dir.path().join("broken.toml");
    std::fs::write(&config, "retain_patterns = [").unwrap();
    devoid()
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}

// ============================================================================
// Single-file Mode
// ============================================================================

#[test]
fn test_internal_mode() {
    let dir = project(&[("m.ts", "const a = 1;\nconst b = a;\n")]);
    Command::cargo_bin("devoid")
        .unwrap()
        .args(["internal", "--json"])
        .arg(dir.path().join("m.ts"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unused\""))
        .stdout(predicate::str::contains("\"b\""));
}

#[test]
fn test_internal_mode_missing_file_fails() {
    Command::cargo_bin("devoid")
        .unwrap()
        .args(["internal", "/definitely/not/here.ts"])
        .assert()
        .failure();
}
