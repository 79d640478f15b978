use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to test fixtures
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

/// Helper to create a Command for the mcv binary
#[allow(deprecated)]
fn mcv() -> Command {
    let mut cmd = Command::cargo_bin("mcv").expect("Failed to find mcv binary");
    cmd.env("NO_COLOR", "1").env_remove("MCV_LOG").env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let text = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON ({e}): {text}"))
}

// ============================================================================
// validate command tests
// ============================================================================

#[test]
fn test_validate_valid_job() {
    mcv()
        .arg("validate")
        .arg(fixture_path("valid_job.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation PASSED"))
        .stdout(predicate::str::contains("Configuration loaded: 1 mappings"));
}

#[test]
fn test_validate_toml_job() {
    mcv()
        .arg("validate")
        .arg(fixture_path("valid_job.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation PASSED"));
}

#[test]
fn test_validate_orphaned_alias_fails() {
    mcv()
        .arg("validate")
        .arg(fixture_path("orphan_job.yml"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Validation FAILED"))
        .stdout(predicate::str::contains("orphaned_transformation_columns"))
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn test_validate_standard_mode_skips_consistency() {
    mcv()
        .arg("validate")
        .arg(fixture_path("orphan_job.yml"))
        .arg("--mode")
        .arg("standard")
        .assert()
        .success()
        .stdout(predicate::str::contains("orphaned_transformation_columns").not());
}

#[test]
fn test_validate_injection_fails() {
    mcv()
        .arg("validate")
        .arg(fixture_path("injection_job.yml"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("sql_security_risk"))
        .stdout(predicate::str::contains("Potentially dangerous SQL pattern detected"));
}

#[test]
fn test_validate_json_output() {
    let output = mcv()
        .arg("validate")
        .arg(fixture_path("orphan_job.yml"))
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report = stdout_json(&output);
    assert_eq!(report["is_valid"], serde_json::json!(false));
    assert_eq!(
        report["summary"]["error_types"],
        serde_json::json!(["orphaned_transformation_columns"])
    );
    assert_eq!(report["summary"]["affected_mappings"], serde_json::json!(["orders"]));
}

#[test]
fn test_validate_compact_output() {
    mcv()
        .arg("validate")
        .arg(fixture_path("orphan_job.yml"))
        .arg("--format")
        .arg("compact")
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("INVALID (1 errors,"))
        .stdout(predicate::str::contains("1 mappings affected"));
}

#[test]
fn test_validate_min_severity_hides_info() {
    mcv()
        .arg("validate")
        .arg(fixture_path("valid_job.yml"))
        .arg("--min-severity")
        .arg("error")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total info:     0"));
}

#[test]
fn test_validate_unknown_mode() {
    mcv()
        .arg("validate")
        .arg(fixture_path("valid_job.yml"))
        .arg("--mode")
        .arg("turbo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown validation mode: turbo"));
}

#[test]
fn test_validate_malformed_yaml() {
    mcv()
        .arg("validate")
        .arg(fixture_path("malformed.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse configuration file"));
}

#[test]
fn test_validate_missing_file() {
    mcv()
        .arg("validate")
        .arg("nonexistent.yml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_validate_empty_file() {
    let temp_dir = TempDir::new().unwrap();
    let empty_file = temp_dir.path().join("empty.yml");
    fs::write(&empty_file, "   \n").unwrap();

    mcv()
        .arg("validate")
        .arg(&empty_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

// ============================================================================
// check command tests
// ============================================================================

#[test]
fn test_check_valid_job() {
    mcv()
        .arg("check")
        .arg(fixture_path("valid_job.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration structure is valid"))
        .stdout(predicate::str::contains("customers (2 transformations)"))
        .stdout(predicate::str::contains("Load:        delta"))
        .stdout(predicate::str::contains("Yaml"));
}

#[test]
fn test_check_toml_job() {
    mcv()
        .arg("check")
        .arg(fixture_path("valid_job.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("toml_orders"))
        .stdout(predicate::str::contains("Toml"));
}

#[test]
fn test_check_ignores_rule_violations() {
    mcv()
        .arg("check")
        .arg(fixture_path("orphan_job.yml"))
        .assert()
        .success();
}

#[test]
fn test_check_bad_structure() {
    mcv()
        .arg("check")
        .arg(fixture_path("bad_structure.yml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mappings section must be a list"))
        .stderr(predicate::str::contains("settings section must be a dictionary"));
}

#[test]
fn test_check_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("job.json");
    fs::write(&file, "{}").unwrap();

    mcv()
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported configuration file"));
}

// ============================================================================
// job command tests
// ============================================================================

#[test]
fn test_job_valid() {
    mcv()
        .arg("job")
        .arg(fixture_path("valid_job.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Job configuration validation passed with",
        ))
        .stdout(predicate::str::contains("JOB VALIDATION SUMMARY"))
        .stdout(predicate::str::contains("Consistency score: 100/100"));
}

#[test]
fn test_job_orphan_shows_details() {
    mcv()
        .arg("job")
        .arg(fixture_path("orphan_job.yml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Job configuration validation failed with 1 errors",
        ))
        .stdout(predicate::str::contains("DETAILED ERRORS:"))
        .stdout(predicate::str::contains("Consistency score: 85/100"))
        .stdout(predicate::str::contains("orphaned_transformation_columns: 1"));
}

#[test]
fn test_job_sql_json_report() {
    let output = mcv()
        .arg("job")
        .arg(fixture_path("valid_job.yml"))
        .arg("--sql")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["overall_status"], "valid");
    assert_eq!(report["validation_mode"], "sql_enhanced");
    assert!(report["sql_analysis"].is_object());
    assert_eq!(report["consistency_analysis"]["score"], 100);
}

// ============================================================================
// ops command tests
// ============================================================================

#[test]
fn test_ops_list() {
    mcv()
        .arg("ops")
        .assert()
        .success()
        .stdout(predicate::str::contains("TRANSFORMATION OPERATIONS"))
        .stdout(predicate::str::contains("divide"))
        .stdout(predicate::str::contains("round"));
}

#[test]
fn test_ops_help() {
    mcv()
        .arg("ops")
        .arg("round")
        .assert()
        .success()
        .stdout(predicate::str::contains("precision"))
        .stdout(predicate::str::contains("Parameters:"));
}

#[test]
fn test_ops_suggest() {
    mcv()
        .arg("ops")
        .arg("--suggest")
        .arg("rou")
        .assert()
        .success()
        .stdout(predicate::str::contains("round"));
}

#[test]
fn test_ops_unknown_operation() {
    mcv()
        .arg("ops")
        .arg("teleport")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown operation: teleport"));
}

#[test]
fn test_ops_unknown_category() {
    mcv()
        .arg("ops")
        .arg("--category")
        .arg("astrology")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category: astrology"));
}

// ============================================================================
// dir command tests
// ============================================================================

#[test]
fn test_dir_mixed_results() {
    let temp_dir = TempDir::new().unwrap();
    fs::copy(fixture_path("valid_job.yml"), temp_dir.path().join("a.yml")).unwrap();
    fs::copy(fixture_path("orphan_job.yml"), temp_dir.path().join("b.yaml")).unwrap();
    fs::write(temp_dir.path().join("readme.txt"), "not a config").unwrap();

    mcv()
        .arg("dir")
        .arg(temp_dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Files:          2"))
        .stdout(predicate::str::contains("Invalid:        1"))
        .stdout(predicate::str::contains("Success rate:   50.0%"));
}

#[test]
fn test_dir_all_valid_json() {
    let temp_dir = TempDir::new().unwrap();
    fs::copy(fixture_path("valid_job.yml"), temp_dir.path().join("a.yml")).unwrap();
    fs::copy(fixture_path("valid_job.toml"), temp_dir.path().join("b.toml")).unwrap();

    let output = mcv()
        .arg("dir")
        .arg(temp_dir.path())
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["summary"]["total"], 2);
    assert_eq!(report["summary"]["valid"], 2);
    assert_eq!(report["files"].as_object().map(|f| f.len()), Some(2));
}

#[test]
fn test_dir_missing() {
    mcv()
        .arg("dir")
        .arg("no/such/directory")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Directory not found"));
}

// ============================================================================
// general CLI tests
// ============================================================================

#[test]
fn test_cli_help() {
    mcv()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("job"))
        .stdout(predicate::str::contains("ops"))
        .stdout(predicate::str::contains("dir"));
}

#[test]
fn test_cli_version() {
    mcv()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mcv"));
}

#[test]
fn test_validate_with_invalid_format() {
    mcv()
        .arg("validate")
        .arg(fixture_path("valid_job.yml"))
        .arg("--format")
        .arg("xml")
        .assert()
        .failure();
}
