//! Integration tests for `logchop scan` and `logchop rules`.
//!
//! Runs the built binary against temporary log files and the bundled rules.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const AUDIT_LOG: &str = "type=SYSCALL msg=audit(1690000000.123:456): AUID=1000 exe=\"/bin/ls\"
type=PATH msg=audit(1690000002.500:458): item=0 name=\"/etc/shadow\" auid=0
";

const SYSLOG: &str = "Oct 12 10:00:00 auth: warning host sshd invalid login attempt
Oct 12 10:00:05 daemon: info host cron session opened
";

fn rules_dir(source: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../rules/linux/builtin")
        .join(source)
}

fn logchop(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logchop"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env("LOGCHOP_GENERAL_LOG_LEVEL", "error")
        .output()
        .expect("should run logchop binary")
}

fn scan(dir: &Path, target: &str, file: &Path, rules: &Path, out: &str) -> Output {
    logchop(
        dir,
        &[
            "scan",
            "--target",
            target,
            "--file",
            &file.display().to_string(),
            "--rules",
            &rules.display().to_string(),
            "--out",
            out,
            "--year",
            "2024",
        ],
    )
}

#[test]
fn test_scan_auditd_json() {
    // Given: An audit log with one shadow file access
    let temp_dir = TempDir::new().expect("should create temp dir");
    let log = temp_dir.path().join("audit.log");
    fs::write(&log, AUDIT_LOG).expect("should write log");

    // When: Scanning with JSON output
    let output = scan(temp_dir.path(), "auditd", &log, &rules_dir("auditd"), "json");

    // Then: One row keyed by column names
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let rows: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let rows = rows.as_array().expect("JSON array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["ID"], "auditd_shadow_access");
    assert_eq!(rows[0]["Timestamp"], "2023-07-22T04:26:42Z");
    assert_eq!(rows[0]["User"], "0");
}

#[test]
fn test_scan_syslog_table_and_csv_agree() {
    // Given: A syslog file with one invalid login
    let temp_dir = TempDir::new().expect("should create temp dir");
    let log = temp_dir.path().join("syslog");
    fs::write(&log, SYSLOG).expect("should write log");

    // When: Scanning as table and as CSV
    let table = scan(temp_dir.path(), "syslog", &log, &rules_dir("syslog"), "table");
    let csv = scan(temp_dir.path(), "syslog", &log, &rules_dir("syslog"), "csv");

    // Then: Both list the same match
    assert_eq!(table.status.code(), Some(0));
    let table = String::from_utf8_lossy(&table.stdout);
    assert!(table.contains("syslog_invalid_login"));
    assert!(table.contains("Processed 2 syslog events"));

    assert_eq!(csv.status.code(), Some(0));
    let csv = String::from_utf8_lossy(&csv.stdout);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Timestamp,User,Exe"));
    assert!(lines[1].contains("invalid login attempt"));
    assert!(lines[1].contains("attack.credential_access-attack.t1110"));
}

#[test]
fn test_scan_empty_log_prints_headers_only() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let log = temp_dir.path().join("syslog");
    fs::write(&log, "").expect("should write log");

    let output = scan(temp_dir.path(), "syslog", &log, &rules_dir("syslog"), "json");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn test_scan_missing_file_exits_3() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let missing = temp_dir.path().join("missing.log");

    let output = scan(temp_dir.path(), "syslog", &missing, &rules_dir("syslog"), "table");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.log"), "stderr: {stderr}");
}

#[test]
fn test_scan_journald_with_file_exits_3() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let log = temp_dir.path().join("syslog");
    fs::write(&log, SYSLOG).expect("should write log");

    let output = scan(temp_dir.path(), "journald", &log, &rules_dir("journald"), "table");
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_scan_missing_rules_exits_4() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let log = temp_dir.path().join("syslog");
    fs::write(&log, SYSLOG).expect("should write log");

    let output = scan(
        temp_dir.path(),
        "syslog",
        &log,
        &temp_dir.path().join("no-rules"),
        "table",
    );
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no-rules"));
}

#[test]
fn test_scan_unparsable_syslog_exits_5() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let log = temp_dir.path().join("syslog");
    fs::write(&log, "garbage without a timestamp\n").expect("should write log");

    let output = scan(temp_dir.path(), "syslog", &log, &rules_dir("syslog"), "csv");
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(":1"), "stderr: {stderr}");
}

#[test]
fn test_rules_validate_bundled_rules() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let rules = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../rules/linux/builtin");

    let output = logchop(
        temp_dir.path(),
        &["rules", "validate", &rules.display().to_string(), "--format", "json"],
    );

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["invalid"], 0);
    assert_eq!(report["total_files"], report["valid"]);
}

#[test]
fn test_rules_validate_invalid_file_exits_4() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let rules = temp_dir.path().join("rules");
    fs::create_dir(&rules).expect("should create rules dir");
    fs::write(rules.join("bad.yml"), "id: x\n").expect("should write rule");

    let output = logchop(temp_dir.path(), &["rules", "validate", "rules"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stdout).contains("bad.yml"));
}
