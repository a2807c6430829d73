use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::Utc;
use dsa_lib::types::{PatternAnalysis, SampleSummary};
use dsa_lib::{AuditResult, DesignToken, DsaOutput, FileStore, Grade, ReportStore, Viewport};
use dsa_lib::types::TokenGroup;
use tempfile::TempDir;

fn bin_path() -> PathBuf {
    std::env::var("CARGO_BIN_EXE_dsa")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("target")
                .join("debug")
                .join(if cfg!(windows) { "dsa.exe" } else { "dsa" })
        })
}

/// Runs the binary with an isolated HOME so no central config leaks in.
fn run_cmd(home: &Path, args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .env("HOME", home)
        .env_remove("DSA_LOG")
        .output()
        .expect("run dsa command")
}

fn parse_output(stdout: &[u8]) -> DsaOutput {
    serde_json::from_slice(stdout).expect("output should be valid JSON")
}

fn stored_result() -> AuditResult {
    AuditResult {
        url: "https://example.com/".into(),
        timestamp: Utc::now(),
        viewport: Viewport::default(),
        screenshot: None,
        samples: SampleSummary::default(),
        sprawl_reports: Vec::new(),
        pattern_analysis: PatternAnalysis::default(),
        overall_score: 100,
        grade: Grade::A,
        fix_plan: Vec::new(),
        token_proposals: vec![DesignToken {
            group: TokenGroup::Spacing,
            name: "space-1".into(),
            value: "4px".into(),
        }],
    }
}

#[test]
fn private_network_urls_exit_with_load_error() {
    let home = TempDir::new().expect("tempdir");
    let output = run_cmd(home.path(), &["audit", "--url", "http://127.0.0.1:8080/"]);

    assert_eq!(output.status.code(), Some(2));
    match parse_output(&output.stdout) {
        DsaOutput::Error(err) => {
            assert_eq!(err.error.category, dsa_lib::ErrorCategory::Load);
            assert!(err.error.message.contains("private"));
        }
        other => panic!("expected error output, got {:?}", other),
    }
}

#[test]
fn non_http_schemes_are_rejected() {
    let home = TempDir::new().expect("tempdir");
    let output = run_cmd(home.path(), &["audit", "--url", "file:///etc/passwd"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(matches!(parse_output(&output.stdout), DsaOutput::Error(_)));
}

#[test]
fn invalid_config_file_is_a_config_error() {
    let home = TempDir::new().expect("tempdir");
    let cfg = home.path().join("dsa.toml");
    std::fs::write(&cfg, "[sampling]\nmax_text_elements = 0\n").expect("write config");
    let output = run_cmd(
        home.path(),
        &["audit", "--url", "https://example.com", "--config", cfg.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(2));
    match parse_output(&output.stdout) {
        DsaOutput::Error(err) => assert_eq!(err.error.category, dsa_lib::ErrorCategory::Config),
        other => panic!("expected error output, got {:?}", other),
    }
}

#[test]
fn missing_report_exits_with_not_found() {
    let home = TempDir::new().expect("tempdir");
    let store = home.path().join("reports");
    let id = dsa_lib::ReportId::generate();
    let output = run_cmd(
        home.path(),
        &[
            "export",
            "--report",
            id.as_str(),
            "--store-dir",
            store.to_str().unwrap(),
            "--as",
            "css",
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    match parse_output(&output.stdout) {
        DsaOutput::Error(err) => {
            assert_eq!(err.error.category, dsa_lib::ErrorCategory::NotFound)
        }
        other => panic!("expected error output, got {:?}", other),
    }
}

#[test]
fn export_reads_stored_reports_by_id() {
    let home = TempDir::new().expect("tempdir");
    let store_dir = home.path().join("reports");
    let id = FileStore::new(&store_dir)
        .save(&stored_result())
        .expect("save report");
    let output = run_cmd(
        home.path(),
        &[
            "export",
            "--report",
            id.as_str(),
            "--store-dir",
            store_dir.to_str().unwrap(),
            "--as",
            "css",
        ],
    );

    assert!(output.status.success(), "export failed: {:?}", output);
    let css = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(css, ":root {\n  --space-1: 4px;\n}\n");
}

#[test]
fn export_writes_to_the_output_file() {
    let home = TempDir::new().expect("tempdir");
    let report = home.path().join("report.json");
    std::fs::write(&report, serde_json::to_string(&stored_result()).unwrap()).unwrap();
    let out = home.path().join("tokens.json");
    let output = run_cmd(
        home.path(),
        &[
            "export",
            "--report",
            report.to_str().unwrap(),
            "--as",
            "tokens",
            "--output",
            out.to_str().unwrap(),
        ],
    );

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["space-1"], "4px");
}

#[test]
fn malformed_viewport_is_a_usage_error() {
    let home = TempDir::new().expect("tempdir");
    let output = run_cmd(
        home.path(),
        &["audit", "--url", "https://example.com", "--viewport", "wide"],
    );

    assert_eq!(output.status.code(), Some(2));
}
