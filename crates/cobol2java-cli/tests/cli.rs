//! Tests for the cobol2java binary

use std::fs;
use std::process::{Command, Output};

const PROGRAM: &str = "\
       IDENTIFICATION DIVISION.
       DATA DIVISION.
       WORKING-STORAGE SECTION.
       01 WS-COUNT PIC 9(3) VALUE 5.
       01 WS-NAME PIC X(10) VALUE SPACES.
       PROCEDURE DIVISION.
           MOVE \"42\" TO WS-COUNT.
           PERFORM CALC-PAY.
";

fn cobol2java(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cobol2java"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run cobol2java")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_convert_single_file_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("PAYROLL.cbl");
    fs::write(&input, PROGRAM).unwrap();

    let output = cobol2java(&["convert", input.to_str().unwrap()]);
    assert!(output.status.success());

    let java = stdout(&output);
    assert!(java.starts_with("public class ConvertedCobol {"));
    assert!(java.contains("private int ws_count = 5;"));
    assert!(java.contains("private String calc_pay;"));

    let log = String::from_utf8_lossy(&output.stderr);
    assert!(log.contains("Generator invocation failed"));
    assert!(log.contains("Applied Java code fixes to fallback conversion."));
}

#[test]
fn test_convert_with_log_output_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("PAYROLL.cbl");
    let java = dir.path().join("out/Payroll.java");
    let log = dir.path().join("payroll.log");
    fs::write(&input, PROGRAM).unwrap();

    let output = cobol2java(&[
        "convert",
        input.to_str().unwrap(),
        "-o",
        java.to_str().unwrap(),
        "--log-output",
        log.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report[0]["rule_based_fallback"], true);
    assert_eq!(report[0]["java_code"].as_str().unwrap(), fs::read_to_string(&java).unwrap());
    assert_eq!(report[0]["log"].as_str().unwrap(), fs::read_to_string(&log).unwrap());
}

#[test]
fn test_convert_with_saved_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("PAYROLL.cbl");
    let candidate = dir.path().join("response.txt");
    fs::write(&input, PROGRAM).unwrap();
    fs::write(
        &candidate,
        "```java\npublic class Payroll {\n    public void run() {\n        if (name == \"A\" || \"B\") {\n            return;\n        }\n    }\n}\n```",
    )
    .unwrap();

    let output = cobol2java(&["convert", input.to_str().unwrap(), "--candidate", candidate.to_str().unwrap()]);
    assert!(output.status.success());

    let java = stdout(&output);
    assert!(java.contains("public class Payroll {"));
    assert!(java.contains(r#"if(name.equals("A") || name.equals("B"))"#));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Converted using recorded model."));
}

#[test]
fn test_convert_directory() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("java");
    fs::create_dir_all(src.join("batch")).unwrap();
    fs::write(src.join("PAYROLL.cbl"), PROGRAM).unwrap();
    fs::write(src.join("batch/REPORT.cob"), "01 WS-LINE PIC X(80).").unwrap();
    fs::write(src.join("NOTES.txt"), "not cobol").unwrap();

    let output = cobol2java(&["convert", src.to_str().unwrap(), "-o", out.to_str().unwrap()]);
    assert!(output.status.success());

    assert!(out.join("PAYROLL.java").is_file());
    assert!(out.join("batch/REPORT.java").is_file());
    assert!(!out.join("NOTES.java").exists());
    assert!(fs::read_to_string(out.join("batch/REPORT.java")).unwrap().contains("private String ws_line"));
}

#[test]
fn test_convert_empty_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = cobol2java(&["convert", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn test_scan_prints_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("PAYROLL.cbl");
    fs::write(&input, PROGRAM).unwrap();

    let output = cobol2java(&["scan", input.to_str().unwrap()]);
    assert!(output.status.success());

    let fragments = stdout(&output);
    assert!(fragments.starts_with("    // === SYSVARS copybook - Undeclared variables ==="));
    assert!(!fragments.contains("public class"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Undeclared variables found: CALC-PAY"));
}

#[test]
fn test_repair_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("Broken.java");
    let repaired = dir.path().join("Fixed.java");
    fs::write(&input, "if(x == \"A\" || \"B\")").unwrap();

    let output = cobol2java(&["repair", input.to_str().unwrap(), "-o", repaired.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&repaired).unwrap(), r#"if(x.equals("A") || x.equals("B"))"#);
}

#[test]
fn test_init_config_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cobol2java.toml");

    assert!(cobol2java(&["init-config", path.to_str().unwrap()]).status.success());
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("class_name = \"ConvertedCobol\""));
    assert!(written.contains("max_tokens = 600"));

    assert!(!cobol2java(&["init-config", path.to_str().unwrap()]).status.success());
    assert!(cobol2java(&["init-config", path.to_str().unwrap(), "--force"]).status.success());
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("PAYROLL.cbl");
    let config = dir.path().join("bad.toml");
    fs::write(&input, PROGRAM).unwrap();
    fs::write(&config, "temperature = 9.0").unwrap();

    let output = cobol2java(&["convert", input.to_str().unwrap(), "--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("temperature"));
}
