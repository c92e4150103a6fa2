use serde_json::Value;
use std::process::{Command, Output};

fn run_threej(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_threej"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("threej binary should run")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout should be utf-8")
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("stderr should be utf-8")
}

#[test]
fn compute_json_reports_triplet_sequence() {
    let output = run_threej(&["compute", "--format", "json", "1", "1", "1", "-1"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));

    let parsed: Value = serde_json::from_str(&stdout_of(&output)).expect("stdout should be JSON");
    assert_eq!(parsed["l1min"], 0.0);
    assert_eq!(parsed["l1max"], 2.0);
    assert_eq!(parsed["length"], 3);
    assert_eq!(parsed["plan"], "general");
    assert_eq!(parsed["precision"], "f64");

    let values = parsed["values"].as_array().expect("values should be an array");
    let expected = [0.5773502691896258, 0.4082482904638630, 0.1825741858350554];
    assert_eq!(values.len(), expected.len());
    for (value, expected) in values.iter().zip(expected) {
        let value = value.as_f64().expect("value should be numeric");
        assert!((value - expected).abs() < 1.0e-14, "{value} vs {expected}");
    }
    let unitarity = parsed["unitarity_sum"].as_f64().expect("unitarity should be numeric");
    assert!((unitarity - 1.0).abs() < 1.0e-13);
}

#[test]
fn compute_text_accepts_fractions_and_lists_each_l1() {
    let output = run_threej(&["compute", "5/2", "3/2", "1/2", "-1/2"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));

    let stdout = stdout_of(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "# threejj l2=5/2 l3=3/2 m2=1/2 m3=-1/2");
    assert!(lines[1].contains("plan=general"));
    let rows: Vec<&str> = lines.iter().copied().filter(|line| !line.starts_with('#')).collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].trim_start().starts_with("1 "));
    assert!(rows[3].trim_start().starts_with("4 "));
    assert!(rows[3].contains("-2.18217890235992"));
}

#[test]
fn compute_zero_magnetic_in_single_precision() {
    let output = run_threej(&[
        "compute", "--format", "json", "--precision", "f32", "5", "3", "0", "0",
    ]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));

    let parsed: Value = serde_json::from_str(&stdout_of(&output)).expect("stdout should be JSON");
    assert_eq!(parsed["precision"], "f32");
    assert_eq!(parsed["plan"], "zero-magnetic");
    let values = parsed["values"].as_array().expect("values should be an array");
    assert_eq!(values.len(), 7);
    assert_eq!(values[1].as_f64(), Some(0.0));
    let first = values[0].as_f64().expect("value should be numeric");
    assert!((first + 0.2080625946441198).abs() < 1.0e-6);
}

#[test]
fn invalid_magnetic_number_exits_with_input_error() {
    let output = run_threej(&["compute", "0", "0", "1", "0"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("ERROR: [INPUT.THREEJ_MAGNETIC] either l2 < abs(m2) or l3 < abs(m3)"),
        "{stderr}"
    );
    assert!(stderr.contains("FATAL EXIT CODE: 2"));
}

#[test]
fn small_capacity_exits_with_buffer_error() {
    let output = run_threej(&["compute", "--capacity", "1", "1", "1", "0", "0"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("[INPUT.THREEJ_BUFFER]"), "{stderr}");
    assert!(stderr.contains("3 slots required, 1 available"), "{stderr}");
}

#[test]
fn malformed_quantum_number_is_usage_error() {
    let output = run_threej(&["compute", "five", "3", "0", "0"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("[INPUT.CLI_USAGE]"));
}
