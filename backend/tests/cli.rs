//! End-to-end checks of the `gridkey` binary

use serde_json::Value;
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn gridkey(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gridkey"))
        .args(args)
        .output()
        .expect("failed to run gridkey")
}

fn write_example_batch(dir: &TempDir) -> String {
    let example = gridkey(&["example"]);
    assert!(example.status.success());
    let path = dir.path().join("questions.json");
    fs::write(&path, &example.stdout).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_answer_stdout_is_pure_json() {
    let dir = TempDir::new().unwrap();
    let input = write_example_batch(&dir);

    let out = gridkey(&["answer", &input]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let response: Value = serde_json::from_slice(&out.stdout).expect("stdout must be a JSON document");
    assert_eq!(response["status"], "ready");
    assert_eq!(response["failures"], Value::Array(vec![]));

    // Batch log lines go to stderr
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Computing"));
}

#[test]
fn test_answer_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_example_batch(&dir);
    let output = dir.path().join("keys.json");

    let out = gridkey(&["answer", &input, "-o", &output.to_string_lossy()]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());

    let response: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert!(response["keys"].as_array().is_some_and(|keys| !keys.is_empty()));
}

#[test]
fn test_answer_failed_record_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.json");
    fs::write(
        &input,
        r#"[{"l1_skill": "Division", "question_type": "Fib", "grid_fib_n1": "9", "grid_fib_n2": "0"}]"#,
    )
    .unwrap();

    let out = gridkey(&["answer", &input.to_string_lossy()]);
    assert_eq!(out.status.code(), Some(1));
    let response: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(response["status"], "error");
}
