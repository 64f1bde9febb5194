// CLI integration tests for the primer demo flows.
use std::process::Command;

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_primer");
    Command::new(exe)
}

fn parse_json(value: &str) -> Value {
    serde_json::from_str(value).expect("valid json")
}

fn stdout_text(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn no_arguments_prints_demo_lines() {
    let output = cmd().output().expect("run");
    assert!(output.status.success());
    assert_eq!(stdout_text(&output), "5\n20\nHello, World!\n");
}

#[test]
fn demo_subcommand_matches_default_invocation() {
    let default = cmd().output().expect("default");
    let explicit = cmd().arg("demo").output().expect("demo");
    assert!(default.status.success());
    assert!(explicit.status.success());
    assert_eq!(stdout_text(&default), stdout_text(&explicit));
}

#[test]
fn demo_json_envelope() {
    let output = cmd().args(["demo", "--json"]).output().expect("demo");
    assert!(output.status.success());
    let value = parse_json(&stdout_text(&output));
    let demo = value.get("demo").and_then(|v| v.as_object()).expect("demo object");
    assert_eq!(demo.get("add").and_then(|v| v.as_i64()), Some(5));
    assert_eq!(demo.get("multiply").and_then(|v| v.as_i64()), Some(20));
    assert_eq!(
        demo.get("greet").and_then(|v| v.as_str()),
        Some("Hello, World!")
    );
}

#[test]
fn add_prints_sum() {
    let cases = [(["add", "2", "3"], "5\n"), (["add", "-2", "3"], "1\n")];

    for (args, expected) in cases {
        let output = cmd().args(args).output().expect("add");
        assert!(output.status.success());
        assert_eq!(stdout_text(&output), expected, "{args:?}");
    }
}

#[test]
fn add_json_envelope() {
    let output = cmd().args(["add", "2", "3", "--json"]).output().expect("add");
    assert!(output.status.success());
    let value = parse_json(&stdout_text(&output));
    assert_eq!(value.get("op").and_then(|v| v.as_str()), Some("add"));
    assert_eq!(value.get("a").and_then(|v| v.as_i64()), Some(2));
    assert_eq!(value.get("b").and_then(|v| v.as_i64()), Some(3));
    assert_eq!(value.get("result").and_then(|v| v.as_i64()), Some(5));
}

#[test]
fn mul_prints_product() {
    let cases = [(["mul", "3", "4"], "12\n"), (["mul", "-2", "3"], "-6\n")];

    for (args, expected) in cases {
        let output = cmd().args(args).output().expect("mul");
        assert!(output.status.success());
        assert_eq!(stdout_text(&output), expected, "{args:?}");
    }
}

#[test]
fn greet_prints_greeting() {
    let cases = [
        (["greet", "Alice"], "Hello, Alice!\n"),
        (["greet", ""], "Hello, !\n"),
        (["greet", "John Doe"], "Hello, John Doe!\n"),
    ];

    for (args, expected) in cases {
        let output = cmd().args(args).output().expect("greet");
        assert!(output.status.success());
        assert_eq!(stdout_text(&output), expected, "{args:?}");
    }
}

#[test]
fn greet_json_envelope() {
    let output = cmd()
        .args(["greet", "Alice", "--json"])
        .output()
        .expect("greet");
    assert!(output.status.success());
    let value = parse_json(&stdout_text(&output));
    assert_eq!(value.get("op").and_then(|v| v.as_str()), Some("greet"));
    assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("Alice"));
    assert_eq!(
        value.get("result").and_then(|v| v.as_str()),
        Some("Hello, Alice!")
    );
}

#[test]
fn missing_operand_is_usage_error() {
    let output = cmd().args(["add", "2"]).output().expect("add");
    assert_eq!(output.status.code().unwrap(), 2);

    let stderr = String::from_utf8_lossy(&output.stderr);
    let value = parse_json(stderr.lines().next().expect("stderr line"));
    assert_eq!(
        value.pointer("/error/kind").and_then(|v| v.as_str()),
        Some("Usage")
    );
}

#[test]
fn invalid_bench_format_is_usage_error() {
    let output = cmd()
        .args(["bench", "--format", "yaml"])
        .output()
        .expect("bench");
    assert_eq!(output.status.code().unwrap(), 2);

    let stderr = String::from_utf8_lossy(&output.stderr);
    let value = parse_json(stderr.lines().next().expect("stderr line"));
    let message = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .expect("error message");
    assert!(message.contains("invalid --format"), "{message}");
}

#[test]
fn version_emits_json_when_piped() {
    let output = cmd().arg("version").output().expect("version");
    assert!(output.status.success());
    let value = parse_json(&stdout_text(&output));
    assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("primer"));
    assert_eq!(
        value.get("version").and_then(|v| v.as_str()),
        Some(env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn bench_writes_report_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let out = temp.path().join("bench.json");

    let output = cmd()
        .args([
            "bench",
            "--iters",
            "64",
            "--rounds",
            "2",
            "--format",
            "json",
            "--out",
            out.to_str().unwrap(),
        ])
        .output()
        .expect("bench");
    assert!(output.status.success());

    // stdout carries the same report as the --out file.
    let stdout_report = parse_json(&stdout_text(&output));
    let file_report = parse_json(&std::fs::read_to_string(&out).expect("report file"));
    assert_eq!(stdout_report, file_report);

    assert_eq!(
        file_report.get("name").and_then(|v| v.as_str()),
        Some("primer")
    );
    assert_eq!(
        file_report.pointer("/params/iters").and_then(|v| v.as_u64()),
        Some(64)
    );
    let results = file_report
        .get("results")
        .and_then(|v| v.as_array())
        .expect("results array");
    let benches = results
        .iter()
        .map(|entry| entry.get("bench").and_then(|v| v.as_str()).unwrap_or("?"))
        .collect::<Vec<_>>();
    assert_eq!(
        benches,
        ["add", "mul", "greet/5", "greet/64", "greet/1024"]
    );
    for entry in results {
        let p50 = entry
            .pointer("/ns_per_call/p50")
            .and_then(|v| v.as_f64())
            .expect("p50");
        assert!(p50 >= 0.0);
        assert!(
            entry
                .get("calls_per_sec")
                .and_then(|v| v.as_f64())
                .expect("calls_per_sec")
                > 0.0
        );
    }
}

#[test]
fn zero_iters_is_usage_error() {
    let output = cmd().args(["bench", "--iters", "0"]).output().expect("bench");
    assert_eq!(output.status.code().unwrap(), 2);
}
