//! End-to-end runs of the binary with scripted stdin.

use std::io::Write;
use std::process::{Command, Stdio};

fn run_shell(input: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_yash"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn shell");

    child
        .stdin
        .take()
        .expect("stdin was piped")
        .write_all(input.as_bytes())
        .expect("failed to write script");

    let output = child.wait_with_output().expect("failed to wait for shell");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

#[test]
fn test_runs_a_simple_command() {
    let (stdout, _, code) = run_shell("echo hello\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("hello"));
}

#[test]
fn test_empty_lines_produce_no_output() {
    let (stdout, stderr, code) = run_shell("\n\n\n");
    assert_eq!(code, 0);
    assert_eq!(stdout, "");
    assert_eq!(stderr, "");
}

#[test]
fn test_exits_zero_on_eof() {
    let (_, _, code) = run_shell("");
    assert_eq!(code, 0);
}

#[test]
fn test_pipeline_connects_two_processes() {
    let (stdout, _, code) = run_shell("echo hi | cat\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("hi"));
}

#[test]
fn test_missing_input_file_diagnostic() {
    let (_, stderr, code) = run_shell("cat < missing\n");
    assert_eq!(code, 0);
    assert!(
        stderr.contains("-yash: missing: No such file or directory"),
        "stderr was: {stderr:?}"
    );
}

#[test]
fn test_parse_error_is_reported_and_shell_continues() {
    let (stdout, _, code) = run_shell("a | b | c\necho still-alive\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("syntax error"));
    assert!(stdout.contains("still-alive"));
}

#[test]
fn test_jobs_lists_background_jobs_in_order() {
    let (stdout, _, code) = run_shell("sleep 2 &\nsleep 3 &\njobs\n");
    assert_eq!(code, 0);
    assert!(
        stdout.contains("[1]-\tRunning\t\t\tsleep 2 &"),
        "stdout was: {stdout:?}"
    );
    assert!(
        stdout.contains("[2]+\tRunning\t\t\tsleep 3 &"),
        "stdout was: {stdout:?}"
    );
}

#[test]
fn test_foreground_completion_leaves_no_job_behind() {
    let (stdout, _, code) = run_shell("true\njobs\n");
    assert_eq!(code, 0);
    assert_eq!(stdout, "");
}

#[test]
fn test_unknown_command_does_not_kill_the_shell() {
    let (stdout, _, code) = run_shell("definitely-not-a-command-xyz\necho done\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("done"));
}

#[test]
fn test_output_redirection_end_to_end() {
    let outfile = std::env::temp_dir().join(format!("yash_cli_{}.txt", std::process::id()));
    let outfile_str = outfile.to_string_lossy().to_string();

    let (_, _, code) = run_shell(&format!("echo written > {outfile_str}\n"));
    assert_eq!(code, 0);

    let contents = std::fs::read_to_string(&outfile).expect("redirect target exists");
    assert_eq!(contents, "written\n");
    std::fs::remove_file(&outfile).ok();
}
