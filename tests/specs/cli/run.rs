//! Tests for `gx run` command behavior.

#![cfg(unix)]

use crate::prelude::*;

#[test]
fn relays_output_and_exit_code() {
    cli().args(&["run", "echo", "hello", "world"]).passes().stdout_eq("hello world\n");
}

#[test]
fn relays_error_text_to_stderr() {
    cli()
        .args(&["run", "sh", "-c", "echo out; echo err >&2"])
        .passes()
        .stdout_eq("out\n")
        .stderr_eq("err\n");
}

#[test]
fn failing_command_escalates_with_child_code() {
    cli()
        .args(&["run", "sh", "-c", "echo rejected >&2; exit 7"])
        .exits(7)
        .stderr_has("rejected")
        .stderr_has("gx: `sh -c \"echo rejected >&2; exit 7\"` exited with code 7");
}

#[test]
fn failing_command_still_relays_its_output() {
    cli()
        .args(&["run", "sh", "-c", "echo hi; echo bad >&2; exit 3"])
        .exits(3)
        .stdout_eq("hi\n")
        .stderr_has("bad\n")
        .stderr_has("gx: `sh -c \"echo hi; echo bad >&2; exit 3\"` exited with code 3");
}

#[test]
fn input_larger_than_a_pipe_buffer_round_trips() {
    // one argv entry is capped at 128 KiB on Linux
    let input = "x".repeat(100_000);
    let run = cli().args(&["run", "--input", &input, "cat"]).passes();
    assert_eq!(run.stdout.len(), input.len());
}

#[test]
fn no_fail_reports_code_without_message() {
    let run = cli().args(&["run", "--no-fail", "sh", "-c", "exit 5"]).exits(5);
    assert!(!run.stderr.contains("gx:"), "unexpected message: {}", run.stderr);
}

#[test]
fn writes_input_to_child() {
    cli().args(&["run", "--input", "piped text", "cat"]).passes().stdout_eq("piped text");
}

#[test]
fn prefix_arguments_precede_arguments() {
    cli()
        .args(&["run", "--prefix", "first", "--prefix", "second", "echo", "third"])
        .passes()
        .stdout_eq("first second third\n");
}

#[test]
fn runs_in_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "found me").unwrap();

    cli()
        .args(&["run", "--cwd", dir.path().to_str().unwrap(), "cat", "marker.txt"])
        .passes()
        .stdout_eq("found me");
}

#[test]
fn latin1_encoding_decodes_each_byte() {
    cli()
        .args(&["run", "--encoding", "latin1", "printf", "caf\\303\\251"])
        .passes()
        .stdout_eq("cafÃ©");
}

#[test]
fn strict_utf8_rejects_invalid_output() {
    cli()
        .args(&["run", "--encoding", "utf8", "printf", "\\377"])
        .exits(1)
        .stderr_has("standard output is not valid utf8");
}

#[test]
fn missing_command_exits_127() {
    cli().args(&["run", "gx-no-such-tool-xyz"]).exits(127).stderr_has("failed to spawn");
}

#[test]
fn shell_mode_passes_exit_code_through() {
    cli().args(&["run", "--shell", "exit", "9"]).exits(9);
}

#[test]
fn shell_mode_rejects_input() {
    cli().args(&["run", "--shell", "--input", "x", "cat"]).fails();
}

#[test]
fn debug_logging_goes_to_stderr() {
    cli()
        .env("GX_LOG", "debug")
        .args(&["run", "echo", "quiet"])
        .passes()
        .stdout_eq("quiet\n")
        .stderr_has("execution finished");
}
