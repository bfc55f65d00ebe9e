// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{execute, ProcessState, KILLED_EXIT_CODE};
use proptest::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

async fn drain(handle: &mut Box<dyn ProcessHandle>) -> String {
    let mut out = String::new();
    handle.stdout().unwrap().read_to_string(&mut out).await.unwrap();
    out
}

fn start(git: &FakeExecutable, args: &[&str]) -> Box<dyn ProcessHandle> {
    git.start(&ArgumentString::from(args), StartOptions::new()).unwrap()
}

#[tokio::test]
async fn version_scenario() {
    let git = FakeExecutable::new();
    let _staged = git.stage_output("version", "tool version 2.40");

    let mut handle = start(&git, &["version"]);
    assert_eq!(drain(&mut handle).await, "tool version 2.40");
    assert_eq!(handle.error_text().unwrap(), "");
    assert_eq!(handle.wait_for_exit().unwrap(), Some(0));
    assert_eq!(handle.id(), None);
    git.verify();
}

#[tokio::test]
async fn failing_fetch_scenario() {
    let git = FakeExecutable::new();
    let _staged = git.stage(
        StagedOutput::new("fetch origin", "").exit_code(Some(1)).error("connection refused"),
    );

    let mut handle = start(&git, &["fetch", "origin"]);
    assert_eq!(drain(&mut handle).await, "");
    assert_eq!(handle.wait_for_exit().unwrap(), Some(1));
    assert_eq!(handle.error_text().unwrap(), "connection refused");
    git.verify();
}

#[tokio::test]
async fn failing_fetch_escalates_when_requested() {
    let git = FakeExecutable::new();
    let _staged = git.stage(
        StagedOutput::new("fetch origin", "").exit_code(Some(1)).error("connection refused"),
    );

    let err = execute(&git, &["fetch", "origin"].into(), StartOptions::new(), None)
        .await
        .unwrap_err();
    match err {
        ExecError::ExitedWithError { command, exit_code, stderr } => {
            assert_eq!(command, "mock-git fetch origin");
            assert_eq!(exit_code, 1);
            assert_eq!(stderr, "connection refused");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    git.verify();
}

#[tokio::test]
async fn same_signature_is_served_last_in_first_out() {
    let git = FakeExecutable::new();
    let _a = git.stage_output("status", "A");
    let _b = git.stage_output("status", "B");

    let mut first = start(&git, &["status"]);
    assert_eq!(drain(&mut first).await, "B");
    let mut second = start(&git, &["status"]);
    assert_eq!(drain(&mut second).await, "A");
    git.verify();
}

#[tokio::test]
async fn consumed_signature_leaves_no_stack_behind() {
    let git = FakeExecutable::new();
    let _a = git.stage_output("status", "A");
    let _b = git.stage_output("status", "B");

    let mut first = start(&git, &["status"]);
    drain(&mut first).await;
    assert!(git.inner.outputs.read().contains_key("status"));

    let mut second = start(&git, &["status"]);
    drain(&mut second).await;
    assert!(git.inner.outputs.read().is_empty());

    // the signature can be staged again after its stack is gone
    let _c = git.stage_output("status", "C");
    let mut third = start(&git, &["status"]);
    assert_eq!(drain(&mut third).await, "C");
    git.verify();
}

#[test]
fn unstaged_signature_fails_and_is_remembered() {
    let git = FakeExecutable::new();
    let err = git.start(&["unexpected-args"].into(), StartOptions::new()).err().unwrap();
    assert!(matches!(err, ExecError::UnexpectedArguments { arguments } if arguments == "unexpected-args"));

    let problems = git.check().unwrap_err().problems;
    assert_eq!(problems, ["unexpected arguments: `unexpected-args`"]);
}

#[test]
fn unstaged_signature_never_matches_a_prefix() {
    let git = FakeExecutable::new();
    let _staged = git.stage_output("log", "");
    assert!(git.start(&["log", "-1"].into(), StartOptions::new()).is_err());
    let handle = start(&git, &["log"]);
    drop(handle);
    assert!(git.check().is_err());
}

#[test]
fn unconsumed_output_fails_check() {
    let git = FakeExecutable::new();
    let staged = git.stage_output("branch", "main");
    let problems = git.check().unwrap_err().problems;
    assert_eq!(problems, ["staged output was not consumed: `branch` (output: \"main\")"]);
    std::mem::forget(staged);
}

#[tokio::test]
async fn partially_read_output_fails_check() {
    let git = FakeExecutable::new();
    let _staged = git.stage_output("log", "0123456789");

    let mut handle = start(&git, &["log"]);
    let mut buf = [0u8; 4];
    handle.stdout().unwrap().read_exact(&mut buf).await.unwrap();
    drop(handle);

    let problems = git.check().unwrap_err().problems;
    assert_eq!(problems, ["output of `log` was not read to the end (4 of 10 bytes read)"]);
}

#[tokio::test]
async fn unexpected_input_fails_check() {
    let git = FakeExecutable::new();
    let _staged = git.stage_output("hash-object --stdin", "abc123");

    let mut handle =
        git.start(&["hash-object", "--stdin"].into(), StartOptions::new().redirect_input(true)).unwrap();
    handle.stdin().unwrap().write_all(b"payload").await.unwrap();
    drain(&mut handle).await;

    let err = git.check().unwrap_err();
    assert_eq!(err.problems.len(), 1);
    assert!(err.problems[0].starts_with("unexpected input written to `hash-object --stdin`"));
}

#[tokio::test]
async fn expected_input_passes_check() {
    let git = FakeExecutable::new();
    let _staged =
        git.stage(StagedOutput::new("hash-object --stdin", "abc123\n").expect_input("payload"));

    let result = execute(&git, &["hash-object", "--stdin"].into(), StartOptions::new(), Some(b"payload".as_slice()))
        .await
        .unwrap();
    assert_eq!(result.output, "abc123\n");
    assert!(result.success());
    git.verify();
}

#[tokio::test]
async fn missing_expected_input_fails_check() {
    let git = FakeExecutable::new();
    let _staged = git.stage(StagedOutput::new("apply", "").expect_input("diff"));
    let mut handle = start(&git, &["apply"]);
    drain(&mut handle).await;
    assert!(git.check().is_err());
}

#[tokio::test]
async fn absent_exit_code_resolves_as_canceled() {
    let git = FakeExecutable::new();
    let _staged = git.stage(StagedOutput::new("daemon", "").exit_code(None));

    let mut handle = start(&git, &["daemon"]);
    drain(&mut handle).await;
    assert_eq!(handle.state(), ProcessState::Running);
    assert!(matches!(handle.wait_for_exit_async().await, Err(ExecError::Canceled)));
    assert!(matches!(handle.wait_for_exit(), Err(ExecError::Canceled)));
    let token = CancellationToken::new();
    assert!(matches!(handle.wait_for_exit_cancellable(&token).await, Err(ExecError::Canceled)));
    git.verify();
}

#[tokio::test]
async fn kill_moves_running_fake_to_exited_once() {
    let git = FakeExecutable::new();
    let _staged = git.stage(StagedOutput::new("daemon", "").exit_code(None));

    let mut handle = start(&git, &["daemon"]);
    drain(&mut handle).await;
    handle.kill(true).unwrap();
    assert_eq!(handle.state(), ProcessState::Exited(KILLED_EXIT_CODE));
    handle.kill(true).unwrap();
    assert_eq!(handle.state(), ProcessState::Exited(KILLED_EXIT_CODE));
    assert_eq!(handle.wait_for_exit_async().await.unwrap(), KILLED_EXIT_CODE);
}

#[tokio::test]
async fn kill_after_exit_keeps_exit_code() {
    let git = FakeExecutable::new();
    let _staged = git.stage(StagedOutput::new("gc", "").exit_code(Some(2)));
    let mut handle = start(&git, &["gc"]);
    drain(&mut handle).await;
    handle.kill(false).unwrap();
    assert_eq!(handle.wait_for_exit().unwrap(), Some(2));
}

#[tokio::test]
async fn disposal_before_exit() {
    let git = FakeExecutable::new();
    let _staged = git.stage(StagedOutput::new("daemon", "").exit_code(None));
    let mut handle = start(&git, &["daemon"]);
    drain(&mut handle).await;

    handle.dispose();
    assert_eq!(handle.state(), ProcessState::Disposed);
    assert_eq!(handle.wait_for_exit().unwrap(), None);
    assert!(matches!(handle.wait_for_exit_async().await, Err(ExecError::Disposed)));
    assert!(matches!(handle.wait_for_input_idle(), Err(ExecError::Disposed)));
    handle.kill(true).unwrap();
    assert_eq!(handle.state(), ProcessState::Disposed);
}

#[test]
fn redirection_flags_are_enforced() {
    let git = FakeExecutable::new();
    let _staged = git.stage_output("status", "");
    let mut handle = git.start(&["status"].into(), StartOptions::new().redirect_output(false)).unwrap();

    assert!(matches!(handle.stdin().err(), Some(ExecError::NotRedirected { .. })));
    assert!(matches!(handle.stdout().err(), Some(ExecError::NotRedirected { .. })));
    assert!(matches!(handle.error_text(), Err(ExecError::NotRedirected { .. })));
    assert!(handle.wait_for_input_idle().is_ok());
    git.verify();
}

#[test]
fn closed_stdin_reports_closed() {
    let git = FakeExecutable::new();
    let _staged = git.stage_output("status", "");
    let mut handle = git.start(&["status"].into(), StartOptions::new().redirect_input(true)).unwrap();
    handle.close_stdin();
    assert!(matches!(handle.stdin().err(), Some(ExecError::StreamClosed { .. })));
}

#[tokio::test]
async fn taken_streams_are_owned_by_the_caller() {
    let git = FakeExecutable::new();
    let _staged =
        git.stage(StagedOutput::new("hash-object --stdin", "e69de29\n").expect_input("blob"));
    let mut handle =
        git.start(&["hash-object", "--stdin"].into(), StartOptions::new().redirect_input(true)).unwrap();

    let mut stdin = handle.take_stdin().unwrap();
    let mut stdout = handle.take_stdout().unwrap();
    assert!(matches!(handle.stdin().err(), Some(ExecError::StreamClosed { .. })));
    assert!(matches!(handle.take_stdout().err(), Some(ExecError::StreamClosed { .. })));

    stdin.write_all(b"blob").await.unwrap();
    drop(stdin);
    let mut out = String::new();
    stdout.read_to_string(&mut out).await.unwrap();
    assert_eq!(out, "e69de29\n");
    git.verify();
}

#[test]
fn taking_unredirected_streams_fails() {
    let git = FakeExecutable::new();
    let _staged = git.stage_output("status", "");
    let mut handle = git.start(&["status"].into(), StartOptions::new().redirect_output(false)).unwrap();
    assert!(matches!(handle.take_stdin().err(), Some(ExecError::NotRedirected { .. })));
    assert!(matches!(handle.take_stdout().err(), Some(ExecError::NotRedirected { .. })));
    git.verify();
}

#[test]
fn staged_command_succeeds_with_empty_output() {
    let git = FakeExecutable::new();
    let _cmd = git.stage_command("remote add origin url");
    let handle = start(&git, &["remote", "add", "origin", "url"]);
    assert_eq!(handle.wait_for_exit().unwrap(), Some(0));
    assert_eq!(handle.error_text().unwrap(), "");
    git.verify();
}

#[test]
fn staged_command_is_consumed_once() {
    let git = FakeExecutable::new();
    let _cmd = git.stage_command("prune");
    let _first = start(&git, &["prune"]);
    assert!(git.start(&["prune"].into(), StartOptions::new()).is_err());
}

#[test]
fn output_takes_precedence_over_command() {
    let git = FakeExecutable::new();
    let _cmd = git.stage_command("status");
    let _out = git.stage_output("status", "");
    let _handle = start(&git, &["status"]);
    let _handle2 = start(&git, &["status"]);
    git.verify();
}

#[test]
fn unconsumed_command_fails_check() {
    let git = FakeExecutable::new();
    let cmd = git.stage_command("gc --auto");
    assert_eq!(git.check().unwrap_err().problems, ["staged command was not consumed: `gc --auto`"]);
    std::mem::forget(cmd);
}

#[test]
#[should_panic(expected = "staged output should have been consumed")]
fn dropping_unconsumed_output_registration_panics() {
    let git = FakeExecutable::new();
    let _staged = git.stage_output("status", "clean");
}

#[test]
fn registration_is_pending_until_consumed() {
    let git = FakeExecutable::new();
    let staged = git.stage_output("status", "");
    assert!(staged.is_pending());
    assert_eq!(staged.arguments(), "status");
    let _handle = start(&git, &["status"]);
    assert!(!staged.is_pending());
}

#[test]
#[should_panic(expected = "staged command should have been consumed")]
fn superseded_unconsumed_command_registration_panics() {
    let git = FakeExecutable::new();
    let first = git.stage_command("fetch");
    let second = git.stage_command("fetch");
    assert_eq!(second.arguments(), "fetch");
    drop(second);
    drop(first);
}

#[test]
fn canceled_start_does_not_consume() {
    let git = FakeExecutable::new();
    let _staged = git.stage_output("pull", "");
    let token = CancellationToken::new();
    token.cancel();

    let err = git.start(&["pull"].into(), StartOptions::new().cancellation(token)).err().unwrap();
    assert!(matches!(err, ExecError::Canceled));
    let _handle = start(&git, &["pull"]);
    git.verify();
}

#[test]
fn calls_are_recorded_in_order() {
    let git = FakeExecutable::new();
    let _a = git.stage_command("fetch");
    let _b = git.stage_command("status");
    let _h1 = start(&git, &["fetch"]);
    let _h2 = git.start(&["status"].into(), StartOptions::new().throw_on_error_exit(false)).unwrap();

    let calls = git.calls();
    assert_eq!(calls.iter().map(|c| c.arguments.as_str()).collect::<Vec<_>>(), ["fetch", "status"]);
    assert!(!calls[1].options.throw_on_error_exit);
}

#[test]
fn default_descriptor_and_exists() {
    let git = FakeExecutable::new();
    assert_eq!(git.descriptor().command(), "mock-git");
    assert!(git.exists());
}

#[test]
fn concurrent_staging_across_signatures() {
    let git = FakeExecutable::new();
    let threads: Vec<_> = (0..8)
        .map(|t| {
            let git = git.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    let signature = format!("show {}-{}", t, i);
                    let staged = git.stage_output(signature.clone(), "");
                    let args: ArgumentString = signature.split(' ').collect();
                    let _handle = git.start(&args, StartOptions::new()).unwrap();
                    drop(staged);
                }
            })
        })
        .collect();
    for handle in threads {
        handle.join().unwrap();
    }
    git.verify();
    assert_eq!(git.calls().len(), 400);
}

#[test]
fn concurrent_pops_on_one_signature_serve_each_entry_once() {
    let git = FakeExecutable::new();
    let registrations: Vec<_> =
        (0..64).map(|i| git.stage_output("rev-parse HEAD", format!("{i}"))).collect();

    let threads: Vec<_> = (0..4)
        .map(|_| {
            let git = git.clone();
            std::thread::spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let mut seen = Vec::new();
                for _ in 0..16 {
                    let mut handle = git.start(&["rev-parse", "HEAD"].into(), StartOptions::new()).unwrap();
                    seen.push(runtime.block_on(drain(&mut handle)));
                }
                seen
            })
        })
        .collect();

    let mut seen: Vec<usize> =
        threads.into_iter().flat_map(|t| t.join().unwrap()).map(|s| s.parse().unwrap()).collect();
    seen.sort();
    assert_eq!(seen, (0..64).collect::<Vec<_>>());
    drop(registrations);
    git.verify();
}

proptest! {
    #[test]
    fn staged_tuple_is_served_exactly(
        args in proptest::collection::vec("[a-z][a-z0-9-]{0,8}", 1..4),
        output in ".{0,64}",
        exit_code in -1i32..256,
        error in proptest::option::of(".{0,32}"),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let git = FakeExecutable::new();
        let arguments: ArgumentString = args.iter().map(String::as_str).collect();
        let mut staged = StagedOutput::new(arguments.to_string(), output.clone()).exit_code(Some(exit_code));
        if let Some(error) = &error {
            staged = staged.error(error.clone());
        }
        let _registration = git.stage(staged);

        let mut handle = git.start(&arguments, StartOptions::new()).unwrap();
        prop_assert_eq!(runtime.block_on(drain(&mut handle)), output);
        prop_assert_eq!(handle.error_text().unwrap(), error.unwrap_or_default());
        prop_assert_eq!(handle.wait_for_exit().unwrap(), Some(exit_code));
        prop_assert!(git.check().is_ok());
    }
}
