//! CLI help output specs

use crate::prelude::*;

#[test]
fn gx_no_args_shows_usage_and_exits_zero() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn gx_help_lists_commands() {
    cli().args(&["--help"]).passes().stdout_has("run").stdout_has("exists");
}

#[test]
fn gx_run_help_shows_options() {
    cli()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--cwd")
        .stdout_has("--prefix")
        .stdout_has("--no-fail")
        .stdout_has("--encoding");
}

#[test]
fn gx_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn gx_unknown_command_fails() {
    cli().args(&["frobnicate"]).fails().stderr_has("frobnicate");
}
