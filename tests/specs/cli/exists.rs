//! Tests for `gx exists`.

use crate::prelude::*;

#[cfg(unix)]
#[test]
fn finds_command_on_path() {
    cli().args(&["exists", "sh"]).passes().stdout_eq("sh: found\n");
}

#[test]
fn missing_command_exits_one() {
    cli().args(&["exists", "gx-no-such-tool-xyz"]).exits(1).stdout_has("not found");
}

#[test]
fn relative_path_resolves_against_cwd() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("bin")).unwrap();
    std::fs::write(dir.path().join("bin/tool"), "").unwrap();
    let cwd = dir.path().to_str().unwrap();

    cli().args(&["exists", "--cwd", cwd, "bin/tool"]).passes();
    cli().args(&["exists", "--cwd", cwd, "bin/other"]).exits(1);
}
