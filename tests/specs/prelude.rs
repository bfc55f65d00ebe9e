//! Shared helpers for `gx` specs.

use assert_cmd::Command;

/// A `gx` invocation under construction.
pub struct CliBuilder {
    cmd: Command,
}

/// Start building a `gx` invocation with logging silenced.
pub fn cli() -> CliBuilder {
    let mut cmd = Command::cargo_bin("gx").expect("gx binary is built");
    cmd.env_remove("GX_LOG");
    CliBuilder { cmd }
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit code 0.
    pub fn passes(self) -> RunAssert {
        self.exits(0)
    }

    /// Run and require a non-zero exit code.
    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().expect("gx runs");
        let run = RunAssert::new(output);
        assert_ne!(run.code, 0, "expected failure\n{}", run.describe());
        run
    }

    /// Run and require a specific exit code.
    pub fn exits(mut self, code: i32) -> RunAssert {
        let output = self.cmd.output().expect("gx runs");
        let run = RunAssert::new(output);
        assert_eq!(run.code, code, "unexpected exit code\n{}", run.describe());
        run
    }
}

/// Captured result of a finished `gx` invocation.
pub struct RunAssert {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunAssert {
    fn new(output: std::process::Output) -> Self {
        Self {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    fn describe(&self) -> String {
        format!("--- stdout ---\n{}\n--- stderr ---\n{}", self.stdout, self.stderr)
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout lacks {:?}\n{}", needle, self.describe());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr lacks {:?}\n{}", needle, self.describe());
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stderr_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stderr, expected);
        self
    }
}
