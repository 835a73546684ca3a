// src/exec/command.rs

//! Shell commands backing manifest units.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

/// A command line run through a shell, as configured in a manifest.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    unit: String,
    shell: String,
    line: String,
    env: BTreeMap<String, String>,
}

impl ShellCommand {
    pub fn new(
        unit: impl Into<String>,
        shell: impl Into<String>,
        line: impl Into<String>,
        env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            unit: unit.into(),
            shell: shell.into(),
            line: line.into(),
            env,
        }
    }

    /// Run to completion in `cwd`. A non-zero exit status is an error.
    pub fn run(&self, cwd: &Path) -> Result<()> {
        info!(unit = %self.unit, cmd = %self.line, "running command");

        let output = self
            .command(cwd)
            .output()
            .with_context(|| format!("spawning command for unit '{}'", self.unit))?;

        self.log_output(&output);

        if output.status.success() {
            return Ok(());
        }

        match output.status.code() {
            Some(code) => bail!("command `{}` exited with status {code}", self.line),
            None => bail!("command `{}` was terminated by a signal", self.line),
        }
    }

    /// Like [`ShellCommand::run`], but failures are only logged.
    pub fn run_logged(&self, cwd: &Path) {
        if let Err(err) = self.run(cwd) {
            warn!(unit = %self.unit, error = %format!("{err:#}"), "stop command failed");
        }
    }

    fn command(&self, cwd: &Path) -> Command {
        // `cmd` wants `/C`, POSIX shells want `-c`.
        let flag = if self.shell.eq_ignore_ascii_case("cmd") || self.shell.ends_with("cmd.exe") {
            "/C"
        } else {
            "-c"
        };

        let mut cmd = Command::new(&self.shell);
        cmd.arg(flag)
            .arg(&self.line)
            .current_dir(cwd)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn log_output(&self, output: &Output) {
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(unit = %self.unit, "stdout: {}", line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!(unit = %self.unit, "stderr: {}", line);
        }
    }
}
