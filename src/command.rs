//! External command execution
//!
//! Downloads (and optionally page fetches) are delegated to user-configured
//! command lines such as `transmission-remote --add {link}`. Placeholders are
//! substituted with shell-quoted values and the line is run through the
//! platform shell.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Captured result of a finished command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally
    pub status: Option<i32>,
    /// Whether the process exited with status zero
    pub success: bool,
    /// Standard output (lossy UTF-8)
    pub stdout: String,
    /// Standard error (lossy UTF-8)
    pub stderr: String,
}

impl CommandOutput {
    /// Short description of a failed run for error messages
    pub fn failure_summary(&self) -> String {
        let status = self
            .status
            .map(|code| format!("exit status {}", code))
            .unwrap_or_else(|| "terminated by signal".to_string());
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        }
    }
}

/// Runs a command line and captures its output
///
/// A nonzero exit is returned as `Ok` with `success == false`; only failure to
/// start the command is an error. Callers decide what a nonzero exit means.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command_line` to completion
    async fn run(&self, command_line: &str) -> Result<CommandOutput>;

    /// Name of this runner for logging
    fn name(&self) -> &'static str;
}

/// Runs command lines through `sh -c` (or `cmd /C` on Windows)
#[derive(Clone, Debug)]
pub struct ShellCommandRunner {
    shell: PathBuf,
}

impl ShellCommandRunner {
    /// Use an explicit shell binary
    pub fn new(shell: PathBuf) -> Self {
        Self { shell }
    }

    /// Locate the platform shell in PATH
    pub fn from_path() -> Option<Self> {
        which::which(default_shell()).ok().map(Self::new)
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::from_path().unwrap_or_else(|| Self::new(PathBuf::from(default_shell())))
    }
}

#[cfg(not(windows))]
fn default_shell() -> &'static str {
    "sh"
}

#[cfg(windows)]
fn default_shell() -> &'static str {
    "cmd"
}

#[cfg(not(windows))]
const SHELL_FLAG: &str = "-c";

#[cfg(windows)]
const SHELL_FLAG: &str = "/C";

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, command_line: &str) -> Result<CommandOutput> {
        tracing::debug!(shell = %self.shell.display(), command = command_line, "running command");

        let output = Command::new(&self.shell)
            .arg(SHELL_FLAG)
            .arg(command_line)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::ExternalTool(format!(
                    "failed to execute {}: {}",
                    self.shell.display(),
                    e
                ))
            })?;

        Ok(CommandOutput {
            status: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn name(&self) -> &'static str {
        "shell"
    }
}

/// Replace every `placeholder` in `template` with the shell-quoted `value`
pub fn render_template(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(placeholder, &shell_quote(value))
}

/// Quote `value` as a single shell word
#[cfg(not(windows))]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Quote `value` as a single shell word
#[cfg(windows)]
pub fn shell_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
