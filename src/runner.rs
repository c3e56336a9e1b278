/// Command runner seam — every external CLI invocation goes through here.
///
/// All provisioning work is delegated to external binaries (aws, kubectl,
/// eksctl, docker, the OS package manager). The trait keeps the steps
/// testable without those binaries installed.
use crate::error::{ProvisionError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Execution result from an invoked command
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Exit code
    pub exit_code: i32,

    /// Standard output
    pub stdout: String,

    /// Standard error
    pub stderr: String,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last line of stderr, for compact failure messages
    pub fn last_stderr_line(&self) -> &str {
        self.stderr.lines().last().unwrap_or("No output available")
    }
}

/// External command invocation trait
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command, capturing output. A non-zero exit code is not an
    /// error at this level; callers decide what is fatal.
    async fn run(&self, program: &str, args: &[String]) -> Result<ExecResult>;

    /// Run a command with data piped to its stdin.
    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[String],
        stdin: &str,
    ) -> Result<ExecResult>;

    /// Run a shell pipeline via `sh -c`.
    async fn run_shell(&self, script: &str) -> Result<ExecResult>;

    /// Locate a tool on PATH.
    fn lookup(&self, tool: &str) -> Option<PathBuf>;
}

/// Runs commands directly on the host.
pub struct HostRunner;

impl HostRunner {
    pub fn new() -> Self {
        Self
    }

    fn to_exec_result(output: std::process::Output) -> ExecResult {
        ExecResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

impl Default for HostRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for HostRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ExecResult> {
        tracing::debug!("[HostRunner] Running: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                ProvisionError::Runtime(format!("Failed to spawn {}: {}", program, e))
            })?;

        Ok(Self::to_exec_result(output))
    }

    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[String],
        stdin: &str,
    ) -> Result<ExecResult> {
        tracing::debug!(
            "[HostRunner] Running with stdin: {} {}",
            program,
            args.join(" ")
        );

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ProvisionError::Runtime(format!("Failed to spawn {}: {}", program, e))
            })?;

        if let Some(mut handle) = child.stdin.take() {
            handle.write_all(stdin.as_bytes()).await.map_err(|e| {
                ProvisionError::Runtime(format!("Failed to write stdin to {}: {}", program, e))
            })?;
            // Drop closes the pipe so the child sees EOF
        }

        let output = child.wait_with_output().await.map_err(|e| {
            ProvisionError::Runtime(format!("Failed to wait for {}: {}", program, e))
        })?;

        Ok(Self::to_exec_result(output))
    }

    async fn run_shell(&self, script: &str) -> Result<ExecResult> {
        self.run("sh", &["-c".to_string(), script.to_string()]).await
    }

    fn lookup(&self, tool: &str) -> Option<PathBuf> {
        let path_var = std::env::var_os("PATH")?;
        for dir in std::env::split_paths(&path_var) {
            let candidate = dir.join(tool);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}
