use crate::domain::command::BtpCommand;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Runs the real btp binary as a child process, without a shell.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

/// Everything a finished btp invocation left behind.
#[derive(Debug, Clone)]
pub struct CommandCapture {
    pub success: bool,
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Runs `command` to completion and keeps both output streams.
    pub async fn capture(&self, command: &BtpCommand) -> Result<CommandCapture> {
        let output = Command::new(&self.program)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ProvisionError::CommandSpawn {
                command: command.render(&self.display_name()),
                source,
            })?;

        Ok(CommandCapture {
            success: output.status.success(),
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Passes btp's stderr through and, with `echo`, prints the masked command
/// followed by its output.
fn report_success(
    out: &mut impl Write,
    err: &mut impl Write,
    rendered: &str,
    capture: &CommandCapture,
    echo: bool,
) -> std::io::Result<()> {
    if !capture.stderr.trim().is_empty() {
        tracing::debug!(command = %rendered, "forwarding btp stderr");
        err.write_all(capture.stderr.as_bytes())?;
        if !capture.stderr.ends_with('\n') {
            writeln!(err)?;
        }
    }
    if echo {
        writeln!(out, "Command: {}\nOutput:\n{}\n", rendered, capture.stdout)?;
    }
    Ok(())
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &BtpCommand, echo: bool) -> Result<String> {
        let rendered = command.render(&self.display_name());
        tracing::debug!("🔧 Running: {}", rendered);

        let capture = self.capture(command).await?;

        if !capture.success {
            let combined = if capture.stderr.trim().is_empty() {
                capture.stdout
            } else {
                format!("{}{}", capture.stdout, capture.stderr)
            };
            let status = capture.status;

            eprintln!("Command failed with exit status {}", status);
            eprintln!("Command: {}", rendered);
            eprintln!(
                "Output: {}",
                if combined.trim().is_empty() { "No output" } else { combined.as_str() }
            );
            tracing::error!(status, command = %rendered, "btp command failed");

            return Err(ProvisionError::CommandFailed {
                command: rendered,
                status,
                output: combined,
            });
        }

        report_success(
            &mut std::io::stdout().lock(),
            &mut std::io::stderr().lock(),
            &rendered,
            &capture,
            echo,
        )?;

        Ok(capture.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Writes an executable shell script standing in for the btp binary.
    fn fake_btp(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("btp");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_captures_stdout_and_passes_args_verbatim() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::new(fake_btp(&dir, r#"printf '%s\n' "$@""#));

        let command = BtpCommand::new("create", "services/instance")
            .arg("--parameters", r#"{"grantType": "clientCredentials"}"#);
        let output = runner.run(&command, false).await.unwrap();

        assert_eq!(
            output.lines().collect::<Vec<_>>(),
            vec![
                "create",
                "services/instance",
                "--parameters",
                r#"{"grantType": "clientCredentials"}"#
            ]
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::new(fake_btp(
            &dir,
            "echo 'partial'; echo 'boom' >&2; exit 3",
        ));

        let command = BtpCommand::login().arg("--password", "hunter2");
        let err = runner.run(&command, false).await.unwrap_err();

        match err {
            ProvisionError::CommandFailed {
                command,
                status,
                output,
            } => {
                assert_eq!(status, 3);
                assert!(!command.contains("hunter2"));
                assert!(output.contains("partial"));
                assert!(output.contains("boom"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::new(dir.path().join("does-not-exist"));

        let err = runner.run(&BtpCommand::login(), false).await.unwrap_err();
        assert!(matches!(err, ProvisionError::CommandSpawn { .. }));
    }

    #[tokio::test]
    async fn test_stderr_of_successful_command_is_forwarded() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::new(fake_btp(
            &dir,
            "echo '{\"value\": []}'; echo 'WARNING: a newer btp version is available' >&2",
        ));
        let command = BtpCommand::json("list", "accounts/subaccount");

        let capture = runner.capture(&command).await.unwrap();
        assert!(capture.success);
        assert!(capture.stderr.contains("newer btp version"));

        let (mut out, mut err) = (Vec::new(), Vec::new());
        report_success(&mut out, &mut err, "btp list", &capture, false).unwrap();
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "WARNING: a newer btp version is available\n"
        );

        let stdout = runner.run(&command, false).await.unwrap();
        assert_eq!(stdout.trim(), r#"{"value": []}"#);
    }

    #[tokio::test]
    async fn test_echo_prints_masked_command_and_output() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::new(fake_btp(&dir, "echo 'Authentication successful'"));
        let command = BtpCommand::login()
            .arg("--user", "svc-user")
            .arg("--password", "hunter2");
        let rendered = command.render("btp");

        let capture = runner.capture(&command).await.unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        report_success(&mut out, &mut err, &rendered, &capture, true).unwrap();
        let echoed = String::from_utf8(out).unwrap();
        assert!(echoed.starts_with(
            "Command: btp login --user svc-user --password ********\nOutput:\n"
        ));
        assert!(echoed.contains("Authentication successful"));
        assert!(!echoed.contains("hunter2"));
        assert!(err.is_empty());

        let mut quiet = Vec::new();
        report_success(&mut quiet, &mut err, &rendered, &capture, false).unwrap();
        assert!(quiet.is_empty());
    }
}
