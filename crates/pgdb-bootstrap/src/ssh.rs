//! Remote shell execution
//!
//! Streams a script to `bash -s` on the remote host. Output is inherited so
//! the operator watches remote progress live; the remote exit status is the
//! sole success signal.

use crate::error::{BootstrapError, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs scripts on a remote host over ssh.
pub struct SshExecutor {
    program: String,
}

impl Default for SshExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SshExecutor {
    pub fn new() -> Self {
        Self {
            program: "ssh".to_string(),
        }
    }

    /// Substitute the ssh binary. Tests point this at a local stand-in.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Stream `script` to `bash -s` on `target` (`user@host`) and wait for
    /// the remote exit status.
    pub async fn run_script(&self, target: &str, script: &str) -> Result<()> {
        tracing::debug!("streaming bootstrap script to {}", target);

        let mut child = Command::new(&self.program)
            .arg(target)
            .arg("bash -s")
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(BootstrapError::SshSpawn)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let status = child.wait().await?;
        if status.success() {
            return Ok(());
        }

        match status.code() {
            Some(code) => Err(BootstrapError::RemoteExit(code)),
            None => Err(BootstrapError::RemoteKilled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_a_spawn_error() {
        let executor = SshExecutor::with_program("/nonexistent/pgdb-test-ssh");
        let err = executor
            .run_script("root@203.0.113.9", "exit 0")
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::SshSpawn(_)));
    }
}
