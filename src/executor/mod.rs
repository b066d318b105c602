/*!
Subprocess execution for mapped requests.

  - spawn the re-invocation target with the mapped arguments
  - capture stdout / stderr separately (lossy UTF-8)
  - non-zero exit or spawn failure -> error, no partial output
  - optional concurrency bound (semaphore) with Queue / Reject overflow

No retry. The child is killed if the awaiting future is dropped, which is
how the hosting layer's per-request timeout reclaims hung processes.
*/

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::{Error, Result};
use crate::mapper::Invocation;

/// What to do when every execution slot is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Wait for a slot.
    #[default]
    Queue,
    /// Fail immediately with [`Error::Busy`].
    Reject,
}

/// Captured output of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    /// stdout, with stderr appended in parentheses when non-empty.
    pub fn into_body(self) -> String {
        if self.stderr.is_empty() {
            self.stdout
        } else {
            format!("{}({})", self.stdout, self.stderr)
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandExecutor {
    permits: Option<Arc<Semaphore>>,
    limit: usize,
    overflow: Overflow,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl CommandExecutor {
    /// At most `limit` concurrent children; `0` means no bound.
    pub fn new(limit: usize, overflow: Overflow) -> Self {
        Self {
            permits: (limit > 0).then(|| Arc::new(Semaphore::new(limit))),
            limit,
            overflow,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0, Overflow::Queue)
    }

    pub fn limit(&self) -> Option<usize> {
        self.permits.as_ref().map(|_| self.limit)
    }

    pub async fn run(&self, invocation: &Invocation) -> Result<CapturedOutput> {
        let _permit = match (&self.permits, self.overflow) {
            (None, _) => None,
            (Some(sem), Overflow::Queue) => Some(
                sem.clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::Busy { limit: self.limit })?,
            ),
            (Some(sem), Overflow::Reject) => Some(
                sem.clone()
                    .try_acquire_owned()
                    .map_err(|_| Error::Busy { limit: self.limit })?,
            ),
        };

        debug!(command = %invocation.command_line(), "spawning");
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: invocation.program.display().to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(Error::Exited {
                status: output.status,
                stderr,
            });
        }

        Ok(CapturedOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn sh(script: &str) -> Invocation {
        Invocation {
            program: PathBuf::from("sh"),
            args: vec!["-c".into(), script.into()],
        }
    }

    #[test]
    fn body_appends_stderr_in_parens() {
        let out = CapturedOutput {
            stdout: "8\n".into(),
            stderr: "warn".into(),
        };
        assert_eq!(out.into_body(), "8\n(warn)");
        let quiet = CapturedOutput {
            stdout: "8\n".into(),
            stderr: String::new(),
        };
        assert_eq!(quiet.into_body(), "8\n");
    }

    #[test]
    fn zero_limit_is_unbounded() {
        assert_eq!(CommandExecutor::new(0, Overflow::Reject).limit(), None);
        assert_eq!(CommandExecutor::new(3, Overflow::Queue).limit(), Some(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_and_stderr_separately() {
        let out = CommandExecutor::unbounded()
            .run(&sh("echo out; echo err 1>&2"))
            .await
            .unwrap();
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let err = CommandExecutor::unbounded()
            .run(&sh("echo partial; echo broken 1>&2; exit 3"))
            .await
            .unwrap_err();
        match &err {
            Error::Exited { status, stderr } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "broken\n");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("broken"));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let inv = Invocation {
            program: PathBuf::from("/definitely/not/here/garter-missing"),
            args: vec![],
        };
        let err = CommandExecutor::unbounded().run(&inv).await.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
        assert!(err.is_execution());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reject_policy_fails_fast_when_saturated() {
        let exec = CommandExecutor::new(1, Overflow::Reject);
        let slow = exec.clone();
        let running = tokio::spawn(async move { slow.run(&sh("sleep 1")).await });
        tokio::time::sleep(Duration::from_millis(200)).await;

        let err = exec.run(&sh("echo hi")).await.unwrap_err();
        assert!(matches!(err, Error::Busy { limit: 1 }));

        running.await.unwrap().unwrap();
        assert_eq!(exec.run(&sh("echo hi")).await.unwrap().stdout, "hi\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn queue_policy_waits_for_a_slot() {
        let exec = CommandExecutor::new(1, Overflow::Queue);
        let first = exec.clone();
        let running = tokio::spawn(async move { first.run(&sh("sleep 0.3; echo a")).await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let out = exec.run(&sh("echo b")).await.unwrap();
        assert_eq!(out.stdout, "b\n");
        assert_eq!(running.await.unwrap().unwrap().stdout, "a\n");
    }
}
