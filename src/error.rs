/*!
Error taxonomy shared by the mapper, the description generator and the executor.

Classes:
  - UnknownPath     (request path does not resolve in the command tree)
  - SpecGeneration  (description document could not be serialized)
  - Execution       (Spawn / Exited / TimedOut / Busy)

All of them are answered with 500 except `Busy`: it is the one
execution-class variant surfaced as 503.

Every variant is terminal for the request that produced it; none of them
take the server down.
*/

use std::process::ExitStatus;
use std::time::Duration;

/// Convenience alias used across the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path segment matched no child of the node resolved so far.
    #[error(
        "Error: Failed to generate command: unknown path segment '{segment}' after '{resolved}'"
    )]
    UnknownPath { segment: String, resolved: String },

    #[error("Error: Failed to generate swagger file: {0}")]
    SpecGeneration(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Error: Failed to run command: could not start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error: Failed to run command: {status}{}", stderr_suffix(.stderr))]
    Exited { status: ExitStatus, stderr: String },

    #[error("Error: Failed to run command: timed out after {after:?}")]
    TimedOut { after: Duration },

    #[error("Error: Failed to run command: {limit} commands already running")]
    Busy { limit: usize },
}

impl Error {
    /// True for the subprocess class (spawn failure, abnormal exit, timeout, saturation).
    pub fn is_execution(&self) -> bool {
        matches!(
            self,
            Error::Spawn { .. } | Error::Exited { .. } | Error::TimedOut { .. } | Error::Busy { .. }
        )
    }

    /// HTTP status code the router answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Busy { .. } => 503,
            _ => 500,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::SpecGeneration(Box::new(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SpecGeneration(Box::new(e))
    }
}
