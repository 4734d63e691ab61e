use thiserror::Error;

use crate::request::RequestError;

/// Uniform failure of a command. `Display` is the bare message so the CLI
/// edge can print it without knowing which stage failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Options rejected before any I/O.
    #[error("{0}")]
    Validation(String),
    /// No active connection to the service the command targets.
    #[error("{0}")]
    NotConnected(String),
    /// Token acquisition failed.
    #[error("{0}")]
    Authentication(String),
    /// The remote call failed or was rejected.
    #[error("{0}")]
    Request(String),
    /// Local terminal I/O failed (confirmation prompt).
    #[error("{0}")]
    Io(String),
}

impl CommandError {
    pub fn message(&self) -> &str {
        match self {
            CommandError::Validation(m)
            | CommandError::NotConnected(m)
            | CommandError::Authentication(m)
            | CommandError::Request(m)
            | CommandError::Io(m) => m,
        }
    }
}

impl From<RequestError> for CommandError {
    fn from(err: RequestError) -> Self {
        if let RequestError::Status { status, .. } = &err {
            tracing::debug!(status, "request rejected");
        }
        CommandError::Request(err.to_string())
    }
}
