use serde::Serialize;
use thiserror::Error;

/// Failure reported by a backend collaborator call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for CommandError {
    fn from(error: std::io::Error) -> Self {
        CommandError::Io(error.to_string())
    }
}

impl From<String> for CommandError {
    fn from(message: String) -> Self {
        CommandError::Backend(message)
    }
}

impl Serialize for CommandError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Operations rejected by an import session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Author folder is required")]
    MissingAuthorDir,
    #[error("Cannot {action} while session is {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
    #[error("Draft row {index} out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },
    #[error("Scan failed: {0}")]
    ScanFailed(CommandError),
    #[error("Commit failed: {0}")]
    CommitFailed(CommandError),
}

/// Operations rejected by the bulk import runner.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BulkError {
    #[error("Bulk import already in progress")]
    AlreadyActive,
    #[error("No bulk import in progress")]
    NotActive,
    #[error("Current session is still open")]
    SessionOpen,
    #[error(transparent)]
    Session(#[from] SessionError),
}
