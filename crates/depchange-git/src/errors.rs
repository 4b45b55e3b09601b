use depchange_core::DetectError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitIntegrationError>;

#[derive(Debug, Error)]
pub enum GitIntegrationError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository not found at path: {0}")]
    RepoNotFound(String),

    #[error("Revision not found: {0}")]
    RevisionNotFound(String),

    #[error("Invalid UTF-8 in path")]
    InvalidUtf8,
}

impl From<GitIntegrationError> for DetectError {
    fn from(err: GitIntegrationError) -> Self {
        DetectError::History(err.to_string())
    }
}
