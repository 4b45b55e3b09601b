use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error("GITHUB_WORKSPACE is not defined.")]
    WorkspaceRootMissing,

    #[error("The file \"{0}\" does not exist.")]
    TargetNotFound(String),

    #[error("Error checking commit history: {0}")]
    History(String),

    #[error("Dependency resolution failed: {0}")]
    Resolver(String),

    #[error(
        "The following files were referenced but could not be found: {}",
        .0.join(", ")
    )]
    UnresolvedReferences(Vec<String>),
}

impl DetectError {
    /// Whether the failure happened before any repository access.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DetectError::MissingInput(_) | DetectError::WorkspaceRootMissing
        )
    }
}

pub type Result<T> = std::result::Result<T, DetectError>;
