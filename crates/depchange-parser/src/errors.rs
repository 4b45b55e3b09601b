use depchange_core::DetectError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParserError>;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid module config {path}: {message}")]
    TsConfig { path: PathBuf, message: String },

    #[error("Circular extends chain through {0}")]
    TsConfigCycle(PathBuf),

    #[error("Unsupported language: {0}")]
    Language(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid exclude pattern: {0}")]
    Glob(#[from] globset::Error),
}

impl ParserError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ParserError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ParserError> for DetectError {
    fn from(err: ParserError) -> Self {
        DetectError::Resolver(err.to_string())
    }
}
