use depchange_core::{ChangedFiles, HistorySource};
use std::cell::OnceCell;
use std::path::PathBuf;

use crate::{GitRepository, Result};

impl HistorySource for GitRepository {
    fn commit_count(&self) -> depchange_core::Result<usize> {
        Ok(GitRepository::commit_count(self)?)
    }

    fn changed_paths(&self, from: &str, to: &str) -> depchange_core::Result<ChangedFiles> {
        Ok(self.changed_files(from, to)?.into_iter().collect())
    }
}

/// Opens the repository on first use, so nothing touches git until the
/// procedure actually asks for history.
pub struct GitHistory {
    path: PathBuf,
    repo: OnceCell<GitRepository>,
}

impl GitHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            repo: OnceCell::new(),
        }
    }

    pub fn repository(&self) -> Result<&GitRepository> {
        if let Some(repo) = self.repo.get() {
            return Ok(repo);
        }
        let opened = GitRepository::open(&self.path)?;
        Ok(self.repo.get_or_init(|| opened))
    }

    pub fn is_opened(&self) -> bool {
        self.repo.get().is_some()
    }
}

impl HistorySource for GitHistory {
    fn commit_count(&self) -> depchange_core::Result<usize> {
        Ok(self.repository()?.commit_count()?)
    }

    fn changed_paths(&self, from: &str, to: &str) -> depchange_core::Result<ChangedFiles> {
        HistorySource::changed_paths(self.repository()?, from, to)
    }
}
