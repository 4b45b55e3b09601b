use crate::errors::*;
use git2::{Commit, Delta, DiffOptions, Repository, RepositoryOpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct GitRepository {
    path: PathBuf,
    repo: Repository,
}

impl GitRepository {
    /// Opens the repository containing `path`, searching parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let repo = Repository::open_ext(
            path_ref,
            RepositoryOpenFlags::empty(),
            &[] as &[&std::ffi::OsStr],
        )
        .map_err(|_| GitIntegrationError::RepoNotFound(path_ref.display().to_string()))?;
        debug!(path = %path_ref.display(), "opened git repository");
        Ok(Self {
            path: path_ref.to_path_buf(),
            repo,
        })
    }

    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::init(path.as_ref())?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            repo,
        })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of commits reachable from `HEAD`, like `git rev-list --count HEAD`.
    pub fn commit_count(&self) -> Result<usize> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        let mut count = 0usize;
        for oid in revwalk {
            oid?;
            count += 1;
        }
        Ok(count)
    }

    pub fn resolve_commit(&self, spec: &str) -> Result<Commit<'_>> {
        let object = self
            .repo
            .revparse_single(spec)
            .map_err(|_| GitIntegrationError::RevisionNotFound(spec.to_string()))?;
        Ok(object.peel_to_commit()?)
    }

    pub fn diff_between(&self, base: &str, target: &str) -> Result<git2::Diff<'_>> {
        let base_tree = self.resolve_commit(base)?.tree()?;
        let target_tree = self.resolve_commit(target)?.tree()?;
        let mut opts = DiffOptions::new();
        let diff =
            self.repo
                .diff_tree_to_tree(Some(&base_tree), Some(&target_tree), Some(&mut opts))?;
        Ok(diff)
    }

    /// Name-only diff between two revisions. Each delta contributes its
    /// new path and, when different, its old path.
    pub fn changed_files(&self, base: &str, target: &str) -> Result<Vec<String>> {
        let diff = self.diff_between(base, target)?;
        let mut files = Vec::new();
        for delta in diff.deltas() {
            if delta.status() == Delta::Unmodified {
                continue;
            }
            let new_path = delta.new_file().path();
            let old_path = delta.old_file().path();
            for path in [new_path, old_path].into_iter().flatten() {
                let path = path.to_str().ok_or(GitIntegrationError::InvalidUtf8)?;
                if !files.iter().any(|seen| seen == path) {
                    files.push(path.to_string());
                }
            }
        }
        debug!(base, target, files = files.len(), "computed name-only diff");
        Ok(files)
    }
}
