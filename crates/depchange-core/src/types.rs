use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Repository-relative paths that differ between two commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangedFiles(BTreeSet<String>);

impl ChangedFiles {
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ChangedFiles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Input handed to a [`crate::DependencyResolver`].
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub entry: &'a Path,
    pub root: &'a Path,
    pub ts_config: &'a Path,
    /// Whether `ts_config` was supplied by the caller rather than defaulted.
    pub ts_config_explicit: bool,
}

/// Files statically reachable from an entry file, plus the references
/// that could not be located on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyClosure {
    pub files: Vec<PathBuf>,
    pub non_existent: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionReason {
    /// No parent commit to diff against.
    SingleCommit,
    /// The latest commit touched no files.
    NoChanges,
    /// At least one closure member is in the changed set.
    DependencyTouched,
    /// The changed set and the closure are disjoint.
    DependenciesUntouched,
}

/// Outcome of one detection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub dependency_changed: bool,
    pub reason: DetectionReason,
    pub commit_count: usize,
    pub changed_files: ChangedFiles,
    /// Closure members relative to the workspace root.
    pub dependencies: Vec<String>,
    /// Closure members that appear in the changed set.
    pub matched: Vec<String>,
    pub non_existent: Vec<String>,
}

impl Detection {
    pub(crate) fn short_circuit(reason: DetectionReason, commit_count: usize, changed: ChangedFiles) -> Self {
        Self {
            dependency_changed: reason == DetectionReason::SingleCommit,
            reason,
            commit_count,
            changed_files: changed,
            dependencies: Vec::new(),
            matched: Vec::new(),
            non_existent: Vec::new(),
        }
    }

    /// Whether the resolver reported references it could not find.
    pub fn has_unresolved(&self) -> bool {
        !self.non_existent.is_empty()
    }
}
