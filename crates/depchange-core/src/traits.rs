use crate::{ChangedFiles, DependencyClosure, ResolveRequest, Result};

/// Read-only view of repository history.
pub trait HistorySource {
    /// Number of commits reachable from `HEAD`.
    fn commit_count(&self) -> Result<usize>;

    /// Paths that differ between the two revisions, relative to the
    /// repository root.
    fn changed_paths(&self, from: &str, to: &str) -> Result<ChangedFiles>;
}

/// Static dependency analysis for a single entry file.
pub trait DependencyResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<DependencyClosure>;
}

impl<T: HistorySource + ?Sized> HistorySource for &T {
    fn commit_count(&self) -> Result<usize> {
        (**self).commit_count()
    }

    fn changed_paths(&self, from: &str, to: &str) -> Result<ChangedFiles> {
        (**self).changed_paths(from, to)
    }
}

impl<T: DependencyResolver + ?Sized> DependencyResolver for &T {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<DependencyClosure> {
        (**self).resolve(request)
    }
}
