use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::paths::relative_to_root;
use crate::{
    DependencyResolver, DetectError, Detection, DetectionReason, HistorySource, ResolveRequest,
    Result, TargetDescriptor,
};

pub const HEAD: &str = "HEAD";
pub const PARENT: &str = "HEAD~1";

/// What to do when the resolver reports references missing from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnresolvedReferencePolicy {
    /// Carry the list on the [`Detection`] and still compute the result;
    /// the caller reports the failure.
    ReportAndContinue,
    /// Stop with [`DetectError::UnresolvedReferences`].
    Abort,
}

pub const UNRESOLVED_REFERENCE_POLICY: UnresolvedReferencePolicy =
    UnresolvedReferencePolicy::ReportAndContinue;

/// Runs the dependency-change procedure for one target.
///
/// The comparison is always `HEAD~1..HEAD`: a push carrying several commits
/// only has its last commit examined.
pub struct ChangeDetector<H, R> {
    history: H,
    resolver: R,
    policy: UnresolvedReferencePolicy,
}

impl<H: HistorySource, R: DependencyResolver> ChangeDetector<H, R> {
    pub fn new(history: H, resolver: R) -> Self {
        Self {
            history,
            resolver,
            policy: UNRESOLVED_REFERENCE_POLICY,
        }
    }

    pub fn with_policy(mut self, policy: UnresolvedReferencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn detect(&self, target: &TargetDescriptor) -> Result<Detection> {
        info!("File path: {}", target.relative_path());
        info!("Full file path to check: {}", target.absolute_path().display());

        if !target.absolute_path().exists() {
            return Err(DetectError::TargetNotFound(target.relative_path().to_string()));
        }

        let commit_count = self.history.commit_count()?;
        debug!(commit_count, "counted commits reachable from HEAD");
        if commit_count <= 1 {
            info!("Only one commit present, skipping comparison with previous commit.");
            return Ok(Detection::short_circuit(
                DetectionReason::SingleCommit,
                commit_count,
                Default::default(),
            ));
        }

        let changed = self.history.changed_paths(HEAD, PARENT)?;
        debug!(changed = changed.len(), "collected changed paths");
        if changed.is_empty() {
            return Ok(Detection::short_circuit(
                DetectionReason::NoChanges,
                commit_count,
                changed,
            ));
        }

        let request = ResolveRequest {
            entry: target.absolute_path(),
            root: target.workspace_root(),
            ts_config: target.ts_config_path(),
            ts_config_explicit: target.ts_config_explicit(),
        };
        let closure = self.resolver.resolve(&request)?;
        debug!(
            files = closure.files.len(),
            non_existent = closure.non_existent.len(),
            "resolved dependency closure"
        );

        if !closure.non_existent.is_empty() {
            match self.policy {
                UnresolvedReferencePolicy::Abort => {
                    return Err(DetectError::UnresolvedReferences(closure.non_existent));
                }
                UnresolvedReferencePolicy::ReportAndContinue => {
                    warn!(
                        missing = closure.non_existent.len(),
                        "continuing despite unresolved references"
                    );
                }
            }
        }

        let dependencies: Vec<String> = closure
            .files
            .iter()
            .map(|file| relative_to_root(file, target.workspace_root()))
            .collect();
        let matched: Vec<String> = dependencies
            .iter()
            .filter(|dep| changed.contains(dep))
            .cloned()
            .collect();

        let dependency_changed = !matched.is_empty();
        let reason = if dependency_changed {
            DetectionReason::DependencyTouched
        } else {
            DetectionReason::DependenciesUntouched
        };
        info!(dependency_changed, matched = ?matched, "evaluated dependency closure");

        Ok(Detection {
            dependency_changed,
            reason,
            commit_count,
            changed_files: changed,
            dependencies,
            matched,
            non_existent: closure.non_existent,
        })
    }
}
