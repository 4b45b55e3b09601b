use depchange_core::{
    ActionConfig, ChangeDetector, ChangedFiles, DependencyClosure, DependencyResolver,
    DetectError, DetectionReason, HistorySource, ResolveRequest, Result, TargetDescriptor,
};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// History double answering from fixed fixtures and recording calls.
struct StubHistory {
    commits: usize,
    changed: Vec<String>,
    queried: Cell<bool>,
}

impl StubHistory {
    fn new(commits: usize, changed: &[&str]) -> Self {
        Self {
            commits,
            changed: changed.iter().map(|s| s.to_string()).collect(),
            queried: Cell::new(false),
        }
    }
}

impl HistorySource for StubHistory {
    fn commit_count(&self) -> Result<usize> {
        self.queried.set(true);
        Ok(self.commits)
    }

    fn changed_paths(&self, _from: &str, _to: &str) -> Result<ChangedFiles> {
        Ok(self.changed.iter().cloned().collect())
    }
}

/// Resolver double returning a closure rooted at the request's workspace.
struct StubResolver {
    relative: Vec<&'static str>,
    seen_config: RefCell<Option<PathBuf>>,
}

impl StubResolver {
    fn new(relative: &[&'static str]) -> Self {
        Self {
            relative: relative.to_vec(),
            seen_config: RefCell::new(None),
        }
    }
}

impl DependencyResolver for StubResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<DependencyClosure> {
        *self.seen_config.borrow_mut() = Some(request.ts_config.to_path_buf());
        Ok(DependencyClosure {
            files: self.relative.iter().map(|rel| request.root.join(rel)).collect(),
            non_existent: Vec::new(),
        })
    }
}

fn setup_workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("app.ts"), "import { helper } from './util';\nhelper();\n").unwrap();
    fs::write(src.join("util.ts"), "export const helper = () => 1;\n").unwrap();
    dir
}

fn target_in(root: &Path) -> TargetDescriptor {
    TargetDescriptor::from_config(&ActionConfig::new("src/app.ts", root)).unwrap()
}

#[test]
fn test_changed_dependency_is_detected() {
    let ws = setup_workspace();
    let history = StubHistory::new(2, &["src/util.ts"]);
    let resolver = StubResolver::new(&["src/util.ts", "src/app.ts"]);

    let detection = ChangeDetector::new(&history, &resolver)
        .detect(&target_in(ws.path()))
        .unwrap();

    assert!(detection.dependency_changed);
    assert_eq!(detection.reason, DetectionReason::DependencyTouched);
    assert_eq!(detection.matched, vec!["src/util.ts".to_string()]);
    assert_eq!(
        resolver.seen_config.borrow().as_deref(),
        Some(ws.path().join("tsconfig.json").as_path())
    );
}

#[test]
fn test_unrelated_change_is_ignored() {
    let ws = setup_workspace();
    let history = StubHistory::new(5, &["README.md"]);
    let resolver = StubResolver::new(&["src/util.ts", "src/app.ts"]);

    let detection = ChangeDetector::new(&history, &resolver)
        .detect(&target_in(ws.path()))
        .unwrap();

    assert!(!detection.dependency_changed);
    assert_eq!(detection.reason, DetectionReason::DependenciesUntouched);
    assert!(detection.matched.is_empty());
    assert_eq!(detection.dependencies, vec!["src/util.ts", "src/app.ts"]);
}

#[test]
fn test_single_commit_short_circuits_to_changed() {
    let ws = setup_workspace();
    let history = StubHistory::new(1, &[]);
    let resolver = StubResolver::new(&[]);

    let detection = ChangeDetector::new(&history, &resolver)
        .detect(&target_in(ws.path()))
        .unwrap();

    assert!(detection.dependency_changed);
    assert_eq!(detection.reason, DetectionReason::SingleCommit);
    assert!(resolver.seen_config.borrow().is_none());
}

#[test]
fn test_empty_diff_is_unchanged_without_resolving() {
    let ws = setup_workspace();
    let history = StubHistory::new(4, &[]);
    let resolver = StubResolver::new(&["src/app.ts"]);

    let detection = ChangeDetector::new(&history, &resolver)
        .detect(&target_in(ws.path()))
        .unwrap();

    assert!(!detection.dependency_changed);
    assert_eq!(detection.reason, DetectionReason::NoChanges);
    assert!(resolver.seen_config.borrow().is_none());
}

#[test]
fn test_target_only_change_counts_when_target_is_in_closure() {
    let ws = setup_workspace();
    let history = StubHistory::new(2, &["src/app.ts"]);

    let with_entry = StubResolver::new(&["src/util.ts", "src/app.ts"]);
    let detection = ChangeDetector::new(&history, &with_entry)
        .detect(&target_in(ws.path()))
        .unwrap();
    assert!(detection.dependency_changed);

    let without_entry = StubResolver::new(&["src/util.ts"]);
    let detection = ChangeDetector::new(&history, &without_entry)
        .detect(&target_in(ws.path()))
        .unwrap();
    assert!(!detection.dependency_changed);
}

#[test]
fn test_missing_target_fails_before_history() {
    let ws = setup_workspace();
    let history = StubHistory::new(3, &["src/util.ts"]);
    let resolver = StubResolver::new(&[]);
    let target =
        TargetDescriptor::from_config(&ActionConfig::new("src/missing.ts", ws.path())).unwrap();

    let err = ChangeDetector::new(&history, &resolver)
        .detect(&target)
        .unwrap_err();

    assert!(matches!(err, DetectError::TargetNotFound(_)));
    assert_eq!(err.to_string(), "The file \"src/missing.ts\" does not exist.");
    assert!(!history.queried.get());
}

#[test]
fn test_detection_serializes_for_reports() {
    let ws = setup_workspace();
    let history = StubHistory::new(2, &["src/util.ts"]);
    let resolver = StubResolver::new(&["src/util.ts", "src/app.ts"]);

    let detection = ChangeDetector::new(&history, &resolver)
        .detect(&target_in(ws.path()))
        .unwrap();
    let json = serde_json::to_value(&detection).unwrap();

    assert_eq!(json["dependency_changed"], true);
    assert_eq!(json["reason"], "dependency_touched");
    assert_eq!(json["changed_files"], serde_json::json!(["src/util.ts"]));
}
