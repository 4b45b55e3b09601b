//! Lexical path helpers shared by the resolver and the change evaluator.
//!
//! Nothing here touches the filesystem: symlinks are never followed, so a
//! workspace root and the paths derived from it keep a common prefix.

use std::path::{Component, Path, PathBuf};

/// Folds `.` and `..` components without consulting the filesystem.
///
/// A `..` that would climb above the root of an absolute path is dropped;
/// on a relative path it is kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Renders `path` relative to `root` with `/` separators, the form git
/// reports changed paths in. Paths outside `root` come back unchanged.
pub fn relative_to_root(path: &Path, root: &Path) -> String {
    let path = normalize_lexically(path);
    let root = normalize_lexically(root);
    match path.strip_prefix(&root) {
        Ok(rel) => to_slash(rel),
        Err(_) => to_slash(&path),
    }
}

pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push('/'),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}
