use crate::{ImportExtractor, LanguageRegistry, ModuleResolver, ParserError, Resolution, Result, TsConfig};
use depchange_core::paths::{normalize_lexically, relative_to_root};
use depchange_core::{DependencyClosure, DependencyResolver, ResolveRequest};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Paths never entered while building a closure.
pub const DEFAULT_EXCLUDES: &[&str] = &["**/node_modules/**"];

/// Builds the static dependency closure of an entry file.
pub struct DependencyTree {
    registry: LanguageRegistry,
    excludes: GlobSet,
}

#[derive(Default)]
struct WalkState {
    visited: HashSet<PathBuf>,
    files: Vec<PathBuf>,
    non_existent: Vec<String>,
}

impl WalkState {
    fn record_missing(&mut self, specifier: &str) {
        if !self.non_existent.iter().any(|s| s == specifier) {
            self.non_existent.push(specifier.to_string());
        }
    }
}

impl DependencyTree {
    pub fn new() -> Result<Self> {
        Self::with_excludes(std::iter::empty::<&str>())
    }

    /// Adds `patterns` on top of [`DEFAULT_EXCLUDES`]. Patterns match paths
    /// relative to the workspace root.
    pub fn with_excludes<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for p in DEFAULT_EXCLUDES {
            builder.add(Glob::new(p)?);
        }
        for p in patterns {
            let glob = Glob::new(p.as_ref())?;
            debug!("Added exclude pattern: {}", p.as_ref());
            builder.add(glob);
        }
        Ok(Self {
            registry: LanguageRegistry::new(),
            excludes: builder.build()?,
        })
    }

    pub fn is_excluded(&self, path: &Path, root: &Path) -> bool {
        self.excludes.is_match(relative_to_root(path, root))
    }

    /// Lists the closure in post-order: every file after the files it
    /// imports, the entry last.
    pub fn to_list(&self, entry: &Path, root: &Path, resolver: &ModuleResolver) -> Result<DependencyClosure> {
        let mut state = WalkState::default();
        self.visit(&normalize_lexically(entry), root, resolver, &mut state)?;
        info!(
            entry = %entry.display(),
            files = state.files.len(),
            non_existent = state.non_existent.len(),
            "built dependency closure"
        );
        Ok(DependencyClosure {
            files: state.files,
            non_existent: state.non_existent,
        })
    }

    fn visit(&self, file: &Path, root: &Path, resolver: &ModuleResolver, state: &mut WalkState) -> Result<()> {
        if !state.visited.insert(file.to_path_buf()) {
            return Ok(());
        }

        if let Some(kind) = self.registry.detect_language(file) {
            // Legacy sources are not always UTF-8; specifiers are ASCII in practice.
            let bytes = fs::read(file).map_err(|e| ParserError::io(file, e))?;
            let content = String::from_utf8_lossy(&bytes);
            for import in ImportExtractor::extract(&self.registry, kind, &content)? {
                match resolver.resolve(&import.specifier, file) {
                    Resolution::Builtin => {}
                    Resolution::Missing => {
                        debug!(
                            specifier = %import.specifier,
                            kind = ?import.kind,
                            file = %file.display(),
                            line = import.line,
                            "recording unresolved import"
                        );
                        state.record_missing(&import.specifier);
                    }
                    Resolution::File(dep) => {
                        if self.is_excluded(&dep, root) {
                            debug!(path = %dep.display(), "skipping excluded dependency");
                            continue;
                        }
                        self.visit(&dep, root, resolver, state)?;
                    }
                }
            }
        }

        state.files.push(file.to_path_buf());
        Ok(())
    }
}

impl DependencyResolver for DependencyTree {
    fn resolve(&self, request: &ResolveRequest<'_>) -> depchange_core::Result<DependencyClosure> {
        let config = TsConfig::load_or_default(request.ts_config, request.ts_config_explicit)?;
        let resolver = ModuleResolver::new(config);
        Ok(self.to_list(request.entry, request.root, &resolver)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn handles_import_cycles() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a.ts"), "import './b';");
        write(&root.join("b.ts"), "import './a';");

        let tree = DependencyTree::new().unwrap();
        let closure = tree
            .to_list(&root.join("a.ts"), root, &ModuleResolver::new(TsConfig::default()))
            .unwrap();
        assert_eq!(closure.files, vec![root.join("b.ts"), root.join("a.ts")]);
    }

    #[test]
    fn custom_excludes_match_root_relative_paths() {
        let tree = DependencyTree::with_excludes(["src/generated/**"]).unwrap();
        let root = Path::new("/ws");
        assert!(tree.is_excluded(Path::new("/ws/src/generated/api.ts"), root));
        assert!(tree.is_excluded(Path::new("/ws/node_modules/react/index.js"), root));
        assert!(tree.is_excluded(Path::new("/ws/packages/a/node_modules/x/index.js"), root));
        assert!(!tree.is_excluded(Path::new("/ws/src/app.ts"), root));
    }

    #[test]
    fn invalid_exclude_pattern_is_an_error() {
        assert!(matches!(
            DependencyTree::with_excludes(["src/[oops"]),
            Err(ParserError::Glob(_))
        ));
    }
}
