use crate::TsConfig;
use depchange_core::paths::normalize_lexically;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions tried, in order, when a specifier omits one.
pub const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "js", "jsx", "mjs", "cjs", "json"];

/// Directory name holding installed third-party packages.
pub const VENDOR_DIR: &str = "node_modules";

const NODE_BUILTINS: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
    "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    File(PathBuf),
    Builtin,
    Missing,
}

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    types: Option<String>,
    typings: Option<String>,
    module: Option<String>,
    main: Option<String>,
}

impl PackageManifest {
    /// Entry preference: type declarations, then the ES module entry, then `main`.
    fn entries(&self) -> impl Iterator<Item = &str> {
        [&self.types, &self.typings, &self.module, &self.main]
            .into_iter()
            .filter_map(|e| e.as_deref())
    }
}

/// Maps import specifiers to files on disk.
pub struct ModuleResolver {
    config: TsConfig,
}

impl ModuleResolver {
    pub fn new(config: TsConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, specifier: &str, importer: &Path) -> Resolution {
        if is_builtin(specifier) {
            return Resolution::Builtin;
        }
        let from_dir = importer.parent().unwrap_or_else(|| Path::new(""));

        let found = if is_path_like(specifier) {
            self.load(&from_dir.join(specifier))
        } else {
            self.load_mapped(specifier)
                .or_else(|| {
                    self.config
                        .base_url
                        .as_ref()
                        .and_then(|base| self.load(&base.join(specifier)))
                })
                .or_else(|| self.load_vendored(specifier, from_dir))
        };

        match found {
            Some(path) => Resolution::File(path),
            None => {
                debug!(specifier, importer = %importer.display(), "unresolved import");
                Resolution::Missing
            }
        }
    }

    fn load_mapped(&self, specifier: &str) -> Option<PathBuf> {
        for mapping in &self.config.paths {
            let Some(captured) = mapping.capture(specifier) else {
                continue;
            };
            for target in &mapping.targets {
                let candidate = target.to_string_lossy().replacen('*', captured, 1);
                if let Some(found) = self.load(Path::new(&candidate)) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn load_vendored(&self, specifier: &str, from_dir: &Path) -> Option<PathBuf> {
        from_dir
            .ancestors()
            .map(|dir| dir.join(VENDOR_DIR).join(specifier))
            .find_map(|candidate| self.load(&candidate))
    }

    fn load(&self, base: &Path) -> Option<PathBuf> {
        let base = normalize_lexically(base);
        load_as_file(&base).or_else(|| load_as_directory(&base))
    }
}

fn load_as_file(base: &Path) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = with_appended_extension(base, ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    // `./util.js` written in TypeScript sources points at `./util.ts`.
    let siblings: &[&str] = match base.extension().and_then(|e| e.to_str()) {
        Some("js") => &["ts", "tsx", "d.ts"],
        Some("jsx") => &["tsx"],
        Some("mjs") => &["mts", "d.mts"],
        Some("cjs") => &["cts", "d.cts"],
        _ => &[],
    };
    siblings
        .iter()
        .map(|ext| base.with_extension(ext))
        .find(|candidate| candidate.is_file())
}

fn load_as_directory(dir: &Path) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }

    let manifest_path = dir.join("package.json");
    if manifest_path.is_file() {
        let manifest = fs::read_to_string(&manifest_path)
            .ok()
            .and_then(|text| serde_json::from_str::<PackageManifest>(&text).ok());
        match manifest {
            Some(manifest) => {
                for entry in manifest.entries() {
                    let entry = normalize_lexically(&dir.join(entry));
                    if let Some(found) = load_as_file(&entry).or_else(|| load_index(&entry)) {
                        return Some(found);
                    }
                }
            }
            None => debug!(path = %manifest_path.display(), "ignoring unreadable package manifest"),
        }
    }

    load_index(dir)
}

fn load_index(dir: &Path) -> Option<PathBuf> {
    RESOLVE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("index.{ext}")))
        .find(|candidate| candidate.is_file())
}

fn with_appended_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn is_path_like(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

pub fn is_builtin(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    let head = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(&head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathMapping;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn resolves_relative_specifiers_with_extension_probing() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("src/app.ts"));
        touch(&root.join("src/util.ts"));
        touch(&root.join("src/components/index.tsx"));
        touch(&root.join("src/legacy.js"));
        touch(&root.join("shared/data.json"));

        let resolver = ModuleResolver::new(TsConfig::default());
        let importer = root.join("src/app.ts");

        assert_eq!(resolver.resolve("./util", &importer), Resolution::File(root.join("src/util.ts")));
        assert_eq!(resolver.resolve("./util.js", &importer), Resolution::File(root.join("src/util.ts")));
        assert_eq!(
            resolver.resolve("./components", &importer),
            Resolution::File(root.join("src/components/index.tsx"))
        );
        assert_eq!(resolver.resolve("./legacy", &importer), Resolution::File(root.join("src/legacy.js")));
        assert_eq!(
            resolver.resolve("../shared/data.json", &importer),
            Resolution::File(root.join("shared/data.json"))
        );
        assert_eq!(resolver.resolve("./nope", &importer), Resolution::Missing);
    }

    #[test]
    fn skips_node_builtins() {
        let resolver = ModuleResolver::new(TsConfig::default());
        let importer = Path::new("/ws/src/app.ts");
        assert_eq!(resolver.resolve("fs", importer), Resolution::Builtin);
        assert_eq!(resolver.resolve("fs/promises", importer), Resolution::Builtin);
        assert_eq!(resolver.resolve("node:path", importer), Resolution::Builtin);
        assert!(!is_builtin("fsevents"));
        assert!(!is_builtin("./fs"));
    }

    #[test]
    fn resolves_through_paths_and_base_url() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("src/lib/db.ts"));
        touch(&root.join("src/config.ts"));

        let config = TsConfig {
            path: None,
            base_url: Some(root.join("src")),
            paths: vec![PathMapping {
                pattern: "@lib/*".into(),
                targets: vec![root.join("src/lib/*")],
            }],
        };
        let resolver = ModuleResolver::new(config);
        let importer = root.join("src/app.ts");

        assert_eq!(resolver.resolve("@lib/db", &importer), Resolution::File(root.join("src/lib/db.ts")));
        assert_eq!(resolver.resolve("config", &importer), Resolution::File(root.join("src/config.ts")));
        assert_eq!(resolver.resolve("@lib/cache", &importer), Resolution::Missing);
    }

    #[test]
    fn resolves_packages_from_ancestor_node_modules() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let pkg = root.join("node_modules/left-pad");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("package.json"), r#"{ "main": "lib/main.js", "module": "es/index.mjs" }"#).unwrap();
        touch(&pkg.join("lib/main.js"));
        touch(&pkg.join("es/index.mjs"));
        touch(&root.join("node_modules/@scope/tool/index.js"));

        let resolver = ModuleResolver::new(TsConfig::default());
        let importer = root.join("packages/web/src/app.ts");

        assert_eq!(resolver.resolve("left-pad", &importer), Resolution::File(pkg.join("es/index.mjs")));
        assert_eq!(
            resolver.resolve("@scope/tool", &importer),
            Resolution::File(root.join("node_modules/@scope/tool/index.js"))
        );
        assert_eq!(resolver.resolve("not-installed", &importer), Resolution::Missing);
    }
}
