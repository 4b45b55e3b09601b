use crate::{ParserError, Result};
use depchange_core::paths::normalize_lexically;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    extends: Option<Extends>,
    #[serde(default)]
    compiler_options: RawCompilerOptions,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    paths: Option<BTreeMap<String, Vec<String>>>,
}

/// One `compilerOptions.paths` entry with its targets already anchored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    pub pattern: String,
    pub targets: Vec<PathBuf>,
}

impl PathMapping {
    /// Returns the text captured by `*`, or `""` for an exact match.
    pub fn capture<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        match self.pattern.split_once('*') {
            Some((prefix, suffix)) => {
                if specifier.len() < prefix.len() + suffix.len() {
                    return None;
                }
                specifier.strip_prefix(prefix)?.strip_suffix(suffix)
            }
            None => (specifier == self.pattern).then_some(""),
        }
    }

    /// Length of the literal prefix, used to rank overlapping patterns.
    fn prefix_len(&self) -> usize {
        self.pattern.split_once('*').map_or(self.pattern.len(), |(p, _)| p.len())
    }
}

/// Module-resolution options after following `extends`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsConfig {
    pub path: Option<PathBuf>,
    pub base_url: Option<PathBuf>,
    /// Sorted so the most specific pattern comes first.
    pub paths: Vec<PathMapping>,
}

#[derive(Debug, Default)]
struct Layer {
    base_url: Option<PathBuf>,
    paths: Option<(BTreeMap<String, Vec<String>>, PathBuf)>,
}

impl TsConfig {
    /// Loads `path`, or yields empty options when it is absent. `explicit`
    /// only changes how the absence is logged.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self> {
        if !path.is_file() {
            if explicit {
                warn!(path = %path.display(), "configured module config not found, resolving without it");
            } else {
                warn!(path = %path.display(), "module config not found, resolving without it");
            }
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let path = normalize_lexically(path);
        let mut seen = HashSet::new();
        let layer = load_layer(&path, &mut seen)?;

        let mut paths: Vec<PathMapping> = match layer.paths {
            Some((raw, declared_in)) => {
                let anchor = layer.base_url.clone().unwrap_or(declared_in);
                raw.into_iter()
                    .map(|(pattern, targets)| PathMapping {
                        pattern,
                        targets: targets
                            .iter()
                            .map(|t| normalize_lexically(&anchor.join(t)))
                            .collect(),
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        paths.sort_by(|a, b| b.prefix_len().cmp(&a.prefix_len()));

        debug!(
            path = %path.display(),
            base_url = ?layer.base_url,
            mappings = paths.len(),
            "loaded module config"
        );
        Ok(Self {
            path: Some(path),
            base_url: layer.base_url,
            paths,
        })
    }
}

fn load_layer(path: &Path, seen: &mut HashSet<PathBuf>) -> Result<Layer> {
    if !seen.insert(path.to_path_buf()) {
        return Err(ParserError::TsConfigCycle(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|e| ParserError::io(path, e))?;
    let raw: RawTsConfig = json5::from_str(&text).map_err(|e| ParserError::TsConfig {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let parents = match raw.extends {
        Some(Extends::One(one)) => vec![one],
        Some(Extends::Many(many)) => many,
        None => Vec::new(),
    };

    let mut layer = Layer::default();
    for parent in parents {
        match locate_extends(&dir, &parent) {
            Some(parent_path) => {
                let inherited = load_layer(&parent_path, seen)?;
                if inherited.base_url.is_some() {
                    layer.base_url = inherited.base_url;
                }
                if inherited.paths.is_some() {
                    layer.paths = inherited.paths;
                }
            }
            None => warn!(extends = %parent, from = %path.display(), "extended config not found"),
        }
    }

    let options = raw.compiler_options;
    if let Some(base_url) = options.base_url {
        layer.base_url = Some(normalize_lexically(&dir.join(base_url)));
    }
    if let Some(paths) = options.paths {
        layer.paths = Some((paths, dir));
    }
    // Only the active chain counts; a shared base reached twice is fine.
    seen.remove(path);
    Ok(layer)
}

fn locate_extends(dir: &Path, spec: &str) -> Option<PathBuf> {
    let candidates = |base: PathBuf| -> Vec<PathBuf> {
        let mut with_json = base.clone().into_os_string();
        with_json.push(".json");
        vec![base.clone(), PathBuf::from(with_json), base.join("tsconfig.json")]
    };

    let is_path = spec.starts_with("./") || spec.starts_with("../") || Path::new(spec).is_absolute();
    if is_path {
        return candidates(normalize_lexically(&dir.join(spec)))
            .into_iter()
            .find(|p| p.is_file());
    }

    dir.ancestors()
        .map(|ancestor| ancestor.join("node_modules").join(spec))
        .flat_map(candidates)
        .find(|p| p.is_file())
}
