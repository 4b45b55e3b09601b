use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{DetectError, Result};

/// File name looked up at the workspace root when no module config is given.
pub const DEFAULT_TS_CONFIG: &str = "tsconfig.json";

/// Raw invocation inputs, gathered once by the entry point.
///
/// Every field is optional here; [`TargetDescriptor::from_config`] decides
/// which absences are fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionConfig {
    pub file_path: Option<String>,
    pub ts_config_path: Option<String>,
    pub workspace_root: Option<PathBuf>,
}

impl ActionConfig {
    pub fn new(file_path: impl Into<String>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            ts_config_path: None,
            workspace_root: Some(workspace_root.into()),
        }
    }

    pub fn with_ts_config(mut self, ts_config_path: impl Into<String>) -> Self {
        self.ts_config_path = Some(ts_config_path.into());
        self
    }
}

/// The validated, immutable description of what is being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDescriptor {
    relative_path: String,
    absolute_path: PathBuf,
    workspace_root: PathBuf,
    ts_config_path: PathBuf,
    ts_config_explicit: bool,
}

impl TargetDescriptor {
    /// Validates inputs in the order the action reads them: the target path
    /// first, then the workspace root.
    pub fn from_config(config: &ActionConfig) -> Result<Self> {
        let relative_path = non_empty(config.file_path.as_deref())
            .ok_or(DetectError::MissingInput("filePath"))?
            .to_string();

        let workspace_root = config
            .workspace_root
            .as_ref()
            .filter(|root| !root.as_os_str().is_empty())
            .cloned()
            .ok_or(DetectError::WorkspaceRootMissing)?;

        let (ts_config_path, ts_config_explicit) =
            match non_empty(config.ts_config_path.as_deref()) {
                Some(explicit) => (workspace_root.join(explicit), true),
                None => (workspace_root.join(DEFAULT_TS_CONFIG), false),
            };

        let absolute_path = workspace_root.join(&relative_path);

        Ok(Self {
            relative_path,
            absolute_path,
            workspace_root,
            ts_config_path,
            ts_config_explicit,
        })
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn ts_config_path(&self) -> &Path {
        &self.ts_config_path
    }

    /// False when the module config path fell back to `<root>/tsconfig.json`.
    pub fn ts_config_explicit(&self) -> bool {
        self.ts_config_explicit
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
