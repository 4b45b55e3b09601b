use crate::actions::ActionsChannel;
use anyhow::Result;
use depchange_core::{
    ActionConfig, ChangeDetector, DetectError, Detection, TargetDescriptor,
};
use depchange_git::GitHistory;
use depchange_parser::DependencyTree;
use std::io::Write;
use tracing::debug;

pub const OUTPUT_NAME: &str = "dependencyChanged";

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: ActionConfig,
    pub excludes: Vec<String>,
}

/// Runs one detection and reports through `channel`.
///
/// Returns the detection when a result was emitted. Every failure is
/// reported on the channel rather than returned; the `Err` case is kept for
/// the channel's own I/O.
pub fn run<W: Write>(options: &RunOptions, channel: &mut ActionsChannel<W>) -> Result<Option<Detection>> {
    let target = match TargetDescriptor::from_config(&options.config) {
        Ok(target) => target,
        Err(err) => {
            channel.set_failed(err)?;
            return Ok(None);
        }
    };

    let resolver = match DependencyTree::with_excludes(&options.excludes) {
        Ok(tree) => tree,
        Err(err) => {
            channel.set_failed(DetectError::from(err))?;
            return Ok(None);
        }
    };
    let history = GitHistory::new(target.workspace_root());

    let detection = match ChangeDetector::new(&history, &resolver).detect(&target) {
        Ok(detection) => detection,
        Err(err) => {
            debug!(configuration = err.is_configuration(), "detection failed");
            channel.set_failed(err)?;
            return Ok(None);
        }
    };

    if detection.has_unresolved() {
        channel.set_failed(DetectError::UnresolvedReferences(detection.non_existent.clone()))?;
    }
    channel.set_output(OUTPUT_NAME, detection.dependency_changed)?;
    Ok(Some(detection))
}
