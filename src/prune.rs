//! Removal of media that no kept note references.
//!
//! Deletion problems never abort the run; each one becomes a
//! [`CleanupWarning`] in the returned [`PruneReport`].

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::media::MediaManifest;

/// A file that could not be removed from the working directory.
#[derive(Debug)]
pub enum CleanupWarning {
    /// The file was already gone.
    Missing(String),
    Failed { name: String, error: std::io::Error },
}

impl std::fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupWarning::Missing(name) => write!(f, "file not found: {}", name),
            CleanupWarning::Failed { name, error } => {
                write!(f, "unexpected error while deleting {}: {}", name, error)
            }
        }
    }
}

impl std::error::Error for CleanupWarning {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CleanupWarning::Failed { error, .. } => Some(error),
            CleanupWarning::Missing(_) => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct PruneReport {
    pub removed: Vec<String>,
    /// Manifest entries left after the rewrite.
    pub retained: usize,
    pub warnings: Vec<CleanupWarning>,
}

/// Delete every top-level file in `work_dir` that is neither `protected`
/// nor a `retained` storage key.
pub fn remove_unreferenced(
    work_dir: &Path,
    retained: &HashSet<String>,
    protected: &[String],
) -> Result<(Vec<String>, Vec<CleanupWarning>)> {
    let entries = std::fs::read_dir(work_dir)
        .with_context(|| format!("Failed to list working directory: {}", work_dir.display()))?;

    let mut removed = Vec::new();
    let mut warnings = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warnings.push(CleanupWarning::Failed {
                    name: work_dir.display().to_string(),
                    error,
                });
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if protected.contains(&name) || retained.contains(&name) {
            continue;
        }

        match delete_file(&entry.path(), &name) {
            Ok(()) => removed.push(name),
            Err(warning) => {
                log::debug!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    removed.sort();
    Ok((removed, warnings))
}

fn delete_file(path: &Path, name: &str) -> Result<(), CleanupWarning> {
    std::fs::remove_file(path).map_err(|error| match error.kind() {
        std::io::ErrorKind::NotFound => CleanupWarning::Missing(name.to_string()),
        _ => CleanupWarning::Failed {
            name: name.to_string(),
            error,
        },
    })
}

/// Remove unreferenced media and rewrite the manifest to the retained keys.
pub fn prune_media(
    work_dir: &Path,
    manifest_path: &Path,
    manifest: &mut MediaManifest,
    retained: &HashSet<String>,
    protected: &[String],
) -> Result<PruneReport> {
    let (removed, warnings) = remove_unreferenced(work_dir, retained, protected)?;

    manifest.retain_keys(retained);
    manifest.save(manifest_path)?;

    Ok(PruneReport {
        removed,
        retained: manifest.len(),
        warnings,
    })
}
