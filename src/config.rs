//! Runtime settings.
//!
//! Everything has a default, so the tool runs without a config file. A
//! TOML file passed with `--config` overrides individual keys:
//!
//! ```toml
//! work_dir = "/var/tmp/apkg"
//! output_dir = "./decks"
//! media_manifest = "media"
//! collection_files = ["collection.anki21", "collection.anki2"]
//! default_deck = "Default"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::archive::WORKDIR_MARKER;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Scratch directory the archive is extracted into and repacked from.
    /// Must be new, empty, or left by an earlier run; it is emptied at the
    /// start of every run.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Directory the output `.apkg` is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// File name of the JSON media manifest inside the archive.
    #[serde(default = "default_media_manifest")]
    pub media_manifest: String,
    /// Database file names, in lookup order.
    #[serde(default = "default_collection_files")]
    pub collection_files: Vec<String>,
    /// Deck that is never renamed.
    #[serde(default = "default_deck")]
    pub default_deck: String,
}

fn default_work_dir() -> PathBuf {
    scratch_root().join("apkg")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_media_manifest() -> String {
    "media".to_string()
}

fn default_collection_files() -> Vec<String> {
    vec![
        "collection.anki21".to_string(),
        "collection.anki2".to_string(),
    ]
}

fn default_deck() -> String {
    "Default".to_string()
}

/// `$TEMP`, then `$TMPDIR`, then `/tmp`.
fn scratch_root() -> PathBuf {
    ["TEMP", "TMPDIR"]
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

impl Config {
    /// Defaults only, with the scratch location resolved from the environment.
    pub fn from_env() -> Self {
        Self {
            work_dir: default_work_dir(),
            output_dir: default_output_dir(),
            media_manifest: default_media_manifest(),
            collection_files: default_collection_files(),
            default_deck: default_deck(),
        }
    }

    /// Path of the output archive for `name` (no extension).
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.apkg", name))
    }

    /// Path of the media manifest inside the working directory.
    pub fn manifest_path(&self) -> PathBuf {
        self.work_dir.join(&self.media_manifest)
    }

    /// File names in the working directory that media pruning must never touch.
    pub fn protected_files(&self) -> Vec<String> {
        let mut names = self.collection_files.clone();
        names.push(self.media_manifest.clone());
        names.push(WORKDIR_MARKER.to_string());
        names
    }

    /// Reject settings that would break a run before anything is touched.
    pub fn validate(&self) -> Result<()> {
        if self.collection_files.is_empty() {
            anyhow::bail!("collection_files must name at least one database file");
        }
        if self.media_manifest.trim().is_empty() {
            anyhow::bail!("media_manifest must not be empty");
        }
        if self.collection_files.contains(&self.media_manifest) {
            anyhow::bail!(
                "media_manifest '{}' collides with a collection file name",
                self.media_manifest
            );
        }

        let work_dir = normalize(&self.work_dir)?;
        let output_dir = normalize(&self.output_dir)?;
        if output_dir.starts_with(&work_dir) {
            anyhow::bail!(
                "output_dir {} must not be inside work_dir {}",
                self.output_dir.display(),
                self.work_dir.display()
            );
        }
        Ok(())
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
