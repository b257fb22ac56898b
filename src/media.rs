//! Media manifest and media references in note markup.
//!
//! Media files are stored in the package under numeric keys. The `media`
//! manifest maps each key back to the file name that notes use, e.g.
//! `{"0": "dog.jpg", "1": "dog.mp3"}`. Notes refer to images with
//! `<img src="dog.jpg">` and to audio with `[sound:dog.mp3]`.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use crate::models::MediaRef;

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img\b[^>]*?\bsrc=["']([^"']+)["']"#).expect("valid image regex")
});
static SOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[?sound:([A-Za-z0-9_\-]+\.[A-Za-z0-9]+)").expect("valid sound regex")
});

/// Kind of markup a media file is referenced through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Sound,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Image, MediaKind::Sound];

    fn pattern(self) -> &'static Regex {
        match self {
            MediaKind::Image => &IMAGE_RE,
            MediaKind::Sound => &SOUND_RE,
        }
    }
}

/// File names referenced through `kind` markup, in field order.
pub fn referenced_filenames<'a>(kind: MediaKind, fields: &[&'a str]) -> Vec<&'a str> {
    fields
        .iter()
        .copied()
        .flat_map(|field| kind.pattern().captures_iter(field))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Media of one note that resolves through the manifest.
///
/// Every kind is scanned separately, and every manifest key mapping to a
/// referenced name is reported, so the result may hold duplicates.
pub fn extract_references(fields: &[&str], manifest: &MediaManifest) -> Vec<MediaRef> {
    let mut refs = Vec::new();
    for kind in MediaKind::ALL {
        for filename in referenced_filenames(kind, fields) {
            for key in manifest.keys_for(filename) {
                refs.push(MediaRef {
                    key: key.to_string(),
                    filename: filename.to_string(),
                });
            }
        }
    }
    refs
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    pub key: String,
    pub filename: String,
}

/// The package's key → file name manifest, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaManifest {
    entries: Vec<MediaEntry>,
}

impl MediaManifest {
    pub fn parse(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).context("Failed to parse media manifest")?;

        let entries = map
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(filename) => Ok(MediaEntry { key, filename }),
                other => anyhow::bail!("media manifest entry '{}' is not a file name: {}", key, other),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Read the manifest at `path`. A package without one has no media.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!(
                "media manifest {} not found, treating the deck as having no media",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read media manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Write the manifest as UTF-8 JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json())
            .with_context(|| format!("Failed to write media manifest: {}", path.display()))
    }

    pub fn to_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|e| (e.key.clone(), serde_json::Value::String(e.filename.clone())))
            .collect();
        serde_json::Value::Object(map).to_string()
    }

    /// Storage keys whose original file name is `filename`.
    pub fn keys_for<'a>(&'a self, filename: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.filename == filename)
            .map(|e| e.key.as_str())
    }

    /// Drop every entry whose key is not in `keys`.
    pub fn retain_keys(&mut self, keys: &HashSet<String>) {
        self.entries.retain(|e| keys.contains(&e.key));
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
