//! Wordlist matching over the notes of one note type.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;

use crate::media::{extract_references, MediaManifest};
use crate::models::{MediaRef, NoteRow};

/// What the filtering pass decided to keep.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Notes of the selected model that were looked at.
    pub notes_scanned: usize,
    pub kept_note_ids: Vec<i64>,
    /// Media of kept notes, one entry per reference found (duplicates included).
    pub kept_media: Vec<MediaRef>,
}

impl FilterOutcome {
    /// Storage keys of all media that must stay in the package.
    pub fn retained_keys(&self) -> HashSet<String> {
        self.kept_media.iter().map(|m| m.key.clone()).collect()
    }

    pub fn has_matches(&self) -> bool {
        !self.kept_note_ids.is_empty()
    }

    pub fn has_media(&self) -> bool {
        !self.kept_media.is_empty()
    }
}

pub async fn load_model_notes(pool: &SqlitePool, model_id: i64) -> Result<Vec<NoteRow>> {
    let rows = sqlx::query("SELECT id, mid, flds FROM notes WHERE mid = ?")
        .bind(model_id)
        .fetch_all(pool)
        .await
        .context("Failed to read notes from the collection")?;

    Ok(rows
        .iter()
        .map(|row| NoteRow {
            id: row.get("id"),
            model_id: row.get("mid"),
            flds: row.get("flds"),
        })
        .collect())
}

/// Keep the notes of `model_id` whose trimmed value at `field` is in
/// `wordlist`, and collect the media they reference.
///
/// A record too short to have `field` counts as no match.
pub fn filter_notes(
    notes: &[NoteRow],
    model_id: i64,
    field: usize,
    wordlist: &HashSet<String>,
    manifest: &MediaManifest,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for note in notes.iter().filter(|n| n.model_id == model_id) {
        outcome.notes_scanned += 1;

        let matched = note
            .field(field)
            .is_some_and(|value| wordlist.contains(value.trim()));
        if !matched {
            continue;
        }

        outcome.kept_note_ids.push(note.id);
        for media in extract_references(&note.fields(), manifest) {
            log::debug!("note {} keeps {} (key {})", note.id, media.filename, media.key);
            outcome.kept_media.push(media);
        }
    }

    log::debug!(
        "kept {} of {} notes, {} media references",
        outcome.kept_note_ids.len(),
        outcome.notes_scanned,
        outcome.kept_media.len()
    );
    outcome
}
