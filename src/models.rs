//! Core data types read from an Anki collection.
//!
//! Only the parts of the collection schema the filter touches are modelled:
//! note types and their field names, the packed note records, and the media
//! references recovered from note markup.

use serde::Deserialize;

/// Separator between field values in `notes.flds`.
pub const FIELD_SEPARATOR: char = '\x1f';

/// A note type ("model") from the `col.models` JSON blob.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub id: i64,
    pub name: String,
    pub fields: Vec<FieldDef>,
}

/// One field definition of a model, in record order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldDef {
    pub name: String,
}

/// Shape of a single entry in `col.models`; the id comes from the object key.
#[derive(Debug, Deserialize)]
pub(crate) struct ModelJson {
    pub name: String,
    #[serde(rename = "flds")]
    pub fields: Vec<FieldDef>,
}

/// A row of the `notes` table.
#[derive(Debug, Clone)]
pub struct NoteRow {
    pub id: i64,
    pub model_id: i64,
    pub flds: String,
}

impl NoteRow {
    /// Field values in model order.
    pub fn fields(&self) -> Vec<&str> {
        self.flds.split(FIELD_SEPARATOR).collect()
    }

    /// Value at `offset`, or `None` when the record is shorter than that.
    pub fn field(&self, offset: usize) -> Option<&str> {
        self.flds.split(FIELD_SEPARATOR).nth(offset)
    }
}

/// A media file referenced by a kept note.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaRef {
    /// Storage key; also the file name inside the archive.
    pub key: String,
    /// Original file name as written in the note markup.
    pub filename: String,
}
