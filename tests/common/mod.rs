#![allow(dead_code)]

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const BASIC: i64 = 1342697561419;
pub const CLOZE: i64 = 1342697561420;

const MODELS_JSON: &str = r#"{
    "1342697561419": {"name": "Basic", "flds": [{"name": "Front", "ord": 0}, {"name": "Back", "ord": 1}]},
    "1342697561420": {"name": "Cloze", "flds": [{"name": "Text", "ord": 0}]}
}"#;

pub const CORE_DECKS_JSON: &str = r#"{
    "1": {"id": 1, "name": "Default", "collapsed": false},
    "1500000000000": {"id": 1500000000000, "name": "Japanese Core 2000", "desc": "core words"}
}"#;

/// A deck package described in memory.
pub struct Fixture {
    pub decks: String,
    pub notes: Vec<(i64, i64, String)>,
    pub cards: Vec<(i64, i64)>,
    /// Storage key → (original file name, payload).
    pub media: Vec<(String, String, Vec<u8>)>,
    /// Other archive entries (name → payload), written after the media.
    pub extra_entries: Vec<(String, Vec<u8>)>,
}

impl Fixture {
    /// Basic notes for dog, " dog ", Dog, cat and bird, plus a Cloze note.
    pub fn animals() -> Self {
        let notes = vec![
            (1, BASIC, "dog\x1f<img src=\"dog.jpg\">[sound:dog.mp3]"),
            (2, BASIC, " dog \x1finu"),
            (3, BASIC, "Dog\x1f<img src=\"Dog.jpg\">"),
            (4, BASIC, "cat\x1f[sound:cat.mp3]"),
            (5, BASIC, "bird\x1f<img src='bird.jpg'>"),
            (6, CLOZE, "dog"),
        ];
        Self {
            decks: CORE_DECKS_JSON.to_string(),
            notes: notes
                .into_iter()
                .map(|(id, mid, flds)| (id, mid, flds.to_string()))
                .collect(),
            cards: vec![
                (101, 1),
                (102, 1),
                (201, 2),
                (301, 3),
                (401, 4),
                (501, 5),
                (601, 6),
            ],
            media: vec![
                ("0".into(), "dog.jpg".into(), b"dog image".to_vec()),
                ("1".into(), "dog.mp3".into(), b"dog sound".to_vec()),
                ("2".into(), "cat.mp3".into(), b"cat sound".to_vec()),
                ("3".into(), "bird.jpg".into(), b"bird image".to_vec()),
                ("4".into(), "Dog.jpg".into(), b"big dog image".to_vec()),
            ],
            extra_entries: Vec::new(),
        }
    }

    /// Build the package at `path`.
    pub async fn write_apkg(&self, path: &Path) {
        let staging = path.with_extension("staging");
        fs::create_dir_all(&staging).unwrap();
        let db_path = staging.join("collection.anki2");

        let pool = open(&db_path, true).await;
        for ddl in [
            "CREATE TABLE col (id integer primary key, models text not null, decks text not null)",
            "CREATE TABLE notes (id integer primary key, mid integer not null, flds text not null)",
            "CREATE TABLE cards (id integer primary key, nid integer not null)",
        ] {
            sqlx::query(ddl).execute(&pool).await.unwrap();
        }
        sqlx::query("INSERT INTO col (id, models, decks) VALUES (1, ?, ?)")
            .bind(MODELS_JSON)
            .bind(&self.decks)
            .execute(&pool)
            .await
            .unwrap();
        for (id, mid, flds) in &self.notes {
            sqlx::query("INSERT INTO notes (id, mid, flds) VALUES (?, ?, ?)")
                .bind(id)
                .bind(mid)
                .bind(flds)
                .execute(&pool)
                .await
                .unwrap();
        }
        for (id, nid) in &self.cards {
            sqlx::query("INSERT INTO cards (id, nid) VALUES (?, ?)")
                .bind(id)
                .bind(nid)
                .execute(&pool)
                .await
                .unwrap();
        }
        pool.close().await;

        let manifest: serde_json::Map<String, serde_json::Value> = self
            .media
            .iter()
            .map(|(key, name, _)| (key.clone(), serde_json::Value::String(name.clone())))
            .collect();

        let mut writer = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        writer.start_file("collection.anki2", options).unwrap();
        writer.write_all(&fs::read(&db_path).unwrap()).unwrap();
        writer.start_file("media", options).unwrap();
        writer
            .write_all(serde_json::Value::Object(manifest).to_string().as_bytes())
            .unwrap();
        for (key, _, data) in &self.media {
            writer.start_file(key.as_str(), options).unwrap();
            writer.write_all(data).unwrap();
        }
        for (name, data) in &self.extra_entries {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
        fs::remove_dir_all(&staging).unwrap();
    }
}

async fn open(path: &Path, create: bool) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap()
}

/// Contents of an output package, read back for assertions.
pub struct Unpacked {
    pub entries: Vec<String>,
    pub note_ids: Vec<i64>,
    pub card_note_ids: Vec<(i64, i64)>,
    pub deck_names: Vec<String>,
    pub manifest: BTreeMap<String, String>,
    pub files: BTreeMap<String, Vec<u8>>,
}

pub async fn read_apkg(path: &Path, scratch: &Path) -> Unpacked {
    let mut zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let entries: Vec<String> = zip.file_names().map(|s| s.to_string()).collect();

    let mut files = BTreeMap::new();
    for name in &entries {
        let mut data = Vec::new();
        zip.by_name(name).unwrap().read_to_end(&mut data).unwrap();
        files.insert(name.clone(), data);
    }

    fs::create_dir_all(scratch).unwrap();
    let db_path = scratch.join("collection.anki2");
    fs::write(&db_path, &files["collection.anki2"]).unwrap();

    let pool = open(&db_path, false).await;
    let note_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM notes ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    let card_note_ids: Vec<(i64, i64)> = sqlx::query_as("SELECT id, nid FROM cards ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    let decks: String = sqlx::query_scalar("SELECT decks FROM col")
        .fetch_one(&pool)
        .await
        .unwrap();
    pool.close().await;

    let decks: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&decks).unwrap();
    let deck_names = decks
        .values()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect();
    let manifest: BTreeMap<String, String> =
        serde_json::from_slice(&files["media"]).unwrap();

    Unpacked {
        entries,
        note_ids,
        card_note_ids,
        deck_names,
        manifest,
        files,
    }
}

/// Sandbox with an input deck, a wordlist and a private scratch directory.
pub struct Sandbox {
    pub tmp: tempfile::TempDir,
}

impl Sandbox {
    pub async fn new(fixture: &Fixture, wordlist: &str) -> Self {
        let tmp = tempfile::TempDir::new().unwrap();
        fixture.write_apkg(&tmp.path().join("deck.apkg")).await;
        fs::write(tmp.path().join("words.txt"), wordlist).unwrap();
        fs::create_dir_all(tmp.path().join("scratch")).unwrap();
        Self { tmp }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn apkg(&self) -> PathBuf {
        self.root().join("deck.apkg")
    }

    pub fn wordlist(&self) -> PathBuf {
        self.root().join("words.txt")
    }

    pub fn scratch(&self) -> PathBuf {
        self.root().join("scratch")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.scratch().join("apkg")
    }
}
