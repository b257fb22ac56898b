//! Builders for small Anki collections used by unit tests.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

pub const MODELS_JSON: &str = r#"{
    "1342697561419": {"name": "Basic", "flds": [{"name": "Front", "ord": 0}, {"name": "Back", "ord": 1}]},
    "1342697561420": {"name": "Cloze", "flds": [{"name": "Text", "ord": 0}]}
}"#;

pub const DECKS_JSON: &str = r#"{
    "1": {"id": 1, "name": "Default", "collapsed": false},
    "1500000000000": {"id": 1500000000000, "name": "Japanese Core 2000", "desc": "core words"}
}"#;

pub const BASIC: i64 = 1342697561419;
pub const CLOZE: i64 = 1342697561420;

/// Create a collection at `path` holding the given notes `(id, mid, flds)`
/// and cards `(id, nid)`.
pub async fn create_collection(
    path: &Path,
    models: &str,
    decks: &str,
    notes: &[(i64, i64, &str)],
    cards: &[(i64, i64)],
) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    for ddl in [
        "CREATE TABLE col (id integer primary key, models text not null, decks text not null)",
        "CREATE TABLE notes (id integer primary key, mid integer not null, flds text not null)",
        "CREATE TABLE cards (id integer primary key, nid integer not null)",
    ] {
        sqlx::query(ddl).execute(&pool).await.unwrap();
    }

    sqlx::query("INSERT INTO col (id, models, decks) VALUES (1, ?, ?)")
        .bind(models)
        .bind(decks)
        .execute(&pool)
        .await
        .unwrap();
    for (id, mid, flds) in notes {
        sqlx::query("INSERT INTO notes (id, mid, flds) VALUES (?, ?, ?)")
            .bind(id)
            .bind(mid)
            .bind(flds)
            .execute(&pool)
            .await
            .unwrap();
    }
    for (id, nid) in cards {
        sqlx::query("INSERT INTO cards (id, nid) VALUES (?, ?)")
            .bind(id)
            .bind(nid)
            .execute(&pool)
            .await
            .unwrap();
    }

    pool
}
