//! Writes back to the collection: dropping unmatched notes and cards, and
//! renaming the deck.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteCounts {
    pub notes: u64,
    pub cards: u64,
}

/// Delete every note not in `kept_ids` and every card of such a note, in
/// one transaction.
///
/// The ids go in as a single JSON array so the statement does not depend
/// on SQLite's host parameter limit.
pub async fn delete_unmatched(pool: &SqlitePool, kept_ids: &[i64]) -> Result<DeleteCounts> {
    let ids = serde_json::to_string(kept_ids)?;
    let mut tx = pool.begin().await?;

    let notes = sqlx::query("DELETE FROM notes WHERE id NOT IN (SELECT value FROM json_each(?))")
        .bind(&ids)
        .execute(&mut *tx)
        .await
        .context("Failed to delete unmatched notes")?
        .rows_affected();

    let cards = sqlx::query("DELETE FROM cards WHERE nid NOT IN (SELECT value FROM json_each(?))")
        .bind(&ids)
        .execute(&mut *tx)
        .await
        .context("Failed to delete unmatched cards")?
        .rows_affected();

    tx.commit().await?;
    Ok(DeleteCounts { notes, cards })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedDeck {
    pub id: String,
    pub from: String,
    pub to: String,
}

/// Rename the first deck, in `col.decks` order, not called `default_name`.
///
/// Every other attribute of the decks JSON is written back unchanged.
pub async fn rename_deck(
    pool: &SqlitePool,
    new_name: &str,
    default_name: &str,
) -> Result<Option<RenamedDeck>> {
    let mut tx = pool.begin().await?;

    let json: String = sqlx::query_scalar("SELECT decks FROM col LIMIT 1")
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read decks from the collection")?;
    let mut decks: Map<String, Value> =
        serde_json::from_str(&json).context("Failed to parse deck definitions")?;

    let renamed = rename_first_non_default(&mut decks, new_name, default_name);

    sqlx::query("UPDATE col SET decks = ?")
        .bind(Value::Object(decks).to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to write decks to the collection")?;
    tx.commit().await?;

    Ok(renamed)
}

pub fn rename_first_non_default(
    decks: &mut Map<String, Value>,
    new_name: &str,
    default_name: &str,
) -> Option<RenamedDeck> {
    let (id, deck) = decks.iter_mut().find(|(_, deck)| {
        deck.get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| name != default_name)
    })?;

    let from = deck.get("name")?.as_str()?.to_string();
    deck["name"] = Value::String(new_name.to_string());

    Some(RenamedDeck {
        id: id.clone(),
        from,
        to: new_name.to_string(),
    })
}
