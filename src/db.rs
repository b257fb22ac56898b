use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Open an extracted collection database.
///
/// The file must already exist. The journal mode is left at SQLite's
/// default so no `-wal`/`-shm` files end up next to it in the archive.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open collection: {}", db_path.display()))?;

    Ok(pool)
}
