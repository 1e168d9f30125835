use crate::errors::RepositoryError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShareRecord {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub tags: String,
    pub updated_at: DateTime<Utc>,
}

/// Mirrors `SQL_SELECT_SHARES`: only shares flagged `visible = 1` are ever
/// returned. The original Ubuntu build selected a `comment` column in
/// place of `name`; we fold that into one schema and accept it as a
/// data-migration concern rather than a query-time branch.
pub async fn list_visible(pool: &SqlitePool) -> Result<Vec<ShareRecord>, RepositoryError> {
    let shares = sqlx::query_as::<_, ShareRecord>(
        "SELECT id, name, path, tags, updated_at FROM shares WHERE visible = 1 ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(shares)
}
