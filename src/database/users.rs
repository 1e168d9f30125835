use crate::errors::RepositoryError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub login: String,
    pub name: String,
    #[sqlx(rename = "pin")]
    pub pin: String,
    pub updated_at: DateTime<Utc>,
    pub is_demo: bool,
}

/// Mirrors `hda_users.go::queryUser`: look a user up by their pin. A miss
/// is not an error, it's a failed-login signal the caller maps to 401.
pub async fn query_by_pin(pool: &SqlitePool, pin: &str) -> Result<Option<UserRecord>, RepositoryError> {
    let record = sqlx::query_as::<_, UserRecord>(
        "SELECT id, login, name, pin, updated_at, is_demo FROM users WHERE pin = ?",
    )
    .bind(pin)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserRecord>, RepositoryError> {
    let record = sqlx::query_as::<_, UserRecord>(
        "SELECT id, login, name, pin, updated_at, is_demo FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

/// Mirrors `hda_users.go::HasReadAccess`: an explicit grant, or ownership
/// implied by a write grant (writers can always read).
pub async fn has_read_access(pool: &SqlitePool, user_id: i64, share_id: i64) -> Result<bool, RepositoryError> {
    let row: (i64,) = sqlx::query_as(
        "SELECT EXISTS(
            SELECT 1 FROM cap_accesses WHERE user_id = ? AND share_id = ?
            UNION
            SELECT 1 FROM cap_writers WHERE user_id = ? AND share_id = ?
        )",
    )
    .bind(user_id)
    .bind(share_id)
    .bind(user_id)
    .bind(share_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0 != 0)
}

pub async fn has_write_access(pool: &SqlitePool, user_id: i64, share_id: i64) -> Result<bool, RepositoryError> {
    let row: (i64,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM cap_writers WHERE user_id = ? AND share_id = ?)",
    )
    .bind(user_id)
    .bind(share_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0 != 0)
}

/// Mirrors `hda_users.go::AvailableShares`: every share a user can read,
/// joined across the capability tables.
pub async fn available_share_ids(pool: &SqlitePool, user_id: i64) -> Result<Vec<i64>, RepositoryError> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT share_id FROM cap_accesses WHERE user_id = ?
         UNION
         SELECT share_id FROM cap_writers WHERE user_id = ?",
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn missing_pin_returns_none() {
        let pool = test_pool().await;
        let found = query_by_pin(&pool, "0000").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn read_access_follows_write_access() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO users (id, login, name, pin, updated_at, is_demo) VALUES (1, 'a', 'A', '1234', '2024-01-01T00:00:00Z', 0)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO shares (id, name, path, tags, updated_at, visible) VALUES (1, 'movies', '/srv/movies', 'movie', '2024-01-01T00:00:00Z', 1)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO cap_writers (user_id, share_id) VALUES (1, 1)")
            .execute(&pool)
            .await
            .unwrap();

        assert!(has_write_access(&pool, 1, 1).await.unwrap());
        assert!(has_read_access(&pool, 1, 1).await.unwrap());
    }
}
