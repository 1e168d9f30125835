use crate::errors::RepositoryError;
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppRecord {
    pub id: i64,
    pub name: String,
    pub logo_url: String,
    pub vhost: String,
    pub local_port: i64,
}

/// Mirrors `hda_apps.go`'s join across `webapps`/`apps`: the registered
/// local web applications reachable through the vhost reverse proxy.
pub async fn list(pool: &SqlitePool) -> Result<Vec<AppRecord>, RepositoryError> {
    let apps = sqlx::query_as::<_, AppRecord>(
        "SELECT id, name, logo_url, vhost, local_port FROM apps ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(apps)
}
