use crate::database::users::UserRecord;
use crate::database::{Database, RevalidateOutcome};
use crate::errors::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Sessions are re-checked against the backing store no more often than
/// this, matching the original agent's periodic revalidation of cached
/// logins rather than hitting the database on every request.
const REVALIDATE_AFTER: Duration = Duration::minutes(5);

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub login: String,
    pub name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_request_at: DateTime<Utc>,
    pub last_checked_at: DateTime<Utc>,
    /// `updated_at` of the backing user record as of the last successful
    /// revalidation; used to detect out-of-band PIN/profile changes.
    pub updated_at: DateTime<Utc>,
}

/// Abstracts "how do we turn a pin into a user" so the session table can
/// run unmodified against either the sqlite backing store or demo mode
/// (where any pin is accepted and a single synthetic user is returned).
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn authenticate(&self, pin: &str) -> Result<UserRecord, AppError>;
    /// Re-reads the user's `updated_at` and compares it against
    /// `expected_updated_at`; a mismatch means the record changed since the
    /// session was minted (or revalidated) and the session must be dropped.
    async fn revalidate(&self, user_id: i64, expected_updated_at: DateTime<Utc>) -> RevalidateOutcome;
    async fn has_read_access(&self, user_id: i64, share_id: i64) -> bool;
    async fn has_write_access(&self, user_id: i64, share_id: i64) -> bool;
}

pub struct SqlUserDirectory {
    db: Database,
}

impl SqlUserDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for SqlUserDirectory {
    async fn authenticate(&self, pin: &str) -> Result<UserRecord, AppError> {
        crate::database::users::query_by_pin(self.db.pool(), pin)
            .await?
            .ok_or(AppError::AuthFailed)
    }

    async fn revalidate(&self, user_id: i64, expected_updated_at: DateTime<Utc>) -> RevalidateOutcome {
        match crate::database::users::find_by_id(self.db.pool(), user_id).await {
            Ok(Some(user)) if user.updated_at == expected_updated_at => RevalidateOutcome::Valid,
            Ok(Some(_)) | Ok(None) => RevalidateOutcome::Invalid,
            Err(err) => {
                tracing::warn!(error = %err, user_id, "revalidation query failed, keeping session alive");
                RevalidateOutcome::ValidFailOpen
            }
        }
    }

    async fn has_read_access(&self, user_id: i64, share_id: i64) -> bool {
        crate::database::users::has_read_access(self.db.pool(), user_id, share_id)
            .await
            .unwrap_or(false)
    }

    async fn has_write_access(&self, user_id: i64, share_id: i64) -> bool {
        crate::database::users::has_write_access(self.db.pool(), user_id, share_id)
            .await
            .unwrap_or(false)
    }
}

/// Demo mode: any pin authenticates as the same synthetic admin user with
/// unrestricted access to every share. Selected when the agent was started
/// with `-r <dir>` instead of a backing database.
pub struct DemoUserDirectory;

#[async_trait]
impl UserDirectory for DemoUserDirectory {
    async fn authenticate(&self, _pin: &str) -> Result<UserRecord, AppError> {
        Ok(UserRecord {
            id: 0,
            login: "demo".to_string(),
            name: "Demo User".to_string(),
            pin: String::new(),
            updated_at: Utc::now(),
            is_demo: true,
        })
    }

    async fn revalidate(&self, _user_id: i64, _expected_updated_at: DateTime<Utc>) -> RevalidateOutcome {
        RevalidateOutcome::Valid
    }

    async fn has_read_access(&self, _user_id: i64, _share_id: i64) -> bool {
        true
    }

    async fn has_write_access(&self, _user_id: i64, _share_id: i64) -> bool {
        true
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Live session table: tokens mapped to the user that holds them. A single
/// `RwLock` guards the whole map; no I/O is ever performed while the lock
/// is held.
#[derive(Clone)]
pub struct SessionTable {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    directory: Arc<dyn UserDirectory>,
}

impl SessionTable {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            directory,
        }
    }

    /// Mirrors `auth.go::authenticate`: look the pin up, mint a token, and
    /// reuse the existing token if this user is already logged in.
    pub async fn authenticate(&self, pin: &str) -> Result<String, AppError> {
        let user = self.directory.authenticate(pin).await?;
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.values_mut().find(|s| s.user_id == user.id) {
            existing.last_request_at = now;
            return Ok(existing.token.clone());
        }

        let token = generate_token();
        sessions.insert(
            token.clone(),
            Session {
                token: token.clone(),
                user_id: user.id,
                login: user.login,
                name: user.name,
                is_admin: false,
                created_at: now,
                last_request_at: now,
                last_checked_at: now,
                updated_at: user.updated_at,
            },
        );
        Ok(token)
    }

    pub async fn logout(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// Looks a token up, periodically revalidating it against the backing
    /// store. An absent `Authorization` header/`?auth=` param means admin
    /// access, matching `auth.go::isAdmin`'s "no token = admin" rule — that
    /// case is handled by callers, not here.
    pub async fn lookup(&self, token: &str) -> Option<Session> {
        let needs_revalidation = {
            let sessions = self.sessions.read().await;
            let session = sessions.get(token)?;
            Utc::now() - session.last_checked_at > REVALIDATE_AFTER
        };

        if needs_revalidation {
            let (user_id, expected_updated_at) = {
                let sessions = self.sessions.read().await;
                let session = sessions.get(token)?;
                (session.user_id, session.updated_at)
            };
            match self.directory.revalidate(user_id, expected_updated_at).await {
                RevalidateOutcome::Invalid => {
                    self.sessions.write().await.remove(token);
                    return None;
                }
                RevalidateOutcome::Valid => {
                    let mut sessions = self.sessions.write().await;
                    if let Some(session) = sessions.get_mut(token) {
                        session.last_checked_at = Utc::now();
                    }
                }
                // Store unreachable: keep the session alive but don't stamp
                // it as freshly checked, so the next request retries.
                RevalidateOutcome::ValidFailOpen => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(token)?;
        session.last_request_at = Utc::now();
        Some(session.clone())
    }

    pub async fn has_read_access(&self, user_id: i64, share_id: i64) -> bool {
        self.directory.has_read_access(user_id, share_id).await
    }

    pub async fn has_write_access(&self, user_id: i64, share_id: i64) -> bool {
        self.directory.has_write_access(user_id, share_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_directory_accepts_any_pin_and_grants_access() {
        let table = SessionTable::new(Arc::new(DemoUserDirectory));
        let token = table.authenticate("anything").await.unwrap();
        let session = table.lookup(&token).await.unwrap();
        assert_eq!(session.login, "demo");
        assert!(table.has_read_access(session.user_id, 42).await);
    }

    #[tokio::test]
    async fn reauthenticating_reuses_the_existing_token() {
        let table = SessionTable::new(Arc::new(DemoUserDirectory));
        let first = table.authenticate("1234").await.unwrap();
        let second = table.authenticate("1234").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn logout_removes_the_session() {
        let table = SessionTable::new(Arc::new(DemoUserDirectory));
        let token = table.authenticate("1234").await.unwrap();
        table.logout(&token).await;
        assert!(table.lookup(&token).await.is_none());
    }

    #[tokio::test]
    async fn revalidate_detects_a_changed_updated_at() {
        use chrono::TimeZone;
        use sqlx::sqlite::SqlitePoolOptions;

        let pool = SqlitePoolOptions::new().connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        sqlx::query("INSERT INTO users (id, login, name, pin, updated_at, is_demo) VALUES (1, 'a', 'A', '1234', '2024-01-01T00:00:00Z', 0)")
            .execute(&pool)
            .await
            .unwrap();

        let directory = SqlUserDirectory::new(Database::from_pool(pool));
        let stale = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(directory.revalidate(1, stale).await, RevalidateOutcome::Invalid);

        let current = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(directory.revalidate(1, current).await, RevalidateOutcome::Valid);
    }
}
