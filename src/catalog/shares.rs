use crate::database::Database;
use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct Share {
    pub id: i64,
    pub name: String,
    pub path: PathBuf,
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub writable: bool,
}

#[derive(Serialize)]
pub struct ShareJson<'a> {
    name: &'a str,
    mtime: String,
    tags: &'a [String],
    writable: bool,
}

impl Share {
    pub fn to_json(&self) -> ShareJson<'_> {
        ShareJson {
            name: &self.name,
            mtime: self.updated_at.to_rfc2822(),
            tags: &self.tags,
            writable: self.writable,
        }
    }
}

fn clean_tags(raw: &str) -> Vec<String> {
    let re = Regex::new(r"(\s*,+\s*)+").unwrap();
    re.split(raw)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

enum Source {
    Sql(Database),
    Dir(PathBuf),
}

/// Source-of-truth for the set of shares the agent exposes, backed either
/// by the database (normal mode) or a directory whose immediate
/// subdirectories become shares (demo mode). Refreshed explicitly; callers
/// decide the cadence.
pub struct ShareCatalog {
    source: Source,
    shares: RwLock<Vec<Arc<Share>>>,
}

impl ShareCatalog {
    pub fn sql(db: Database) -> Self {
        Self {
            source: Source::Sql(db),
            shares: RwLock::new(Vec::new()),
        }
    }

    pub fn dir(root: PathBuf) -> Self {
        Self {
            source: Source::Dir(root),
            shares: RwLock::new(Vec::new()),
        }
    }

    pub async fn refresh(&self) -> Result<()> {
        let fresh = match &self.source {
            Source::Sql(db) => self.refresh_sql(db).await?,
            Source::Dir(root) => self.refresh_dir(root).await?,
        };
        *self.shares.write().await = fresh;
        Ok(())
    }

    async fn refresh_sql(&self, db: &Database) -> Result<Vec<Arc<Share>>> {
        let records = crate::database::shares::list_visible(db.pool()).await?;
        Ok(records
            .into_iter()
            .map(|r| {
                Arc::new(Share {
                    id: r.id,
                    name: r.name,
                    path: PathBuf::from(r.path),
                    tags: clean_tags(&r.tags),
                    updated_at: r.updated_at,
                    writable: true,
                })
            })
            .collect())
    }

    /// Mirrors `hda_shares.go::updateDirShares`: only first-level, non-dotfile
    /// subdirectories become shares, each tagged with its own name.
    async fn refresh_dir(&self, root: &PathBuf) -> Result<Vec<Arc<Share>>> {
        let root = root.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<Arc<Share>>> {
            let mut shares = Vec::new();
            let mut id = 0i64;
            for entry in std::fs::read_dir(&root)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    continue;
                }
                let meta = entry.metadata()?;
                if !meta.is_dir() {
                    continue;
                }
                let updated_at = meta
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());
                id += 1;
                shares.push(Arc::new(Share {
                    id,
                    path: entry.path(),
                    tags: vec![name.clone()],
                    name,
                    updated_at,
                    writable: true,
                }));
            }
            Ok(shares)
        })
        .await?
    }

    pub async fn get(&self, name: &str) -> Option<Arc<Share>> {
        self.shares.read().await.iter().find(|s| s.name == name).cloned()
    }

    pub async fn all(&self) -> Vec<Arc<Share>> {
        self.shares.read().await.clone()
    }

    pub async fn to_json(&self) -> serde_json::Value {
        let shares = self.shares.read().await;
        serde_json::to_value(shares.iter().map(|s| s.to_json()).collect::<Vec<_>>()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_tags_trims_and_drops_empties() {
        assert_eq!(clean_tags("movie,, tv ,  "), vec!["movie", "tv"]);
    }

    #[tokio::test]
    async fn dir_mode_skips_dotfiles_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("movies")).unwrap();
        std::fs::create_dir(dir.path().join(".hidden")).unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();

        let catalog = ShareCatalog::dir(dir.path().to_path_buf());
        catalog.refresh().await.unwrap();
        let shares = catalog.all().await;
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].name, "movies");
    }
}
