use crate::database::Database;
use anyhow::Result;
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize)]
pub struct App {
    pub name: String,
    pub logo_url: String,
    pub vhost: String,
    pub local_port: u16,
}

/// The internal vhost the dashboard app always points at.
const DASHBOARD_VHOST: &str = "hda";

/// Registered local web applications reachable through the vhost reverse
/// proxy, plus a synthetic "Dashboard" entry that always comes first —
/// mirrors `hda_apps.go::to_json`'s prepend.
pub struct AppCatalog {
    db: Database,
    apps: RwLock<Vec<App>>,
}

impl AppCatalog {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            apps: RwLock::new(Vec::new()),
        }
    }

    pub async fn refresh(&self) -> Result<()> {
        let records = crate::database::apps::list(self.db.pool()).await?;
        let apps = records
            .into_iter()
            .map(|r| App {
                name: r.name,
                logo_url: r.logo_url,
                vhost: r.vhost,
                local_port: r.local_port as u16,
            })
            .collect();
        *self.apps.write().await = apps;
        Ok(())
    }

    pub async fn find_by_vhost(&self, vhost: &str) -> Option<App> {
        if vhost == DASHBOARD_VHOST {
            return Some(Self::dashboard());
        }
        self.apps.read().await.iter().find(|a| a.vhost == vhost).cloned()
    }

    fn dashboard() -> App {
        App {
            name: "Dashboard".to_string(),
            logo_url: String::new(),
            vhost: DASHBOARD_VHOST.to_string(),
            local_port: 0,
        }
    }

    pub async fn to_json(&self) -> serde_json::Value {
        let mut all = vec![Self::dashboard()];
        all.extend(self.apps.read().await.iter().cloned());
        serde_json::to_value(all).unwrap()
    }
}
