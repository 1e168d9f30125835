use anyhow::{Context, Result};
use clap::Parser;
use homerelay_agent::catalog::{AppCatalog, ShareCatalog};
use homerelay_agent::config::{Cli, Config};
use homerelay_agent::database::Database;
use homerelay_agent::metadata::StubMetadataLookup;
use homerelay_agent::metrics::DebugCounters;
use homerelay_agent::session::{DemoUserDirectory, SessionTable, SqlUserDirectory, UserDirectory};
use homerelay_agent::thumbnails::watcher;
use homerelay_agent::web::{self, AppState};
use homerelay_agent::{relay, utils};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let level = match config.logging.level {
        1 => "error",
        2 => "warn",
        3 => "info",
        4 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let log_dir = config.storage.data_dir.clone();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "agent.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .context("initializing tracing subscriber")?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = Config::load()?;

    // Non-production builds only: mirrors the original agent's
    // `if !PRODUCTION { flag.Parse() ... }` gate.
    if cfg!(debug_assertions) {
        config = Cli::parse().apply(config);
    }

    let _log_guard = init_logging(&config)?;
    tracing::info!("starting home relay agent");

    let pid_path = config.storage.data_dir.join("agent.pid");
    utils::pid_file::check_and_write(&pid_path)?;

    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    let (directory, shares): (Arc<dyn UserDirectory>, Arc<ShareCatalog>) =
        match &config.storage.demo_root {
            Some(root) => {
                tracing::info!(root = %root.display(), "running in demo mode");
                (Arc::new(DemoUserDirectory), Arc::new(ShareCatalog::dir(root.clone())))
            }
            None => (
                Arc::new(SqlUserDirectory::new(db.clone())),
                Arc::new(ShareCatalog::sql(db.clone())),
            ),
        };
    shares.refresh().await?;

    let apps = Arc::new(AppCatalog::new(db));
    if let Err(err) = apps.refresh().await {
        tracing::warn!(error = %err, "could not refresh app catalog, continuing with an empty one");
    }

    let sessions = SessionTable::new(directory);
    let state = AppState {
        sessions,
        shares: shares.clone(),
        apps,
        debug: Arc::new(DebugCounters::new()),
        config: Arc::new(config.clone()),
        metadata: Arc::new(StubMetadataLookup),
        started_at: chrono::Utc::now(),
        local_addr: config.local_bind.clone(),
        log_path: config.storage.data_dir.join("agent.log"),
    };

    for share in shares.all().await {
        let path = share.path.clone();
        tokio::spawn(async move {
            watcher::warm_cache(&path).await;
            if let Err(err) = watcher::watch(&path).await {
                tracing::warn!(error = %err, "thumbnail cache watcher stopped");
            }
        });
    }

    let router = web::create_router(state);

    let local_bind = config.local_bind.clone();
    let local_router = router.clone();
    tokio::spawn(async move {
        match tokio::net::TcpListener::bind(&local_bind).await {
            Ok(listener) => {
                tracing::info!(addr = %local_bind, "serving local HTTP surface");
                if let Err(err) = axum::serve(listener, local_router).await {
                    tracing::warn!(error = %err, "local HTTP server stopped");
                }
            }
            Err(err) => tracing::warn!(addr = %local_bind, error = %err, "could not bind local HTTP surface"),
        }
    });

    relay::run_forever(config.relay, config.local_bind.clone(), router).await;

    utils::pid_file::remove(&pid_path);
    Ok(())
}
