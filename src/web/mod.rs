pub mod handlers;
pub mod middleware;

use crate::catalog::{AppCatalog, ShareCatalog};
use crate::config::Config;
use crate::metadata::MediaMetadataLookup;
use crate::metrics::DebugCounters;
use crate::session::SessionTable;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionTable,
    pub shares: Arc<ShareCatalog>,
    pub apps: Arc<AppCatalog>,
    pub debug: Arc<DebugCounters>,
    pub config: Arc<Config>,
    pub metadata: Arc<dyn MediaMetadataLookup>,
    pub started_at: DateTime<Utc>,
    pub local_addr: String,
    pub log_path: std::path::PathBuf,
}

/// Builds the full request router: the API surface (`/auth`, `/shares`,
/// `/files`, `/cache`, `/apps`, `/md`, `/hda_debug`, `/logs`) wrapped in
/// the vhost filter that dispatches non-API traffic to local web apps
/// through the reverse proxy, matching `service.go::NewMercuryFSService`'s
/// route table and `topVhostFilter` wrapper.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/shares", get(handlers::shares::list))
        .route(
            "/files",
            get(handlers::files::get_file)
                .delete(handlers::files::delete_file)
                .post(handlers::files::upload_file),
        )
        .route("/cache", get(handlers::files::get_cache))
        .route("/apps", get(handlers::apps::list))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let api = Router::new()
        .route("/auth", post(handlers::auth::authenticate))
        .route("/logout", post(handlers::auth::logout))
        .route("/md", get(handlers::metadata::get_metadata))
        .route("/hda_debug", get(handlers::debug::get_debug))
        .route("/logs", get(handlers::logs::get_logs))
        .merge(protected)
        .with_state(state.clone());

    Router::new().merge(api).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(middleware::add_vary_session))
            .layer(axum::middleware::from_fn_with_state(
                state,
                middleware::vhost_filter,
            )),
    )
}
