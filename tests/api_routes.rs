use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use homerelay_agent::catalog::{AppCatalog, ShareCatalog};
use homerelay_agent::config::Config;
use homerelay_agent::database::Database;
use homerelay_agent::metadata::StubMetadataLookup;
use homerelay_agent::metrics::DebugCounters;
use homerelay_agent::session::{DemoUserDirectory, SessionTable};
use homerelay_agent::web::{create_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

async fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("movies")).unwrap();
    std::fs::write(dir.path().join("movies/intro.txt"), b"hello world").unwrap();

    let shares = Arc::new(ShareCatalog::dir(dir.path().to_path_buf()));
    shares.refresh().await.unwrap();

    let db_config = homerelay_agent::config::DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    let db = Database::connect(&db_config).await.unwrap();
    db.migrate().await.unwrap();
    let apps = Arc::new(AppCatalog::new(db));

    let state = AppState {
        sessions: SessionTable::new(Arc::new(DemoUserDirectory)),
        shares,
        apps,
        debug: Arc::new(DebugCounters::new()),
        config: Arc::new(Config::default()),
        metadata: Arc::new(StubMetadataLookup),
        started_at: Utc::now(),
        local_addr: "127.0.0.1:4563".to_string(),
        log_path: dir.path().join("agent.log"),
    };
    (state, dir)
}

#[tokio::test]
async fn shares_endpoint_lists_demo_shares() {
    let (state, _dir) = test_state().await;
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/shares")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn file_endpoint_serves_a_known_file() {
    let (state, _dir) = test_state().await;
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/files?share=movies&path=intro.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn file_endpoint_rejects_path_traversal() {
    let (state, _dir) = test_state().await;
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/files?share=movies&path=../../../etc/passwd")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn files_endpoint_blocks_access_to_the_sidecar_cache() {
    let (state, _dir) = test_state().await;
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/files?share=movies&path=.fscache/thumbnails/a.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_share_is_not_found() {
    let (state, _dir) = test_state().await;
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/files?share=nope&path=x.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn auth_with_any_pin_succeeds_in_demo_mode() {
    let (state, _dir) = test_state().await;
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"pin":"0000"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
