#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use rosemary_map::core::app;
use rosemary_map::core::config::LocalStorageConfig;
use rosemary_map::core::database::{create_in_memory_pool, DatabasePool};
use rosemary_map::features::locations::{LocationService, PhotoService};
use rosemary_map::modules::storage::{LocalPhotoStorage, PhotoStorage};

pub const MAX_PHOTO_SIZE: usize = 1024 * 1024;

pub struct TestApp {
    pub router: Router,
    pub photo_dir: PathBuf,
}

/// Full application over in-memory SQLite and a fresh temporary photo directory
pub async fn test_app() -> TestApp {
    let pool = create_in_memory_pool()
        .await
        .expect("in-memory sqlite pool");
    let photo_dir = std::env::temp_dir()
        .join(format!("rosemary-map-test-{}", uuid::Uuid::new_v4()))
        .join("uploads");

    let storage: Arc<dyn PhotoStorage> = Arc::new(LocalPhotoStorage::new(LocalStorageConfig {
        dir: photo_dir.clone(),
        url_prefix: "/uploads".to_string(),
    }));
    let service = Arc::new(LocationService::new(
        DatabasePool::Sqlite(pool).location_store(),
        PhotoService::new(Arc::clone(&storage), MAX_PHOTO_SIZE),
    ));

    let router = app::with_http_layers(
        app::api_router(service, storage.as_ref(), MAX_PHOTO_SIZE),
        vec!["*".to_string()],
    );

    TestApp { router, photo_dir }
}

/// Serve a router on an ephemeral local port
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });

    addr
}
