use std::sync::Arc;

use axum::Router;
use rosemary_map::core::config::{Config, PhotoBackend};
use rosemary_map::core::{app, database};
use rosemary_map::features::locations::{LocationService, PhotoService};
use rosemary_map::modules::storage::{LocalPhotoStorage, ObjectPhotoStorage, PhotoStorage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!(
        "Database connection pool created (backend={})",
        pool.backend_name()
    );

    tracing::info!("Running database migrations...");
    pool.migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Photo storage
    let photo_storage: Arc<dyn PhotoStorage> = match config.storage.backend {
        PhotoBackend::Local => {
            let storage = LocalPhotoStorage::new(config.storage.local.clone());
            tracing::info!(
                "Local photo storage at '{}' served under {}",
                storage.dir().display(),
                config.storage.local.url_prefix
            );
            Arc::new(storage)
        }
        PhotoBackend::ObjectStorage => {
            let object_config = config.storage.object.clone().ok_or_else(|| {
                anyhow::anyhow!("Object storage selected but S3 settings are missing")
            })?;
            let storage = ObjectPhotoStorage::new(object_config)
                .map_err(|e| anyhow::anyhow!("Failed to initialize object storage: {}", e))?;
            tracing::info!(
                "Object photo storage initialized for bucket: {}",
                storage.bucket_name()
            );
            Arc::new(storage)
        }
    };

    // Initialize Location Service
    let photo_service = PhotoService::new(Arc::clone(&photo_storage), config.storage.max_photo_size);
    let location_service = Arc::new(LocationService::new(pool.location_store(), photo_service));
    tracing::info!(
        "Location service initialized (max photo size: {} bytes)",
        config.storage.max_photo_size
    );

    let app = Router::new()
        .merge(app::swagger_router(&config.swagger))
        .merge(app::api_router(
            location_service,
            photo_storage.as_ref(),
            config.storage.max_photo_size,
        ));
    let app = app::with_http_layers(app, config.app.cors_allowed_origins.clone());

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
