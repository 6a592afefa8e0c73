use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::Router;
use tower_http::services::ServeDir;
use tracing::debug;

use super::PhotoStorage;
use crate::core::config::LocalStorageConfig;
use crate::core::error::AppError;

/// Photos kept in a local directory and served by this application
pub struct LocalPhotoStorage {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalPhotoStorage {
    pub fn new(config: LocalStorageConfig) -> Self {
        Self {
            dir: config.dir,
            url_prefix: config.url_prefix,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Upload(format!(
                "Failed to create photo directory '{}': {}",
                self.dir.display(),
                e
            ))
        })?;

        let target = self.dir.join(key);
        tokio::fs::write(&target, &data).await.map_err(|e| {
            AppError::Upload(format!(
                "Failed to write photo '{}': {}",
                target.display(),
                e
            ))
        })?;

        debug!("Stored photo '{}' ({} bytes)", target.display(), data.len());
        Ok(key.to_string())
    }

    fn public_url(&self, reference: &str) -> String {
        format!("{}/{}", self.url_prefix, reference)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn static_routes(&self) -> Option<Router> {
        Some(Router::new().nest_service(&self.url_prefix, ServeDir::new(&self.dir)))
    }
}
