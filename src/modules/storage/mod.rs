//! Storage module for photo blobs
//!
//! Provides the [`PhotoStorage`] abstraction with a local filesystem backend
//! and an S3/MinIO-compatible object storage backend.

mod local_storage;
mod object_storage;
mod sigv4;

use async_trait::async_trait;
use axum::Router;

use crate::core::error::AppError;

pub use local_storage::LocalPhotoStorage;
pub use object_storage::ObjectPhotoStorage;

/// A blob area photos are written to.
///
/// `put` returns the reference to persist with the location; `public_url`
/// turns that reference back into a fetchable URL.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Store `data` under `key` and return the reference to persist
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String, AppError>;

    /// Public URL for a stored reference
    fn public_url(&self, reference: &str) -> String;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Routes serving stored photos from this process, if the backend needs them
    fn static_routes(&self) -> Option<Router> {
        None
    }
}
