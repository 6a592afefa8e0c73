use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::core::database::create_in_memory_pool;
use crate::core::error::AppError;
use crate::features::locations::models::NewLocation;
use crate::modules::storage::PhotoStorage;

/// Fresh in-memory SQLite database with the schema applied
pub async fn test_pool() -> SqlitePool {
    create_in_memory_pool()
        .await
        .expect("in-memory sqlite pool")
}

pub fn new_location(name: &str, latitude: f64, longitude: f64) -> NewLocation {
    NewLocation {
        name: name.to_string(),
        description: None,
        latitude,
        longitude,
    }
}

/// Photo storage keeping blobs in memory, served under `/memory/`
#[derive(Default)]
pub struct MemoryPhotoStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryPhotoStorage {
    pub fn get(&self, reference: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(reference).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl PhotoStorage for MemoryPhotoStorage {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<String, AppError> {
        self.blobs.lock().unwrap().insert(key.to_string(), data);
        Ok(key.to_string())
    }

    fn public_url(&self, reference: &str) -> String {
        format!("/memory/{}", reference)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Photo storage whose uploads always fail
pub struct FailingPhotoStorage;

#[async_trait]
impl PhotoStorage for FailingPhotoStorage {
    async fn put(&self, key: &str, _data: Vec<u8>, _content_type: &str) -> Result<String, AppError> {
        Err(AppError::Upload(format!("storage offline while writing '{}'", key)))
    }

    fn public_url(&self, reference: &str) -> String {
        format!("/failing/{}", reference)
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
