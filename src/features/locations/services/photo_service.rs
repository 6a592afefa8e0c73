use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::core::error::Result;
use crate::modules::storage::PhotoStorage;
use crate::shared::constants::{DEFAULT_PHOTO_CONTENT_TYPE, DEFAULT_PHOTO_EXTENSION};
use crate::shared::validation::FILE_EXTENSION_REGEX;

/// An uploaded photo as received from the client
#[derive(Debug, Clone, Default)]
pub struct PhotoUpload {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl PhotoUpload {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Unique storage key for an uploaded photo: a random UUID plus the original
/// extension, falling back to `jpg`
pub fn photo_key(file_name: Option<&str>) -> String {
    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| FILE_EXTENSION_REGEX.is_match(ext))
        .unwrap_or(DEFAULT_PHOTO_EXTENSION);

    format!("{}.{}", Uuid::new_v4(), extension)
}

/// Human-readable size limit, rounded down so the stated limit is never
/// above the real one
fn format_size_limit(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;

    if bytes >= MB {
        let tenths = bytes * 10 / MB;
        if tenths % 10 == 0 {
            format!("{} MB", tenths / 10)
        } else {
            format!("{}.{} MB", tenths / 10, tenths % 10)
        }
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Service for photo intake
pub struct PhotoService {
    storage: Arc<dyn PhotoStorage>,
    max_photo_size: usize,
}

impl PhotoService {
    pub fn new(storage: Arc<dyn PhotoStorage>, max_photo_size: usize) -> Self {
        Self {
            storage,
            max_photo_size,
        }
    }

    /// Validation message when the photo exceeds the configured size
    pub fn size_error(&self, upload: &PhotoUpload) -> Option<String> {
        if upload.data.len() > self.max_photo_size {
            Some(format!(
                "Photo must be {} or smaller",
                format_size_limit(self.max_photo_size)
            ))
        } else {
            None
        }
    }

    /// Store a non-empty photo and return its reference.
    ///
    /// Empty uploads are ignored and yield `None`.
    pub async fn store(&self, upload: PhotoUpload) -> Result<Option<String>> {
        if upload.is_empty() {
            return Ok(None);
        }

        let key = photo_key(upload.file_name.as_deref());
        let content_type = upload
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_PHOTO_CONTENT_TYPE);
        let size = upload.data.len();

        let reference = self.storage.put(&key, upload.data, content_type).await?;

        debug!(
            "Photo stored: backend={}, reference={}, size={}",
            self.storage.backend_name(),
            reference,
            size
        );

        Ok(Some(reference))
    }

    pub fn public_url(&self, reference: &str) -> String {
        self.storage.public_url(reference)
    }
}
