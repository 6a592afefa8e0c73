use std::sync::Arc;

use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::locations::dtos::{LocationInputDto, LocationResponseDto};
use crate::features::locations::models::Location;
use crate::features::locations::services::{PhotoService, PhotoUpload};
use crate::features::locations::stores::LocationStore;
use crate::shared::geo::RadiusFilter;
use crate::shared::validation::FieldErrors;

/// Service for listing and creating rosemary locations
pub struct LocationService {
    store: Arc<dyn LocationStore>,
    photos: PhotoService,
}

impl LocationService {
    pub fn new(store: Arc<dyn LocationStore>, photos: PhotoService) -> Self {
        Self { store, photos }
    }

    /// All locations newest first, optionally restricted to a radius.
    ///
    /// Filtering is a linear scan over the full list.
    pub async fn list(&self, filter: Option<RadiusFilter>) -> Result<Vec<LocationResponseDto>> {
        let locations = self.store.list().await?;
        let total = locations.len();

        let visible: Vec<LocationResponseDto> = locations
            .into_iter()
            .filter(|location| {
                filter
                    .as_ref()
                    .map_or(true, |f| f.contains(&location.coordinates()))
            })
            .map(|location| self.to_response(location))
            .collect();

        if let Some(filter) = filter {
            tracing::debug!(
                "Radius filter ({}, {}) r={}km kept {}/{} locations",
                filter.center.latitude,
                filter.center.longitude,
                filter.radius_km,
                visible.len(),
                total
            );
        }

        Ok(visible)
    }

    /// Validate, store the optional photo, then persist the location.
    ///
    /// Nothing is persisted when validation or the photo upload fails.
    pub async fn create(
        &self,
        input: LocationInputDto,
        photo: Option<PhotoUpload>,
    ) -> Result<LocationResponseDto> {
        let photo_error = photo.as_ref().and_then(|p| self.photos.size_error(p));

        let new_location = match (input.normalize(), photo_error) {
            (Ok(location), None) => location,
            (Ok(_), Some(message)) => {
                let mut errors = FieldErrors::new();
                errors.add("photo", message);
                return Err(AppError::Validation(errors));
            }
            (Err(mut errors), photo_error) => {
                if let Some(message) = photo_error {
                    errors.add("photo", message);
                }
                return Err(AppError::Validation(errors));
            }
        };

        let photo_reference = match photo {
            Some(upload) => self.photos.store(upload).await?,
            None => None,
        };

        let location = self
            .store
            .create(&new_location, photo_reference.as_deref())
            .await?;

        info!(
            "Location added: id={}, lat={}, lng={}",
            location.id, location.latitude, location.longitude
        );

        Ok(self.to_response(location))
    }

    fn to_response(&self, location: Location) -> LocationResponseDto {
        LocationResponseDto {
            photo_url: location
                .photo_reference
                .as_deref()
                .map(|reference| self.photos.public_url(reference)),
            id: location.id,
            name: location.name,
            description: location.description,
            latitude: location.latitude,
            longitude: location.longitude,
            created_at: location.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::locations::dtos::CoordinateValue;
    use crate::features::locations::stores::SqliteLocationStore;
    use crate::shared::geo::Coordinates;
    use crate::shared::test_helpers::{test_pool, FailingPhotoStorage, MemoryPhotoStorage};

    fn input(name: &str, latitude: f64, longitude: f64) -> LocationInputDto {
        LocationInputDto {
            name: Some(name.to_string()),
            description: None,
            latitude: Some(CoordinateValue::Number(latitude)),
            longitude: Some(CoordinateValue::Number(longitude)),
        }
    }

    fn png(size: usize) -> PhotoUpload {
        PhotoUpload {
            data: vec![7; size],
            file_name: Some("spot.png".to_string()),
            content_type: Some("image/png".to_string()),
        }
    }

    async fn service_with(storage: Arc<dyn crate::modules::storage::PhotoStorage>) -> LocationService {
        let store = Arc::new(SqliteLocationStore::new(test_pool().await));
        LocationService::new(store, PhotoService::new(storage, 1024 * 1024))
    }

    #[tokio::test]
    async fn test_create_without_photo() {
        let service = service_with(Arc::new(MemoryPhotoStorage::default())).await;

        let created = service.create(input("Hedge", 1.0, 2.0), None).await.unwrap();

        assert_eq!(created.name, "Hedge");
        assert!(created.photo_url.is_none());
        assert_eq!(service.list(None).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_create_with_photo_exposes_url() {
        let storage = Arc::new(MemoryPhotoStorage::default());
        let service = service_with(storage.clone()).await;

        let created = service
            .create(input("Hedge", 1.0, 2.0), Some(png(4)))
            .await
            .unwrap();

        let url = created.photo_url.unwrap();
        let reference = url.trim_start_matches("/memory/");
        assert_eq!(storage.get(reference), Some(vec![7; 4]));
    }

    #[tokio::test]
    async fn test_empty_photo_is_ignored() {
        let storage = Arc::new(MemoryPhotoStorage::default());
        let service = service_with(storage.clone()).await;

        let created = service
            .create(input("Hedge", 1.0, 2.0), Some(png(0)))
            .await
            .unwrap();

        assert!(created.photo_url.is_none());
        assert_eq!(storage.len(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_persists_nothing() {
        let service = service_with(Arc::new(FailingPhotoStorage)).await;

        let result = service.create(input("Hedge", 1.0, 2.0), Some(png(8))).await;

        assert!(matches!(result, Err(AppError::Upload(_))));
        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_skips_upload() {
        let storage = Arc::new(MemoryPhotoStorage::default());
        let service = service_with(storage.clone()).await;

        let result = service.create(input("", 200.0, 2.0), Some(png(8))).await;

        match result {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.get("name"), Some("Name is required"));
                assert!(errors.get("latitude").is_some());
            }
            other => panic!("expected validation error, got {:?}", other.map(|l| l.id)),
        }
        assert_eq!(storage.len(), 0);
        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_photo_rejected() {
        let storage = Arc::new(MemoryPhotoStorage::default());
        let service = service_with(storage.clone()).await;

        let result = service
            .create(input("Hedge", 1.0, 2.0), Some(png(1024 * 1024 + 1)))
            .await;

        match result {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.get("photo"), Some("Photo must be 1 MB or smaller"));
            }
            other => panic!("expected validation error, got {:?}", other.map(|l| l.id)),
        }
        assert_eq!(storage.len(), 0);
    }

    #[tokio::test]
    async fn test_list_applies_radius_filter() {
        let service = service_with(Arc::new(MemoryPhotoStorage::default())).await;

        let sf = service
            .create(input("San Francisco", 37.7749, -122.4194), None)
            .await
            .unwrap();
        service
            .create(input("Los Angeles", 34.0522, -118.2437), None)
            .await
            .unwrap();

        let filter = RadiusFilter {
            center: Coordinates::new(37.7749, -122.4194),
            radius_km: 0.0,
        };
        let nearby = service.list(Some(filter)).await.unwrap();
        assert_eq!(nearby, vec![sf]);

        let everything = service.list(None).await.unwrap();
        assert_eq!(everything.len(), 2);
        assert_eq!(everything[0].name, "Los Angeles");
    }
}
