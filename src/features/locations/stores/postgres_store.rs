use async_trait::async_trait;
use sqlx::PgPool;

use super::{LocationStore, LOCATION_COLUMNS};
use crate::core::error::{AppError, Result};
use crate::features::locations::models::{Location, NewLocation};

/// Postgres-backed location store for hosted deployments
pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for PgLocationStore {
    async fn list(&self) -> Result<Vec<Location>> {
        let query = format!(
            "SELECT {} FROM locations ORDER BY created_at DESC, id DESC",
            LOCATION_COLUMNS
        );

        let locations = sqlx::query_as::<_, Location>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(locations)
    }

    async fn create(
        &self,
        location: &NewLocation,
        photo_reference: Option<&str>,
    ) -> Result<Location> {
        // created_at comes from the column default (NOW())
        let query = format!(
            r#"
            INSERT INTO locations (name, description, latitude, longitude, photo_reference)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        );

        let created = sqlx::query_as::<_, Location>(&query)
            .bind(&location.name)
            .bind(&location.description)
            .bind(location.latitude)
            .bind(location.longitude)
            .bind(photo_reference)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create location: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!(
            "Location created: id={}, name={:?}, has_photo={}",
            created.id,
            created.name,
            created.photo_reference.is_some()
        );

        Ok(created)
    }
}
