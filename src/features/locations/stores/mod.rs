//! Persistence for location records.
//!
//! The store is append-only: records are created and listed, never updated or
//! deleted. Radius filtering happens above the store.

mod postgres_store;
mod sqlite_store;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::locations::models::{Location, NewLocation};

pub use postgres_store::PgLocationStore;
pub use sqlite_store::SqliteLocationStore;

const LOCATION_COLUMNS: &str =
    "id, name, description, latitude, longitude, photo_reference, created_at";

#[async_trait]
pub trait LocationStore: Send + Sync {
    /// All locations, newest first
    async fn list(&self) -> Result<Vec<Location>>;

    /// Persist a validated location, assigning its id and creation time
    async fn create(
        &self,
        location: &NewLocation,
        photo_reference: Option<&str>,
    ) -> Result<Location>;
}
