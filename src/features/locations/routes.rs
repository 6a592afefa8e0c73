use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::locations::handlers::{create_location, list_locations};
use crate::features::locations::services::LocationService;
use crate::shared::constants::MULTIPART_OVERHEAD;

/// Create routes for the locations feature
///
/// The create route accepts bodies up to the photo limit plus room for the
/// multipart framing and text fields.
pub fn routes(service: Arc<LocationService>, max_photo_size: usize) -> Router {
    Router::new()
        .route(
            "/api/locations",
            get(list_locations).post(create_location).layer(DefaultBodyLimit::max(
                max_photo_size.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
        .with_state(service)
}
