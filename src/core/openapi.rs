use utoipa::{Modify, OpenApi};

use crate::features::locations::{dtos as locations_dtos, handlers as locations_handlers};
use crate::shared::types::ErrorResponse;
use crate::shared::validation::FieldErrors;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Locations
        locations_handlers::list_locations,
        locations_handlers::create_location,
    ),
    components(
        schemas(
            locations_dtos::CoordinateValue,
            locations_dtos::LocationInputDto,
            locations_dtos::CreateLocationFormDto,
            locations_dtos::LocationResponseDto,
            locations_dtos::LocationListResponseDto,
            locations_dtos::LocationCreatedResponseDto,
            ErrorResponse,
            FieldErrors,
        )
    ),
    tags(
        (name = "locations", description = "Community rosemary spots (public)"),
    ),
    info(
        title = "Rosemary Map API",
        version = "0.1.0",
        description = "Share and find rosemary bushes near you",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
