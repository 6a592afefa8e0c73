use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header, StatusCode},
    Json,
};
use tracing::debug;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::locations::dtos::{
    CoordinateValue, CreateLocationFormDto, ListLocationsQuery, LocationCreatedResponseDto,
    LocationInputDto, LocationListResponseDto,
};
use crate::features::locations::services::{LocationService, PhotoUpload};
use crate::shared::geo::RadiusFilter;
use crate::shared::types::ErrorResponse;

/// List locations, newest first
///
/// When `lat`, `lng` and `radius` are all given and numeric, only locations
/// within `radius` kilometers of the point are returned.
#[utoipa::path(
    get,
    path = "/api/locations",
    params(ListLocationsQuery),
    responses(
        (status = 200, description = "Locations retrieved", body = LocationListResponseDto),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "locations"
)]
pub async fn list_locations(
    State(service): State<Arc<LocationService>>,
    Query(query): Query<ListLocationsQuery>,
) -> Result<Json<LocationListResponseDto>> {
    let filter = RadiusFilter::from_query(
        query.lat.as_deref(),
        query.lng.as_deref(),
        query.radius.as_deref(),
    );

    let locations = service.list(filter).await?;
    Ok(Json(LocationListResponseDto { locations }))
}

/// Add a location
///
/// Accepts `multipart/form-data` (with an optional `photo` file) or a JSON
/// body. Any other content type is parsed as JSON.
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body(
        content(
            (CreateLocationFormDto = "multipart/form-data"),
            (LocationInputDto = "application/json")
        ),
        description = "Location fields, with an optional photo when sent as a form"
    ),
    responses(
        (status = 201, description = "Location created", body = LocationCreatedResponseDto),
        (status = 400, description = "Validation failed or malformed body", body = ErrorResponse),
        (status = 413, description = "Request body over the size limit", body = ErrorResponse),
        (status = 500, description = "Storage or photo upload failure", body = ErrorResponse)
    ),
    tag = "locations"
)]
pub async fn create_location(
    State(service): State<Arc<LocationService>>,
    request: Request,
) -> Result<(StatusCode, Json<LocationCreatedResponseDto>)> {
    let (input, photo) = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &()).await?;
        read_location_form(multipart).await?
    } else {
        let AppJson(input) = AppJson::<LocationInputDto>::from_request(request, &()).await?;
        (input, None)
    };

    let location = service.create(input, photo).await?;
    Ok((
        StatusCode::CREATED,
        Json(LocationCreatedResponseDto { location }),
    ))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

/// Collect the text fields and optional photo of the add-location form
async fn read_location_form(
    mut multipart: Multipart,
) -> Result<(LocationInputDto, Option<PhotoUpload>)> {
    let mut input = LocationInputDto::default();
    let mut photo = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "photo" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;

                photo = Some(PhotoUpload {
                    data: data.to_vec(),
                    file_name,
                    content_type,
                });
            }
            "name" => input.name = Some(field.text().await?),
            "description" => input.description = Some(field.text().await?),
            "latitude" => input.latitude = Some(CoordinateValue::Text(field.text().await?)),
            "longitude" => input.longitude = Some(CoordinateValue::Text(field.text().await?)),
            _ => {
                debug!("Ignoring unknown form field: {}", field_name);
            }
        }
    }

    Ok((input, photo))
}
