use std::cmp::Ordering;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use thiserror::Error;
use tracing::debug;

use crate::features::locations::dtos::{
    LocationCreatedResponseDto, LocationInputDto, LocationListResponseDto, LocationResponseDto,
};
use crate::features::locations::services::PhotoUpload;
use crate::shared::constants::DEFAULT_PHOTO_CONTENT_TYPE;
use crate::shared::geo::{Coordinates, RadiusFilter};
use crate::shared::types::ErrorResponse;
use crate::shared::validation::FieldErrors;

pub const MISSING_COORDINATES_MESSAGE: &str =
    "Select a location on the map or use your current location before saving.";
pub const SUBMIT_FAILED_MESSAGE: &str = "Unable to add location";
pub const LOAD_FAILED_MESSAGE: &str = "Could not load locations. Please refresh.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The form was rejected locally; nothing was sent
    #[error("Form is invalid")]
    Form(FieldErrors),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// The add-location form as filled in by the user
#[derive(Debug, Clone, Default)]
pub struct LocationSubmission {
    pub name: String,
    pub description: Option<String>,
    /// Picked on the map or taken from the device position
    pub coordinates: Option<Coordinates>,
    pub photo: Option<PhotoUpload>,
}

impl LocationSubmission {
    /// Check the form with the same rules as the server.
    ///
    /// Missing coordinates produce a form-level error only.
    pub fn validate(&self) -> Result<Coordinates, FieldErrors> {
        let coordinates = self
            .coordinates
            .ok_or_else(|| FieldErrors::form(MISSING_COORDINATES_MESSAGE))?;

        LocationInputDto {
            name: Some(self.name.clone()),
            description: self.description.clone(),
            latitude: Some(coordinates.latitude.into()),
            longitude: Some(coordinates.longitude.into()),
        }
        .normalize()?;

        Ok(coordinates)
    }

    fn into_form(self, coordinates: Coordinates) -> Result<Form, ClientError> {
        let mut form = Form::new()
            .text("name", self.name.trim().to_string())
            .text("latitude", coordinates.latitude.to_string())
            .text("longitude", coordinates.longitude.to_string());

        if let Some(description) = self.description.filter(|d| !d.trim().is_empty()) {
            form = form.text("description", description);
        }

        if let Some(photo) = self.photo.filter(|p| !p.is_empty()) {
            let content_type = photo
                .content_type
                .unwrap_or_else(|| DEFAULT_PHOTO_CONTENT_TYPE.to_string());
            let part = Part::bytes(photo.data)
                .file_name(photo.file_name.unwrap_or_else(|| "photo".to_string()))
                .mime_str(&content_type)?;
            form = form.part("photo", part);
        }

        Ok(form)
    }
}

/// HTTP client for the locations API
#[derive(Debug, Clone)]
pub struct LocationClient {
    base_url: String,
    http_client: Client,
}

impl LocationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http_client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn locations_url(&self) -> String {
        format!("{}/api/locations", self.base_url)
    }

    /// Fetch locations, newest first, optionally within a radius
    pub async fn list_locations(
        &self,
        filter: Option<RadiusFilter>,
    ) -> Result<Vec<LocationResponseDto>, ClientError> {
        let mut request = self.http_client.get(self.locations_url());
        if let Some(filter) = filter {
            request = request.query(&[
                ("lat", filter.center.latitude),
                ("lng", filter.center.longitude),
                ("radius", filter.radius_km),
            ]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, LOAD_FAILED_MESSAGE).await);
        }

        let body = response.json::<LocationListResponseDto>().await?;
        debug!("Fetched {} locations", body.locations.len());
        Ok(body.locations)
    }

    /// Validate the form locally, then upload it as multipart.
    ///
    /// No request is made when validation fails.
    pub async fn submit(
        &self,
        submission: LocationSubmission,
    ) -> Result<LocationResponseDto, ClientError> {
        let coordinates = submission.validate().map_err(ClientError::Form)?;
        let form = submission.into_form(coordinates)?;

        let response = self
            .http_client
            .post(self.locations_url())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, SUBMIT_FAILED_MESSAGE).await);
        }

        let body = response.json::<LocationCreatedResponseDto>().await?;
        Ok(body.location)
    }
}

/// Turn a failed response into `ClientError::Api`, preferring the server's
/// `error` message
async fn api_error(response: Response, fallback: &str) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .map(|body| body.error)
        .filter(|error| !error.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    ClientError::Api { status, message }
}

/// A location with its distance from the user, when known
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyLocation {
    pub location: LocationResponseDto,
    pub distance_km: Option<f64>,
}

/// Order locations by distance from the user.
///
/// Without a user position every distance is unknown and the list is ordered
/// by name. Ties are broken by name, case-insensitively.
pub fn sort_by_distance(
    locations: Vec<LocationResponseDto>,
    user: Option<Coordinates>,
) -> Vec<NearbyLocation> {
    let mut nearby: Vec<NearbyLocation> = locations
        .into_iter()
        .map(|location| NearbyLocation {
            distance_km: user.map(|u| {
                u.distance_km(&Coordinates::new(location.latitude, location.longitude))
            }),
            location,
        })
        .collect();

    nearby.sort_by(|a, b| {
        compare_distance(a.distance_km, b.distance_km).then_with(|| {
            a.location
                .name
                .to_lowercase()
                .cmp(&b.location.name.to_lowercase())
        })
    });

    nearby
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
