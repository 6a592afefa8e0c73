use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::locations::models::NewLocation;
use crate::shared::validation::FieldErrors;

/// A coordinate as submitted: JSON number or text from a form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl From<f64> for CoordinateValue {
    fn from(value: f64) -> Self {
        CoordinateValue::Number(value)
    }
}

/// Loosely-typed location submission (JSON body or multipart text fields)
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LocationInputDto {
    /// Display name, 1-100 characters after trimming
    #[schema(example = "Rosemary hedge by the library")]
    pub name: Option<String>,
    /// Optional notes, up to 500 characters
    #[schema(example = "Big bush on the north side, free to pick")]
    pub description: Option<String>,
    /// Latitude in degrees, -90 to 90
    #[schema(value_type = f64, example = 37.7749)]
    pub latitude: Option<CoordinateValue>,
    /// Longitude in degrees, -180 to 180
    #[schema(value_type = f64, example = -122.4194)]
    pub longitude: Option<CoordinateValue>,
}

/// Typed submission after trimming and coercion; range and length rules are
/// checked by `validator`
#[derive(Debug, Clone, Validate)]
struct LocationFields {
    #[validate(length(max = 100, message = "Name must be 100 characters or fewer"))]
    name: String,
    #[validate(length(max = 500, message = "Description must be 500 characters or fewer"))]
    description: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    latitude: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    longitude: f64,
}

impl LocationInputDto {
    /// Trim, coerce and validate into a location ready for storage.
    ///
    /// Every invalid field gets exactly one message.
    pub fn normalize(self) -> Result<NewLocation, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let latitude = coerce_coordinate(self.latitude, "latitude", "Latitude", &mut errors);
        let longitude = coerce_coordinate(self.longitude, "longitude", "Longitude", &mut errors);

        let fields = LocationFields {
            name,
            description,
            latitude: latitude.unwrap_or_default(),
            longitude: longitude.unwrap_or_default(),
        };

        if let Err(validation_errors) = fields.validate() {
            errors.extend_from_validator(&validation_errors);
        }

        errors.into_result()?;

        Ok(NewLocation {
            name: fields.name,
            description: fields.description,
            latitude: fields.latitude,
            longitude: fields.longitude,
        })
    }
}

/// Parse a coordinate, recording a message when it is missing or not a number
fn coerce_coordinate(
    value: Option<CoordinateValue>,
    field: &str,
    label: &str,
    errors: &mut FieldErrors,
) -> Option<f64> {
    let parsed = match value {
        None => None,
        Some(CoordinateValue::Text(text)) if text.trim().is_empty() => None,
        Some(CoordinateValue::Number(number)) => Some(Ok(number)),
        Some(CoordinateValue::Text(text)) => Some(text.trim().parse::<f64>().map_err(|_| ())),
    };

    match parsed {
        None => {
            errors.add(field, format!("{} is required", label));
            None
        }
        Some(Ok(number)) if number.is_finite() => Some(number),
        Some(_) => {
            errors.add(field, format!("{} must be a number", label));
            None
        }
    }
}

/// Multipart form accepted by the create endpoint.
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateLocationFormDto {
    #[schema(example = "Rosemary hedge by the library")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "37.7749")]
    pub latitude: String,
    #[schema(example = "-122.4194")]
    pub longitude: String,
    /// Optional photo of the spot
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub photo: Option<String>,
}

/// Query parameters for listing locations.
///
/// Filtering applies only when `lat`, `lng` and `radius` are all present and
/// numeric; otherwise the full list is returned.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLocationsQuery {
    /// Latitude of the search center
    pub lat: Option<String>,
    /// Longitude of the search center
    pub lng: Option<String>,
    /// Search radius in kilometers
    pub radius: Option<String>,
}

/// Public view of a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponseDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    /// Public URL of the photo, null when none was uploaded
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationListResponseDto {
    pub locations: Vec<LocationResponseDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationCreatedResponseDto {
    pub location: LocationResponseDto,
}
