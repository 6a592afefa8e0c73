mod location_service;
mod photo_service;

pub use location_service::LocationService;
pub use photo_service::{photo_key, PhotoService, PhotoUpload};
