/// Mean Earth radius used by the haversine distance, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// LOCATION FIELD LIMITS
// =============================================================================

/// Maximum length of a location name (characters, after trimming)
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a location description (characters, after trimming)
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

// =============================================================================
// PHOTOS
// =============================================================================

/// Extension used when an uploaded photo has no usable extension
pub const DEFAULT_PHOTO_EXTENSION: &str = "jpg";

/// Content type used when an uploaded photo declares none
pub const DEFAULT_PHOTO_CONTENT_TYPE: &str = "application/octet-stream";

/// Default maximum photo size in bytes (10MB)
pub const DEFAULT_MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Extra body allowance on top of the photo size for multipart overhead
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;
