//! Client side of the locations API: a typed HTTP client, distance sorting
//! for list views, and a polling feed.

mod geolocation;
mod location_client;
mod location_feed;

pub use geolocation::GeolocationError;
pub use location_client::{
    sort_by_distance, ClientError, LocationClient, LocationSubmission, NearbyLocation,
    LOAD_FAILED_MESSAGE, MISSING_COORDINATES_MESSAGE, SUBMIT_FAILED_MESSAGE,
};
pub use location_feed::{FeedState, LocationFeed, DEFAULT_POLL_INTERVAL};
