//! Community rosemary locations.
//!
//! Anyone can list the pinned spots (optionally within a radius of a point)
//! and add a new one with an optional photo.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/locations` | No | List locations, `?lat=&lng=&radius=` filters by distance |
//! | POST | `/api/locations` | No | Add a location (multipart with `photo`, or JSON) |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

pub use routes::routes;
pub use services::{LocationService, PhotoService};
