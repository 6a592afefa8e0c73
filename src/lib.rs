//! Rosemary Map: a community map of rosemary spots.
//!
//! The server side is an axum application over SQLite or Postgres with photos
//! on local disk or in an S3-compatible bucket. The client side
//! ([`features::locations::clients`]) lists, sorts and submits locations over
//! HTTP.

pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
