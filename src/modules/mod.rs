//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for external services like photo storage.

pub mod storage;
