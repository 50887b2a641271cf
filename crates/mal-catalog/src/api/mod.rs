//! MyAnimeList v2 API client implementation.
//!
//! This module provides a validating, typed client for the official
//! MyAnimeList API.

pub mod client;
pub mod error;
pub mod params;
pub mod types;

pub use client::{CatalogClient, Credentials};
pub use error::CatalogError;
pub use types::*;
