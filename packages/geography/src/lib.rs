#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census tract boundary resolution for the NYC mobility dashboard.
//!
//! Tries an ordered list of boundary providers (NYC Open Data, `TIGERweb`,
//! a cartographic file mirror), normalizes each provider's schema into one
//! canonical [`BoundaryFeature`] shape, repairs malformed coordinates, and
//! drops open-water tracts. When every provider is unreachable the caller
//! falls back to a synthetic grid layout so the dashboard still renders.
//!
//! [`BoundaryFeature`]: mobility_map_geography_models::BoundaryFeature

pub mod adapters;
pub mod resolver;
pub mod sanitize;
pub mod synthetic;
pub mod water;

use thiserror::Error;

/// Errors that can occur while fetching or normalizing boundary data.
#[derive(Debug, Error)]
pub enum GeoError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
