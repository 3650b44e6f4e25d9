#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! ACS statistics for NYC census tracts.
//!
//! Fetches the 5-year estimates per county from the Census Bureau API,
//! parses the positional tabular response into keyed
//! [`StatisticRecord`]s, and computes the dashboard's derived ratio
//! metrics. Variable codes live in an embedded TOML registry so the
//! computation stays separate from the configuration.
//!
//! [`StatisticRecord`]: mobility_map_census_models::StatisticRecord

pub mod client;
pub mod metrics;
pub mod variables;

use thiserror::Error;

pub use client::AcsClient;

/// Errors that can occur while fetching or parsing ACS data.
#[derive(Debug, Error)]
pub enum CensusError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Every requested county failed to fetch.
    #[error("No county statistics could be fetched")]
    AllCountiesFailed,

    /// A single-tract lookup found no row.
    #[error("No statistics found for tract {geoid}")]
    TractNotFound {
        /// The tract that was requested.
        geoid: String,
    },

    /// Response did not match the expected tabular shape.
    #[error("Malformed ACS response: {message}")]
    Malformed {
        /// Description of what went wrong.
        message: String,
    },
}
