#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Load-cycle orchestration for the tract dashboard.
//!
//! One load cycle resolves boundaries and fetches statistics
//! concurrently, then joins the two on the canonical GEOID. Boundary
//! failure degrades to synthetic grid geometry, statistic failure
//! degrades to geometry-only features; only both legs failing surfaces
//! an error. A superseded cycle (the user refreshed mid-flight) discards
//! its results instead of merging stale data.

pub mod merge;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use mobility_map_cache::TtlCache;
use mobility_map_census::{AcsClient, CensusError};
use mobility_map_census_models::StatisticRecord;
use mobility_map_geography::GeoError;
use mobility_map_geography::resolver::{
    BoundarySource, ResolveOptions, build_client, default_sources, resolve_boundaries,
};
use mobility_map_geography::synthetic::synthetic_boundaries;
use mobility_map_geography_models::{BoundingBox, Geoid, NYC_BBOX, NYC_COUNTY_FIPS};
use thiserror::Error;

pub use merge::{MergedFeature, merge_features};

/// Errors that can end a load cycle without data.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Boundary resolution and statistics fetching both failed entirely.
    /// Distinct from an empty-but-successful result so the presentation
    /// layer can tell "no data in range" from "load failed".
    #[error("No boundary or statistic data could be loaded")]
    NoData,

    /// A newer load cycle started while this one was in flight; its
    /// results were discarded.
    #[error("Load cycle superseded by a newer one")]
    Superseded,

    /// Statistics client error.
    #[error(transparent)]
    Census(#[from] CensusError),

    /// Boundary client error.
    #[error(transparent)]
    Geo(#[from] GeoError),
}

/// Tunable configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// ACS 5-year estimate vintage, e.g. `"2023"`.
    pub year: String,
    /// Target county FIPS codes.
    pub counties: Vec<String>,
    /// Bounding box for coordinate sanitization and synthetic layout.
    pub bbox: BoundingBox,
    /// TTL for the full statistics payload.
    pub statistics_ttl: Duration,
    /// TTL for single-tract detail lookups.
    pub tract_ttl: Duration,
    /// Optional Census API key; anonymous requests work, just
    /// rate-limited harder.
    pub api_key: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            year: "2023".to_string(),
            counties: NYC_COUNTY_FIPS.iter().map(ToString::to_string).collect(),
            bbox: NYC_BBOX,
            statistics_ttl: Duration::from_secs(60 * 60),
            tract_ttl: Duration::from_secs(30 * 60),
            api_key: None,
        }
    }
}

impl PipelineConfig {
    /// Reads overrides from the environment: `ACS_YEAR` and
    /// `CENSUS_API_KEY`. Everything else keeps its default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(year) = std::env::var("ACS_YEAR") {
            if !year.trim().is_empty() {
                config.year = year.trim().to_string();
            }
        }
        config.api_key = std::env::var("CENSUS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        config
    }
}

/// Outcome of one completed load cycle.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Merged features, one per boundary feature.
    pub features: Vec<MergedFeature>,
    /// Whether the geometry is the synthetic fallback grid.
    pub synthetic: bool,
    /// Generation counter of the cycle that produced this outcome.
    pub generation: u64,
}

/// The reconciliation pipeline: owns the HTTP clients, the caches, and
/// the generation counter that invalidates superseded cycles.
pub struct Pipeline {
    config: PipelineConfig,
    boundary_client: reqwest::Client,
    sources: Vec<Box<dyn BoundarySource>>,
    acs: AcsClient,
    statistics_cache: TtlCache<Vec<StatisticRecord>>,
    tract_cache: TtlCache<StatisticRecord>,
    generation: AtomicU64,
}

impl Pipeline {
    /// Builds a pipeline with the default boundary source chain.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if an HTTP client cannot be built.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let boundary_client = build_client()?;
        let acs = AcsClient::new(config.year.clone(), config.api_key.clone())?;

        Ok(Self {
            boundary_client,
            sources: default_sources(),
            acs,
            statistics_cache: TtlCache::new(config.statistics_ttl),
            tract_cache: TtlCache::new(config.tract_ttl),
            generation: AtomicU64::new(0),
            config,
        })
    }

    /// Replaces the boundary source chain (used by tests).
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<Box<dyn BoundarySource>>) -> Self {
        self.sources = sources;
        self
    }

    /// Replaces the statistics client (used by tests).
    #[must_use]
    pub fn with_acs_client(mut self, acs: AcsClient) -> Self {
        self.acs = acs;
        self
    }

    /// Default resolve options derived from the pipeline config.
    #[must_use]
    pub fn resolve_options(&self, verbatim: bool) -> ResolveOptions {
        ResolveOptions {
            counties: self.config.counties.clone(),
            bbox: self.config.bbox,
            restrict_to_counties: !verbatim,
            exclude_water: !verbatim,
        }
    }

    /// Marks every in-flight load cycle stale. Their results are
    /// discarded instead of merged; cached payloads stay subject to
    /// their TTL.
    pub fn refresh(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Runs one load cycle: boundaries and statistics concurrently, then
    /// the merge. Both legs honor `options.counties`, so a caller-supplied
    /// county set narrows statistics as well as boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoData`] when both legs fail entirely and
    /// [`PipelineError::Superseded`] when [`Pipeline::refresh`] was called
    /// while this cycle was in flight. Concurrent loads never supersede
    /// each other.
    pub async fn load(&self, options: &ResolveOptions) -> Result<LoadOutcome, PipelineError> {
        let generation = self.generation.load(Ordering::SeqCst);

        let statistics_key = format!(
            "statistics:{}:{}",
            self.config.year,
            options.counties.join("+")
        );
        let boundaries_fut =
            resolve_boundaries(&self.boundary_client, &self.sources, options);
        let statistics_fut = self.statistics_cache.get_or_fetch(&statistics_key, || {
            self.acs.fetch_statistics(&options.counties)
        });

        let (boundaries, statistics) = tokio::join!(boundaries_fut, statistics_fut);

        if self.generation.load(Ordering::SeqCst) != generation {
            log::info!("Load cycle {generation} superseded, discarding results");
            return Err(PipelineError::Superseded);
        }

        let (features, synthetic) = Self::assemble(boundaries, statistics, &self.config.bbox)?;
        Ok(LoadOutcome {
            features,
            synthetic,
            generation,
        })
    }

    /// Joins the two legs, degrading gracefully when one failed.
    fn assemble(
        boundaries: Option<Vec<mobility_map_geography_models::BoundaryFeature>>,
        statistics: Result<Vec<StatisticRecord>, CensusError>,
        bbox: &BoundingBox,
    ) -> Result<(Vec<MergedFeature>, bool), PipelineError> {
        match (boundaries, statistics) {
            (Some(boundaries), Ok(statistics)) => {
                Ok((merge_features(boundaries, statistics), false))
            }
            (Some(boundaries), Err(e)) => {
                log::error!("Statistics fetch failed, serving geometry only: {e}");
                Ok((merge_features(boundaries, Vec::new()), false))
            }
            (None, Ok(statistics)) => {
                log::warn!("No boundary data, laying out synthetic grid");
                let geoids: Vec<Geoid> =
                    statistics.iter().map(|r| r.geoid.clone()).collect();
                let boundaries = synthetic_boundaries(&geoids, bbox);
                Ok((merge_features(boundaries, statistics), true))
            }
            (None, Err(e)) => {
                log::error!("Both boundary and statistic legs failed: {e}");
                Err(PipelineError::NoData)
            }
        }
    }

    /// Fetches (or serves from cache) one tract's statistics for the
    /// inspector panel.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the lookup fails.
    pub async fn tract_detail(&self, geoid: &Geoid) -> Result<StatisticRecord, PipelineError> {
        let key = format!("tract:{geoid}");
        let record = self
            .tract_cache
            .get_or_fetch(&key, || self.acs.fetch_tract(geoid))
            .await?;
        Ok(record)
    }
}
