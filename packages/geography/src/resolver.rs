//! Ordered fallback over boundary providers.
//!
//! Providers are tried in a fixed priority order, each wrapped in its own
//! failure isolation: a source that errors, returns a malformed payload,
//! or yields zero usable features is logged and skipped so the next one
//! still gets its chance. Exhausting every source is a defined "no
//! boundary data" outcome, not an error — the caller switches to the
//! synthetic grid layout.

use async_trait::async_trait;
use mobility_map_geography_models::{BoundaryFeature, BoundingBox, NYC_BBOX, NYC_COUNTY_FIPS};
use serde_json::Value;

use crate::GeoError;
use crate::adapters::{
    BoundaryAdapter, CartographicAdapter, NycOpenDataAdapter, TigerWebAdapter,
};
use crate::sanitize::sanitize_geometry;
use crate::water::is_water_tract;

/// Per-request timeout. A hung provider counts as a failure for fallback
/// purposes instead of stalling the whole load cycle.
const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);

/// Browser-like User-Agent; `TIGERweb` sits behind a WAF that blocks
/// default library agents.
const BOUNDARY_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; MobilityMap/1.0; +https://github.com)";

/// Builds a `reqwest::Client` configured for boundary requests.
///
/// # Errors
///
/// Returns [`GeoError`] if the client cannot be built.
pub fn build_client() -> Result<reqwest::Client, GeoError> {
    reqwest::Client::builder()
        .user_agent(BOUNDARY_USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(Into::into)
}

/// Filtering applied while normalizing a winning source.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Target county FIPS codes.
    pub counties: Vec<String>,
    /// Bounding box used by the coordinate sanitizer.
    pub bbox: BoundingBox,
    /// Keep only features inside the target counties. Disable to display
    /// a supplied dataset verbatim.
    pub restrict_to_counties: bool,
    /// Drop features classified as open water.
    pub exclude_water: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            counties: NYC_COUNTY_FIPS.iter().map(ToString::to_string).collect(),
            bbox: NYC_BBOX,
            restrict_to_counties: true,
            exclude_water: true,
        }
    }
}

/// One boundary provider: how to fetch its payload and which adapter
/// understands its schema.
#[async_trait]
pub trait BoundarySource: Send + Sync {
    /// Unique identifier for logging.
    fn id(&self) -> &str;

    /// Adapter for this provider's property schema.
    fn adapter(&self) -> &dyn BoundaryAdapter;

    /// Fetches the provider's FeatureCollection-shaped payload.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the request or payload parse fails.
    async fn fetch(&self, client: &reqwest::Client) -> Result<Value, GeoError>;
}

/// A provider reached over HTTP returning `GeoJSON`.
pub struct HttpBoundarySource {
    id: &'static str,
    url: String,
    adapter: Box<dyn BoundaryAdapter>,
}

impl HttpBoundarySource {
    /// Creates a source from a URL and its schema adapter.
    #[must_use]
    pub fn new(id: &'static str, url: String, adapter: Box<dyn BoundaryAdapter>) -> Self {
        Self { id, url, adapter }
    }
}

#[async_trait]
impl BoundarySource for HttpBoundarySource {
    fn id(&self) -> &str {
        self.id
    }

    fn adapter(&self) -> &dyn BoundaryAdapter {
        self.adapter.as_ref()
    }

    async fn fetch(&self, client: &reqwest::Client) -> Result<Value, GeoError> {
        let resp = client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GeoError::Conversion {
                message: format!("{} responded with HTTP {status}", self.id),
            });
        }

        resp.json::<Value>().await.map_err(Into::into)
    }
}

/// The default provider chain, highest priority first.
#[must_use]
pub fn default_sources() -> Vec<Box<dyn BoundarySource>> {
    vec![
        Box::new(HttpBoundarySource::new(
            "nyc_open_data",
            "https://data.cityofnewyork.us/resource/63ge-mke6.geojson?$limit=5000".to_string(),
            Box::new(NycOpenDataAdapter),
        )),
        Box::new(HttpBoundarySource::new(
            "tigerweb",
            "https://tigerweb.geo.census.gov/arcgis/rest/services/TIGERweb/tigerWMS_ACS2023/MapServer/8/query\
             ?where=STATE%3D%2736%27\
             &outFields=GEOID,NAME,STATE,COUNTY,TRACT\
             &outSR=4326\
             &f=geojson\
             &returnGeometry=true"
                .to_string(),
            Box::new(TigerWebAdapter),
        )),
        Box::new(HttpBoundarySource::new(
            "cartographic",
            "https://raw.githubusercontent.com/uscensusbureau/citysdk/master/v2/GeoJSON/500k/2020/36/tract.json"
                .to_string(),
            Box::new(CartographicAdapter),
        )),
    ]
}

/// Tries each source in order and returns the first source's normalized,
/// sanitized, filtered feature set. `None` means every source failed or
/// produced nothing usable — callers fall back to synthetic geometry.
pub async fn resolve_boundaries(
    client: &reqwest::Client,
    sources: &[Box<dyn BoundarySource>],
    options: &ResolveOptions,
) -> Option<Vec<BoundaryFeature>> {
    for source in sources {
        let payload = match source.fetch(client).await {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Boundary source {} failed: {e}", source.id());
                continue;
            }
        };

        let features = normalize_collection(source.as_ref(), &payload, options);

        if features.is_empty() {
            log::warn!(
                "Boundary source {} returned no usable features, trying next",
                source.id()
            );
            continue;
        }

        log::info!(
            "Boundary source {} resolved {} tracts",
            source.id(),
            features.len()
        );
        return Some(features);
    }

    log::warn!("All boundary sources exhausted, no boundary data available");
    None
}

/// Normalizes one provider payload: adapter mapping, coordinate
/// sanitization, then the county/identifier/geometry/water filters.
fn normalize_collection(
    source: &dyn BoundarySource,
    payload: &Value,
    options: &ResolveOptions,
) -> Vec<BoundaryFeature> {
    let Some(raw_features) = payload.get("features").and_then(Value::as_array) else {
        log::warn!("No features array in {} response", source.id());
        return Vec::new();
    };

    let adapter = source.adapter();
    let mut features = Vec::with_capacity(raw_features.len());

    for raw in raw_features {
        let Some(mut feature) = adapter.normalize_feature(raw) else {
            continue;
        };

        sanitize_geometry(&mut feature.geometry, &options.bbox);

        if !feature.has_coordinates() {
            continue;
        }

        if options.restrict_to_counties
            && !options.counties.iter().any(|c| c == &feature.county_fips)
        {
            continue;
        }

        if options.exclude_water && is_water_tract(&feature) {
            continue;
        }

        features.push(feature);
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn collection(features: Vec<Value>) -> Value {
        json!({"type": "FeatureCollection", "features": features})
    }

    fn tract_feature(geoid: &str, county: &str) -> Value {
        json!({
            "type": "Feature",
            "properties": {"GEOID": geoid, "COUNTY": county},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [-74.0, 40.7], [-73.99, 40.7], [-73.99, 40.71],
                    [-74.0, 40.71], [-74.0, 40.7]
                ]]
            }
        })
    }

    struct StubSource {
        id: &'static str,
        result: Result<Value, &'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl StubSource {
        fn failing(id: &'static str) -> Self {
            Self {
                id,
                result: Err("stubbed failure"),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn returning(id: &'static str, payload: Value) -> Self {
            Self {
                id,
                result: Ok(payload),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl BoundarySource for StubSource {
        fn id(&self) -> &str {
            self.id
        }

        fn adapter(&self) -> &dyn BoundaryAdapter {
            &TigerWebAdapter
        }

        async fn fetch(&self, _client: &reqwest::Client) -> Result<Value, GeoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(payload) => Ok(payload.clone()),
                Err(message) => Err(GeoError::Conversion {
                    message: (*message).to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn falls_through_to_second_source_on_failure() {
        let first = StubSource::failing("first");
        let second = StubSource::returning(
            "second",
            collection(vec![tract_feature("36061000100", "061")]),
        );
        let (first_calls, second_calls) = (first.counter(), second.counter());

        let sources: Vec<Box<dyn BoundarySource>> = vec![Box::new(first), Box::new(second)];
        let client = reqwest::Client::new();

        let features = resolve_boundaries(&client, &sources, &ResolveOptions::default())
            .await
            .unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].geoid.as_str(), "36061000100");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn skips_sources_with_empty_payloads() {
        let empty = StubSource::returning("empty", collection(vec![]));
        let full = StubSource::returning(
            "full",
            collection(vec![tract_feature("36047015300", "047")]),
        );

        let sources: Vec<Box<dyn BoundarySource>> = vec![Box::new(empty), Box::new(full)];
        let client = reqwest::Client::new();

        let features = resolve_boundaries(&client, &sources, &ResolveOptions::default())
            .await
            .unwrap();
        assert_eq!(features[0].geoid.as_str(), "36047015300");
    }

    #[tokio::test]
    async fn returns_none_when_all_sources_fail() {
        let sources: Vec<Box<dyn BoundarySource>> = vec![
            Box::new(StubSource::failing("first")),
            Box::new(StubSource::failing("second")),
        ];

        let client = reqwest::Client::new();
        let resolved = resolve_boundaries(&client, &sources, &ResolveOptions::default()).await;
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn does_not_try_later_sources_after_success() {
        let first = StubSource::returning(
            "first",
            collection(vec![tract_feature("36061000100", "061")]),
        );
        let second = StubSource::returning(
            "second",
            collection(vec![tract_feature("36047015300", "047")]),
        );

        let second_calls = second.counter();
        let client = reqwest::Client::new();

        let sources: Vec<Box<dyn BoundarySource>> = vec![Box::new(first), Box::new(second)];
        let features = resolve_boundaries(&client, &sources, &ResolveOptions::default())
            .await
            .unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].geoid.as_str(), "36061000100");
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn filters_out_of_county_features() {
        let source = StubSource::returning(
            "mixed",
            collection(vec![
                tract_feature("36061000100", "061"),
                tract_feature("17031000100", "031"),
            ]),
        );

        let sources: Vec<Box<dyn BoundarySource>> = vec![Box::new(source)];
        let client = reqwest::Client::new();

        let features = resolve_boundaries(&client, &sources, &ResolveOptions::default())
            .await
            .unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].county_fips, "061");
    }

    #[tokio::test]
    async fn verbatim_mode_keeps_out_of_county_features() {
        let source = StubSource::returning(
            "mixed",
            collection(vec![
                tract_feature("36061000100", "061"),
                tract_feature("17031000100", "031"),
            ]),
        );

        let options = ResolveOptions {
            restrict_to_counties: false,
            exclude_water: false,
            ..ResolveOptions::default()
        };

        let sources: Vec<Box<dyn BoundarySource>> = vec![Box::new(source)];
        let client = reqwest::Client::new();

        let features = resolve_boundaries(&client, &sources, &options).await.unwrap();
        assert_eq!(features.len(), 2);
    }

    #[tokio::test]
    async fn drops_water_tracts_during_normalization() {
        let mut water = tract_feature("36061009990", "061");
        water["geometry"] = json!({
            "type": "Polygon",
            "coordinates": [[
                [-74.0, 40.7], [-73.999, 40.7], [-73.999, 40.701],
                [-74.0, 40.701], [-74.0, 40.7]
            ]]
        });

        let source = StubSource::returning(
            "with_water",
            collection(vec![tract_feature("36061000100", "061"), water]),
        );

        let sources: Vec<Box<dyn BoundarySource>> = vec![Box::new(source)];
        let client = reqwest::Client::new();

        let features = resolve_boundaries(&client, &sources, &ResolveOptions::default())
            .await
            .unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].geoid.as_str(), "36061000100");
    }
}
