#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Wire types for the mobility map API.
//!
//! The tract list is shaped as a `GeoJSON`-style `FeatureCollection` so
//! the `MapLibre` frontend can hand it to a source directly; statistic
//! fields ride in each feature's properties.

use mobility_map_census_models::{DerivedMetrics, StatisticValues};
use mobility_map_pipeline::MergedFeature;
use serde::{Deserialize, Serialize};

/// `GET /api/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    pub healthy: bool,
    pub version: String,
}

/// Query parameters for `GET /api/tracts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TractQueryParams {
    /// Disable the county and water filters and return every tract the
    /// winning source supplied.
    pub all: Option<bool>,
    /// Comma-separated county FIPS codes overriding the target set.
    pub counties: Option<String>,
}

/// Per-tract properties carried inside each feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTractProperties {
    pub geoid: String,
    pub name: String,
    pub county_fips: String,
    #[serde(flatten)]
    pub values: StatisticValues,
    #[serde(flatten)]
    pub derived: DerivedMetrics,
}

/// One tract as a `GeoJSON`-style feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTract {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: ApiTractProperties,
    pub geometry: geojson::Geometry,
}

/// `GET /api/tracts` response: a feature collection plus a flag telling
/// the frontend whether the geometry is the synthetic fallback grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTractCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub synthetic: bool,
    pub features: Vec<ApiTract>,
}

impl From<MergedFeature> for ApiTract {
    fn from(merged: MergedFeature) -> Self {
        let (values, derived) = merged
            .statistics
            .map(|record| (record.values, record.derived))
            .unwrap_or_default();

        Self {
            kind: "Feature".to_string(),
            properties: ApiTractProperties {
                geoid: merged.boundary.geoid.to_string(),
                name: merged.boundary.name,
                county_fips: merged.boundary.county_fips,
                values,
                derived,
            },
            geometry: merged.boundary.geometry,
        }
    }
}

impl ApiTractCollection {
    /// Wraps merged features into the wire shape.
    #[must_use]
    pub fn new(features: Vec<MergedFeature>, synthetic: bool) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            synthetic,
            features: features.into_iter().map(ApiTract::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobility_map_census_models::StatisticRecord;
    use mobility_map_geography_models::{BoundaryFeature, Geoid};

    fn merged(with_stats: bool) -> MergedFeature {
        let geoid = Geoid::normalize("36061000100").unwrap();
        let boundary = BoundaryFeature {
            geoid: geoid.clone(),
            name: "Census Tract 1".to_string(),
            county_fips: "061".to_string(),
            geometry: geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
                vec![-74.0, 40.7],
                vec![-73.99, 40.7],
                vec![-73.99, 40.71],
                vec![-74.0, 40.71],
                vec![-74.0, 40.7],
            ]])),
        };

        MergedFeature {
            boundary,
            statistics: with_stats
                .then(|| StatisticRecord::new(geoid, StatisticValues::default())),
        }
    }

    #[test]
    fn wraps_features_as_a_collection() {
        let collection = ApiTractCollection::new(vec![merged(true)], false);
        assert_eq!(collection.kind, "FeatureCollection");
        assert_eq!(collection.features[0].kind, "Feature");
        assert_eq!(collection.features[0].properties.geoid, "36061000100");
    }

    #[test]
    fn statless_features_serialize_with_null_metrics() {
        let collection = ApiTractCollection::new(vec![merged(false)], true);
        assert!(collection.synthetic);

        let json = serde_json::to_value(&collection).unwrap();
        let props = &json["features"][0]["properties"];
        assert_eq!(props["carFreePercent"], serde_json::Value::Null);
        assert_eq!(props["geoid"], "36061000100");
    }
}
