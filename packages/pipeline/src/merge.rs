//! Joining boundary features with statistic records.
//!
//! An exact join on the canonical GEOID: every boundary feature appears
//! in the output exactly once, with its statistics attached when a record
//! matches. No fuzzy matching, no dropped features.

use std::collections::HashMap;

use mobility_map_census_models::StatisticRecord;
use mobility_map_geography_models::{BoundaryFeature, Geoid};
use serde::{Deserialize, Serialize};

/// One tract as the dashboard consumes it: geometry plus optional
/// statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedFeature {
    /// Normalized boundary.
    pub boundary: BoundaryFeature,
    /// Matching statistics, absent when no record shares the GEOID.
    pub statistics: Option<StatisticRecord>,
}

impl MergedFeature {
    /// The join key.
    #[must_use]
    pub const fn geoid(&self) -> &Geoid {
        &self.boundary.geoid
    }

    /// Merges a detail fetch into this feature in place (lazy enrichment
    /// when a user inspects the tract).
    pub fn enrich(&mut self, record: StatisticRecord) {
        self.statistics = Some(record);
    }
}

/// Joins boundaries and statistics on the GEOID.
///
/// Duplicate statistic records for one GEOID should not occur, but the
/// merge tolerates them: last write wins. Boundary features without a
/// match keep geometry only.
#[must_use]
pub fn merge_features(
    boundaries: Vec<BoundaryFeature>,
    statistics: Vec<StatisticRecord>,
) -> Vec<MergedFeature> {
    let mut by_geoid: HashMap<Geoid, StatisticRecord> = HashMap::with_capacity(statistics.len());
    for record in statistics {
        by_geoid.insert(record.geoid.clone(), record);
    }

    boundaries
        .into_iter()
        .map(|boundary| {
            let statistics = by_geoid.get(&boundary.geoid).cloned();
            MergedFeature {
                boundary,
                statistics,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobility_map_census::metrics;
    use mobility_map_census_models::StatisticValues;

    fn boundary(geoid: &str) -> BoundaryFeature {
        let geoid = Geoid::normalize(geoid).unwrap();
        BoundaryFeature {
            name: geoid.tract_label(),
            county_fips: geoid.county().to_string(),
            geometry: geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
                vec![-74.0, 40.7],
                vec![-73.99, 40.7],
                vec![-73.99, 40.71],
                vec![-74.0, 40.71],
                vec![-74.0, 40.7],
            ]])),
            geoid,
        }
    }

    fn record(geoid: &str, values: StatisticValues) -> StatisticRecord {
        let mut record =
            StatisticRecord::new(Geoid::normalize(geoid).unwrap(), values);
        record.derived = metrics::compute(&record.values);
        record
    }

    #[test]
    fn output_matches_boundary_set_exactly() {
        let boundaries = vec![
            boundary("36061000100"),
            boundary("36047015300"),
            boundary("36081047100"),
        ];
        let statistics = vec![
            record("36061000100", StatisticValues::default()),
            // record for a tract with no boundary
            record("36005051600", StatisticValues::default()),
        ];

        let merged = merge_features(boundaries.clone(), statistics);

        assert_eq!(merged.len(), boundaries.len());
        let merged_ids: Vec<&str> = merged.iter().map(|f| f.geoid().as_str()).collect();
        let boundary_ids: Vec<&str> =
            boundaries.iter().map(|b| b.geoid.as_str()).collect();
        assert_eq!(merged_ids, boundary_ids);
    }

    #[test]
    fn unmatched_boundaries_keep_geometry_only() {
        let merged = merge_features(vec![boundary("36061000100")], vec![]);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].statistics.is_none());
    }

    #[test]
    fn duplicate_records_resolve_last_write_wins() {
        let first = StatisticValues {
            total_population: Some(1.0),
            ..StatisticValues::default()
        };
        let second = StatisticValues {
            total_population: Some(2.0),
            ..StatisticValues::default()
        };

        let merged = merge_features(
            vec![boundary("36061000100")],
            vec![
                record("36061000100", first),
                record("36061000100", second),
            ],
        );

        let stats = merged[0].statistics.as_ref().unwrap();
        assert_eq!(stats.values.total_population, Some(2.0));
    }

    #[test]
    fn merged_feature_carries_derived_metrics() {
        let values = StatisticValues {
            total_occupied_units: Some(1000.0),
            no_vehicle_owner: Some(100.0),
            no_vehicle_renter: Some(50.0),
            ..StatisticValues::default()
        };

        let merged = merge_features(
            vec![boundary("36061000100")],
            vec![record("36061000100", values)],
        );

        let stats = merged[0].statistics.as_ref().unwrap();
        assert_eq!(stats.derived.car_free_percent, Some("15.0".to_string()));
    }

    #[test]
    fn enrich_attaches_statistics_in_place() {
        let mut merged = merge_features(vec![boundary("36061000100")], vec![]).remove(0);
        assert!(merged.statistics.is_none());

        merged.enrich(record("36061000100", StatisticValues::default()));
        assert!(merged.statistics.is_some());
    }
}
