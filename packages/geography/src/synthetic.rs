//! Synthetic grid geometry for when no boundary provider is reachable.
//!
//! The dashboard can still render something meaningful from statistics
//! alone: each county's tracts are laid out as small squares in a
//! deterministic grid inside that county's corner of the bounding box.
//! Purely a visualization-continuity fallback; the squares carry the real
//! GEOIDs so every statistic still joins.

use geojson::Geometry;
use mobility_map_geography_models::{BoundaryFeature, BoundingBox, Geoid, NYC_COUNTY_FIPS};

/// Side length of one synthetic tract square, in degrees.
const CELL_SIZE: f64 = 0.004;

/// Gap between adjacent squares, in degrees.
const CELL_GAP: f64 = 0.001;

/// Builds square boundary features for the given tract identifiers.
///
/// Tracts are grouped by county (county order follows
/// [`NYC_COUNTY_FIPS`], unknown counties after that) and sorted within
/// each county, so the layout is stable across load cycles.
#[must_use]
pub fn synthetic_boundaries(geoids: &[Geoid], bbox: &BoundingBox) -> Vec<BoundaryFeature> {
    let mut sorted: Vec<&Geoid> = geoids.iter().collect();
    sorted.sort();
    sorted.dedup();

    let mut counties: Vec<&str> = NYC_COUNTY_FIPS.to_vec();
    for geoid in &sorted {
        if !counties.contains(&geoid.county()) {
            counties.push(geoid.county());
        }
    }

    let mut features = Vec::with_capacity(sorted.len());

    for (county_index, county) in counties.iter().enumerate() {
        let members: Vec<&Geoid> = sorted
            .iter()
            .filter(|g| g.county() == *county)
            .copied()
            .collect();
        if members.is_empty() {
            continue;
        }

        let (origin_lon, origin_lat) = county_origin(county_index, bbox);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let columns = (members.len() as f64).sqrt().ceil() as usize;
        let columns = columns.max(1);

        for (i, geoid) in members.into_iter().enumerate() {
            let col = i % columns;
            let row = i / columns;

            #[allow(clippy::cast_precision_loss)]
            let lon = origin_lon + col as f64 * (CELL_SIZE + CELL_GAP);
            #[allow(clippy::cast_precision_loss)]
            let lat = origin_lat + row as f64 * (CELL_SIZE + CELL_GAP);

            features.push(BoundaryFeature {
                geoid: geoid.clone(),
                name: geoid.tract_label(),
                county_fips: geoid.county().to_string(),
                geometry: square(lon, lat),
            });
        }
    }

    features
}

/// Anchor corner for a county's grid: counties are spread across a 3x2
/// arrangement of the bounding box.
fn county_origin(county_index: usize, bbox: &BoundingBox) -> (f64, f64) {
    let width = bbox.max_lon - bbox.min_lon;
    let height = bbox.max_lat - bbox.min_lat;

    let col = county_index % 3;
    let row = (county_index / 3) % 2;

    #[allow(clippy::cast_precision_loss)]
    let lon = bbox.min_lon + col as f64 * (width / 3.0) + 0.01;
    #[allow(clippy::cast_precision_loss)]
    let lat = bbox.min_lat + row as f64 * (height / 2.0) + 0.01;

    (lon, lat)
}

fn square(lon: f64, lat: f64) -> Geometry {
    Geometry::new(geojson::Value::Polygon(vec![vec![
        vec![lon, lat],
        vec![lon + CELL_SIZE, lat],
        vec![lon + CELL_SIZE, lat + CELL_SIZE],
        vec![lon, lat + CELL_SIZE],
        vec![lon, lat],
    ]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobility_map_geography_models::NYC_BBOX;

    fn geoids(ids: &[&str]) -> Vec<Geoid> {
        ids.iter().map(|id| Geoid::normalize(id).unwrap()).collect()
    }

    #[test]
    fn produces_one_feature_per_geoid() {
        let ids = geoids(&["36061000100", "36061000200", "36047015300"]);
        let features = synthetic_boundaries(&ids, &NYC_BBOX);
        assert_eq!(features.len(), 3);
    }

    #[test]
    fn layout_is_deterministic_regardless_of_input_order() {
        let forward = geoids(&["36061000100", "36061000200", "36047015300"]);
        let reversed = geoids(&["36047015300", "36061000200", "36061000100"]);

        let a = synthetic_boundaries(&forward, &NYC_BBOX);
        let b = synthetic_boundaries(&reversed, &NYC_BBOX);
        assert_eq!(a, b);
    }

    #[test]
    fn squares_are_closed_rings_inside_the_box() {
        let ids = geoids(&["36081047100"]);
        let features = synthetic_boundaries(&ids, &NYC_BBOX);

        let geojson::Value::Polygon(rings) = &features[0].geometry.value else {
            panic!("expected polygon");
        };
        let ring = &rings[0];
        assert_eq!(ring.first(), ring.last());
        for position in ring {
            assert!(NYC_BBOX.contains(position[0], position[1]));
        }
    }

    #[test]
    fn carries_real_geoids_for_joining() {
        let ids = geoids(&["36005051600"]);
        let features = synthetic_boundaries(&ids, &NYC_BBOX);
        assert_eq!(features[0].geoid.as_str(), "36005051600");
        assert_eq!(features[0].county_fips, "005");
    }
}
