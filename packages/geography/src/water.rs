//! Water-tract detection.
//!
//! Census numbering reserves a handful of tract-code suffixes (.00 on the
//! 9900 series, .01, .98, .99) for open water. Those tracts have no
//! resident population and clutter a mobility visualization, so the
//! resolver drops them by default. The check is a coarse heuristic: the
//! suffix convention must coincide with a near-zero planar area, or the
//! tract name must literally say it is water.

use geojson::Geometry;
use mobility_map_geography_models::BoundaryFeature;

/// Tract-suffix fractions reserved for water tracts.
const WATER_SUFFIX_FRACTIONS: &[f64] = &[0.0, 0.01, 0.98, 0.99];

/// Planar area below which a suffix-matched tract counts as water, in
/// square degrees. Land tracts in NYC are comfortably above this.
const WATER_AREA_THRESHOLD: f64 = 0.000_01;

/// Name substrings that mark a tract as water regardless of its code.
const WATER_NAME_HINTS: &[&str] = &["water", "marine", "ocean"];

/// Returns whether a boundary feature represents open water rather than
/// land.
#[must_use]
pub fn is_water_tract(feature: &BoundaryFeature) -> bool {
    let name = feature.name.to_lowercase();
    if WATER_NAME_HINTS.iter().any(|hint| name.contains(hint)) {
        return true;
    }

    let geoid = feature.geoid.as_str();
    if geoid.len() < 11 {
        return false;
    }

    let Ok(suffix) = geoid[8..11].parse::<f64>() else {
        return false;
    };
    let fraction = suffix / 1000.0;

    let suffix_matches = WATER_SUFFIX_FRACTIONS
        .iter()
        .any(|expected| (fraction - expected).abs() < 1e-9);

    suffix_matches && planar_area(&feature.geometry) < WATER_AREA_THRESHOLD
}

/// Planar polygon area via the shoelace formula, summed over the outer
/// ring of each polygon. Holes are not subtracted; the classifier only
/// needs an "is this basically zero" signal.
#[must_use]
pub fn planar_area(geometry: &Geometry) -> f64 {
    match &geometry.value {
        geojson::Value::Polygon(rings) => rings.first().map_or(0.0, |r| ring_area(r)),
        geojson::Value::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| rings.first())
            .map(|r| ring_area(r))
            .sum(),
        _ => 0.0,
    }
}

fn ring_area(ring: &[Vec<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for window in ring.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        if a.len() >= 2 && b.len() >= 2 {
            sum += a[0] * b[1] - b[0] * a[1];
        }
    }

    // Close the ring explicitly in case the last point was dropped.
    let (first, last) = (&ring[0], &ring[ring.len() - 1]);
    if first != last && first.len() >= 2 && last.len() >= 2 {
        sum += last[0] * first[1] - first[0] * last[1];
    }

    sum.abs() / 2.0
}
