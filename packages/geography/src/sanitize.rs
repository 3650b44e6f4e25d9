//! Coordinate sanitization for provider geometry.
//!
//! Some upstream exports emit `[lat, lon]` instead of `[lon, lat]`, and a
//! handful of tracts carry stray vertices far outside the city. Both are
//! repaired in place: swapped axes are detected and flipped, then every
//! vertex is clamped into the configured bounding box. Clamping distorts a
//! far-outside polygon rather than discarding it, which is the right trade
//! for an overview map.

use geojson::Geometry;
use mobility_map_geography_models::BoundingBox;

/// Repairs a single `(lon, lat)` pair.
///
/// The swap heuristic is tuned to the observed malformed-source pattern
/// for this geography, not a general geodetic rule: a latitude-plausible
/// value in the longitude slot combined with a NYC-longitude-like value
/// (`< -70`) in the latitude slot means the axes arrived flipped. Pairs
/// with a magnitude outside the valid lon/lat ranges are also flipped.
#[must_use]
pub fn sanitize_pair(lon: f64, lat: f64, bbox: &BoundingBox) -> (f64, f64) {
    let swapped_axes = (lat < -70.0 && (-10.0..=90.0).contains(&lon))
        || lon.abs() > 180.0
        || lat.abs() > 90.0;

    let (lon, lat) = if swapped_axes { (lat, lon) } else { (lon, lat) };

    (bbox.clamp_lon(lon), bbox.clamp_lat(lat))
}

/// Repairs every coordinate of a geometry in place, preserving its
/// nesting shape. Geometry types without polygon coordinates (and empty
/// geometry) pass through unchanged; a later stage filters those out.
pub fn sanitize_geometry(geometry: &mut Geometry, bbox: &BoundingBox) {
    match &mut geometry.value {
        geojson::Value::Polygon(rings) => sanitize_rings(rings, bbox),
        geojson::Value::MultiPolygon(polygons) => {
            for rings in polygons {
                sanitize_rings(rings, bbox);
            }
        }
        _ => {}
    }
}

fn sanitize_rings(rings: &mut [Vec<Vec<f64>>], bbox: &BoundingBox) {
    for ring in rings {
        for position in ring {
            if position.len() >= 2 {
                let (lon, lat) = sanitize_pair(position[0], position[1], bbox);
                position[0] = lon;
                position[1] = lat;
            }
        }
    }
}
