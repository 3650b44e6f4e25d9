//! Per-provider schema adapters.
//!
//! Every boundary provider ships the same conceptual record under a
//! different property vocabulary: NYC Open Data uses lowercase fields and
//! borough codes, `TIGERweb` uses uppercase FIPS fields, and the
//! cartographic file mirror suffixes everything with the vintage year.
//! Each adapter maps its provider's raw `GeoJSON` feature into the one
//! canonical [`BoundaryFeature`] shape; the resolver iterates adapters in
//! priority order instead of branching on field names inline.

use mobility_map_geography_models::{Borough, BoundaryFeature, Geoid};
use serde_json::Value;

/// Maps one provider's raw feature into the canonical boundary shape.
pub trait BoundaryAdapter: Send + Sync {
    /// Unique identifier for this provider schema (e.g. `"tigerweb"`).
    fn id(&self) -> &'static str;

    /// Normalizes a raw `GeoJSON` feature.
    ///
    /// Returns `None` when the feature lacks usable identifier material
    /// or geometry; such records are dropped, never errors.
    fn normalize_feature(&self, raw: &Value) -> Option<BoundaryFeature>;
}

/// Reads a string-or-number property under the first matching key.
fn prop_str(props: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match props.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// Parses the feature's geometry object. Absent or null geometry yields
/// `None` and drops the feature.
fn parse_geometry(raw: &Value) -> Option<geojson::Geometry> {
    let geometry = raw.get("geometry")?;
    if geometry.is_null() {
        return None;
    }
    serde_json::from_value(geometry.clone()).ok()
}

fn build_feature(
    geoid: Geoid,
    name: Option<String>,
    county_fips: Option<String>,
    geometry: geojson::Geometry,
) -> BoundaryFeature {
    let name = name.unwrap_or_else(|| geoid.tract_label());
    let county_fips = county_fips.unwrap_or_else(|| geoid.county().to_string());
    BoundaryFeature {
        geoid,
        name,
        county_fips,
        geometry,
    }
}

/// NYC Open Data (Socrata `GeoJSON` export of the 2020 tracts).
///
/// Identifier arrives as `geoid` or must be synthesized from `ct2020`
/// plus a 1-5 `boro_code`; names come from `ntaname`/`ctlabel`.
pub struct NycOpenDataAdapter;

impl BoundaryAdapter for NycOpenDataAdapter {
    fn id(&self) -> &'static str {
        "nyc_open_data"
    }

    fn normalize_feature(&self, raw: &Value) -> Option<BoundaryFeature> {
        let props = raw.get("properties")?;
        let geometry = parse_geometry(raw)?;

        let borough = prop_str(props, &["boro_code", "borocode"])
            .and_then(|code| code.parse::<u8>().ok())
            .and_then(Borough::from_borough_code);

        let geoid = prop_str(props, &["geoid", "GEOID"])
            .and_then(|id| Geoid::normalize(&id))
            .or_else(|| {
                let tract = prop_str(props, &["ct2020", "ctlabel"])?;
                let county = borough.map(Borough::county_fips);
                Geoid::from_parts(None, county, Some(&tract))
            })?;

        let name = prop_str(props, &["ntaname", "ctlabel"]);
        let county_fips = borough.map(|b| b.county_fips().to_string());

        Some(build_feature(geoid, name, county_fips, geometry))
    }
}

/// Census Bureau `TIGERweb` ArcGIS REST schema (uppercase FIPS fields).
pub struct TigerWebAdapter;

impl BoundaryAdapter for TigerWebAdapter {
    fn id(&self) -> &'static str {
        "tigerweb"
    }

    fn normalize_feature(&self, raw: &Value) -> Option<BoundaryFeature> {
        // f=json responses carry `attributes` instead of `properties`.
        let props = raw.get("properties").or_else(|| raw.get("attributes"))?;
        let geometry = parse_geometry(raw)?;

        let geoid = prop_str(props, &["GEOID", "geoid"])
            .and_then(|id| Geoid::normalize(&id))
            .or_else(|| {
                let state = prop_str(props, &["STATE"]);
                let county = prop_str(props, &["COUNTY", "COUNTY_FIPS"]);
                let tract = prop_str(props, &["TRACT", "TRACTCE"]);
                Geoid::from_parts(state.as_deref(), county.as_deref(), tract.as_deref())
            })?;

        let name = prop_str(props, &["NAME", "BASENAME"]);
        let county_fips = prop_str(props, &["COUNTY", "COUNTY_FIPS"]);

        Some(build_feature(geoid, name, county_fips, geometry))
    }
}

/// Cartographic boundary file mirror (2020 vintage, `*20`-suffixed
/// fields).
pub struct CartographicAdapter;

impl BoundaryAdapter for CartographicAdapter {
    fn id(&self) -> &'static str {
        "cartographic"
    }

    fn normalize_feature(&self, raw: &Value) -> Option<BoundaryFeature> {
        let props = raw.get("properties")?;
        let geometry = parse_geometry(raw)?;

        let geoid = prop_str(props, &["GEOID20", "GEOID"])
            .and_then(|id| Geoid::normalize(&id))
            .or_else(|| {
                let state = prop_str(props, &["STATEFP20", "STATEFP"]);
                let county = prop_str(props, &["COUNTYFP20", "COUNTYFP"]);
                let tract = prop_str(props, &["TRACTCE20", "TRACTCE"]);
                Geoid::from_parts(state.as_deref(), county.as_deref(), tract.as_deref())
            })?;

        let name = prop_str(props, &["NAMELSAD20", "NAMELSAD", "NAME20"]);
        let county_fips = prop_str(props, &["COUNTYFP20", "COUNTYFP"]);

        Some(build_feature(geoid, name, county_fips, geometry))
    }
}
