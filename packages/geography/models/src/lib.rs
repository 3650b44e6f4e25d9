#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census tract identifier and boundary types.
//!
//! These types represent the geographic half of the dashboard's data: the
//! canonical 11-character tract GEOID used as the join key everywhere, the
//! five NYC boroughs/counties, and the normalized boundary feature shape
//! that every upstream provider is mapped into.

pub mod borough;

use serde::{Deserialize, Serialize};

pub use borough::Borough;

/// County FIPS codes for the five NYC boroughs.
pub const NYC_COUNTY_FIPS: &[&str] = &["005", "047", "061", "081", "085"];

/// Default state FIPS used when a provider only supplies county/tract parts.
pub const DEFAULT_STATE_FIPS: &str = "36";

/// Geographic bounding box in `(lon, lat)` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Western edge.
    pub min_lon: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Eastern edge.
    pub max_lon: f64,
    /// Northern edge.
    pub max_lat: f64,
}

/// Bounding box covering the five boroughs with a margin.
pub const NYC_BBOX: BoundingBox = BoundingBox {
    min_lon: -74.5,
    min_lat: 40.4,
    max_lon: -73.5,
    max_lat: 41.0,
};

impl BoundingBox {
    /// Returns whether `(lon, lat)` falls inside this box (inclusive).
    #[must_use]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Clamps `lon` into the box's longitude range.
    #[must_use]
    pub fn clamp_lon(&self, lon: f64) -> f64 {
        lon.clamp(self.min_lon, self.max_lon)
    }

    /// Clamps `lat` into the box's latitude range.
    #[must_use]
    pub fn clamp_lat(&self, lat: f64) -> f64 {
        lat.clamp(self.min_lat, self.max_lat)
    }
}

/// Canonical 11-character census tract GEOID.
///
/// Layout: 2-char state FIPS + 3-char county FIPS + 6-char tract code
/// (e.g. `"36061000100"` = Census Tract 1, New York County, NY). Always
/// exactly 11 ASCII characters once constructed; providers that ship
/// shorter or longer identifiers are padded/truncated on the way in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geoid(String);

impl Geoid {
    /// Canonical GEOID length: state (2) + county (3) + tract (6).
    pub const LEN: usize = 11;

    /// Normalizes a raw identifier string into a canonical GEOID.
    ///
    /// Strips all whitespace, truncates identifiers longer than 11
    /// characters, and right-pads shorter ones with `'0'`. Returns `None`
    /// when nothing usable remains — the caller drops such records.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let mut cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

        if cleaned.is_empty() {
            return None;
        }

        if cleaned.len() > Self::LEN {
            cleaned.truncate(Self::LEN);
        } else {
            while cleaned.len() < Self::LEN {
                cleaned.push('0');
            }
        }

        Some(Self(cleaned))
    }

    /// Builds a GEOID from constituent parts under provider-specific field
    /// names (state defaults to New York when absent).
    ///
    /// County is left-zero-padded to 3 characters and tract to 6. Returns
    /// `None` when neither a county nor a tract hint exists — parts are
    /// never fabricated from nothing.
    #[must_use]
    pub fn from_parts(state: Option<&str>, county: Option<&str>, tract: Option<&str>) -> Option<Self> {
        let county = county.map(str::trim).unwrap_or_default();
        let tract = tract.map(str::trim).unwrap_or_default();

        if county.is_empty() && tract.is_empty() {
            return None;
        }

        let state = state
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_STATE_FIPS);

        let combined = format!("{state:.2}{county:0>3}{tract:0>6}");
        Self::normalize(&combined)
    }

    /// Full 11-character identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-digit state FIPS (chars 0-1).
    #[must_use]
    pub fn state(&self) -> &str {
        &self.0[..2]
    }

    /// Three-digit county FIPS (chars 2-4).
    #[must_use]
    pub fn county(&self) -> &str {
        &self.0[2..5]
    }

    /// Six-digit tract code (chars 5-10).
    #[must_use]
    pub fn tract(&self) -> &str {
        &self.0[5..]
    }

    /// Human-readable tract label, e.g. `"Tract 1"` for `000100` or
    /// `"Tract 1.98"` for `000198`. Used when a provider supplies no name.
    #[must_use]
    pub fn tract_label(&self) -> String {
        let code = self.tract();
        let whole = code[..4].trim_start_matches('0');
        let whole = if whole.is_empty() { "0" } else { whole };
        let suffix = &code[4..];

        if suffix == "00" {
            format!("Tract {whole}")
        } else {
            format!("Tract {whole}.{suffix}")
        }
    }
}

impl std::fmt::Display for Geoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One census tract's normalized boundary: geometry plus the identifying
/// properties every provider schema is mapped into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryFeature {
    /// Canonical tract GEOID.
    pub geoid: Geoid,
    /// Display name ("Census Tract 1" or a synthetic "Tract 1" label).
    pub name: String,
    /// Three-digit county FIPS, derived from the GEOID or a borough code.
    pub county_fips: String,
    /// Polygon or `MultiPolygon` geometry in `(lon, lat)` order.
    pub geometry: geojson::Geometry,
}

impl BoundaryFeature {
    /// Returns whether the geometry carries any coordinates at all.
    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        match &self.geometry.value {
            geojson::Value::Polygon(rings) => rings.iter().any(|r| !r.is_empty()),
            geojson::Value::MultiPolygon(polys) => polys
                .iter()
                .any(|p| p.iter().any(|r| !r.is_empty())),
            _ => false,
        }
    }
}
