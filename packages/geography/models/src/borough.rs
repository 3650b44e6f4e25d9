//! NYC borough codes and their county FIPS equivalents.
//!
//! Several NYC Open Data exports key tracts by a 1-5 borough code instead
//! of a county FIPS. This module provides the crosswalk both directions.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the five NYC boroughs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Borough {
    Manhattan,
    Bronx,
    Brooklyn,
    Queens,
    #[strum(serialize = "Staten Island")]
    #[serde(rename = "Staten Island")]
    StatenIsland,
}

impl Borough {
    /// All five boroughs in borough-code order.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Manhattan,
            Self::Bronx,
            Self::Brooklyn,
            Self::Queens,
            Self::StatenIsland,
        ]
    }

    /// Maps the NYC Open Data borough code (1-5) to a borough.
    #[must_use]
    pub const fn from_borough_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Manhattan),
            2 => Some(Self::Bronx),
            3 => Some(Self::Brooklyn),
            4 => Some(Self::Queens),
            5 => Some(Self::StatenIsland),
            _ => None,
        }
    }

    /// Maps a three-digit county FIPS to a borough.
    #[must_use]
    pub fn from_county_fips(fips: &str) -> Option<Self> {
        match fips {
            "061" => Some(Self::Manhattan),
            "005" => Some(Self::Bronx),
            "047" => Some(Self::Brooklyn),
            "081" => Some(Self::Queens),
            "085" => Some(Self::StatenIsland),
            _ => None,
        }
    }

    /// Three-digit county FIPS for this borough.
    #[must_use]
    pub const fn county_fips(self) -> &'static str {
        match self {
            Self::Manhattan => "061",
            Self::Bronx => "005",
            Self::Brooklyn => "047",
            Self::Queens => "081",
            Self::StatenIsland => "085",
        }
    }

    /// NYC Open Data borough code (1-5).
    #[must_use]
    pub const fn borough_code(self) -> u8 {
        match self {
            Self::Manhattan => 1,
            Self::Bronx => 2,
            Self::Brooklyn => 3,
            Self::Queens => 4,
            Self::StatenIsland => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borough_code_round_trips() {
        for borough in Borough::all() {
            assert_eq!(
                Borough::from_borough_code(borough.borough_code()),
                Some(borough)
            );
        }
    }

    #[test]
    fn county_fips_round_trips() {
        for borough in Borough::all() {
            assert_eq!(
                Borough::from_county_fips(borough.county_fips()),
                Some(borough)
            );
        }
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!(Borough::from_borough_code(0).is_none());
        assert!(Borough::from_borough_code(6).is_none());
        assert!(Borough::from_county_fips("999").is_none());
    }

    #[test]
    fn displays_staten_island_with_space() {
        assert_eq!(Borough::StatenIsland.to_string(), "Staten Island");
    }
}
