#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! ACS statistic record types.
//!
//! Raw variable values are carried as typed optional fields rather than
//! an open property map, so "suppressed" and "zero" stay distinguishable
//! at the type level. Census jam values (the −666666666 family) are
//! converted to `None` at parse time and never reach arithmetic.

use mobility_map_geography_models::Geoid;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Any value at or below this is a Census jam value: the Bureau encodes
/// "suppressed / not available" as nine-digit negative codes such as
/// −666666666 and −999999999.
pub const SENTINEL_THRESHOLD: f64 = -111_111_111.0;

/// Returns whether a raw value is a Census sentinel ("jam value").
#[must_use]
pub fn is_sentinel(value: f64) -> bool {
    value <= SENTINEL_THRESHOLD
}

/// Parses a raw ACS cell into a usable number.
///
/// Empty cells, non-numeric cells, and sentinel codes all come back as
/// `None` — absent, never zero.
#[must_use]
pub fn parse_acs_value(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if is_sentinel(value) { None } else { Some(value) }
}

/// Semantic statistic fields, named independently of the ACS variable
/// codes that feed them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum SemanticField {
    TotalPopulation,
    MedianHouseholdIncome,
    TotalOccupiedUnits,
    NoVehicleOwner,
    NoVehicleRenter,
    WorkersTotal,
    TransitCommuters,
    Under18Male,
    Under18Female,
    SeniorsMale,
    SeniorsFemale,
    Disabled,
}

/// Raw (sentinel-filtered) values for one tract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticValues {
    pub total_population: Option<f64>,
    pub median_household_income: Option<f64>,
    pub total_occupied_units: Option<f64>,
    pub no_vehicle_owner: Option<f64>,
    pub no_vehicle_renter: Option<f64>,
    pub workers_total: Option<f64>,
    pub transit_commuters: Option<f64>,
    pub under18_male: Option<f64>,
    pub under18_female: Option<f64>,
    pub seniors_male: Option<f64>,
    pub seniors_female: Option<f64>,
    pub disabled: Option<f64>,
}

impl StatisticValues {
    /// Writes a field by semantic name.
    pub fn set(&mut self, field: SemanticField, value: Option<f64>) {
        match field {
            SemanticField::TotalPopulation => self.total_population = value,
            SemanticField::MedianHouseholdIncome => self.median_household_income = value,
            SemanticField::TotalOccupiedUnits => self.total_occupied_units = value,
            SemanticField::NoVehicleOwner => self.no_vehicle_owner = value,
            SemanticField::NoVehicleRenter => self.no_vehicle_renter = value,
            SemanticField::WorkersTotal => self.workers_total = value,
            SemanticField::TransitCommuters => self.transit_commuters = value,
            SemanticField::Under18Male => self.under18_male = value,
            SemanticField::Under18Female => self.under18_female = value,
            SemanticField::SeniorsMale => self.seniors_male = value,
            SemanticField::SeniorsFemale => self.seniors_female = value,
            SemanticField::Disabled => self.disabled = value,
        }
    }

    /// Reads a field by semantic name.
    #[must_use]
    pub const fn get(&self, field: SemanticField) -> Option<f64> {
        match field {
            SemanticField::TotalPopulation => self.total_population,
            SemanticField::MedianHouseholdIncome => self.median_household_income,
            SemanticField::TotalOccupiedUnits => self.total_occupied_units,
            SemanticField::NoVehicleOwner => self.no_vehicle_owner,
            SemanticField::NoVehicleRenter => self.no_vehicle_renter,
            SemanticField::WorkersTotal => self.workers_total,
            SemanticField::TransitCommuters => self.transit_commuters,
            SemanticField::Under18Male => self.under18_male,
            SemanticField::Under18Female => self.under18_female,
            SemanticField::SeniorsMale => self.seniors_male,
            SemanticField::SeniorsFemale => self.seniors_female,
            SemanticField::Disabled => self.disabled,
        }
    }
}

/// Ratio metrics computed from the raw values.
///
/// Stored as strings at the stated precision (one decimal for
/// percentages, whole number for the transit score); `None` means a
/// required component was absent or a denominator was zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Households without a vehicle, as a percent of occupied units.
    pub car_free_percent: Option<String>,
    /// Public-transit commuters, as a percent of all workers.
    pub transit_score: Option<String>,
    /// Under-18 + 65-and-over + disabled population, as a percent of
    /// total population.
    pub vulnerable_percent: Option<String>,
}

/// One tract's statistics: raw sentinel-filtered values plus the derived
/// ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticRecord {
    /// Canonical tract GEOID, the join key against boundary features.
    pub geoid: Geoid,
    /// Raw variable values.
    pub values: StatisticValues,
    /// Computed ratio metrics.
    pub derived: DerivedMetrics,
}

impl StatisticRecord {
    /// Creates a record with no derived metrics yet.
    #[must_use]
    pub fn new(geoid: Geoid, values: StatisticValues) -> Self {
        Self {
            geoid,
            values,
            derived: DerivedMetrics::default(),
        }
    }
}
