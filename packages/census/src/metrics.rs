//! Derived-metric registry.
//!
//! Each metric is a pure function over the sentinel-filtered raw values;
//! the registry maps the wire-facing metric name to its function. A zero
//! denominator or any absent component yields an absent metric, never a
//! zero or an infinity.

use mobility_map_census_models::{DerivedMetrics, StatisticValues};

/// A derived metric: a pure function from raw values to a formatted
/// percentage string.
pub type MetricFn = fn(&StatisticValues) -> Option<String>;

/// Metric name (as exposed on the API) to computation.
pub const METRICS: &[(&str, MetricFn)] = &[
    ("carFreePercent", car_free_percent),
    ("transitScore", transit_score),
    ("vulnerablePercent", vulnerable_percent),
];

/// Computes every registered metric for one record's values.
#[must_use]
pub fn compute(values: &StatisticValues) -> DerivedMetrics {
    DerivedMetrics {
        car_free_percent: car_free_percent(values),
        transit_score: transit_score(values),
        vulnerable_percent: vulnerable_percent(values),
    }
}

/// Households without a vehicle as a percent of occupied units, one
/// decimal place.
#[must_use]
pub fn car_free_percent(values: &StatisticValues) -> Option<String> {
    let owner = values.no_vehicle_owner?;
    let renter = values.no_vehicle_renter?;
    let units = values.total_occupied_units?;

    ratio_percent(owner + renter, units).map(|pct| format!("{pct:.1}"))
}

/// Public-transit commuters as a percent of all workers, whole number.
#[must_use]
pub fn transit_score(values: &StatisticValues) -> Option<String> {
    let transit = values.transit_commuters?;
    let workers = values.workers_total?;

    ratio_percent(transit, workers).map(|pct| format!("{pct:.0}"))
}

/// Under-18 + 65-and-over + disabled population as a percent of total
/// population, one decimal place. Absent unless every component is
/// present — a partial sum would silently undercount.
#[must_use]
pub fn vulnerable_percent(values: &StatisticValues) -> Option<String> {
    let under18 = values.under18_male? + values.under18_female?;
    let seniors = values.seniors_male? + values.seniors_female?;
    let disabled = values.disabled?;
    let population = values.total_population?;

    ratio_percent(under18 + seniors + disabled, population).map(|pct| format!("{pct:.1}"))
}

fn ratio_percent(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator * 100.0)
}
