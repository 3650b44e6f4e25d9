//! ACS API client and positional-table parser.
//!
//! The Census API returns a 2D array: first row column headers (variable
//! codes plus the geographic columns `state`/`county`/`tract`), then one
//! row per tract. Geographic cells are always kept as strings to preserve
//! leading zeros; value cells are parsed through the sentinel filter.

use futures::future::join_all;
use mobility_map_census_models::{StatisticRecord, StatisticValues, parse_acs_value};
use mobility_map_geography_models::Geoid;
use serde_json::Value;

use crate::CensusError;
use crate::metrics;
use crate::variables::registry;

/// Census Bureau API root.
const ACS_BASE_URL: &str = "https://api.census.gov/data";

/// Per-request timeout; a hung fetch is a failed county, not a stalled
/// load cycle.
const ACS_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// Client for the ACS 5-year estimates API.
///
/// An API key is optional — anonymous requests work, just with a lower
/// rate limit.
pub struct AcsClient {
    client: reqwest::Client,
    base_url: String,
    year: String,
    api_key: Option<String>,
}

impl AcsClient {
    /// Builds a client for one estimate vintage (e.g. `"2023"`).
    ///
    /// # Errors
    ///
    /// Returns [`CensusError`] if the HTTP client cannot be built.
    pub fn new(year: impl Into<String>, api_key: Option<String>) -> Result<Self, CensusError> {
        let client = reqwest::Client::builder().timeout(ACS_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: ACS_BASE_URL.to_string(),
            year: year.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Overrides the API root (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Estimate vintage this client queries.
    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }

    fn query_url(&self, geo_filter: &str) -> String {
        let codes = registry().all_codes().join(",");
        let mut url = format!(
            "{}/{}/acs/acs5?get={codes}&{geo_filter}",
            self.base_url, self.year
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        url
    }

    fn county_url(&self, county: &str) -> String {
        self.query_url(&format!("for=tract:*&in=state:36+county:{county}"))
    }

    fn tract_url(&self, geoid: &Geoid) -> String {
        self.query_url(&format!(
            "for=tract:{}&in=state:{}+county:{}",
            geoid.tract(),
            geoid.state(),
            geoid.county()
        ))
    }

    async fn fetch_table(&self, url: &str) -> Result<Vec<StatisticRecord>, CensusError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CensusError::Malformed {
                message: format!("ACS responded with HTTP {status}"),
            });
        }

        let rows: Vec<Vec<Value>> = resp.json().await?;
        Ok(parse_statistics_table(&rows))
    }

    /// Fetches every tract's statistics for one county.
    ///
    /// # Errors
    ///
    /// Returns [`CensusError`] if the request fails or the response is
    /// not the expected table shape.
    pub async fn fetch_county(&self, county: &str) -> Result<Vec<StatisticRecord>, CensusError> {
        self.fetch_table(&self.county_url(county)).await
    }

    /// Fetches statistics for all target counties concurrently.
    ///
    /// A county that fails is logged and skipped — partial coverage beats
    /// no data. The record order follows the county order for
    /// determinism.
    ///
    /// # Errors
    ///
    /// Returns [`CensusError::AllCountiesFailed`] only when every
    /// requested county fails.
    pub async fn fetch_statistics(
        &self,
        counties: &[String],
    ) -> Result<Vec<StatisticRecord>, CensusError> {
        if counties.is_empty() {
            return Ok(Vec::new());
        }

        let fetches = counties.iter().map(|county| self.fetch_county(county));
        let results = join_all(fetches).await;

        let mut records = Vec::new();
        let mut succeeded = 0usize;

        for (county, result) in counties.iter().zip(results) {
            match result {
                Ok(mut county_records) => {
                    log::info!(
                        "County {county}: fetched statistics for {} tracts",
                        county_records.len()
                    );
                    succeeded += 1;
                    records.append(&mut county_records);
                }
                Err(e) => {
                    log::error!("Failed to fetch statistics for county {county}: {e}");
                }
            }
        }

        if succeeded == 0 {
            return Err(CensusError::AllCountiesFailed);
        }

        Ok(records)
    }

    /// Fetches one tract's statistics, for lazy enrichment when a user
    /// inspects a tract.
    ///
    /// # Errors
    ///
    /// Returns [`CensusError::TractNotFound`] when the API has no row for
    /// the tract.
    pub async fn fetch_tract(&self, geoid: &Geoid) -> Result<StatisticRecord, CensusError> {
        let records = self.fetch_table(&self.tract_url(geoid)).await?;

        records
            .into_iter()
            .find(|r| &r.geoid == geoid)
            .ok_or_else(|| CensusError::TractNotFound {
                geoid: geoid.to_string(),
            })
    }
}

/// Reads a cell as a string; ACS emits strings, but numbers show up in
/// some vintages.
fn cell_str(cell: Option<&Value>) -> Option<String> {
    match cell? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses the positional ACS table into statistic records.
///
/// The header row maps variable codes to column indexes. Rows without
/// usable identifier material are dropped silently; a semantic field
/// whose components include a sentinel or missing cell comes out absent
/// rather than partially summed.
#[must_use]
pub fn parse_statistics_table(rows: &[Vec<Value>]) -> Vec<StatisticRecord> {
    let Some(header) = rows.first() else {
        return Vec::new();
    };

    let column = |name: &str| {
        header
            .iter()
            .position(|cell| cell.as_str().is_some_and(|s| s.eq_ignore_ascii_case(name)))
    };

    let (Some(state_col), Some(county_col), Some(tract_col)) =
        (column("state"), column("county"), column("tract"))
    else {
        log::warn!("ACS header row is missing geographic columns");
        return Vec::new();
    };

    let mut records = Vec::with_capacity(rows.len().saturating_sub(1));

    for row in &rows[1..] {
        let state = cell_str(row.get(state_col));
        let county = cell_str(row.get(county_col));
        let tract = cell_str(row.get(tract_col));

        let Some(geoid) =
            Geoid::from_parts(state.as_deref(), county.as_deref(), tract.as_deref())
        else {
            continue;
        };

        let mut values = StatisticValues::default();

        for (field, def) in registry().fields() {
            let mut sum = 0.0;
            let mut complete = true;

            for code in &def.codes {
                let component = column(code)
                    .and_then(|col| cell_str(row.get(col)))
                    .and_then(|raw| parse_acs_value(&raw));

                match component {
                    Some(v) => sum += v,
                    None => {
                        complete = false;
                        break;
                    }
                }
            }

            values.set(*field, complete.then_some(sum));
        }

        let derived = metrics::compute(&values);
        let mut record = StatisticRecord::new(geoid, values);
        record.derived = derived;
        records.push(record);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header() -> Vec<Value> {
        let mut cells: Vec<Value> = registry()
            .all_codes()
            .into_iter()
            .map(|c| json!(c))
            .collect();
        cells.extend([json!("state"), json!("county"), json!("tract")]);
        cells
    }

    fn row(fill: &str, state: &str, county: &str, tract: &str) -> Vec<Value> {
        let mut cells: Vec<Value> = registry()
            .all_codes()
            .iter()
            .map(|_| json!(fill))
            .collect();
        cells.extend([json!(state), json!(county), json!(tract)]);
        cells
    }

    #[test]
    fn parses_rows_into_keyed_records() {
        let rows = vec![header(), row("10", "36", "061", "000100")];
        let records = parse_statistics_table(&rows);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].geoid.as_str(), "36061000100");
        assert_eq!(records[0].values.total_population, Some(10.0));
        // under18Male sums four B01001 bins
        assert_eq!(records[0].values.under18_male, Some(40.0));
    }

    #[test]
    fn sentinel_cells_make_fields_absent() {
        let rows = vec![header(), row("-666666666", "36", "061", "000100")];
        let records = parse_statistics_table(&rows);

        assert_eq!(records[0].values.total_population, None);
        assert_eq!(records[0].values.under18_male, None);
        assert_eq!(records[0].derived.car_free_percent, None);
    }

    #[test]
    fn drops_rows_without_identifier_material() {
        let rows = vec![header(), row("10", "", "", "")];
        assert!(parse_statistics_table(&rows).is_empty());
    }

    #[test]
    fn preserves_leading_zeros_in_geographic_columns() {
        let rows = vec![header(), row("10", "36", "005", "051600")];
        let records = parse_statistics_table(&rows);
        assert_eq!(records[0].geoid.as_str(), "36005051600");
    }

    #[test]
    fn derives_metrics_during_parse() {
        let mut data = row("0", "36", "047", "015300");
        let codes = registry().all_codes();
        let set = |data: &mut Vec<Value>, code: &str, value: &str| {
            let idx = codes.iter().position(|c| *c == code).unwrap();
            data[idx] = json!(value);
        };

        set(&mut data, "B25044_001E", "1000");
        set(&mut data, "B25044_003E", "100");
        set(&mut data, "B25044_010E", "50");

        let rows = vec![header(), data];
        let records = parse_statistics_table(&rows);
        assert_eq!(
            records[0].derived.car_free_percent,
            Some("15.0".to_string())
        );
    }

    #[test]
    fn empty_table_parses_to_no_records() {
        assert!(parse_statistics_table(&[]).is_empty());
    }

    #[test]
    fn county_url_includes_codes_and_filter() {
        let client = AcsClient::new("2023", None).unwrap();
        let url = client.county_url("061");

        assert!(url.starts_with("https://api.census.gov/data/2023/acs/acs5?get="));
        assert!(url.contains("B25044_001E"));
        assert!(url.contains("for=tract:*&in=state:36+county:061"));
        assert!(!url.contains("&key="));
    }

    #[test]
    fn api_key_is_appended_when_present() {
        let client = AcsClient::new("2023", Some("secret".to_string())).unwrap();
        assert!(client.county_url("061").ends_with("&key=secret"));
    }

    #[test]
    fn blank_api_key_is_treated_as_anonymous() {
        let client = AcsClient::new("2023", Some("  ".to_string())).unwrap();
        assert!(!client.county_url("061").contains("&key="));
    }

    #[test]
    fn tract_url_targets_a_single_tract() {
        let client = AcsClient::new("2023", None).unwrap();
        let geoid = Geoid::normalize("36061000100").unwrap();
        assert!(
            client
                .tract_url(&geoid)
                .contains("for=tract:000100&in=state:36+county:061")
        );
    }
}
