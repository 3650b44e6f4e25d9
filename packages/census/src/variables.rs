//! Variable registry — semantic fields mapped to ACS variable codes.
//!
//! The mapping lives in `variables.toml`, baked into the binary at
//! compile time. Keeping the codes as plain data means swapping an ACS
//! vintage or adding a field never touches the parse or metric code.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use mobility_map_census_models::SemanticField;
use serde::Deserialize;

/// TOML config embedded at compile time.
const VARIABLES_TOML: &str = include_str!("../variables.toml");

/// One semantic field's configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableDef {
    /// Display name shown in the dashboard inspector.
    pub name: String,
    /// ACS variable codes summed into this field.
    pub codes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    fields: BTreeMap<String, VariableDef>,
}

/// Parsed registry: field definitions in a stable order.
#[derive(Debug)]
pub struct VariableRegistry {
    fields: Vec<(SemanticField, VariableDef)>,
}

impl VariableRegistry {
    fn load() -> Self {
        let file: RegistryFile =
            toml::from_str(VARIABLES_TOML).expect("variables.toml must parse");

        let fields = file
            .fields
            .into_iter()
            .map(|(key, def)| {
                let field: SemanticField = key
                    .parse()
                    .unwrap_or_else(|_| panic!("unknown semantic field in variables.toml: {key}"));
                (field, def)
            })
            .collect();

        Self { fields }
    }

    /// All configured fields with their definitions.
    #[must_use]
    pub fn fields(&self) -> &[(SemanticField, VariableDef)] {
        &self.fields
    }

    /// Every distinct variable code, in registry order. This is the `get=`
    /// list sent to the ACS API.
    #[must_use]
    pub fn all_codes(&self) -> Vec<&str> {
        let mut codes = Vec::new();
        for (_, def) in &self.fields {
            for code in &def.codes {
                if !codes.contains(&code.as_str()) {
                    codes.push(code.as_str());
                }
            }
        }
        codes
    }
}

/// Shared parsed registry.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (a compile-time guarantee
/// since the config is baked into the binary).
pub fn registry() -> &'static VariableRegistry {
    static REGISTRY: OnceLock<VariableRegistry> = OnceLock::new();
    REGISTRY.get_or_init(VariableRegistry::load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_semantic_field_is_configured() {
        let configured: Vec<SemanticField> =
            registry().fields().iter().map(|(f, _)| *f).collect();
        for field in SemanticField::iter() {
            assert!(configured.contains(&field), "missing {field}");
        }
    }

    #[test]
    fn codes_are_distinct() {
        let codes = registry().all_codes();
        let mut deduped = codes.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(codes.len(), deduped.len());
    }

    #[test]
    fn single_code_fields_stay_single() {
        let (_, def) = registry()
            .fields()
            .iter()
            .find(|(f, _)| *f == SemanticField::TotalPopulation)
            .unwrap();
        assert_eq!(def.codes, vec!["B01003_001E"]);
    }
}
