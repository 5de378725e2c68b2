//! Criteria serialization
//!
//! This module reads and writes the JSON stored in a cohort's `criteria`
//! field and sent to the participant count endpoint.

use std::io::{Read, Write};

use log::warn;
use serde::Deserialize;
use serde_json::Value;
use workbench_cohort_diagnostics::CohortError;

use crate::definition::{CohortDefinition, SearchGroup};

/// Errors that can occur during serialization
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SerializeError> for CohortError {
    fn from(error: SerializeError) -> Self {
        match error {
            SerializeError::Json(e) => CohortError::from_json(&e),
            SerializeError::Io(e) => CohortError::from(e),
        }
    }
}

/// Trait for criteria serializers
pub trait CriteriaSerializer {
    /// Serialize a definition to a string
    fn serialize(&self, definition: &CohortDefinition) -> Result<String, SerializeError>;

    /// Serialize a definition to a writer
    fn serialize_to_writer<W: Write>(
        &self,
        definition: &CohortDefinition,
        writer: W,
    ) -> Result<(), SerializeError>;

    /// Deserialize a definition from a string
    fn deserialize(&self, input: &str) -> Result<CohortDefinition, SerializeError>;

    /// Deserialize a definition from a reader
    fn deserialize_from_reader<R: Read>(&self, reader: R) -> Result<CohortDefinition, SerializeError>;
}

/// JSON serializer for cohort criteria.
///
/// Always writes `dataFilters`. Reads both `dataFilters` and the legacy
/// lower-case `datafilters` key found in older stored criteria.
#[derive(Debug, Default, Clone)]
pub struct JsonSerializer {
    /// Whether to produce pretty-printed output
    pub pretty: bool,
}

impl JsonSerializer {
    /// Create a new JSON serializer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new JSON serializer with pretty-printing enabled
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// Stored criteria as found in the wild, with both filter key casings
#[derive(Deserialize)]
struct StoredDefinition {
    #[serde(default)]
    includes: Vec<SearchGroup>,
    #[serde(default)]
    excludes: Vec<SearchGroup>,
    #[serde(default, rename = "dataFilters")]
    data_filters: Option<Vec<Value>>,
    #[serde(default, rename = "datafilters")]
    legacy_data_filters: Option<Vec<Value>>,
}

impl From<StoredDefinition> for CohortDefinition {
    fn from(stored: StoredDefinition) -> Self {
        let data_filters = resolve_data_filters(stored.data_filters, stored.legacy_data_filters);
        Self {
            includes: stored.includes,
            excludes: stored.excludes,
            data_filters,
        }
    }
}

/// Pick the data filters from whichever key actually carries them.
fn resolve_data_filters(canonical: Option<Vec<Value>>, legacy: Option<Vec<Value>>) -> Vec<Value> {
    let canonical = canonical.unwrap_or_default();
    let legacy = legacy.unwrap_or_default();

    match (canonical.is_empty(), legacy.is_empty()) {
        (_, true) => canonical,
        (true, false) => {
            warn!(
                "criteria stores {} data filter(s) under the legacy key `datafilters`; \
                 they will be written back as `dataFilters`",
                legacy.len()
            );
            legacy
        }
        (false, false) => {
            warn!(
                "criteria carries data filters under both `dataFilters` and `datafilters`; \
                 ignoring {} legacy filter(s)",
                legacy.len()
            );
            canonical
        }
    }
}

impl CriteriaSerializer for JsonSerializer {
    fn serialize(&self, definition: &CohortDefinition) -> Result<String, SerializeError> {
        let result = if self.pretty {
            serde_json::to_string_pretty(definition)?
        } else {
            serde_json::to_string(definition)?
        };
        Ok(result)
    }

    fn serialize_to_writer<W: Write>(
        &self,
        definition: &CohortDefinition,
        mut writer: W,
    ) -> Result<(), SerializeError> {
        let json = self.serialize(definition)?;
        writer.write_all(json.as_bytes())?;
        Ok(())
    }

    fn deserialize(&self, input: &str) -> Result<CohortDefinition, SerializeError> {
        let stored: StoredDefinition = serde_json::from_str(input)?;
        Ok(stored.into())
    }

    fn deserialize_from_reader<R: Read>(&self, mut reader: R) -> Result<CohortDefinition, SerializeError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        self.deserialize(&content)
    }
}
