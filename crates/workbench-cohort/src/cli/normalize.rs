//! Normalize command implementation
//!
//! Reads stored criteria, folds them through the editor tree and writes the
//! definition the editor would save: legacy `datafilters` become
//! `dataFilters`, HTML is stripped from names, and empty groups are dropped.

use super::{output, read_criteria};
use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use workbench_cohort_diagnostics::CohortError;
use workbench_cohort_model::serialize::{CriteriaSerializer, JsonSerializer};
use workbench_cohort_search::{map_request, parse_cohort_definition};

/// Configuration for normalize command
pub struct NormalizeConfig {
    pub file: PathBuf,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

/// Normalize a criteria document
pub async fn normalize(config: NormalizeConfig) -> Result<()> {
    let source = read_criteria(&config.file).await?;
    let normalized = normalize_criteria(&source, config.pretty)
        .with_context(|| format!("Failed to normalize {}", config.file.display()))?;
    info!("normalized {}", config.file.display());
    output::write_output(&normalized, config.output_file.as_deref())
}

/// Criteria JSON as the editor would save it
pub fn normalize_criteria(source: &str, pretty: bool) -> Result<String, CohortError> {
    let request = parse_cohort_definition(source)?;
    let serializer = if pretty {
        JsonSerializer::pretty()
    } else {
        JsonSerializer::new()
    };
    Ok(serializer.serialize(&map_request(&request))?)
}
