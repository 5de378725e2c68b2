//! Ids command implementation

use super::{output, read_criteria};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;
use workbench_cohort_search::{IdRegistry, parse_cohort_definition};

/// Configuration for ids command
pub struct IdsConfig {
    pub count: usize,
    pub prefix: Option<String>,
    /// Criteria whose ids must not be handed out again
    pub reserve_from: Option<PathBuf>,
    pub output_format: Option<String>,
    pub output_file: Option<PathBuf>,
}

/// Print fresh element ids
pub async fn ids(config: IdsConfig) -> Result<()> {
    let mut registry = IdRegistry::new();
    if let Some(path) = &config.reserve_from {
        let source = read_criteria(path).await?;
        let request = parse_cohort_definition(&source)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        registry.extend(request.ids());
    }

    let ids = generate_ids(&mut registry, config.count, config.prefix.as_deref());
    let content = match config.output_format.as_deref() {
        Some(format) if format.eq_ignore_ascii_case("json") => {
            output::format_json(&Value::from(ids), false)?
        }
        Some(format) if format.eq_ignore_ascii_case("pretty") => {
            output::format_json(&Value::from(ids), true)?
        }
        _ => ids.join("\n"),
    };
    output::write_output(&content, config.output_file.as_deref())
}

/// Generate `count` ids not yet held by the registry
pub fn generate_ids(registry: &mut IdRegistry, count: usize, prefix: Option<&str>) -> Vec<String> {
    (0..count).map(|_| registry.generate_id(prefix)).collect()
}
