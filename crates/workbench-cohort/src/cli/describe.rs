//! Describe command implementation
//!
//! Lists the criteria of a stored definition one item per row, with the
//! same titles and names the editor shows.

use super::{output, read_criteria};
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::PathBuf;
use workbench_cohort_model::Role;
use workbench_cohort_search::display::{attribute_display, domain_to_title, name_display, type_display};
use workbench_cohort_search::{EditableGroup, EditableItem, SearchRequest, Selection, parse_cohort_definition};

/// Configuration for describe command
pub struct DescribeConfig {
    pub file: PathBuf,
    pub output_format: Option<String>,
    pub output_file: Option<PathBuf>,
}

/// Describe a criteria document
pub async fn describe(config: DescribeConfig) -> Result<()> {
    let source = read_criteria(&config.file).await?;
    let request = parse_cohort_definition(&source)
        .with_context(|| format!("Failed to parse {}", config.file.display()))?;

    let format = output::OutputFormat::resolve(config.output_format.as_deref(), output::OutputFormat::Table);
    output::print_rows(&describe_rows(&request), format, config.output_file.as_deref())
}

/// One row per item, includes before excludes, in editor order
pub fn describe_rows(request: &SearchRequest) -> Vec<Value> {
    Role::ALL
        .into_iter()
        .flat_map(|role| {
            request
                .groups(role)
                .iter()
                .flat_map(move |group| group.items.iter().map(move |item| item_row(role, group, item)))
        })
        .collect()
}

fn item_row(role: Role, group: &EditableGroup, item: &EditableItem) -> Value {
    json!({
        "role": role.as_str(),
        "group": group.name.as_deref().unwrap_or(&group.id),
        "temporal": temporal_summary(group, item),
        "item": item.name.as_deref().unwrap_or(&item.id),
        "domain": domain_to_title(&item.item_type),
        "criteria": item
            .search_parameters
            .iter()
            .map(criteria_label)
            .collect::<Vec<_>>()
            .join("; "),
        "modifiers": item
            .modifiers
            .iter()
            .map(|m| format!("{} {} {}", m.name, m.operator.label(), m.operands.join(", ")))
            .collect::<Vec<_>>()
            .join("; "),
    })
}

fn temporal_summary(group: &EditableGroup, item: &EditableItem) -> String {
    if !group.temporal {
        return String::new();
    }
    if item.temporal_group == 0 {
        return group.mention.label().to_string();
    }
    let time = group.time.label();
    if group.time.requires_value() {
        time.replacen('X', group.time_value.trim(), 1)
    } else {
        time.to_string()
    }
}

fn criteria_label(selection: &Selection) -> String {
    let parts = [
        type_display(selection).to_string(),
        name_display(selection),
        attribute_display(selection),
    ];
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
