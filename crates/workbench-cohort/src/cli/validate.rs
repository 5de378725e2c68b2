//! Validate command implementation

use super::{output, read_criteria};
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use workbench_cohort_diagnostics::{
    CB0003, CB0004, CB0202, CB0401, CohortError, Diagnostic, ErrorCode, Severity,
};
use workbench_cohort_model::serialize::{CriteriaSerializer, JsonSerializer};
use workbench_cohort_model::{
    AttrName, CohortDefinition, CriteriaSubType, CriteriaType, Domain, ModifierType, Role,
};
use workbench_cohort_search::inflate_definition;

/// Configuration for validate command
pub struct ValidateConfig {
    pub files: Vec<PathBuf>,
    pub strict: bool,
    pub verbose: bool,
}

/// Validation result for a single file
struct ValidationResult {
    file: PathBuf,
    source: String,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }
}

/// Validate criteria files
pub async fn validate(config: ValidateConfig) -> Result<()> {
    if config.files.is_empty() {
        anyhow::bail!("No files specified for validation");
    }

    let mut all_results = Vec::new();
    for file in &config.files {
        all_results.push(validate_file(file, config.verbose).await);
    }

    let total_errors: usize = all_results.iter().map(|r| r.count(Severity::Error)).sum();
    let total_warnings: usize = all_results.iter().map(|r| r.count(Severity::Warning)).sum();

    for result in &all_results {
        print_validation_result(result);
    }

    println!();
    if total_errors == 0 && total_warnings == 0 {
        println!(
            "{}",
            output::format_success(&format!(
                "All {} file(s) validated successfully",
                config.files.len()
            ))
        );
        return Ok(());
    }

    let mut summary = Vec::new();
    if total_errors > 0 {
        summary.push(format!("{} error(s)", total_errors).red().to_string());
    }
    if total_warnings > 0 {
        summary.push(format!("{} warning(s)", total_warnings).yellow().to_string());
    }
    eprintln!("{} {}", "Found".bold(), summary.join(", "));

    if total_errors > 0 {
        anyhow::bail!("Validation failed");
    }
    if config.strict {
        anyhow::bail!("Validation failed (strict mode: treating warnings as errors)");
    }
    Ok(())
}

/// Validate a single file
async fn validate_file(file: &PathBuf, verbose: bool) -> ValidationResult {
    if verbose {
        eprintln!("Validating: {}", file.display());
    }

    match read_criteria(file).await {
        Ok(source) => {
            let diagnostics = check_criteria(&source);
            ValidationResult {
                file: file.clone(),
                source,
                diagnostics,
            }
        }
        Err(e) => ValidationResult {
            file: file.clone(),
            source: String::new(),
            diagnostics: vec![Diagnostic::error(CB0401, format!("{:#}", e))],
        },
    }
}

/// Check criteria JSON and collect diagnostics.
///
/// A document that cannot be read yields a single error. A readable one is
/// checked for values this build does not know, groups without items and
/// temporal groups that cannot be saved.
pub fn check_criteria(source: &str) -> Vec<Diagnostic> {
    let definition = match JsonSerializer::new().deserialize(source) {
        Ok(definition) => definition,
        Err(e) => return vec![CohortError::from(e).to_diagnostic()],
    };

    let mut diagnostics = Vec::new();
    check_definition(&definition, &mut diagnostics);

    let request = inflate_definition(definition);
    for role in Role::ALL {
        for group in request.groups(role).iter().filter(|g| g.temporal_error()) {
            diagnostics.push(warning(
                CB0202,
                format!("temporal group `{}` is incomplete", group.id),
            ));
        }
    }
    diagnostics
}

fn check_definition(definition: &CohortDefinition, diagnostics: &mut Vec<Diagnostic>) {
    for role in Role::ALL {
        for group in definition.groups(role) {
            if group.items.is_empty() {
                diagnostics.push(warning(
                    CB0004,
                    format!("{} group `{}` has no items", role.as_str(), group.id),
                ));
            }
            for item in &group.items {
                let mut unknown = Vec::new();
                if let Domain::Other(value) = &item.item_type {
                    unknown.push(("domain", value));
                }
                for param in &item.search_parameters {
                    if let Domain::Other(value) = &param.domain {
                        unknown.push(("domain", value));
                    }
                    if let Some(CriteriaType::Other(value)) = &param.criteria_type {
                        unknown.push(("criteria type", value));
                    }
                    if let Some(CriteriaSubType::Other(value)) = &param.subtype {
                        unknown.push(("subtype", value));
                    }
                    for attr in &param.attributes {
                        if let AttrName::Other(value) = &attr.name {
                            unknown.push(("attribute", value));
                        }
                    }
                }
                for modifier in &item.modifiers {
                    if let ModifierType::Other(value) = &modifier.name {
                        unknown.push(("modifier", value));
                    }
                }
                for (kind, value) in unknown {
                    diagnostics.push(warning(
                        CB0003,
                        format!("unknown {} `{}` in item `{}`", kind, value, item.id),
                    ));
                }
            }
        }
    }
}

fn warning(code: ErrorCode, message: String) -> Diagnostic {
    let diag = Diagnostic::warning(code, message);
    match code.info().help {
        Some(help) => diag.with_help(help),
        None => diag,
    }
}

/// Print validation result for a single file
fn print_validation_result(result: &ValidationResult) {
    let errors = result.count(Severity::Error);
    let status = if errors == 0 { "✓".green() } else { "✗".red() };
    println!("{} {}", status, result.file.display());

    for diag in &result.diagnostics {
        println!("  {}", diag.render_colored());
        if let Some(loc) = &diag.location {
            let file = result.file.display().to_string();
            println!("    {}", output::format_location(&file, loc.line, loc.column));
            if let Some(line) = loc.excerpt(&result.source) {
                println!("    {} {}", "|".blue(), line.trim_end());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use workbench_cohort_diagnostics::{CB0001, CB0002};

    fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_clean_definition() {
        let source = r#"{
            "includes": [{"id": "includes_a", "items": [{
                "id": "items_b",
                "type": "CONDITION",
                "searchParameters": [{"parameterId": "p1", "name": "Asthma", "domain": "CONDITION", "type": "ICD10CM"}]
            }]}],
            "excludes": [],
            "dataFilters": []
        }"#;
        assert!(check_criteria(source).is_empty());
    }

    #[rstest]
    #[case("{\"includes\": [", CB0001)]
    #[case("[1, 2]", CB0002)]
    fn test_unreadable_criteria(#[case] source: &str, #[case] code: ErrorCode) {
        let diagnostics = check_criteria(source);
        assert_eq!(codes(&diagnostics), vec![code]);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert!(diagnostics[0].location.is_some());
    }

    #[test]
    fn test_warnings() {
        let source = r#"{
            "includes": [
                {"id": "includes_a", "items": []},
                {"id": "includes_b", "temporal": true, "mention": "ANY_MENTION", "time": "X_DAYS_AFTER", "items": [{
                    "id": "items_c",
                    "type": "BRAIN_SCAN",
                    "temporalGroup": 0,
                    "searchParameters": [{"parameterId": "p1", "name": "MRI", "domain": "BRAIN_SCAN"}]
                }]}
            ],
            "excludes": []
        }"#;
        let diagnostics = check_criteria(source);
        assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));
        assert_eq!(codes(&diagnostics), vec![CB0004, CB0003, CB0003, CB0202]);
        assert!(diagnostics[1].message.contains("BRAIN_SCAN"));
        assert!(diagnostics[3].help.is_some());
    }
}
