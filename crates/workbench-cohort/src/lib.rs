//! Cohort definition editing for the researcher workbench
//!
//! This crate bundles:
//! - The `CohortDefinition` wire model and its JSON serialization
//! - The editable search request, its mapping to and from stored criteria,
//!   and editor sessions
//! - Error codes and diagnostics
//! - The `cohort` command-line tool (with the `cli` feature)
//!
//! # Example
//!
//! ```
//! use workbench_cohort::{map_request, parse_cohort_definition};
//!
//! let criteria = r#"{"includes":[],"excludes":[],"datafilters":["HAS_EHR_DATA"]}"#;
//! let request = parse_cohort_definition(criteria)?;
//! assert_eq!(map_request(&request).data_filters.len(), 1);
//! # Ok::<(), workbench_cohort::CohortError>(())
//! ```

// Re-export all public APIs from internal crates
pub use workbench_cohort_diagnostics as diagnostics;
pub use workbench_cohort_model as model;
pub use workbench_cohort_search as search;

// Convenience re-exports
pub use workbench_cohort_diagnostics::{CohortError, Result};
pub use workbench_cohort_model::{Cohort, CohortDefinition};
pub use workbench_cohort_search::{EditorSession, SearchRequest, map_request, parse_cohort_definition};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
