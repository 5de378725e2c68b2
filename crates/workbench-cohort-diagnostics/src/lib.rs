//! Cohort diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the cohort
//! crates: structured error codes, source locations inside stored criteria
//! JSON, and diagnostic reporting.

mod error;
mod error_code;
mod location;

pub use error::*;
pub use error_code::*;
pub use location::*;

/// Result type for cohort operations
pub type Result<T> = std::result::Result<T, CohortError>;
