//! Cohort definition wire model
//!
//! This crate provides:
//! - The `CohortDefinition` tree exchanged with the cohort-builder API and
//!   stored in a cohort's `criteria` field
//! - String-backed vocabularies (domains, criteria types, operators, ...)
//! - The persisted `Cohort` record
//! - JSON serialization of criteria

pub mod cohort;
pub mod definition;
pub mod serialize;
pub mod vocabulary;

pub use cohort::*;
pub use definition::*;
pub use vocabulary::*;
