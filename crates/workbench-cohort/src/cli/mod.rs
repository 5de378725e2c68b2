//! CLI functionality for the cohort tool
//!
//! This module contains all CLI-related functionality including:
//! - Criteria normalization
//! - Validation
//! - Describing a definition
//! - Id generation
//! - Output formatting

pub mod describe;
pub mod ids;
pub mod normalize;
pub mod output;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Read criteria JSON from a file, or from stdin when the path is `-`
pub(crate) async fn read_criteria(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        tokio::io::stdin()
            .read_to_string(&mut input)
            .await
            .context("Failed to read criteria from stdin")?;
        return Ok(input);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read criteria file: {}", path.display()))
}
