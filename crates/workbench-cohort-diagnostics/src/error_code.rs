//! Cohort error codes following a structured numbering system
//!
//! Error code ranges:
//! - CB0001-CB0099: Parse errors (stored criteria JSON)
//! - CB0100-CB0199: Validation errors (selection input)
//! - CB0200-CB0299: Edit errors (search request actions)
//! - CB0300-CB0399: Persistence errors (cohort store, count API)
//! - CB0400-CB0499: System errors (I/O, configuration)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a parse error (0001-0099)
    pub const fn is_parse_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a validation error (0100-0199)
    pub const fn is_validation_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is an edit error (0200-0299)
    pub const fn is_edit_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a persistence error (0300-0399)
    pub const fn is_persistence_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CB{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Parse errors (0001-0099)
    map.insert(1, ErrorInfo::new("Malformed criteria JSON")
        .with_help("The stored cohort criteria could not be read; the cohort cannot be opened"));
    map.insert(2, ErrorInfo::new("Unexpected criteria shape")
        .with_help("The criteria is valid JSON but not a cohort definition"));
    map.insert(3, ErrorInfo::new("Unknown vocabulary value")
        .with_help("The value is kept as stored and written back unchanged"));
    map.insert(4, ErrorInfo::new("Search group without items")
        .with_help("Groups without active items are dropped when the cohort is saved"));

    // Validation errors (0100-0199)
    map.insert(100, ErrorInfo::new("Missing required selection field"));
    map.insert(101, ErrorInfo::new("Empty required selection field"));

    // Edit errors (0200-0299)
    map.insert(200, ErrorInfo::new("Search group not found"));
    map.insert(201, ErrorInfo::new("Search group item not found"));
    map.insert(202, ErrorInfo::new("Temporal group incomplete")
        .with_help("Please complete criteria selections before saving temporal relationship."));

    // Persistence errors (0300-0399)
    map.insert(300, ErrorInfo::new("Cohort not found"));
    map.insert(301, ErrorInfo::new("Cohort name already exists")
        .with_help("Choose a different name and save again"));
    map.insert(302, ErrorInfo::new("Workspace modified concurrently")
        .with_help("Reload the cohort and reapply your changes"));
    map.insert(303, ErrorInfo::new("An error occurred on the server")
        .with_help("Try again later"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Configuration error"));

    map
});

// Convenient error code constants

// Parse errors
pub const CB0001: ErrorCode = ErrorCode::new(1);
pub const CB0002: ErrorCode = ErrorCode::new(2);
pub const CB0003: ErrorCode = ErrorCode::new(3);
pub const CB0004: ErrorCode = ErrorCode::new(4);

// Validation errors
pub const CB0100: ErrorCode = ErrorCode::new(100);
pub const CB0101: ErrorCode = ErrorCode::new(101);

// Edit errors
pub const CB0200: ErrorCode = ErrorCode::new(200);
pub const CB0201: ErrorCode = ErrorCode::new(201);
pub const CB0202: ErrorCode = ErrorCode::new(202);

// Persistence errors
pub const CB0300: ErrorCode = ErrorCode::new(300);
pub const CB0301: ErrorCode = ErrorCode::new(301);
pub const CB0302: ErrorCode = ErrorCode::new(302);
pub const CB0303: ErrorCode = ErrorCode::new(303);

// System errors
pub const CB0400: ErrorCode = ErrorCode::new(400);
pub const CB0401: ErrorCode = ErrorCode::new(401);
pub const CB0402: ErrorCode = ErrorCode::new(402);
