//! Cohort error types

use crate::{CB0001, CB0002, CB0301, CB0302, CB0303, CB0300, CB0401, ErrorCode, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - the operation cannot proceed
    Error,
    /// Warning - potential issue but can continue
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Location inside the criteria document
    pub location: Option<SourceLocation>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render with terminal colors, severity first
    #[cfg(feature = "colored")]
    pub fn render_colored(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
        };
        let mut out = format!("{}[{}]: {}", severity, self.code, self.message);
        if let Some(loc) = &self.location {
            out.push_str(&format!(" at {}", loc.to_string().cyan()));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".green(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Main cohort error type
#[derive(Debug, Clone, Error)]
pub enum CohortError {
    /// Stored criteria could not be parsed
    #[error("{code}: {message}")]
    Parse {
        code: ErrorCode,
        message: String,
        location: Option<SourceLocation>,
        context: Option<String>,
    },

    /// Selection input is missing a required field
    #[error("{code}: {message}")]
    Validation {
        code: ErrorCode,
        message: String,
        field: Option<String>,
    },

    /// An edit addressed a group or item that is not in the search request
    #[error("{code}: {message}")]
    Edit {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Cohort persistence or count request failed
    #[error("{code}: {message}")]
    Persistence {
        code: ErrorCode,
        message: String,
        status: Option<u16>,
    },

    /// System error
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },
}

impl CohortError {
    /// Create a parse error
    pub fn parse(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Parse {
            code,
            message: message.into(),
            location: None,
            context: None,
        }
    }

    /// Create a parse error from a failed `serde_json` read of criteria text.
    ///
    /// Well-formed JSON of the wrong shape gets `CB0002`.
    pub fn from_json(error: &serde_json::Error) -> Self {
        let code = match error.classify() {
            serde_json::error::Category::Data => CB0002,
            _ => CB0001,
        };
        Self::Parse {
            code,
            message: error.to_string(),
            location: Some(SourceLocation::from_json_error(error)),
            context: None,
        }
    }

    /// Create a validation error for a field
    pub fn validation(code: ErrorCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an edit error
    pub fn edit(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Edit {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Cohort lookup returned nothing
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Persistence {
            code: CB0300,
            message: message.into(),
            status: Some(404),
        }
    }

    /// A cohort with the same name already exists (HTTP 409)
    pub fn name_conflict(name: &str) -> Self {
        Self::Persistence {
            code: CB0301,
            message: format!("Cohort named '{}' already exists", name),
            status: Some(409),
        }
    }

    /// The stored record changed since it was read (HTTP 409)
    pub fn concurrent_modification(message: impl Into<String>) -> Self {
        Self::Persistence {
            code: CB0302,
            message: message.into(),
            status: Some(409),
        }
    }

    /// Generic server failure (HTTP 5xx)
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Persistence {
            code: CB0303,
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attach context to the error, where the variant carries it
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        match &mut self {
            Self::Parse { context, .. } | Self::Edit { context, .. } | Self::System { context, .. } => {
                *context = Some(ctx.into());
            }
            _ => {}
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::Edit { code, .. } => *code,
            Self::Persistence { code, .. } => *code,
            Self::System { code, .. } => *code,
        }
    }

    /// Get the location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Parse { location, .. } => location.as_ref(),
            _ => None,
        }
    }

    /// Whether the user can retry after this error.
    ///
    /// Malformed stored criteria is fatal for the editor session; conflicts
    /// and server failures can be retried with new input or later.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Parse { .. } => false,
            Self::Validation { .. } | Self::Edit { .. } | Self::Persistence { .. } => true,
            Self::System { .. } => false,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Parse { code, message, location, context } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(loc) = location {
                    diag = diag.with_location(*loc);
                }
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                } else if let Some(help) = code.info().help {
                    diag = diag.with_help(help);
                }
                diag
            }
            Self::Validation { code, message, field } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(field) = field {
                    diag = diag.with_help(format!("field: {}", field));
                }
                diag
            }
            Self::Edit { code, message, context } | Self::System { code, message, context } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                }
                diag
            }
            Self::Persistence { code, message, .. } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(help) = code.info().help {
                    diag = diag.with_help(help);
                }
                diag
            }
        }
    }
}

impl From<std::io::Error> for CohortError {
    fn from(error: std::io::Error) -> Self {
        Self::system(CB0401, error.to_string())
    }
}
