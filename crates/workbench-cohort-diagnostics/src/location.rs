//! Source location tracking for stored criteria JSON

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location inside a criteria document, with line and column information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location reported by a `serde_json` error.
    ///
    /// `serde_json` reports column 0 for errors raised before the first
    /// character of a line is consumed (for example an empty document), so
    /// the column is clamped to 1.
    pub fn from_json_error(error: &serde_json::Error) -> Self {
        Self::new(error.line().max(1), error.column().max(1))
    }

    /// Byte offset of this location within `source`, if it lies inside it
    pub fn offset_in(&self, source: &str) -> Option<usize> {
        let mut line = 1;
        let mut col = 1;

        for (i, ch) in source.char_indices() {
            if line == self.line && col == self.column {
                return Some(i);
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }

        (line == self.line && col == self.column).then_some(source.len())
    }

    /// The full text of the line this location points into
    pub fn excerpt<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.lines().nth(self.line.checked_sub(1)?)
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{\n  \"includes\": [,]\n}")
            .expect_err("invalid json");
        let loc = SourceLocation::from_json_error(&err);
        assert_eq!(loc.line, 2);
        assert!(loc.column > 1);
    }

    #[test]
    fn test_offset_in() {
        let source = "line1\nline2\nline3";
        assert_eq!(SourceLocation::new(1, 1).offset_in(source), Some(0));
        assert_eq!(SourceLocation::new(2, 1).offset_in(source), Some(6));
        assert_eq!(SourceLocation::new(3, 3).offset_in(source), Some(14));
        assert_eq!(SourceLocation::new(9, 1).offset_in(source), None);
    }

    #[test]
    fn test_excerpt() {
        let source = "{\n  \"includes\": oops\n}";
        assert_eq!(
            SourceLocation::new(2, 15).excerpt(source),
            Some("  \"includes\": oops")
        );
        assert_eq!(SourceLocation::new(0, 1).excerpt(source), None);
    }
}
