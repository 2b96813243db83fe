//! Parse error type for the btrc parser.

use std::fmt;

/// A parse error with location information.
///
/// Parsing is exception-style: the first unexpected token aborts the
/// parse and propagates out as a `ParseError`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// 1-based line where the error was detected.
    pub line: u32,
    /// 1-based column where the error was detected.
    pub col: u32,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            message: message.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.col)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let err = ParseError::new("Expected ';', got Eof ''", 3, 14);
        assert_eq!(err.to_string(), "Expected ';', got Eof '' at 3:14");
    }
}
