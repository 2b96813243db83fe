//! Diagnostic type for analyzer errors and warnings.

use std::fmt;

/// How serious a diagnostic is. Errors block compilation; warnings do
/// not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single analyzer diagnostic with a 1-based source position.
///
/// Diagnostics are accumulated, never thrown: analysis always runs to
/// completion so that tooling can query a well-formed result even for
/// broken programs. The `Display` form is `<message> at <line>:<col>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub line: u32,
    pub col: u32,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            message: message.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let d = Diagnostic::new("Division by zero", 7, 13);
        assert_eq!(d.to_string(), "Division by zero at 7:13");
    }
}
