use std::fmt;

use serde::Serialize;

/// A lexer error with location information.
///
/// Lexing is all-or-nothing: the first malformed construct aborts the
/// token stream and is reported as a single positioned failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: u32,
    pub col: u32,
}

impl LexError {
    /// Create a new lexer error.
    pub fn new(kind: LexErrorKind, line: u32, col: u32) -> Self {
        Self { kind, line, col }
    }
}

/// The specific kind of lexer error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LexErrorKind {
    /// An unexpected character was encountered.
    UnexpectedCharacter(char),
    /// An annotation other than `@gpu`.
    UnknownAnnotation(String),
    /// A string literal was not closed before end of line or input.
    UnterminatedString,
    /// A triple-quoted string was not closed before end of input.
    UnterminatedTripleString,
    /// A character literal was not closed before end of input.
    UnterminatedChar,
    /// An f-string literal was not closed before end of line or input.
    UnterminatedFString,
    /// A `/* ... */` comment was not closed before end of input.
    UnterminatedBlockComment,
    /// `0x` with no hex digits after it.
    EmptyHexLiteral,
    /// `0b` with no binary digits after it.
    EmptyBinaryLiteral,
    /// `0o` with no octal digits after it.
    EmptyOctalLiteral,
    /// `e`/`E` exponent marker with no digits after it.
    EmptyExponent,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "Unexpected character '{c}'"),
            Self::UnknownAnnotation(name) => write!(f, "Unknown annotation '@{name}'"),
            Self::UnterminatedString => write!(f, "Unterminated string literal"),
            Self::UnterminatedTripleString => write!(f, "Unterminated triple-quoted string"),
            Self::UnterminatedChar => write!(f, "Unterminated character literal"),
            Self::UnterminatedFString => write!(f, "Unterminated f-string literal"),
            Self::UnterminatedBlockComment => write!(f, "Unterminated block comment"),
            Self::EmptyHexLiteral => write!(f, "Invalid hex literal: no digits after '0x'"),
            Self::EmptyBinaryLiteral => {
                write!(f, "Invalid binary literal: no digits after '0b'")
            }
            Self::EmptyOctalLiteral => {
                write!(f, "Invalid octal literal: no digits after '0o'")
            }
            Self::EmptyExponent => write!(f, "Invalid float literal: no digits in exponent"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.kind, self.line, self.col)
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display_includes_position() {
        let err = LexError::new(LexErrorKind::UnterminatedString, 4, 12);
        assert_eq!(err.to_string(), "Unterminated string literal at 4:12");
    }

    #[test]
    fn unknown_annotation_names_the_annotation() {
        let err = LexError::new(LexErrorKind::UnknownAnnotation("cpu".into()), 1, 1);
        assert_eq!(err.to_string(), "Unknown annotation '@cpu' at 1:1");
    }
}
