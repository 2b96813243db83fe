//! Shared types for the btrc compiler frontend.
//!
//! This crate holds everything the pipeline stages have in common: the
//! token vocabulary, the grammar loader that derives the keyword and
//! operator tables from `grammar/btrc.ebnf`, lexer error types, and the
//! line index used to resolve 1-based positions to byte offsets when
//! rendering diagnostics.

pub mod error;
pub mod grammar;
pub mod line_index;
pub mod token;

pub use error::{LexError, LexErrorKind};
pub use grammar::{grammar, parse_grammar, GrammarError, GrammarInfo};
pub use line_index::LineIndex;
pub use token::{Token, TokenKind};
