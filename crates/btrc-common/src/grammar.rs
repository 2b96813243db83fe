//! EBNF grammar loader for the btrc language.
//!
//! Reads `grammar/btrc.ebnf` and extracts the keyword set and the operator
//! list from the `@lexical` section, making the grammar the single source
//! of truth for what tokens exist. Keyword and operator kind names are
//! derived from the source strings and resolved against [`TokenKind`];
//! any name without an enumerator fails loading, which is fatal for the
//! bundled grammar.

use std::fmt;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::token::TokenKind;

/// The bundled grammar text, compiled into the binary.
pub const BTRC_EBNF: &str = include_str!("../../../grammar/btrc.ebnf");

static GRAMMAR: Lazy<GrammarInfo> = Lazy::new(|| {
    parse_grammar(BTRC_EBNF).unwrap_or_else(|e| panic!("bundled grammar is invalid: {e}"))
});

/// The bundled grammar, parsed once on first access.
pub fn grammar() -> &'static GrammarInfo {
    &GRAMMAR
}

/// Structured information extracted from the EBNF grammar.
#[derive(Debug, Clone)]
pub struct GrammarInfo {
    /// Keywords in grammar order.
    pub keywords: Vec<String>,
    /// Operators sorted longest-first (ties broken lexicographically),
    /// ready for greedy matching in the lexer.
    pub operators: Vec<String>,
    /// Keyword string -> token kind.
    pub keyword_kinds: FxHashMap<String, TokenKind>,
    /// Operator string -> token kind.
    pub operator_kinds: FxHashMap<String, TokenKind>,
}

/// A failure while loading the grammar. These indicate a broken build,
/// not a user error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A required `@...` section was not found or its braces never close.
    MissingSection(&'static str),
    /// A character in an operator has no entry in the character-name table.
    UnnamedCharacter { ch: char, op: String },
    /// A derived kind name has no `TokenKind` enumerator.
    UnknownKindName { item: String, kind_name: String },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSection(name) => {
                write!(f, "no {name} section found in grammar")
            }
            Self::UnnamedCharacter { ch, op } => {
                write!(f, "no character name for {ch:?} in operator {op:?}")
            }
            Self::UnknownKindName { item, kind_name } => {
                write!(
                    f,
                    "grammar entry {item:?} maps to token kind {kind_name} \
                     which does not exist in the TokenKind enum"
                )
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// Token-kind name component for a single operator character.
///
/// Multi-character operators join these with `_` (`+=` -> `PLUS_EQ`).
fn char_name(ch: char) -> Option<&'static str> {
    let name = match ch {
        '+' => "PLUS",
        '-' => "MINUS",
        '*' => "STAR",
        '/' => "SLASH",
        '%' => "PERCENT",
        '=' => "EQ",
        '<' => "LT",
        '>' => "GT",
        '!' => "BANG",
        '&' => "AMP",
        '|' => "PIPE",
        '^' => "CARET",
        '~' => "TILDE",
        '?' => "QUESTION",
        '.' => "DOT",
        ',' => "COMMA",
        ';' => "SEMICOLON",
        ':' => "COLON",
        '(' => "LPAREN",
        ')' => "RPAREN",
        '[' => "LBRACKET",
        ']' => "RBRACKET",
        '{' => "LBRACE",
        '}' => "RBRACE",
        _ => return None,
    };
    Some(name)
}

/// Operators whose kind name does not follow the character-join convention.
fn special_op_name(op: &str) -> Option<&'static str> {
    match op {
        "->" => Some("ARROW"),
        "=>" => Some("FAT_ARROW"),
        _ => None,
    }
}

/// Derive a token kind name from an operator string.
fn op_kind_name(op: &str) -> Result<String, GrammarError> {
    if let Some(name) = special_op_name(op) {
        return Ok(name.to_string());
    }
    let mut parts = Vec::new();
    for ch in op.chars() {
        let name = char_name(ch).ok_or_else(|| GrammarError::UnnamedCharacter {
            ch,
            op: op.to_string(),
        })?;
        parts.push(name);
    }
    Ok(parts.join("_"))
}

/// Extract the content between `{ }` after a `@marker`, handling nested
/// braces. Skips `--` line comments, `(* ... *)` block comments, quoted
/// strings, and `/.../` regex literals so that braces inside them do not
/// confuse the depth count.
fn extract_brace_block<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let bytes = text.as_bytes();

    // Find the marker followed (possibly with whitespace) by '{'.
    let mut search = 0;
    let brace_start = loop {
        let idx = text[search..].find(marker)? + search;
        let mut j = idx + marker.len();
        while j < bytes.len() && (bytes[j] as char).is_whitespace() {
            j += 1;
        }
        if j < bytes.len() && bytes[j] == b'{' {
            break j;
        }
        search = idx + marker.len();
    };

    let mut depth = 1usize;
    let mut i = brace_start + 1;
    while i < bytes.len() && depth > 0 {
        let ch = bytes[i];
        if ch == b'-' && i + 1 < bytes.len() && bytes[i + 1] == b'-' {
            // Line comment: skip to end of line.
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        } else if ch == b'(' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
            // Block comment (* ... *).
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b')') {
                i += 1;
            }
            i += 2;
            continue;
        } else if ch == b'/' && i + 1 < bytes.len() && bytes[i + 1] != b'/' {
            // Regex literal: scan to the closing '/'.
            i += 1;
            while i < bytes.len() && bytes[i] != b'/' && bytes[i] != b'\n' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            if i < bytes.len() && bytes[i] == b'/' {
                i += 1;
            }
            continue;
        } else if ch == b'"' {
            // Quoted string.
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i += 1;
            continue;
        } else if ch == b'{' {
            depth += 1;
        } else if ch == b'}' {
            depth -= 1;
        }
        i += 1;
    }

    if depth != 0 {
        return None;
    }
    Some(&text[brace_start + 1..i - 1])
}

/// Collect bare identifier words from a section body, ignoring `--`
/// comments.
fn extract_words(body: &str) -> Vec<String> {
    let mut words = Vec::new();
    for line in body.lines() {
        let line = match line.find("--") {
            Some(idx) => &line[..idx],
            None => line,
        };
        let mut current = String::new();
        for ch in line.chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                current.push(ch);
            } else if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

/// Collect quoted strings from a section body, ignoring `--` comments.
fn extract_quoted(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'-' && i + 1 < bytes.len() && bytes[i + 1] == b'-' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if bytes[i] == b'"' {
            let start = i + 1;
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                i += 1;
            }
            if i > start {
                out.push(body[start..i].to_string());
            }
            i += 1;
        } else {
            i += 1;
        }
    }
    out
}

/// Parse EBNF grammar text and extract the lexical tables.
pub fn parse_grammar(text: &str) -> Result<GrammarInfo, GrammarError> {
    let lexical = extract_brace_block(text, "@lexical")
        .ok_or(GrammarError::MissingSection("@lexical"))?;

    let kw_body = extract_brace_block(lexical, "@keywords")
        .ok_or(GrammarError::MissingSection("@keywords"))?;
    let keywords = extract_words(kw_body);
    let mut keyword_kinds = FxHashMap::default();
    for kw in &keywords {
        let name = kw.to_uppercase();
        let kind = TokenKind::from_name(&name).ok_or_else(|| GrammarError::UnknownKindName {
            item: kw.clone(),
            kind_name: name.clone(),
        })?;
        keyword_kinds.insert(kw.clone(), kind);
    }

    let op_body = extract_brace_block(lexical, "@operators")
        .ok_or(GrammarError::MissingSection("@operators"))?;
    let mut operators = extract_quoted(op_body);
    // Longest-first for greedy matching; ties broken lexicographically.
    operators.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let mut operator_kinds = FxHashMap::default();
    for op in &operators {
        let name = op_kind_name(op)?;
        let kind = TokenKind::from_name(&name).ok_or_else(|| GrammarError::UnknownKindName {
            item: op.clone(),
            kind_name: name.clone(),
        })?;
        operator_kinds.insert(op.clone(), kind);
    }

    Ok(GrammarInfo {
        keywords,
        operators,
        keyword_kinds,
        operator_kinds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
        -- a toy grammar
        @lexical {
            @keywords {
                -- flow
                if else while
                return
            }
            @operators {
                "+" "==" "=" "<<=" "->" "(" ")"
            }
            @literals {
                IDENT = /[a-z]+/
            }
        }
        (* trailing prose with { unbalanced } braces inside a comment *)
    "#;

    #[test]
    fn parses_keywords_and_operators() {
        let info = parse_grammar(SMALL).unwrap();
        assert_eq!(info.keywords, vec!["if", "else", "while", "return"]);
        assert_eq!(info.keyword_kinds["if"], TokenKind::If);
        assert_eq!(info.keyword_kinds["return"], TokenKind::Return);
        assert_eq!(info.operator_kinds["=="], TokenKind::EqEq);
        assert_eq!(info.operator_kinds["<<="], TokenKind::LtLtEq);
        assert_eq!(info.operator_kinds["->"], TokenKind::Arrow);
        assert_eq!(info.operator_kinds["("], TokenKind::LParen);
    }

    #[test]
    fn operators_sorted_longest_first() {
        let info = parse_grammar(SMALL).unwrap();
        assert_eq!(info.operators[0], "<<=");
        // Ties broken lexicographically.
        let two_char: Vec<_> = info
            .operators
            .iter()
            .filter(|op| op.len() == 2)
            .collect();
        assert_eq!(two_char, vec!["->", "=="]);
        // Single-char operators come last.
        assert!(info.operators.last().unwrap().len() == 1);
    }

    #[test]
    fn missing_lexical_section_fails() {
        let err = parse_grammar("@syntax { program = ; }").unwrap_err();
        assert_eq!(err, GrammarError::MissingSection("@lexical"));
    }

    #[test]
    fn missing_operator_section_fails() {
        let err = parse_grammar("@lexical { @keywords { if } }").unwrap_err();
        assert_eq!(err, GrammarError::MissingSection("@operators"));
    }

    #[test]
    fn unknown_keyword_kind_fails() {
        let err = parse_grammar(
            r#"@lexical { @keywords { frobnicate } @operators { "+" } }"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnknownKindName {
                item: "frobnicate".into(),
                kind_name: "FROBNICATE".into(),
            }
        );
    }

    #[test]
    fn unnamed_operator_character_fails() {
        let err =
            parse_grammar(r#"@lexical { @keywords { if } @operators { "$" } }"#).unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnnamedCharacter {
                ch: '$',
                op: "$".into(),
            }
        );
    }

    #[test]
    fn unbalanced_braces_fail() {
        let err = parse_grammar("@lexical { @keywords { if }").unwrap_err();
        assert_eq!(err, GrammarError::MissingSection("@lexical"));
    }

    #[test]
    fn bundled_grammar_loads() {
        let info = grammar();
        // Spot-check the derived tables.
        assert_eq!(info.keyword_kinds["class"], TokenKind::Class);
        assert_eq!(info.keyword_kinds["self"], TokenKind::SelfKw);
        assert_eq!(info.keyword_kinds["string"], TokenKind::StringKw);
        assert_eq!(info.operator_kinds["?."], TokenKind::QuestionDot);
        assert_eq!(info.operator_kinds["??"], TokenKind::QuestionQuestion);
        assert_eq!(info.operator_kinds[">>="], TokenKind::GtGtEq);
        // Greedy matching depends on longest-first ordering.
        let shl_eq = info.operators.iter().position(|op| op == "<<=").unwrap();
        let shl = info.operators.iter().position(|op| op == "<<").unwrap();
        let lt = info.operators.iter().position(|op| op == "<").unwrap();
        assert!(shl_eq < shl && shl < lt);
    }
}
