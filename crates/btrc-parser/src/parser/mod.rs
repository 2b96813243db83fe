//! Parser core: token cursor, bounded lookahead, and the parse entry
//! point.
//!
//! The parser is recursive descent and never backtracks destructively:
//! lookahead routines save the cursor with [`Parser::mark`], scan ahead,
//! and restore with [`Parser::rewind`]. The only token-stream mutation is
//! [`Parser::expect_gt`], which splits `>>` / `>>=` into virtual `>`
//! tokens inside generic argument lists.

mod decl;
mod expr;
mod stmt;
mod types;

use btrc_common::token::{Token, TokenKind};

use crate::ast::{Expr, ExprId, ExprKind, Program};
use crate::error::ParseError;

/// Recursive descent parser for the btrc language.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    next_id: u32,
}

/// A saved cursor position, consumed by [`Parser::rewind`].
pub type Mark = usize;

impl Parser {
    /// Create a parser over a token stream. The stream must end with an
    /// `Eof` token (the lexer guarantees this).
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_start_id(tokens, 0)
    }

    /// Create a parser whose expression ids start at `next_id`.
    ///
    /// Used for f-string sub-parsers so that ids stay unique across the
    /// whole program.
    pub fn with_start_id(tokens: Vec<Token>, next_id: u32) -> Self {
        Self {
            tokens,
            pos: 0,
            next_id,
        }
    }

    /// Parse the token stream into a [`Program`].
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut declarations = Vec::new();
        while !self.at_end() {
            declarations.push(self.parse_top_level_item()?);
        }
        Ok(Program { declarations })
    }

    // ── Token helpers ──────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &Token {
        let idx = self.pos + offset;
        if idx < self.tokens.len() {
            &self.tokens[idx]
        } else {
            // The stream always ends with Eof.
            self.tokens.last().expect("token stream must not be empty")
        }
    }

    /// Token kind at an absolute stream index, clamped to the final Eof.
    pub(crate) fn kind_at(&self, idx: usize) -> TokenKind {
        if idx < self.tokens.len() {
            self.tokens[idx].kind
        } else {
            TokenKind::Eof
        }
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek().kind)
    }

    /// Consume and return the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of the given kind or fail with a positioned error.
    /// `what` names the expected construct in the message.
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(ParseError::new(
                format!("Expected {what}, got {:?} '{}'", tok.kind, tok.text),
                tok.line,
                tok.col,
            ))
        }
    }

    /// Build a parse error at the current token.
    pub(crate) fn error(&self, msg: impl Into<String>) -> ParseError {
        let tok = self.peek();
        ParseError::new(msg, tok.line, tok.col)
    }

    // ── Bounded lookahead ──────────────────────────────────────────────

    /// Save the cursor for a later [`Parser::rewind`].
    pub(crate) fn mark(&self) -> Mark {
        self.pos
    }

    /// Restore a cursor saved by [`Parser::mark`].
    pub(crate) fn rewind(&mut self, mark: Mark) {
        self.pos = mark;
    }

    // ── Generic-context `>` splitting ──────────────────────────────────

    /// Expect a `>`, splitting `>>` and `>>=` tokens so that nested
    /// generic argument lists close one level at a time.
    pub(crate) fn expect_gt(&mut self) -> Result<Token, ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Gt => Ok(self.advance()),
            TokenKind::GtGt => {
                self.advance();
                let synthetic = Token::new(TokenKind::Gt, ">", tok.line, tok.col + 1);
                self.tokens.insert(self.pos, synthetic);
                Ok(Token::new(TokenKind::Gt, ">", tok.line, tok.col))
            }
            TokenKind::GtGtEq => {
                self.advance();
                let synthetic = Token::new(TokenKind::GtEq, ">=", tok.line, tok.col + 1);
                self.tokens.insert(self.pos, synthetic);
                Ok(Token::new(TokenKind::Gt, ">", tok.line, tok.col))
            }
            _ => Err(ParseError::new(
                format!("Expected '>', got {:?} '{}'", tok.kind, tok.text),
                tok.line,
                tok.col,
            )),
        }
    }

    // ── Expression ids ─────────────────────────────────────────────────

    /// Allocate a fresh expression node.
    pub(crate) fn new_expr(&mut self, kind: ExprKind, line: u32, col: u32) -> Expr {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        Expr {
            id,
            kind,
            line,
            col,
        }
    }

    /// The next unassigned expression id (handed to f-string sub-parsers).
    pub(crate) fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Resume the id sequence after a sub-parser finished.
    pub(crate) fn resume_ids(&mut self, next_id: u32) {
        self.next_id = next_id;
    }
}
