//! Type expression and parameter parsing.

use btrc_common::token::TokenKind;

use super::Parser;
use crate::ast::{Param, TypeExpr};
use crate::error::ParseError;

impl Parser {
    /// Whether the current token could start a type expression.
    pub(crate) fn is_type_start(&self) -> bool {
        let kind = self.peek().kind;
        if kind == TokenKind::Var {
            return true;
        }
        if kind.is_type_keyword() || kind == TokenKind::Ident {
            return true;
        }
        kind == TokenKind::LParen && self.is_tuple_type_start()
    }

    /// Parse a type expression: qualifiers, base (possibly a signedness /
    /// size combo, `struct|enum|union Name`, a tuple, or an identifier),
    /// generic arguments, `[]` array suffix, pointer stars, and an
    /// optional `?` nullable marker.
    pub(crate) fn parse_type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        let tok = self.peek().clone();
        let (line, col) = (tok.line, tok.col);

        // const/static/extern/volatile qualifiers.
        let mut is_const = false;
        while self.check_any(&[
            TokenKind::Const,
            TokenKind::Static,
            TokenKind::Extern,
            TokenKind::Volatile,
        ]) {
            if self.check(TokenKind::Const) {
                is_const = true;
            }
            self.advance();
        }

        let base = if self.check_any(&[TokenKind::Unsigned, TokenKind::Signed]) {
            let mut base = self.advance().text;
            if self.check_any(&[
                TokenKind::Int,
                TokenKind::Short,
                TokenKind::Long,
                TokenKind::Char,
            ]) {
                base.push(' ');
                base.push_str(&self.advance().text);
                if base.ends_with("long") && self.check(TokenKind::Long) {
                    base.push(' ');
                    base.push_str(&self.advance().text);
                }
            }
            base
        } else if self.check(TokenKind::Long) {
            let mut base = self.advance().text;
            if self.check(TokenKind::Long) {
                base.push(' ');
                base.push_str(&self.advance().text);
            }
            if self.check_any(&[TokenKind::Int, TokenKind::Double]) {
                base.push(' ');
                base.push_str(&self.advance().text);
            }
            base
        } else if self.check(TokenKind::Short) {
            let mut base = self.advance().text;
            if self.check(TokenKind::Int) {
                base.push(' ');
                base.push_str(&self.advance().text);
            }
            base
        } else if self.check(TokenKind::Struct) {
            self.advance();
            format!("struct {}", self.expect(TokenKind::Ident, "struct name")?.text)
        } else if self.check(TokenKind::Enum) {
            self.advance();
            format!("enum {}", self.expect(TokenKind::Ident, "enum name")?.text)
        } else if self.check(TokenKind::Union) {
            self.advance();
            format!("union {}", self.expect(TokenKind::Ident, "union name")?.text)
        } else if self.check(TokenKind::LParen) {
            let mut tuple = self.parse_tuple_type(line, col)?;
            tuple.is_const = is_const;
            return Ok(tuple);
        } else {
            self.advance().text
        };

        // Generic arguments.
        let mut generic_args = Vec::new();
        if self.check(TokenKind::Lt) && self.is_generic_start() {
            self.advance();
            generic_args.push(self.parse_type_expr()?);
            while self.eat(TokenKind::Comma).is_some() {
                generic_args.push(self.parse_type_expr()?);
            }
            self.expect_gt()?;
        }

        // Array suffix `[]`.
        let mut is_array = false;
        if self.check(TokenKind::LBracket) && self.peek_at(1).kind == TokenKind::RBracket {
            self.advance();
            self.advance();
            is_array = true;
        }

        // Pointer stars.
        let mut pointer_depth = 0u32;
        while self.eat(TokenKind::Star).is_some() {
            pointer_depth += 1;
        }

        // Nullable: `T?` is sugar for `T*` (adds one pointer level).
        let mut is_nullable = false;
        if self.eat(TokenKind::Question).is_some() {
            pointer_depth += 1;
            is_nullable = true;
        }

        Ok(TypeExpr {
            base,
            generic_args,
            pointer_depth,
            is_array,
            array_size: None,
            is_const,
            is_nullable,
            line,
            col,
        })
    }

    /// Whether `(` starts a tuple type like `(int, int)`: a type-ish
    /// token follows and a top-level comma appears before the paren
    /// closes.
    pub(crate) fn is_tuple_type_start(&self) -> bool {
        let mut i = self.pos + 1;
        let first = self.kind_at(i);
        if !first.is_type_keyword() && first != TokenKind::Ident {
            return false;
        }
        i += 1;
        let mut depth = 1u32;
        while self.kind_at(i) != TokenKind::Eof && depth > 0 {
            match self.kind_at(i) {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                TokenKind::Comma if depth == 1 => return true,
                _ => {}
            }
            i += 1;
        }
        false
    }

    /// Parse a tuple type `(T, T, ...)` into `Tuple<T, T, ...>`.
    fn parse_tuple_type(&mut self, line: u32, col: u32) -> Result<TypeExpr, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = vec![self.parse_type_expr()?];
        while self.eat(TokenKind::Comma).is_some() {
            args.push(self.parse_type_expr()?);
        }
        self.expect(TokenKind::RParen, "')'")?;
        let mut ty = TypeExpr::named("Tuple").with_args(args);
        ty.line = line;
        ty.col = col;
        Ok(ty)
    }

    /// Bounded lookahead deciding whether `<` begins generic arguments or
    /// is a comparison. Balances `<`/`>` depth (treating `>>` as two
    /// closers) and gives up on `;`, `{`, `}`, or end of input. When the
    /// brackets balance, the token after the closer decides.
    pub(crate) fn is_generic_start(&mut self) -> bool {
        let save = self.mark();
        let mut depth = 1i32;
        self.pos += 1;

        while self.kind_at(self.pos) != TokenKind::Eof && depth > 0 {
            match self.kind_at(self.pos) {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => depth -= 1,
                TokenKind::GtGt => {
                    depth -= 2;
                    if depth <= 0 {
                        self.pos += 1;
                        break;
                    }
                }
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace => {
                    self.rewind(save);
                    return false;
                }
                _ => {}
            }
            self.pos += 1;
        }

        if depth <= 0 {
            let follow = self.kind_at(self.pos);
            self.rewind(save);
            return matches!(
                follow,
                TokenKind::Ident
                    | TokenKind::Star
                    | TokenKind::LParen
                    | TokenKind::RParen
                    | TokenKind::LBracket
                    | TokenKind::Comma
                    | TokenKind::Gt
                    | TokenKind::GtGt
                    | TokenKind::Semicolon
                    | TokenKind::LBrace
                    | TokenKind::Eq
            );
        }

        self.rewind(save);
        false
    }

    // ── Parameters ─────────────────────────────────────────────────────

    /// Parse a comma-separated parameter list (caller handles the
    /// parentheses).
    pub(crate) fn parse_param_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(params);
        }
        params.push(self.parse_param()?);
        while self.eat(TokenKind::Comma).is_some() {
            params.push(self.parse_param()?);
        }
        Ok(params)
    }

    /// Parse one parameter: `[keep] type name [\[size\]] [= default]`.
    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let tok = self.peek().clone();
        let keep = self.eat(TokenKind::Keep).is_some();
        let mut ty = self.parse_type_expr()?;
        let name = self.expect(TokenKind::Ident, "parameter name")?.text;
        if self.check(TokenKind::LBracket) {
            self.advance();
            if self.check(TokenKind::RBracket) {
                self.advance();
                ty.is_array = true;
            } else {
                let size = self.parse_expr()?;
                self.expect(TokenKind::RBracket, "']'")?;
                ty.is_array = true;
                ty.array_size = Some(Box::new(size));
            }
        }
        let default = if self.eat(TokenKind::Eq).is_some() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Param {
            ty,
            name,
            default,
            keep,
            line: tok.line,
            col: tok.col,
        })
    }
}
