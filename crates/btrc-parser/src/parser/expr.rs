//! Expression parsing: the precedence ladder, unary and postfix
//! operators, primaries, both lambda forms, and f-string bodies.

use btrc_common::token::TokenKind;
use btrc_lexer::Lexer;

use super::Parser;
use crate::ast::{
    AssignOp, BinaryOp, Expr, ExprKind, FStringPart, LambdaBody, LambdaExpr, MapEntry, SizeofArg,
    UnaryOp,
};
use crate::error::ParseError;

/// Token kinds that may legally follow a cast's closing paren.
const CAST_FOLLOW: &[TokenKind] = &[
    TokenKind::Ident,
    TokenKind::IntLit,
    TokenKind::FloatLit,
    TokenKind::StringLit,
    TokenKind::CharLit,
    TokenKind::LParen,
    TokenKind::Star,
    TokenKind::Amp,
    TokenKind::Bang,
    TokenKind::Tilde,
    TokenKind::Minus,
    TokenKind::PlusPlus,
    TokenKind::MinusMinus,
    TokenKind::SelfKw,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Null,
    TokenKind::New,
];

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    // ── Precedence ladder ──────────────────────────────────────────────

    /// Assignment is right-associative and sits at the bottom of the
    /// ladder.
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_ternary()?;
        let op = match self.peek().kind {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Sub,
            TokenKind::StarEq => AssignOp::Mul,
            TokenKind::SlashEq => AssignOp::Div,
            TokenKind::PercentEq => AssignOp::Rem,
            TokenKind::AmpEq => AssignOp::BitAnd,
            TokenKind::PipeEq => AssignOp::BitOr,
            TokenKind::CaretEq => AssignOp::BitXor,
            TokenKind::LtLtEq => AssignOp::Shl,
            TokenKind::GtGtEq => AssignOp::Shr,
            _ => return Ok(left),
        };
        self.advance();
        let value = self.parse_assignment()?;
        let (line, col) = (left.line, left.col);
        Ok(self.new_expr(
            ExprKind::Assign {
                target: Box::new(left),
                op,
                value: Box::new(value),
            },
            line,
            col,
        ))
    }

    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_null_coalesce()?;
        if self.eat(TokenKind::Question).is_some() {
            let true_expr = self.parse_expr()?;
            self.expect(TokenKind::Colon, "':'")?;
            let false_expr = self.parse_ternary()?;
            let (line, col) = (expr.line, expr.col);
            return Ok(self.new_expr(
                ExprKind::Ternary {
                    condition: Box::new(expr),
                    true_expr: Box::new(true_expr),
                    false_expr: Box::new(false_expr),
                },
                line,
                col,
            ));
        }
        Ok(expr)
    }

    fn parse_null_coalesce(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_or()?;
        while self.eat(TokenKind::QuestionQuestion).is_some() {
            let right = self.parse_logical_or()?;
            left = self.binary(left, BinaryOp::NullCoalesce, right);
        }
        Ok(left)
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;
        while self.eat(TokenKind::PipePipe).is_some() {
            let right = self.parse_logical_and()?;
            left = self.binary(left, BinaryOp::Or, right);
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_or()?;
        while self.eat(TokenKind::AmpAmp).is_some() {
            let right = self.parse_bitwise_or()?;
            left = self.binary(left, BinaryOp::And, right);
        }
        Ok(left)
    }

    fn parse_bitwise_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_xor()?;
        while self.eat(TokenKind::Pipe).is_some() {
            let right = self.parse_bitwise_xor()?;
            left = self.binary(left, BinaryOp::BitOr, right);
        }
        Ok(left)
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_and()?;
        while self.eat(TokenKind::Caret).is_some() {
            let right = self.parse_bitwise_and()?;
            left = self.binary(left, BinaryOp::BitXor, right);
        }
        Ok(left)
    }

    fn parse_bitwise_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.eat(TokenKind::Amp).is_some() {
            let right = self.parse_equality()?;
            left = self.binary(left, BinaryOp::BitAnd, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::BangEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = self.binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_shift()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::Le,
                TokenKind::GtEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_shift()?;
            left = self.binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::LtLt => BinaryOp::Shl,
                TokenKind::GtGt => BinaryOp::Shr,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = self.binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(left, op, right);
        }
        Ok(left)
    }

    /// Binary nodes inherit the left operand's position.
    fn binary(&mut self, left: Expr, op: BinaryOp, right: Expr) -> Expr {
        let (line, col) = (left.line, left.col);
        self.new_expr(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            line,
            col,
        )
    }

    // ── Unary prefix ───────────────────────────────────────────────────

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        let op = match tok.kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::PlusPlus => Some(UnaryOp::Inc),
            TokenKind::MinusMinus => Some(UnaryOp::Dec),
            TokenKind::Star => Some(UnaryOp::Deref),
            TokenKind::Amp => Some(UnaryOp::AddrOf),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(self.new_expr(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                    prefix: true,
                },
                tok.line,
                tok.col,
            ));
        }
        if tok.kind == TokenKind::Sizeof {
            return self.parse_sizeof();
        }
        if tok.kind == TokenKind::LParen && self.is_cast() {
            return self.parse_cast();
        }
        self.parse_postfix()
    }

    // ── Casts and sizeof ───────────────────────────────────────────────

    /// Bounded lookahead: does `(` start a cast expression?
    fn is_cast(&mut self) -> bool {
        let save = self.mark();
        self.pos += 1;
        let first = self.kind_at(self.pos);

        if first.is_type_keyword() {
            // Scan to the matching close paren; the follow token decides.
            let mut depth = 1u32;
            self.pos += 1;
            while self.kind_at(self.pos) != TokenKind::Eof && depth > 0 {
                match self.kind_at(self.pos) {
                    TokenKind::LParen => depth += 1,
                    TokenKind::RParen => depth -= 1,
                    _ => {}
                }
                self.pos += 1;
            }
            let follow = self.kind_at(self.pos);
            self.rewind(save);
            return depth == 0 && CAST_FOLLOW.contains(&follow);
        }

        if first == TokenKind::Ident {
            self.pos += 1;
            if self.kind_at(self.pos) == TokenKind::Lt {
                let mut depth = 1i32;
                self.pos += 1;
                while self.kind_at(self.pos) != TokenKind::Eof && depth > 0 {
                    match self.kind_at(self.pos) {
                        TokenKind::Lt => depth += 1,
                        TokenKind::Gt => depth -= 1,
                        _ => {}
                    }
                    self.pos += 1;
                }
            }
            while self.kind_at(self.pos) == TokenKind::Star {
                self.pos += 1;
            }
            if self.kind_at(self.pos) == TokenKind::Question {
                self.pos += 1;
            }
            if self.kind_at(self.pos) == TokenKind::RParen {
                self.pos += 1;
                let follow = self.kind_at(self.pos);
                self.rewind(save);
                return CAST_FOLLOW.contains(&follow);
            }
            self.rewind(save);
            return false;
        }

        self.rewind(save);
        false
    }

    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        let tok = self.expect(TokenKind::LParen, "'('")?;
        let target_type = self.parse_type_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let operand = self.parse_unary()?;
        Ok(self.new_expr(
            ExprKind::Cast {
                target_type,
                operand: Box::new(operand),
            },
            tok.line,
            tok.col,
        ))
    }

    fn parse_sizeof(&mut self) -> Result<Expr, ParseError> {
        let tok = self.expect(TokenKind::Sizeof, "'sizeof'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let arg = if self.is_type_start() && self.is_sizeof_type() {
            SizeofArg::Type(self.parse_type_expr()?)
        } else {
            SizeofArg::Expr(Box::new(self.parse_expr()?))
        };
        self.expect(TokenKind::RParen, "')'")?;
        Ok(self.new_expr(ExprKind::Sizeof(arg), tok.line, tok.col))
    }

    /// Whether the sizeof argument is a type rather than an expression.
    fn is_sizeof_type(&self) -> bool {
        let kind = self.peek().kind;
        if kind.is_type_keyword() {
            return true;
        }
        if kind == TokenKind::Ident {
            return matches!(
                self.peek_at(1).kind,
                TokenKind::RParen | TokenKind::Star | TokenKind::Lt
            );
        }
        false
    }

    // ── Postfix chain ──────────────────────────────────────────────────

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let (line, col) = (expr.line, expr.col);
            match self.peek().kind {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        while self.eat(TokenKind::Comma).is_some() {
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                    expr = self.new_expr(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        line,
                        col,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = self.new_expr(
                        ExprKind::Index {
                            obj: Box::new(expr),
                            index: Box::new(index),
                        },
                        line,
                        col,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    // Tuple access `t.0` becomes field `_0`.
                    let field = if self.check(TokenKind::IntLit) {
                        format!("_{}", self.advance().text)
                    } else {
                        self.expect(TokenKind::Ident, "field name")?.text
                    };
                    expr = self.new_expr(
                        ExprKind::FieldAccess {
                            obj: Box::new(expr),
                            field,
                            arrow: false,
                            optional: false,
                        },
                        line,
                        col,
                    );
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    let field = self.expect(TokenKind::Ident, "field name")?.text;
                    expr = self.new_expr(
                        ExprKind::FieldAccess {
                            obj: Box::new(expr),
                            field,
                            arrow: true,
                            optional: true,
                        },
                        line,
                        col,
                    );
                }
                TokenKind::Arrow => {
                    self.advance();
                    let field = self.expect(TokenKind::Ident, "field name")?.text;
                    expr = self.new_expr(
                        ExprKind::FieldAccess {
                            obj: Box::new(expr),
                            field,
                            arrow: true,
                            optional: false,
                        },
                        line,
                        col,
                    );
                }
                TokenKind::PlusPlus => {
                    self.advance();
                    expr = self.new_expr(
                        ExprKind::Unary {
                            op: UnaryOp::Inc,
                            operand: Box::new(expr),
                            prefix: false,
                        },
                        line,
                        col,
                    );
                }
                TokenKind::MinusMinus => {
                    self.advance();
                    expr = self.new_expr(
                        ExprKind::Unary {
                            op: UnaryOp::Dec,
                            operand: Box::new(expr),
                            prefix: false,
                        },
                        line,
                        col,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    // ── Primaries ──────────────────────────────────────────────────────

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        let (line, col) = (tok.line, tok.col);

        match tok.kind {
            TokenKind::IntLit => {
                self.advance();
                let value = parse_int_value(&tok.text);
                Ok(self.new_expr(
                    ExprKind::IntLit {
                        value,
                        raw: tok.text,
                    },
                    line,
                    col,
                ))
            }
            TokenKind::FloatLit => {
                self.advance();
                let value = tok
                    .text
                    .trim_end_matches(['f', 'F'])
                    .parse::<f64>()
                    .unwrap_or(0.0);
                Ok(self.new_expr(
                    ExprKind::FloatLit {
                        value,
                        raw: tok.text,
                    },
                    line,
                    col,
                ))
            }
            TokenKind::StringLit => {
                self.advance();
                Ok(self.new_expr(ExprKind::StringLit { value: tok.text }, line, col))
            }
            TokenKind::CharLit => {
                self.advance();
                Ok(self.new_expr(ExprKind::CharLit { value: tok.text }, line, col))
            }
            TokenKind::FStringLit => {
                self.advance();
                self.parse_fstring(&tok.text, line, col)
            }
            TokenKind::True => {
                self.advance();
                Ok(self.new_expr(ExprKind::BoolLit { value: true }, line, col))
            }
            TokenKind::False => {
                self.advance();
                Ok(self.new_expr(ExprKind::BoolLit { value: false }, line, col))
            }
            TokenKind::Null => {
                self.advance();
                Ok(self.new_expr(ExprKind::NullLit, line, col))
            }
            TokenKind::SelfKw => {
                self.advance();
                Ok(self.new_expr(ExprKind::SelfRef, line, col))
            }
            TokenKind::Super => {
                self.advance();
                Ok(self.new_expr(ExprKind::SuperRef, line, col))
            }
            TokenKind::New => self.parse_new_expr(),
            TokenKind::Spawn => self.parse_spawn_expr(),
            TokenKind::LParen => {
                if self.is_arrow_lambda() {
                    return self.parse_arrow_lambda();
                }
                self.advance();
                let expr = self.parse_expr()?;
                if self.eat(TokenKind::Comma).is_some() {
                    let mut elements = vec![expr, self.parse_expr()?];
                    while self.eat(TokenKind::Comma).is_some() {
                        elements.push(self.parse_expr()?);
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                    return Ok(self.new_expr(ExprKind::TupleLit { elements }, line, col));
                }
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_list_literal(),
            TokenKind::LBrace => {
                if self.is_map_literal() {
                    self.parse_map_literal()
                } else {
                    self.parse_brace_initializer()
                }
            }
            TokenKind::Ident => {
                if self.is_verbose_lambda() {
                    return self.parse_verbose_lambda();
                }
                self.advance();
                Ok(self.new_expr(ExprKind::Ident { name: tok.text }, line, col))
            }
            _ => {
                if self.is_type_start() && self.is_verbose_lambda() {
                    return self.parse_verbose_lambda();
                }
                Err(self.error(format!("Unexpected token '{}' in expression", tok.text)))
            }
        }
    }

    // ── Compound literals ──────────────────────────────────────────────

    fn parse_new_expr(&mut self) -> Result<Expr, ParseError> {
        let tok = self.expect(TokenKind::New, "'new'")?;
        let ty = self.parse_type_expr()?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.eat(TokenKind::Comma).is_some() {
                args.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(self.new_expr(ExprKind::New { ty, args }, tok.line, tok.col))
    }

    fn parse_spawn_expr(&mut self) -> Result<Expr, ParseError> {
        let tok = self.expect(TokenKind::Spawn, "'spawn'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let callee = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(self.new_expr(
            ExprKind::Spawn {
                callee: Box::new(callee),
            },
            tok.line,
            tok.col,
        ))
    }

    fn parse_list_literal(&mut self) -> Result<Expr, ParseError> {
        let tok = self.expect(TokenKind::LBracket, "'['")?;
        let mut elements = Vec::new();
        if !self.check(TokenKind::RBracket) {
            elements.push(self.parse_expr()?);
            while self.eat(TokenKind::Comma).is_some() {
                if self.check(TokenKind::RBracket) {
                    break;
                }
                elements.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(self.new_expr(ExprKind::ListLit { elements }, tok.line, tok.col))
    }

    /// Whether `{` starts a map literal: a `:` appears at nesting depth
    /// zero before the brace closes.
    fn is_map_literal(&self) -> bool {
        if self.peek_at(1).kind == TokenKind::RBrace {
            return false;
        }
        let mut i = self.pos + 1;
        let mut depth = 0u32;
        while self.kind_at(i) != TokenKind::Eof {
            match self.kind_at(i) {
                TokenKind::Colon if depth == 0 => return true,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon => break,
                _ => {}
            }
            i += 1;
        }
        false
    }

    fn parse_map_literal(&mut self) -> Result<Expr, ParseError> {
        let tok = self.expect(TokenKind::LBrace, "'{'")?;
        let mut entries = Vec::new();
        if !self.check(TokenKind::RBrace) {
            loop {
                let key = self.parse_expr()?;
                self.expect(TokenKind::Colon, "':'")?;
                let value = self.parse_expr()?;
                entries.push(MapEntry { key, value });
                if self.eat(TokenKind::Comma).is_none() || self.check(TokenKind::RBrace) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(self.new_expr(ExprKind::MapLit { entries }, tok.line, tok.col))
    }

    /// C-style brace initializer `{expr, expr, ...}`.
    fn parse_brace_initializer(&mut self) -> Result<Expr, ParseError> {
        let tok = self.expect(TokenKind::LBrace, "'{'")?;
        let mut elements = Vec::new();
        if !self.check(TokenKind::RBrace) {
            elements.push(self.parse_expr()?);
            while self.eat(TokenKind::Comma).is_some() {
                if self.check(TokenKind::RBrace) {
                    break;
                }
                elements.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(self.new_expr(ExprKind::BraceInit { elements }, tok.line, tok.col))
    }

    // ── Lambdas ────────────────────────────────────────────────────────

    /// Whether the current position starts a verbose lambda:
    /// `type function(params) { body }`.
    pub(crate) fn is_verbose_lambda(&mut self) -> bool {
        let save = self.mark();

        while matches!(
            self.kind_at(self.pos),
            TokenKind::Const | TokenKind::Static | TokenKind::Extern | TokenKind::Volatile
        ) {
            self.pos += 1;
        }
        let kind = self.kind_at(self.pos);
        if !kind.is_type_keyword() && kind != TokenKind::Ident {
            self.rewind(save);
            return false;
        }
        self.pos += 1;

        // Skip generic arguments.
        if self.kind_at(self.pos) == TokenKind::Lt {
            let mut depth = 1i32;
            self.pos += 1;
            while self.kind_at(self.pos) != TokenKind::Eof && depth > 0 {
                match self.kind_at(self.pos) {
                    TokenKind::Lt => depth += 1,
                    TokenKind::Gt => depth -= 1,
                    TokenKind::GtGt => depth -= 2,
                    _ => {}
                }
                self.pos += 1;
            }
        }

        // Skip pointer stars.
        while self.kind_at(self.pos) == TokenKind::Star {
            self.pos += 1;
        }

        let result = self.kind_at(self.pos) == TokenKind::Function;
        self.rewind(save);
        result
    }

    fn parse_verbose_lambda(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        let return_type = self.parse_type_expr()?;
        self.expect(TokenKind::Function, "'function'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = LambdaBody::Block(self.parse_block()?);
        Ok(self.new_expr(
            ExprKind::Lambda(LambdaExpr {
                return_type: Some(return_type),
                params,
                body,
                captures: Vec::new(),
            }),
            tok.line,
            tok.col,
        ))
    }

    /// Whether `(` starts an arrow lambda: balanced parens with a
    /// trailing `=>`.
    fn is_arrow_lambda(&mut self) -> bool {
        let save = self.mark();
        self.pos += 1;

        if self.kind_at(self.pos) == TokenKind::RParen {
            self.pos += 1;
            let result = self.kind_at(self.pos) == TokenKind::FatArrow;
            self.rewind(save);
            return result;
        }

        let kind = self.kind_at(self.pos);
        if !kind.is_type_keyword() && kind != TokenKind::Ident {
            self.rewind(save);
            return false;
        }
        let mut depth = 1u32;
        self.pos += 1;
        while self.kind_at(self.pos) != TokenKind::Eof && depth > 0 {
            match self.kind_at(self.pos) {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                TokenKind::Semicolon | TokenKind::LBrace => {
                    self.rewind(save);
                    return false;
                }
                _ => {}
            }
            self.pos += 1;
        }
        let result = depth == 0 && self.kind_at(self.pos) == TokenKind::FatArrow;
        self.rewind(save);
        result
    }

    fn parse_arrow_lambda(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::FatArrow, "'=>'")?;
        let body = if self.check(TokenKind::LBrace) {
            LambdaBody::Block(self.parse_block()?)
        } else {
            LambdaBody::Expr(Box::new(self.parse_expr()?))
        };
        Ok(self.new_expr(
            ExprKind::Lambda(LambdaExpr {
                return_type: None,
                params,
                body,
                captures: Vec::new(),
            }),
            tok.line,
            tok.col,
        ))
    }

    // ── F-strings ──────────────────────────────────────────────────────

    /// Parse f-string content into text and expression parts.
    ///
    /// Outside braces, characters accumulate into text parts (`{{`/`}}`
    /// become literal braces). Each balanced `{...}` region is handed to
    /// a fresh sub-lexer and sub-parser that parse a single expression;
    /// the sub-parser continues this parser's expression-id sequence.
    fn parse_fstring(&mut self, raw: &str, line: u32, col: u32) -> Result<Expr, ParseError> {
        let chars: Vec<char> = raw.chars().collect();
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut i = 0usize;

        while i < chars.len() {
            let ch = chars[i];
            if ch == '{' {
                if i + 1 < chars.len() && chars[i + 1] == '{' {
                    text.push('{');
                    i += 2;
                    continue;
                }
                if !text.is_empty() {
                    parts.push(FStringPart::Text(std::mem::take(&mut text)));
                }
                i += 1;
                let mut depth = 1u32;
                let mut expr_src = String::new();
                while i < chars.len() {
                    if chars[i] == '{' {
                        depth += 1;
                    } else if chars[i] == '}' {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    expr_src.push(chars[i]);
                    i += 1;
                }
                i += 1;
                let expr_src = expr_src.replace("\\\"", "\"");
                parts.push(FStringPart::Expr(self.parse_fstring_expr(
                    &expr_src, line, col,
                )?));
            } else if ch == '}' {
                if i + 1 < chars.len() && chars[i + 1] == '}' {
                    text.push('}');
                    i += 2;
                    continue;
                }
                text.push(ch);
                i += 1;
            } else if ch == '\\' {
                text.push(ch);
                if i + 1 < chars.len() {
                    i += 1;
                    text.push(chars[i]);
                }
                i += 1;
            } else {
                text.push(ch);
                i += 1;
            }
        }
        if !text.is_empty() {
            parts.push(FStringPart::Text(text));
        }

        Ok(self.new_expr(ExprKind::FString { parts }, line, col))
    }

    /// Lex and parse one embedded f-string expression with a fresh
    /// sub-lexer and sub-parser.
    fn parse_fstring_expr(&mut self, src: &str, line: u32, col: u32) -> Result<Expr, ParseError> {
        let tokens = Lexer::tokenize(&format!("{src};"))
            .map_err(|e| ParseError::new(format!("Invalid f-string expression: {e}"), line, col))?;
        let mut sub = Parser::with_start_id(tokens, self.next_id());
        let expr = sub.parse_expr()?;
        self.resume_ids(sub.next_id());
        Ok(expr)
    }
}

/// Parse an integer literal's numeric value, handling radix prefixes and
/// ignoring `u`/`l` suffixes. Out-of-range values saturate to 0.
fn parse_int_value(raw: &str) -> i64 {
    let digits = raw.trim_end_matches(['u', 'U', 'l', 'L']);
    let (radix, body) = if let Some(rest) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, rest)
    } else if let Some(rest) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        (2, rest)
    } else if let Some(rest) = digits.strip_prefix("0o").or_else(|| digits.strip_prefix("0O")) {
        (8, rest)
    } else {
        (10, digits)
    };
    i64::from_str_radix(body, radix).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::parse_int_value;

    #[test]
    fn int_values_across_radixes() {
        assert_eq!(parse_int_value("42"), 42);
        assert_eq!(parse_int_value("0xFF"), 255);
        assert_eq!(parse_int_value("0b11"), 3);
        assert_eq!(parse_int_value("0o17"), 15);
        assert_eq!(parse_int_value("42ULL"), 42);
        assert_eq!(parse_int_value("7l"), 7);
    }
}
