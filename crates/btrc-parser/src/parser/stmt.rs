//! Statement parsing: blocks, dispatch, variable-declaration lookahead,
//! and control flow.

use btrc_common::token::TokenKind;

use super::Parser;
use crate::ast::{
    Block, CaseClause, CForStmt, ElseBranch, ForInit, ForInStmt, IfStmt, Stmt, StmtKind,
    SwitchStmt, TryCatchStmt, VarDeclStmt,
};
use crate::error::ParseError;

impl Parser {
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let tok = self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Block {
            statements,
            line: tok.line,
            col: tok.col,
        })
    }

    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.peek().clone();
        let (line, col) = (tok.line, tok.col);

        let kind = match tok.kind {
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Return => self.parse_return_stmt()?,
            TokenKind::If => self.parse_if_stmt()?,
            TokenKind::While => self.parse_while_stmt()?,
            TokenKind::Do => self.parse_do_while_stmt()?,
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::Parallel => self.parse_parallel_for_stmt()?,
            TokenKind::Switch => self.parse_switch_stmt()?,
            TokenKind::Break => {
                self.advance();
                self.expect(TokenKind::Semicolon, "';'")?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(TokenKind::Semicolon, "';'")?;
                StmtKind::Continue
            }
            TokenKind::Try => self.parse_try_catch()?,
            TokenKind::Throw => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "';'")?;
                StmtKind::Throw(expr)
            }
            TokenKind::Delete => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "';'")?;
                StmtKind::Delete(expr)
            }
            TokenKind::Keep => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "';'")?;
                StmtKind::Keep(expr)
            }
            TokenKind::Release => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "';'")?;
                StmtKind::Release(expr)
            }
            _ => {
                if self.is_var_decl_start() {
                    StmtKind::VarDecl(self.parse_var_decl()?)
                } else {
                    let expr = self.parse_expr()?;
                    self.expect(TokenKind::Semicolon, "';'")?;
                    StmtKind::Expr(expr)
                }
            }
        };

        Ok(Stmt { kind, line, col })
    }

    // ── Variable declaration detection ─────────────────────────────────

    /// Bounded lookahead: does the current position start a variable
    /// declaration (`type name ...`)?
    pub(crate) fn is_var_decl_start(&mut self) -> bool {
        let kind = self.peek().kind;

        if kind == TokenKind::Var {
            return true;
        }
        if matches!(
            kind,
            TokenKind::Const | TokenKind::Static | TokenKind::Extern | TokenKind::Volatile
        ) {
            return true;
        }
        if kind.is_type_keyword() || kind == TokenKind::Ident {
            return self.lookahead_is_var_decl();
        }
        if kind == TokenKind::LParen && self.is_tuple_type_start() {
            return self.lookahead_is_var_decl();
        }
        false
    }

    /// From the current position, try to skip a `type name` pattern.
    fn lookahead_is_var_decl(&mut self) -> bool {
        if self.check(TokenKind::Var) {
            return true;
        }
        let save = self.mark();

        // Skip qualifiers.
        while matches!(
            self.kind_at(self.pos),
            TokenKind::Const | TokenKind::Static | TokenKind::Extern | TokenKind::Volatile
        ) {
            self.pos += 1;
        }

        match self.kind_at(self.pos) {
            TokenKind::LParen => {
                // Tuple type: skip to the matching close paren.
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
                let result = self.kind_at(self.pos) == TokenKind::Ident;
                self.rewind(save);
                return result;
            }
            TokenKind::Unsigned | TokenKind::Signed => {
                self.pos += 1;
                if matches!(
                    self.kind_at(self.pos),
                    TokenKind::Int | TokenKind::Short | TokenKind::Long | TokenKind::Char
                ) {
                    self.pos += 1;
                }
            }
            TokenKind::Long | TokenKind::Short => {
                self.pos += 1;
                if matches!(
                    self.kind_at(self.pos),
                    TokenKind::Int | TokenKind::Long | TokenKind::Double
                ) {
                    self.pos += 1;
                }
            }
            TokenKind::Struct | TokenKind::Enum | TokenKind::Union => {
                self.pos += 1;
                if self.kind_at(self.pos) == TokenKind::Ident {
                    self.pos += 1;
                }
            }
            kind if kind.is_type_keyword() || kind == TokenKind::Ident => {
                self.pos += 1;
            }
            _ => {
                self.rewind(save);
                return false;
            }
        }

        // Skip generic arguments.
        if self.kind_at(self.pos) == TokenKind::Lt {
            let mut depth = 1i32;
            self.pos += 1;
            while self.kind_at(self.pos) != TokenKind::Eof && depth > 0 {
                match self.kind_at(self.pos) {
                    TokenKind::Lt => depth += 1,
                    TokenKind::Gt => depth -= 1,
                    TokenKind::GtGt => depth -= 2,
                    TokenKind::Semicolon | TokenKind::LBrace => {
                        self.rewind(save);
                        return false;
                    }
                    _ => {}
                }
                self.pos += 1;
            }
            if depth > 0 {
                self.rewind(save);
                return false;
            }
        }

        // Skip `[]`.
        if self.kind_at(self.pos) == TokenKind::LBracket
            && self.kind_at(self.pos + 1) == TokenKind::RBracket
        {
            self.pos += 2;
        }

        // Skip pointer stars.
        while self.kind_at(self.pos) == TokenKind::Star {
            self.pos += 1;
        }

        let result = self.kind_at(self.pos) == TokenKind::Ident;
        self.rewind(save);
        result
    }

    // ── Variable declaration ───────────────────────────────────────────

    /// Parse a variable declaration statement. `var` requires an
    /// initializer; the declared type stays `None` for the analyzer to
    /// fill in.
    pub(crate) fn parse_var_decl(&mut self) -> Result<VarDeclStmt, ParseError> {
        let tok = self.peek().clone();

        if self.check(TokenKind::Var) {
            self.advance();
            let name = self.expect(TokenKind::Ident, "variable name")?.text;
            self.expect(TokenKind::Eq, "'=' (var requires an initializer)")?;
            let initializer = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "';'")?;
            return Ok(VarDeclStmt {
                ty: None,
                name,
                initializer: Some(initializer),
                line: tok.line,
                col: tok.col,
            });
        }

        let mut ty = self.parse_type_expr()?;
        let name = self.expect(TokenKind::Ident, "variable name")?.text;
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
        let initializer = if self.eat(TokenKind::Eq).is_some() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(VarDeclStmt {
            ty: Some(ty),
            name,
            initializer,
            line: tok.line,
            col: tok.col,
        })
    }

    // ── Control flow ───────────────────────────────────────────────────

    fn parse_return_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::Return, "'return'")?;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(StmtKind::Return(value))
    }

    fn parse_if_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::If, "'if'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_block = self.parse_block()?;
        let else_branch = if self.eat(TokenKind::Else).is_some() {
            if self.check(TokenKind::If) {
                let tok = self.peek().clone();
                let kind = self.parse_if_stmt()?;
                Some(ElseBranch::ElseIf(Box::new(Stmt {
                    kind,
                    line: tok.line,
                    col: tok.col,
                })))
            } else {
                Some(ElseBranch::Else(self.parse_block()?))
            }
        } else {
            None
        };
        Ok(StmtKind::If(IfStmt {
            condition,
            then_block,
            else_branch,
        }))
    }

    fn parse_while_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::While, "'while'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(StmtKind::While { condition, body })
    }

    fn parse_do_while_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::Do, "'do'")?;
        let body = self.parse_block()?;
        self.expect(TokenKind::While, "'while'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(StmtKind::DoWhile { body, condition })
    }

    /// Disambiguate the three `for` forms: single-variable for-in,
    /// two-variable (map-style) for-in, and C-style for.
    fn parse_for_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::For, "'for'")?;

        // `for x in ...`
        if self.check(TokenKind::Ident) && self.peek_at(1).kind == TokenKind::In {
            let var_name = self.advance().text;
            self.expect(TokenKind::In, "'in'")?;
            let iterable = self.parse_expr()?;
            let body = self.parse_block()?;
            return Ok(StmtKind::ForIn(ForInStmt {
                var_name,
                var_name2: None,
                iterable,
                body,
            }));
        }

        // `for k, v in ...`
        if self.check(TokenKind::Ident)
            && self.peek_at(1).kind == TokenKind::Comma
            && self.peek_at(2).kind == TokenKind::Ident
            && self.peek_at(3).kind == TokenKind::In
        {
            let var_name = self.advance().text;
            self.expect(TokenKind::Comma, "','")?;
            let var_name2 = self.advance().text;
            self.expect(TokenKind::In, "'in'")?;
            let iterable = self.parse_expr()?;
            let body = self.parse_block()?;
            return Ok(StmtKind::ForIn(ForInStmt {
                var_name,
                var_name2: Some(var_name2),
                iterable,
                body,
            }));
        }

        // C-style `for (init; cond; update)`.
        self.expect(TokenKind::LParen, "'('")?;

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else if self.is_var_decl_start() {
            let start = self.peek().clone();
            if self.check(TokenKind::Var) {
                self.advance();
                let name = self.expect(TokenKind::Ident, "variable name")?.text;
                self.expect(TokenKind::Eq, "'=' (var requires an initializer)")?;
                let initializer = self.parse_expr()?;
                Some(ForInit::Var(VarDeclStmt {
                    ty: None,
                    name,
                    initializer: Some(initializer),
                    line: start.line,
                    col: start.col,
                }))
            } else {
                let ty = self.parse_type_expr()?;
                let name = self.expect(TokenKind::Ident, "variable name")?.text;
                let initializer = if self.eat(TokenKind::Eq).is_some() {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                Some(ForInit::Var(VarDeclStmt {
                    ty: Some(ty),
                    name,
                    initializer,
                    line: start.line,
                    col: start.col,
                }))
            }
        } else {
            Some(ForInit::Expr(self.parse_expr()?))
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RParen, "')'")?;

        let body = self.parse_block()?;
        Ok(StmtKind::CFor(CForStmt {
            init,
            condition,
            update,
            body,
        }))
    }

    fn parse_parallel_for_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::Parallel, "'parallel'")?;
        self.expect(TokenKind::For, "'for'")?;
        let var_name = self.expect(TokenKind::Ident, "loop variable")?.text;
        self.expect(TokenKind::In, "'in'")?;
        let iterable = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(StmtKind::ParallelFor(ForInStmt {
            var_name,
            var_name2: None,
            iterable,
            body,
        }))
    }

    fn parse_switch_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::Switch, "'switch'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut cases = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            cases.push(self.parse_case_clause()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(StmtKind::Switch(SwitchStmt { value, cases }))
    }

    fn parse_case_clause(&mut self) -> Result<CaseClause, ParseError> {
        let tok = self.peek().clone();
        let value = if self.eat(TokenKind::Case).is_some() {
            Some(self.parse_expr()?)
        } else if self.eat(TokenKind::Default).is_some() {
            None
        } else {
            return Err(self.error(format!(
                "Expected 'case' or 'default', got '{}'",
                tok.text
            )));
        };
        self.expect(TokenKind::Colon, "':'")?;
        let mut body = Vec::new();
        while !self.check_any(&[TokenKind::Case, TokenKind::Default, TokenKind::RBrace])
            && !self.at_end()
        {
            body.push(self.parse_statement()?);
        }
        Ok(CaseClause {
            value,
            body,
            line: tok.line,
            col: tok.col,
        })
    }

    fn parse_try_catch(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::Try, "'try'")?;
        let try_block = self.parse_block()?;
        self.expect(TokenKind::Catch, "'catch'")?;
        self.expect(TokenKind::LParen, "'('")?;
        // Optional type annotation on the catch variable (consumed, not
        // stored; catch variables are always strings).
        if self.is_type_start() && self.peek_at(1).kind == TokenKind::Ident {
            self.parse_type_expr()?;
        }
        let catch_var = self.expect(TokenKind::Ident, "catch variable")?.text;
        self.expect(TokenKind::RParen, "')'")?;
        let catch_block = self.parse_block()?;
        let finally_block = if self.eat(TokenKind::Finally).is_some() {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(StmtKind::TryCatch(TryCatchStmt {
            try_block,
            catch_var,
            catch_block,
            finally_block,
        }))
    }
}
