//! Statement analysis: blocks, variable declarations, loops, switches,
//! and control-flow checks.

use btrc_parser::ast::{
    ExprKind, ForInit, ForInStmt, Stmt, StmtKind, SwitchStmt, TypeExpr, VarDeclStmt,
};
use rustc_hash::FxHashSet;

use crate::builtins;
use crate::scope::{SymbolInfo, SymbolKind};
use crate::Analyzer;

impl Analyzer {
    /// Analyze a block in its own scope, flagging unreachable code after
    /// a terminal statement.
    pub(crate) fn analyze_block(&mut self, block: &mut btrc_parser::ast::Block) {
        self.scopes.push();
        let mut found_terminal = false;
        for stmt in &mut block.statements {
            if found_terminal {
                self.error(
                    "Unreachable code after return/throw/break/continue",
                    stmt.line,
                    stmt.col,
                );
                break;
            }
            let terminal = matches!(
                stmt.kind,
                StmtKind::Return(_) | StmtKind::Break | StmtKind::Continue | StmtKind::Throw(_)
            );
            self.analyze_stmt(stmt);
            if terminal {
                found_terminal = true;
            }
        }
        self.scopes.pop();
    }

    pub(crate) fn analyze_stmt(&mut self, stmt: &mut Stmt) {
        let (line, col) = (stmt.line, stmt.col);
        match &mut stmt.kind {
            StmtKind::VarDecl(var) => self.analyze_var_decl(var),
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.analyze_expr(value);
                    let expected = self.current_return_type.clone();
                    if let Some(expected) = expected {
                        if expected.base != "void" {
                            if let Some(actual) = self.infer_type(value) {
                                if !self.types_compatible(&expected, &actual) {
                                    self.error(
                                        format!(
                                            "Return type mismatch: expected '{expected}' \
                                             but got '{actual}'"
                                        ),
                                        line,
                                        col,
                                    );
                                }
                            }
                        }
                    }
                }
            }
            StmtKind::If(if_stmt) => {
                self.analyze_expr(&mut if_stmt.condition);
                self.analyze_block(&mut if_stmt.then_block);
                match &mut if_stmt.else_branch {
                    Some(btrc_parser::ast::ElseBranch::ElseIf(inner)) => {
                        self.analyze_stmt(inner)
                    }
                    Some(btrc_parser::ast::ElseBranch::Else(block)) => {
                        self.analyze_block(block)
                    }
                    None => {}
                }
            }
            StmtKind::While { condition, body } => {
                self.analyze_expr(condition);
                self.loop_depth += 1;
                self.break_depth += 1;
                self.analyze_block(body);
                self.loop_depth -= 1;
                self.break_depth -= 1;
            }
            StmtKind::DoWhile { body, condition } => {
                self.loop_depth += 1;
                self.break_depth += 1;
                self.analyze_block(body);
                self.loop_depth -= 1;
                self.break_depth -= 1;
                self.analyze_expr(condition);
            }
            StmtKind::ForIn(for_in) => self.analyze_for_in(for_in, line, col),
            StmtKind::ParallelFor(for_in) => self.analyze_parallel_for(for_in, line, col),
            StmtKind::CFor(c_for) => {
                self.scopes.push();
                match &mut c_for.init {
                    Some(ForInit::Var(var)) => self.analyze_var_decl(var),
                    Some(ForInit::Expr(expr)) => self.analyze_expr(expr),
                    None => {}
                }
                if let Some(condition) = &mut c_for.condition {
                    self.analyze_expr(condition);
                }
                if let Some(update) = &mut c_for.update {
                    self.analyze_expr(update);
                }
                self.loop_depth += 1;
                self.break_depth += 1;
                self.analyze_block(&mut c_for.body);
                self.loop_depth -= 1;
                self.break_depth -= 1;
                self.scopes.pop();
            }
            StmtKind::Switch(switch) => self.analyze_switch(switch, line, col),
            StmtKind::Expr(expr)
            | StmtKind::Delete(expr)
            | StmtKind::Throw(expr)
            | StmtKind::Keep(expr)
            | StmtKind::Release(expr) => self.analyze_expr(expr),
            StmtKind::Block(block) => self.analyze_block(block),
            StmtKind::TryCatch(tc) => {
                self.analyze_block(&mut tc.try_block);
                self.scopes.push();
                // Caught values are always strings.
                self.scopes.define(SymbolInfo::new(
                    tc.catch_var.clone(),
                    TypeExpr::named("string"),
                    SymbolKind::Variable,
                ));
                self.analyze_block(&mut tc.catch_block);
                self.scopes.pop();
                if let Some(finally) = &mut tc.finally_block {
                    self.analyze_block(finally);
                }
            }
            StmtKind::Break => {
                if self.break_depth == 0 {
                    self.error("'break' statement outside of loop or switch", line, col);
                }
            }
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    self.error("'continue' statement outside of loop", line, col);
                }
            }
        }
    }

    // ── Switches ───────────────────────────────────────────────────────

    fn analyze_switch(&mut self, switch: &mut SwitchStmt, line: u32, col: u32) {
        self.analyze_expr(&mut switch.value);
        self.break_depth += 1;
        let mut has_default = false;
        for case in &mut switch.cases {
            match &mut case.value {
                Some(value) => self.analyze_expr(value),
                None => has_default = true,
            }
            for stmt in &mut case.body {
                self.analyze_stmt(stmt);
            }
        }
        self.break_depth -= 1;

        // Without a default, a switch on an enum must cover every value.
        if !has_default {
            let Some(val_type) = self.infer_type(&switch.value) else {
                return;
            };
            let Some(enum_values) = self.enum_table.get(&val_type.base) else {
                return;
            };
            let covered: FxHashSet<&str> = switch
                .cases
                .iter()
                .filter_map(|case| case.value.as_ref())
                .filter_map(|value| match &value.kind {
                    ExprKind::Ident { name } => Some(name.as_str()),
                    _ => None,
                })
                .collect();
            let mut missing: Vec<&str> = enum_values
                .iter()
                .map(String::as_str)
                .filter(|v| !covered.contains(v))
                .collect();
            if !missing.is_empty() {
                missing.sort_unstable();
                let names = missing.join(", ");
                let base = val_type.base.clone();
                self.error(
                    format!("Switch on enum '{base}' is not exhaustive, missing: {names}"),
                    line,
                    col,
                );
            }
        }
    }

    // ── Variable declarations ──────────────────────────────────────────

    pub(crate) fn analyze_var_decl(&mut self, stmt: &mut VarDeclStmt) {
        if let Some(declared) = stmt.ty.clone() {
            let declared = self.upgrade_class_type(&declared);
            self.collect_generic_instances(&declared);
            if let Some(initializer) = &mut stmt.initializer {
                self.analyze_expr(initializer);
                if let Some(init_type) = self.infer_type(initializer) {
                    if init_type.base == "void" && init_type.pointer_depth == 0 {
                        self.error(
                            format!(
                                "Cannot assign void expression to variable '{}'",
                                stmt.name
                            ),
                            stmt.line,
                            stmt.col,
                        );
                    } else if !self.types_compatible(&declared, &init_type) {
                        // Empty collection literals adopt the declared type.
                        let is_empty_literal = match &initializer.kind {
                            ExprKind::ListLit { elements } => elements.is_empty(),
                            ExprKind::MapLit { entries } => entries.is_empty(),
                            _ => false,
                        };
                        if !is_empty_literal {
                            self.error(
                                format!(
                                    "Cannot assign '{}' to variable '{}' of type '{}'",
                                    init_type.base, stmt.name, declared.base
                                ),
                                stmt.line,
                                stmt.col,
                            );
                        }
                    }
                }
            }
            self.define_var(&stmt.name, declared.clone());
            stmt.ty = Some(declared);
            return;
        }

        {
            let Some(initializer) = &mut stmt.initializer else {
                // The parser rejects this form, but hand-built ASTs may
                // still reach here.
                self.error(
                    format!("'var' declaration of '{}' requires an initializer", stmt.name),
                    stmt.line,
                    stmt.col,
                );
                stmt.ty = Some(TypeExpr::named("int"));
                self.define_var(&stmt.name, TypeExpr::named("int"));
                return;
            };
            self.analyze_expr(initializer);
            let Some(inferred) = self.infer_type(initializer) else {
                self.error(
                    format!("Cannot infer type for 'var' declaration of '{}'", stmt.name),
                    stmt.line,
                    stmt.col,
                );
                stmt.ty = Some(TypeExpr::named("int"));
                self.define_var(&stmt.name, TypeExpr::named("int"));
                return;
            };
            let mut ty = inferred;
            if ty.pointer_depth == 0 && self.class_table.contains_key(&ty.base) {
                ty = self.upgrade_class_type(&ty);
            }
            self.check_alias_warning(stmt);
            self.collect_generic_instances(&ty);
            stmt.ty = Some(ty.clone());
            self.define_var(&stmt.name, ty);
        }
    }

    fn define_var(&mut self, name: &str, ty: TypeExpr) {
        self.scopes
            .define(SymbolInfo::new(name, ty, SymbolKind::Variable));
    }

    /// Warn when a variable is initialized by aliasing a managed
    /// (class-typed) variable without `keep`.
    fn check_alias_warning(&mut self, stmt: &VarDeclStmt) {
        let Some(initializer) = &stmt.initializer else {
            return;
        };
        let ExprKind::Ident { name: src_name } = &initializer.kind else {
            return;
        };
        let Some(src_sym) = self.scopes.lookup(src_name) else {
            return;
        };
        if !self.class_table.contains_key(&src_sym.ty.base) {
            return;
        }
        let src_name = src_name.clone();
        self.warning(
            format!(
                "Aliasing managed variable '{src_name}': '{0}' shares the same \
                 reference without incrementing refcount. Use 'keep {0};' if both \
                 variables should own the object",
                stmt.name
            ),
            stmt.line,
            stmt.col,
        );
    }

    // ── For loops ──────────────────────────────────────────────────────

    fn analyze_for_in(&mut self, stmt: &mut ForInStmt, line: u32, col: u32) {
        self.analyze_expr(&mut stmt.iterable);
        self.loop_depth += 1;
        self.break_depth += 1;

        // The built-in range(...) iterates ints.
        if builtins::is_range_call(&stmt.iterable) {
            self.scopes.push();
            self.define_var(&stmt.var_name.clone(), TypeExpr::named("int"));
            self.analyze_block(&mut stmt.body);
            self.scopes.pop();
            self.loop_depth -= 1;
            self.break_depth -= 1;
            return;
        }

        let iter_type = self.infer_type(&stmt.iterable);

        // Map-style iteration: a type with two or more generic arguments
        // that either is unknown or provides `iterValueAt`. The first
        // argument binds the key variable, the second the value.
        let keyed = iter_type.as_ref().filter(|t| {
            t.generic_args.len() >= 2
                && self
                    .class_table
                    .get(&t.base)
                    .map_or(true, |cls| cls.methods.contains_key("iterValueAt"))
        });
        if let Some(t) = keyed {
            let key_type = t.generic_args[0].clone();
            let val_type = t.generic_args[1].clone();
            self.scopes.push();
            self.define_var(&stmt.var_name.clone(), key_type);
            if let Some(var2) = stmt.var_name2.clone() {
                self.define_var(&var2, val_type);
            }
            self.analyze_block(&mut stmt.body);
            self.scopes.pop();
            self.loop_depth -= 1;
            self.break_depth -= 1;
            return;
        }

        if stmt.var_name2.is_some() {
            let shown = iter_type
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            self.error(
                format!("Two-variable for-in iteration requires a Map type, got '{shown}'"),
                line,
                col,
            );
        }

        let elem_type = self.element_type(iter_type.as_ref(), line, col);
        self.scopes.push();
        if let Some(elem) = elem_type {
            self.define_var(&stmt.var_name.clone(), elem);
        }
        self.analyze_block(&mut stmt.body);
        self.scopes.pop();
        self.loop_depth -= 1;
        self.break_depth -= 1;
    }

    fn analyze_parallel_for(&mut self, stmt: &mut ForInStmt, line: u32, col: u32) {
        self.analyze_expr(&mut stmt.iterable);
        let iter_type = self.infer_type(&stmt.iterable);
        let elem_type = self.element_type(iter_type.as_ref(), line, col);
        self.loop_depth += 1;
        self.break_depth += 1;
        self.scopes.push();
        if let Some(elem) = elem_type {
            self.define_var(&stmt.var_name.clone(), elem);
        }
        self.analyze_block(&mut stmt.body);
        self.scopes.pop();
        self.loop_depth -= 1;
        self.break_depth -= 1;
    }
}
