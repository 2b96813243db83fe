//! Expression analysis: validation of calls, field access and access
//! control, `self`/`super`, lambdas and capture collection. Every
//! analyzed expression's inferred type is recorded in the node-type map.

use std::collections::BTreeSet;

use btrc_parser::ast::{
    AssignOp, BinaryOp, Expr, ExprKind, FStringPart, LambdaBody, LambdaExpr, SizeofArg, TypeExpr,
};
use btrc_parser::visit::{walk_expr, Visitor};

use crate::builtins;
use crate::scope::{SymbolInfo, SymbolKind};
use crate::Analyzer;

/// Collects every identifier name in a subtree, in sorted order.
struct IdentCollector {
    names: BTreeSet<String>,
}

impl Visitor for IdentCollector {
    fn visit_expr(&mut self, expr: &Expr) {
        if let ExprKind::Ident { name } = &expr.kind {
            self.names.insert(name.clone());
        }
        walk_expr(self, expr);
    }
}

impl Analyzer {
    pub(crate) fn analyze_expr(&mut self, expr: &mut Expr) {
        let (line, col) = (expr.line, expr.col);
        match &mut expr.kind {
            ExprKind::IntLit { .. }
            | ExprKind::FloatLit { .. }
            | ExprKind::StringLit { .. }
            | ExprKind::CharLit { .. }
            | ExprKind::BoolLit { .. }
            | ExprKind::NullLit
            | ExprKind::Ident { .. } => {}
            ExprKind::SelfRef => self.validate_self(line, col),
            ExprKind::SuperRef => {
                let Some(class_name) = self.current_class.clone() else {
                    self.error("'super' can only be used inside a class", line, col);
                    return;
                };
                let has_parent = self
                    .class_table
                    .get(&class_name)
                    .is_some_and(|cls| cls.parent.is_some());
                if !has_parent {
                    self.error(
                        format!(
                            "'super' cannot be used in class '{class_name}' \
                             which does not extend another class"
                        ),
                        line,
                        col,
                    );
                }
            }
            ExprKind::Binary { op, left, right } => {
                let op = *op;
                self.analyze_expr(left);
                self.analyze_expr(right);
                if matches!(op, BinaryOp::Div | BinaryOp::Rem) && is_zero_literal(right) {
                    self.error("Division by zero", right.line, right.col);
                }
            }
            ExprKind::Unary { operand, .. } => self.analyze_expr(operand),
            ExprKind::Call { callee, args } => self.analyze_call(callee, args, line, col),
            ExprKind::Index { obj, index } => {
                self.analyze_expr(obj);
                self.analyze_expr(index);
            }
            ExprKind::FieldAccess {
                obj,
                field,
                optional,
                ..
            } => {
                let field = field.clone();
                let optional = *optional;
                self.analyze_expr(obj);
                self.check_field_access(obj, &field, optional, line, col);
            }
            ExprKind::Assign { target, op, value } => {
                let op = *op;
                self.analyze_expr(target);
                self.analyze_expr(value);
                if matches!(op, AssignOp::Div | AssignOp::Rem) && is_zero_literal(value) {
                    self.error("Division by zero", value.line, value.col);
                }
            }
            ExprKind::Ternary {
                condition,
                true_expr,
                false_expr,
            } => {
                self.analyze_expr(condition);
                self.analyze_expr(true_expr);
                self.analyze_expr(false_expr);
            }
            ExprKind::Cast {
                target_type,
                operand,
            } => {
                let target = target_type.clone();
                self.collect_generic_instances(&target);
                self.analyze_expr(operand);
            }
            ExprKind::Sizeof(arg) => match arg {
                SizeofArg::Type(ty) => {
                    let ty = ty.clone();
                    self.collect_generic_instances(&ty);
                }
                SizeofArg::Expr(inner) => self.analyze_expr(inner),
            },
            ExprKind::ListLit { elements } => {
                for el in elements.iter_mut() {
                    self.analyze_expr(el);
                }
                if elements.len() >= 2 {
                    if let Some(first_type) = self.infer_type(&elements[0]) {
                        for (i, el) in elements.iter().enumerate().skip(1) {
                            if let Some(el_type) = self.infer_type(el) {
                                if !self.types_compatible(&first_type, &el_type) {
                                    self.error(
                                        format!(
                                            "List element {i} has type '{}' but \
                                             expected '{}'",
                                            el_type.base, first_type.base
                                        ),
                                        el.line,
                                        el.col,
                                    );
                                }
                            }
                        }
                    }
                }
            }
            ExprKind::MapLit { entries } => {
                for entry in entries {
                    self.analyze_expr(&mut entry.key);
                    self.analyze_expr(&mut entry.value);
                }
            }
            ExprKind::BraceInit { elements } => {
                for el in elements {
                    self.analyze_expr(el);
                }
            }
            ExprKind::FString { parts } => {
                for part in parts {
                    if let FStringPart::Expr(inner) = part {
                        self.analyze_expr(inner);
                    }
                }
            }
            ExprKind::TupleLit { elements } => {
                for el in elements.iter_mut() {
                    self.analyze_expr(el);
                }
                let args: Vec<TypeExpr> = elements
                    .iter()
                    .map(|el| self.infer_type(el).unwrap_or_else(|| TypeExpr::named("int")))
                    .collect();
                let tuple_type = TypeExpr::named("Tuple").with_args(args);
                self.collect_generic_instances(&tuple_type);
            }
            ExprKind::Lambda(lambda) => self.analyze_lambda(lambda),
            ExprKind::New { ty, args } => {
                let ty = ty.clone();
                self.collect_generic_instances(&ty);
                for arg in args.iter_mut() {
                    self.analyze_expr(arg);
                }
                if self.class_table.contains_key(&ty.base) {
                    self.check_abstract_instantiation(&ty.base, line, col);
                    self.validate_constructor_args(&ty.base, args.len(), line, col);
                }
            }
            ExprKind::Spawn { callee } => {
                self.analyze_expr(callee);
                let ret = self.infer_spawn_return_type(callee);
                let thread_type = TypeExpr::named("Thread").with_args(vec![ret]);
                self.collect_generic_instances(&thread_type);
            }
        }

        if let Some(inferred) = self.infer_type(expr) {
            self.node_types.insert(expr.id, inferred);
        }
    }

    // ── Calls ──────────────────────────────────────────────────────────

    fn analyze_call(&mut self, callee: &mut Expr, args: &mut [Expr], line: u32, col: u32) {
        self.analyze_expr(callee);
        for arg in args.iter_mut() {
            self.analyze_expr(arg);
        }

        match &callee.kind {
            ExprKind::Ident { name } if self.class_table.contains_key(name) => {
                // `ClassName(...)` is a constructor call.
                let name = name.clone();
                self.check_abstract_instantiation(&name, line, col);
                self.validate_constructor_args(&name, args.len(), line, col);
            }
            ExprKind::Ident { name } => {
                if let Some(func) = self.function_table.get(name) {
                    if func.body.is_some() {
                        let fn_name = func.name.clone();
                        let required =
                            func.params.iter().filter(|p| p.default.is_none()).count();
                        let max = func.params.len();
                        self.validate_call_arity(&fn_name, required, max, args.len(), line, col);
                    }
                }
            }
            ExprKind::FieldAccess { obj, field, .. } => {
                if let Some(obj_type) = self.infer_type(obj) {
                    if let Some(cls) = self.class_table.get(&obj_type.base) {
                        if let Some(method) = cls.methods.get(field) {
                            let label = format!("{}.{}", cls.name, field);
                            let required =
                                method.params.iter().filter(|p| p.default.is_none()).count();
                            let max = method.params.len();
                            self.validate_call_arity(&label, required, max, args.len(), line, col);
                        }
                    }
                }
            }
            _ => {}
        }

        // Register generic instances produced by method return types
        // (e.g. Map<string, int>.keys() -> List<string>).
        if let ExprKind::FieldAccess { obj, field, .. } = &callee.kind {
            if let Some(obj_type) = self.infer_type(obj) {
                let mut resolved = None;
                if let Some(cls) = self.class_table.get(&obj_type.base) {
                    if let Some(method) = cls.methods.get(field) {
                        if !method.return_type.generic_args.is_empty()
                            && !cls.generic_params.is_empty()
                            && !obj_type.generic_args.is_empty()
                        {
                            let subs =
                                Self::generic_subs(&cls.generic_params, &obj_type.generic_args);
                            resolved = Some(self.substitute_type(&method.return_type, &subs));
                        }
                    }
                }
                if let Some(resolved) = resolved {
                    if !resolved.generic_args.is_empty() {
                        self.collect_generic_instances(&resolved);
                    }
                }
            }
        }
    }

    fn validate_call_arity(
        &mut self,
        name: &str,
        required: usize,
        max: usize,
        got: usize,
        line: u32,
        col: u32,
    ) {
        if got < required {
            self.error(
                format!("'{name}()' expects at least {required} argument(s) but got {got}"),
                line,
                col,
            );
        } else if got > max {
            self.error(
                format!("'{name}()' expects at most {max} argument(s) but got {got}"),
                line,
                col,
            );
        }
    }

    fn check_abstract_instantiation(&mut self, class_name: &str, line: u32, col: u32) {
        let is_abstract = self
            .class_table
            .get(class_name)
            .is_some_and(|cls| cls.is_abstract);
        if is_abstract {
            self.error(
                format!("Cannot instantiate abstract class '{class_name}'"),
                line,
                col,
            );
        }
    }

    /// Argument-count validation for `ClassName(...)` and `new T(...)`,
    /// accounting for parameter defaults.
    fn validate_constructor_args(&mut self, class_name: &str, got: usize, line: u32, col: u32) {
        let Some(cls) = self.class_table.get(class_name) else {
            return;
        };
        match &cls.constructor {
            None => {
                if got > 0 {
                    let name = cls.name.clone();
                    self.error(
                        format!(
                            "Class '{name}' has no constructor but was called with \
                             {got} argument(s)"
                        ),
                        line,
                        col,
                    );
                }
            }
            Some(ctor) => {
                let required = ctor.params.iter().filter(|p| p.default.is_none()).count();
                let max = ctor.params.len();
                let name = cls.name.clone();
                if got < required {
                    self.error(
                        format!(
                            "Constructor '{name}()' expects at least {required} \
                             argument(s) but got {got}"
                        ),
                        line,
                        col,
                    );
                } else if got > max {
                    self.error(
                        format!(
                            "Constructor '{name}()' expects at most {max} \
                             argument(s) but got {got}"
                        ),
                        line,
                        col,
                    );
                }
            }
        }
    }

    // ── Field access ───────────────────────────────────────────────────

    /// Access-control, member-existence, nullable-safety, and
    /// static-dispatch checks for `obj.field` (and `obj?.field`,
    /// `obj->field`).
    fn check_field_access(
        &mut self,
        obj: &Expr,
        field: &str,
        optional: bool,
        line: u32,
        col: u32,
    ) {
        let obj_type = self.infer_type(obj);

        if let Some(t) = &obj_type {
            if t.is_nullable && !optional {
                let base = t.base.clone();
                self.warning(
                    format!(
                        "Non-optional access '.{field}' on nullable type '{base}?'; \
                         use '?.{field}' or check for null"
                    ),
                    line,
                    col,
                );
            }

            // Built-in Thread<T> and Mutex<T> surfaces.
            if t.base == "Thread" {
                if !builtins::THREAD_METHODS.contains(&field) {
                    self.error(format!("Thread<T> has no method '{field}'"), line, col);
                }
                return;
            }
            if t.base == "Mutex" {
                if !builtins::MUTEX_METHODS.contains(&field) {
                    self.error(format!("Mutex<T> has no method '{field}'"), line, col);
                }
                return;
            }
        }

        if let Some(t) = &obj_type {
            enum Member {
                Property(btrc_parser::ast::Access),
                Field(btrc_parser::ast::Access),
                Method(btrc_parser::ast::Access),
                Missing,
            }
            let looked_up = self.class_table.get(&t.base).map(|cls| {
                let member = if let Some(prop) = cls.properties.get(field) {
                    Member::Property(prop.access)
                } else if let Some(field_decl) = cls.fields.get(field) {
                    Member::Field(field_decl.access)
                } else if let Some(method) = cls.methods.get(field) {
                    Member::Method(method.access)
                } else {
                    Member::Missing
                };
                (cls.name.clone(), member)
            });

            if let Some((cls_name, member)) = looked_up {
                let in_own_class = self.current_class.as_deref() == Some(cls_name.as_str());
                let private = btrc_parser::ast::Access::Private;
                match member {
                    Member::Property(access) => {
                        if access == private && !in_own_class {
                            self.error(
                                format!(
                                    "Cannot access private property '{field}' of class \
                                     '{cls_name}'"
                                ),
                                line,
                                col,
                            );
                        }
                    }
                    Member::Field(access) => {
                        if access == private && !in_own_class {
                            self.error(
                                format!(
                                    "Cannot access private field '{field}' of class \
                                     '{cls_name}'"
                                ),
                                line,
                                col,
                            );
                        }
                    }
                    Member::Method(access) => {
                        if access == private && !in_own_class {
                            self.error(
                                format!(
                                    "Cannot access private method '{field}' of class \
                                     '{cls_name}'"
                                ),
                                line,
                                col,
                            );
                        }
                    }
                    Member::Missing => {
                        self.error(
                            format!("Class '{cls_name}' has no field or method '{field}'"),
                            line,
                            col,
                        );
                    }
                }
                return;
            }
        }

        // Static access: `ClassName.method` is valid only for `class`
        // (static) methods.
        if let ExprKind::Ident { name } = &obj.kind {
            if let Some(cls) = self.class_table.get(name) {
                if let Some(method) = cls.methods.get(field) {
                    if method.access != btrc_parser::ast::Access::Class {
                        self.error(
                            format!(
                                "Method '{field}' is not a class method, \
                                 cannot call statically"
                            ),
                            line,
                            col,
                        );
                    }
                }
            }
        }
    }

    // ── self ───────────────────────────────────────────────────────────

    fn validate_self(&mut self, line: u32, col: u32) {
        if self.current_class.is_none() {
            self.error("'self' used outside of a class", line, col);
        } else if self.current_method.is_none() {
            self.error("'self' used outside of a method", line, col);
        } else if self
            .current_method
            .as_ref()
            .is_some_and(|m| m.access == btrc_parser::ast::Access::Class)
        {
            self.error("'self' cannot be used in a class (static) method", line, col);
        }
    }

    // ── Lambdas ────────────────────────────────────────────────────────

    /// Analyze a lambda body in its own scope, then populate its capture
    /// list: every identifier used in the body that is neither a
    /// parameter nor a global, resolved against the enclosing local
    /// scopes, sorted by name.
    fn analyze_lambda(&mut self, lambda: &mut LambdaExpr) {
        let prev_return_type = self.current_return_type.take();
        let outer_vars = self.scopes.outer_locals();

        self.scopes.push();
        let mut param_names: BTreeSet<String> = BTreeSet::new();
        for param in &mut lambda.params {
            param.ty = self.upgrade_class_type(&param.ty);
            self.collect_generic_instances(&param.ty.clone());
            self.scopes.define(SymbolInfo::new(
                param.name.clone(),
                param.ty.clone(),
                SymbolKind::Parameter,
            ));
            param_names.insert(param.name.clone());
        }
        if let Some(return_type) = &lambda.return_type {
            let upgraded = self.upgrade_class_type(&return_type.clone());
            self.collect_generic_instances(&upgraded);
            lambda.return_type = Some(upgraded.clone());
            self.current_return_type = Some(upgraded);
        }

        match &mut lambda.body {
            LambdaBody::Block(block) => self.analyze_block(block),
            LambdaBody::Expr(inner) => self.analyze_expr(inner),
        }

        let mut collector = IdentCollector {
            names: BTreeSet::new(),
        };
        match &lambda.body {
            LambdaBody::Block(block) => collector.visit_block(block),
            LambdaBody::Expr(inner) => collector.visit_expr(inner),
        }

        let mut captures = Vec::new();
        for name in collector.names {
            if param_names.contains(&name) {
                continue;
            }
            if let Some(sym) = outer_vars.get(&name) {
                captures.push(btrc_parser::ast::Capture {
                    name,
                    ty: sym.ty.clone(),
                });
            }
        }
        lambda.captures = captures;

        self.scopes.pop();
        self.current_return_type = prev_return_type;
    }
}

/// A literal integer or float zero, the divisor the division-by-zero
/// check rejects.
fn is_zero_literal(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::IntLit { value, .. } => *value == 0,
        ExprKind::FloatLit { value, .. } => *value == 0.0,
        _ => false,
    }
}

