//! Per-expression type inference.
//!
//! `infer_type` is best-effort and lazy: it consults the scope stack,
//! the declaration tables, and the intrinsics table, and returns `None`
//! when a type cannot be determined. Declared (not inferred) return
//! types are authoritative for calls, which keeps the mutual recursion
//! between inference and body analysis well-founded.

use btrc_parser::ast::{
    BinaryOp, Expr, ExprKind, LambdaBody, LambdaExpr, StmtKind, TypeExpr,
};

use crate::builtins;
use crate::Analyzer;

impl Analyzer {
    /// Best-effort type inference. Returns `None` if unknown.
    pub(crate) fn infer_type(&self, expr: &Expr) -> Option<TypeExpr> {
        match &expr.kind {
            ExprKind::IntLit { .. } => Some(TypeExpr::named("int")),
            ExprKind::FloatLit { .. } => Some(TypeExpr::named("float")),
            ExprKind::StringLit { .. } => Some(TypeExpr::named("string")),
            ExprKind::CharLit { .. } => Some(TypeExpr::named("char")),
            ExprKind::BoolLit { .. } => Some(TypeExpr::named("bool")),
            ExprKind::FString { .. } => Some(TypeExpr::named("string")),
            ExprKind::Sizeof(_) => Some(TypeExpr::named("int")),
            ExprKind::NullLit => Some(TypeExpr::named("void").with_pointer(1).nullable()),
            ExprKind::Ident { name } => self.scopes.lookup(name).map(|sym| sym.ty.clone()),
            ExprKind::SelfRef => self
                .current_class
                .as_ref()
                .map(|name| TypeExpr::named(name.clone()).with_pointer(1)),
            ExprKind::SuperRef => None,
            ExprKind::FieldAccess { obj, field, .. } => {
                self.infer_field_access_type(obj, field)
            }
            ExprKind::Call { callee, args } => self.infer_call_type(callee, args),
            ExprKind::New { ty, .. } => Some(
                TypeExpr::named(ty.base.clone())
                    .with_args(ty.generic_args.clone())
                    .with_pointer(1),
            ),
            ExprKind::Index { obj, .. } => {
                let obj_type = self.infer_type(obj)?;
                match obj_type.generic_args.len() {
                    // One-arg containers (Vector, Set): the element type.
                    1 => Some(obj_type.generic_args[0].clone()),
                    // Two-arg containers (Map): the value type.
                    2 => Some(obj_type.generic_args[1].clone()),
                    _ => None,
                }
            }
            ExprKind::Binary { op, left, right } => self.infer_binary_type(*op, left, right),
            ExprKind::Cast { target_type, .. } => Some(target_type.clone()),
            ExprKind::Unary { operand, .. } => self.infer_type(operand),
            ExprKind::Ternary { true_expr, .. } => self.infer_type(true_expr),
            ExprKind::Assign { target, .. } => self.infer_type(target),
            ExprKind::Lambda(lambda) => {
                let ret = lambda
                    .return_type
                    .clone()
                    .unwrap_or_else(|| self.infer_lambda_return(lambda));
                let mut args = vec![ret];
                args.extend(lambda.params.iter().map(|p| p.ty.clone()));
                Some(TypeExpr::named("__fn_ptr").with_args(args))
            }
            ExprKind::TupleLit { elements } => {
                let args = elements
                    .iter()
                    .map(|el| self.infer_type(el).unwrap_or_else(|| TypeExpr::named("int")))
                    .collect();
                Some(TypeExpr::named("Tuple").with_args(args))
            }
            ExprKind::ListLit { elements } => {
                let elem = elements
                    .first()
                    .and_then(|el| self.infer_type(el))
                    .unwrap_or_else(|| TypeExpr::named("int"));
                Some(TypeExpr::named("Vector").with_args(vec![elem]))
            }
            ExprKind::MapLit { entries } => {
                if let Some(entry) = entries.first() {
                    if let (Some(key), Some(value)) =
                        (self.infer_type(&entry.key), self.infer_type(&entry.value))
                    {
                        return Some(TypeExpr::named("Map").with_args(vec![key, value]));
                    }
                }
                Some(TypeExpr::named("Map").with_args(vec![
                    TypeExpr::named("string"),
                    TypeExpr::named("int"),
                ]))
            }
            ExprKind::Spawn { callee } => {
                let ret = self.infer_spawn_return_type(callee);
                Some(
                    TypeExpr::named("Thread")
                        .with_args(vec![ret])
                        .with_pointer(1),
                )
            }
            ExprKind::BraceInit { elements } => {
                elements.first().and_then(|el| self.infer_type(el))
            }
        }
    }

    /// Field access: rich-enum `tag` and payload fields, then class
    /// fields and properties with generic substitution.
    fn infer_field_access_type(&self, obj: &Expr, field: &str) -> Option<TypeExpr> {
        let obj_type = self.infer_type(obj);

        if let Some(t) = &obj_type {
            if self.rich_enum_table.contains_key(&t.base) {
                // The discriminant reads as a plain int.
                if field == "tag" {
                    return Some(TypeExpr::named("int"));
                }
                return None;
            }
        }

        // Variant payload chain: `e.data.Variant.field` where `e` is a
        // rich-enum value.
        if let ExprKind::FieldAccess {
            obj: data_expr,
            field: variant_name,
            ..
        } = &obj.kind
        {
            if let ExprKind::FieldAccess { obj: holder, .. } = &data_expr.kind {
                if matches!(
                    holder.kind,
                    ExprKind::Ident { .. } | ExprKind::FieldAccess { .. }
                ) {
                    if let Some(s_type) = self.infer_type(holder) {
                        if let Some(decl) = self.rich_enum_table.get(&s_type.base) {
                            for variant in &decl.variants {
                                if &variant.name == variant_name {
                                    for param in &variant.params {
                                        if param.name == field {
                                            return Some(param.ty.clone());
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        let t = obj_type?;
        let cls = self.class_table.get(&t.base)?;
        let field_type = if let Some(prop) = cls.properties.get(field) {
            prop.ty.clone()
        } else if let Some(fd) = cls.fields.get(field) {
            fd.ty.clone()
        } else {
            return None;
        };
        if !cls.generic_params.is_empty() && !t.generic_args.is_empty() {
            let subs = Self::generic_subs(&cls.generic_params, &t.generic_args);
            if let Some(resolved) = subs.get(&field_type.base) {
                return Some(resolved.clone());
            }
        }
        Some(field_type)
    }

    /// Calls: constructor calls yield `ClassName*`; function and method
    /// calls yield the declared return type, with generic substitution
    /// for methods on generic classes; intrinsics come from
    /// [`builtins`].
    fn infer_call_type(&self, callee: &Expr, args: &[Expr]) -> Option<TypeExpr> {
        if let ExprKind::Ident { name } = &callee.kind {
            // Mutex(v) -> Mutex<T>* where T is the type of v.
            if name == "Mutex" && !args.is_empty() {
                let arg = self
                    .infer_type(&args[0])
                    .unwrap_or_else(|| TypeExpr::named("int"));
                return Some(
                    TypeExpr::named("Mutex")
                        .with_args(vec![arg])
                        .with_pointer(1),
                );
            }
            if self.class_table.contains_key(name) {
                return Some(TypeExpr::named(name.clone()).with_pointer(1));
            }
            if let Some(func) = self.function_table.get(name) {
                return Some(func.return_type.clone());
            }
        }

        if let ExprKind::FieldAccess { obj, field, .. } = &callee.kind {
            let obj_type = self.infer_type(obj);

            if let Some(t) = &obj_type {
                let numeric = ["int", "float", "double", "long", "bool"];
                if numeric.contains(&t.base.as_str()) && t.pointer_depth == 0 {
                    if let Some(ret) = builtins::numeric_method_return_type(field) {
                        return Some(ret);
                    }
                }
                if t.base == "string" || (t.base == "char" && t.pointer_depth >= 1) {
                    return builtins::string_method_return_type(field);
                }
                if t.base == "Thread" && !t.generic_args.is_empty() && field == "join" {
                    return Some(t.generic_args[0].clone());
                }
                if t.base == "Mutex" && !t.generic_args.is_empty() {
                    if field == "get" {
                        return Some(t.generic_args[0].clone());
                    }
                    if field == "set" || field == "destroy" {
                        return Some(TypeExpr::named("void"));
                    }
                }
                if let Some(cls) = self.class_table.get(&t.base) {
                    if let Some(method) = cls.methods.get(field) {
                        if !cls.generic_params.is_empty() && !t.generic_args.is_empty() {
                            let subs =
                                Self::generic_subs(&cls.generic_params, &t.generic_args);
                            return Some(self.substitute_type(&method.return_type, &subs));
                        }
                        return Some(method.return_type.clone());
                    }
                }
            }

            // Static call: ClassName.method().
            if let ExprKind::Ident { name } = &obj.kind {
                if let Some(cls) = self.class_table.get(name) {
                    if let Some(method) = cls.methods.get(field) {
                        return Some(method.return_type.clone());
                    }
                }
            }
        }

        None
    }

    /// Binary operators: comparisons and logical operators yield `bool`;
    /// arithmetic promotes along `int < long < float < double`.
    fn infer_binary_type(&self, op: BinaryOp, left: &Expr, right: &Expr) -> Option<TypeExpr> {
        if op.is_comparison() {
            return Some(TypeExpr::named("bool"));
        }
        let left_type = self.infer_type(left);
        let right_type = self.infer_type(right);
        if let (Some(l), Some(r)) = (&left_type, &right_type) {
            if l.base == "double" || r.base == "double" {
                return Some(TypeExpr::named("double"));
            }
            if l.base == "float" || r.base == "float" {
                return Some(TypeExpr::named("float"));
            }
            if l.base == "long" || r.base == "long" {
                return Some(TypeExpr::named("long"));
            }
            if l.base == "int" && r.base == "int" {
                return Some(TypeExpr::named("int"));
            }
        }
        left_type.or(right_type)
    }

    /// Infer a lambda's return type from its body; defaults to `int`.
    pub(crate) fn infer_lambda_return(&self, lambda: &LambdaExpr) -> TypeExpr {
        match &lambda.body {
            LambdaBody::Block(block) => {
                for stmt in &block.statements {
                    if let StmtKind::Return(Some(value)) = &stmt.kind {
                        if let Some(t) = self.infer_type(value) {
                            return t;
                        }
                    }
                }
            }
            LambdaBody::Expr(expr) => {
                if let Some(t) = self.infer_type(expr) {
                    return t;
                }
            }
        }
        TypeExpr::named("int")
    }

    /// Return type of a spawned callable (usually a lambda).
    pub(crate) fn infer_spawn_return_type(&self, callee: &Expr) -> TypeExpr {
        if let ExprKind::Lambda(lambda) = &callee.kind {
            return lambda
                .return_type
                .clone()
                .unwrap_or_else(|| self.infer_lambda_return(lambda));
        }
        if let Some(t) = self.infer_type(callee) {
            if t.base == "__fn_ptr" && !t.generic_args.is_empty() {
                return t.generic_args[0].clone();
            }
        }
        TypeExpr::named("void")
    }

    /// Element type for for-in iteration, or `None` with a diagnostic
    /// when the iterable cannot produce elements.
    pub(crate) fn element_type(
        &mut self,
        iter_type: Option<&TypeExpr>,
        line: u32,
        col: u32,
    ) -> Option<TypeExpr> {
        let iter_type = iter_type?;

        // Strings iterate as chars.
        if iter_type.base == "string"
            || (iter_type.base == "char" && iter_type.pointer_depth >= 1)
        {
            return Some(TypeExpr::named("char"));
        }

        // A generic user class with an `iterGet` method is iterable; the
        // element type is iterGet's return with the instance's arguments
        // substituted through.
        if !iter_type.generic_args.is_empty() {
            if let Some(cls) = self.class_table.get(&iter_type.base) {
                if let Some(method) = cls.methods.get("iterGet") {
                    let ret = method.return_type.clone();
                    if !cls.generic_params.is_empty() {
                        let subs = Self::generic_subs(
                            &cls.generic_params.clone(),
                            &iter_type.generic_args,
                        );
                        return Some(self.substitute_type(&ret, &subs));
                    }
                    return Some(ret);
                }
            }
        }

        if self.class_table.contains_key(&iter_type.base) {
            self.error(
                format!("Type '{}' is not iterable", iter_type.base),
                line,
                col,
            );
            return None;
        }
        if matches!(iter_type.base.as_str(), "int" | "float" | "double" | "bool") {
            self.error(
                format!("Type '{}' is not iterable", iter_type.base),
                line,
                col,
            );
            return None;
        }
        None
    }
}
