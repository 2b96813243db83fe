//! Read-only AST traversal.
//!
//! [`Visitor`] implementations override the `visit_*` hooks they care
//! about and delegate to the `walk_*` functions to descend into children.
//! The default hooks visit the entire subtree, so a visitor that only
//! overrides `visit_expr` still sees every expression in the program,
//! including those nested in declarations and statement lists.

use crate::ast::*;

/// A read-only AST visitor. Override the hooks you need; call the
/// matching `walk_*` function inside an override to keep descending.
pub trait Visitor {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_decl(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_type(&mut self, _ty: &TypeExpr) {}
}

pub fn walk_program<V: Visitor + ?Sized>(v: &mut V, program: &Program) {
    for decl in &program.declarations {
        v.visit_decl(decl);
    }
}

pub fn walk_decl<V: Visitor + ?Sized>(v: &mut V, decl: &Decl) {
    match decl {
        Decl::Preprocessor(_) => {}
        Decl::Class(class) => {
            for member in &class.members {
                match member {
                    ClassMember::Field(field) => {
                        v.visit_type(&field.ty);
                        if let Some(init) = &field.initializer {
                            v.visit_expr(init);
                        }
                    }
                    ClassMember::Method(method) => {
                        v.visit_type(&method.return_type);
                        for param in &method.params {
                            v.visit_type(&param.ty);
                            if let Some(default) = &param.default {
                                v.visit_expr(default);
                            }
                        }
                        if let Some(body) = &method.body {
                            v.visit_block(body);
                        }
                    }
                    ClassMember::Property(prop) => {
                        v.visit_type(&prop.ty);
                        if let Some(body) = &prop.getter_body {
                            v.visit_block(body);
                        }
                        if let Some(body) = &prop.setter_body {
                            v.visit_block(body);
                        }
                    }
                }
            }
        }
        Decl::Interface(iface) => {
            for sig in &iface.methods {
                v.visit_type(&sig.return_type);
                for param in &sig.params {
                    v.visit_type(&param.ty);
                }
            }
        }
        Decl::Function(func) => {
            v.visit_type(&func.return_type);
            for param in &func.params {
                v.visit_type(&param.ty);
                if let Some(default) = &param.default {
                    v.visit_expr(default);
                }
            }
            if let Some(body) = &func.body {
                v.visit_block(body);
            }
        }
        Decl::Struct(st) => {
            for field in &st.fields {
                v.visit_type(&field.ty);
            }
        }
        Decl::Enum(en) => {
            for value in &en.values {
                if let Some(init) = &value.value {
                    v.visit_expr(init);
                }
            }
        }
        Decl::RichEnum(en) => {
            for variant in &en.variants {
                for param in &variant.params {
                    v.visit_type(&param.ty);
                }
            }
        }
        Decl::Typedef(td) => v.visit_type(&td.original),
        Decl::Var(var) => {
            if let Some(ty) = &var.ty {
                v.visit_type(ty);
            }
            if let Some(init) = &var.initializer {
                v.visit_expr(init);
            }
        }
    }
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.statements {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::VarDecl(var) => {
            if let Some(ty) = &var.ty {
                v.visit_type(ty);
            }
            if let Some(init) = &var.initializer {
                v.visit_expr(init);
            }
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                v.visit_expr(value);
            }
        }
        StmtKind::If(if_stmt) => {
            v.visit_expr(&if_stmt.condition);
            v.visit_block(&if_stmt.then_block);
            match &if_stmt.else_branch {
                Some(ElseBranch::Else(block)) => v.visit_block(block),
                Some(ElseBranch::ElseIf(stmt)) => v.visit_stmt(stmt),
                None => {}
            }
        }
        StmtKind::While { condition, body } => {
            v.visit_expr(condition);
            v.visit_block(body);
        }
        StmtKind::DoWhile { body, condition } => {
            v.visit_block(body);
            v.visit_expr(condition);
        }
        StmtKind::ForIn(for_in) | StmtKind::ParallelFor(for_in) => {
            v.visit_expr(&for_in.iterable);
            v.visit_block(&for_in.body);
        }
        StmtKind::CFor(c_for) => {
            match &c_for.init {
                Some(ForInit::Var(var)) => {
                    if let Some(init) = &var.initializer {
                        v.visit_expr(init);
                    }
                }
                Some(ForInit::Expr(expr)) => v.visit_expr(expr),
                None => {}
            }
            if let Some(cond) = &c_for.condition {
                v.visit_expr(cond);
            }
            if let Some(update) = &c_for.update {
                v.visit_expr(update);
            }
            v.visit_block(&c_for.body);
        }
        StmtKind::Switch(switch) => {
            v.visit_expr(&switch.value);
            for case in &switch.cases {
                if let Some(value) = &case.value {
                    v.visit_expr(value);
                }
                for stmt in &case.body {
                    v.visit_stmt(stmt);
                }
            }
        }
        StmtKind::Break | StmtKind::Continue => {}
        StmtKind::Expr(expr)
        | StmtKind::Delete(expr)
        | StmtKind::Throw(expr)
        | StmtKind::Keep(expr)
        | StmtKind::Release(expr) => v.visit_expr(expr),
        StmtKind::TryCatch(tc) => {
            v.visit_block(&tc.try_block);
            v.visit_block(&tc.catch_block);
            if let Some(finally) = &tc.finally_block {
                v.visit_block(finally);
            }
        }
        StmtKind::Block(block) => v.visit_block(block),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::IntLit { .. }
        | ExprKind::FloatLit { .. }
        | ExprKind::StringLit { .. }
        | ExprKind::CharLit { .. }
        | ExprKind::BoolLit { .. }
        | ExprKind::NullLit
        | ExprKind::Ident { .. }
        | ExprKind::SelfRef
        | ExprKind::SuperRef => {}
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::Call { callee, args } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Index { obj, index } => {
            v.visit_expr(obj);
            v.visit_expr(index);
        }
        ExprKind::FieldAccess { obj, .. } => v.visit_expr(obj),
        ExprKind::Cast {
            target_type,
            operand,
        } => {
            v.visit_type(target_type);
            v.visit_expr(operand);
        }
        ExprKind::Sizeof(arg) => match arg {
            SizeofArg::Type(ty) => v.visit_type(ty),
            SizeofArg::Expr(expr) => v.visit_expr(expr),
        },
        ExprKind::Ternary {
            condition,
            true_expr,
            false_expr,
        } => {
            v.visit_expr(condition);
            v.visit_expr(true_expr);
            v.visit_expr(false_expr);
        }
        ExprKind::Assign { target, value, .. } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        ExprKind::ListLit { elements }
        | ExprKind::BraceInit { elements }
        | ExprKind::TupleLit { elements } => {
            for el in elements {
                v.visit_expr(el);
            }
        }
        ExprKind::MapLit { entries } => {
            for entry in entries {
                v.visit_expr(&entry.key);
                v.visit_expr(&entry.value);
            }
        }
        ExprKind::FString { parts } => {
            for part in parts {
                if let FStringPart::Expr(expr) = part {
                    v.visit_expr(expr);
                }
            }
        }
        ExprKind::New { ty, args } => {
            v.visit_type(ty);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Lambda(lambda) => {
            for param in &lambda.params {
                v.visit_type(&param.ty);
            }
            match &lambda.body {
                LambdaBody::Block(block) => v.visit_block(block),
                LambdaBody::Expr(expr) => v.visit_expr(expr),
            }
        }
        ExprKind::Spawn { callee } => v.visit_expr(callee),
    }
}
