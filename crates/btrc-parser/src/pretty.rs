//! Source printer for the btrc AST.
//!
//! Emits parseable btrc source from a [`Program`]. The output is plain
//! and fully parenthesized rather than pretty: its purpose is the
//! round-trip property (printing a tree and reparsing it yields the same
//! structure), not human-facing formatting. Parentheses never create AST
//! nodes, so wrapping every compound operand is structurally neutral.

use std::fmt::Write;

use crate::ast::*;

/// Print a whole program back to source.
pub fn print_program(program: &Program) -> String {
    let mut printer = Printer::new();
    for decl in &program.declarations {
        printer.decl(decl);
    }
    printer.out
}

/// Print a single expression (used by tests and tooling).
pub fn print_expr(expr: &Expr) -> String {
    Printer::new().expr(expr)
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    // ── Declarations ───────────────────────────────────────────────────

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Preprocessor(pp) => self.line(&pp.text),
            Decl::Class(class) => self.class_decl(class),
            Decl::Interface(iface) => self.interface_decl(iface),
            Decl::Function(func) => self.function_decl(func),
            Decl::Struct(st) => self.struct_decl(st),
            Decl::Enum(en) => self.enum_decl(en),
            Decl::RichEnum(en) => self.rich_enum_decl(en),
            Decl::Typedef(td) => {
                let line = format!("typedef {} {};", self.type_expr(&td.original), td.alias);
                self.line(&line);
            }
            Decl::Var(var) => {
                let line = self.var_decl(var);
                self.line(&line);
            }
        }
    }

    fn class_decl(&mut self, class: &ClassDecl) {
        let mut header = String::new();
        if class.is_abstract {
            header.push_str("abstract ");
        }
        write!(header, "class {}", class.name).ok();
        if !class.generic_params.is_empty() {
            write!(header, "<{}>", class.generic_params.join(", ")).ok();
        }
        if let Some(parent) = &class.parent {
            write!(header, " extends {parent}").ok();
        }
        if !class.interfaces.is_empty() {
            write!(header, " implements {}", class.interfaces.join(", ")).ok();
        }
        header.push_str(" {");
        self.line(&header);
        self.indent += 1;
        for member in &class.members {
            self.class_member(member);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn class_member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Field(field) => {
                let mut line = format!("{} ", field.access);
                line.push_str(&self.declarator(&field.ty, &field.name));
                if let Some(init) = &field.initializer {
                    write!(line, " = {}", self.expr(init)).ok();
                }
                line.push(';');
                self.line(&line);
            }
            ClassMember::Method(method) => {
                let mut line = format!("{} ", method.access);
                if method.is_abstract {
                    line.push_str("abstract ");
                }
                if method.is_gpu {
                    line.push_str("@gpu ");
                }
                if method.keep_return {
                    line.push_str("keep ");
                }
                // Constructors print without the duplicate name.
                if method.name == method.return_type.base
                    && method.return_type.generic_args.is_empty()
                    && method.return_type.pointer_depth == 0
                {
                    write!(line, "{}", method.name).ok();
                } else {
                    write!(
                        line,
                        "{} {}",
                        self.type_expr(&method.return_type),
                        method.name
                    )
                    .ok();
                }
                write!(line, "({})", self.params(&method.params)).ok();
                match &method.body {
                    Some(body) => {
                        line.push_str(" {");
                        self.line(&line);
                        self.block_body(body);
                        self.line("}");
                    }
                    None => {
                        line.push(';');
                        self.line(&line);
                    }
                }
            }
            ClassMember::Property(prop) => {
                let mut line = format!("{} ", prop.access);
                line.push_str(&self.declarator(&prop.ty, &prop.name));
                line.push_str(" {");
                self.line(&line);
                self.indent += 1;
                if prop.has_getter {
                    match &prop.getter_body {
                        Some(body) => {
                            self.line("get {");
                            self.block_body(body);
                            self.line("}");
                        }
                        None => self.line("get;"),
                    }
                }
                if prop.has_setter {
                    match &prop.setter_body {
                        Some(body) => {
                            self.line("set {");
                            self.block_body(body);
                            self.line("}");
                        }
                        None => self.line("set;"),
                    }
                }
                self.indent -= 1;
                self.line("}");
            }
        }
    }

    fn interface_decl(&mut self, iface: &InterfaceDecl) {
        let mut header = format!("interface {}", iface.name);
        if !iface.generic_params.is_empty() {
            write!(header, "<{}>", iface.generic_params.join(", ")).ok();
        }
        if let Some(parent) = &iface.parent {
            write!(header, " extends {parent}").ok();
        }
        header.push_str(" {");
        self.line(&header);
        self.indent += 1;
        for sig in &iface.methods {
            let mut line = String::new();
            if sig.keep_return {
                line.push_str("keep ");
            }
            write!(
                line,
                "{} {}({});",
                self.type_expr(&sig.return_type),
                sig.name,
                self.params(&sig.params)
            )
            .ok();
            self.line(&line);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn function_decl(&mut self, func: &FunctionDecl) {
        let mut line = String::new();
        if func.is_gpu {
            line.push_str("@gpu ");
        }
        if func.keep_return {
            line.push_str("keep ");
        }
        write!(
            line,
            "{} {}({})",
            self.type_expr(&func.return_type),
            func.name,
            self.params(&func.params)
        )
        .ok();
        match &func.body {
            Some(body) => {
                line.push_str(" {");
                self.line(&line);
                self.block_body(body);
                self.line("}");
            }
            None => {
                line.push(';');
                self.line(&line);
            }
        }
    }

    fn struct_decl(&mut self, st: &StructDecl) {
        // Both the body-less and the braced forms produce the same node
        // shape, so the braced form reparses to an identical tree.
        let header = if st.name.is_empty() {
            "struct {".to_string()
        } else {
            format!("struct {} {{", st.name)
        };
        self.line(&header);
        self.indent += 1;
        for field in &st.fields {
            let line = format!("{};", self.declarator(&field.ty, &field.name));
            self.line(&line);
        }
        self.indent -= 1;
        self.line("};");
    }

    fn enum_decl(&mut self, en: &EnumDecl) {
        let values: Vec<String> = en
            .values
            .iter()
            .map(|v| match &v.value {
                Some(init) => format!("{} = {}", v.name, self.expr(init)),
                None => v.name.clone(),
            })
            .collect();
        let line = format!("enum {} {{ {} }};", en.name, values.join(", "));
        self.line(&line);
    }

    fn rich_enum_decl(&mut self, en: &RichEnumDecl) {
        let variants: Vec<String> = en
            .variants
            .iter()
            .map(|v| {
                if v.params.is_empty() {
                    v.name.clone()
                } else {
                    format!("{}({})", v.name, self.params(&v.params))
                }
            })
            .collect();
        let line = format!("enum class {} {{ {} }}", en.name, variants.join(", "));
        self.line(&line);
    }

    // ── Types and parameters ───────────────────────────────────────────

    /// A type in prefix position: `const base<args>[]***` with the `?`
    /// nullable marker replacing one pointer star.
    fn type_expr(&self, ty: &TypeExpr) -> String {
        let mut out = String::new();
        if ty.is_const {
            out.push_str("const ");
        }
        out.push_str(&ty.base);
        if !ty.generic_args.is_empty() {
            let args: Vec<String> = ty.generic_args.iter().map(|a| self.type_expr(a)).collect();
            write!(out, "<{}>", args.join(", ")).ok();
        }
        if ty.is_array && ty.array_size.is_none() {
            out.push_str("[]");
        }
        let stars = ty.pointer_depth.saturating_sub(u32::from(ty.is_nullable));
        for _ in 0..stars {
            out.push('*');
        }
        if ty.is_nullable {
            out.push('?');
        }
        out
    }

    /// A `type name` pair, moving a sized array suffix after the name
    /// (`int x[10]`).
    fn declarator(&self, ty: &TypeExpr, name: &str) -> String {
        match &ty.array_size {
            Some(size) => {
                let mut base = ty.clone();
                base.is_array = false;
                base.array_size = None;
                format!("{} {}[{}]", self.type_expr(&base), name, self.expr(size))
            }
            None => format!("{} {}", self.type_expr(ty), name),
        }
    }

    fn params(&self, params: &[Param]) -> String {
        let parts: Vec<String> = params
            .iter()
            .map(|p| {
                let mut out = String::new();
                if p.keep {
                    out.push_str("keep ");
                }
                out.push_str(&self.declarator(&p.ty, &p.name));
                if let Some(default) = &p.default {
                    write!(out, " = {}", self.expr(default)).ok();
                }
                out
            })
            .collect();
        parts.join(", ")
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn block_body(&mut self, block: &Block) {
        self.indent += 1;
        for stmt in &block.statements {
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn var_decl(&self, var: &VarDeclStmt) -> String {
        let mut out = match &var.ty {
            Some(ty) => self.declarator(ty, &var.name),
            None => format!("var {}", var.name),
        };
        if let Some(init) = &var.initializer {
            write!(out, " = {}", self.expr(init)).ok();
        }
        out.push(';');
        out
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VarDecl(var) => {
                let line = self.var_decl(var);
                self.line(&line);
            }
            StmtKind::Return(value) => {
                let line = match value {
                    Some(value) => format!("return {};", self.expr(value)),
                    None => "return;".to_string(),
                };
                self.line(&line);
            }
            StmtKind::If(if_stmt) => self.if_stmt(if_stmt),
            StmtKind::While { condition, body } => {
                let line = format!("while ({}) {{", self.expr(condition));
                self.line(&line);
                self.block_body(body);
                self.line("}");
            }
            StmtKind::DoWhile { body, condition } => {
                self.line("do {");
                self.block_body(body);
                let line = format!("}} while ({});", self.expr(condition));
                self.line(&line);
            }
            StmtKind::ForIn(for_in) => {
                let header = match &for_in.var_name2 {
                    Some(var2) => format!(
                        "for {}, {var2} in {} {{",
                        for_in.var_name,
                        self.expr(&for_in.iterable)
                    ),
                    None => format!(
                        "for {} in {} {{",
                        for_in.var_name,
                        self.expr(&for_in.iterable)
                    ),
                };
                self.line(&header);
                self.block_body(&for_in.body);
                self.line("}");
            }
            StmtKind::ParallelFor(for_in) => {
                let header = format!(
                    "parallel for {} in {} {{",
                    for_in.var_name,
                    self.expr(&for_in.iterable)
                );
                self.line(&header);
                self.block_body(&for_in.body);
                self.line("}");
            }
            StmtKind::CFor(c_for) => {
                let init = match &c_for.init {
                    Some(ForInit::Var(var)) => {
                        let mut text = self.var_decl(var);
                        text.pop(); // the declarator's trailing ';'
                        text
                    }
                    Some(ForInit::Expr(expr)) => self.expr(expr),
                    None => String::new(),
                };
                let condition = c_for
                    .condition
                    .as_ref()
                    .map(|c| self.expr(c))
                    .unwrap_or_default();
                let update = c_for
                    .update
                    .as_ref()
                    .map(|u| self.expr(u))
                    .unwrap_or_default();
                let header = format!("for ({init}; {condition}; {update}) {{");
                self.line(&header);
                self.block_body(&c_for.body);
                self.line("}");
            }
            StmtKind::Switch(switch) => {
                let header = format!("switch ({}) {{", self.expr(&switch.value));
                self.line(&header);
                self.indent += 1;
                for case in &switch.cases {
                    let label = match &case.value {
                        Some(value) => format!("case {}:", self.expr(value)),
                        None => "default:".to_string(),
                    };
                    self.line(&label);
                    self.indent += 1;
                    for stmt in &case.body {
                        self.stmt(stmt);
                    }
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.line("}");
            }
            StmtKind::Break => self.line("break;"),
            StmtKind::Continue => self.line("continue;"),
            StmtKind::Expr(expr) => {
                let line = format!("{};", self.expr(expr));
                self.line(&line);
            }
            StmtKind::Delete(expr) => {
                let line = format!("delete {};", self.expr(expr));
                self.line(&line);
            }
            StmtKind::Throw(expr) => {
                let line = format!("throw {};", self.expr(expr));
                self.line(&line);
            }
            StmtKind::Keep(expr) => {
                let line = format!("keep {};", self.expr(expr));
                self.line(&line);
            }
            StmtKind::Release(expr) => {
                let line = format!("release {};", self.expr(expr));
                self.line(&line);
            }
            StmtKind::Block(block) => {
                self.line("{");
                self.block_body(block);
                self.line("}");
            }
            StmtKind::TryCatch(tc) => {
                self.line("try {");
                self.block_body(&tc.try_block);
                let line = format!("}} catch ({}) {{", tc.catch_var);
                self.line(&line);
                self.block_body(&tc.catch_block);
                if let Some(finally) = &tc.finally_block {
                    self.line("} finally {");
                    self.block_body(finally);
                }
                self.line("}");
            }
        }
    }

    fn if_stmt(&mut self, if_stmt: &IfStmt) {
        let header = format!("if ({}) {{", self.expr(&if_stmt.condition));
        self.line(&header);
        self.if_tail(if_stmt);
    }

    /// The then-block and whatever follows the closing brace: `}`,
    /// `} else {`, or a `} else if (...) {` chain continuation.
    fn if_tail(&mut self, if_stmt: &IfStmt) {
        self.block_body(&if_stmt.then_block);
        match &if_stmt.else_branch {
            Some(ElseBranch::Else(block)) => {
                self.line("} else {");
                self.block_body(block);
                self.line("}");
            }
            Some(ElseBranch::ElseIf(stmt)) => {
                if let StmtKind::If(nested) = &stmt.kind {
                    let header = format!("}} else if ({}) {{", self.expr(&nested.condition));
                    self.line(&header);
                    self.if_tail(nested);
                } else {
                    self.line("}");
                }
            }
            None => self.line("}"),
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn expr(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::IntLit { raw, .. } => raw.clone(),
            ExprKind::FloatLit { raw, .. } => raw.clone(),
            ExprKind::StringLit { value } => value.clone(),
            ExprKind::CharLit { value } => value.clone(),
            ExprKind::BoolLit { value } => value.to_string(),
            ExprKind::NullLit => "null".to_string(),
            ExprKind::Ident { name } => name.clone(),
            ExprKind::SelfRef => "self".to_string(),
            ExprKind::SuperRef => "super".to_string(),
            ExprKind::Binary { op, left, right } => {
                format!("({} {op} {})", self.expr(left), self.expr(right))
            }
            ExprKind::Unary {
                op,
                operand,
                prefix,
            } => {
                if *prefix {
                    format!("({op}{})", self.expr(operand))
                } else {
                    format!("({}{op})", self.expr(operand))
                }
            }
            ExprKind::Call { callee, args } => {
                let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("{}({})", self.expr(callee), args.join(", "))
            }
            ExprKind::Index { obj, index } => {
                format!("{}[{}]", self.expr(obj), self.expr(index))
            }
            ExprKind::FieldAccess {
                obj,
                field,
                arrow,
                optional,
            } => {
                let sep = if *optional {
                    "?."
                } else if *arrow {
                    "->"
                } else {
                    "."
                };
                format!("{}{sep}{field}", self.expr(obj))
            }
            ExprKind::Cast {
                target_type,
                operand,
            } => {
                format!("(({}) {})", self.type_expr(target_type), self.expr(operand))
            }
            ExprKind::Sizeof(arg) => match arg {
                SizeofArg::Type(ty) => format!("sizeof({})", self.type_expr(ty)),
                SizeofArg::Expr(inner) => format!("sizeof({})", self.expr(inner)),
            },
            ExprKind::Ternary {
                condition,
                true_expr,
                false_expr,
            } => format!(
                "({} ? {} : {})",
                self.expr(condition),
                self.expr(true_expr),
                self.expr(false_expr)
            ),
            ExprKind::Assign { target, op, value } => {
                format!("({} {op} {})", self.expr(target), self.expr(value))
            }
            ExprKind::ListLit { elements } => {
                let parts: Vec<String> = elements.iter().map(|e| self.expr(e)).collect();
                format!("[{}]", parts.join(", "))
            }
            ExprKind::MapLit { entries } => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|entry| format!("{}: {}", self.expr(&entry.key), self.expr(&entry.value)))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            ExprKind::BraceInit { elements } => {
                let parts: Vec<String> = elements.iter().map(|e| self.expr(e)).collect();
                format!("{{{}}}", parts.join(", "))
            }
            ExprKind::FString { parts } => {
                let mut out = String::from("f\"");
                for part in parts {
                    match part {
                        FStringPart::Text(text) => {
                            for ch in text.chars() {
                                match ch {
                                    '{' => out.push_str("{{"),
                                    '}' => out.push_str("}}"),
                                    _ => out.push(ch),
                                }
                            }
                        }
                        FStringPart::Expr(inner) => {
                            write!(out, "{{{}}}", self.expr(inner)).ok();
                        }
                    }
                }
                out.push('"');
                out
            }
            ExprKind::New { ty, args } => {
                let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("new {}({})", self.type_expr(ty), args.join(", "))
            }
            ExprKind::TupleLit { elements } => {
                let parts: Vec<String> = elements.iter().map(|e| self.expr(e)).collect();
                format!("({})", parts.join(", "))
            }
            ExprKind::Lambda(lambda) => match &lambda.return_type {
                Some(ret) => {
                    let LambdaBody::Block(block) = &lambda.body else {
                        // Verbose lambdas always carry block bodies.
                        return format!(
                            "{} function({}) {{ }}",
                            self.type_expr(ret),
                            self.params(&lambda.params)
                        );
                    };
                    format!(
                        "{} function({}) {}",
                        self.type_expr(ret),
                        self.params(&lambda.params),
                        self.inline_block(block)
                    )
                }
                None => match &lambda.body {
                    LambdaBody::Expr(inner) => format!(
                        "(({}) => {})",
                        self.params(&lambda.params),
                        self.expr(inner)
                    ),
                    LambdaBody::Block(block) => format!(
                        "(({}) => {})",
                        self.params(&lambda.params),
                        self.inline_block(block)
                    ),
                },
            },
            ExprKind::Spawn { callee } => format!("spawn({})", self.expr(callee)),
        }
    }

    /// A block rendered on one line, for lambda bodies in expression
    /// position.
    fn inline_block(&self, block: &Block) -> String {
        let mut printer = Printer::new();
        printer.block_body(block);
        let body: Vec<String> = printer
            .out
            .lines()
            .map(|line| line.trim().to_string())
            .collect();
        format!("{{ {} }}", body.join(" "))
    }
}
