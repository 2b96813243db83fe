//! Declaration-body analysis: classes, methods, properties, functions,
//! and top-level variables.

use btrc_parser::ast::{
    ClassDecl, ClassMember, Decl, FunctionDecl, MethodDecl, Param, PropertyDecl, TypeExpr,
};

use crate::exhaustiveness::block_has_return;
use crate::scope::{SymbolInfo, SymbolKind};
use crate::{Analyzer, MethodCtx};

impl Analyzer {
    pub(crate) fn analyze_decl(&mut self, decl: &mut Decl) {
        match decl {
            Decl::Class(class) => self.analyze_class(class),
            Decl::Function(func) => self.analyze_function(func),
            Decl::Var(var) => self.analyze_var_decl(var),
            Decl::Enum(en) => {
                let values = en.values.iter().map(|v| v.name.clone()).collect();
                self.enum_table.insert(en.name.clone(), values);
            }
            Decl::RichEnum(en) => {
                self.rich_enum_table.insert(en.name.clone(), en.clone());
            }
            // Preprocessor lines pass through untouched; interfaces,
            // structs, and typedefs carry no bodies to analyze.
            _ => {}
        }
    }

    fn analyze_class(&mut self, decl: &mut ClassDecl) {
        let prev_class = self.current_class.replace(decl.name.clone());
        for member in &mut decl.members {
            match member {
                ClassMember::Field(field) => {
                    field.ty = self.upgrade_class_type(&field.ty);
                    self.collect_generic_instances(&field.ty.clone());
                    if let Some(init) = &mut field.initializer {
                        self.analyze_expr(init);
                    }
                }
                ClassMember::Method(method) => self.analyze_method(method),
                ClassMember::Property(prop) => self.analyze_property(prop),
            }
        }
        self.current_class = prev_class;
    }

    fn analyze_method(&mut self, method: &mut MethodDecl) {
        let prev_method = self.current_method.replace(MethodCtx {
            name: method.name.clone(),
            access: method.access,
        });
        let prev_gpu = std::mem::replace(&mut self.in_gpu_function, method.is_gpu);
        let prev_return_type = self.current_return_type.take();

        for param in &mut method.params {
            param.ty = self.upgrade_class_type(&param.ty);
        }

        let class_name = self.current_class.clone().unwrap_or_default();
        let is_constructor = method.name == class_name;
        if is_constructor {
            if method.return_type.base != "void" && method.return_type.base != class_name {
                self.error(
                    format!(
                        "Constructor '{}' cannot have return type '{}'",
                        method.name, method.return_type.base
                    ),
                    method.line,
                    method.col,
                );
            }
        } else {
            method.return_type = self.upgrade_class_type(&method.return_type);
        }
        self.current_return_type = Some(method.return_type.clone());

        self.scopes.push();
        self.validate_default_params(&method.params);

        // Instance methods see `self`; `class` (static) methods do not.
        if method.access != btrc_parser::ast::Access::Class && !class_name.is_empty() {
            let self_type = TypeExpr::named(class_name.clone()).with_pointer(1);
            self.scopes
                .define(SymbolInfo::new("self", self_type, SymbolKind::Parameter));
        }
        for param in &method.params {
            self.collect_generic_instances(&param.ty.clone());
            self.scopes.define(SymbolInfo::new(
                param.name.clone(),
                param.ty.clone(),
                SymbolKind::Parameter,
            ));
        }
        self.collect_generic_instances(&method.return_type.clone());

        if let Some(body) = &mut method.body {
            self.analyze_block(body);
        }

        if !is_constructor
            && method.return_type.base != "void"
            && method
                .body
                .as_ref()
                .is_some_and(|body| !block_has_return(body))
        {
            self.error(
                format!(
                    "Method '{class_name}.{}' has non-void return type \
                     but no return statement",
                    method.name
                ),
                method.line,
                method.col,
            );
        }

        self.scopes.pop();
        self.current_method = prev_method;
        self.in_gpu_function = prev_gpu;
        self.current_return_type = prev_return_type;
    }

    fn analyze_property(&mut self, prop: &mut PropertyDecl) {
        self.collect_generic_instances(&prop.ty.clone());
        prop.ty = self.upgrade_class_type(&prop.ty);

        let prev_method = self.current_method.replace(MethodCtx {
            name: format!("_prop_{}", prop.name),
            access: prop.access,
        });
        let class_name = self.current_class.clone().unwrap_or_default();

        if let Some(body) = &mut prop.getter_body {
            self.scopes.push();
            if !class_name.is_empty() {
                let self_type = TypeExpr::named(class_name.clone()).with_pointer(1);
                self.scopes
                    .define(SymbolInfo::new("self", self_type, SymbolKind::Parameter));
            }
            self.analyze_block(body);
            self.scopes.pop();
        }
        if let Some(body) = &mut prop.setter_body {
            self.scopes.push();
            if !class_name.is_empty() {
                let self_type = TypeExpr::named(class_name.clone()).with_pointer(1);
                self.scopes
                    .define(SymbolInfo::new("self", self_type, SymbolKind::Parameter));
            }
            // The setter body sees the incoming value as `value`.
            self.scopes.define(SymbolInfo::new(
                "value",
                prop.ty.clone(),
                SymbolKind::Parameter,
            ));
            self.analyze_block(body);
            self.scopes.pop();
        }

        self.current_method = prev_method;
    }

    fn analyze_function(&mut self, func: &mut FunctionDecl) {
        let prev_gpu = std::mem::replace(&mut self.in_gpu_function, func.is_gpu);
        let prev_return_type = self.current_return_type.take();

        for param in &mut func.params {
            param.ty = self.upgrade_class_type(&param.ty);
        }
        func.return_type = self.upgrade_class_type(&func.return_type);
        self.current_return_type = Some(func.return_type.clone());

        self.scopes.push();
        self.validate_default_params(&func.params);
        // The function's own name is visible for recursion.
        self.scopes.define(SymbolInfo::new(
            func.name.clone(),
            func.return_type.clone(),
            SymbolKind::Function,
        ));
        for param in &func.params {
            self.collect_generic_instances(&param.ty.clone());
            self.scopes.define(SymbolInfo::new(
                param.name.clone(),
                param.ty.clone(),
                SymbolKind::Parameter,
            ));
        }
        self.collect_generic_instances(&func.return_type.clone());

        if let Some(body) = &mut func.body {
            self.analyze_block(body);
        }

        if func.return_type.base != "void"
            && func
                .body
                .as_ref()
                .is_some_and(|body| !block_has_return(body))
        {
            self.error(
                format!(
                    "Function '{}' has non-void return type but no return statement",
                    func.name
                ),
                func.line,
                func.col,
            );
        }

        self.scopes.pop();
        self.in_gpu_function = prev_gpu;
        self.current_return_type = prev_return_type;
    }

    /// Non-default parameters must not follow defaults.
    fn validate_default_params(&mut self, params: &[Param]) {
        let mut seen_default = false;
        for param in params {
            if param.default.is_some() {
                seen_default = true;
            } else if seen_default {
                self.error(
                    format!(
                        "Non-default parameter '{}' follows default parameter",
                        param.name
                    ),
                    param.line,
                    param.col,
                );
                break;
            }
        }
    }
}
