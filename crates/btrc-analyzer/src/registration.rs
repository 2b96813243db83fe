//! Registration and structural validation passes.
//!
//! Pass 1 records every interface, class, and function into the tables,
//! reporting duplicates and copying parent members into child classes.
//! Passes 2-5 resolve interface parents, check the inheritance graph for
//! cycles, validate interface implementations and abstract-method
//! obligations, and check override signature compatibility. Classes can
//! reference each other before either is fully registered, which is why
//! parent resolution runs as separate walks after the skeletons exist.

use rustc_hash::FxHashSet;

use btrc_parser::ast::{ClassDecl, ClassMember, Decl, FunctionDecl, InterfaceDecl, Param, Program, TypeExpr};

use crate::{Analyzer, ClassInfo, InterfaceInfo};

impl Analyzer {
    /// Pass 1: populate the interface, class, and function tables.
    /// Interfaces are registered first so classes can validate against
    /// them.
    pub(crate) fn register_declarations(&mut self, program: &Program) {
        for decl in &program.declarations {
            if let Decl::Interface(iface) = decl {
                self.register_interface(iface);
            }
        }
        for decl in &program.declarations {
            match decl {
                Decl::Class(class) => self.register_class(class),
                Decl::Function(func) => self.register_function(func),
                _ => {}
            }
        }
    }

    fn register_interface(&mut self, decl: &InterfaceDecl) {
        if self.interface_table.contains_key(&decl.name) {
            self.error(
                format!("Duplicate interface name '{}'", decl.name),
                decl.line,
                decl.col,
            );
        }
        let mut info = InterfaceInfo {
            name: decl.name.clone(),
            parent: decl.parent.clone(),
            generic_params: decl.generic_params.clone(),
            ..InterfaceInfo::default()
        };
        for method in &decl.methods {
            info.methods.insert(method.name.clone(), method.clone());
        }
        self.interface_table.insert(decl.name.clone(), info);
    }

    /// Pass 2: inherit parent interface methods once every interface is
    /// registered, so diamond graphs are well-defined.
    pub(crate) fn resolve_interface_parents(&mut self, program: &Program) {
        for decl in &program.declarations {
            let Decl::Interface(iface) = decl else {
                continue;
            };
            let Some(parent) = &iface.parent else {
                continue;
            };
            let Some(parent_info) = self.interface_table.get(parent).cloned() else {
                self.error(
                    format!("Parent interface '{parent}' not found"),
                    iface.line,
                    iface.col,
                );
                continue;
            };
            if let Some(info) = self.interface_table.get_mut(&iface.name) {
                for (mname, method) in parent_info.methods {
                    info.methods.entry(mname).or_insert(method);
                }
            }
        }
    }

    fn register_class(&mut self, decl: &ClassDecl) {
        if self.class_table.contains_key(&decl.name) {
            self.error(
                format!("Duplicate class name '{}'", decl.name),
                decl.line,
                decl.col,
            );
        }
        let mut info = ClassInfo {
            name: decl.name.clone(),
            generic_params: decl.generic_params.clone(),
            parent: decl.parent.clone(),
            interfaces: decl.interfaces.clone(),
            is_abstract: decl.is_abstract,
            ..ClassInfo::default()
        };

        // Copy parent fields and non-constructor methods. The parent must
        // already be registered (declared earlier in the file) for its
        // members to flow down.
        if let Some(parent) = &decl.parent {
            if let Some(parent_info) = self.class_table.get(parent) {
                for (fname, field) in &parent_info.fields {
                    info.fields.insert(fname.clone(), field.clone());
                }
                for (mname, method) in &parent_info.methods {
                    if mname != &parent_info.name {
                        info.methods.insert(mname.clone(), method.clone());
                    }
                }
            }
        }

        let mut declared_fields: FxHashSet<&str> = FxHashSet::default();
        let mut declared_methods: FxHashSet<&str> = FxHashSet::default();
        for member in &decl.members {
            match member {
                ClassMember::Field(field) => {
                    if declared_fields.contains(field.name.as_str()) {
                        self.error(
                            format!(
                                "Duplicate field '{}' in class '{}'",
                                field.name, decl.name
                            ),
                            field.line,
                            field.col,
                        );
                    }
                    declared_fields.insert(&field.name);
                    info.fields.insert(field.name.clone(), field.clone());
                }
                ClassMember::Method(method) => {
                    if declared_methods.contains(method.name.as_str()) {
                        self.error(
                            format!(
                                "Duplicate method '{}' in class '{}'",
                                method.name, decl.name
                            ),
                            method.line,
                            method.col,
                        );
                    }
                    declared_methods.insert(&method.name);
                    if method.name == decl.name {
                        info.constructor = Some(method.clone());
                    }
                    info.methods.insert(method.name.clone(), method.clone());
                }
                ClassMember::Property(prop) => {
                    info.properties.insert(prop.name.clone(), prop.clone());
                }
            }
        }

        self.class_table.insert(decl.name.clone(), info);
    }

    fn register_function(&mut self, decl: &FunctionDecl) {
        if let Some(existing) = self.function_table.get(&decl.name) {
            if existing.body.is_none() && decl.body.is_some() {
                // Forward declaration superseded by its definition.
            } else if existing.body.is_some() && decl.body.is_none() {
                // Definition already registered; ignore the forward decl.
                return;
            } else {
                self.error(
                    format!("Duplicate function name '{}'", decl.name),
                    decl.line,
                    decl.col,
                );
            }
        }
        self.function_table.insert(decl.name.clone(), decl.clone());
    }

    /// Pass 3: check that every parent class exists and the parent chain
    /// is acyclic. Each cycle is reported once, at the first declaration
    /// (in source order) found to be on it.
    pub(crate) fn validate_inheritance(&mut self, program: &Program) {
        let mut reported: FxHashSet<String> = FxHashSet::default();
        for decl in &program.declarations {
            let Decl::Class(class) = decl else {
                continue;
            };
            let Some(parent) = &class.parent else {
                continue;
            };
            if !self.class_table.contains_key(parent) {
                self.error(
                    format!("Parent class '{parent}' not found"),
                    class.line,
                    class.col,
                );
                continue;
            }
            if reported.contains(&class.name) {
                continue;
            }
            let mut seen: FxHashSet<String> = FxHashSet::default();
            seen.insert(class.name.clone());
            let mut cur = Some(parent.clone());
            while let Some(name) = cur {
                if !self.class_table.contains_key(&name) {
                    break;
                }
                if seen.contains(&name) {
                    self.error(
                        format!(
                            "Circular inheritance detected: '{}' -> '{}'",
                            class.name, name
                        ),
                        class.line,
                        class.col,
                    );
                    // Every class on the walk is part of (or leads into)
                    // the cycle; suppress repeat reports for them.
                    reported.extend(seen.iter().cloned());
                    break;
                }
                seen.insert(name.clone());
                cur = self
                    .class_table
                    .get(&name)
                    .and_then(|info| info.parent.clone());
            }
        }
    }

    /// Pass 4: every interface method must be implemented with a
    /// compatible signature, and abstract parent methods must be
    /// implemented by non-abstract children.
    pub(crate) fn validate_interfaces(&mut self, program: &Program) {
        for decl in &program.declarations {
            let Decl::Class(class) = decl else {
                continue;
            };
            let Some(cls) = self.class_table.get(&class.name).cloned() else {
                continue;
            };

            for iface_name in &cls.interfaces {
                let Some(iface) = self.interface_table.get(iface_name).cloned() else {
                    self.error(
                        format!("Interface '{iface_name}' not found"),
                        class.line,
                        class.col,
                    );
                    continue;
                };
                let mut names: Vec<&String> = iface.methods.keys().collect();
                names.sort();
                for mname in names {
                    let iface_method = &iface.methods[mname];
                    match cls.methods.get(mname) {
                        None => {
                            self.error(
                                format!(
                                    "Class '{}' does not implement interface method \
                                     '{mname}' from '{iface_name}'",
                                    class.name
                                ),
                                class.line,
                                class.col,
                            );
                        }
                        Some(method) => {
                            self.check_signature_compat(
                                &class.name,
                                &method.name,
                                method.line,
                                method.col,
                                Some(&method.return_type),
                                &method.params,
                                Some(&iface_method.return_type),
                                &iface_method.params,
                                &format!("interface '{iface_name}'"),
                            );
                        }
                    }
                }
            }

            // Abstract parent methods must be implemented by non-abstract
            // children.
            if cls.is_abstract {
                continue;
            }
            let Some(parent_name) = &cls.parent else {
                continue;
            };
            let Some(parent) = self.class_table.get(parent_name).cloned() else {
                continue;
            };
            if !parent.is_abstract {
                continue;
            }
            let own_methods: FxHashSet<&str> = class
                .members
                .iter()
                .filter_map(|m| match m {
                    ClassMember::Method(method) => Some(method.name.as_str()),
                    _ => None,
                })
                .collect();
            let mut names: Vec<&String> = parent.methods.keys().collect();
            names.sort();
            for mname in names {
                let method = &parent.methods[mname];
                if method.is_abstract && !own_methods.contains(mname.as_str()) {
                    self.error(
                        format!(
                            "Class '{}' must implement abstract method \
                             '{mname}' from '{parent_name}'",
                            class.name
                        ),
                        class.line,
                        class.col,
                    );
                }
            }
        }
    }

    /// Pass 5: a method shadowing a parent method of the same name must
    /// keep a compatible signature. Constructors are exempt.
    pub(crate) fn validate_overrides(&mut self, program: &Program) {
        for decl in &program.declarations {
            let Decl::Class(class) = decl else {
                continue;
            };
            let Some(parent_name) = &class.parent else {
                continue;
            };
            let Some(parent) = self.class_table.get(parent_name).cloned() else {
                continue;
            };
            for member in &class.members {
                let ClassMember::Method(method) = member else {
                    continue;
                };
                if method.name == class.name {
                    continue;
                }
                let Some(parent_method) = parent.methods.get(&method.name) else {
                    continue;
                };
                self.check_signature_compat(
                    &class.name,
                    &method.name,
                    method.line,
                    method.col,
                    Some(&method.return_type),
                    &method.params,
                    Some(&parent_method.return_type),
                    &parent_method.params,
                    &format!("parent class '{parent_name}'"),
                );
            }
        }
    }

    /// Shared signature compatibility check for overrides and interface
    /// implementations: return types and parameter types must be
    /// pairwise compatible, and arity must match.
    #[allow(clippy::too_many_arguments)]
    fn check_signature_compat(
        &mut self,
        class_name: &str,
        method_name: &str,
        line: u32,
        col: u32,
        impl_ret: Option<&TypeExpr>,
        impl_params: &[Param],
        expected_ret: Option<&TypeExpr>,
        expected_params: &[Param],
        source: &str,
    ) {
        if let (Some(exp), Some(imp)) = (expected_ret, impl_ret) {
            if !exp.base.is_empty() && !imp.base.is_empty() && !self.types_compatible(exp, imp) {
                self.error(
                    format!(
                        "Override '{method_name}' in '{class_name}' has incompatible \
                         return type '{}' (expected '{}' from {source})",
                        imp.base, exp.base
                    ),
                    line,
                    col,
                );
            }
        }
        if impl_params.len() != expected_params.len() {
            self.error(
                format!(
                    "Override '{method_name}' in '{class_name}' has {} parameter(s) \
                     (expected {} from {source})",
                    impl_params.len(),
                    expected_params.len()
                ),
                line,
                col,
            );
        } else {
            for (i, (exp, imp)) in expected_params.iter().zip(impl_params).enumerate() {
                if !self.types_compatible(&exp.ty, &imp.ty) {
                    self.error(
                        format!(
                            "Override '{method_name}' param {} in '{class_name}' has \
                             incompatible type '{}' (expected '{}' from {source})",
                            i + 1,
                            imp.ty.base,
                            exp.ty.base
                        ),
                        line,
                        col,
                    );
                }
            }
        }
    }
}
