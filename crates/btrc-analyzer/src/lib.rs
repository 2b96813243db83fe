//! btrc semantic analyzer.
//!
//! Takes ownership of a parsed [`Program`], runs name resolution, type
//! inference, generic-instance collection, inheritance and interface
//! validation, access control, exhaustiveness checks, nullable-safety
//! warnings, and the cyclable-class fixed point, and returns an
//! [`AnalyzedProgram`]. Diagnostics are accumulated, never thrown;
//! analysis always completes so tooling can query the result even for
//! broken programs.
//!
//! # Architecture
//!
//! - [`scope`]: the name-scope stack
//! - [`registration`]: declaration tables and inheritance/interface/override validation
//! - [`cycles`]: the cyclable-class fixed point
//! - [`decls`] / [`statements`] / [`expressions`]: body analysis
//! - [`infer`]: per-expression type inference
//! - [`generics`]: generic-instance collection
//! - [`types`]: type compatibility, substitution, class-reference upgrade
//! - [`exhaustiveness`]: exhaustive-return analysis
//! - [`builtins`]: the intrinsics table (`range`, `Thread`, `Mutex`, string methods)
//! - [`diagnostics`]: ariadne rendering
//! - [`error`]: the diagnostic type

pub mod builtins;
pub mod cycles;
pub mod decls;
pub mod diagnostics;
pub mod error;
pub mod exhaustiveness;
pub mod expressions;
pub mod generics;
pub mod infer;
pub mod registration;
pub mod scope;
pub mod statements;
pub mod types;

use rustc_hash::FxHashMap;

use btrc_parser::ast::{
    Access, ExprId, FieldDecl, FunctionDecl, MethodDecl, MethodSig, Program, PropertyDecl,
    RichEnumDecl, TypeExpr,
};

pub use error::{Diagnostic, Severity};
pub use scope::{ScopeStack, SymbolInfo, SymbolKind};

/// Everything the analyzer knows about a class after registration.
///
/// Fields and non-constructor methods of the parent chain are copied in
/// during registration; constructors are never inherited.
#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    pub name: String,
    pub generic_params: Vec<String>,
    pub fields: FxHashMap<String, FieldDecl>,
    pub methods: FxHashMap<String, MethodDecl>,
    pub properties: FxHashMap<String, PropertyDecl>,
    pub constructor: Option<MethodDecl>,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub is_abstract: bool,
    /// Whether instances of this class can participate in reference
    /// cycles. Computed by the fixed point in [`cycles`]; downstream
    /// code generation uses it to pick ARC vs escape-only strategies.
    pub is_cyclable: bool,
}

/// Everything the analyzer knows about an interface.
#[derive(Debug, Clone, Default)]
pub struct InterfaceInfo {
    pub name: String,
    pub methods: FxHashMap<String, MethodSig>,
    pub parent: Option<String>,
    pub generic_params: Vec<String>,
}

/// The analyzer's result record.
///
/// Owns its symbol tables and the (mutated) program. Readers must treat
/// it as immutable; all tables are fresh per [`analyze`] call.
pub struct AnalyzedProgram {
    pub program: Program,
    pub class_table: FxHashMap<String, ClassInfo>,
    pub function_table: FxHashMap<String, FunctionDecl>,
    /// Generic base name -> argument tuples seen in the program,
    /// deduplicated by structural equality.
    pub generic_instances: FxHashMap<String, Vec<Vec<TypeExpr>>>,
    pub enum_table: FxHashMap<String, Vec<String>>,
    pub interface_table: FxHashMap<String, InterfaceInfo>,
    pub rich_enum_table: FxHashMap<String, RichEnumDecl>,
    /// Expression identity -> inferred type.
    pub node_types: FxHashMap<ExprId, TypeExpr>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl AnalyzedProgram {
    /// Whether the program was accepted (no errors; warnings allowed).
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The method the analyzer is currently inside, for `self` validation
/// and static-method checks.
#[derive(Debug, Clone)]
pub(crate) struct MethodCtx {
    pub name: String,
    pub access: Access,
}

/// Analyzer state: symbol tables under construction plus the LIFO
/// cursors of the recursive descent (current scope, class, method,
/// loop depths). One instance analyzes one program.
pub struct Analyzer {
    pub(crate) class_table: FxHashMap<String, ClassInfo>,
    pub(crate) function_table: FxHashMap<String, FunctionDecl>,
    pub(crate) generic_instances: FxHashMap<String, Vec<Vec<TypeExpr>>>,
    pub(crate) enum_table: FxHashMap<String, Vec<String>>,
    pub(crate) interface_table: FxHashMap<String, InterfaceInfo>,
    pub(crate) rich_enum_table: FxHashMap<String, RichEnumDecl>,
    pub(crate) node_types: FxHashMap<ExprId, TypeExpr>,
    pub(crate) errors: Vec<Diagnostic>,
    pub(crate) warnings: Vec<Diagnostic>,
    pub(crate) scopes: ScopeStack,
    pub(crate) current_class: Option<String>,
    pub(crate) current_method: Option<MethodCtx>,
    pub(crate) current_return_type: Option<TypeExpr>,
    pub(crate) in_gpu_function: bool,
    pub(crate) loop_depth: u32,
    pub(crate) break_depth: u32,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            class_table: FxHashMap::default(),
            function_table: FxHashMap::default(),
            generic_instances: FxHashMap::default(),
            enum_table: FxHashMap::default(),
            interface_table: FxHashMap::default(),
            rich_enum_table: FxHashMap::default(),
            node_types: FxHashMap::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
            scopes: ScopeStack::new(),
            current_class: None,
            current_method: None,
            current_return_type: None,
            in_gpu_function: false,
            loop_depth: 0,
            break_depth: 0,
        }
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, line: u32, col: u32) {
        self.errors.push(Diagnostic::new(message, line, col));
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>, line: u32, col: u32) {
        self.warnings.push(Diagnostic::new(message, line, col));
    }

    /// Run all passes over the program and produce the result record.
    pub fn analyze(mut self, mut program: Program) -> AnalyzedProgram {
        self.register_declarations(&program);
        self.resolve_interface_parents(&program);
        self.validate_inheritance(&program);
        self.validate_interfaces(&program);
        self.validate_overrides(&program);
        self.compute_cyclable_flags();

        // Body analysis mutates declarations in place (inferred `var`
        // types, class-type upgrades, lambda captures), so take the list
        // out of the program for the duration of the walk.
        let mut decls = std::mem::take(&mut program.declarations);
        for decl in &mut decls {
            self.analyze_decl(decl);
        }
        program.declarations = decls;

        // The tables hold copies of the declarations made before body
        // analysis upgraded class-reference types; re-apply the (silent,
        // idempotent) upgrade so table readers see post-analysis types.
        self.normalize_tables();

        AnalyzedProgram {
            program,
            class_table: self.class_table,
            function_table: self.function_table,
            generic_instances: self.generic_instances,
            enum_table: self.enum_table,
            interface_table: self.interface_table,
            rich_enum_table: self.rich_enum_table,
            node_types: self.node_types,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    /// Apply the class-reference upgrade to every type stored in the
    /// class and function tables. Emits no diagnostics; those were
    /// already produced while walking the declarations themselves.
    fn normalize_tables(&mut self) {
        let class_names: Vec<String> = self.class_table.keys().cloned().collect();
        for name in class_names {
            let Some(mut info) = self.class_table.get(&name).cloned() else {
                continue;
            };
            for field in info.fields.values_mut() {
                field.ty = self.upgraded_type(&field.ty);
            }
            for method in info.methods.values_mut() {
                // Constructors keep their spelled return type.
                if method.name != name {
                    method.return_type = self.upgraded_type(&method.return_type);
                }
                for param in &mut method.params {
                    param.ty = self.upgraded_type(&param.ty);
                }
            }
            for prop in info.properties.values_mut() {
                prop.ty = self.upgraded_type(&prop.ty);
            }
            if let Some(ctor) = &mut info.constructor {
                for param in &mut ctor.params {
                    param.ty = self.upgraded_type(&param.ty);
                }
            }
            self.class_table.insert(name, info);
        }

        let fn_names: Vec<String> = self.function_table.keys().cloned().collect();
        for name in fn_names {
            let Some(mut func) = self.function_table.get(&name).cloned() else {
                continue;
            };
            func.return_type = self.upgraded_type(&func.return_type);
            for param in &mut func.params {
                param.ty = self.upgraded_type(&param.ty);
            }
            self.function_table.insert(name, func);
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze a parsed program. This is the main entry point.
pub fn analyze(program: Program) -> AnalyzedProgram {
    Analyzer::new().analyze(program)
}
