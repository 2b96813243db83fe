//! Name scopes.
//!
//! The analyzer keeps a scope stack (a `Vec` of frames) mapping names to
//! [`SymbolInfo`]. Entering a block pushes a frame, leaving pops it, and
//! lookup searches from the innermost frame outward. Frame 0 is the
//! global scope, created once per analysis.

use rustc_hash::FxHashMap;

use btrc_parser::ast::TypeExpr;

/// What kind of binding a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
}

/// A resolved name binding.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: String,
    pub ty: TypeExpr,
    pub kind: SymbolKind,
}

impl SymbolInfo {
    pub fn new(name: impl Into<String>, ty: TypeExpr, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            ty,
            kind,
        }
    }
}

/// The scope stack. Frame 0 is the global scope.
pub struct ScopeStack {
    frames: Vec<FxHashMap<String, SymbolInfo>>,
}

impl ScopeStack {
    /// Create a stack with one empty global frame.
    pub fn new() -> Self {
        Self {
            frames: vec![FxHashMap::default()],
        }
    }

    /// Push a new empty frame.
    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Pop the top frame.
    ///
    /// # Panics
    ///
    /// Panics if only the global frame remains.
    pub fn pop(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the global scope");
        self.frames.pop();
    }

    /// Define a name in the current (topmost) frame.
    pub fn define(&mut self, info: SymbolInfo) {
        self.frames
            .last_mut()
            .expect("scope stack must never be empty")
            .insert(info.name.clone(), info);
    }

    /// Look up a name, searching from the innermost frame outward.
    pub fn lookup(&self, name: &str) -> Option<&SymbolInfo> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Variables and parameters visible in the non-global frames,
    /// innermost binding winning. Used for lambda capture collection;
    /// globals are never captured.
    pub fn outer_locals(&self) -> FxHashMap<String, SymbolInfo> {
        let mut out = FxHashMap::default();
        for frame in self.frames[1..].iter().rev() {
            for (name, sym) in frame {
                if matches!(sym.kind, SymbolKind::Variable | SymbolKind::Parameter)
                    && !out.contains_key(name)
                {
                    out.insert(name.clone(), sym.clone());
                }
            }
        }
        out
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
