//! Type utilities: assignability, subclass walks, generic substitution,
//! and the class-reference upgrade.

use rustc_hash::FxHashMap;

use btrc_parser::ast::TypeExpr;

use crate::Analyzer;

impl Analyzer {
    /// Whether `source` may be assigned to `target`.
    ///
    /// Same-base types compare generic arguments pairwise. Numeric
    /// primitives interconvert; `string` and `char*` interconvert;
    /// `null` (`void*`) is compatible with any pointer or `string`;
    /// user-defined classes are compatible when the source is a subclass
    /// of the target (or implements it as an interface). Unknown pairs
    /// are conservatively compatible so opaque user types never produce
    /// false positives.
    pub(crate) fn types_compatible(&self, target: &TypeExpr, source: &TypeExpr) -> bool {
        if target.base == source.base {
            if !target.generic_args.is_empty()
                && !source.generic_args.is_empty()
                && target.generic_args.len() == source.generic_args.len()
            {
                for (t, s) in target.generic_args.iter().zip(&source.generic_args) {
                    if !self.types_compatible(t, s) {
                        return false;
                    }
                }
            }
            return true;
        }

        let numeric = ["int", "float", "double", "char"];
        if numeric.contains(&target.base.as_str()) && numeric.contains(&source.base.as_str()) {
            return true;
        }

        if target.base == "string" && source.base == "char" && source.pointer_depth >= 1 {
            return true;
        }
        if source.base == "string" && target.base == "char" && target.pointer_depth >= 1 {
            return true;
        }

        if source.base == "null" || (source.base == "void" && source.pointer_depth > 0) {
            return target.pointer_depth > 0 || target.base == "string";
        }

        if self.class_table.contains_key(&target.base)
            && self.class_table.contains_key(&source.base)
        {
            return self.is_subclass(&source.base, &target.base);
        }

        let known = ["int", "float", "double", "char", "string", "bool", "void"];
        if known.contains(&target.base.as_str()) && known.contains(&source.base.as_str()) {
            return false;
        }
        true
    }

    /// Whether `child` extends `parent` directly or transitively, or
    /// implements it when `parent` names an interface.
    pub(crate) fn is_subclass(&self, child: &str, parent: &str) -> bool {
        if child == parent {
            return true;
        }
        let Some(info) = self.class_table.get(child) else {
            return false;
        };

        if self.interface_table.contains_key(parent) {
            let mut cur = Some(info);
            let mut visited: Vec<&str> = Vec::new();
            while let Some(cls) = cur {
                if visited.contains(&cls.name.as_str()) {
                    break;
                }
                visited.push(&cls.name);
                if cls.interfaces.iter().any(|i| i == parent) {
                    return true;
                }
                cur = cls.parent.as_deref().and_then(|p| self.class_table.get(p));
            }
            return false;
        }

        let mut info = info;
        let mut visited: Vec<&str> = Vec::new();
        while let Some(p) = info.parent.as_deref() {
            if visited.contains(&p) {
                break;
            }
            visited.push(p);
            if p == parent {
                return true;
            }
            match self.class_table.get(p) {
                Some(next) => info = next,
                None => break,
            }
        }
        false
    }

    /// Recursively substitute generic type parameters in a type.
    ///
    /// A bare parameter reference picks up the substituted type's own
    /// structure; pointer depths stack.
    pub(crate) fn substitute_type(
        &self,
        ty: &TypeExpr,
        subs: &FxHashMap<String, TypeExpr>,
    ) -> TypeExpr {
        if ty.generic_args.is_empty() {
            if let Some(resolved) = subs.get(&ty.base) {
                let mut out = resolved.clone();
                if ty.pointer_depth > 0 {
                    out.pointer_depth += ty.pointer_depth;
                }
                return out;
            }
            return ty.clone();
        }
        let mut out = ty.clone();
        out.generic_args = ty
            .generic_args
            .iter()
            .map(|arg| self.substitute_type(arg, subs))
            .collect();
        out
    }

    /// The substitution map for a generic class applied at a use site.
    pub(crate) fn generic_subs(
        params: &[String],
        args: &[TypeExpr],
    ) -> FxHashMap<String, TypeExpr> {
        params
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect()
    }

    /// Class-reference upgrade: any class-typed reference with no
    /// explicit pointer becomes pointer depth 1 (classes are implicitly
    /// heap references). Writing `T*` for a non-nullable class type is a
    /// redundancy error; `T?` keeps the pointer level the parser set.
    /// The upgrade recurses through generic arguments.
    pub(crate) fn upgrade_class_type(&mut self, ty: &TypeExpr) -> TypeExpr {
        let mut out = ty.clone();
        out.generic_args = ty
            .generic_args
            .iter()
            .map(|arg| self.upgrade_class_type(arg))
            .collect();
        if self.class_table.contains_key(&out.base) {
            if out.pointer_depth > 0 && !out.is_nullable {
                self.error(
                    format!(
                        "Redundant pointer for class type '{0}': classes are always \
                         heap-allocated. Use '{0}' instead of '{0}*'",
                        out.base
                    ),
                    ty.line,
                    ty.col,
                );
            }
            out.pointer_depth = 1;
        }
        out
    }

    /// The same upgrade without diagnostics, for table normalization.
    pub(crate) fn upgraded_type(&self, ty: &TypeExpr) -> TypeExpr {
        let mut out = ty.clone();
        out.generic_args = ty
            .generic_args
            .iter()
            .map(|arg| self.upgraded_type(arg))
            .collect();
        if self.class_table.contains_key(&out.base) {
            out.pointer_depth = 1;
        }
        out
    }
}
