//! Generic-instance collection.
//!
//! Every `TypeExpr` with generic arguments is registered under its base
//! name so downstream monomorphization knows which instantiations exist.
//! Deduplication is structural (position-independent). For each newly
//! registered instance of a known class, the type parameters are
//! substituted through the class's method return types and the resulting
//! instances are registered too, so `Map<string, int>.keys()` yielding
//! `List<string>` registers `List<string>`. Recursion stops at already
//! seen instances, which bounds the fixed point.

use btrc_parser::ast::TypeExpr;

use crate::Analyzer;

impl Analyzer {
    pub(crate) fn collect_generic_instances(&mut self, ty: &TypeExpr) {
        if ty.generic_args.is_empty() {
            return;
        }

        // Arg count must match the declared generic parameters.
        if let Some(cls) = self.class_table.get(&ty.base) {
            if !cls.generic_params.is_empty()
                && ty.generic_args.len() != cls.generic_params.len()
            {
                let expected = cls.generic_params.len();
                self.error(
                    format!(
                        "Type '{}' expects {expected} generic argument(s) but got {}",
                        ty.base,
                        ty.generic_args.len()
                    ),
                    ty.line,
                    ty.col,
                );
            }
        }

        let args: Vec<TypeExpr> = ty.generic_args.clone();
        let instances = self.generic_instances.entry(ty.base.clone()).or_default();
        if instances.iter().any(|existing| existing == &args) {
            // Already registered; its transitive instances were too.
            return;
        }
        instances.push(args.clone());

        // Register transitive instances from method return types
        // (e.g. Map<K, V>.keys() -> List<K>).
        if let Some(cls) = self.class_table.get(&ty.base) {
            if !cls.generic_params.is_empty() && args.len() == cls.generic_params.len() {
                let subs = Self::generic_subs(&cls.generic_params, &args);
                let returns: Vec<TypeExpr> = cls
                    .methods
                    .values()
                    .filter(|m| !m.return_type.generic_args.is_empty())
                    .map(|m| m.return_type.clone())
                    .collect();
                for ret in returns {
                    let resolved = self.substitute_type(&ret, &subs);
                    if !resolved.generic_args.is_empty() && resolved.base != ty.base {
                        self.collect_generic_instances(&resolved);
                    }
                }
            }
        }

        for arg in &args {
            self.collect_generic_instances(arg);
        }
    }
}
