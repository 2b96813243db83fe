//! Cyclable-class detection.
//!
//! Builds a directed graph over user-defined classes where an edge
//! `A -> B` means a field of `A` mentions class `B` (directly or through
//! a generic argument), then computes the set of classes that can reach
//! themselves. The resulting `is_cyclable` flag tells downstream code
//! generation which classes need cycle-aware ARC; the analyzer itself
//! never changes behavior based on it.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::Analyzer;

impl Analyzer {
    /// Fixed point: mark every class that can reach itself through the
    /// field-reference graph.
    pub(crate) fn compute_cyclable_flags(&mut self) {
        // Adjacency: class -> class types referenced by its fields.
        let mut refs: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
        for (name, info) in &self.class_table {
            let mut field_types: FxHashSet<String> = FxHashSet::default();
            for field in info.fields.values() {
                if self.class_table.contains_key(&field.ty.base) {
                    field_types.insert(field.ty.base.clone());
                }
                // A generic argument holds references just like a direct
                // field (Vector<Node> keeps its Nodes alive).
                for arg in &field.ty.generic_args {
                    if self.class_table.contains_key(&arg.base) {
                        field_types.insert(arg.base.clone());
                    }
                }
            }
            refs.insert(name.clone(), field_types);
        }

        let mut cyclable: FxHashSet<String> = FxHashSet::default();
        let mut changed = true;
        while changed {
            changed = false;
            for name in refs.keys() {
                if cyclable.contains(name) {
                    continue;
                }
                // Can this class reach itself through field references?
                let mut visited: FxHashSet<&str> = FxHashSet::default();
                let mut stack: Vec<&str> =
                    refs[name].iter().map(String::as_str).collect();
                while let Some(cur) = stack.pop() {
                    if !visited.insert(cur) {
                        continue;
                    }
                    if cur == name {
                        cyclable.insert(name.clone());
                        changed = true;
                        break;
                    }
                    if let Some(next) = refs.get(cur) {
                        stack.extend(next.iter().map(String::as_str));
                    }
                }
            }
        }

        for name in cyclable {
            if let Some(info) = self.class_table.get_mut(&name) {
                info.is_cyclable = true;
            }
        }
    }
}
