//! Built-in intrinsics.
//!
//! `range`, `Thread`, `Mutex`, `spawn`, and a set of string methods have
//! semantics the analyzer hard-codes for inference and validation. The
//! rules live here, keyed by name, so the rest of the analyzer consults
//! one table instead of scattering special cases.

use btrc_parser::ast::{Expr, ExprKind, TypeExpr};

/// Methods available on `Thread<T>`.
pub const THREAD_METHODS: &[&str] = &["join"];

/// Methods available on `Mutex<T>`.
pub const MUTEX_METHODS: &[&str] = &["get", "set", "destroy"];

/// Whether an expression is the built-in `range(...)` call, the
/// canonical for-in iterable.
pub fn is_range_call(expr: &Expr) -> bool {
    let ExprKind::Call { callee, .. } = &expr.kind else {
        return false;
    };
    matches!(&callee.kind, ExprKind::Ident { name } if name == "range")
}

/// Return type of a built-in string method, or `None` if the name is
/// not one.
pub fn string_method_return_type(method: &str) -> Option<TypeExpr> {
    let int = || TypeExpr::named("int");
    let bool_ = || TypeExpr::named("bool");
    let string = || TypeExpr::named("string");
    let ty = match method {
        "len" | "byteLen" | "charLen" | "indexOf" | "lastIndexOf" | "find" | "count"
        | "toInt" => int(),
        "contains" | "startsWith" | "endsWith" | "equals" | "isBlank" | "isAlnum"
        | "isDigitStr" | "isAlphaStr" | "isUpper" | "isLower" | "toBool" | "isEmpty" => bool_(),
        "charAt" => TypeExpr::named("char"),
        "substring" | "trim" | "lstrip" | "rstrip" | "toUpper" | "toLower" | "replace"
        | "repeat" | "capitalize" | "title" | "swapCase" | "padLeft" | "padRight" | "center"
        | "zfill" | "reverse" | "removePrefix" | "removeSuffix" => string(),
        "toFloat" => TypeExpr::named("float"),
        "toDouble" => TypeExpr::named("double"),
        "toLong" => TypeExpr::named("long"),
        "split" => TypeExpr::named("string").with_pointer(1),
        _ => return None,
    };
    Some(ty)
}

/// Return type of a built-in method on numeric primitives, or `None`.
pub fn numeric_method_return_type(method: &str) -> Option<TypeExpr> {
    match method {
        "toString" => Some(TypeExpr::named("string")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_methods_cover_the_common_surface() {
        assert_eq!(string_method_return_type("len").unwrap().base, "int");
        assert_eq!(string_method_return_type("contains").unwrap().base, "bool");
        assert_eq!(string_method_return_type("trim").unwrap().base, "string");
        assert_eq!(string_method_return_type("toDouble").unwrap().base, "double");
        let split = string_method_return_type("split").unwrap();
        assert_eq!(split.base, "string");
        assert_eq!(split.pointer_depth, 1);
        assert!(string_method_return_type("frobnicate").is_none());
    }

    #[test]
    fn thread_and_mutex_surfaces() {
        assert!(THREAD_METHODS.contains(&"join"));
        assert!(MUTEX_METHODS.contains(&"get"));
        assert!(!MUTEX_METHODS.contains(&"join"));
    }
}
