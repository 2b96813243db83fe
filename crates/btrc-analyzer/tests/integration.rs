//! End-to-end analyzer scenarios: literal inputs through the full
//! lex -> parse -> analyze pipeline, asserting on diagnostics and the
//! mutated AST.

use btrc_analyzer::{analyze, AnalyzedProgram};
use btrc_lexer::Lexer;
use btrc_parser::ast::{Decl, StmtKind};

fn analyze_source(source: &str) -> AnalyzedProgram {
    let tokens = Lexer::tokenize(source).expect("lex failed");
    let program = btrc_parser::parse(tokens).expect("parse failed");
    analyze(program)
}

fn error_strings(result: &AnalyzedProgram) -> Vec<String> {
    result.errors.iter().map(ToString::to_string).collect()
}

#[test]
fn var_declaration_infers_int() {
    let result = analyze_source("void t() { var x = 42; }");
    assert!(result.errors.is_empty(), "{:?}", error_strings(&result));

    let Decl::Function(func) = &result.program.declarations[0] else {
        panic!("expected a function");
    };
    let body = func.body.as_ref().unwrap();
    let StmtKind::VarDecl(var) = &body.statements[0].kind else {
        panic!("expected a var decl");
    };
    assert_eq!(var.ty.as_ref().unwrap().base, "int");
}

#[test]
fn private_field_access_is_rejected() {
    let result = analyze_source(
        "class A { private int x; }
         void t() { A a = A(); a.x = 5; }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", error_strings(&result));
    assert!(
        result.errors[0].message.contains("private field"),
        "{}",
        result.errors[0]
    );
    assert_eq!(result.errors[0].line, 2);
}

#[test]
fn circular_inheritance_is_reported_once() {
    let result = analyze_source("class B extends A { } class A extends B { }");
    assert_eq!(result.errors.len(), 1, "{:?}", error_strings(&result));
    assert!(
        result.errors[0].message.contains("Circular inheritance"),
        "{}",
        result.errors[0]
    );
}

#[test]
fn non_exhaustive_enum_switch_names_missing_value() {
    let result = analyze_source(
        "enum C { R, G, B };
         int main() {
           C c = R;
           switch (c) { case R: break; case G: break; }
           return 0;
         }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", error_strings(&result));
    assert!(
        result.errors[0].message.contains("not exhaustive, missing: B"),
        "{}",
        result.errors[0]
    );
}

#[test]
fn if_without_else_is_not_an_exhaustive_return() {
    let result = analyze_source("int foo() { if (true) { return 1; } }");
    assert_eq!(result.errors.len(), 1, "{:?}", error_strings(&result));
    assert!(
        result.errors[0].message.contains("no return statement"),
        "{}",
        result.errors[0]
    );
}

#[test]
fn infinite_while_loop_counts_as_return() {
    let result = analyze_source("int foo() { while (true) { return 1; } }");
    assert!(result.errors.is_empty(), "{:?}", error_strings(&result));
}

#[test]
fn diagnostics_are_deterministic() {
    let source = "class A { private int x; }
         void t() {
           A a = A();
           a.x = 1;
           var y = 1 / 0;
           break;
         }";
    let first = error_strings(&analyze_source(source));
    for _ in 0..3 {
        assert_eq!(error_strings(&analyze_source(source)), first);
    }
    assert_eq!(first.len(), 3, "{first:?}");
    // Discovery order follows the depth-first walk.
    assert!(first[0].contains("private field"));
    assert!(first[1].contains("Division by zero"));
    assert!(first[2].contains("'break' statement outside"));
}

#[test]
fn class_field_types_are_upgraded_to_references() {
    let result = analyze_source(
        "class B { public int v; }
         class A { public B other; }",
    );
    assert!(result.errors.is_empty(), "{:?}", error_strings(&result));

    // The table view is upgraded...
    let a = &result.class_table["A"];
    assert_eq!(a.fields["other"].ty.pointer_depth, 1);

    // ...and so is the AST itself.
    for decl in &result.program.declarations {
        if let Decl::Class(class) = decl {
            if class.name == "A" {
                let btrc_parser::ast::ClassMember::Field(field) = &class.members[0] else {
                    panic!("expected a field");
                };
                assert_eq!(field.ty.pointer_depth, 1);
            }
        }
    }
}

#[test]
fn explicit_class_pointer_is_redundant() {
    let result = analyze_source(
        "class A { public int v; }
         void t() { A* p = null; }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", error_strings(&result));
    assert!(
        result.errors[0].message.contains("Redundant pointer"),
        "{}",
        result.errors[0]
    );
}

#[test]
fn nullable_class_type_keeps_parser_pointer_level() {
    let result = analyze_source(
        "class A { public int x; }
         A? a = null;",
    );
    assert!(result.errors.is_empty(), "{:?}", error_strings(&result));

    let Decl::Var(var) = &result.program.declarations[1] else {
        panic!("expected a top-level var");
    };
    let ty = var.ty.as_ref().unwrap();
    assert!(ty.is_nullable);
    assert_eq!(ty.pointer_depth, 1);
}

#[test]
fn forward_declaration_coalesces_with_definition() {
    let result = analyze_source(
        "int add(int a, int b);
         int add(int a, int b) { return a + b; }
         void t() { var s = add(1, 2); }",
    );
    assert!(result.errors.is_empty(), "{:?}", error_strings(&result));
    assert!(result.function_table["add"].body.is_some());
}

#[test]
fn duplicate_definitions_are_rejected() {
    let result = analyze_source(
        "int f() { return 1; }
         int f() { return 2; }
         class A { public int x; }
         class A { public int y; }",
    );
    let messages = error_strings(&result);
    assert!(
        messages.iter().any(|m| m.contains("Duplicate function name 'f'")),
        "{messages:?}"
    );
    assert!(
        messages.iter().any(|m| m.contains("Duplicate class name 'A'")),
        "{messages:?}"
    );
}

#[test]
fn analysis_survives_broken_programs() {
    // Errors accumulate; analysis still produces a usable record.
    let result = analyze_source(
        "class A { private int x; private int x; }
         int f() { if (true) { return 1; } }
         void t() { A a = A(); a.x = 1; a.missing = 2; }",
    );
    assert!(result.errors.len() >= 3, "{:?}", error_strings(&result));
    assert!(result.class_table.contains_key("A"));
    assert!(result.function_table.contains_key("f"));
    assert!(!result.node_types.is_empty());
}

#[test]
fn warnings_do_not_fail_the_program() {
    let result = analyze_source(
        "class A { public int x; }
         void t() { A p = A(); var q = p; }",
    );
    assert!(result.errors.is_empty(), "{:?}", error_strings(&result));
    assert_eq!(result.warnings.len(), 1);
    assert!(
        result.warnings[0]
            .message
            .contains("Aliasing managed variable"),
        "{}",
        result.warnings[0]
    );
    assert!(result.is_ok());
}

#[test]
fn diagnostic_display_has_line_and_col() {
    let result = analyze_source("void t() { var x = 1 / 0; }");
    assert_eq!(result.errors.len(), 1);
    let shown = result.errors[0].to_string();
    assert!(
        shown.ends_with(&format!(
            " at {}:{}",
            result.errors[0].line, result.errors[0].col
        )),
        "{shown}"
    );
}
