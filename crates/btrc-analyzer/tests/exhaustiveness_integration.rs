//! Exhaustive-return analysis through the full pipeline: which shapes
//! of control flow satisfy a non-void function's return obligation.

use btrc_analyzer::{analyze, AnalyzedProgram};
use btrc_lexer::Lexer;

fn analyze_source(source: &str) -> AnalyzedProgram {
    let tokens = Lexer::tokenize(source).expect("lex failed");
    let program = btrc_parser::parse(tokens).expect("parse failed");
    analyze(program)
}

fn expect_returns(source: &str) {
    let result = analyze_source(source);
    assert!(
        !result
            .errors
            .iter()
            .any(|d| d.message.contains("no return statement")),
        "expected the function to satisfy its return obligation: {:?}",
        result.errors
    );
}

fn expect_missing_return(source: &str) {
    let result = analyze_source(source);
    assert!(
        result
            .errors
            .iter()
            .any(|d| d.message.contains("no return statement")),
        "expected a missing-return error, got {:?}",
        result.errors
    );
}

#[test]
fn plain_return_satisfies() {
    expect_returns("int f() { return 1; }");
}

#[test]
fn throw_satisfies() {
    expect_returns("int f() { throw \"unsupported\"; }");
}

#[test]
fn empty_body_does_not_satisfy() {
    expect_missing_return("int f() { }");
}

#[test]
fn void_functions_have_no_obligation() {
    let result = analyze_source("void f() { }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn forward_declarations_have_no_obligation() {
    let result = analyze_source("int f();");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn if_else_with_both_arms_returning() {
    expect_returns(
        "int f(int x) {
            if (x > 0) { return 1; } else { return 2; }
         }",
    );
}

#[test]
fn if_without_else_does_not_satisfy() {
    expect_missing_return("int f(int x) { if (x > 0) { return 1; } }");
}

#[test]
fn else_if_chain_with_final_else() {
    expect_returns(
        "int f(int x) {
            if (x > 0) { return 1; }
            else if (x < 0) { return 2; }
            else { return 3; }
         }",
    );
}

#[test]
fn else_if_chain_without_final_else_does_not_satisfy() {
    expect_missing_return(
        "int f(int x) {
            if (x > 0) { return 1; }
            else if (x < 0) { return 2; }
         }",
    );
}

#[test]
fn while_true_with_return_satisfies() {
    expect_returns("int f() { while (true) { return 1; } }");
}

#[test]
fn conditional_while_does_not_satisfy() {
    expect_missing_return("int f(int x) { while (x > 0) { return 1; } }");
}

#[test]
fn switch_with_all_cases_returning() {
    expect_returns(
        "int f(int x) {
            switch (x) {
                case 1: return 1;
                default: return 0;
            }
         }",
    );
}

#[test]
fn switch_with_a_fallthrough_case_does_not_satisfy() {
    expect_missing_return(
        "int f(int x) {
            switch (x) {
                case 1: return 1;
                default: break;
            }
         }",
    );
}

#[test]
fn try_catch_with_both_bodies_returning() {
    expect_returns(
        "int f() {
            try { return risky(); } catch (e) { return 0; }
         }",
    );
}

#[test]
fn try_without_returning_catch_does_not_satisfy() {
    expect_missing_return(
        "int f() {
            try { return risky(); } catch (e) { log(e); }
         }",
    );
}

#[test]
fn methods_have_the_same_obligation() {
    let result = analyze_source(
        "class A {
            public int good() { return 1; }
            public int bad() { if (true) { return 1; } }
         }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert!(
        result.errors[0].message.contains("'A.bad'"),
        "{}",
        result.errors[0]
    );
}

#[test]
fn nested_block_with_return_satisfies() {
    expect_returns("int f() { { return 1; } }");
}
