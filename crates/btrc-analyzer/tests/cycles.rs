//! Cyclable-class fixed-point tests: a class is cyclable iff it can
//! reach itself through the class-reference graph of its fields
//! (including generic arguments).

use btrc_analyzer::{analyze, AnalyzedProgram};
use btrc_lexer::Lexer;

fn analyze_source(source: &str) -> AnalyzedProgram {
    let tokens = Lexer::tokenize(source).expect("lex failed");
    let program = btrc_parser::parse(tokens).expect("parse failed");
    analyze(program)
}

fn cyclable(result: &AnalyzedProgram, name: &str) -> bool {
    result.class_table[name].is_cyclable
}

#[test]
fn self_referential_class_is_cyclable() {
    let result = analyze_source("class Node { public Node next; public int value; }");
    assert!(cyclable(&result, "Node"));
}

#[test]
fn plain_data_class_is_not_cyclable() {
    let result = analyze_source("class Leaf { public int value; public string name; }");
    assert!(!cyclable(&result, "Leaf"));
}

#[test]
fn mutual_references_are_cyclable() {
    let result = analyze_source(
        "class A { public B b; }
         class B { public A a; }",
    );
    assert!(cyclable(&result, "A"));
    assert!(cyclable(&result, "B"));
}

#[test]
fn longer_cycles_are_detected() {
    let result = analyze_source(
        "class A { public B b; }
         class B { public C c; }
         class C { public A a; }
         class D { public A a; }",
    );
    assert!(cyclable(&result, "A"));
    assert!(cyclable(&result, "B"));
    assert!(cyclable(&result, "C"));
    // D points into the cycle but nothing points back at D.
    assert!(!cyclable(&result, "D"));
}

#[test]
fn generic_arguments_count_as_references() {
    let result = analyze_source(
        "class Node { public Vector<Node> children; }
         class Holder { public Vector<Node> items; }",
    );
    assert!(cyclable(&result, "Node"));
    assert!(!cyclable(&result, "Holder"));
}

#[test]
fn acyclic_chain_is_not_cyclable() {
    let result = analyze_source(
        "class A { public B b; }
         class B { public C c; }
         class C { public int v; }",
    );
    assert!(!cyclable(&result, "A"));
    assert!(!cyclable(&result, "B"));
    assert!(!cyclable(&result, "C"));
}

#[test]
fn inherited_fields_propagate_cyclability() {
    // Child copies the parent's fields at registration, so a child of a
    // self-referential parent is itself part of the graph.
    let result = analyze_source(
        "class Node { public Node next; }
         class FancyNode extends Node { public int extra; }",
    );
    assert!(cyclable(&result, "Node"));
    // FancyNode's copied field points at Node, not FancyNode.
    assert!(!cyclable(&result, "FancyNode"));
}
