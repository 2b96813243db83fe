//! Generic-instance collection tests: registration, structural
//! deduplication, and substitution through method return types.

use btrc_analyzer::{analyze, AnalyzedProgram};
use btrc_lexer::Lexer;
use btrc_parser::ast::TypeExpr;

fn analyze_source(source: &str) -> AnalyzedProgram {
    let tokens = Lexer::tokenize(source).expect("lex failed");
    let program = btrc_parser::parse(tokens).expect("parse failed");
    analyze(program)
}

fn has_instance(result: &AnalyzedProgram, base: &str, args: &[TypeExpr]) -> bool {
    result
        .generic_instances
        .get(base)
        .is_some_and(|instances| instances.iter().any(|existing| existing == args))
}

#[test]
fn instances_are_registered_per_base() {
    let result = analyze_source(
        "void t() {
            Vector<int> a;
            Map<string, int> m;
        }",
    );
    assert!(has_instance(&result, "Vector", &[TypeExpr::named("int")]));
    assert!(has_instance(
        &result,
        "Map",
        &[TypeExpr::named("string"), TypeExpr::named("int")]
    ));
}

#[test]
fn duplicate_instances_are_deduplicated() {
    let result = analyze_source(
        "void t() {
            Vector<int> a;
            Vector<int> b;
            Vector<string> c;
        }",
    );
    let vectors = &result.generic_instances["Vector"];
    assert_eq!(vectors.len(), 2, "{vectors:?}");
}

#[test]
fn nested_arguments_register_inner_instances() {
    let result = analyze_source("void t() { Map<string, Vector<int>> m; }");
    assert!(has_instance(&result, "Vector", &[TypeExpr::named("int")]));
    assert!(has_instance(
        &result,
        "Map",
        &[
            TypeExpr::named("string"),
            TypeExpr::named("Vector").with_args(vec![TypeExpr::named("int")]),
        ]
    ));
}

#[test]
fn method_returns_register_substituted_instances() {
    // Map<string, int>.keys() returns List<K>; registering the Map
    // instance must also register List<string>.
    let result = analyze_source(
        "class List<T> { public T head; }
         class Map<K, V> {
            public K key;
            public V value;
            public List<K> keys() { return null; }
         }
         void t() {
            Vector<int> a;
            Map<string, int> m;
         }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(has_instance(&result, "Vector", &[TypeExpr::named("int")]));
    assert!(has_instance(
        &result,
        "Map",
        &[TypeExpr::named("string"), TypeExpr::named("int")]
    ));
    assert!(
        has_instance(&result, "List", &[TypeExpr::named("string")]),
        "Map.keys() substitution should register List<string>: {:?}",
        result.generic_instances.get("List")
    );
}

#[test]
fn method_call_sites_register_their_resolved_returns() {
    let result = analyze_source(
        "class List<T> { public T head; }
         class Box<T> {
            public T item;
            public List<T> wrap() { return null; }
         }
         void t() {
            Box<float> b = new Box();
            var l = b.wrap();
         }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(has_instance(&result, "List", &[TypeExpr::named("float")]));
}

#[test]
fn structural_dedup_ignores_positions() {
    // The same instance spelled on different lines registers once.
    let result = analyze_source(
        "void t() {
            Map<string, int> a;
            Map<string,
                int> b;
        }",
    );
    assert_eq!(result.generic_instances["Map"].len(), 1);
}

#[test]
fn mutually_recursive_generic_returns_terminate() {
    // A<T>.to_b() returns B<T>, B<T>.to_a() returns A<T>; collection
    // must terminate and register both instances.
    let result = analyze_source(
        "class A<T> {
            public T x;
            public B<T> toB() { return null; }
         }
         class B<T> {
            public T y;
            public A<T> toA() { return null; }
         }
         void t() { A<int> a = new A(); }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(has_instance(&result, "A", &[TypeExpr::named("int")]));
    assert!(has_instance(&result, "B", &[TypeExpr::named("int")]));
}
