//! Diagnostic-rule tests: each test triggers one semantic rule and
//! asserts on the collected errors or warnings.

use btrc_analyzer::{analyze, AnalyzedProgram};
use btrc_lexer::Lexer;

fn analyze_source(source: &str) -> AnalyzedProgram {
    let tokens = Lexer::tokenize(source).expect("lex failed");
    let program = btrc_parser::parse(tokens).expect("parse failed");
    analyze(program)
}

fn messages(result: &AnalyzedProgram) -> Vec<String> {
    result.errors.iter().map(|d| d.message.clone()).collect()
}

fn expect_error(source: &str, needle: &str) {
    let result = analyze_source(source);
    assert!(
        result.errors.iter().any(|d| d.message.contains(needle)),
        "expected an error containing {needle:?}, got {:?}",
        messages(&result)
    );
}

fn expect_clean(source: &str) {
    let result = analyze_source(source);
    assert!(
        result.errors.is_empty(),
        "expected no errors, got {:?}",
        messages(&result)
    );
}

// ── Arithmetic ─────────────────────────────────────────────────────────

#[test]
fn division_by_literal_zero() {
    expect_error("void t() { var x = 1 / 0; }", "Division by zero");
    expect_error("void t() { var x = 10 % 0; }", "Division by zero");
    expect_error("void t() { int x = 4; x /= 0; }", "Division by zero");
    expect_error("void t() { var x = 1.0 / 0.0; }", "Division by zero");
    expect_clean("void t() { int d = 2; var x = 1 / d; }");
}

// ── Returns ────────────────────────────────────────────────────────────

#[test]
fn return_type_mismatch_names_both_types() {
    let result = analyze_source("int f() { return \"s\"; }");
    assert_eq!(result.errors.len(), 1, "{:?}", messages(&result));
    let msg = &result.errors[0].message;
    assert!(msg.contains("Return type mismatch"), "{msg}");
    assert!(msg.contains("'int'") && msg.contains("'string'"), "{msg}");
}

#[test]
fn compatible_returns_are_accepted() {
    expect_clean("int f() { return 'c'; }"); // numeric widening
    expect_clean("float f() { return 1; }");
    expect_clean(
        "class A { public int x; }
         class B extends A { public int y; }
         A f() { return new B(); }",
    );
}

// ── Parameters ─────────────────────────────────────────────────────────

#[test]
fn non_default_after_default_parameter() {
    expect_error(
        "void f(int a = 1, int b) { }",
        "Non-default parameter 'b' follows default parameter",
    );
    expect_clean("void f(int a, int b = 2) { }");
}

// ── Constructors ───────────────────────────────────────────────────────

#[test]
fn constructor_return_type_restrictions() {
    expect_error(
        "class A { public int A() { return 1; } }",
        "Constructor 'A' cannot have return type 'int'",
    );
    expect_clean("class A { public void A() { } }");
    expect_clean("class A { public A() { } }");
}

#[test]
fn constructor_arity_accounts_for_defaults() {
    let source = "class P {
            public int x;
            public P(int a, int b = 2) { self.x = a; }
         }
         void t() { P p1 = P(); P p2 = new P(1, 2, 3); P ok = P(1); }";
    let result = analyze_source(source);
    let msgs = messages(&result);
    assert_eq!(result.errors.len(), 2, "{msgs:?}");
    assert!(msgs[0].contains("expects at least 1 argument(s) but got 0"), "{msgs:?}");
    assert!(msgs[1].contains("expects at most 2 argument(s) but got 3"), "{msgs:?}");
}

#[test]
fn class_without_constructor_rejects_arguments() {
    expect_error(
        "class A { public int x; }
         void t() { A a = A(1); }",
        "has no constructor but was called with 1 argument(s)",
    );
}

#[test]
fn abstract_class_cannot_be_instantiated() {
    expect_error(
        "abstract class S { public abstract int area(); }
         void t() { S s = S(); }",
        "Cannot instantiate abstract class 'S'",
    );
    expect_error(
        "abstract class S { public abstract int area(); }
         void t() { var s = new S(); }",
        "Cannot instantiate abstract class 'S'",
    );
}

// ── Function calls ─────────────────────────────────────────────────────

#[test]
fn call_arity_is_validated() {
    expect_error(
        "int add(int a, int b) { return a + b; }
         void t() { var x = add(1); }",
        "'add()' expects at least 2 argument(s) but got 1",
    );
    expect_error(
        "int add(int a, int b) { return a + b; }
         void t() { var x = add(1, 2, 3); }",
        "'add()' expects at most 2 argument(s) but got 3",
    );
}

#[test]
fn method_call_arity_is_validated() {
    expect_error(
        "class A { public int m(int a) { return a; } }
         void t() { A a = A(); a.m(); }",
        "'A.m()' expects at least 1 argument(s) but got 0",
    );
}

// ── Access control ─────────────────────────────────────────────────────

#[test]
fn private_members_are_protected() {
    expect_error(
        "class A { private int x; }
         void t() { A a = A(); var v = a.x; }",
        "Cannot access private field 'x' of class 'A'",
    );
    expect_error(
        "class A { private int m() { return 1; } }
         void t() { A a = A(); a.m(); }",
        "Cannot access private method 'm' of class 'A'",
    );
    // Inside the declaring class, private members are fine.
    expect_clean(
        "class A {
            private int x;
            public int get() { return self.x; }
         }",
    );
}

#[test]
fn unknown_member_is_reported() {
    expect_error(
        "class A { public int x; }
         void t() { A a = A(); var v = a.missing; }",
        "Class 'A' has no field or method 'missing'",
    );
}

#[test]
fn static_dispatch_requires_class_methods() {
    expect_error(
        "class A { public int m() { return 1; } }
         void t() { A.m(); }",
        "Method 'm' is not a class method, cannot call statically",
    );
    expect_clean(
        "class A { class int s() { return 2; } }
         void t() { A.s(); }",
    );
}

// ── self / super ───────────────────────────────────────────────────────

#[test]
fn self_placement_rules() {
    expect_error("void t() { self.x = 1; }", "'self' used outside of a class");
    expect_error(
        "class A {
            public int x;
            class int s() { return self.x; }
         }",
        "'self' cannot be used in a class (static) method",
    );
    expect_clean(
        "class A {
            public int x;
            public int get() { return self.x; }
         }",
    );
}

#[test]
fn super_requires_a_parent() {
    expect_error(
        "class A { public void m() { super.m(); } }",
        "'super' cannot be used in class 'A'",
    );
    expect_clean(
        "class A { public void m() { } }
         class B extends A { public void m() { super.m(); } }",
    );
}

// ── Control flow ───────────────────────────────────────────────────────

#[test]
fn break_and_continue_placement() {
    expect_error(
        "void t() { break; }",
        "'break' statement outside of loop or switch",
    );
    expect_error(
        "void t() { continue; }",
        "'continue' statement outside of loop",
    );
    // break is legal in switches, continue is not.
    expect_clean("void t(int x) { switch (x) { case 1: break; } }");
    expect_error(
        "void t(int x) { switch (x) { case 1: continue; } }",
        "'continue' statement outside of loop",
    );
    expect_clean(
        "void t() {
            while (true) { break; }
            for (int i = 0; i < 3; i++) { continue; }
         }",
    );
}

#[test]
fn unreachable_code_after_terminal() {
    expect_error(
        "int f() { return 1; var x = 2; }",
        "Unreachable code after return/throw/break/continue",
    );
    expect_error(
        "void t() { while (true) { break; var x = 2; } }",
        "Unreachable code after return/throw/break/continue",
    );
}

// ── Variables ──────────────────────────────────────────────────────────

#[test]
fn void_expression_cannot_initialize() {
    expect_error(
        "void g() { }
         void t() { int x = g(); }",
        "Cannot assign void expression to variable 'x'",
    );
}

#[test]
fn incompatible_initializer_is_rejected() {
    expect_error(
        "void t() { int x = \"s\"; }",
        "Cannot assign 'string' to variable 'x' of type 'int'",
    );
    // Empty collection literals adopt the declared type.
    expect_clean("void t() { Vector<int> v = []; }");
}

#[test]
fn list_elements_must_be_homogeneous() {
    expect_error(
        "void t() { var l = [1, \"x\"]; }",
        "List element 1 has type 'string' but expected 'int'",
    );
    expect_clean("void t() { var l = [1, 2.5]; }"); // numeric mixing is fine
}

// ── For-in ─────────────────────────────────────────────────────────────

#[test]
fn for_in_over_builtins() {
    expect_clean("void t() { for i in range(10) { var x = i; } }");
    expect_clean("void t() { for c in \"abc\" { var x = c; } }");
}

#[test]
fn for_in_over_non_iterables() {
    expect_error("void t() { for x in 5 { } }", "Type 'int' is not iterable");
    expect_error(
        "class A { public int x; }
         void t() { A a = A(); for x in a { } }",
        "Type 'A' is not iterable",
    );
}

#[test]
fn two_variable_for_in_requires_two_generic_args() {
    expect_error(
        "void t() { Vector<int> v; for k, x in v { } }",
        "Two-variable for-in iteration requires a Map type",
    );
    expect_clean("void t() { Map<string, int> m; for k, x in m { var s = k; } }");
}

#[test]
fn for_in_via_iter_get_method() {
    expect_clean(
        "class MyList<T> {
            public T item;
            public T iterGet(int i) { return self.item; }
         }
         void t() {
            MyList<string> l = new MyList();
            for s in l { var u = s; }
         }",
    );
}

// ── Inheritance and interfaces ─────────────────────────────────────────

#[test]
fn missing_parent_class() {
    expect_error(
        "class B extends Ghost { }",
        "Parent class 'Ghost' not found",
    );
}

#[test]
fn interface_method_must_be_implemented() {
    expect_error(
        "interface Shape { float area(); }
         class Circle implements Shape { }",
        "Class 'Circle' does not implement interface method 'area' from 'Shape'",
    );
    expect_clean(
        "interface Shape { float area(); }
         class Circle implements Shape {
            public float area() { return 0.0; }
         }",
    );
}

#[test]
fn interface_parent_methods_are_inherited() {
    expect_error(
        "interface Base { int id(); }
         interface Shape extends Base { float area(); }
         class Circle implements Shape {
            public float area() { return 0.0; }
         }",
        "does not implement interface method 'id'",
    );
}

#[test]
fn incompatible_override_signatures() {
    expect_error(
        "interface Shape { float area(); }
         class Circle implements Shape {
            public string area() { return \"x\"; }
         }",
        "incompatible return type 'string'",
    );
    expect_error(
        "class A { public int m(int a) { return a; } }
         class B extends A { public int m(string s) { return 1; } }",
        "Override 'm' param 1 in 'B' has incompatible type 'string'",
    );
    expect_error(
        "class A { public int m(int a) { return a; } }
         class B extends A { public int m() { return 1; } }",
        "has 0 parameter(s) (expected 1",
    );
}

#[test]
fn abstract_methods_must_be_implemented() {
    expect_error(
        "abstract class S { public abstract int area(); }
         class C extends S { }",
        "Class 'C' must implement abstract method 'area' from 'S'",
    );
    expect_clean(
        "abstract class S { public abstract int area(); }
         class C extends S { public int area() { return 1; } }",
    );
}

// ── Duplicates ─────────────────────────────────────────────────────────

#[test]
fn duplicate_members_are_reported() {
    expect_error(
        "class A { public int x; private int x; }",
        "Duplicate field 'x' in class 'A'",
    );
    expect_error(
        "class A { public int m() { return 1; } public int m() { return 2; } }",
        "Duplicate method 'm' in class 'A'",
    );
    expect_error(
        "interface I { int m(); } interface I { int n(); }",
        "Duplicate interface name 'I'",
    );
}

// ── Generics ───────────────────────────────────────────────────────────

#[test]
fn generic_arity_is_validated() {
    expect_error(
        "class Pair<A, B> { public A first; public B second; }
         void t() { Pair<int> p; }",
        "Type 'Pair' expects 2 generic argument(s) but got 1",
    );
}

// ── Built-in surfaces ──────────────────────────────────────────────────

#[test]
fn thread_and_mutex_method_surfaces() {
    expect_error(
        "void t() { var h = spawn(() => 1); h.cancel(); }",
        "Thread<T> has no method 'cancel'",
    );
    expect_error(
        "void t() { var m = Mutex(1); m.lock(); }",
        "Mutex<T> has no method 'lock'",
    );
    expect_clean("void t() { var m = Mutex(1); m.set(2); m.destroy(); }");
}

// ── Warnings ───────────────────────────────────────────────────────────

#[test]
fn nullable_access_without_optional_chaining_warns() {
    let result = analyze_source(
        "class A { public int x; }
         void t(A? a) { var y = a.x; }",
    );
    assert!(result.errors.is_empty(), "{:?}", messages(&result));
    assert_eq!(result.warnings.len(), 1);
    assert!(
        result.warnings[0].message.contains("Non-optional access"),
        "{}",
        result.warnings[0]
    );
}

#[test]
fn optional_chaining_silences_the_nullable_warning() {
    let result = analyze_source(
        "class A { public int x; }
         void t(A? a) { var y = a?.x; }",
    );
    assert!(result.errors.is_empty(), "{:?}", messages(&result));
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn alias_of_managed_variable_warns() {
    let result = analyze_source(
        "class A { public int x; }
         void t() { A p = A(); var q = p; }",
    );
    assert!(result.errors.is_empty(), "{:?}", messages(&result));
    assert_eq!(result.warnings.len(), 1);
    assert!(
        result.warnings[0]
            .message
            .contains("Use 'keep q;' if both variables should own the object"),
        "{}",
        result.warnings[0]
    );
}

#[test]
fn aliasing_primitives_does_not_warn() {
    let result = analyze_source("void t() { var p = 1; var q = p; }");
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}
