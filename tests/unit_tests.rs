//! End-to-end tests for the analyzer.
//!
//! Programs are built with `AstBuilder` the way an external parser would
//! hand them over, then run through `Analyzer` (or `Checker` when a test
//! needs the semantic context afterwards).

use std::path::Path;

use bpl::ast::{AstBuilder, BinaryOp};
use bpl::semantic::Checker;
use bpl::semantic::conversion::{is_compatible, is_implicit_widening, is_subtype};
use bpl::{
    Analyzer, AnalysisOutput, CheckerOptions, DeclRef, ErrorMode, LinkerSymbolKind,
    PreloadedModules, Type, analyze,
};
use bumpalo::Bump;
use indoc::indoc;

fn messages(output: &AnalysisOutput) -> Vec<String> {
    output.diagnostics.errors().map(|d| d.message.clone()).collect()
}

// =============================================================================
// Literal range checks
// =============================================================================

#[test]
fn literal_overflow_is_reported_with_location() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    b.at(2, 5);
    let decl_ty = b.ty("i8");
    b.at(2, 19);
    let value = b.int(128);
    b.at(2, 5);
    let local = b.local("x", Some(decl_ty), Some(value));
    b.at(1, 1);
    let program = b.program("main.x", [b.function("main", [], None, [local])]);

    let output = analyze(program, CheckerOptions::default());
    assert_eq!(
        output.diagnostics.to_string(),
        indoc! {"
            main.x:2:19: error: Integer overflow: value 128 does not fit in type i8
              hint: Ensure the value is within the range of i8.
        "}
    );
}

#[test]
fn literal_inside_range_is_accepted() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "main.x",
        [b.function(
            "main",
            [],
            None,
            [
                b.local("lo", Some(b.ty("i8")), Some(b.unary(bpl::ast::UnaryOp::Neg, b.int(128)))),
                b.local("hi", Some(b.ty("u8")), Some(b.int(255))),
            ],
        )],
    );
    let output = analyze(program, CheckerOptions::default());
    assert!(!output.has_errors(), "{}", output.diagnostics);
}

#[test]
fn narrowing_a_variable_is_a_mismatch() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    b.at(2, 5);
    let wide = b.local("a", Some(b.ty("i64")), Some(b.int(5)));
    b.at(3, 19);
    let value = b.ident("a");
    b.at(3, 5);
    let narrow = b.local("c", Some(b.ty("i8")), Some(value));
    b.at(1, 1);
    let program = b.program("main.x", [b.function("main", [], None, [wide, narrow])]);

    let output = analyze(program, CheckerOptions::default());
    assert_eq!(
        output.diagnostics.to_string(),
        indoc! {"
            main.x:3:19: error: Type mismatch: cannot assign i64 to i8
              hint: Ensure the initializer type matches the declared type.
        "}
    );
}

// =============================================================================
// Inheritance
// =============================================================================

#[test]
fn inherited_fields_are_accessible() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let parent = b.struct_decl("Parent", [], [], [b.field("x", b.ty("int"))]);
    let child = b.struct_decl("Child", [], [b.ty("Parent")], [b.field("y", b.ty("int"))]);
    let read_x = b.member(b.ident("c"), "x");
    let program = b.program(
        "main.x",
        [
            parent,
            child,
            b.function(
                "main",
                [],
                None,
                [
                    b.local("c", Some(b.ty("Child")), None),
                    b.expr_stmt(b.assign(read_x, b.int(10))),
                    b.expr_stmt(b.assign(b.member(b.ident("c"), "y"), b.int(20))),
                ],
            ),
        ],
    );
    let output = analyze(program, CheckerOptions::default());
    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
    assert_eq!(output.type_of(read_x.id()).map(ToString::to_string), Some("i32".to_string()));
}

#[test]
fn subtype_relation_is_antisymmetric() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let parent_use = b.ident("p");
    let child_use = b.ident("c");
    let program = b.program(
        "main.x",
        [
            b.struct_decl("Parent", [], [], [b.field("x", b.ty("int"))]),
            b.struct_decl("Child", [], [b.ty("Parent")], []),
            b.function(
                "main",
                [],
                None,
                [
                    b.local("p", Some(b.ty("Parent")), None),
                    b.local("c", Some(b.ty("Child")), None),
                    b.expr_stmt(parent_use),
                    b.expr_stmt(child_use),
                ],
            ),
        ],
    );
    let mut checker = Checker::new(CheckerOptions::default());
    checker.check_program(program).unwrap();
    assert!(checker.diagnostics().is_empty(), "{}", checker.diagnostics());

    let parent = checker.types().type_of(parent_use.id()).cloned().unwrap();
    let child = checker.types().type_of(child_use.id()).cloned().unwrap();
    let ctx = checker.context();
    let (p, c) = (parent.as_basic().unwrap(), child.as_basic().unwrap());
    assert!(is_subtype(ctx, c, p));
    assert!(!is_subtype(ctx, p, c));
    assert!(is_compatible(ctx, &parent, &child));
    assert!(is_compatible(ctx, &child, &child));
}

// =============================================================================
// Generics
// =============================================================================

#[test]
fn generic_constraint_violation_names_both_types() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let boxed = b.struct_decl("Box", [b.generic("T", None)], [], [b.field("value", b.ty("T"))]);
    let process = b.generic_function(
        "process",
        [b.generic("T", Some(b.generic_ty("Box", [b.ty("int")])))],
        [b.param("v", b.ty("T"))],
        None,
        [],
    );
    let call = b.call_generic(
        b.ident("process"),
        [b.generic_ty("Box", [b.ty("string")])],
        [b.ident("b")],
    );
    let program = b.program(
        "main.x",
        [
            boxed,
            process,
            b.function(
                "main",
                [],
                None,
                [b.local("b", Some(b.generic_ty("Box", [b.ty("string")])), None), b.expr_stmt(call)],
            ),
        ],
    );
    let output = analyze(program, CheckerOptions::default());
    assert_eq!(
        messages(&output),
        vec!["Type 'Box<string>' does not satisfy constraint 'Box<int>'".to_string()]
    );
}

#[test]
fn generic_call_with_satisfied_constraint() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let call = b.call_generic(
        b.ident("unwrap"),
        [b.generic_ty("Box", [b.ty("int")])],
        [b.ident("b")],
    );
    let program = b.program(
        "main.x",
        [
            b.struct_decl("Box", [b.generic("T", None)], [], [b.field("value", b.ty("T"))]),
            b.generic_function(
                "unwrap",
                [b.generic("T", Some(b.generic_ty("Box", [b.ty("int")])))],
                [b.param("v", b.ty("T"))],
                Some(b.ty("T")),
                [b.ret_value(b.ident("v"))],
            ),
            b.function(
                "main",
                [],
                None,
                [b.local("b", Some(b.generic_ty("Box", [b.ty("int")])), None), b.expr_stmt(call)],
            ),
        ],
    );
    let output = analyze(program, CheckerOptions::default());
    assert!(!output.has_errors(), "{}", output.diagnostics);
    assert_eq!(
        output.type_of(call.id()).map(ToString::to_string),
        Some("Box<i32>".to_string())
    );
}

// =============================================================================
// Overload resolution
// =============================================================================

#[test]
fn overloads_resolve_by_arity_and_exact_match() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let no_args = b.call_named("f", []);
    let one_arg = b.call_named("f", [b.int(1)]);
    let floats = b.call_named("g", [b.number("1.5"), b.number("2.5")]);
    let program = b.program(
        "main.x",
        [
            b.function("f", [], Some(b.ty("int")), [b.ret_value(b.int(0))]),
            b.function("f", [b.param("a", b.ty("int"))], Some(b.ty("bool")), [
                b.ret_value(b.bool_lit(true)),
            ]),
            b.function(
                "g",
                [b.param("a", b.ty("int")), b.param("b", b.ty("int"))],
                Some(b.ty("int")),
                [b.ret_value(b.ident("a"))],
            ),
            b.function(
                "g",
                [b.param("a", b.ty("float")), b.param("b", b.ty("float"))],
                Some(b.ty("float")),
                [b.ret_value(b.ident("a"))],
            ),
            b.function(
                "main",
                [],
                None,
                [b.expr_stmt(no_args), b.expr_stmt(one_arg), b.expr_stmt(floats)],
            ),
        ],
    );
    let output = analyze(program, CheckerOptions::default());
    assert!(!output.has_errors(), "{}", output.diagnostics);

    let rendered = |id| output.type_of(id).map(ToString::to_string);
    assert_eq!(rendered(no_args.id()), Some("i32".to_string()));
    assert_eq!(rendered(one_arg.id()), Some("i1".to_string()));
    assert_eq!(rendered(floats.id()), Some("double".to_string()));

    let (Some(DeclRef::Function(zero)), Some(DeclRef::Function(one))) =
        (output.decl_of(no_args.id()), output.decl_of(one_arg.id()))
    else {
        panic!("calls should record the selected function");
    };
    assert_ne!(zero, one);
}

#[test]
fn overload_pick_is_deterministic() {
    let picks: Vec<Option<DeclRef>> = (0..3)
        .map(|_| {
            let arena = Bump::new();
            let b = AstBuilder::new(&arena);
            let call = b.call_named("h", [b.int(1)]);
            let program = b.program(
                "main.x",
                [
                    b.function("h", [b.param("a", b.ty("long"))], None, []),
                    b.function("h", [b.param("a", b.ty("double"))], None, []),
                    b.function("main", [], None, [b.expr_stmt(call)]),
                ],
            );
            analyze(program, CheckerOptions::default()).decl_of(call.id())
        })
        .collect();
    assert!(picks[0].is_some());
    assert!(picks.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn widening_follows_rank_order() {
    let named = Type::named;
    assert!(is_implicit_widening(&named("i8"), &named("i32")));
    assert!(!is_implicit_widening(&named("i32"), &named("i8")));
    assert!(is_implicit_widening(&named("i8"), &named("i16")));
    assert!(is_implicit_widening(&named("i16"), &named("i64")));
    assert!(is_implicit_widening(&named("i8"), &named("i64")));
}

// =============================================================================
// Control flow
// =============================================================================

#[test]
fn missing_return_path_is_a_control_flow_error() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "main.x",
        [b.function(
            "test",
            [],
            Some(b.ty("i32")),
            [b.if_stmt(b.bool_lit(true), [b.ret_value(b.int(1))], None)],
        )],
    );
    let output = analyze(program, CheckerOptions::default());
    assert_eq!(
        messages(&output),
        vec!["Function 'test' might not return a value on all code paths".to_string()]
    );
}

#[test]
fn unreachable_code_is_a_warning() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "main.x",
        [b.function(
            "test",
            [],
            Some(b.ty("i32")),
            [b.ret_value(b.int(1)), b.local("dead", None, Some(b.int(2)))],
        )],
    );
    let output = analyze(program, CheckerOptions::default());
    assert!(!output.has_errors());
    assert_eq!(output.diagnostics.warning_count(), 1);

    let quiet = CheckerOptions {
        warn_unreachable: false,
        ..CheckerOptions::default()
    };
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "main.x",
        [b.function(
            "test",
            [],
            Some(b.ty("i32")),
            [b.ret_value(b.int(1)), b.local("dead", None, Some(b.int(2)))],
        )],
    );
    assert!(analyze(program, quiet).diagnostics.is_empty());
}

// =============================================================================
// Error modes
// =============================================================================

#[test]
fn fail_fast_reports_only_the_first_error() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let body = [
        b.expr_stmt(b.ident("missing")),
        b.expr_stmt(b.binary(b.int(1), BinaryOp::And, b.int(2))),
    ];
    let program = b.program("main.x", [b.function("main", [], None, body)]);

    let collected = analyze(program, CheckerOptions::default());
    assert_eq!(collected.diagnostics.error_count(), 2);

    let options = CheckerOptions::default().with_error_mode(ErrorMode::FailFast);
    let stopped = Analyzer::new(options).analyze(program);
    assert_eq!(messages(&stopped), vec!["Undefined symbol 'missing'".to_string()]);
}

// =============================================================================
// Modules
// =============================================================================

#[test]
fn imports_and_linker_symbols() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let math = b.program(
        "lib/math.x",
        [
            b.function(
                "add",
                [b.param("a", b.ty("int")), b.param("b", b.ty("int"))],
                Some(b.ty("int")),
                [b.ret_value(b.binary(b.ident("a"), BinaryOp::Add, b.ident("b")))],
            ),
            b.function("secret", [], None, []),
            b.export(["add"]),
        ],
    );
    let via_namespace = b.call(b.member(b.ident("m"), "add"), [b.int(1), b.int(2)]);
    let main = b.program(
        "main.x",
        [
            b.import_items([("add", Some("plus"))], "./lib/math"),
            b.import_namespace("m", "./lib/math"),
            b.function(
                "main",
                [],
                Some(b.ty("int")),
                [
                    b.local("x", None, Some(b.call_named("plus", [b.int(1), b.int(2)]))),
                    b.ret_value(via_namespace),
                ],
            ),
            b.export(["main"]),
        ],
    );
    let mut modules = PreloadedModules::new();
    modules.insert(math);
    let options = CheckerOptions::default().with_skip_import_resolution(true);
    let output = Analyzer::new(options).with_preloaded(modules).analyze(main);
    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
    assert_eq!(
        output.type_of(via_namespace.id()).map(ToString::to_string),
        Some("i32".to_string())
    );

    let symbols = &output.symbols;
    let add = symbols.get("math", "add").expect("imported module is recorded");
    assert_eq!(add.kind, LinkerSymbolKind::Function);
    assert!(add.is_exported);
    assert!(!symbols.get("math", "secret").unwrap().is_exported);
    let exported: Vec<&str> = symbols.exported_symbols().map(|s| s.name.as_str()).collect();
    assert_eq!(exported, vec!["add", "main"]);
}

#[test]
fn unexported_and_missing_imports() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let util = b.program("util.x", [b.function("hidden", [], None, [])]);
    let main = b.program(
        "main.x",
        [b.import_items([("hidden", None)], "./util"), b.import_all("./nowhere")],
    );
    let mut modules = PreloadedModules::new();
    modules.insert(util);
    let options = CheckerOptions::default().with_skip_import_resolution(true);
    let output = Analyzer::new(options).with_preloaded(modules).analyze(main);
    assert_eq!(
        messages(&output),
        vec![
            "Module './util' does not export 'hidden'".to_string(),
            "Module not found: ./nowhere".to_string(),
        ]
    );
}

#[test]
fn module_scope_is_recorded_per_file() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program("app/main.x", [b.function("main", [], None, [])]);
    let mut checker = Checker::new(CheckerOptions::default());
    checker.check_program(program).unwrap();
    assert!(checker.module_scope(Path::new("app/main.x")).is_some());
    assert!(checker.module_scope(Path::new("app/other.x")).is_none());
}
