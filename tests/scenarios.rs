//! Black-box scenarios S1-S6 and the testable properties I1-I7, driven
//! entirely through the public `fxc::compile` API.

use fxc::ast::{BinaryOp, Expr, LiteralValue, Stmt};
use fxc::{codes, BaseType, Severity};

fn compile_ok(src: &str) -> fxc::Module {
    let (module, diagnostics) = fxc::compile(src, "scenario.fx");
    assert!(diagnostics.ok(), "unexpected diagnostics: {diagnostics}");
    module
}

fn literal_value(module: &fxc::Module, handle: fxc::arena::Handle<Expr>) -> LiteralValue {
    match module.exprs.get(handle) {
        Expr::Literal { value, .. } => value.clone(),
        other => panic!("expected a literal, found {other:?}"),
    }
}

// S1. `static const int x = 2 + 3 * 4;` folds to one global `x = 14`.
#[test]
fn s1_constant_expression_folds_with_precedence() {
    let module = compile_ok("static const int x = 2 + 3 * 4;");
    assert_eq!(module.global_variables.len(), 1);
    let var = module.variables.get(module.global_variables[0]);
    assert_eq!(var.name, "x");
    let init = var.initializer.expect("initializer");
    match literal_value(&module, init) {
        LiteralValue::Int(lanes) => assert_eq!(lanes[0], 14),
        other => panic!("expected an int literal, got {other:?}"),
    }
}

// S2. Global vector initializer folds and is implicitly uniform.
#[test]
fn s2_global_vector_initializer_folds_and_warns_implicit_uniform() {
    let (module, diagnostics) = fxc::compile("float3 v = float3(1, 2, 3) * 2.0;", "scenario.fx");
    assert!(diagnostics.ok());
    assert!(diagnostics.iter().any(|d| d.code == codes::ImplicitUniform));

    let var = module.variables.get(module.global_variables[0]);
    assert!(var.ty.has_qualifier(fxc::Qualifiers::UNIFORM));
    assert!(var.ty.has_qualifier(fxc::Qualifiers::EXTERN));

    let init = var.initializer.expect("initializer");
    match literal_value(&module, init) {
        LiteralValue::Float(lanes) => assert_eq!(&lanes[0..3], &[2.0, 4.0, 6.0]),
        other => panic!("expected a float3 literal, got {other:?}"),
    }
}

// S3. Swizzle inside a constructor argument, no diagnostics.
#[test]
fn s3_swizzle_in_return_constructor_has_no_diagnostics() {
    let module = compile_ok(
        "float4 main(float2 uv : TEXCOORD) : SV_TARGET {\n\
             return float4(uv.yx, 0, 1);\n\
         }",
    );
    let func = module.functions.get(module.global_functions[0]);
    assert_eq!(func.parameters[0].semantic.as_deref(), Some("TEXCOORD"));
    assert_eq!(func.return_semantic.as_deref(), Some("SV_TARGET"));

    let body = module.stmts.get(func.body.expect("body"));
    let statements = match body {
        Stmt::Compound { statements } => statements,
        other => panic!("expected a compound body, got {other:?}"),
    };
    let return_value = match module.stmts.get(statements[0]) {
        Stmt::Return { value } => value.expect("return value"),
        other => panic!("expected a return statement, got {other:?}"),
    };
    match module.exprs.get(return_value) {
        Expr::Constructor { arguments, .. } => match module.exprs.get(arguments[0]) {
            Expr::Swizzle { mask, .. } => assert_eq!(*mask, [1, 0, -1, -1]),
            other => panic!("expected a swizzle argument, got {other:?}"),
        },
        other => panic!("expected a constructor, got {other:?}"),
    }
}

// S4. Wrong constructor argument count is X3014.
#[test]
fn s4_wrong_constructor_argument_count_is_an_error() {
    let (_module, diagnostics) = fxc::compile("float4 p = float4(1, 2, 3);", "scenario.fx");
    assert!(!diagnostics.ok());
    assert!(diagnostics.iter().any(|d| d.code == codes::WrongArgumentCount));
}

// S5. Oversized initializer list errors; undersized pads with zero.
#[test]
fn s5_oversized_initializer_list_errors_undersized_pads_with_zero() {
    let (_module, diagnostics) = fxc::compile("int a[2] = { 1, 2, 3 };", "scenario.fx");
    assert!(!diagnostics.ok());
    assert!(diagnostics.iter().any(|d| d.code == codes::CannotConvert));

    let module = compile_ok("int a[3] = { 1 };");
    let var = module.variables.get(module.global_variables[0]);
    let init = var.initializer.expect("initializer");
    match module.exprs.get(init) {
        Expr::InitializerList { values, .. } => {
            assert_eq!(values.len(), 3);
            match literal_value(&module, values[1]) {
                LiteralValue::Int(lanes) => assert_eq!(lanes[0], 0),
                other => panic!("expected a zero-padded int literal, got {other:?}"),
            }
        }
        other => panic!("expected an initializer list, got {other:?}"),
    }
}

// S6. Namespace-qualified lookup resolves and folds across a boundary.
#[test]
fn s6_namespace_qualified_lookup_resolves_and_folds() {
    let module = compile_ok(
        "namespace A {\n\
             static const float pi = 3.14;\n\
             float twice() { return pi * 2.0; }\n\
         }\n\
         float f() { return A::pi; }",
    );

    let twice = module
        .functions
        .iter()
        .find(|f| f.name == "twice")
        .expect("twice");
    let twice_body = match module.stmts.get(twice.body.expect("body")) {
        Stmt::Compound { statements } => statements[0],
        other => panic!("expected compound body, got {other:?}"),
    };
    let twice_return = match module.stmts.get(twice_body) {
        Stmt::Return { value } => value.expect("value"),
        other => panic!("expected return, got {other:?}"),
    };
    match literal_value(&module, twice_return) {
        LiteralValue::Float(lanes) => assert!((lanes[0] - 6.28).abs() < 1e-9),
        other => panic!("expected a folded float literal, got {other:?}"),
    }

    let f = module.functions.iter().find(|f| f.name == "f").expect("f");
    let f_body = match module.stmts.get(f.body.expect("body")) {
        Stmt::Compound { statements } => statements[0],
        other => panic!("expected compound body, got {other:?}"),
    };
    let f_return = match module.stmts.get(f_body) {
        Stmt::Return { value } => value.expect("value"),
        other => panic!("expected return, got {other:?}"),
    };
    match literal_value(&module, f_return) {
        LiteralValue::Float(lanes) => assert!((lanes[0] - 3.14).abs() < 1e-9),
        other => panic!("expected a folded float literal, got {other:?}"),
    }
}

// I1. Round-trip literal: a lexed integer literal carries back its value.
#[test]
fn i1_round_trip_integer_literal() {
    let module = compile_ok("static const int x = 42;");
    let var = module.variables.get(module.global_variables[0]);
    match literal_value(&module, var.initializer.unwrap()) {
        LiteralValue::Int(lanes) => assert_eq!(lanes[0], 42),
        other => panic!("{other:?}"),
    }
}

// I2. Rank monotonicity: identity rank is 1; float truncating to int is
// rank 0 in the int->float direction is fine but int->uint with no array
// mismatch is symmetric in "both 0 or both nonzero" only for incompatible
// shapes; here we check same-type identity and array-size rejection.
#[test]
fn i2_rank_identity_and_array_mismatch() {
    let scalar_int = fxc::Type::INT;
    assert_eq!(fxc::Type::rank(&scalar_int, &scalar_int), 1);

    let arr2 = scalar_int.with_array_length(2);
    let arr3 = scalar_int.with_array_length(3);
    assert_eq!(fxc::Type::rank(&arr2, &arr3), 0);
    assert_eq!(fxc::Type::rank(&arr3, &arr2), 0);
}

// I3. Folder fixpoint: folding an already-folded literal expression
// changes nothing further (checked indirectly: a doubly-nested constant
// expression folds to the same literal as a single-step one).
#[test]
fn i3_folder_fixpoint_on_nested_constant_expression() {
    let once = compile_ok("static const int x = (2 + 3);");
    let twice = compile_ok("static const int x = ((2 + 3));");
    let once_var = once.variables.get(once.global_variables[0]);
    let twice_var = twice.variables.get(twice.global_variables[0]);
    assert_eq!(
        literal_value(&once, once_var.initializer.unwrap()),
        literal_value(&twice, twice_var.initializer.unwrap())
    );
}

// I4. Folder equals runtime arithmetic for a numeric expression.
#[test]
fn i4_folder_matches_runtime_arithmetic() {
    let module = compile_ok("static const float x = 1.5 + 2.25;");
    let var = module.variables.get(module.global_variables[0]);
    match literal_value(&module, var.initializer.unwrap()) {
        LiteralValue::Float(lanes) => assert_eq!(lanes[0], 1.5f64 + 2.25f64),
        other => panic!("{other:?}"),
    }
}

// I5. Scope discipline: an inner shadow does not leak past its scope.
#[test]
fn i5_scope_discipline_inner_shadow_does_not_leak() {
    use fxc::symbols::{DeclRef, SymbolTable};
    let mut table = SymbolTable::new();
    let outer = DeclRef::Variable(fxc::arena::Handle::from_raw(0));
    let inner = DeclRef::Variable(fxc::arena::Handle::from_raw(1));
    assert!(table.insert("x", outer.clone(), false));
    table.enter_scope(None);
    assert!(table.insert("x", inner.clone(), false));
    assert_eq!(table.find("x", false), Some(inner));
    table.leave_scope();
    assert_eq!(table.find("x", false), Some(outer));
}

// I6. Overload determinism: resolution picks the same winner regardless
// of declaration order.
#[test]
fn i6_overload_resolution_is_order_independent() {
    let forward = compile_ok(
        "float pick(float a) { return a; }\n\
         float pick(int a) { return a; }\n\
         float use_it() { return pick(1); }",
    );
    let reversed = compile_ok(
        "float pick(int a) { return a; }\n\
         float pick(float a) { return a; }\n\
         float use_it() { return pick(1); }",
    );

    let resolved_name = |module: &fxc::Module| {
        let use_it = module.functions.iter().find(|f| f.name == "use_it").unwrap();
        let body = match module.stmts.get(use_it.body.unwrap()) {
            Stmt::Compound { statements } => statements[0],
            other => panic!("{other:?}"),
        };
        let value = match module.stmts.get(body) {
            Stmt::Return { value } => value.unwrap(),
            other => panic!("{other:?}"),
        };
        match module.exprs.get(value) {
            Expr::Call { callee, .. } => *callee,
            other => panic!("expected a call, got {other:?}"),
        }
    };

    let forward_callee = resolved_name(&forward);
    let reversed_callee = resolved_name(&reversed);
    let name_of = |module: &fxc::Module, handle: fxc::arena::Handle<fxc::ast::FunctionDecl>| {
        module.functions.get(handle).parameters[0].ty.base_type
    };
    assert_eq!(
        name_of(&forward, forward_callee.unwrap()),
        name_of(&reversed, reversed_callee.unwrap())
    );
    assert_eq!(name_of(&forward, forward_callee.unwrap()), BaseType::Int);
}

// I7. Cast shrinkage: casting a float to int and back truncates per-lane.
#[test]
fn i7_cast_shrinkage_truncates_per_lane() {
    let module = compile_ok("static const float x = (float)(int)(3.75);");
    let var = module.variables.get(module.global_variables[0]);
    match literal_value(&module, var.initializer.unwrap()) {
        LiteralValue::Float(lanes) => assert_eq!(lanes[0], 3.0),
        other => panic!("{other:?}"),
    }
}

// Severity formatting sanity check used by the CLI driver.
#[test]
fn diagnostics_render_hlsl_style_and_separate_by_severity() {
    let (_module, diagnostics) = fxc::compile("float4 p = float4(1, 2, 3);", "bad.fx");
    let errors = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    assert_eq!(errors, 1);
    let rendered = diagnostics.to_string();
    assert!(rendered.contains("bad.fx"));
    assert!(rendered.contains("error X3014"));
}

#[test]
fn arithmetic_on_binary_node_is_folded_away_entirely() {
    let module = compile_ok("static const int x = 10 % 3;");
    let var = module.variables.get(module.global_variables[0]);
    let init = var.initializer.unwrap();
    assert!(!matches!(module.exprs.get(init), Expr::Binary { op: BinaryOp::Mod, .. }));
    match literal_value(&module, init) {
        LiteralValue::Int(lanes) => assert_eq!(lanes[0], 1),
        other => panic!("{other:?}"),
    }
}
