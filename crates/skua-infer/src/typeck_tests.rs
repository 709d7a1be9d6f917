//! Tests for the bidirectional judgments and the `infer` entry point.
//!
//! Each test constructs an AST by hand and checks the inferred type or the
//! reported diagnostic category. This is verbose but precise — we know
//! exactly what we're testing.

use skua_ast::{Expr, ExprKind, FileId, Lit, Span, Spanned};
use skua_types::{ExistId, Type};

use crate::context::Context;
use crate::typeck::infer;
use crate::{Category, Checker};

// ---------------------------------------------------------------------------
// Helpers for constructing AST nodes
// ---------------------------------------------------------------------------

fn sp(node: ExprKind) -> Expr {
    Spanned::new(node, Span::synthetic())
}

fn lit_int(n: i64) -> Expr {
    sp(ExprKind::Lit(Lit::Int(n)))
}

fn lit_str(s: &str) -> Expr {
    sp(ExprKind::Lit(Lit::String(s.to_string())))
}

fn var(name: &str) -> Expr {
    sp(ExprKind::Var(name.to_string()))
}

fn ann(expr: Expr, ty: Type) -> Expr {
    sp(ExprKind::Ann {
        expr: Box::new(expr),
        ty,
    })
}

fn lam(param: &str, body: Expr) -> Expr {
    sp(ExprKind::Lambda {
        param: param.to_string(),
        body: Box::new(body),
    })
}

fn app(func: Expr, arg: Expr) -> Expr {
    sp(ExprKind::App {
        func: Box::new(func),
        arg: Box::new(arg),
    })
}

/// `(\x. x) : forall a. a -> a`
fn poly_id() -> Expr {
    ann(
        lam("x", var("x")),
        Type::forall("a", Type::arrow(Type::var("a"), Type::var("a"))),
    )
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

#[test]
fn integer_literal_synthesizes_int() {
    assert_eq!(infer(&lit_int(42)).unwrap(), Type::Int);
}

#[test]
fn string_literal_synthesizes_string() {
    assert_eq!(infer(&lit_str("hi")).unwrap(), Type::String);
}

#[test]
fn unknown_variable_fails_in_empty_context() {
    let err = infer(&var("x")).unwrap_err();
    assert_eq!(err.category(), Some(Category::UnknownVariable));
    assert_eq!(err.diagnostics()[0].code.as_deref(), Some("E0001"));
}

#[test]
fn unknown_variable_reports_its_span() {
    let expr = Spanned::new(
        ExprKind::Var("missing".to_string()),
        Span::new(FileId(0), 3, 10),
    );
    let err = infer(&expr).unwrap_err();
    let loc = err.diagnostics()[0].location.unwrap();
    assert_eq!((loc.start, loc.end), (3, 10));
}

#[test]
fn annotation_returns_the_ascribed_type() {
    assert_eq!(infer(&ann(lit_int(1), Type::Int)).unwrap(), Type::Int);
    assert_eq!(
        infer(&ann(lit_str("hello"), Type::String)).unwrap(),
        Type::String
    );
}

#[test]
fn annotation_with_unbound_type_variable_is_rejected() {
    let err = infer(&ann(lit_int(1), Type::var("a"))).unwrap_err();
    assert_eq!(err.category(), Some(Category::InvalidType));
}

#[test]
fn annotation_against_wrong_base_type_is_rejected() {
    let err = infer(&ann(lit_str("hi"), Type::Int)).unwrap_err();
    assert_eq!(err.category(), Some(Category::SubtypeMismatch));
}

#[test]
fn unannotated_lambda_synthesizes_existential_arrow() {
    // The body equates the result existential with the parameter's, so the
    // resolved type is ^t0 -> ^t0.
    let inferred = infer(&lam("x", var("x"))).unwrap();
    assert_eq!(
        inferred,
        Type::arrow(Type::Exist(ExistId(0)), Type::Exist(ExistId(0)))
    );
    assert_eq!(inferred.to_string(), "^t0 -> ^t0");
}

#[test]
fn lambda_body_sees_the_parameter() {
    // \x. (x : Int) pins the parameter existential to Int.
    let expr = lam("x", ann(var("x"), Type::Int));
    let err = infer(&expr);
    // The annotation checks x against Int via the Sub rule, solving ^t0.
    assert_eq!(err.unwrap(), Type::arrow(Type::Int, Type::Int));
}

#[test]
fn repeated_inference_is_deterministic() {
    // Fresh-name state is per-run; two independent calls agree exactly.
    let expr = lam("x", var("x"));
    assert_eq!(infer(&expr).unwrap(), infer(&expr).unwrap());
}

// ---------------------------------------------------------------------------
// Checking
// ---------------------------------------------------------------------------

#[test]
fn annotation_check_consistency() {
    // If check(e, T) succeeds under the empty context, infer((e : T)) = T.
    let e = lam("x", var("x"));
    let t = Type::arrow(Type::Int, Type::Int);

    let mut checker = Checker::new();
    assert!(checker.check(&e, &t, &Context::empty()).is_ok());
    assert_eq!(infer(&ann(e, t.clone())).unwrap(), t);
}

#[test]
fn lambda_checks_against_matching_arrow() {
    let mut checker = Checker::new();
    let out = checker.check(
        &lam("x", var("x")),
        &Type::arrow(Type::String, Type::String),
        &Context::empty(),
    );
    assert_eq!(out.unwrap(), Context::empty());
}

#[test]
fn lambda_body_must_match_the_arrow_result() {
    let mut checker = Checker::new();
    let err = checker
        .check(
            &lam("x", var("x")),
            &Type::arrow(Type::Int, Type::String),
            &Context::empty(),
        )
        .unwrap_err();
    assert_eq!(err.category(), Some(Category::SubtypeMismatch));
}

#[test]
fn identity_checks_against_its_polymorphic_type() {
    let inferred = infer(&poly_id()).unwrap();
    assert_eq!(
        inferred,
        Type::forall("a", Type::arrow(Type::var("a"), Type::var("a")))
    );
}

#[test]
fn literal_checks_against_quantified_base_type() {
    // 1 <= forall a. Int holds: the quantifier opens and the base matches.
    let expr = ann(lit_int(1), Type::forall("a", Type::Int));
    assert_eq!(infer(&expr).unwrap(), Type::forall("a", Type::Int));
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

#[test]
fn polymorphic_function_applies_to_a_monomorphic_argument() {
    // callWith42 : (Int -> Int) -> Int applied to the polymorphic identity.
    let call_with_42 = ann(
        lam("f", app(var("f"), lit_int(42))),
        Type::arrow(Type::arrow(Type::Int, Type::Int), Type::Int),
    );
    let inferred = infer(&app(call_with_42, poly_id())).unwrap();
    assert_eq!(inferred, Type::Int);
}

#[test]
fn polymorphic_identity_applies_directly() {
    assert_eq!(infer(&app(poly_id(), lit_int(42))).unwrap(), Type::Int);
    assert_eq!(
        infer(&app(poly_id(), lit_str("hi"))).unwrap(),
        Type::String
    );
}

#[test]
fn unannotated_function_parameter_is_applicable() {
    // \f. f 42 decomposes f's existential into an arrow and pins the
    // argument half to Int.
    let inferred = infer(&lam("f", app(var("f"), lit_int(42)))).unwrap();
    match inferred {
        Type::Arrow(param, ret) => {
            assert_eq!(*param, Type::arrow(Type::Int, Type::Exist(ExistId(3))));
            assert_eq!(*ret, Type::Exist(ExistId(3)));
        }
        other => panic!("expected an arrow, got {other}"),
    }
}

#[test]
fn rank_two_parameter_accepts_polymorphic_argument() {
    // \f. f 0 checked against (forall a. a -> a) -> Int: the polymorphic
    // bound of f survives into the body, where it opens per use.
    let expr = ann(
        lam("f", app(var("f"), lit_int(0))),
        Type::arrow(
            Type::forall("a", Type::arrow(Type::var("a"), Type::var("a"))),
            Type::Int,
        ),
    );
    let inferred = infer(&expr).unwrap();
    assert_eq!(
        inferred,
        Type::arrow(
            Type::forall("a", Type::arrow(Type::var("a"), Type::var("a"))),
            Type::Int,
        )
    );
}

#[test]
fn applying_a_non_function_is_rejected() {
    let err = infer(&app(lit_int(1), lit_int(2))).unwrap_err();
    assert_eq!(err.category(), Some(Category::InvalidApplication));
    assert_eq!(err.diagnostics()[0].code.as_deref(), Some("E0006"));
}

#[test]
fn argument_type_mismatch_is_rejected() {
    let inc = ann(lam("x", var("x")), Type::arrow(Type::Int, Type::Int));
    let err = infer(&app(inc, lit_str("not an int"))).unwrap_err();
    assert_eq!(err.category(), Some(Category::SubtypeMismatch));
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

#[test]
fn tracing_captures_the_rule_sequence() {
    let mut checker = Checker::new();
    checker.enable_tracing();
    checker.infer(&app(poly_id(), lit_int(42))).unwrap();

    let rules: Vec<String> = checker
        .infer_trace()
        .iter()
        .map(|s| format!("{:?}", s.rule))
        .collect();
    assert!(rules.iter().any(|r| r == "Annotation"));
    assert!(rules.iter().any(|r| r == "ForallIntro"));
    assert!(rules.iter().any(|r| r == "AppForall"));
    assert!(rules.iter().any(|r| r == "Subsume"));
    // Instantiation of the opened quantifier shows up on the subtype side.
    assert!(!checker.subtype_trace().is_empty());
}

#[test]
fn tracing_is_empty_when_disabled() {
    let mut checker = Checker::new();
    checker.infer(&app(poly_id(), lit_int(42))).unwrap();
    assert!(checker.infer_trace().is_empty());
    assert!(checker.subtype_trace().is_empty());
}
