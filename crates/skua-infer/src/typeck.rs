//! Expression-level bidirectional judgments.
//!
//! This module walks AST expressions with the two mutually recursive
//! judgments: synthesis (`=>`) computes a type with no expectation, and
//! checking (`<=`) verifies an expression against an expected type.
//! Application is handled by a third judgment (`=>=>`) that dispatches on
//! the resolved shape of the function's type. Subtyping and instantiation
//! live at the crate root; this module only reaches them through the
//! checking fallback (the Sub rule).

use skua_ast::{Expr, ExprKind, Lit};
use skua_types::{substitute, Type};

use crate::context::{well_formed, Context, Entry};
use crate::trace::InferRule;
use crate::{span_to_location, Category, Checker, Diagnostic, DiagnosticError};

/// Infer the type of a closed expression.
///
/// Runs synthesis under the empty context and resolves the result under
/// the final context, so every solved existential is replaced by its
/// concrete solution. Each call owns a fresh [`Checker`], so fresh-name
/// state never leaks between inferences.
pub fn infer(expr: &Expr) -> Result<Type, DiagnosticError> {
    Checker::new().infer(expr)
}

impl Checker {
    /// Infer the type of a closed expression with this checker.
    ///
    /// See [`infer`] for the common entry point; use this form to inspect
    /// traces afterwards.
    pub fn infer(&mut self, expr: &Expr) -> Result<Type, DiagnosticError> {
        let (ty, ctx) = self.synthesize(expr, &Context::empty())?;
        Ok(ctx.apply(&ty))
    }

    // -----------------------------------------------------------------------
    // Synthesis: Γ ⊢ e => A ⊣ Δ
    // -----------------------------------------------------------------------

    /// Compute a type for `expr` without an expectation.
    pub fn synthesize(
        &mut self,
        expr: &Expr,
        ctx: &Context,
    ) -> Result<(Type, Context), DiagnosticError> {
        match &expr.node {
            ExprKind::Lit(Lit::Int(_)) => {
                self.trace_infer(InferRule::Literal, expr, &Type::Int, "");
                Ok((Type::Int, ctx.clone()))
            }

            ExprKind::Lit(Lit::String(_)) => {
                self.trace_infer(InferRule::Literal, expr, &Type::String, "");
                Ok((Type::String, ctx.clone()))
            }

            ExprKind::Var(name) => match ctx.lookup(name) {
                Some(ty) => {
                    let ty = ty.clone();
                    self.trace_infer(InferRule::VarLookup, expr, &ty, name.clone());
                    Ok((ty, ctx.clone()))
                }
                None => Err(unknown_variable(name, expr)),
            },

            ExprKind::Ann { expr: inner, ty } => {
                if !well_formed(ty, ctx) {
                    return Err(invalid_type(ty, expr));
                }
                self.trace_infer(InferRule::Annotation, expr, ty, "");
                let delta = self.check(inner, ty, ctx)?;
                Ok((ty.clone(), delta))
            }

            ExprKind::Lambda { param, body } => {
                let arg = self.fresh_exist();
                let ret = self.fresh_exist();
                let lambda_ty = Type::arrow(Type::Exist(arg), Type::Exist(ret));
                self.trace_infer(InferRule::LambdaSynth, expr, &lambda_ty, param.clone());

                let binding = Entry::VarTyping(param.clone(), Type::Exist(arg));
                let extended = ctx.push_all([
                    Entry::Unsolved(arg),
                    Entry::Unsolved(ret),
                    binding.clone(),
                ]);
                let out = self.check(body, &Type::Exist(ret), &extended)?;
                let (delta, _) = out.split(&binding);
                Ok((lambda_ty, delta))
            }

            ExprKind::App { func, arg } => {
                let (func_ty, theta) = self.synthesize(func, ctx)?;
                let resolved = theta.apply(&func_ty);
                self.trace_infer(InferRule::App, expr, &resolved, "");
                self.synthesize_application(&resolved, arg, &theta)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Application synthesis: Γ ⊢ A ∙ e =>=> C ⊣ Δ
    // -----------------------------------------------------------------------

    /// Given the (context-resolved) type of a function and its argument
    /// expression, compute the application's result type.
    pub fn synthesize_application(
        &mut self,
        func_ty: &Type,
        arg: &Expr,
        ctx: &Context,
    ) -> Result<(Type, Context), DiagnosticError> {
        match func_ty {
            Type::Forall(name, body) => {
                let opened = self.fresh_exist();
                self.trace_infer(
                    InferRule::AppForall,
                    arg,
                    func_ty,
                    format!("{name} := {}", Type::Exist(opened)),
                );
                let extended = ctx.push(Entry::Unsolved(opened));
                let instantiated = substitute(&Type::Exist(opened), name, body);
                self.synthesize_application(&instantiated, arg, &extended)
            }

            Type::Exist(alpha) => {
                // An unsolved function type must be an arrow of two fresh
                // existentials; the argument then pins down the first.
                self.trace_infer(InferRule::AppExist, arg, func_ty, "");
                let (a1, a2, decomposed) = self.decompose_arrow(*alpha, ctx);
                let delta = self.check(arg, &Type::Exist(a1), &decomposed)?;
                Ok((Type::Exist(a2), delta))
            }

            Type::Arrow(arg_ty, ret_ty) => {
                self.trace_infer(InferRule::AppArrow, arg, func_ty, "");
                let delta = self.check(arg, arg_ty, ctx)?;
                Ok(((**ret_ty).clone(), delta))
            }

            _ => Err(invalid_application(func_ty, arg)),
        }
    }

    // -----------------------------------------------------------------------
    // Checking: Γ ⊢ e <= A ⊣ Δ
    // -----------------------------------------------------------------------

    /// Verify `expr` against `expected`.
    pub fn check(
        &mut self,
        expr: &Expr,
        expected: &Type,
        ctx: &Context,
    ) -> Result<Context, DiagnosticError> {
        match (&expr.node, expected) {
            (ExprKind::Lit(Lit::Int(_)), Type::Int)
            | (ExprKind::Lit(Lit::String(_)), Type::String) => {
                self.trace_infer(InferRule::LiteralCheck, expr, expected, "");
                Ok(ctx.clone())
            }

            (ExprKind::Lambda { param, body }, Type::Arrow(arg_ty, ret_ty)) => {
                self.trace_infer(InferRule::LambdaCheck, expr, expected, param.clone());
                let binding = Entry::VarTyping(param.clone(), (**arg_ty).clone());
                let extended = ctx.push(binding.clone());
                let out = self.check(body, ret_ty, &extended)?;
                let (delta, _) = out.split(&binding);
                Ok(delta)
            }

            (_, Type::Forall(name, body)) => {
                self.trace_infer(InferRule::ForallIntro, expr, expected, name.clone());
                let scope = Entry::TyVar(name.clone());
                let extended = ctx.push(scope.clone());
                let out = self.check(expr, body, &extended)?;
                let (delta, _) = out.split(&scope);
                Ok(delta)
            }

            _ => {
                // Sub rule: synthesize, then compare the resolved types.
                self.trace_infer(InferRule::Subsume, expr, expected, "");
                let (synthesized, theta) = self.synthesize(expr, ctx)?;
                self.subtype(&theta.apply(&synthesized), &theta.apply(expected), &theta)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostic constructors
// ---------------------------------------------------------------------------

fn unknown_variable(name: &str, expr: &Expr) -> DiagnosticError {
    DiagnosticError::single(
        Diagnostic::error(
            Category::UnknownVariable,
            format!("unknown variable `{name}`"),
        )
        .at(span_to_location(expr.span))
        .with_help("define the variable or fix the spelling"),
    )
}

fn invalid_type(ty: &Type, expr: &Expr) -> DiagnosticError {
    DiagnosticError::single(
        Diagnostic::error(
            Category::InvalidType,
            format!("annotated type `{ty}` is not well-formed in this scope"),
        )
        .at(span_to_location(expr.span))
        .with_help("every type variable must be bound by an enclosing `forall`"),
    )
}

fn invalid_application(func_ty: &Type, arg: &Expr) -> DiagnosticError {
    DiagnosticError::single(
        Diagnostic::error(
            Category::InvalidApplication,
            format!("cannot apply an expression of type `{func_ty}`"),
        )
        .at(span_to_location(arg.span))
        .with_label(span_to_location(arg.span), "argument applied here"),
    )
}
