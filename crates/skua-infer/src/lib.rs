//! Bidirectional type checking with higher-rank polymorphism for Skua.
//!
//! This crate implements:
//! - Synthesis (`=>`) and checking (`<=`) over the expression AST
//! - Subtyping (`<:`) driving existential instantiation (`<=:`)
//! - An ordered, immutable algorithmic context with scoped cleanup
//!
//! The judgments are mutually recursive and recurse as deeply as the input
//! expression and type nesting, so recursion depth is bounded by input
//! size, not context size. Apart from the checker-owned fresh-variable
//! counter the algorithm is purely functional: every context operation
//! returns a new value, and old contexts stay valid across recursive calls.

pub mod context;
pub mod trace;
pub mod typeck;

use skua_ast::Span;
use skua_types::{is_monotype, occurs, substitute, ExistId, Type};

use crate::context::{well_formed, Context, Entry};
use crate::trace::{InferRule, InferStep, SubtypeAction, SubtypeStep};

// Re-export for convenience.
pub use skua_diag::{Category, Diagnostic, DiagnosticError, Severity, SourceLocation};

pub use crate::context::well_formed as type_well_formed;
pub use crate::typeck::infer;

// ---------------------------------------------------------------------------
// Checker: fresh variables, tracing, subtyping and instantiation
// ---------------------------------------------------------------------------

/// Drives the mutually recursive bidirectional judgments.
///
/// Owns the fresh-existential counter and the optional trace buffers, so
/// repeated top-level inferences never observe leaked state: the counter is
/// per-checker, and [`typeck::infer`] constructs a fresh checker per call.
/// Reusing one checker for several inferences is also safe — the counter
/// only grows, so generated names stay distinct.
#[derive(Debug, Default)]
pub struct Checker {
    next_exist: u32,
    tracing: bool,
    infer_steps: Vec<InferStep>,
    subtype_steps: Vec<SubtypeStep>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint an existential distinct from every other in this run.
    pub fn fresh_exist(&mut self) -> ExistId {
        let id = ExistId(self.next_exist);
        self.next_exist += 1;
        id
    }

    /// Enable step-by-step tracing for observability tools.
    pub fn enable_tracing(&mut self) {
        self.tracing = true;
    }

    /// Whether tracing is currently enabled.
    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    /// Get the collected synthesis/checking trace.
    pub fn infer_trace(&self) -> &[InferStep] {
        &self.infer_steps
    }

    /// Get the collected subtyping/instantiation trace.
    pub fn subtype_trace(&self) -> &[SubtypeStep] {
        &self.subtype_steps
    }

    pub(crate) fn trace_infer(
        &mut self,
        rule: InferRule,
        expr: &skua_ast::Expr,
        ty: &Type,
        detail: impl Into<String>,
    ) {
        if !self.tracing {
            return;
        }
        let span = if expr.span.is_synthetic() {
            None
        } else {
            Some((expr.span.start, expr.span.end))
        };
        self.infer_steps.push(InferStep {
            expr: expr.to_string(),
            ty: ty.to_string(),
            rule,
            detail: detail.into(),
            span,
        });
    }

    fn trace_subtype(
        &mut self,
        action: SubtypeAction,
        left: &Type,
        right: &Type,
        detail: impl Into<String>,
    ) {
        if !self.tracing {
            return;
        }
        let step = self.subtype_steps.len();
        self.subtype_steps.push(SubtypeStep {
            step,
            action,
            left: left.to_string(),
            right: right.to_string(),
            detail: detail.into(),
        });
    }

    // -----------------------------------------------------------------------
    // Subtyping: Γ ⊢ A <: B ⊣ Δ
    // -----------------------------------------------------------------------

    /// Establish `left <: right` under `ctx`, returning the output context.
    ///
    /// Quantifiers on the right are opened before quantifiers on the left;
    /// with two quantified sides, opening the right one first is required
    /// for completeness (the left-opened existential must be able to reach
    /// the right side's scope variable).
    pub fn subtype(
        &mut self,
        left: &Type,
        right: &Type,
        ctx: &Context,
    ) -> Result<Context, DiagnosticError> {
        match (left, right) {
            (Type::Int, Type::Int) | (Type::String, Type::String) => {
                self.trace_subtype(SubtypeAction::Refl, left, right, "base types match");
                Ok(ctx.clone())
            }

            (Type::Var(a), Type::Var(b)) => {
                if a == b {
                    self.trace_subtype(SubtypeAction::Refl, left, right, "same scope variable");
                    Ok(ctx.clone())
                } else {
                    Err(subtype_mismatch(left, right))
                }
            }

            (Type::Exist(a), Type::Exist(b)) => {
                if a == b {
                    self.trace_subtype(SubtypeAction::Refl, left, right, "same existential");
                    Ok(ctx.clone())
                } else {
                    self.trace_subtype(SubtypeAction::InstantiateRight, left, right, "");
                    self.instantiate_right(left, *b, ctx)
                }
            }

            (Type::Arrow(a1, a2), Type::Arrow(b1, b2)) => {
                self.trace_subtype(
                    SubtypeAction::Arrow,
                    left,
                    right,
                    "contravariant argument, covariant result",
                );
                let theta = self.subtype(b1, a1, ctx)?;
                self.subtype(&theta.apply(a2), &theta.apply(b2), &theta)
            }

            (_, Type::Forall(name, body)) => {
                self.trace_subtype(SubtypeAction::ForallRight, left, right, name.clone());
                let scope = Entry::TyVar(name.clone());
                let extended = ctx.push(scope.clone());
                let out = self.subtype(left, body, &extended)?;
                let (delta, _) = out.split(&scope);
                Ok(delta)
            }

            (Type::Forall(name, body), _) => {
                let opened = self.fresh_exist();
                self.trace_subtype(
                    SubtypeAction::ForallLeft,
                    left,
                    right,
                    format!("{name} := {}", Type::Exist(opened)),
                );
                let marker = Entry::Marker(opened);
                let extended = ctx.push(marker.clone()).push(Entry::Unsolved(opened));
                let instantiated = substitute(&Type::Exist(opened), name, body);
                let out = self.subtype(&instantiated, right, &extended)?;
                let (delta, _) = out.split(&marker);
                Ok(delta)
            }

            (Type::Exist(a), _) => {
                if occurs(*a, right) {
                    self.trace_subtype(SubtypeAction::OccursCheck, left, right, "");
                    return Err(circular_instantiation(*a, right));
                }
                self.trace_subtype(SubtypeAction::InstantiateLeft, left, right, "");
                self.instantiate_left(*a, right, ctx)
            }

            (_, Type::Exist(b)) => {
                if occurs(*b, left) {
                    self.trace_subtype(SubtypeAction::OccursCheck, left, right, "");
                    return Err(circular_instantiation(*b, left));
                }
                self.trace_subtype(SubtypeAction::InstantiateRight, left, right, "");
                self.instantiate_right(left, *b, ctx)
            }

            _ => Err(subtype_mismatch(left, right)),
        }
    }

    // -----------------------------------------------------------------------
    // Instantiation: Γ[^a] ⊢ ^a <=: A ⊣ Δ  and  Γ[^a] ⊢ A <=: ^a ⊣ Δ
    // -----------------------------------------------------------------------

    /// Solve `alpha` such that `^alpha <: ty`.
    ///
    /// `alpha` must be unsolved in `ctx` and must not occur in `ty`; the
    /// caller establishes the occurs-check before delegating here.
    pub fn instantiate_left(
        &mut self,
        alpha: ExistId,
        ty: &Type,
        ctx: &Context,
    ) -> Result<Context, DiagnosticError> {
        let unsolved = Entry::Unsolved(alpha);
        if !ctx.contains(&unsolved) {
            return Err(invalid_instantiation(alpha, ty));
        }
        if let Some(out) = self.try_solve(alpha, ty, ctx) {
            return Ok(out);
        }

        match ty {
            Type::Exist(beta) => self.reach(alpha, *beta, ctx),

            Type::Arrow(arg, ret) => {
                let (a1, a2, decomposed) = self.decompose_arrow(alpha, ctx);
                let theta = self.instantiate_right(arg, a1, &decomposed)?;
                self.instantiate_left(a2, &theta.apply(ret), &theta)
            }

            Type::Forall(name, body) => {
                // The existential may be solved to a polymorphic type's
                // instances, so the quantifier opens as a plain scope
                // variable and is discarded afterwards.
                let scope = Entry::TyVar(name.clone());
                let extended = ctx.push(scope.clone());
                let out = self.instantiate_left(alpha, body, &extended)?;
                let (delta, _) = out.split(&scope);
                Ok(delta)
            }

            _ => Err(invalid_instantiation(alpha, ty)),
        }
    }

    /// Solve `alpha` such that `ty <: ^alpha`.
    ///
    /// Same preconditions as [`Checker::instantiate_left`].
    pub fn instantiate_right(
        &mut self,
        ty: &Type,
        alpha: ExistId,
        ctx: &Context,
    ) -> Result<Context, DiagnosticError> {
        let unsolved = Entry::Unsolved(alpha);
        if !ctx.contains(&unsolved) {
            return Err(invalid_instantiation(alpha, ty));
        }
        if let Some(out) = self.try_solve(alpha, ty, ctx) {
            return Ok(out);
        }

        match ty {
            Type::Exist(beta) => self.reach(alpha, *beta, ctx),

            Type::Arrow(arg, ret) => {
                let (a1, a2, decomposed) = self.decompose_arrow(alpha, ctx);
                let theta = self.instantiate_left(a1, arg, &decomposed)?;
                self.instantiate_right(&theta.apply(ret), a2, &theta)
            }

            Type::Forall(name, body) => {
                // A monotype solution cannot bind the quantifier's
                // variable, so it is renamed to a fresh existential behind
                // a marker; splitting at the marker discards the scope.
                let opened = self.fresh_exist();
                let marker = Entry::Marker(opened);
                let extended = ctx.push(marker.clone()).push(Entry::Unsolved(opened));
                let renamed = substitute(&Type::Exist(opened), name, body);
                let out = self.instantiate_right(&renamed, alpha, &extended)?;
                let (delta, _) = out.split(&marker);
                Ok(delta)
            }

            _ => Err(invalid_instantiation(alpha, ty)),
        }
    }

    /// Solve rule shared by both directions: a monotype that is well-formed
    /// under the entries *preceding* the existential becomes its solution.
    /// The prefix restriction keeps solutions referencing only earlier
    /// entries.
    fn try_solve(&mut self, alpha: ExistId, ty: &Type, ctx: &Context) -> Option<Context> {
        let unsolved = Entry::Unsolved(alpha);
        let (before, _) = ctx.split(&unsolved);
        if is_monotype(ty) && well_formed(ty, &before) {
            self.trace_subtype(
                SubtypeAction::Solve,
                &Type::Exist(alpha),
                ty,
                format!("{alpha} := {ty}"),
            );
            Some(ctx.replace(&unsolved, vec![Entry::Solved(alpha, ty.clone())]))
        } else {
            None
        }
    }

    /// Reach rule: two unsolved existentials meet, and the later-declared
    /// one is solved to the earlier so the solution only references
    /// preceding entries.
    fn reach(
        &mut self,
        alpha: ExistId,
        beta: ExistId,
        ctx: &Context,
    ) -> Result<Context, DiagnosticError> {
        let a = Entry::Unsolved(alpha);
        let b = Entry::Unsolved(beta);
        match (ctx.index_of(&a), ctx.index_of(&b)) {
            (Some(at_a), Some(at_b)) if at_a < at_b => {
                self.trace_subtype(
                    SubtypeAction::Reach,
                    &Type::Exist(alpha),
                    &Type::Exist(beta),
                    format!("{beta} := {alpha}"),
                );
                Ok(ctx.replace(&b, vec![Entry::Solved(beta, Type::Exist(alpha))]))
            }
            (Some(_), Some(_)) => {
                self.trace_subtype(
                    SubtypeAction::Reach,
                    &Type::Exist(alpha),
                    &Type::Exist(beta),
                    format!("{alpha} := {beta}"),
                );
                Ok(ctx.replace(&a, vec![Entry::Solved(alpha, Type::Exist(beta))]))
            }
            _ => Err(invalid_instantiation(alpha, &Type::Exist(beta))),
        }
    }

    /// Arrow rule shared by both directions: rewrite `^alpha` into
    /// `^a1 -> ^a2` with both halves unsolved, in place.
    fn decompose_arrow(&mut self, alpha: ExistId, ctx: &Context) -> (ExistId, ExistId, Context) {
        let a1 = self.fresh_exist();
        let a2 = self.fresh_exist();
        let solution = Type::arrow(Type::Exist(a1), Type::Exist(a2));
        self.trace_subtype(
            SubtypeAction::Decompose,
            &Type::Exist(alpha),
            &solution,
            format!("{alpha} := {solution}"),
        );
        let rewritten = ctx.replace(
            &Entry::Unsolved(alpha),
            vec![
                Entry::Unsolved(a2),
                Entry::Unsolved(a1),
                Entry::Solved(alpha, solution),
            ],
        );
        (a1, a2, rewritten)
    }
}

// ---------------------------------------------------------------------------
// Diagnostic constructors
// ---------------------------------------------------------------------------

pub(crate) fn span_to_location(span: Span) -> SourceLocation {
    SourceLocation {
        file_id: span.file.0,
        start: span.start,
        end: span.end,
    }
}

fn subtype_mismatch(left: &Type, right: &Type) -> DiagnosticError {
    DiagnosticError::single(Diagnostic::error(
        Category::SubtypeMismatch,
        format!("`{left}` is not a subtype of `{right}`"),
    ))
}

fn circular_instantiation(alpha: ExistId, ty: &Type) -> DiagnosticError {
    DiagnosticError::single(
        Diagnostic::error(
            Category::CircularInstantiation,
            format!("cannot solve `{alpha}` to `{ty}`: the solution would contain itself"),
        )
        .with_help("this would create an infinite type"),
    )
}

fn invalid_instantiation(alpha: ExistId, ty: &Type) -> DiagnosticError {
    DiagnosticError::single(Diagnostic::error(
        Category::InvalidInstantiation,
        format!("no instantiation rule applies for `{alpha}` against `{ty}`"),
    ))
}


#[cfg(test)]
mod typeck_tests;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
