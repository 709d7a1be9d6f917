//! Tracing types for checker observability.
//!
//! These types capture step-by-step traces of the bidirectional judgments,
//! enabling external tools to inspect the checker's reasoning process.
//! All tracing is opt-in via `Checker::enable_tracing()` — zero overhead
//! when disabled.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Subtyping / instantiation trace
// ---------------------------------------------------------------------------

/// A single step in a subtyping or instantiation trace.
#[derive(Debug, Clone, Serialize)]
pub struct SubtypeStep {
    pub step: usize,
    pub action: SubtypeAction,
    pub left: String,
    pub right: String,
    pub detail: String,
}

/// What action was taken during a subtyping or instantiation step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtypeAction {
    /// Types are already identical — no-op.
    Refl,
    /// Structural recursion into both sides of an arrow.
    Arrow,
    /// Left quantifier opened with a marker and a fresh existential.
    ForallLeft,
    /// Right quantifier opened as a scope variable.
    ForallRight,
    /// Fell through to left instantiation (`^a <=: A`).
    InstantiateLeft,
    /// Fell through to right instantiation (`A <=: ^a`).
    InstantiateRight,
    /// Existential solved to a well-formed monotype.
    Solve,
    /// Two existentials reached: the later solved in terms of the earlier.
    Reach,
    /// Existential decomposed into an arrow of two fresh existentials.
    Decompose,
    /// Occurs check fired — infinite type prevented.
    OccursCheck,
}

// ---------------------------------------------------------------------------
// Inference trace
// ---------------------------------------------------------------------------

/// A single step in a synthesis/checking trace.
#[derive(Debug, Clone, Serialize)]
pub struct InferStep {
    pub expr: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub rule: InferRule,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<(u32, u32)>,
}

/// Which bidirectional rule fired.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InferRule {
    /// A literal synthesized its base type.
    Literal,
    /// A variable reference synthesized its bound type.
    VarLookup,
    /// An annotation checked its expression against the ascribed type.
    Annotation,
    /// A lambda synthesized an arrow of two fresh existentials.
    LambdaSynth,
    /// An application synthesized its function then dispatched on it.
    App,
    /// Application synthesis opened a quantified function type.
    AppForall,
    /// Application synthesis decomposed an existential function type.
    AppExist,
    /// Application synthesis checked the argument of a concrete arrow.
    AppArrow,
    /// A literal checked against its matching base type.
    LiteralCheck,
    /// A lambda checked against an arrow type.
    LambdaCheck,
    /// Checking opened a universal type as a scope variable.
    ForallIntro,
    /// Checking fell back to synthesis plus subtyping.
    Subsume,
}
