//! Semantic type representations for Skua.
//!
//! This crate defines the types manipulated by the bidirectional checker,
//! along with the pure tree operations the algorithm needs: substitution,
//! the occurs-check, and the monotype test. Types are immutable values with
//! structural equality; every operation returns a new tree.

use std::fmt;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Unique identifier for an existential (unification) variable.
///
/// Existentials are minted from a checker-owned counter, so two distinct
/// `ExistId`s never alias within one checking run. Universally bound
/// variables keep their source names as strings; those names are assumed
/// globally fresh (see [`substitute`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExistId(pub u32);

impl fmt::Display for ExistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "^t{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A semantic type.
///
/// Structural equality is the equality of the algorithm: two types are the
/// same exactly when their trees are the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Integer base type.
    Int,
    /// String base type.
    String,
    /// Universally bound type variable, in scope via an enclosing
    /// [`Type::Forall`] or a context scope entry.
    Var(String),
    /// Existential variable awaiting a solution in the context.
    Exist(ExistId),
    /// Function type. Subtyping treats the argument contravariantly.
    Arrow(Box<Type>, Box<Type>),
    /// Universal quantification `forall a. body`.
    Forall(String, Box<Type>),
}

impl Type {
    pub fn var(name: impl Into<String>) -> Self {
        Type::Var(name.into())
    }

    pub fn arrow(arg: Type, ret: Type) -> Self {
        Type::Arrow(Box::new(arg), Box::new(ret))
    }

    pub fn forall(name: impl Into<String>, body: Type) -> Self {
        Type::Forall(name.into(), Box::new(body))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::String => write!(f, "String"),
            Type::Var(name) => write!(f, "{name}"),
            Type::Exist(id) => write!(f, "{id}"),
            Type::Arrow(arg, ret) => {
                // Arrows associate to the right; parenthesize a higher-order
                // or quantified argument.
                if matches!(**arg, Type::Arrow(_, _) | Type::Forall(_, _)) {
                    write!(f, "({arg}) -> {ret}")
                } else {
                    write!(f, "{arg} -> {ret}")
                }
            }
            Type::Forall(name, body) => write!(f, "forall {name}. {body}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pure tree operations
// ---------------------------------------------------------------------------

/// Replace every free occurrence of the universal variable `var` in `ty`
/// with `replacement`.
///
/// A `Forall` binding the same name shadows `var` and stops the descent.
/// No alpha renaming is performed beyond that: callers must only
/// substitute names that are globally fresh relative to `replacement`,
/// which holds because every generated name comes from a per-run counter.
pub fn substitute(replacement: &Type, var: &str, ty: &Type) -> Type {
    match ty {
        Type::Int | Type::String | Type::Exist(_) => ty.clone(),
        Type::Var(name) => {
            if name == var {
                replacement.clone()
            } else {
                ty.clone()
            }
        }
        Type::Arrow(arg, ret) => Type::arrow(
            substitute(replacement, var, arg),
            substitute(replacement, var, ret),
        ),
        Type::Forall(name, body) => {
            if name == var {
                ty.clone()
            } else {
                Type::Forall(name.clone(), Box::new(substitute(replacement, var, body)))
            }
        }
    }
}

/// Whether the existential `id` occurs anywhere in `ty`.
///
/// Solving an existential to a type it occurs in would make context
/// application loop forever, so every solve is gated on this check.
pub fn occurs(id: ExistId, ty: &Type) -> bool {
    match ty {
        Type::Int | Type::String | Type::Var(_) => false,
        Type::Exist(other) => *other == id,
        Type::Arrow(arg, ret) => occurs(id, arg) || occurs(id, ret),
        Type::Forall(_, body) => occurs(id, body),
    }
}

/// Whether `ty` is free of universal quantifiers, at any depth.
///
/// Only monotypes may be recorded as existential solutions.
pub fn is_monotype(ty: &Type) -> bool {
    match ty {
        Type::Int | Type::String | Type::Var(_) | Type::Exist(_) => true,
        Type::Arrow(arg, ret) => is_monotype(arg) && is_monotype(ret),
        Type::Forall(_, _) => false,
    }
}
