//! Error reporting and diagnostics for Skua.
//!
//! This crate provides structured diagnostics with source location
//! tracking. Diagnostics are created by `skua-infer` and rendered here for
//! display. Every checker failure maps to exactly one [`Category`] with a
//! stable code, so callers can branch on categories instead of matching
//! message text.

use std::fmt;

// ---------------------------------------------------------------------------
// Diagnostic severity and categories
// ---------------------------------------------------------------------------

/// How severe a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Broad category for diagnostics. Used for filtering and grouping.
///
/// The checker reports the first failure and stops, so a failed run carries
/// exactly one error diagnostic. Malformed syntax nodes have no category:
/// the expression and type grammars are closed sum types, so an
/// out-of-grammar node cannot be constructed in the first place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A referenced term variable has no binding in the context.
    UnknownVariable,
    /// An ascribed type is not well-formed in its scope.
    InvalidType,
    /// Two resolved types are incompatible under subtyping.
    SubtypeMismatch,
    /// An existential's candidate solution contains the existential itself.
    CircularInstantiation,
    /// No instantiation rule covers the type shape that was reached.
    InvalidInstantiation,
    /// A non-function type was applied to an argument.
    InvalidApplication,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::UnknownVariable,
        Category::InvalidType,
        Category::SubtypeMismatch,
        Category::CircularInstantiation,
        Category::InvalidInstantiation,
        Category::InvalidApplication,
    ];

    pub fn all() -> &'static [Category] {
        &Self::ALL
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::UnknownVariable => "unknown_variable",
            Category::InvalidType => "invalid_type",
            Category::SubtypeMismatch => "subtype_mismatch",
            Category::CircularInstantiation => "circular_instantiation",
            Category::InvalidInstantiation => "invalid_instantiation",
            Category::InvalidApplication => "invalid_application",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Category::UnknownVariable => "E0001",
            Category::InvalidType => "E0002",
            Category::SubtypeMismatch => "E0003",
            Category::CircularInstantiation => "E0004",
            Category::InvalidInstantiation => "E0005",
            Category::InvalidApplication => "E0006",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::UnknownVariable => "A referenced variable is not bound in the context.",
            Category::InvalidType => "A type annotation is not well-formed in its scope.",
            Category::SubtypeMismatch => "An inferred type is not a subtype of the expected type.",
            Category::CircularInstantiation => {
                "Solving a unification variable would create an infinite type."
            }
            Category::InvalidInstantiation => {
                "A type shape reached instantiation that no rule covers."
            }
            Category::InvalidApplication => "A non-function value was applied to an argument.",
        }
    }
}

// ---------------------------------------------------------------------------
// Source locations (independent of skua-ast's Span)
// ---------------------------------------------------------------------------

/// A source location for diagnostics.
///
/// Uses byte offsets. Callers convert from `skua-ast` spans to this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file_id: u32,
    pub start: u32,
    pub end: u32,
}

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// A structured diagnostic message.
///
/// Every diagnostic carries enough context to produce an actionable error
/// message without exposing checker internals.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Stable diagnostic code (e.g. E0001).
    pub code: Option<String>,
    pub severity: Severity,
    pub category: Category,
    /// Primary message: what went wrong.
    pub message: String,
    /// Where it went wrong.
    pub location: Option<SourceLocation>,
    /// Additional labeled spans (e.g., "expected type came from here").
    pub labels: Vec<DiagLabel>,
    /// Suggested fix, if any.
    pub help: Option<String>,
}

/// A labeled source span within a diagnostic.
#[derive(Debug, Clone)]
pub struct DiagLabel {
    pub location: SourceLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self {
            code: Some(category.code().to_string()),
            severity: Severity::Error,
            category,
            message: message.into(),
            location: None,
            labels: Vec::new(),
            help: None,
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_label(mut self, location: SourceLocation, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel {
            location,
            message: message.into(),
        });
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        if let Some(code) = &self.code {
            write!(f, "{prefix}[{code}]: {}", self.message)?;
        } else {
            write!(f, "{prefix}: {}", self.message)?;
        }
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error type for crates that produce diagnostics
// ---------------------------------------------------------------------------

/// Error type wrapping one or more diagnostics.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", .0.first().map(|d| d.to_string()).unwrap_or_default())]
pub struct DiagnosticError(pub Vec<Diagnostic>);

impl DiagnosticError {
    pub fn single(diag: Diagnostic) -> Self {
        Self(vec![diag])
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0
    }

    /// Category of the primary diagnostic.
    pub fn category(&self) -> Option<Category> {
        self.0.first().map(|d| d.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_builder() {
        let loc = SourceLocation {
            file_id: 0,
            start: 10,
            end: 20,
        };
        let diag = Diagnostic::error(Category::UnknownVariable, "unknown variable `x`")
            .at(loc)
            .with_help("define `x` before using it");

        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code.as_deref(), Some("E0001"));
        assert_eq!(diag.category, Category::UnknownVariable);
        assert_eq!(diag.location, Some(loc));
        assert!(diag.help.unwrap().contains("define `x`"));
    }

    #[test]
    fn diagnostic_display() {
        let diag = Diagnostic::error(Category::SubtypeMismatch, "`Int` is not a subtype of `String`");
        let s = format!("{diag}");
        assert!(s.starts_with("error[E0003]: `Int`"));
    }

    #[test]
    fn category_metadata_is_stable_and_unique() {
        let mut codes = std::collections::BTreeSet::new();
        for cat in Category::all() {
            assert!(!cat.as_str().is_empty());
            assert!(!cat.description().is_empty());
            assert!(
                codes.insert(cat.code()),
                "duplicate diagnostic code detected: {}",
                cat.code()
            );
        }
    }

    #[test]
    fn error_wrapper_exposes_primary_category() {
        let err = DiagnosticError::single(Diagnostic::error(
            Category::CircularInstantiation,
            "cannot solve `^t0` to a type containing itself",
        ));
        assert_eq!(err.category(), Some(Category::CircularInstantiation));
        assert_eq!(err.diagnostics().len(), 1);
    }
}
