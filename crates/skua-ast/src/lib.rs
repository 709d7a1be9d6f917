//! AST node definitions and source spans for Skua.
//!
//! This crate defines the expression tree the checker consumes. The parser
//! producing these trees is an external collaborator; hand-built trees (for
//! example in tests) use [`Span::synthetic`]. Type annotations carry
//! already-elaborated [`skua_types::Type`] values rather than a separate
//! syntactic type grammar.

use std::fmt;

use skua_types::Type;

/// Identifies a source file in the checking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// A byte offset range within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub file: FileId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Create a span that covers both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        debug_assert_eq!(
            self.file, other.file,
            "cannot merge spans from different files"
        );
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// A synthetic span for hand-built or generated nodes.
    pub fn synthetic() -> Self {
        Self {
            file: FileId(u32::MAX),
            start: 0,
            end: 0,
        }
    }

    /// Whether this span was produced by [`Span::synthetic`].
    pub fn is_synthetic(self) -> bool {
        self.file == FileId(u32::MAX)
    }
}

/// A value paired with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }
}

// ---------------------------------------------------------------------------
// Literal values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Int(i64),
    String(String),
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

pub type Expr = Spanned<ExprKind>;

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Literal value.
    Lit(Lit),

    /// Variable reference.
    Var(String),

    /// Type ascription: `(expr : ty)`.
    Ann { expr: Box<Expr>, ty: Type },

    /// Single-parameter lambda: `\param. body`.
    Lambda { param: String, body: Box<Expr> },

    /// Function application: `func arg`.
    App { func: Box<Expr>, arg: Box<Expr> },
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprKind::Lit(Lit::Int(value)) => write!(f, "{value}"),
            ExprKind::Lit(Lit::String(value)) => write!(f, "{value:?}"),
            ExprKind::Var(name) => write!(f, "{name}"),
            ExprKind::Ann { expr, ty } => write!(f, "({} : {ty})", expr.node),
            ExprKind::Lambda { param, body } => write!(f, "\\{param}. {}", body.node),
            ExprKind::App { func, arg } => write!(f, "({} {})", func.node, arg.node),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_merge_covers_both() {
        let a = Span::new(FileId(0), 2, 5);
        let b = Span::new(FileId(0), 4, 9);
        assert_eq!(a.merge(b), Span::new(FileId(0), 2, 9));
    }

    #[test]
    fn synthetic_spans_are_marked() {
        assert!(Span::synthetic().is_synthetic());
        assert!(!Span::new(FileId(0), 0, 1).is_synthetic());
    }

    #[test]
    fn display_renders_nested_expressions() {
        let sp = |node| Expr::new(node, Span::synthetic());
        let expr = sp(ExprKind::App {
            func: Box::new(sp(ExprKind::Lambda {
                param: "x".into(),
                body: Box::new(sp(ExprKind::Var("x".into()))),
            })),
            arg: Box::new(sp(ExprKind::Lit(Lit::Int(42)))),
        });
        assert_eq!(expr.to_string(), "(\\x. x 42)");
    }
}
