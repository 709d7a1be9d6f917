//! The ordered algorithmic context.
//!
//! A context is a sequence of facts whose order encodes dependency: an
//! entry may only mention variables introduced to its left. All operations
//! return new `Context` values; the recursive judgments rely on old
//! contexts remaining valid after a callee has extended or rewritten its
//! own copy.

use skua_types::{ExistId, Type};

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A single fact in the ordered context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A universal type variable currently in scope.
    TyVar(String),
    /// A term variable together with its type.
    VarTyping(String, Type),
    /// An existential declared but not yet solved.
    Unsolved(ExistId),
    /// An existential with its recorded solution.
    ///
    /// Invariant: the solution never mentions the existential itself (the
    /// occurs-check gates every solve) and only mentions entries to the
    /// left, so solution chains are acyclic.
    Solved(ExistId, Type),
    /// Scope boundary, paired with the existential opened right after it.
    /// Splitting at the marker discards a sub-derivation's local entries.
    Marker(ExistId),
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Ordered sequence of context entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    entries: Vec<Entry>,
}

impl Context {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type of a term variable, if bound.
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::VarTyping(bound, ty) if bound == name => Some(ty),
            _ => None,
        })
    }

    /// Recorded solution of an existential, if solved.
    pub fn find_solved(&self, id: ExistId) -> Option<&Type> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Solved(solved, ty) if *solved == id => Some(ty),
            _ => None,
        })
    }

    /// Structural membership test.
    pub fn contains(&self, entry: &Entry) -> bool {
        self.entries.contains(entry)
    }

    /// Position of the first structurally equal entry.
    ///
    /// Only used to compare the relative order of two unsolved
    /// existentials in the instantiation reach rule.
    pub fn index_of(&self, entry: &Entry) -> Option<usize> {
        self.entries.iter().position(|e| e == entry)
    }

    /// Append a single entry.
    pub fn push(&self, entry: Entry) -> Context {
        let mut entries = self.entries.clone();
        entries.push(entry);
        Context { entries }
    }

    /// Append several entries, preserving their order.
    pub fn push_all(&self, new: impl IntoIterator<Item = Entry>) -> Context {
        let mut entries = self.entries.clone();
        entries.extend(new);
        Context { entries }
    }

    /// Rewrite the first structurally equal occurrence of `old` into the
    /// given entries (zero, one, or many). All other entries are untouched.
    pub fn replace(&self, old: &Entry, new: Vec<Entry>) -> Context {
        let mut entries = Vec::with_capacity(self.entries.len() + new.len());
        let mut replacement = Some(new);
        for entry in &self.entries {
            if entry == old {
                if let Some(new) = replacement.take() {
                    entries.extend(new);
                    continue;
                }
            }
            entries.push(entry.clone());
        }
        Context { entries }
    }

    /// Partition at the first structural match of `entry`: the left part
    /// holds everything before it, the right part the match and everything
    /// after. Callers keep the left part to discard a finished scope.
    pub fn split(&self, entry: &Entry) -> (Context, Context) {
        let at = self.index_of(entry).unwrap_or(self.entries.len());
        let (left, right) = self.entries.split_at(at);
        (
            Context {
                entries: left.to_vec(),
            },
            Context {
                entries: right.to_vec(),
            },
        )
    }

    /// Context application `[Γ]A`: replace every solved existential in the
    /// type with its solution, transitively.
    ///
    /// Terminates because solution chains are acyclic (see
    /// [`Entry::Solved`]); unsolved existentials, base types, and bound
    /// variables pass through unchanged.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Int | Type::String | Type::Var(_) => ty.clone(),
            Type::Exist(id) => match self.find_solved(*id) {
                Some(solution) => self.apply(solution),
                None => ty.clone(),
            },
            Type::Arrow(arg, ret) => Type::arrow(self.apply(arg), self.apply(ret)),
            Type::Forall(name, body) => Type::Forall(name.clone(), Box::new(self.apply(body))),
        }
    }
}

// ---------------------------------------------------------------------------
// Well-formedness
// ---------------------------------------------------------------------------

/// Whether `ty` is meaningful under `ctx`: every bound variable has a scope
/// entry and every existential is declared (solved or not).
pub fn well_formed(ty: &Type, ctx: &Context) -> bool {
    match ty {
        Type::Int | Type::String => true,
        Type::Var(name) => ctx.contains(&Entry::TyVar(name.clone())),
        Type::Exist(id) => ctx.contains(&Entry::Unsolved(*id)) || ctx.find_solved(*id).is_some(),
        Type::Arrow(arg, ret) => well_formed(arg, ctx) && well_formed(ret, ctx),
        Type::Forall(name, body) => well_formed(body, &ctx.push(Entry::TyVar(name.clone()))),
    }
}
