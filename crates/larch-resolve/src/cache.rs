//! Side-table memoization of resolution results.
//!
//! The syntax trees stay immutable; everything the resolver computes once and
//! reuses lives here, keyed by [`DeclRef`]. The lock is held only for a single
//! lookup or insert, never while resolving.

use crate::reference::{Candidates, DeclRef, Position, Resolved};
use fxhash::FxHashMap;
use parking_lot::Mutex;

/// The per-declaration slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// The value of a variable, entity, property, parameter or pair.
    Value,
    /// The instantiated base class of a heritage clause.
    Heritage,
    /// The instantiated class a bounded generic unwraps to.
    Unwrap,
    /// The receiver instance `this` denotes inside a class, or `self` inside a function.
    Receiver,
}

#[derive(Debug, Default)]
struct CacheInner {
    slots: FxHashMap<(SlotKind, DeclRef), Resolved>,
    expressions: FxHashMap<(DeclRef, Position), Candidates>,
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
    inner: Mutex<CacheInner>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, kind: SlotKind, decl: DeclRef) -> Option<Resolved> {
        self.inner.lock().slots.get(&(kind, decl)).copied()
    }

    /// Stores `resolved` unless the slot is already filled; returns the entry that
    /// ends up in the slot.
    pub fn store_slot(&self, kind: SlotKind, decl: DeclRef, resolved: Resolved) -> Resolved {
        *self.inner.lock().slots.entry((kind, decl)).or_insert(resolved)
    }

    pub fn candidates(&self, expr: DeclRef, position: Position) -> Option<Candidates> {
        self.inner.lock().expressions.get(&(expr, position)).cloned()
    }

    /// Stores the candidate set of an expression unless one is already present;
    /// returns the set that ends up cached.
    pub fn store_candidates(&self, expr: DeclRef, position: Position, candidates: Candidates) -> Candidates {
        self.inner.lock().expressions.entry((expr, position)).or_insert(candidates).clone()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock();
        inner.slots.len() + inner.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.slots.clear();
        inner.expressions.clear();
    }
}
