//! Clauses: shared multisets of literals with derivation metadata
//!
//! A clause owns its literal handles plus the attributes the saturation
//! loop needs: age, cached weight, input kind, color, the inference record
//! that produced it, and its current store class. Parent pointers are
//! `Arc<Clause>`, so every ancestor of a live clause stays alive and proof
//! reconstruction is a plain DAG walk.

use crate::fol::signature::Signature;
use crate::fol::term::{LiteralId, TermStore, VarId};
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

/// Origin kind of a unit, ordered so a derived clause inherits the maximum
/// of its parents' kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum InputKind {
    #[default]
    Axiom,
    Conjecture,
    NegatedConjecture,
}

/// Color tag for symbol-disjoint derivations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Transparent,
    Left,
    Right,
}

impl Color {
    /// Join in the Left/Right/Transparent semilattice.
    ///
    /// `None` means the combination is invalid and the inference producing
    /// it must be discarded.
    pub fn join(self, other: Color) -> Option<Color> {
        match (self, other) {
            (Color::Transparent, c) | (c, Color::Transparent) => Some(c),
            (Color::Left, Color::Left) => Some(Color::Left),
            (Color::Right, Color::Right) => Some(Color::Right),
            (Color::Left, Color::Right) | (Color::Right, Color::Left) => None,
        }
    }

    /// Join the colors of all parents of an inference.
    pub fn join_all<'a>(parents: impl IntoIterator<Item = &'a Arc<Clause>>) -> Option<Color> {
        let mut acc = Color::Transparent;
        for p in parents {
            acc = acc.join(p.color)?;
        }
        Some(acc)
    }
}

/// Inference rule tags for derivation records.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rule {
    Input,
    Resolution,
    Factoring,
    EqualityResolution,
    EqualityFactoring,
    Superposition,
    ForwardDemodulation,
    BackwardDemodulation,
    InnerRewriting,
    SubsumptionResolution,
    Evaluation,
}

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Rule::Input => "input",
            Rule::Resolution => "resolution",
            Rule::Factoring => "factoring",
            Rule::EqualityResolution => "equality resolution",
            Rule::EqualityFactoring => "equality factoring",
            Rule::Superposition => "superposition",
            Rule::ForwardDemodulation => "forward demodulation",
            Rule::BackwardDemodulation => "backward demodulation",
            Rule::InnerRewriting => "inner rewriting",
            Rule::SubsumptionResolution => "subsumption resolution",
            Rule::Evaluation => "evaluation",
        }
    }
}

/// Derivation record: which rule produced the clause from which parents.
#[derive(Debug, Clone)]
pub struct Inference {
    pub rule: Rule,
    pub parents: Vec<Arc<Clause>>,
}

impl Inference {
    pub fn input() -> Self {
        Inference {
            rule: Rule::Input,
            parents: Vec::new(),
        }
    }

    pub fn new(rule: Rule, parents: Vec<Arc<Clause>>) -> Self {
        Inference { rule, parents }
    }
}

/// Store class of a clause inside the given-clause loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Store {
    #[default]
    None,
    Unprocessed,
    Passive,
    Active,
    Reactivated,
}

/// A clause: an ordered buffer of shared literals read as a multiset.
#[derive(Debug)]
pub struct Clause {
    /// Instance-unique id, used for display and index bookkeeping
    pub id: u32,
    pub literals: Vec<LiteralId>,
    /// Derivation depth: 0 for input, 1 + max parent age otherwise
    pub age: u32,
    /// Sum of literal weights, cached at construction
    pub weight: u32,
    pub kind: InputKind,
    pub color: Color,
    pub inference: Inference,
    store: Cell<Store>,
    /// Scratch timestamp for `AuxScope`, valid only inside one index query
    aux: Cell<u32>,
}

impl Clause {
    /// Build a clause, computing age, weight, kind, and color from the
    /// inference record. Input clauses pass their attributes explicitly.
    pub fn new(
        id: u32,
        literals: Vec<LiteralId>,
        kind: InputKind,
        color: Color,
        inference: Inference,
        store: &TermStore,
    ) -> Self {
        let age = inference
            .parents
            .iter()
            .map(|p| p.age + 1)
            .max()
            .unwrap_or(0);
        let weight = literals.iter().map(|&l| store.lit(l).weight).sum();
        Clause {
            id,
            literals,
            age,
            weight,
            kind,
            color,
            inference,
            store: Cell::new(Store::None),
            aux: Cell::new(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn store(&self) -> Store {
        self.store.get()
    }

    pub fn set_store(&self, store: Store) {
        self.store.set(store);
    }

    /// Largest variable index occurring in the clause, if any.
    pub fn max_var(&self, store: &TermStore) -> Option<VarId> {
        let mut vars = Vec::new();
        for &lit in &self.literals {
            for &arg in store.lit(lit).args.iter() {
                store.term_vars(arg, &mut vars);
            }
        }
        vars.into_iter().max()
    }

    pub fn display<'a>(
        &'a self,
        store: &'a TermStore,
        signature: &'a Signature,
    ) -> ClauseDisplay<'a> {
        ClauseDisplay {
            clause: self,
            store,
            signature,
        }
    }
}

pub struct ClauseDisplay<'a> {
    clause: &'a Clause,
    store: &'a TermStore,
    signature: &'a Signature,
}

impl fmt::Display for ClauseDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clause.is_empty() {
            return write!(f, "$false");
        }
        for (i, &lit) in self.clause.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", self.store.display_literal(self.signature, lit))?;
        }
        Ok(())
    }
}

// =============================================================================
// Auxiliary clause mark
// =============================================================================

thread_local! {
    static AUX_ACTIVE: Cell<bool> = const { Cell::new(false) };
    static AUX_EPOCH: Cell<u32> = const { Cell::new(0) };
}

/// Bracketed scope for the auxiliary clause mark.
///
/// The mark is a scratch field used inside a single index query to
/// deduplicate visited clauses. At most one scope may be active at a time;
/// acquiring a second one is a programming error and panics.
pub struct AuxScope {
    epoch: u32,
}

impl AuxScope {
    pub fn acquire() -> AuxScope {
        AUX_ACTIVE.with(|active| {
            if active.replace(true) {
                panic!("auxiliary clause mark acquired while another scope is active");
            }
        });
        let epoch = AUX_EPOCH.with(|e| {
            let next = e.get().wrapping_add(1).max(1);
            e.set(next);
            next
        });
        AuxScope { epoch }
    }

    /// Mark a clause as visited. Returns true the first time within this scope.
    pub fn mark(&self, clause: &Clause) -> bool {
        if clause.aux.get() == self.epoch {
            false
        } else {
            clause.aux.set(self.epoch);
            true
        }
    }
}

impl Drop for AuxScope {
    fn drop(&mut self) {
        AUX_ACTIVE.with(|active| active.set(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::signature::Signature;

    fn unit_clause(id: u32, store: &mut TermStore, sig: &mut Signature, name: &str) -> Clause {
        let p = sig.intern_predicate(name, 0);
        let lit = store.literal(p, true, &[]);
        Clause::new(
            id,
            vec![lit],
            InputKind::Axiom,
            Color::Transparent,
            Inference::input(),
            store,
        )
    }

    #[test]
    fn test_color_join() {
        assert_eq!(Color::Transparent.join(Color::Left), Some(Color::Left));
        assert_eq!(Color::Left.join(Color::Left), Some(Color::Left));
        assert_eq!(Color::Right.join(Color::Transparent), Some(Color::Right));
        assert_eq!(Color::Left.join(Color::Right), None);
    }

    #[test]
    fn test_age_is_one_past_max_parent() {
        let mut store = TermStore::new();
        let mut sig = Signature::new();
        let p1 = Arc::new(unit_clause(0, &mut store, &mut sig, "p"));
        let mut p2 = unit_clause(1, &mut store, &mut sig, "q");
        p2.age = 3;
        let p2 = Arc::new(p2);

        let child = Clause::new(
            2,
            vec![],
            InputKind::Axiom,
            Color::Transparent,
            Inference::new(Rule::Resolution, vec![p1, p2]),
            &store,
        );
        assert_eq!(child.age, 4);
    }

    #[test]
    fn test_weight_cached() {
        let mut store = TermStore::new();
        let mut sig = Signature::new();
        let f = sig.intern_function("f", 1);
        let a = sig.intern_function("a", 0);
        let p = sig.intern_predicate("p", 1);
        let a = store.app(a, &[]);
        let fa = store.app(f, &[a]);
        let lit = store.literal(p, true, &[fa]);

        let clause = Clause::new(
            0,
            vec![lit],
            InputKind::Axiom,
            Color::Transparent,
            Inference::input(),
            &store,
        );
        // p + f + a
        assert_eq!(clause.weight, 3);
    }

    #[test]
    fn test_aux_scope_marks_once() {
        let mut store = TermStore::new();
        let mut sig = Signature::new();
        let c = unit_clause(0, &mut store, &mut sig, "p");

        let scope = AuxScope::acquire();
        assert!(scope.mark(&c));
        assert!(!scope.mark(&c));
        drop(scope);

        // A new scope sees the clause unmarked again
        let scope = AuxScope::acquire();
        assert!(scope.mark(&c));
    }

    #[test]
    #[should_panic(expected = "auxiliary clause mark")]
    fn test_aux_scope_nesting_panics() {
        let _outer = AuxScope::acquire();
        let _inner = AuxScope::acquire();
    }
}
