//! Term-index management for the saturation loop
//!
//! Inference rules declare the index kinds they need; the `IndexManager`
//! reference-counts those clients. The first request builds the index from
//! the current active set, the last release discards it. The saturation
//! algorithm notifies the manager of every active-set change, and the
//! manager routes `insert`/`remove` to whichever indices currently exist.
//!
//! Clauses never point at indices; the back-link is the clause id stored in
//! index entries, with lazy removal through per-index live sets.

pub mod code_tree;
pub mod substitution_tree;

pub use code_tree::{CodeMatch, CodeTree};
pub use substitution_tree::{Retrieval, TermEntry, TermIndex, QUERY_BANK, RESULT_BANK};

use crate::fol::{ArgOrder, Clause, Kbo, PredicateId, Term, TermStore};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The index roles rules can request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Left-hand sides of selected positive equalities (superposition from)
    SuperpositionLhs,
    /// Non-variable subterms of selected literals (superposition into)
    SuperpositionSubterms,
    /// Orientable sides of unit equalities (forward demodulation rules)
    DemodulationLhs,
    /// All non-variable subterms of active clauses (backward demodulation)
    RewritableSubterms,
    /// Selected literals bucketed by predicate and polarity (resolution)
    UnifiableLiterals,
    /// Clause code tree (forward subsumption and subsumption resolution)
    Subsumption,
}

// =============================================================================
// Literal index
// =============================================================================

/// One indexed literal occurrence.
#[derive(Debug, Clone)]
pub struct LitEntry {
    pub clause: Arc<Clause>,
    pub lit_index: usize,
}

/// Selected literals of active clauses, bucketed by predicate and polarity.
#[derive(Debug, Default)]
pub struct LiteralIndex {
    buckets: HashMap<(PredicateId, bool), Vec<LitEntry>>,
    live: HashSet<u32>,
}

impl LiteralIndex {
    pub fn new() -> Self {
        LiteralIndex::default()
    }

    pub fn insert(&mut self, store: &TermStore, clause: &Arc<Clause>, selected: &[usize]) {
        self.live.insert(clause.id);
        for &i in selected {
            let lit = store.lit(clause.literals[i]);
            self.buckets
                .entry((lit.predicate, lit.polarity))
                .or_default()
                .push(LitEntry {
                    clause: Arc::clone(clause),
                    lit_index: i,
                });
        }
    }

    pub fn remove(&mut self, clause_id: u32) {
        self.live.remove(&clause_id);
    }

    /// Live entries whose literal has the given predicate and polarity.
    pub fn candidates(
        &self,
        predicate: PredicateId,
        polarity: bool,
    ) -> impl Iterator<Item = &LitEntry> {
        self.buckets
            .get(&(predicate, polarity))
            .into_iter()
            .flatten()
            .filter(|e| self.live.contains(&e.clause.id))
    }
}

// =============================================================================
// Index manager
// =============================================================================

#[derive(Debug)]
struct Slot<T> {
    index: T,
    clients: usize,
}

/// Owner of all indices, with per-kind client reference counting.
#[derive(Debug, Default)]
pub struct IndexManager {
    /// Mirror of the active set with the literal selection of each clause,
    /// used to build indices requested after activation began.
    active: IndexMap<u32, (Arc<Clause>, Box<[usize]>)>,
    superposition_lhs: Option<Slot<TermIndex>>,
    superposition_subterms: Option<Slot<TermIndex>>,
    demodulation_lhs: Option<Slot<TermIndex>>,
    rewritable_subterms: Option<Slot<TermIndex>>,
    unifiable_literals: Option<Slot<LiteralIndex>>,
    subsumption: Option<Slot<CodeTree>>,
}

impl IndexManager {
    pub fn new() -> Self {
        IndexManager::default()
    }

    /// Register a client for an index kind, building the index from the
    /// current active set on first request.
    pub fn request(&mut self, kind: IndexKind, store: &TermStore, ordering: &Kbo) {
        macro_rules! slot {
            ($field:ident, $new:expr, $fill:ident) => {{
                match &mut self.$field {
                    Some(slot) => slot.clients += 1,
                    None => {
                        let mut index = $new;
                        for (clause, selected) in self.active.values() {
                            Self::$fill(&mut index, store, ordering, clause, selected);
                        }
                        self.$field = Some(Slot { index, clients: 1 });
                    }
                }
            }};
        }
        match kind {
            IndexKind::SuperpositionLhs => {
                slot!(superposition_lhs, TermIndex::new(), fill_superposition_lhs)
            }
            IndexKind::SuperpositionSubterms => slot!(
                superposition_subterms,
                TermIndex::new(),
                fill_superposition_subterms
            ),
            IndexKind::DemodulationLhs => {
                slot!(demodulation_lhs, TermIndex::new(), fill_demodulation_lhs)
            }
            IndexKind::RewritableSubterms => slot!(
                rewritable_subterms,
                TermIndex::new(),
                fill_rewritable_subterms
            ),
            IndexKind::UnifiableLiterals => {
                slot!(unifiable_literals, LiteralIndex::new(), fill_literals)
            }
            IndexKind::Subsumption => slot!(subsumption, CodeTree::new(), fill_subsumption),
        }
    }

    /// Drop a client; the index is discarded when the last client releases.
    pub fn release(&mut self, kind: IndexKind) {
        macro_rules! unslot {
            ($field:ident) => {{
                if let Some(slot) = &mut self.$field {
                    slot.clients -= 1;
                    if slot.clients == 0 {
                        self.$field = None;
                    }
                }
            }};
        }
        match kind {
            IndexKind::SuperpositionLhs => unslot!(superposition_lhs),
            IndexKind::SuperpositionSubterms => unslot!(superposition_subterms),
            IndexKind::DemodulationLhs => unslot!(demodulation_lhs),
            IndexKind::RewritableSubterms => unslot!(rewritable_subterms),
            IndexKind::UnifiableLiterals => unslot!(unifiable_literals),
            IndexKind::Subsumption => unslot!(subsumption),
        }
    }

    /// A clause entered the active set with the given literal selection.
    pub fn insert(
        &mut self,
        store: &TermStore,
        ordering: &Kbo,
        clause: &Arc<Clause>,
        selected: &[usize],
    ) {
        self.active
            .insert(clause.id, (Arc::clone(clause), selected.into()));
        if let Some(slot) = &mut self.superposition_lhs {
            Self::fill_superposition_lhs(&mut slot.index, store, ordering, clause, selected);
        }
        if let Some(slot) = &mut self.superposition_subterms {
            Self::fill_superposition_subterms(&mut slot.index, store, ordering, clause, selected);
        }
        if let Some(slot) = &mut self.demodulation_lhs {
            Self::fill_demodulation_lhs(&mut slot.index, store, ordering, clause, selected);
        }
        if let Some(slot) = &mut self.rewritable_subterms {
            Self::fill_rewritable_subterms(&mut slot.index, store, ordering, clause, selected);
        }
        if let Some(slot) = &mut self.unifiable_literals {
            Self::fill_literals(&mut slot.index, store, ordering, clause, selected);
        }
        if let Some(slot) = &mut self.subsumption {
            Self::fill_subsumption(&mut slot.index, store, ordering, clause, selected);
        }
    }

    /// A clause left the active set.
    pub fn remove(&mut self, clause_id: u32) {
        self.active.shift_remove(&clause_id);
        if let Some(slot) = &mut self.superposition_lhs {
            slot.index.remove(clause_id);
        }
        if let Some(slot) = &mut self.superposition_subterms {
            slot.index.remove(clause_id);
        }
        if let Some(slot) = &mut self.demodulation_lhs {
            slot.index.remove(clause_id);
        }
        if let Some(slot) = &mut self.rewritable_subterms {
            slot.index.remove(clause_id);
        }
        if let Some(slot) = &mut self.unifiable_literals {
            slot.index.remove(clause_id);
        }
        if let Some(slot) = &mut self.subsumption {
            slot.index.remove(clause_id);
        }
    }

    // === Accessors (None when no client has requested the kind) ===

    pub fn superposition_lhs(&self) -> Option<&TermIndex> {
        self.superposition_lhs.as_ref().map(|s| &s.index)
    }

    pub fn superposition_subterms(&self) -> Option<&TermIndex> {
        self.superposition_subterms.as_ref().map(|s| &s.index)
    }

    pub fn demodulation_lhs(&self) -> Option<&TermIndex> {
        self.demodulation_lhs.as_ref().map(|s| &s.index)
    }

    pub fn rewritable_subterms(&self) -> Option<&TermIndex> {
        self.rewritable_subterms.as_ref().map(|s| &s.index)
    }

    pub fn unifiable_literals(&self) -> Option<&LiteralIndex> {
        self.unifiable_literals.as_ref().map(|s| &s.index)
    }

    pub fn subsumption(&self) -> Option<&CodeTree> {
        self.subsumption.as_ref().map(|s| &s.index)
    }

    // === Fill routines ===

    fn fill_superposition_lhs(
        index: &mut TermIndex,
        store: &TermStore,
        ordering: &Kbo,
        clause: &Arc<Clause>,
        selected: &[usize],
    ) {
        for &i in selected {
            let lit_id = clause.literals[i];
            let lit = store.lit(lit_id);
            if !lit.polarity || !lit.is_equality() {
                continue;
            }
            let order = ordering.orient_equality(store, lit_id);
            let sides = orientable_sides(order, lit.args[0], lit.args[1]);
            for side in sides.into_iter().flatten() {
                if side.is_var() {
                    continue;
                }
                index.insert(
                    store,
                    TermEntry {
                        clause: Arc::clone(clause),
                        lit_index: i,
                        term: side,
                    },
                );
            }
        }
    }

    fn fill_superposition_subterms(
        index: &mut TermIndex,
        store: &TermStore,
        _ordering: &Kbo,
        clause: &Arc<Clause>,
        selected: &[usize],
    ) {
        let mut subterms = Vec::new();
        for &i in selected {
            let lit = store.lit(clause.literals[i]);
            subterms.clear();
            for &arg in lit.args.iter() {
                store.non_var_subterms(arg, &mut subterms);
            }
            for &term in &subterms {
                index.insert(
                    store,
                    TermEntry {
                        clause: Arc::clone(clause),
                        lit_index: i,
                        term,
                    },
                );
            }
        }
    }

    fn fill_demodulation_lhs(
        index: &mut TermIndex,
        store: &TermStore,
        ordering: &Kbo,
        clause: &Arc<Clause>,
        _selected: &[usize],
    ) {
        // Only unit positive equalities act as rewrite rules
        if clause.literals.len() != 1 {
            return;
        }
        let lit_id = clause.literals[0];
        let lit = store.lit(lit_id);
        if !lit.polarity || !lit.is_equality() {
            return;
        }
        let order = ordering.orient_equality(store, lit_id);
        let sides = orientable_sides(order, lit.args[0], lit.args[1]);
        for side in sides.into_iter().flatten() {
            if side.is_var() {
                continue;
            }
            index.insert(
                store,
                TermEntry {
                    clause: Arc::clone(clause),
                    lit_index: 0,
                    term: side,
                },
            );
        }
    }

    fn fill_rewritable_subterms(
        index: &mut TermIndex,
        store: &TermStore,
        _ordering: &Kbo,
        clause: &Arc<Clause>,
        _selected: &[usize],
    ) {
        let mut subterms = Vec::new();
        for (i, &lit_id) in clause.literals.iter().enumerate() {
            let lit = store.lit(lit_id);
            subterms.clear();
            for &arg in lit.args.iter() {
                store.non_var_subterms(arg, &mut subterms);
            }
            for &term in &subterms {
                index.insert(
                    store,
                    TermEntry {
                        clause: Arc::clone(clause),
                        lit_index: i,
                        term,
                    },
                );
            }
        }
    }

    fn fill_literals(
        index: &mut LiteralIndex,
        store: &TermStore,
        _ordering: &Kbo,
        clause: &Arc<Clause>,
        selected: &[usize],
    ) {
        index.insert(store, clause, selected);
    }

    fn fill_subsumption(
        index: &mut CodeTree,
        store: &TermStore,
        _ordering: &Kbo,
        clause: &Arc<Clause>,
        _selected: &[usize],
    ) {
        index.insert(store, Arc::clone(clause));
    }
}

/// Which sides of an equality may serve as rewrite left-hand sides.
fn orientable_sides(order: ArgOrder, lhs: Term, rhs: Term) -> [Option<Term>; 2] {
    match order {
        ArgOrder::Greater => [Some(lhs), None],
        ArgOrder::Less => [Some(rhs), None],
        ArgOrder::Incomparable => [Some(lhs), Some(rhs)],
        ArgOrder::Equal | ArgOrder::Unknown => [None, None],
    }
}
