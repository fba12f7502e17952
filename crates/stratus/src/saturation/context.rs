//! Per-instance prover context and the active clause set
//!
//! The context bundles what used to be global in classic saturation
//! provers — term store, signature, ordering, options, statistics — into one
//! value owned by a single saturation instance. The multi-strategy scheduler
//! creates one context per strategy, so concurrent strategies never share
//! mutable state.

use crate::fol::{
    Clause, Color, Inference, InputKind, Kbo, KboConfig, LiteralId, Signature, TermStore,
};
use crate::saturation::selection::SelectionFn;
use crate::statistics::Statistics;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// One fully parameterized saturation configuration.
#[derive(Debug, Clone)]
pub struct StrategyOptions {
    pub kbo: KboConfig,
    pub selection: SelectionFn,
    /// Interleaving ratio of age-ordered vs. weight-ordered passive picks
    pub age_weight_ratio: (u32, u32),
    pub enable_superposition: bool,
    pub enable_backward_simplification: bool,
    /// Conclusions heavier than this are discarded (makes the strategy incomplete)
    pub max_clause_weight: Option<u32>,
    /// Estimated clause-storage budget
    pub memory_limit_bytes: Option<usize>,
    /// Soft per-instance time budget; the scheduler may impose a tighter one
    pub time_limit: Option<Duration>,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        StrategyOptions {
            kbo: KboConfig::default(),
            selection: SelectionFn::UniqueMaximalOrNegOrMaximal,
            age_weight_ratio: (1, 4),
            enable_superposition: true,
            enable_backward_simplification: true,
            max_clause_weight: None,
            memory_limit_bytes: None,
            time_limit: None,
        }
    }
}

impl StrategyOptions {
    /// A configuration is complete when no conclusion can be dropped for
    /// resource-shaping reasons; only complete configurations may report
    /// satisfiability on passive underflow.
    pub fn is_complete(&self) -> bool {
        self.max_clause_weight.is_none()
    }
}

/// Mutable per-instance state shared by all inference rules.
#[derive(Debug)]
pub struct ProverContext {
    pub store: TermStore,
    pub signature: Signature,
    pub ordering: Kbo,
    pub options: StrategyOptions,
    pub statistics: Statistics,
    next_clause_id: u32,
    /// Estimated bytes held by clause storage
    pub clause_bytes: usize,
}

impl ProverContext {
    pub fn new(options: StrategyOptions) -> Self {
        ProverContext {
            store: TermStore::new(),
            signature: Signature::new(),
            ordering: Kbo::new(options.kbo.clone()),
            options,
            statistics: Statistics::new(),
            next_clause_id: 0,
            clause_bytes: 0,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_clause_id;
        self.next_clause_id += 1;
        id
    }

    /// Build an input clause.
    pub fn input_clause(
        &mut self,
        literals: Vec<LiteralId>,
        kind: InputKind,
        color: Color,
    ) -> Arc<Clause> {
        let id = self.next_id();
        let clause = Arc::new(Clause::new(
            id,
            literals,
            kind,
            color,
            Inference::input(),
            &self.store,
        ));
        self.clause_bytes += clause_bytes_estimate(&clause);
        clause
    }

    /// Build a derived clause, enforcing the color discipline.
    ///
    /// Returns `None` when the parent colors join to invalid; the caller
    /// silently discards the inference.
    pub fn derived_clause(&mut self, inference: Inference, literals: Vec<LiteralId>) -> Option<Arc<Clause>> {
        let color = match Color::join_all(&inference.parents) {
            Some(c) => c,
            None => {
                self.statistics.color_blocked += 1;
                return None;
            }
        };
        let kind = inference
            .parents
            .iter()
            .map(|p| p.kind)
            .max()
            .unwrap_or(InputKind::Axiom);
        let literals = self.dedup_literals(literals);
        let id = self.next_id();
        let clause = Arc::new(Clause::new(id, literals, kind, color, inference, &self.store));
        self.clause_bytes += clause_bytes_estimate(&clause);
        self.statistics.generated_clauses += 1;
        Some(clause)
    }

    /// Drop duplicate literals (a clause is a multiset, but identical shared
    /// handles are redundant disjuncts).
    fn dedup_literals(&mut self, literals: Vec<LiteralId>) -> Vec<LiteralId> {
        let mut seen = Vec::with_capacity(literals.len());
        for lit in literals {
            if seen.contains(&lit) {
                self.statistics.duplicate_literals_removed += 1;
            } else {
                seen.push(lit);
            }
        }
        seen
    }
}

/// Rough clause storage estimate for the memory limit.
fn clause_bytes_estimate(clause: &Clause) -> usize {
    std::mem::size_of::<Clause>() + clause.literals.len() * std::mem::size_of::<LiteralId>()
}

// =============================================================================
// Active set
// =============================================================================

/// Clauses already used as given clauses, with their literal selection.
#[derive(Debug, Default)]
pub struct ActiveSet {
    clauses: IndexMap<u32, Arc<Clause>>,
    selection: HashMap<u32, Box<[usize]>>,
}

impl ActiveSet {
    pub fn new() -> Self {
        ActiveSet::default()
    }

    pub fn insert(&mut self, clause: Arc<Clause>, selected: Box<[usize]>) {
        self.selection.insert(clause.id, selected);
        self.clauses.insert(clause.id, clause);
    }

    pub fn remove(&mut self, clause_id: u32) -> Option<Arc<Clause>> {
        self.selection.remove(&clause_id);
        self.clauses.shift_remove(&clause_id)
    }

    pub fn contains(&self, clause_id: u32) -> bool {
        self.clauses.contains_key(&clause_id)
    }

    /// Selected literal indices of an active clause.
    pub fn selected(&self, clause_id: u32) -> &[usize] {
        self.selection.get(&clause_id).map_or(&[], |s| s.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Clause>> {
        self.clauses.values()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}
