//! The given-clause algorithm

use crate::fol::{Clause, Store};
use crate::generating::{
    BinaryResolution, EqualityFactoring, EqualityResolution, Factoring, Superposition,
};
use crate::index::IndexManager;
use crate::problem::{InputError, Unit};
use crate::saturation::context::{ActiveSet, ProverContext, StrategyOptions};
use crate::saturation::limits::Limits;
use crate::saturation::passive::PassiveQueue;
use crate::saturation::rule::{BackwardRule, ForwardOutcome, ForwardRule, GeneratingRule};
use crate::simplifying::{
    BackwardDemodulation, BackwardSubsumption, ForwardDemodulation, ForwardSubsumption,
    InnerRewriting, InterpretedEvaluation, TautologyDeletion,
};
use crate::statistics::{Phase, TerminationReason};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

/// Final verdict of one saturation run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub reason: TerminationReason,
    /// The empty clause, when the run found a refutation
    pub refutation: Option<Arc<Clause>>,
}

/// One saturation instance: context, clause stores, indices, and rules.
pub struct Saturation {
    pub ctx: ProverContext,
    unprocessed: VecDeque<Arc<Clause>>,
    passive: PassiveQueue,
    active: ActiveSet,
    indices: IndexManager,
    generating: Vec<Box<dyn GeneratingRule>>,
    forward: Vec<Box<dyn ForwardRule>>,
    backward: Vec<Box<dyn BackwardRule>>,
    limits: Limits,
    started: Option<Instant>,
    outcome: Option<Outcome>,
}

impl Saturation {
    pub fn new(options: StrategyOptions) -> Self {
        let passive = PassiveQueue::new(options.age_weight_ratio);
        let limits = Limits::new(&options, None);
        let ctx = ProverContext::new(options.clone());
        let mut indices = IndexManager::new();

        let mut forward: Vec<Box<dyn ForwardRule>> = vec![
            Box::new(TautologyDeletion),
            Box::new(InterpretedEvaluation),
            Box::new(ForwardDemodulation),
            Box::new(InnerRewriting),
            Box::new(ForwardSubsumption),
        ];
        let mut backward: Vec<Box<dyn BackwardRule>> = Vec::new();
        if options.enable_backward_simplification {
            backward.push(Box::new(BackwardDemodulation));
            backward.push(Box::new(BackwardSubsumption));
        }
        let mut generating: Vec<Box<dyn GeneratingRule>> = vec![
            Box::new(Factoring),
            Box::new(EqualityResolution),
            Box::new(EqualityFactoring),
            Box::new(BinaryResolution),
        ];
        if options.enable_superposition {
            generating.push(Box::new(Superposition));
        }

        // Attach: register one index client per rule requirement.
        for rule in &forward {
            for &kind in rule.required_indices() {
                indices.request(kind, &ctx.store, &ctx.ordering);
            }
        }
        for rule in &backward {
            for &kind in rule.required_indices() {
                indices.request(kind, &ctx.store, &ctx.ordering);
            }
        }
        for rule in &generating {
            for &kind in rule.required_indices() {
                indices.request(kind, &ctx.store, &ctx.ordering);
            }
        }

        Saturation {
            ctx,
            unprocessed: VecDeque::new(),
            passive,
            active: ActiveSet::new(),
            indices,
            generating,
            forward,
            backward,
            limits,
            started: None,
            outcome: None,
        }
    }

    /// Load clausified input units.
    pub fn add_input(&mut self, units: &[Unit]) -> Result<(), InputError> {
        self.ctx.statistics.phase = Phase::LoadingInput;
        for unit in units {
            let literals = unit.intern(&mut self.ctx)?;
            let clause = self.ctx.input_clause(literals, unit.kind, unit.color);
            clause.set_store(Store::Unprocessed);
            self.ctx.statistics.input_clauses += 1;
            self.unprocessed.push_back(clause);
        }
        Ok(())
    }

    /// Impose an external deadline (combined with the strategy's own budget).
    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.limits = Limits::new(&self.ctx.options, deadline);
    }

    pub fn active_clauses(&self) -> impl Iterator<Item = &Arc<Clause>> {
        self.active.iter()
    }

    pub fn passive_clauses(&self) -> impl Iterator<Item = &Arc<Clause>> {
        self.passive.iter()
    }

    /// Run to completion under the configured limits.
    pub fn run(&mut self) -> Outcome {
        loop {
            if let Some(outcome) = self.step() {
                return outcome;
            }
        }
    }

    /// Execute one step of the given-clause loop.
    ///
    /// Returns `Some(outcome)` when the run is finished, `None` to continue.
    pub fn step(&mut self) -> Option<Outcome> {
        if let Some(outcome) = &self.outcome {
            return Some(outcome.clone());
        }
        let started = *self.started.get_or_insert_with(Instant::now);
        self.ctx.statistics.phase = Phase::Saturation;

        if let Some(reason) = self.limits.exceeded(self.ctx.clause_bytes) {
            return Some(self.finish(started, reason, None));
        }

        // === Drain unprocessed through forward simplification ===
        while let Some(mut clause) = self.unprocessed.pop_front() {
            if clause.is_empty() {
                return Some(self.finish(started, TerminationReason::Refutation, Some(clause)));
            }

            let mut deleted = false;
            'simplify: loop {
                for rule in &self.forward {
                    match rule.simplify(&clause, &mut self.ctx, &self.indices) {
                        ForwardOutcome::Keep => {}
                        ForwardOutcome::Deleted => {
                            clause.set_store(Store::None);
                            deleted = true;
                            break 'simplify;
                        }
                        ForwardOutcome::Replaced(replacement) => {
                            clause.set_store(Store::None);
                            replacement.set_store(Store::Unprocessed);
                            clause = replacement;
                            if clause.is_empty() {
                                return Some(self.finish(
                                    started,
                                    TerminationReason::Refutation,
                                    Some(clause),
                                ));
                            }
                            continue 'simplify;
                        }
                    }
                }
                break;
            }
            if deleted {
                continue;
            }

            clause.set_store(Store::Passive);
            self.ctx.statistics.passive_added += 1;
            self.passive.push(clause);
        }

        // === Saturation check ===
        if self.passive.is_empty() {
            let reason = if self.ctx.options.is_complete() {
                TerminationReason::Satisfiable
            } else {
                TerminationReason::Unknown
            };
            return Some(self.finish(started, reason, None));
        }

        // === Select the given clause ===
        let given = self.passive.pop().expect("passive is non-empty");
        let selected = self
            .ctx
            .options
            .selection
            .select(&self.ctx.store, &self.ctx.ordering, &given);

        // === Backward simplification with the given clause ===
        for rule in &self.backward {
            let changes = rule.simplify(&given, &mut self.ctx, &self.active, &self.indices);
            for change in changes {
                if self.active.remove(change.target.id).is_some() {
                    self.indices.remove(change.target.id);
                }
                change.target.set_store(Store::None);
                if let Some(replacement) = change.replacement {
                    // Simplified survivors re-enter the pipeline from the front
                    replacement.set_store(Store::Reactivated);
                    self.unprocessed.push_back(replacement);
                }
            }
        }

        // === Activate ===
        given.set_store(Store::Active);
        self.indices
            .insert(&self.ctx.store, &self.ctx.ordering, &given, &selected);
        self.active.insert(Arc::clone(&given), selected.clone());
        self.ctx.statistics.activations += 1;

        // === Generate ===
        for rule in &self.generating {
            if let Some(reason) = self.limits.exceeded(self.ctx.clause_bytes) {
                return Some(self.finish(started, reason, None));
            }
            let conclusions = rule.generate(&given, &selected, &mut self.ctx, &self.indices);
            for conclusion in conclusions {
                if let Some(limit) = self.ctx.options.max_clause_weight {
                    if conclusion.weight > limit {
                        self.ctx.statistics.discarded_by_weight_limit += 1;
                        continue;
                    }
                }
                conclusion.set_store(Store::Unprocessed);
                self.unprocessed.push_back(conclusion);
            }
        }

        None
    }

    fn finish(
        &mut self,
        started: Instant,
        reason: TerminationReason,
        refutation: Option<Arc<Clause>>,
    ) -> Outcome {
        self.ctx.statistics.phase = Phase::Finalization;
        self.ctx.statistics.termination = Some(reason);
        self.ctx.statistics.elapsed = started.elapsed();
        let outcome = Outcome { reason, refutation };
        self.outcome = Some(outcome.clone());
        outcome
    }
}
