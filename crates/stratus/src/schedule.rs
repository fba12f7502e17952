//! Multi-strategy scheduler
//!
//! Runs up to K saturation instances on a shared problem, cooperatively and
//! single-threaded: strategies are admitted from a priority queue into
//! slots, each slot runs one adaptive time slice per cycle, and the first
//! slot to report a refutation — or satisfiability under a complete
//! configuration — wins. Every admitted strategy receives at least one step
//! before any strategy receives two.

use crate::problem::{InputError, Problem};
use crate::saturation::{Outcome, Saturation, StrategyOptions};
use crate::statistics::TerminationReason;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// One strategy: a named, prioritized saturation configuration.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub name: String,
    pub options: StrategyOptions,
    /// Lower value runs earlier
    pub priority: u32,
}

impl Strategy {
    pub fn new(name: &str, options: StrategyOptions, priority: u32) -> Strategy {
        Strategy {
            name: name.to_string(),
            options,
            priority,
        }
    }
}

/// Verdict of a whole schedule run.
pub struct ScheduleOutcome {
    pub reason: TerminationReason,
    /// Name of the winning strategy, if one succeeded
    pub winner_name: Option<String>,
    /// The winning instance, for derivation and statistics extraction
    pub winner: Option<Box<Saturation>>,
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Maximum number of concurrently running strategies
    pub slots: usize,
    pub initial_slice: Duration,
    pub min_slice: Duration,
    pub max_slice: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule {
            slots: 4,
            initial_slice: Duration::from_millis(20),
            min_slice: Duration::from_millis(2),
            max_slice: Duration::from_millis(500),
        }
    }
}

struct Slot {
    name: String,
    instance: Box<Saturation>,
}

impl Schedule {
    /// Run the strategies on the problem until a verdict or exhaustion.
    pub fn run(
        &self,
        problem: &Problem,
        strategies: Vec<Strategy>,
        deadline: Option<Instant>,
    ) -> Result<ScheduleOutcome, InputError> {
        let mut pending: Vec<Option<Strategy>> = strategies.into_iter().map(Some).collect();
        let mut queue: BinaryHeap<Reverse<(u32, usize)>> = pending
            .iter()
            .enumerate()
            .map(|(i, s)| Reverse((s.as_ref().unwrap().priority, i)))
            .collect();

        let mut slots: Vec<Slot> = Vec::new();
        let mut slice = self.initial_slice;

        loop {
            // Admit strategies into free slots, best priority first.
            while slots.len() < self.slots.max(1) {
                let Reverse((_, idx)) = match queue.pop() {
                    Some(entry) => entry,
                    None => break,
                };
                let strategy = pending[idx].take().expect("strategy admitted once");
                let mut instance = Box::new(Saturation::new(strategy.options));
                instance.add_input(&problem.units)?;
                instance.set_deadline(deadline);
                slots.push(Slot {
                    name: strategy.name,
                    instance,
                });
            }

            if slots.is_empty() {
                let reason = if deadline.is_some_and(|d| Instant::now() >= d) {
                    TerminationReason::TimeLimit
                } else {
                    TerminationReason::Unknown
                };
                return Ok(ScheduleOutcome {
                    reason,
                    winner_name: None,
                    winner: None,
                });
            }

            // Round-robin one slice per slot.
            let mut finished: Vec<(usize, Outcome)> = Vec::new();
            let mut slowest_step_per_slot: Vec<Duration> = Vec::new();
            for (slot_idx, slot) in slots.iter_mut().enumerate() {
                let slice_start = Instant::now();
                let mut slowest_step = Duration::ZERO;
                loop {
                    let step_start = Instant::now();
                    let outcome = slot.instance.step();
                    slowest_step = slowest_step.max(step_start.elapsed());
                    if let Some(outcome) = outcome {
                        finished.push((slot_idx, outcome));
                        break;
                    }
                    if slice_start.elapsed() >= slice {
                        break;
                    }
                }
                slowest_step_per_slot.push(slowest_step);
            }

            // A refutation anywhere stops the whole schedule; so does
            // satisfiability, which only a complete configuration reports.
            for (slot_idx, outcome) in &finished {
                if matches!(
                    outcome.reason,
                    TerminationReason::Refutation | TerminationReason::Satisfiable
                ) {
                    let slot = slots.swap_remove(*slot_idx);
                    return Ok(ScheduleOutcome {
                        reason: outcome.reason,
                        winner_name: Some(slot.name),
                        winner: Some(slot.instance),
                    });
                }
            }

            // Retire exhausted slots, freeing room for queued strategies.
            let mut retire: Vec<usize> = finished.iter().map(|(i, _)| *i).collect();
            retire.sort_unstable_by(|a, b| b.cmp(a));
            for idx in retire {
                slots.swap_remove(idx);
            }

            // Slice adaptation: shrink when every context overran the
            // current slice in a single step, grow when some slot finishes
            // its steps well inside it.
            if !slowest_step_per_slot.is_empty() {
                if slowest_step_per_slot.iter().all(|&d| d > slice) {
                    slice = (slice / 2).max(self.min_slice);
                } else if slowest_step_per_slot.iter().any(|&d| d * 4 < slice) {
                    slice = (slice * 2).min(self.max_slice);
                }
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(ScheduleOutcome {
                    reason: TerminationReason::TimeLimit,
                    winner_name: None,
                    winner: None,
                });
            }
        }
    }
}

/// Process exit code for a schedule verdict.
pub fn exit_code(reason: TerminationReason) -> i32 {
    match reason {
        TerminationReason::Refutation | TerminationReason::Satisfiable => 0,
        TerminationReason::TimeLimit
        | TerminationReason::MemoryLimit
        | TerminationReason::Unknown => 1,
    }
}

/// Process exit code when terminated by a signal: keyboard interrupts
/// propagate as 3, anything unexpected as 2.
pub fn signal_exit_code(signal: i32) -> i32 {
    const SIGINT: i32 = 2;
    if signal == SIGINT {
        3
    } else {
        2
    }
}
