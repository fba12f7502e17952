//! Per-instance statistics: counters, phase, and termination reason
//!
//! Every saturation instance owns one `Statistics` value; the scheduler
//! never shares counters between strategies. The block serializes to JSON
//! with durations rendered as fractional seconds.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Coarse phase of a saturation instance, for diagnostics on abnormal exit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    #[default]
    Initialization,
    LoadingInput,
    Saturation,
    Finalization,
}

/// Why a saturation instance stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TerminationReason {
    /// Empty clause derived
    Refutation,
    /// Passive emptied under a complete strategy
    Satisfiable,
    TimeLimit,
    MemoryLimit,
    /// Incomplete configuration exhausted its search space or budget
    Unknown,
}

/// Counters and final state of one saturation instance.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub phase: Phase,
    pub termination: Option<TerminationReason>,
    pub elapsed: Duration,

    // Clause flow
    pub input_clauses: usize,
    pub generated_clauses: usize,
    pub activations: usize,
    pub passive_added: usize,
    pub discarded_by_weight_limit: usize,

    // Generating inferences
    pub resolutions: usize,
    pub factorings: usize,
    pub equality_resolutions: usize,
    pub equality_factorings: usize,
    pub superpositions: usize,

    // Simplifying inferences
    pub forward_demodulations: usize,
    pub forward_demodulations_to_tautology: usize,
    pub backward_demodulations: usize,
    pub inner_rewrites: usize,
    pub inner_rewrites_to_tautology: usize,
    pub forward_subsumed: usize,
    pub subsumption_resolutions: usize,
    pub backward_subsumed: usize,
    pub tautologies_deleted: usize,
    pub duplicate_literals_removed: usize,
    pub evaluations: usize,

    // Recoverable conditions
    pub arithmetic_overflow: usize,
    pub color_blocked: usize,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }
}

impl Serialize for Statistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Statistics", 26)?;
        s.serialize_field("phase", &self.phase)?;
        s.serialize_field("termination", &self.termination)?;
        s.serialize_field("elapsed", &self.elapsed.as_secs_f64())?;
        s.serialize_field("input_clauses", &self.input_clauses)?;
        s.serialize_field("generated_clauses", &self.generated_clauses)?;
        s.serialize_field("activations", &self.activations)?;
        s.serialize_field("passive_added", &self.passive_added)?;
        s.serialize_field("discarded_by_weight_limit", &self.discarded_by_weight_limit)?;
        s.serialize_field("resolutions", &self.resolutions)?;
        s.serialize_field("factorings", &self.factorings)?;
        s.serialize_field("equality_resolutions", &self.equality_resolutions)?;
        s.serialize_field("equality_factorings", &self.equality_factorings)?;
        s.serialize_field("superpositions", &self.superpositions)?;
        s.serialize_field("forward_demodulations", &self.forward_demodulations)?;
        s.serialize_field(
            "forward_demodulations_to_tautology",
            &self.forward_demodulations_to_tautology,
        )?;
        s.serialize_field("backward_demodulations", &self.backward_demodulations)?;
        s.serialize_field("inner_rewrites", &self.inner_rewrites)?;
        s.serialize_field(
            "inner_rewrites_to_tautology",
            &self.inner_rewrites_to_tautology,
        )?;
        s.serialize_field("forward_subsumed", &self.forward_subsumed)?;
        s.serialize_field("subsumption_resolutions", &self.subsumption_resolutions)?;
        s.serialize_field("backward_subsumed", &self.backward_subsumed)?;
        s.serialize_field("tautologies_deleted", &self.tautologies_deleted)?;
        s.serialize_field(
            "duplicate_literals_removed",
            &self.duplicate_literals_removed,
        )?;
        s.serialize_field("evaluations", &self.evaluations)?;
        s.serialize_field("arithmetic_overflow", &self.arithmetic_overflow)?;
        s.serialize_field("color_blocked", &self.color_blocked)?;
        s.end()
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "% ------------------------------")?;
        writeln!(f, "% termination: {:?}", self.termination)?;
        writeln!(f, "% elapsed: {:.3}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "% input clauses: {}", self.input_clauses)?;
        writeln!(f, "% generated clauses: {}", self.generated_clauses)?;
        writeln!(f, "% activations: {}", self.activations)?;
        writeln!(f, "% resolutions: {}", self.resolutions)?;
        writeln!(f, "% superpositions: {}", self.superpositions)?;
        writeln!(f, "% forward demodulations: {}", self.forward_demodulations)?;
        writeln!(f, "% forward subsumed: {}", self.forward_subsumed)?;
        writeln!(f, "% backward subsumed: {}", self.backward_subsumed)?;
        write!(f, "% ------------------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_to_json() {
        let mut stats = Statistics::new();
        stats.termination = Some(TerminationReason::Refutation);
        stats.elapsed = Duration::from_millis(1500);
        stats.resolutions = 7;

        let json = serde_json::to_string(&stats).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["termination"], "Refutation");
        assert_eq!(value["elapsed"], 1.5);
        assert_eq!(value["resolutions"], 7);
    }
}
