//! Resource limits checked at step boundaries
//!
//! The deadline is monotone and checked before every saturation step and
//! between generating-rule calls; on expiry the instance returns without
//! retracting anything. Memory is tracked as an estimate of clause storage
//! against an optional budget.

use crate::saturation::context::StrategyOptions;
use crate::statistics::TerminationReason;
use std::time::{Duration, Instant};

/// Active resource limits of one saturation run.
#[derive(Debug, Copy, Clone, Default)]
pub struct Limits {
    pub deadline: Option<Instant>,
    pub memory_limit_bytes: Option<usize>,
}

impl Limits {
    /// Combine the strategy's own budget with an external deadline from the
    /// scheduler; the tighter one wins.
    pub fn new(options: &StrategyOptions, external_deadline: Option<Instant>) -> Self {
        let own = options.time_limit.map(|d| Instant::now() + d);
        let deadline = match (own, external_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Limits {
            deadline,
            memory_limit_bytes: options.memory_limit_bytes,
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Limits {
            deadline: Some(deadline),
            memory_limit_bytes: None,
        }
    }

    /// Check the limits; `clause_bytes` is the current storage estimate.
    pub fn exceeded(&self, clause_bytes: usize) -> Option<TerminationReason> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(TerminationReason::TimeLimit);
            }
        }
        if let Some(limit) = self.memory_limit_bytes {
            if clause_bytes >= limit {
                return Some(TerminationReason::MemoryLimit);
            }
        }
        None
    }

    /// Time left until the deadline, if one is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_limit() {
        let limits = Limits {
            deadline: None,
            memory_limit_bytes: Some(1000),
        };
        assert_eq!(limits.exceeded(999), None);
        assert_eq!(limits.exceeded(1000), Some(TerminationReason::MemoryLimit));
    }

    #[test]
    fn test_expired_deadline() {
        let limits = Limits::with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(limits.exceeded(0), Some(TerminationReason::TimeLimit));
    }

    #[test]
    fn test_tighter_deadline_wins() {
        let mut options = StrategyOptions::default();
        options.time_limit = Some(Duration::from_secs(3600));
        let external = Instant::now();
        let limits = Limits::new(&options, Some(external));
        assert_eq!(limits.deadline, Some(external));
    }
}
