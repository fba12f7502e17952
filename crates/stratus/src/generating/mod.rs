//! Generating inference rules
//!
//! Each rule consumes the given clause plus active clauses reachable through
//! the term indices and emits fresh conclusions. Conclusions respect the
//! color discipline (enforced at construction) and the ordering constraints
//! of the superposition calculus.

pub mod common;
pub mod equality;
pub mod factoring;
pub mod resolution;
pub mod superposition;

pub use equality::{EqualityFactoring, EqualityResolution};
pub use factoring::Factoring;
pub use resolution::BinaryResolution;
pub use superposition::Superposition;
