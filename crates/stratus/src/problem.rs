//! Problem input: clausified units
//!
//! The parser and clausifier are external collaborators; the prover
//! consumes a list of `Unit`s whose terms still carry symbol names. Each
//! saturation instance interns a unit list into its own signature and term
//! store, so independent strategies never share mutable state.

use crate::fol::{Color, InputKind, LiteralId, SortId, Term};
use crate::saturation::context::ProverContext;
use std::fmt;

/// A term as delivered by the clausifier: names, not interned handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InTerm {
    Var(u32),
    App(String, Vec<InTerm>),
}

impl InTerm {
    pub fn var(index: u32) -> InTerm {
        InTerm::Var(index)
    }

    pub fn constant(name: &str) -> InTerm {
        InTerm::App(name.to_string(), Vec::new())
    }

    pub fn app(name: &str, args: Vec<InTerm>) -> InTerm {
        InTerm::App(name.to_string(), args)
    }

    pub fn number(value: i64) -> InTerm {
        InTerm::App(value.to_string(), Vec::new())
    }
}

/// A literal as delivered by the clausifier. The predicate name `=` with
/// two arguments denotes equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InLiteral {
    pub predicate: String,
    pub polarity: bool,
    pub args: Vec<InTerm>,
}

impl InLiteral {
    pub fn positive(predicate: &str, args: Vec<InTerm>) -> InLiteral {
        InLiteral {
            predicate: predicate.to_string(),
            polarity: true,
            args,
        }
    }

    pub fn negative(predicate: &str, args: Vec<InTerm>) -> InLiteral {
        InLiteral {
            predicate: predicate.to_string(),
            polarity: false,
            args,
        }
    }

    pub fn equality(lhs: InTerm, rhs: InTerm) -> InLiteral {
        InLiteral::positive("=", vec![lhs, rhs])
    }

    pub fn disequality(lhs: InTerm, rhs: InTerm) -> InLiteral {
        InLiteral::negative("=", vec![lhs, rhs])
    }
}

/// One clausified input unit.
#[derive(Debug, Clone)]
pub struct Unit {
    pub name: String,
    pub literals: Vec<InLiteral>,
    pub kind: InputKind,
    pub color: Color,
}

impl Unit {
    pub fn new(name: &str, literals: Vec<InLiteral>, kind: InputKind, color: Color) -> Unit {
        Unit {
            name: name.to_string(),
            literals,
            kind,
            color,
        }
    }

    pub fn axiom(name: &str, literals: Vec<InLiteral>) -> Unit {
        Unit::new(name, literals, InputKind::Axiom, Color::Transparent)
    }

    pub fn negated_conjecture(name: &str, literals: Vec<InLiteral>) -> Unit {
        Unit::new(
            name,
            literals,
            InputKind::NegatedConjecture,
            Color::Transparent,
        )
    }

    pub fn colored(name: &str, literals: Vec<InLiteral>, color: Color) -> Unit {
        Unit::new(name, literals, InputKind::Axiom, color)
    }

    /// Intern this unit's literals into a prover context.
    pub fn intern(&self, ctx: &mut ProverContext) -> Result<Vec<LiteralId>, InputError> {
        self.literals
            .iter()
            .map(|lit| intern_literal(ctx, &self.name, lit))
            .collect()
    }
}

/// A set of input units, shared by all strategies of a schedule.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    pub units: Vec<Unit>,
}

impl Problem {
    pub fn new(units: Vec<Unit>) -> Problem {
        Problem { units }
    }

    pub fn add(&mut self, unit: Unit) {
        self.units.push(unit);
    }
}

/// User errors in the input unit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// An equality literal with an argument count other than two
    MalformedEquality { unit: String },
    /// A symbol used with more arguments than its arity can carry
    OversizedArity { unit: String, symbol: String },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::MalformedEquality { unit } => {
                write!(f, "unit '{}': equality must have exactly two arguments", unit)
            }
            InputError::OversizedArity { unit, symbol } => {
                write!(f, "unit '{}': symbol '{}' exceeds the supported arity", unit, symbol)
            }
        }
    }
}

impl std::error::Error for InputError {}

fn intern_literal(
    ctx: &mut ProverContext,
    unit: &str,
    lit: &InLiteral,
) -> Result<LiteralId, InputError> {
    let args: Result<Vec<Term>, InputError> = lit
        .args
        .iter()
        .map(|t| intern_term(ctx, unit, t))
        .collect();
    let args = args?;

    if lit.predicate == "=" {
        if args.len() != 2 {
            return Err(InputError::MalformedEquality {
                unit: unit.to_string(),
            });
        }
        let sort = argument_sort(ctx, args[0]);
        return Ok(ctx.store.equality(lit.polarity, args[0], args[1], sort));
    }

    let arity = checked_arity(unit, &lit.predicate, args.len())?;
    let predicate = ctx.signature.intern_predicate(&lit.predicate, arity);
    Ok(ctx.store.literal(predicate, lit.polarity, &args))
}

fn intern_term(ctx: &mut ProverContext, unit: &str, term: &InTerm) -> Result<Term, InputError> {
    match term {
        InTerm::Var(i) => Ok(ctx.store.var(*i)),
        InTerm::App(name, args) => {
            let interned: Result<Vec<Term>, InputError> = args
                .iter()
                .map(|a| intern_term(ctx, unit, a))
                .collect();
            let interned = interned?;
            let arity = checked_arity(unit, name, interned.len())?;
            let functor = if arity == 0 {
                if let Ok(value) = name.parse::<i64>() {
                    ctx.signature.intern_numeral(value)
                } else {
                    ctx.signature.intern_function(name, 0)
                }
            } else {
                ctx.signature.intern_function(name, arity)
            };
            Ok(ctx.store.app(functor, &interned))
        }
    }
}

fn checked_arity(unit: &str, symbol: &str, len: usize) -> Result<u8, InputError> {
    u8::try_from(len).map_err(|_| InputError::OversizedArity {
        unit: unit.to_string(),
        symbol: symbol.to_string(),
    })
}

/// The sort of an equality's arguments, read off the left-hand side.
fn argument_sort(ctx: &ProverContext, lhs: Term) -> SortId {
    match lhs {
        Term::Var(_) => SortId::INDIVIDUAL,
        Term::App(id) => ctx.signature.function_sort(ctx.store.node(id).functor),
    }
}
