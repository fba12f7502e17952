//! Interpreted-symbol registry and constant evaluation
//!
//! The registry maps reserved symbol names (`$sum`, `$less`, `$bvand`, ...)
//! to theory operations. Constant folding is implemented for integer
//! arguments with checked arithmetic: an overflowing operation yields `None`
//! and the caller abandons that conclusion. Bit-vector operations are
//! registered so problems mentioning them load, but their constant
//! arithmetic is left to an external library and never folded here.

use crate::fol::signature::{FunctionId, Signature};
use crate::fol::term::{Term, TermStore};

/// Theory operation denoted by an interpreted symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Interpreted {
    // Integer arithmetic
    IntSum,
    IntDifference,
    IntProduct,
    IntUnaryMinus,
    IntSuccessor,
    IntQuotient,
    IntRemainder,
    // Integer relations
    IntLess,
    IntLessEqual,
    IntGreater,
    IntGreaterEqual,
    // Bit-vector operations (registered, not folded)
    BvAnd,
    BvOr,
    BvXor,
    BvNot,
    BvAdd,
    BvSub,
    BvMul,
    BvShl,
    BvLshr,
    BvConcat,
    BvExtract,
}

impl Interpreted {
    /// Look up the operation a reserved symbol name denotes.
    pub fn from_name(name: &str, arity: u8) -> Option<Interpreted> {
        use Interpreted::*;
        let op = match (name, arity) {
            ("$sum", 2) => IntSum,
            ("$difference", 2) => IntDifference,
            ("$product", 2) => IntProduct,
            ("$uminus", 1) => IntUnaryMinus,
            ("$successor", 1) => IntSuccessor,
            ("$quotient", 2) => IntQuotient,
            ("$remainder", 2) => IntRemainder,
            ("$less", 2) => IntLess,
            ("$lesseq", 2) => IntLessEqual,
            ("$greater", 2) => IntGreater,
            ("$greatereq", 2) => IntGreaterEqual,
            ("$bvand", 2) => BvAnd,
            ("$bvor", 2) => BvOr,
            ("$bvxor", 2) => BvXor,
            ("$bvnot", 1) => BvNot,
            ("$bvadd", 2) => BvAdd,
            ("$bvsub", 2) => BvSub,
            ("$bvmul", 2) => BvMul,
            ("$bvshl", 2) => BvShl,
            ("$bvlshr", 2) => BvLshr,
            ("$bvconcat", 2) => BvConcat,
            ("$bvextract", 3) => BvExtract,
            _ => return None,
        };
        Some(op)
    }

    /// True for relations that evaluate to a truth value rather than a term.
    pub fn is_relation(self) -> bool {
        matches!(
            self,
            Interpreted::IntLess
                | Interpreted::IntLessEqual
                | Interpreted::IntGreater
                | Interpreted::IntGreaterEqual
        )
    }
}

/// Fold an interpreted function application over integer constants.
///
/// Returns `None` when an argument is not a numeral, when the operation is
/// not integer-valued, or when checked arithmetic overflows. Division and
/// remainder by zero also yield `None`.
pub fn evaluate_function(
    op: Interpreted,
    args: &[Term],
    store: &TermStore,
    signature: &Signature,
) -> Option<i64> {
    let mut values = [0i64; 2];
    for (i, &arg) in args.iter().enumerate().take(2) {
        values[i] = numeral(arg, store, signature)?;
    }
    match op {
        Interpreted::IntSum => values[0].checked_add(values[1]),
        Interpreted::IntDifference => values[0].checked_sub(values[1]),
        Interpreted::IntProduct => values[0].checked_mul(values[1]),
        Interpreted::IntUnaryMinus => values[0].checked_neg(),
        Interpreted::IntSuccessor => values[0].checked_add(1),
        Interpreted::IntQuotient => {
            if values[1] == 0 {
                None
            } else {
                values[0].checked_div(values[1])
            }
        }
        Interpreted::IntRemainder => {
            if values[1] == 0 {
                None
            } else {
                values[0].checked_rem(values[1])
            }
        }
        _ => None,
    }
}

/// Decide an interpreted relation over integer constants.
pub fn evaluate_relation(
    op: Interpreted,
    args: &[Term],
    store: &TermStore,
    signature: &Signature,
) -> Option<bool> {
    let a = numeral(args[0], store, signature)?;
    let b = numeral(args[1], store, signature)?;
    match op {
        Interpreted::IntLess => Some(a < b),
        Interpreted::IntLessEqual => Some(a <= b),
        Interpreted::IntGreater => Some(a > b),
        Interpreted::IntGreaterEqual => Some(a >= b),
        _ => None,
    }
}

/// The integer value of a term, when it is a numeral constant.
pub fn numeral(term: Term, store: &TermStore, signature: &Signature) -> Option<i64> {
    match term {
        Term::Var(_) => None,
        Term::App(id) => {
            let node = store.node(id);
            if !node.args.is_empty() {
                return None;
            }
            signature.numeral_value(node.functor)
        }
    }
}

/// Intern the numeral constant for a computed value.
pub fn numeral_term(value: i64, store: &mut TermStore, signature: &mut Signature) -> Term {
    let f: FunctionId = signature.intern_numeral(value);
    store.app(f, &[])
}
