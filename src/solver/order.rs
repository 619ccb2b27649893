//! The partial order on well-sorted terms and propositions, used for
//! subsumption: a fact dominates every fact below it in the lattice.
//!
//! `Bool` is ordered (`false < true`), `Unit` is a point, naturals and
//! distinct constructors are incomparable, and tuples combine their
//! components lexicographically, so a tuple of discrete key components
//! followed by ordered payload components gives per-key domination.

use std::cmp::Ordering;

use crate::{
    ir::{Ctor, Proposition, Term},
    solver::{error::SolverError, unify::unify_syntactic},
};

/// The outcome of comparing two terms of the same sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartialOrdering {
    Less,
    Equal,
    Greater,
    Incomparable,
}

impl From<Ordering> for PartialOrdering {
    fn from(ord: Ordering) -> Self {
        match ord {
            Ordering::Less => PartialOrdering::Less,
            Ordering::Equal => PartialOrdering::Equal,
            Ordering::Greater => PartialOrdering::Greater,
        }
    }
}

/// Compares two well-sorted terms of the same sort. A sort mismatch is a
/// bug in the caller, not `Incomparable`.
pub fn compare_terms(a: &Term, b: &Term) -> Result<PartialOrdering, SolverError> {
    if a.sort() != b.sort() {
        return Err(SolverError::SortMismatch {
            left: a.sort().clone(),
            right: b.sort().clone(),
        });
    }
    compare_sorted(a, b)
}

fn compare_sorted(a: &Term, b: &Term) -> Result<PartialOrdering, SolverError> {
    match (a, b) {
        (Term::Variable(x), Term::Variable(y)) => {
            if x.name == y.name {
                Ok(PartialOrdering::Equal)
            } else {
                Ok(PartialOrdering::Incomparable)
            }
        }
        (Term::Constructor(c1, args1, _), Term::Constructor(c2, args2, _))
            if a.is_concrete() && b.is_concrete() =>
        {
            compare_ctors(*c1, args1, *c2, args2)
        }
        _ => {
            // Unifiable-but-structurally-different symbolic terms:
            // attempt to unify, substitute both sides, and recurse.
            match unify_syntactic(a, b)? {
                Some(subst) => {
                    let a = subst.apply_term(a);
                    let b = subst.apply_term(b);
                    if a == b {
                        Ok(PartialOrdering::Equal)
                    } else if a.is_concrete() && b.is_concrete() {
                        compare_sorted(&a, &b)
                    } else {
                        Ok(PartialOrdering::Incomparable)
                    }
                }
                None => Ok(PartialOrdering::Incomparable),
            }
        }
    }
}

fn compare_ctors(
    c1: Ctor,
    args1: &[Term],
    c2: Ctor,
    args2: &[Term],
) -> Result<PartialOrdering, SolverError> {
    match (c1, c2) {
        (Ctor::False, Ctor::True) => Ok(PartialOrdering::Less),
        (Ctor::True, Ctor::False) => Ok(PartialOrdering::Greater),
        _ if c1 == c2 => {
            if args1.len() != args2.len() {
                return Err(SolverError::Internal(format!(
                    "constructor {:?} with mismatched arities {} and {}",
                    c1,
                    args1.len(),
                    args2.len()
                )));
            }
            compare_lexicographic(args1, args2)
        }
        // Distinct non-boolean heads (Zero vs Suc) are unrelated.
        _ => Ok(PartialOrdering::Incomparable),
    }
}

/// Component comparisons left to right; the first non-equal result
/// decides, and an incomparable component before a decisive one makes
/// the whole comparison incomparable.
fn compare_lexicographic(lhs: &[Term], rhs: &[Term]) -> Result<PartialOrdering, SolverError> {
    for (x, y) in lhs.iter().zip(rhs) {
        match compare_sorted(x, y)? {
            PartialOrdering::Equal => continue,
            decisive => return Ok(decisive),
        }
    }
    Ok(PartialOrdering::Equal)
}

/// `p ≥ q` iff the propositions share a relation name and `p.arg ≥ q.arg`;
/// propositions of different relations are incomparable.
pub fn compare_props(p: &Proposition, q: &Proposition) -> Result<PartialOrdering, SolverError> {
    if p.relation != q.relation {
        return Ok(PartialOrdering::Incomparable);
    }
    compare_terms(&p.arg, &q.arg)
}

/// The least upper bound of two comparable terms; `None` when they are
/// incomparable. Not used by the fixpoint engine, which needs only the
/// order.
pub fn join(a: &Term, b: &Term) -> Result<Option<Term>, SolverError> {
    Ok(match compare_terms(a, b)? {
        PartialOrdering::Less => Some(b.clone()),
        PartialOrdering::Equal | PartialOrdering::Greater => Some(a.clone()),
        PartialOrdering::Incomparable => None,
    })
}

/// The greatest lower bound of two comparable terms; `None` when they
/// are incomparable.
pub fn meet(a: &Term, b: &Term) -> Result<Option<Term>, SolverError> {
    Ok(match compare_terms(a, b)? {
        PartialOrdering::Greater => Some(b.clone()),
        PartialOrdering::Equal | PartialOrdering::Less => Some(a.clone()),
        PartialOrdering::Incomparable => None,
    })
}
