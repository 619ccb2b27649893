//! The fact database: an unordered collection of concrete propositions
//! kept as an anti-chain under the subsumption order. A dominated
//! insertion is rejected; an insertion that dominates existing facts
//! evicts them.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    ir::Proposition,
    solver::{
        error::SolverError,
        order::{compare_props, PartialOrdering},
    },
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    props: Vec<Proposition>,
}

impl Database {
    pub fn propositions(&self) -> &[Proposition] {
        &self.props
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn contains(&self, prop: &Proposition) -> bool {
        self.props.contains(prop)
    }

    /// True iff some stored fact dominates `prop` (including equality).
    pub fn dominates(&self, prop: &Proposition) -> Result<bool, SolverError> {
        for q in &self.props {
            match compare_props(q, prop)? {
                PartialOrdering::Greater | PartialOrdering::Equal => return Ok(true),
                _ => {}
            }
        }
        Ok(false)
    }

    /// Attempts to add `prop`. A fact dominated by the database is
    /// rejected; otherwise every fact the newcomer dominates is evicted
    /// and the newcomer is stored. Returns whether the database changed.
    pub fn insert(&mut self, prop: Proposition) -> Result<bool, SolverError> {
        debug_assert!(prop.is_concrete(), "inserting non-concrete {}", prop);

        if self.dominates(&prop)? {
            trace!("{} is already subsumed", prop);
            return Ok(false);
        }

        let mut kept = Vec::with_capacity(self.props.len() + 1);
        for q in self.props.drain(..) {
            match compare_props(&prop, &q)? {
                PartialOrdering::Greater | PartialOrdering::Equal => {
                    trace!("{} evicts {}", prop, q);
                }
                _ => kept.push(q),
            }
        }
        kept.push(prop);
        self.props = kept;
        Ok(true)
    }

    /// The propositions considered for premise matching. Returns all of
    /// them; a per-relation or recency filter would plug in here without
    /// changing observable behavior.
    pub fn candidates(&self) -> &[Proposition] {
        &self.props
    }

    /// True iff no stored fact dominates another.
    pub fn is_antichain(&self) -> Result<bool, SolverError> {
        for (i, p) in self.props.iter().enumerate() {
            for q in &self.props[i + 1..] {
                if compare_props(p, q)? != PartialOrdering::Incomparable {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}
