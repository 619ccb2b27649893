//! The worklist: patches ordered by a caller-supplied total preorder,
//! popped with a subsumption filter against the current database.

use std::{cmp::Ordering, collections::VecDeque, fmt};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    ir::{Name, Proposition, Rule},
    solver::{db::Database, error::SolverError},
};

/// A rule whose leading quantifiers and premises have been partially
/// discharged against the database, with the accumulated substitution
/// already baked into the remaining body. The name records its origin
/// for the rule registry and logging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRule {
    pub name: Name,
    pub rule: Rule,
}

impl fmt::Display for PartialRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.rule)
    }
}

/// A unit of deferred work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Patch {
    /// A new fact has been derived; learn it.
    Conclusion(Proposition),
    /// This rule (or its residual) is live; try to match its next premise
    /// against current facts.
    Apply(PartialRule),
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::Conclusion(prop) => write!(f, "conclude {}", prop),
            Patch::Apply(partial) => write!(f, "apply {}", partial),
        }
    }
}

/// A total preorder on patches. The engine is correct for any choice;
/// the ordering only affects performance and intermediate queue size.
pub type PatchComparator = fn(&Patch, &Patch) -> Ordering;

/// The trivial ordering: every patch ranks alike, so insertion appends
/// and the queue is FIFO.
pub fn trivial_patch_order(_: &Patch, _: &Patch) -> Ordering {
    Ordering::Greater
}

#[derive(Debug)]
pub struct Queue {
    patches: VecDeque<Patch>,
    cmp: PatchComparator,
    discarded: u64,
}

impl Default for Queue {
    fn default() -> Self {
        Self::new(trivial_patch_order)
    }
}

impl Queue {
    pub fn new(cmp: PatchComparator) -> Self {
        Self {
            patches: VecDeque::new(),
            cmp,
            discarded: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Patches discarded by the subsumption filter at pop time.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// The splice point for a patch: after the last queued patch of at
    /// least its priority, keeping insertion stable among equals.
    fn splice_index(&self, patch: &Patch) -> usize {
        for i in (0..self.patches.len()).rev() {
            if (self.cmp)(&self.patches[i], patch) != Ordering::Less {
                return i + 1;
            }
        }
        0
    }

    pub fn insert(&mut self, patch: Patch) {
        let at = self.splice_index(&patch);
        self.patches.insert(at, patch);
    }

    /// Splices the patches produced together by a single learn step as
    /// one contiguous run, preserving their relative order.
    pub fn insert_batch(&mut self, batch: Vec<Patch>) {
        let mut items = batch.into_iter();
        let Some(first) = items.next() else {
            return;
        };
        let mut at = self.splice_index(&first);
        self.patches.insert(at, first);
        for patch in items {
            at += 1;
            self.patches.insert(at, patch);
        }
    }

    /// Removes the highest-priority patch, skipping any conclusion that
    /// the database already dominates. `None` iff the queue drained.
    pub fn pop(&mut self, db: &Database) -> Result<Option<Patch>, SolverError> {
        while let Some(patch) = self.patches.pop_front() {
            if is_subsumed(&patch, db)? {
                trace!("dropping subsumed patch: {}", patch);
                self.discarded += 1;
                continue;
            }
            return Ok(Some(patch));
        }
        Ok(None)
    }
}

/// An apply-patch is never subsumed by facts alone; a conclusion is
/// subsumed when some stored fact dominates it.
fn is_subsumed(patch: &Patch, db: &Database) -> Result<bool, SolverError> {
    match patch {
        Patch::Apply(_) => Ok(false),
        Patch::Conclusion(prop) => db.dominates(prop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Term;

    fn conclusion(n: u64) -> Patch {
        Patch::Conclusion(Proposition::new("q", Term::nat(n)))
    }

    fn pops(queue: &mut Queue, db: &Database) -> Vec<Patch> {
        let mut out = Vec::new();
        while let Some(patch) = queue.pop(db).unwrap() {
            out.push(patch);
        }
        out
    }

    #[test]
    fn default_order_is_fifo() {
        let db = Database::default();
        let mut queue = Queue::default();
        queue.insert(conclusion(0));
        queue.insert(conclusion(1));
        queue.insert(conclusion(2));
        assert_eq!(
            pops(&mut queue, &db),
            vec![conclusion(0), conclusion(1), conclusion(2)]
        );
    }

    #[test]
    fn comparator_orders_pops() {
        // Conclusions outrank applies.
        fn conclusions_first(a: &Patch, b: &Patch) -> Ordering {
            match (a, b) {
                (Patch::Conclusion(_), Patch::Apply(_)) => Ordering::Greater,
                (Patch::Apply(_), Patch::Conclusion(_)) => Ordering::Less,
                _ => Ordering::Equal,
            }
        }

        let db = Database::default();
        let apply = Patch::Apply(PartialRule {
            name: "step".to_string(),
            rule: Rule::Conclude(Proposition::new("q", Term::nat(0))),
        });
        let mut queue = Queue::new(conclusions_first);
        queue.insert(apply.clone());
        queue.insert(conclusion(0));
        queue.insert(conclusion(1));
        assert_eq!(
            pops(&mut queue, &db),
            vec![conclusion(0), conclusion(1), apply]
        );
    }

    #[test]
    fn batches_stay_contiguous() {
        let db = Database::default();
        let mut queue = Queue::default();
        queue.insert(conclusion(9));
        queue.insert_batch(vec![conclusion(0), conclusion(1)]);
        assert_eq!(
            pops(&mut queue, &db),
            vec![conclusion(9), conclusion(0), conclusion(1)]
        );
    }

    #[test]
    fn pop_skips_subsumed_conclusions() {
        let mut db = Database::default();
        db.insert(Proposition::new("r", Term::bool(true))).unwrap();

        let mut queue = Queue::default();
        queue.insert(Patch::Conclusion(Proposition::new("r", Term::bool(false))));
        queue.insert(conclusion(7));

        assert_eq!(queue.pop(&db).unwrap(), Some(conclusion(7)));
        assert_eq!(queue.pop(&db).unwrap(), None);
        assert_eq!(queue.discarded(), 1);
    }

    #[test]
    fn apply_patches_are_never_subsumed() {
        let mut db = Database::default();
        db.insert(Proposition::new("q", Term::nat(0))).unwrap();

        let apply = Patch::Apply(PartialRule {
            name: "step".to_string(),
            rule: Rule::Conclude(Proposition::new("q", Term::nat(0))),
        });
        let mut queue = Queue::default();
        queue.insert(apply.clone());
        assert_eq!(queue.pop(&db).unwrap(), Some(apply));
    }
}
