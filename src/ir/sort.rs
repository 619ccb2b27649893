use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ir::Name;

/// How the components of a tuple sort combine into a partial order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TupleOrdering {
    /// Compare components left to right; the first non-equal component
    /// decides, and an incomparable component before a decisive one makes
    /// the whole comparison incomparable.
    Lexicographic,
}

/// The type of a term. Every [`Term`](crate::ir::Term) carries its sort.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sort {
    Unit,
    Bool,
    Nat,
    Tuple(TupleOrdering, Vec<Sort>),
    /// A nominal alias for a user-declared relation's argument sort,
    /// resolved through `Module::relations`.
    Predicate(Name),
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Unit => write!(f, "Unit"),
            Sort::Bool => write!(f, "Bool"),
            Sort::Nat => write!(f, "Nat"),
            Sort::Tuple(TupleOrdering::Lexicographic, components) => {
                write!(f, "(")?;
                for (i, s) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", s)?;
                }
                write!(f, ")")
            }
            Sort::Predicate(name) => write!(f, "{}", name),
        }
    }
}
