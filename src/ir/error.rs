//! Configuration errors: an inconsistent module description is rejected
//! before the fixpoint loop starts.

use thiserror::Error;

use crate::ir::{Ctor, Name, Sort};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown relation '{0}'")]
    UnknownRelation(Name),

    #[error("unknown function '{name}' in {context}")]
    UnknownFunction { name: Name, context: String },

    #[error("unknown rule '{rule}' in fixpoint spec '{spec}'")]
    UnknownRule { rule: Name, spec: Name },

    #[error("unknown axiom '{axiom}' in fixpoint spec '{spec}'")]
    UnknownAxiom { axiom: Name, spec: Name },

    #[error("unknown fixpoint spec '{0}'")]
    UnknownSpec(Name),

    #[error("predicate sort alias cycle through '{0}'")]
    SortAliasCycle(Name),

    #[error("sort mismatch in {context}: expected {expected}, found {found}")]
    SortMismatch {
        context: String,
        expected: Sort,
        found: Sort,
    },

    #[error("constructor {ctor:?} with {arity} arguments does not inhabit sort {sort} in {context}")]
    MalformedConstructor {
        ctor: Ctor,
        arity: usize,
        sort: Sort,
        context: String,
    },

    #[error("variable '{name}' is not in scope in {context}")]
    UnboundVariable { name: Name, context: String },

    #[error("function '{name}' applied to {found} arguments, expected {expected}, in {context}")]
    ArityMismatch {
        name: Name,
        expected: usize,
        found: usize,
        context: String,
    },

    #[error("axiom '{0}' is not concrete")]
    AxiomNotConcrete(Name),
}
