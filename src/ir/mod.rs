//! The data model shared between hosts and the engine: sorts, terms,
//! propositions, rules, and the module description that collects them.

pub mod error;
pub mod module;
pub mod rule;
pub mod sort;
pub mod term;
pub mod validate;

pub use error::ConfigError;
pub use module::{FixpointSpec, Function, Module, NativeFn};
pub use rule::{Quantifier, Rule};
pub use sort::{Sort, TupleOrdering};
pub use term::{Ctor, Proposition, Term, Variable};

/// Names of relations, functions, rules, axioms, variables and fixpoint
/// specs. The engine treats names as opaque; hosts are expected to keep
/// them unique per namespace.
pub type Name = String;
