//! A Datalog-style deductive engine over a lattice-ordered term algebra.
//!
//! The `ir` module holds the data model a host hands to the engine: sorts,
//! terms, propositions, rules, and the module description that collects
//! them. The `solver` module is the engine proper: unification, the term
//! evaluator, the subsumption-aware database, and the worklist-driven
//! fixpoint loop behind [`solver::generate`].

pub mod ir;
pub mod solver;
