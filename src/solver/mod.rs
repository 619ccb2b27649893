//! The fixpoint engine: unification, the term evaluator, the
//! subsumption-aware database, the patch worklist, and the saturation
//! loop that ties them together.

use crate::ir::{Module, Proposition};

pub mod db;
pub mod debug;
pub mod engine;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod normalize;
pub mod order;
pub mod queue;
pub mod unify;

#[cfg(test)]
pub(crate) mod test_utils;

pub use db::Database;
pub use engine::{Engine, Saturation, WorklistEngine};
pub use error::SolverError;
pub use metrics::FixpointMetrics;
pub use order::PartialOrdering;
pub use queue::{Patch, PatchComparator, PartialRule};
pub use unify::Substitution;

/// Runs one fixpoint to completion (or gas exhaustion) and returns the
/// final database. The module is validated first; a malformed module is
/// rejected before the loop starts.
pub fn generate(
    module: &Module,
    spec_name: &str,
    initial_props: Vec<Proposition>,
    gas: u64,
) -> Result<Database, SolverError> {
    Ok(generate_with_metrics(module, spec_name, initial_props, gas)?.database)
}

/// Like [`generate`], but also returns the loop's counters; residual
/// gas distinguishes a true fixpoint from an exhausted budget.
pub fn generate_with_metrics(
    module: &Module,
    spec_name: &str,
    initial_props: Vec<Proposition>,
    gas: u64,
) -> Result<Saturation, SolverError> {
    WorklistEngine::default().generate(module, spec_name, initial_props, gas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{Sort, Term},
        solver::test_utils::*,
    };

    #[test]
    fn generate_runs_a_small_program_end_to_end() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut module = Module::new();
        module.insert_relation("count", Sort::Nat);
        module.insert_axiom("start", Proposition::new("count", Term::nat(0)));
        module.insert_rule(
            "next",
            forall(
                &["n"],
                premise(
                    "count",
                    nat_var("n"),
                    conclude("count", Term::suc(nat_var("n"))),
                ),
            ),
        );
        module.insert_fixpoint("main", fixpoint_spec(&["start"], &["next"]));

        let db = generate(&module, "main", vec![], 5).unwrap();
        assert_eq!(db.len(), 4);
        assert!(db.contains(&Proposition::new("count", Term::nat(3))));

        let saturation = generate_with_metrics(&module, "main", vec![], 5).unwrap();
        assert_eq!(saturation.metrics.gas_remaining, 0);
        assert_eq!(saturation.metrics.iterations, 5);
    }
}
