//! Term evaluation: expanding built-in function applications to normal
//! form against the module's implementations.

use crate::{
    ir::{Module, Proposition, Term},
    solver::error::SolverError,
};

/// Reduces terms against a module's function table.
pub struct Evaluator<'m> {
    module: &'m Module,
}

impl<'m> Evaluator<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self { module }
    }

    /// Reduces a term toward normal form. Symbolic subterms are left in
    /// place: a variable evaluates to itself, and an application whose
    /// arguments are not all concrete is reassembled around its evaluated
    /// arguments. On fully concrete input the result is concrete.
    pub fn evaluate_term(&self, term: &Term) -> Result<Term, SolverError> {
        match term {
            Term::Variable(_) => Ok(term.clone()),
            Term::Constructor(ctor, args, sort) => {
                let args = args
                    .iter()
                    .map(|a| self.evaluate_term(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Term::Constructor(*ctor, args, sort.clone()))
            }
            Term::Application(name, args, sort) => {
                let args = args
                    .iter()
                    .map(|a| self.evaluate_term(a))
                    .collect::<Result<Vec<_>, _>>()?;
                if args.iter().all(Term::is_concrete) {
                    let function = self
                        .module
                        .functions
                        .get(name)
                        .ok_or_else(|| SolverError::MissingFunction(name.clone()))?;
                    // Compound definitions: the returned term may itself
                    // contain applications.
                    let expanded = (function.body)(&args);
                    self.evaluate_term(&expanded)
                } else {
                    Ok(Term::Application(name.clone(), args, sort.clone()))
                }
            }
        }
    }

    /// Evaluates a proposition's argument and requires the result to be
    /// concrete; the engine calls this on every conclusion.
    pub fn evaluate_proposition(&self, prop: &Proposition) -> Result<Proposition, SolverError> {
        let arg = self.evaluate_term(&prop.arg)?;
        if !arg.is_concrete() {
            return Err(SolverError::Internal(format!(
                "proposition {}({}) did not evaluate to a concrete argument",
                prop.relation, arg
            )));
        }
        Ok(Proposition {
            relation: prop.relation.clone(),
            arg,
        })
    }
}
