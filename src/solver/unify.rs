//! Substitutions and unification.
//!
//! A substitution is a finite name → term mapping; unification of two
//! terms under a common sort extends one until both sides agree. A
//! failed unification is not an error: `Ok(None)` means the rule simply
//! does not fire on that candidate (structural mismatch or occurs-check),
//! while `Err` is reserved for sort mismatches, which indicate a bug in
//! rule or axiom construction.

use std::collections::HashMap;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    ir::{Module, Name, Proposition, Rule, Sort, Term},
    solver::{error::SolverError, eval::Evaluator},
};

/// A finite mapping from variable names to terms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    map: HashMap<Name, Term>,
}

impl Substitution {
    pub fn single(name: impl Into<Name>, term: Term) -> Self {
        let mut subst = Self::default();
        subst.bind(name.into(), term);
        subst
    }

    pub fn bind(&mut self, name: Name, term: Term) {
        self.map.insert(name, term);
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.map.get(name)
    }

    pub fn binds(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn without(&self, name: &str) -> Substitution {
        let mut inner = self.clone();
        inner.map.remove(name);
        inner
    }

    /// Replaces bound variables, resolving chained bindings; the
    /// occurs-check at binding time guarantees termination.
    pub fn apply_term(&self, term: &Term) -> Term {
        match term {
            Term::Variable(v) => match self.map.get(&v.name) {
                Some(replacement) => self.apply_term(replacement),
                None => term.clone(),
            },
            Term::Constructor(ctor, args, sort) => Term::Constructor(
                *ctor,
                args.iter().map(|a| self.apply_term(a)).collect(),
                sort.clone(),
            ),
            Term::Application(name, args, sort) => Term::Application(
                name.clone(),
                args.iter().map(|a| self.apply_term(a)).collect(),
                sort.clone(),
            ),
        }
    }

    pub fn apply_prop(&self, prop: &Proposition) -> Proposition {
        Proposition {
            relation: prop.relation.clone(),
            arg: self.apply_term(&prop.arg),
        }
    }

    /// Pushes the substitution through a rule body. Binders introduced by
    /// `Quantify` and `Let` shadow the outer substitution for the scope
    /// of their body.
    pub fn apply_rule(&self, rule: &Rule) -> Rule {
        match rule {
            Rule::Quantify(q, rest) => {
                let inner = self.without(&q.var().name);
                Rule::Quantify(q.clone(), Box::new(inner.apply_rule(rest)))
            }
            Rule::Premise(prop, rest) => {
                Rule::Premise(self.apply_prop(prop), Box::new(self.apply_rule(rest)))
            }
            Rule::Let(name, term, rest) => {
                let inner = self.without(name);
                Rule::Let(
                    name.clone(),
                    self.apply_term(term),
                    Box::new(inner.apply_rule(rest)),
                )
            }
            Rule::Filter(cond, rest) => {
                Rule::Filter(self.apply_term(cond), Box::new(self.apply_rule(rest)))
            }
            Rule::Conclude(prop) => Rule::Conclude(self.apply_prop(prop)),
        }
    }
}

/// Unifies two terms, expanding built-in applications when one side is
/// not yet evaluated.
pub fn unify_terms(
    module: &Module,
    a: &Term,
    b: &Term,
) -> Result<Option<Substitution>, SolverError> {
    let mut subst = Substitution::default();
    if unify_into(Some(module), a, b, &mut subst)? {
        Ok(Some(subst))
    } else {
        Ok(None)
    }
}

/// Unifies two terms without evaluating applications; the mixed
/// constructor/application case fails. Used by the partial order, which
/// only ever sees evaluated terms.
pub fn unify_syntactic(a: &Term, b: &Term) -> Result<Option<Substitution>, SolverError> {
    let mut subst = Substitution::default();
    if unify_into(None, a, b, &mut subst)? {
        Ok(Some(subst))
    } else {
        Ok(None)
    }
}

/// Unifies two propositions: relation names must be equal and the
/// argument terms must unify. The yielded substitution is the argument
/// substitution.
pub fn unify_props(
    module: &Module,
    p: &Proposition,
    q: &Proposition,
) -> Result<Option<Substitution>, SolverError> {
    if p.relation != q.relation {
        return Ok(None);
    }
    unify_terms(module, &p.arg, &q.arg)
}

fn unify_into(
    module: Option<&Module>,
    a: &Term,
    b: &Term,
    subst: &mut Substitution,
) -> Result<bool, SolverError> {
    if !sorts_agree(module, a.sort(), b.sort()) {
        return Err(SolverError::SortMismatch {
            left: a.sort().clone(),
            right: b.sort().clone(),
        });
    }

    match (a, b) {
        (Term::Variable(v), other) | (other, Term::Variable(v)) => {
            bind_var(module, &v.name, other, subst)
        }
        (Term::Constructor(c1, args1, _), Term::Constructor(c2, args2, _)) => {
            if c1 != c2 {
                return Ok(false);
            }
            if args1.len() != args2.len() {
                return Err(SolverError::Internal(format!(
                    "constructor {:?} with mismatched arities {} and {}",
                    c1,
                    args1.len(),
                    args2.len()
                )));
            }
            unify_args(module, args1, args2, subst)
        }
        (Term::Application(f1, args1, _), Term::Application(f2, args2, _))
            if f1 == f2 && args1.len() == args2.len() =>
        {
            unify_args(module, args1, args2, subst)
        }
        _ => retry_after_eval(module, a, b, subst),
    }
}

fn unify_args(
    module: Option<&Module>,
    lhs: &[Term],
    rhs: &[Term],
    subst: &mut Substitution,
) -> Result<bool, SolverError> {
    for (x, y) in lhs.iter().zip(rhs) {
        if !unify_into(module, x, y, subst)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// The mixed constructor/application case: evaluate both sides, then
/// retry once. If either side still lacks a constructor head, the two
/// terms do not unify.
fn retry_after_eval(
    module: Option<&Module>,
    a: &Term,
    b: &Term,
    subst: &mut Substitution,
) -> Result<bool, SolverError> {
    let Some(module) = module else {
        return Ok(false);
    };
    let eval = Evaluator::new(module);
    let a = eval.evaluate_term(&subst.apply_term(a))?;
    let b = eval.evaluate_term(&subst.apply_term(b))?;
    match (&a, &b) {
        (Term::Constructor(_, _, _), Term::Constructor(_, _, _)) => {
            unify_into(Some(module), &a, &b, subst)
        }
        _ => Ok(false),
    }
}

fn bind_var(
    module: Option<&Module>,
    name: &str,
    term: &Term,
    subst: &mut Substitution,
) -> Result<bool, SolverError> {
    if let Term::Variable(w) = term {
        if w.name == name {
            return Ok(true);
        }
    }
    if let Some(previous) = subst.get(name) {
        let previous = previous.clone();
        return unify_into(module, &previous, term, subst);
    }
    if occurs(name, term, subst) {
        trace!("occurs-check rejected binding '{}' to {}", name, term);
        return Ok(false);
    }
    subst.bind(name.to_string(), term.clone());
    Ok(true)
}

fn occurs(name: &str, term: &Term, subst: &Substitution) -> bool {
    match term {
        Term::Variable(v) => {
            if v.name == name {
                return true;
            }
            match subst.get(&v.name) {
                Some(bound) => occurs(name, bound, subst),
                None => false,
            }
        }
        Term::Constructor(_, args, _) | Term::Application(_, args, _) => {
            args.iter().any(|a| occurs(name, a, subst))
        }
    }
}

fn sorts_agree(module: Option<&Module>, left: &Sort, right: &Sort) -> bool {
    if left == right {
        return true;
    }
    // Nominal aliases may face their structural expansion.
    match module {
        Some(m) => match (m.resolve_sort(left), m.resolve_sort(right)) {
            (Ok(l), Ok(r)) => l == r,
            _ => false,
        },
        None => false,
    }
}
