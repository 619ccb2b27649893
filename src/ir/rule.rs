use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::ir::{Name, Proposition, Term, Variable};

/// The quantifier kinds a rule may introduce. Universal quantification is
/// the only supported kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    Universal(Variable),
}

impl Quantifier {
    pub fn var(&self) -> &Variable {
        match self {
            Quantifier::Universal(v) => v,
        }
    }
}

/// A rule body, read top to bottom: quantifiers introduce variables,
/// premises are matched against the database by unification, `let`
/// clauses bind evaluated terms, filters gate on a boolean condition, and
/// the terminal clause is the conclusion.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    Quantify(Quantifier, Box<Rule>),
    Premise(Proposition, Box<Rule>),
    Let(Name, Term, Box<Rule>),
    Filter(Term, Box<Rule>),
    Conclude(Proposition),
}

impl Rule {
    /// The variables occurring free in the rule, i.e. not bound by an
    /// enclosing quantifier or `let`.
    pub fn free_vars(&self) -> BTreeSet<Name> {
        match self {
            Rule::Quantify(q, rest) => {
                let mut vars = rest.free_vars();
                vars.remove(&q.var().name);
                vars
            }
            Rule::Premise(prop, rest) => {
                let mut vars = rest.free_vars();
                prop.arg.collect_vars(&mut vars);
                vars
            }
            Rule::Let(name, term, rest) => {
                let mut vars = rest.free_vars();
                vars.remove(name);
                term.collect_vars(&mut vars);
                vars
            }
            Rule::Filter(cond, rest) => {
                let mut vars = rest.free_vars();
                cond.collect_vars(&mut vars);
                vars
            }
            Rule::Conclude(prop) => {
                let mut vars = BTreeSet::new();
                prop.arg.collect_vars(&mut vars);
                vars
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Quantify(q, rest) => {
                let v = q.var();
                write!(f, "∀{}:{}. {}", v.name, v.sort, rest)
            }
            Rule::Premise(prop, rest) => write!(f, "{}, {}", prop, rest),
            Rule::Let(name, term, rest) => write!(f, "let {} = {}, {}", name, term, rest),
            Rule::Filter(cond, rest) => write!(f, "filter {}, {}", cond, rest),
            Rule::Conclude(prop) => write!(f, "⊢ {}", prop),
        }
    }
}
