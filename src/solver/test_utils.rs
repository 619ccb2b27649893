//! Builders shared by the component and scenario tests.

use crate::ir::{FixpointSpec, Proposition, Quantifier, Rule, Sort, Term, TupleOrdering, Variable};

pub fn nat_var(name: &str) -> Term {
    Term::var(name, Sort::Nat)
}

pub fn pair(a: Term, b: Term) -> Term {
    Term::tuple(vec![a, b])
}

pub fn triple(a: Term, b: Term, c: Term) -> Term {
    Term::tuple(vec![a, b, c])
}

pub fn nat_tuple_sort(arity: usize) -> Sort {
    Sort::Tuple(TupleOrdering::Lexicographic, vec![Sort::Nat; arity])
}

pub fn apply(function: &str, args: Vec<Term>, ret: Sort) -> Term {
    Term::Application(function.to_string(), args, ret)
}

/// Wraps `rest` in universal quantifiers over `Nat` variables.
pub fn forall(names: &[&str], rest: Rule) -> Rule {
    forall_sorted(
        &names
            .iter()
            .map(|&n| (n, Sort::Nat))
            .collect::<Vec<_>>(),
        rest,
    )
}

pub fn forall_sorted(vars: &[(&str, Sort)], rest: Rule) -> Rule {
    vars.iter().rev().fold(rest, |acc, (name, sort)| {
        Rule::Quantify(
            Quantifier::Universal(Variable::new(*name, sort.clone())),
            Box::new(acc),
        )
    })
}

pub fn premise(relation: &str, arg: Term, rest: Rule) -> Rule {
    Rule::Premise(Proposition::new(relation, arg), Box::new(rest))
}

pub fn let_clause(name: &str, term: Term, rest: Rule) -> Rule {
    Rule::Let(name.to_string(), term, Box::new(rest))
}

pub fn filter(cond: Term, rest: Rule) -> Rule {
    Rule::Filter(cond, Box::new(rest))
}

pub fn conclude(relation: &str, arg: Term) -> Rule {
    Rule::Conclude(Proposition::new(relation, arg))
}

pub fn fixpoint_spec(axioms: &[&str], rules: &[&str]) -> FixpointSpec {
    FixpointSpec {
        axioms: axioms.iter().map(|s| s.to_string()).collect(),
        rules: rules.iter().map(|s| s.to_string()).collect(),
    }
}

/// Natural-number addition over `Zero`/`Suc` chains.
pub fn plus_native(args: &[Term]) -> Term {
    let a = args[0].as_nat().expect("plus expects concrete naturals");
    let b = args[1].as_nat().expect("plus expects concrete naturals");
    Term::nat(a + b)
}

/// Structural equality of two naturals as a `Bool` term.
pub fn eq_nat_native(args: &[Term]) -> Term {
    Term::bool(args[0] == args[1])
}
