//! Load-time rule rewriting: α-freshening of binder names and the
//! canonical shape used by incremental application.

use std::collections::HashMap;

use crate::ir::{Name, Quantifier, Rule, Term, Variable};

/// Rewrites a rule into canonical form: every quantifier hoisted to the
/// front (source order preserved), premise/let/filter clauses kept in
/// source order, the conclusion at the tail. A pure rewrite; no term is
/// evaluated.
pub fn normalize(rule: &Rule) -> Rule {
    let mut quantifiers = Vec::new();
    let body = strip_quantifiers(rule, &mut quantifiers);
    quantifiers
        .into_iter()
        .rev()
        .fold(body, |acc, q| Rule::Quantify(q, Box::new(acc)))
}

fn strip_quantifiers(rule: &Rule, out: &mut Vec<Quantifier>) -> Rule {
    match rule {
        Rule::Quantify(q, rest) => {
            out.push(q.clone());
            strip_quantifiers(rest, out)
        }
        Rule::Premise(prop, rest) => {
            Rule::Premise(prop.clone(), Box::new(strip_quantifiers(rest, out)))
        }
        Rule::Let(name, term, rest) => Rule::Let(
            name.clone(),
            term.clone(),
            Box::new(strip_quantifiers(rest, out)),
        ),
        Rule::Filter(cond, rest) => {
            Rule::Filter(cond.clone(), Box::new(strip_quantifiers(rest, out)))
        }
        Rule::Conclude(prop) => Rule::Conclude(prop.clone()),
    }
}

/// Renames every binder introduced by the rule (quantifiers and `let`
/// clauses) to a globally fresh name drawn from `counter`, so that
/// substitution never needs to avoid capture across rules or residual
/// partial rules.
pub fn freshen(rule: &Rule, counter: &mut usize) -> Rule {
    freshen_inner(rule, &HashMap::new(), counter)
}

fn fresh_name(name: &str, counter: &mut usize) -> Name {
    let fresh = format!("{}${}", name, *counter);
    *counter += 1;
    fresh
}

fn freshen_inner(rule: &Rule, renames: &HashMap<Name, Name>, counter: &mut usize) -> Rule {
    match rule {
        Rule::Quantify(Quantifier::Universal(v), rest) => {
            let fresh = fresh_name(&v.name, counter);
            let mut inner = renames.clone();
            inner.insert(v.name.clone(), fresh.clone());
            Rule::Quantify(
                Quantifier::Universal(Variable::new(fresh, v.sort.clone())),
                Box::new(freshen_inner(rest, &inner, counter)),
            )
        }
        Rule::Premise(prop, rest) => {
            let mut prop = prop.clone();
            prop.arg = rename_term(&prop.arg, renames);
            Rule::Premise(prop, Box::new(freshen_inner(rest, renames, counter)))
        }
        Rule::Let(name, term, rest) => {
            let fresh = fresh_name(name, counter);
            let mut inner = renames.clone();
            inner.insert(name.clone(), fresh.clone());
            Rule::Let(
                fresh,
                rename_term(term, renames),
                Box::new(freshen_inner(rest, &inner, counter)),
            )
        }
        Rule::Filter(cond, rest) => Rule::Filter(
            rename_term(cond, renames),
            Box::new(freshen_inner(rest, renames, counter)),
        ),
        Rule::Conclude(prop) => {
            let mut prop = prop.clone();
            prop.arg = rename_term(&prop.arg, renames);
            Rule::Conclude(prop)
        }
    }
}

fn rename_term(term: &Term, renames: &HashMap<Name, Name>) -> Term {
    match term {
        Term::Variable(v) => match renames.get(&v.name) {
            Some(fresh) => Term::Variable(Variable::new(fresh.clone(), v.sort.clone())),
            None => term.clone(),
        },
        Term::Constructor(ctor, args, sort) => Term::Constructor(
            *ctor,
            args.iter().map(|a| rename_term(a, renames)).collect(),
            sort.clone(),
        ),
        Term::Application(name, args, sort) => Term::Application(
            name.clone(),
            args.iter().map(|a| rename_term(a, renames)).collect(),
            sort.clone(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Proposition, Sort};

    fn x() -> Term {
        Term::var("x", Sort::Nat)
    }

    fn y() -> Term {
        Term::var("y", Sort::Nat)
    }

    #[test]
    fn hoists_quantifiers_past_lets_and_premises() {
        // q(x), ∀y. let z = y, q(y) ⊢ q(z), with ∀x out front already
        let rule = Rule::Quantify(
            Quantifier::Universal(Variable::new("x", Sort::Nat)),
            Box::new(Rule::Premise(
                Proposition::new("q", x()),
                Box::new(Rule::Quantify(
                    Quantifier::Universal(Variable::new("y", Sort::Nat)),
                    Box::new(Rule::Let(
                        "z".to_string(),
                        y(),
                        Box::new(Rule::Premise(
                            Proposition::new("q", y()),
                            Box::new(Rule::Conclude(Proposition::new(
                                "q",
                                Term::var("z", Sort::Nat),
                            ))),
                        )),
                    )),
                )),
            )),
        );

        let normalized = normalize(&rule);
        let expected = Rule::Quantify(
            Quantifier::Universal(Variable::new("x", Sort::Nat)),
            Box::new(Rule::Quantify(
                Quantifier::Universal(Variable::new("y", Sort::Nat)),
                Box::new(Rule::Premise(
                    Proposition::new("q", x()),
                    Box::new(Rule::Let(
                        "z".to_string(),
                        y(),
                        Box::new(Rule::Premise(
                            Proposition::new("q", y()),
                            Box::new(Rule::Conclude(Proposition::new(
                                "q",
                                Term::var("z", Sort::Nat),
                            ))),
                        )),
                    )),
                )),
            )),
        );
        assert_eq!(normalized, expected);
    }

    #[test]
    fn normalization_is_idempotent() {
        let rule = Rule::Premise(
            Proposition::new("q", x()),
            Box::new(Rule::Quantify(
                Quantifier::Universal(Variable::new("y", Sort::Nat)),
                Box::new(Rule::Conclude(Proposition::new("q", y()))),
            )),
        );
        let once = normalize(&rule);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn freshen_renames_binders_and_uses() {
        let rule = Rule::Quantify(
            Quantifier::Universal(Variable::new("x", Sort::Nat)),
            Box::new(Rule::Premise(
                Proposition::new("q", x()),
                Box::new(Rule::Conclude(Proposition::new("q", Term::suc(x())))),
            )),
        );
        let mut counter = 0;
        let fresh = freshen(&rule, &mut counter);
        assert_eq!(counter, 1);
        assert_eq!(
            fresh.to_string(),
            "∀x$0:Nat. q(x$0), ⊢ q(Suc(x$0))"
        );
        // Free variables stay untouched.
        assert!(fresh.free_vars().is_empty());
    }

    #[test]
    fn freshen_keeps_distinct_rules_apart() {
        let rule = Rule::Quantify(
            Quantifier::Universal(Variable::new("x", Sort::Nat)),
            Box::new(Rule::Conclude(Proposition::new("q", x()))),
        );
        let mut counter = 0;
        let first = freshen(&rule, &mut counter);
        let second = freshen(&rule, &mut counter);
        assert_ne!(first, second);
    }
}
