//! Up-front configuration checking.
//!
//! A `generate` call refuses to start on an inconsistent module: every
//! name must resolve, every term's sort annotation must be consistent
//! with its head, rules must sort-check under the scope built up by
//! their quantifiers and `let` clauses, and fixpoint specs may only
//! reference known axioms and rules.

use std::collections::HashMap;

use crate::ir::{ConfigError, Ctor, Module, Name, Proposition, Rule, Sort, Term};

type Scope = HashMap<Name, Sort>;

/// Checks the whole module; any violation is reported before the
/// fixpoint loop pops a single patch.
pub fn validate_module(module: &Module) -> Result<(), ConfigError> {
    for sort in module.relations.values() {
        module.resolve_sort(sort)?;
    }

    for function in module.functions.values() {
        for param in &function.params {
            module.resolve_sort(param)?;
        }
        module.resolve_sort(&function.ret)?;
    }

    for (name, prop) in &module.axioms {
        check_axiom(module, name, prop)?;
    }

    for (name, rule) in &module.rules {
        check_rule(module, name, rule)?;
    }

    for (name, spec) in &module.fixpoints {
        for axiom in &spec.axioms {
            if !module.axioms.contains_key(axiom) {
                return Err(ConfigError::UnknownAxiom {
                    axiom: axiom.clone(),
                    spec: name.clone(),
                });
            }
        }
        for rule in &spec.rules {
            if !module.rules.contains_key(rule) {
                return Err(ConfigError::UnknownRule {
                    rule: rule.clone(),
                    spec: name.clone(),
                });
            }
        }
    }

    Ok(())
}

fn check_axiom(module: &Module, name: &str, prop: &Proposition) -> Result<(), ConfigError> {
    if !prop.is_concrete() {
        return Err(ConfigError::AxiomNotConcrete(name.to_string()));
    }
    let context = format!("axiom '{}'", name);
    check_prop(module, prop, &Scope::new(), &context)
}

fn check_rule(module: &Module, name: &str, rule: &Rule) -> Result<(), ConfigError> {
    let context = format!("rule '{}'", name);
    check_clauses(module, rule, &mut Scope::new(), &context)
}

fn check_clauses(
    module: &Module,
    rule: &Rule,
    scope: &mut Scope,
    context: &str,
) -> Result<(), ConfigError> {
    match rule {
        Rule::Quantify(q, rest) => {
            let v = q.var();
            let sort = module.resolve_sort(&v.sort)?;
            scope.insert(v.name.clone(), sort);
            check_clauses(module, rest, scope, context)
        }
        Rule::Premise(prop, rest) => {
            check_prop(module, prop, scope, context)?;
            check_clauses(module, rest, scope, context)
        }
        Rule::Let(name, term, rest) => {
            check_term(module, term, scope, context)?;
            let sort = module.resolve_sort(term.sort())?;
            scope.insert(name.clone(), sort);
            check_clauses(module, rest, scope, context)
        }
        Rule::Filter(cond, rest) => {
            check_term(module, cond, scope, context)?;
            let sort = module.resolve_sort(cond.sort())?;
            if sort != Sort::Bool {
                return Err(ConfigError::SortMismatch {
                    context: format!("filter condition of {}", context),
                    expected: Sort::Bool,
                    found: sort,
                });
            }
            check_clauses(module, rest, scope, context)
        }
        Rule::Conclude(prop) => check_prop(module, prop, scope, context),
    }
}

fn check_prop(
    module: &Module,
    prop: &Proposition,
    scope: &Scope,
    context: &str,
) -> Result<(), ConfigError> {
    let declared = module
        .relations
        .get(&prop.relation)
        .ok_or_else(|| ConfigError::UnknownRelation(prop.relation.clone()))?;
    check_term(module, &prop.arg, scope, context)?;

    let expected = module.resolve_sort(declared)?;
    let found = module.resolve_sort(prop.arg.sort())?;
    if expected != found {
        return Err(ConfigError::SortMismatch {
            context: format!("argument of '{}' in {}", prop.relation, context),
            expected,
            found,
        });
    }
    Ok(())
}

fn check_term(
    module: &Module,
    term: &Term,
    scope: &Scope,
    context: &str,
) -> Result<(), ConfigError> {
    match term {
        Term::Variable(v) => {
            let bound = scope.get(&v.name).ok_or_else(|| ConfigError::UnboundVariable {
                name: v.name.clone(),
                context: context.to_string(),
            })?;
            let annotated = module.resolve_sort(&v.sort)?;
            if &annotated != bound {
                return Err(ConfigError::SortMismatch {
                    context: format!("variable '{}' in {}", v.name, context),
                    expected: bound.clone(),
                    found: annotated,
                });
            }
            Ok(())
        }
        Term::Constructor(ctor, args, sort) => {
            for arg in args {
                check_term(module, arg, scope, context)?;
            }
            check_ctor(module, *ctor, args, sort, context)
        }
        Term::Application(name, args, sort) => {
            for arg in args {
                check_term(module, arg, scope, context)?;
            }
            let function =
                module
                    .functions
                    .get(name)
                    .ok_or_else(|| ConfigError::UnknownFunction {
                        name: name.clone(),
                        context: context.to_string(),
                    })?;
            if function.params.len() != args.len() {
                return Err(ConfigError::ArityMismatch {
                    name: name.clone(),
                    expected: function.params.len(),
                    found: args.len(),
                    context: context.to_string(),
                });
            }
            for (param, arg) in function.params.iter().zip(args) {
                let expected = module.resolve_sort(param)?;
                let found = module.resolve_sort(arg.sort())?;
                if expected != found {
                    return Err(ConfigError::SortMismatch {
                        context: format!("argument of '{}' in {}", name, context),
                        expected,
                        found,
                    });
                }
            }
            let expected = module.resolve_sort(&function.ret)?;
            let found = module.resolve_sort(sort)?;
            if expected != found {
                return Err(ConfigError::SortMismatch {
                    context: format!("result of '{}' in {}", name, context),
                    expected,
                    found,
                });
            }
            Ok(())
        }
    }
}

fn check_ctor(
    module: &Module,
    ctor: Ctor,
    args: &[Term],
    sort: &Sort,
    context: &str,
) -> Result<(), ConfigError> {
    let resolved = module.resolve_sort(sort)?;
    let malformed = || ConfigError::MalformedConstructor {
        ctor,
        arity: args.len(),
        sort: resolved.clone(),
        context: context.to_string(),
    };

    match (ctor, &resolved) {
        (Ctor::Unit, Sort::Unit) if args.is_empty() => Ok(()),
        (Ctor::True | Ctor::False, Sort::Bool) if args.is_empty() => Ok(()),
        (Ctor::Zero, Sort::Nat) if args.is_empty() => Ok(()),
        (Ctor::Suc, Sort::Nat) if args.len() == 1 => {
            let inner = module.resolve_sort(args[0].sort())?;
            if inner == Sort::Nat {
                Ok(())
            } else {
                Err(malformed())
            }
        }
        (Ctor::Tuple, Sort::Tuple(_, components)) if args.len() == components.len() => {
            for (component, arg) in components.iter().zip(args) {
                let found = module.resolve_sort(arg.sort())?;
                if &found != component {
                    return Err(ConfigError::SortMismatch {
                        context: format!("tuple component in {}", context),
                        expected: component.clone(),
                        found,
                    });
                }
            }
            Ok(())
        }
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FixpointSpec, Quantifier, TupleOrdering, Variable};

    fn nat_pair() -> Sort {
        Sort::Tuple(TupleOrdering::Lexicographic, vec![Sort::Nat, Sort::Nat])
    }

    #[test]
    fn accepts_a_well_formed_module() {
        let mut module = Module::new();
        module.insert_relation("path", nat_pair());
        module.insert_axiom(
            "base",
            Proposition::new("path", Term::tuple(vec![Term::nat(0), Term::nat(1)])),
        );
        module.insert_rule(
            "step",
            Rule::Quantify(
                Quantifier::Universal(Variable::new("a", Sort::Nat)),
                Box::new(Rule::Quantify(
                    Quantifier::Universal(Variable::new("b", Sort::Nat)),
                    Box::new(Rule::Premise(
                        Proposition::new(
                            "path",
                            Term::tuple(vec![
                                Term::var("a", Sort::Nat),
                                Term::var("b", Sort::Nat),
                            ]),
                        ),
                        Box::new(Rule::Conclude(Proposition::new(
                            "path",
                            Term::tuple(vec![
                                Term::var("a", Sort::Nat),
                                Term::suc(Term::var("b", Sort::Nat)),
                            ]),
                        ))),
                    )),
                )),
            ),
        );
        module.insert_fixpoint(
            "main",
            FixpointSpec {
                axioms: vec!["base".to_string()],
                rules: vec!["step".to_string()],
            },
        );

        assert_eq!(validate_module(&module), Ok(()));
    }

    #[test]
    fn rejects_axiom_with_unknown_relation() {
        let mut module = Module::new();
        module.insert_axiom("a", Proposition::new("nowhere", Term::nat(0)));
        assert_eq!(
            validate_module(&module),
            Err(ConfigError::UnknownRelation("nowhere".to_string()))
        );
    }

    #[test]
    fn rejects_symbolic_axiom() {
        let mut module = Module::new();
        module.insert_relation("q", Sort::Nat);
        module.insert_axiom("a", Proposition::new("q", Term::var("x", Sort::Nat)));
        assert_eq!(
            validate_module(&module),
            Err(ConfigError::AxiomNotConcrete("a".to_string()))
        );
    }

    #[test]
    fn rejects_axiom_with_wrong_argument_sort() {
        let mut module = Module::new();
        module.insert_relation("q", Sort::Nat);
        module.insert_axiom("a", Proposition::new("q", Term::bool(true)));
        assert!(matches!(
            validate_module(&module),
            Err(ConfigError::SortMismatch { .. })
        ));
    }

    #[test]
    fn rejects_rule_with_unbound_variable() {
        let mut module = Module::new();
        module.insert_relation("q", Sort::Nat);
        module.insert_rule(
            "bad",
            Rule::Premise(
                Proposition::new("q", Term::var("x", Sort::Nat)),
                Box::new(Rule::Conclude(Proposition::new(
                    "q",
                    Term::var("x", Sort::Nat),
                ))),
            ),
        );
        assert!(matches!(
            validate_module(&module),
            Err(ConfigError::UnboundVariable { .. })
        ));
    }

    #[test]
    fn rejects_non_boolean_filter() {
        let mut module = Module::new();
        module.insert_relation("q", Sort::Nat);
        module.insert_rule(
            "bad",
            Rule::Quantify(
                Quantifier::Universal(Variable::new("x", Sort::Nat)),
                Box::new(Rule::Premise(
                    Proposition::new("q", Term::var("x", Sort::Nat)),
                    Box::new(Rule::Filter(
                        Term::var("x", Sort::Nat),
                        Box::new(Rule::Conclude(Proposition::new(
                            "q",
                            Term::var("x", Sort::Nat),
                        ))),
                    )),
                )),
            ),
        );
        assert!(matches!(
            validate_module(&module),
            Err(ConfigError::SortMismatch { .. })
        ));
    }

    #[test]
    fn rejects_spec_with_unknown_rule() {
        let mut module = Module::new();
        module.insert_fixpoint(
            "main",
            FixpointSpec {
                axioms: vec![],
                rules: vec!["ghost".to_string()],
            },
        );
        assert!(matches!(
            validate_module(&module),
            Err(ConfigError::UnknownRule { .. })
        ));
    }

    #[test]
    fn rejects_application_of_unknown_function() {
        let mut module = Module::new();
        module.insert_relation("q", Sort::Nat);
        module.insert_rule(
            "bad",
            Rule::Quantify(
                Quantifier::Universal(Variable::new("x", Sort::Nat)),
                Box::new(Rule::Premise(
                    Proposition::new("q", Term::var("x", Sort::Nat)),
                    Box::new(Rule::Conclude(Proposition::new(
                        "q",
                        Term::Application(
                            "plus".to_string(),
                            vec![Term::var("x", Sort::Nat), Term::nat(1)],
                            Sort::Nat,
                        ),
                    ))),
                )),
            ),
        );
        assert!(matches!(
            validate_module(&module),
            Err(ConfigError::UnknownFunction { .. })
        ));
    }
}
