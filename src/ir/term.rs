use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::ir::{Name, Sort, TupleOrdering};

/// The built-in constructor heads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ctor {
    Unit,
    True,
    False,
    Zero,
    Suc,
    Tuple,
}

/// A sorted variable, bound by a rule quantifier or a `let` clause.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: Name,
    pub sort: Sort,
}

impl Variable {
    pub fn new(name: impl Into<Name>, sort: Sort) -> Self {
        Self {
            name: name.into(),
            sort,
        }
    }
}

/// A term of the algebra.
///
/// Symbolic terms (rule bodies before unification resolves them) may
/// contain `Variable` nodes; a *concrete* term contains no variable and
/// no residual `Application` after evaluation. The engine enforces
/// concreteness at its boundaries rather than in the type, the same way
/// the rest of the data model is checked up front by validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Variable(Variable),
    Constructor(Ctor, Vec<Term>, Sort),
    /// A built-in function invocation; disappears under evaluation.
    Application(Name, Vec<Term>, Sort),
}

impl Term {
    pub fn sort(&self) -> &Sort {
        match self {
            Term::Variable(v) => &v.sort,
            Term::Constructor(_, _, sort) => sort,
            Term::Application(_, _, sort) => sort,
        }
    }

    /// True iff the term contains no variable and no application node.
    pub fn is_concrete(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Application(_, _, _) => false,
            Term::Constructor(_, args, _) => args.iter().all(Term::is_concrete),
        }
    }

    pub fn collect_vars(&self, out: &mut BTreeSet<Name>) {
        match self {
            Term::Variable(v) => {
                out.insert(v.name.clone());
            }
            Term::Constructor(_, args, _) | Term::Application(_, args, _) => {
                for arg in args {
                    arg.collect_vars(out);
                }
            }
        }
    }

    pub fn var(name: impl Into<Name>, sort: Sort) -> Term {
        Term::Variable(Variable::new(name, sort))
    }

    pub fn unit() -> Term {
        Term::Constructor(Ctor::Unit, vec![], Sort::Unit)
    }

    pub fn bool(value: bool) -> Term {
        let ctor = if value { Ctor::True } else { Ctor::False };
        Term::Constructor(ctor, vec![], Sort::Bool)
    }

    pub fn zero() -> Term {
        Term::Constructor(Ctor::Zero, vec![], Sort::Nat)
    }

    pub fn suc(inner: Term) -> Term {
        Term::Constructor(Ctor::Suc, vec![inner], Sort::Nat)
    }

    pub fn nat(value: u64) -> Term {
        let mut term = Term::zero();
        for _ in 0..value {
            term = Term::suc(term);
        }
        term
    }

    /// Builds a lexicographic tuple; the sort is derived from the items.
    pub fn tuple(items: Vec<Term>) -> Term {
        let sort = Sort::Tuple(
            TupleOrdering::Lexicographic,
            items.iter().map(|t| t.sort().clone()).collect(),
        );
        Term::Constructor(Ctor::Tuple, items, sort)
    }

    /// Reads a concrete `Bool` term back out.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Term::Constructor(Ctor::True, _, _) => Some(true),
            Term::Constructor(Ctor::False, _, _) => Some(false),
            _ => None,
        }
    }

    /// Reads a concrete `Nat` term back out.
    pub fn as_nat(&self) -> Option<u64> {
        let mut count = 0u64;
        let mut current = self;
        loop {
            match current {
                Term::Constructor(Ctor::Zero, _, _) => return Some(count),
                Term::Constructor(Ctor::Suc, args, _) => {
                    count += 1;
                    current = args.first()?;
                }
                _ => return None,
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{}", v.name),
            Term::Constructor(Ctor::Unit, _, _) => write!(f, "()"),
            Term::Constructor(Ctor::True, _, _) => write!(f, "true"),
            Term::Constructor(Ctor::False, _, _) => write!(f, "false"),
            Term::Constructor(Ctor::Zero, _, _) => write!(f, "0"),
            Term::Constructor(Ctor::Suc, args, _) => match self.as_nat() {
                Some(n) => write!(f, "{}", n),
                None => write!(f, "Suc({})", args[0]),
            },
            Term::Constructor(Ctor::Tuple, args, _) => {
                write!(f, "⟨")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, "⟩")
            }
            Term::Application(name, args, _) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A relation applied to an argument term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proposition {
    pub relation: Name,
    pub arg: Term,
}

impl Proposition {
    pub fn new(relation: impl Into<Name>, arg: Term) -> Self {
        Self {
            relation: relation.into(),
            arg,
        }
    }

    pub fn is_concrete(&self) -> bool {
        self.arg.is_concrete()
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.relation, self.arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nat_builders_round_trip() {
        assert_eq!(Term::nat(0), Term::zero());
        assert_eq!(Term::nat(3).as_nat(), Some(3));
        assert_eq!(Term::suc(Term::var("n", Sort::Nat)).as_nat(), None);
    }

    #[test]
    fn concreteness() {
        let concrete = Term::tuple(vec![Term::nat(1), Term::bool(false)]);
        assert!(concrete.is_concrete());

        let symbolic = Term::tuple(vec![Term::nat(1), Term::var("x", Sort::Bool)]);
        assert!(!symbolic.is_concrete());

        let app = Term::Application("plus".to_string(), vec![Term::nat(1)], Sort::Nat);
        assert!(!app.is_concrete());
    }

    #[test]
    fn tuple_sort_is_derived_from_items() {
        let term = Term::tuple(vec![Term::nat(1), Term::bool(true)]);
        assert_eq!(
            term.sort(),
            &Sort::Tuple(TupleOrdering::Lexicographic, vec![Sort::Nat, Sort::Bool])
        );
    }

    #[test]
    fn display_renders_nats_and_tuples() {
        let prop = Proposition::new("add", Term::tuple(vec![Term::nat(0), Term::nat(2)]));
        assert_eq!(prop.to_string(), "add(⟨0, 2⟩)");
    }

    #[test]
    fn terms_serialize_round_trip() {
        let term = Term::tuple(vec![Term::nat(2), Term::var("x", Sort::Bool)]);
        let json = serde_json::to_string(&term).unwrap();
        let back: Term = serde_json::from_str(&json).unwrap();
        assert_eq!(term, back);
    }
}
