use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::ir::{ConfigError, Name, Proposition, Rule, Sort, Term};

/// A built-in function implementation supplied by the host. It is only
/// ever invoked on fully concrete arguments matching the declared
/// parameter sorts, must be pure and terminating, and must not re-enter
/// the engine.
pub type NativeFn = Arc<dyn Fn(&[Term]) -> Term + Send + Sync>;

/// A declared built-in function: parameter sorts, return sort, and the
/// host-supplied implementation.
#[derive(Clone)]
pub struct Function {
    pub params: Vec<Sort>,
    pub ret: Sort,
    pub body: NativeFn,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The implementation is an opaque closure; print the signature.
        write!(f, "Function(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// A named selection of axioms and rules identifying which subset of the
/// module participates in a `generate` call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixpointSpec {
    pub axioms: Vec<Name>,
    pub rules: Vec<Name>,
}

/// A fully elaborated module: the read-only context a `generate` call
/// runs against. Surface syntax, name resolution, and loading are a
/// host's concern; the engine only validates and evaluates.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub relations: HashMap<Name, Sort>,
    pub functions: HashMap<Name, Function>,
    pub rules: HashMap<Name, Rule>,
    pub axioms: HashMap<Name, Proposition>,
    pub fixpoints: HashMap<Name, FixpointSpec>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_relation(&mut self, name: impl Into<Name>, sort: Sort) {
        self.relations.insert(name.into(), sort);
    }

    pub fn insert_function(
        &mut self,
        name: impl Into<Name>,
        params: Vec<Sort>,
        ret: Sort,
        body: impl Fn(&[Term]) -> Term + Send + Sync + 'static,
    ) {
        self.functions.insert(
            name.into(),
            Function {
                params,
                ret,
                body: Arc::new(body),
            },
        );
    }

    pub fn insert_rule(&mut self, name: impl Into<Name>, rule: Rule) {
        self.rules.insert(name.into(), rule);
    }

    pub fn insert_axiom(&mut self, name: impl Into<Name>, prop: Proposition) {
        self.axioms.insert(name.into(), prop);
    }

    pub fn insert_fixpoint(&mut self, name: impl Into<Name>, spec: FixpointSpec) {
        self.fixpoints.insert(name.into(), spec);
    }

    /// Expands `Sort::Predicate` aliases into structural sorts, detecting
    /// unknown relations and alias cycles.
    pub fn resolve_sort(&self, sort: &Sort) -> Result<Sort, ConfigError> {
        let mut visited = HashSet::new();
        self.resolve_sort_inner(sort, &mut visited)
    }

    fn resolve_sort_inner(
        &self,
        sort: &Sort,
        visited: &mut HashSet<Name>,
    ) -> Result<Sort, ConfigError> {
        match sort {
            Sort::Predicate(name) => {
                if !visited.insert(name.clone()) {
                    return Err(ConfigError::SortAliasCycle(name.clone()));
                }
                let target = self
                    .relations
                    .get(name)
                    .ok_or_else(|| ConfigError::UnknownRelation(name.clone()))?;
                self.resolve_sort_inner(target, visited)
            }
            Sort::Tuple(ordering, components) => {
                let components = components
                    .iter()
                    .map(|c| self.resolve_sort_inner(c, visited))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Sort::Tuple(*ordering, components))
            }
            other => Ok(other.clone()),
        }
    }
}
