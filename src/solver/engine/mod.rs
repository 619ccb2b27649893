//! The semi-naive fixpoint loop.
//!
//! The engine drains a priority-ordered worklist of patches until either
//! the queue is empty (a true least fixpoint relative to the supplied
//! axioms and rules) or a gas budget runs out, which is a bounded-effort
//! contract rather than an error.
//!
//! Learning a conclusion inserts the fact into the database (unless it is
//! subsumed) and tries every registered partial rule against it; learning
//! an apply-patch registers the partial rule and tries it against every
//! fact already in the database. Both directions emit child patches, so a
//! rule's premises are discharged incrementally, one unification per
//! patch, rather than by re-joining whole relations each round.

use std::collections::BTreeMap;

use log::{debug, log_enabled, trace, Level};

use crate::{
    ir::{
        validate::validate_module, ConfigError, Module, Name, Proposition, Quantifier, Rule,
        Variable,
    },
    solver::{
        db::Database,
        debug::dump_database,
        error::SolverError,
        eval::Evaluator,
        metrics::FixpointMetrics,
        normalize::{freshen, normalize},
        queue::{trivial_patch_order, Patch, PatchComparator, PartialRule, Queue},
        unify::{unify_props, Substitution},
    },
};

/// The result of a saturation run: the final database together with the
/// loop's counters.
#[derive(Clone, Debug)]
pub struct Saturation {
    pub database: Database,
    pub metrics: FixpointMetrics,
}

/// The generic interface for a saturation engine.
pub trait Engine {
    /// Runs one fixpoint to completion (or gas exhaustion) against a
    /// read-only module, returning the final database and counters.
    ///
    /// # Returns
    /// - `Ok(saturation)` on a drained queue or an exhausted budget.
    /// - `Err(SolverError)` on a rejected module or an engine invariant
    ///   violation.
    fn generate(
        &self,
        module: &Module,
        spec_name: &str,
        initial_props: Vec<Proposition>,
        gas: u64,
    ) -> Result<Saturation, SolverError>;
}

/// The worklist-driven engine. The patch comparator may be any total
/// preorder; it only affects performance and intermediate queue size.
pub struct WorklistEngine {
    compare: PatchComparator,
}

impl WorklistEngine {
    pub fn new(compare: PatchComparator) -> Self {
        Self { compare }
    }
}

impl Default for WorklistEngine {
    fn default() -> Self {
        Self::new(trivial_patch_order)
    }
}

impl Engine for WorklistEngine {
    fn generate(
        &self,
        module: &Module,
        spec_name: &str,
        initial_props: Vec<Proposition>,
        gas: u64,
    ) -> Result<Saturation, SolverError> {
        validate_module(module)?;
        let mut env = FixpointEnv::seed(module, spec_name, initial_props, gas, self.compare)?;
        env.run()?;
        Ok(env.finish())
    }
}

/// The mutable state owned by one saturation run.
struct FixpointEnv<'m> {
    module: &'m Module,
    gas: u64,
    database: Database,
    rules: BTreeMap<Name, PartialRule>,
    queue: Queue,
    fresh_binders: usize,
    metrics: FixpointMetrics,
}

impl<'m> FixpointEnv<'m> {
    /// Seeds the run: rules of the selected fixpoint spec enter the queue
    /// as apply-patches (registration happens when they are learned,
    /// which also scans the database once), the initial propositions go
    /// straight into the database, and one conclusion patch is enqueued
    /// per initial proposition and per selected axiom.
    fn seed(
        module: &'m Module,
        spec_name: &str,
        initial_props: Vec<Proposition>,
        gas: u64,
        compare: PatchComparator,
    ) -> Result<Self, SolverError> {
        let spec = module
            .fixpoints
            .get(spec_name)
            .ok_or_else(|| ConfigError::UnknownSpec(spec_name.to_string()))?;

        let mut env = Self {
            module,
            gas,
            database: Database::default(),
            rules: BTreeMap::new(),
            queue: Queue::new(compare),
            fresh_binders: 0,
            metrics: FixpointMetrics::default(),
        };

        let mut seeds = Vec::new();
        for rule_name in &spec.rules {
            let rule = module
                .rules
                .get(rule_name)
                .ok_or_else(|| ConfigError::UnknownRule {
                    rule: rule_name.clone(),
                    spec: spec_name.to_string(),
                })?;
            let rule = normalize(&freshen(rule, &mut env.fresh_binders));
            seeds.push(Patch::Apply(PartialRule {
                name: rule_name.clone(),
                rule,
            }));
        }

        for prop in &initial_props {
            env.database.insert(prop.clone())?;
        }
        for prop in initial_props {
            seeds.push(Patch::Conclusion(prop));
        }
        for axiom_name in &spec.axioms {
            let prop = module
                .axioms
                .get(axiom_name)
                .ok_or_else(|| ConfigError::UnknownAxiom {
                    axiom: axiom_name.clone(),
                    spec: spec_name.to_string(),
                })?;
            seeds.push(Patch::Conclusion(prop.clone()));
        }

        debug!(
            "seeded fixpoint '{}' with {} patches ({} rules, {} facts pre-inserted)",
            spec_name,
            seeds.len(),
            spec.rules.len(),
            env.database.len()
        );
        env.queue.insert_batch(seeds);
        Ok(env)
    }

    /// The saturation loop: pop, learn, enqueue children, until the queue
    /// drains or the gas budget is spent.
    fn run(&mut self) -> Result<(), SolverError> {
        while self.gas > 0 {
            let Some(patch) = self.queue.pop(&self.database)? else {
                debug!(
                    "queue drained after {} iterations; fixpoint reached",
                    self.metrics.iterations
                );
                break;
            };
            self.gas -= 1;
            self.metrics.iterations += 1;
            trace!("iteration {}: {}", self.metrics.iterations, patch);

            let children = self.learn(patch)?;
            if !children.is_empty() {
                self.queue.insert_batch(children);
            }
        }
        if self.gas == 0 {
            debug!(
                "gas exhausted after {} iterations with {} patches still queued",
                self.metrics.iterations,
                self.queue.len()
            );
        }
        if log_enabled!(Level::Trace) {
            trace!("final database:\n{}", dump_database(&self.database));
        }
        Ok(())
    }

    fn finish(mut self) -> Saturation {
        self.metrics.patches_subsumed = self.queue.discarded();
        self.metrics.gas_remaining = self.gas;
        Saturation {
            database: self.database,
            metrics: self.metrics,
        }
    }

    fn learn(&mut self, patch: Patch) -> Result<Vec<Patch>, SolverError> {
        match patch {
            Patch::Conclusion(prop) => self.learn_conclusion(prop),
            Patch::Apply(partial) => self.learn_apply(partial),
        }
    }

    /// Inserts a derived fact; when it is news, every registered partial
    /// rule gets a chance to consume it.
    fn learn_conclusion(&mut self, prop: Proposition) -> Result<Vec<Patch>, SolverError> {
        let prop = Evaluator::new(self.module).evaluate_proposition(&prop)?;

        let before = self.database.len();
        if !self.database.insert(prop.clone())? {
            self.metrics.facts_subsumed += 1;
            return Ok(vec![]);
        }
        self.metrics.facts_inserted += 1;
        self.metrics.facts_evicted += (before + 1 - self.database.len()) as u64;
        debug!("learned {}", prop);

        let mut children = Vec::new();
        for partial in self.rules.values() {
            children.extend(apply_rule(self.module, partial, &prop)?);
        }
        Ok(children)
    }

    /// Registers a (partial) rule so future facts are tried against it,
    /// then tries it against every fact already in the database.
    fn learn_apply(&mut self, partial: PartialRule) -> Result<Vec<Patch>, SolverError> {
        let key = self.fresh_rule_key(&partial.name);
        let partial = PartialRule {
            name: key.clone(),
            rule: partial.rule,
        };
        debug!("registering rule '{}'", key);

        let mut children = Vec::new();
        for prop in self.database.candidates() {
            children.extend(apply_rule(self.module, &partial, prop)?);
        }
        self.rules.insert(key, partial);
        self.metrics.rules_registered += 1;
        Ok(children)
    }

    /// Registry keys must be unique even though residual partial rules
    /// share their origin's name.
    fn fresh_rule_key(&self, base: &str) -> Name {
        if !self.rules.contains_key(base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}#{}", base, n);
            if !self.rules.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Walks a rule's outer clauses until its first premise, unifies that
/// premise against `prop`, and runs the residual walk on the remainder.
/// A no-match produces no patches; a rule whose head is a bare filter or
/// conclusion has no premise to consume and is malformed.
fn apply_rule(
    module: &Module,
    partial: &PartialRule,
    prop: &Proposition,
) -> Result<Vec<Patch>, SolverError> {
    let evaluator = Evaluator::new(module);
    let mut binders: Vec<Variable> = Vec::new();
    let mut current = partial.rule.clone();
    loop {
        match current {
            Rule::Quantify(Quantifier::Universal(v), rest) => {
                binders.push(v);
                current = *rest;
            }
            Rule::Let(name, term, rest) => {
                let value = evaluator.evaluate_term(&term)?;
                current = Substitution::single(name, value).apply_rule(&rest);
            }
            Rule::Premise(premise, rest) => {
                return match unify_props(module, &premise, prop)? {
                    None => Ok(vec![]),
                    Some(subst) => {
                        let rest = subst.apply_rule(&rest);
                        residual_walk(module, &partial.name, binders, &subst, rest)
                    }
                };
            }
            Rule::Filter(_, _) => {
                return Err(SolverError::MalformedRule(format!(
                    "rule '{}' reaches a filter before consuming a premise",
                    partial.name
                )));
            }
            Rule::Conclude(_) => {
                return Err(SolverError::MalformedRule(format!(
                    "rule '{}' concludes without consuming a premise",
                    partial.name
                )));
            }
        }
    }
}

/// Processes the body after the first premise was consumed: lets bind,
/// filters gate, a further premise defers the rest as a residual
/// apply-patch, and a conclusion, which must be concrete by now, fires.
fn residual_walk(
    module: &Module,
    origin: &str,
    binders: Vec<Variable>,
    subst: &Substitution,
    rule: Rule,
) -> Result<Vec<Patch>, SolverError> {
    let evaluator = Evaluator::new(module);
    let mut binders: Vec<Variable> = binders
        .into_iter()
        .filter(|v| !subst.binds(&v.name))
        .collect();
    let mut current = rule;
    loop {
        match current {
            Rule::Quantify(Quantifier::Universal(v), rest) => {
                binders.push(v);
                current = *rest;
            }
            Rule::Let(name, term, rest) => {
                let value = evaluator.evaluate_term(&term)?;
                current = Substitution::single(name, value).apply_rule(&rest);
            }
            Rule::Filter(cond, rest) => {
                let cond = evaluator.evaluate_term(&cond)?;
                match cond.as_bool() {
                    Some(true) => current = *rest,
                    Some(false) => {
                        trace!("filter rejected an instantiation of rule '{}'", origin);
                        return Ok(vec![]);
                    }
                    None => {
                        return Err(SolverError::MalformedRule(format!(
                            "filter in rule '{}' did not reduce to a boolean: {}",
                            origin, cond
                        )))
                    }
                }
            }
            Rule::Premise(_, _) => {
                // Defer matching the next premise to later iterations,
                // re-wrapping the binders that are still free in the body.
                let free = current.free_vars();
                let residual = binders
                    .into_iter()
                    .filter(|v| free.contains(&v.name))
                    .rev()
                    .fold(current, |acc, v| {
                        Rule::Quantify(Quantifier::Universal(v), Box::new(acc))
                    });
                trace!("rule '{}' deferred on its next premise", origin);
                return Ok(vec![Patch::Apply(PartialRule {
                    name: origin.to_string(),
                    rule: residual,
                })]);
            }
            Rule::Conclude(prop) => {
                let prop = evaluator.evaluate_proposition(&prop)?;
                trace!("rule '{}' fired: {}", origin, prop);
                return Ok(vec![Patch::Conclusion(prop)]);
            }
        }
    }
}
