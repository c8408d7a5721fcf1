//! Rule application.
//!
//! Applying the rules of a predicate to a call renames the variables of
//! each rule to fresh variables of the store, unifies the renamed
//! parameters with the arguments in the store of the result, and produces
//! the renamed rule body.
//!
//! The parameters are bound before the body is handed out, so the critical
//! edges of the body are registered on the scopes the call was made with.

use crate::constraint::Constraint;
use crate::error::SolverError;
use crate::spec::{Rule, Spec};
use crate::store::Store;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use stx_terms::{MatchResult, Term, TermVar, UnifyError, match_term};
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ApplyMode {
    /// Expand only when exactly one rule applies, decided by matching
    /// without instantiating the arguments. Used by inference.
    Strict,
    /// Branch on every rule whose head unifies with the arguments. Used by
    /// completion.
    Relaxed,
}

/// A rule body produced for a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyResult {
    pub rule: Option<Arc<Rule>>,
    pub body: Constraint,
    pub store: Store,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Application {
    /// One result per applicable rule, in declaration order. Empty if no
    /// rule applies.
    Expanded(Vec<ApplyResult>),
    /// Strict application cannot decide until one of these is instantiated.
    Delayed(Vec<TermVar>),
}

fn rename(rule: &Rule, store: &mut Store) -> FxHashMap<TermVar, Term> {
    rule.head_vars()
        .into_iter()
        .map(|var| {
            let fresh = store.fresh_var(&var);
            (var, Term::Var(fresh))
        })
        .collect()
}

fn instantiate(rule: &Arc<Rule>, args: &[Term], store: &Store) -> Result<ApplyResult, UnifyError> {
    let mut store = store.clone();
    let subst = rename(rule, &mut store);
    let params: Vec<Term> = rule.params.iter().map(|p| p.substitute(&subst)).collect();
    let unifier = store.unifier().unify_all(params.iter().zip(args))?;
    store.set_unifier(unifier);
    Ok(ApplyResult {
        rule: Some(rule.clone()),
        body: rule.body.substitute(&subst),
        store,
    })
}

/// Applies the rules of `name` to `args`.
pub fn apply_rules(
    spec: &Spec,
    store: &Store,
    name: &str,
    args: &[Term],
    mode: ApplyMode,
) -> Result<Application, SolverError> {
    if !spec.contains(name) {
        return Err(SolverError::UnknownPredicate(name.to_string()));
    }
    let rules = spec.rules(name);
    let unifier = store.unifier();
    match mode {
        ApplyMode::Strict => {
            let actual = Term::tuple(args.iter().cloned());
            let mut possible: SmallVec<[(&Arc<Rule>, bool); 2]> = SmallVec::new();
            for rule in rules {
                let head = rule.head_vars();
                let bindable = |v: &TermVar| head.contains(v);
                let pattern = Term::tuple(rule.params.iter().cloned());
                match match_term(&pattern, &bindable, &actual, unifier) {
                    MatchResult::Yes(_) => possible.push((rule, true)),
                    MatchResult::Maybe(_) => possible.push((rule, false)),
                    MatchResult::No => {}
                }
            }
            match possible.as_slice() {
                [] => {
                    trace!(predicate = name, "no rule applies");
                    Ok(Application::Expanded(Vec::new()))
                }
                [(rule, true)] => match instantiate(rule, args, store) {
                    Ok(result) => Ok(Application::Expanded(vec![result])),
                    Err(err) => {
                        trace!(predicate = name, error = %err, "matched rule does not unify");
                        Ok(Application::Expanded(Vec::new()))
                    }
                },
                _ => Ok(Application::Delayed(unifier.free_vars(&actual))),
            }
        }
        ApplyMode::Relaxed => {
            let results: Vec<ApplyResult> = rules
                .iter()
                .filter_map(|rule| instantiate(rule, args, store).ok())
                .collect();
            trace!(predicate = name, branches = results.len(), "relaxed application");
            Ok(Application::Expanded(results))
        }
    }
}

#[cfg(test)]
#[path = "../tests/apply_tests.rs"]
mod tests;
