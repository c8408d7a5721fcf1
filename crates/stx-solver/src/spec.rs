//! Specifications.
//!
//! A specification is a set of predicate rules plus the label alphabet of
//! the scope graph. Rules of one predicate are kept in declaration order,
//! which is the order in which relaxed rule application branches.
//!
//! Two facts are derived once, when the specification is built:
//!
//! - **Scope extensions**: for every predicate parameter, the edges (and
//!   data) that a call may add to the scope passed in that position. This is
//!   a fixpoint over the rules because predicates pass scopes on to other
//!   predicates. The completeness index uses it to know which edges a
//!   pending call may still extend.
//! - **Always-equivalence**: whether a binary relation used as data
//!   equivalence holds for all arguments, see [`Spec::is_always`].

use crate::constraint::Constraint;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use stx_common::limits;
use stx_scopegraph::{EdgeOrData, Label};
use stx_terms::{Term, TermVar};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub name: Arc<str>,
    pub params: Vec<Term>,
    #[serde(default = "Constraint::truth")]
    pub body: Constraint,
}

impl Rule {
    pub fn new(name: impl AsRef<str>, params: impl IntoIterator<Item = Term>, body: Constraint) -> Self {
        Rule {
            name: Arc::from(name.as_ref()),
            params: params.into_iter().collect(),
            body,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Variables of the head, in order of first occurrence.
    pub fn head_vars(&self) -> Vec<TermVar> {
        Term::tuple(self.params.iter().cloned()).vars()
    }

    /// Whether the rule holds for any arguments: distinct variable
    /// parameters and an empty body.
    pub fn is_catch_all(&self) -> bool {
        let vars = self.head_vars();
        vars.len() == self.params.len()
            && self.params.iter().all(Term::is_var)
            && self.body == Constraint::truth()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") :- {}.", self.body)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("rule for `{rule}` uses unbound variable {var}")]
    UnboundVariable { rule: String, var: TermVar },
    #[error("rule for `{rule}` calls undefined predicate `{callee}`")]
    UndefinedPredicate { rule: String, callee: String },
    #[error("predicate `{name}` used with arity {found}, expected {expected}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Serialized form of a [`Spec`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpecDef {
    #[serde(default)]
    pub labels: Vec<Label>,
    pub rules: Vec<Rule>,
}

type Extensions = Vec<SmallVec<[EdgeOrData; 2]>>;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(try_from = "SpecDef")]
pub struct Spec {
    rules: IndexMap<Arc<str>, Vec<Arc<Rule>>>,
    labels: Vec<Label>,
    extensions: FxHashMap<Arc<str>, Extensions>,
}

impl Spec {
    /// Builds and validates a specification.
    ///
    /// `labels` are added to the labels mentioned by the rules.
    pub fn new(
        labels: impl IntoIterator<Item = Label>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Result<Spec, SpecError> {
        let mut spec = Spec::default();
        for label in labels {
            spec.add_label(label);
        }
        for rule in rules {
            if let Some(expected) = spec.arity(&rule.name) {
                if expected != rule.arity() {
                    return Err(SpecError::ArityMismatch {
                        name: rule.name.to_string(),
                        expected,
                        found: rule.arity(),
                    });
                }
            }
            for label in rule.body.labels() {
                spec.add_label(label);
            }
            spec.rules
                .entry(rule.name.clone())
                .or_default()
                .push(Arc::new(rule));
        }
        spec.validate()?;
        spec.extensions = spec.compute_extensions();
        debug!(
            predicates = spec.rules.len(),
            labels = spec.labels.len(),
            "specification loaded"
        );
        Ok(spec)
    }

    fn add_label(&mut self, label: Label) {
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    fn validate(&self) -> Result<(), SpecError> {
        for rule in self.rules.values().flatten() {
            let head = rule.head_vars();
            if let Some(var) = rule.body.free_vars().into_iter().find(|v| !head.contains(v)) {
                return Err(SpecError::UnboundVariable {
                    rule: rule.name.to_string(),
                    var,
                });
            }
            self.check_calls(&rule.name, &rule.body)?;
        }
        Ok(())
    }

    /// Checks that every predicate called by `constraint` exists with the
    /// right arity. `context` names the caller in errors.
    pub fn check_calls(&self, context: &str, constraint: &Constraint) -> Result<(), SpecError> {
        for (callee, found) in constraint.calls() {
            match self.arity(callee) {
                None => {
                    return Err(SpecError::UndefinedPredicate {
                        rule: context.to_string(),
                        callee: callee.to_string(),
                    });
                }
                Some(expected) if expected != found => {
                    return Err(SpecError::ArityMismatch {
                        name: callee.to_string(),
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn compute_extensions(&self) -> FxHashMap<Arc<str>, Extensions> {
        let mut extensions: FxHashMap<Arc<str>, Extensions> = self
            .rules
            .iter()
            .map(|(name, rules)| {
                let arity = rules.first().map_or(0, |r| r.arity());
                (name.clone(), vec![SmallVec::new(); arity])
            })
            .collect();
        for _ in 0..limits::MAX_EXTENSION_ITERATIONS {
            let mut additions = Vec::new();
            for (name, rules) in &self.rules {
                for rule in rules {
                    for (index, param) in rule.params.iter().enumerate() {
                        let Term::Var(var) = param else { continue };
                        let mut found = Vec::new();
                        body_extensions(&rule.body, var, &extensions, &mut found);
                        for edge in found {
                            if !extensions[name][index].contains(&edge) {
                                additions.push((name.clone(), index, edge));
                            }
                        }
                    }
                }
            }
            if additions.is_empty() {
                return extensions;
            }
            for (name, index, edge) in additions {
                if let Some(params) = extensions.get_mut(&name) {
                    if !params[index].contains(&edge) {
                        params[index].push(edge);
                    }
                }
            }
        }
        warn!(
            limit = limits::MAX_EXTENSION_ITERATIONS,
            "scope extension analysis did not converge"
        );
        extensions
    }

    /// Rules of `name` in declaration order; empty if there are none.
    pub fn rules(&self, name: &str) -> &[Arc<Rule>] {
        self.rules.get(name).map_or(&[][..], Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn arity(&self, name: &str) -> Option<usize> {
        self.rules.get(name).and_then(|rules| rules.first()).map(|r| r.arity())
    }

    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|name| &**name)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// The label alphabet of the scope graph.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Edges a call of `name` may add to the scope passed as argument `index`.
    pub fn extensions(&self, name: &str, index: usize) -> &[EdgeOrData] {
        self.extensions
            .get(name)
            .and_then(|params| params.get(index))
            .map_or(&[][..], |edges| edges.as_slice())
    }

    /// Whether the relation `name` holds for all arguments.
    ///
    /// `Some(true)` for a single catch-all rule, `Some(false)` for a
    /// relation without rules, `None` when this cannot be decided without
    /// evaluating the rules.
    pub fn is_always(&self, name: &str) -> Option<bool> {
        match self.rules(name) {
            [] => Some(false),
            [rule] if rule.is_catch_all() => Some(true),
            _ => None,
        }
    }
}

fn body_extensions(
    constraint: &Constraint,
    var: &TermVar,
    extensions: &FxHashMap<Arc<str>, Extensions>,
    out: &mut Vec<EdgeOrData>,
) {
    let is_var = |term: &Term| term.as_var() == Some(var);
    match constraint {
        Constraint::TellEdge { source, label, .. } if is_var(source) => {
            out.push(EdgeOrData::Edge(label.clone()));
        }
        Constraint::TellRel { scope, .. } if is_var(scope) => out.push(EdgeOrData::Data),
        Constraint::User { name, args } => {
            for (index, arg) in args.iter().enumerate() {
                if is_var(arg) {
                    let edges = extensions
                        .get(name)
                        .and_then(|params| params.get(index))
                        .map_or(&[][..], |edges| edges.as_slice());
                    out.extend(edges.iter().cloned());
                }
            }
        }
        Constraint::Conj(cs) => {
            for c in cs {
                body_extensions(c, var, extensions, out);
            }
        }
        Constraint::Exists { vars, body } if !vars.contains(var) => {
            body_extensions(body, var, extensions, out);
        }
        Constraint::TellEdge { .. }
        | Constraint::TellRel { .. }
        | Constraint::Exists { .. }
        | Constraint::ResolveQuery { .. }
        | Constraint::Equal(..)
        | Constraint::Inequal(..)
        | Constraint::NewScope { .. } => {}
    }
}

impl TryFrom<SpecDef> for Spec {
    type Error = SpecError;

    fn try_from(def: SpecDef) -> Result<Self, Self::Error> {
        Spec::new(def.labels, def.rules)
    }
}

#[cfg(test)]
#[path = "../tests/spec_tests.rs"]
mod tests;
