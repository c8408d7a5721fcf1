//! Placeholders and the variables that stand in for them.
//!
//! An incomplete program contains placeholders: holes the user has not
//! filled in yet. Before solving, every placeholder is replaced by a fresh
//! logic variable, recorded in a [`PlaceholderVarMap`]. Proposals computed
//! for those variables are mapped back with
//! [`replace_variables_by_placeholders`] before they are shown.
//!
//! Which terms count as placeholders, injections and literals is decided by
//! a [`PlaceholderPolicy`]. [`ConventionPolicy`] recognises them by operator
//! names; [`ExplicitPolicy`] takes the operator sets from configuration.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use stx_terms::{Term, TermVar};

/// Operator of the placeholder used when no better one is known.
pub const DEFAULT_PLACEHOLDER_OP: &str = "??-Plhdr";

/// Decides the syntactic role of terms during completion.
pub trait PlaceholderPolicy: fmt::Debug {
    /// Whether `term` is a hole in the program.
    fn is_placeholder(&self, term: &Term) -> bool;

    /// Whether `term` is an injection: a single-argument constructor that
    /// only wraps its argument.
    fn is_injection(&self, term: &Term) -> bool;

    /// Whether `term` may be inserted verbatim when completion finds no
    /// candidate for a hole.
    fn is_literal(&self, term: &Term) -> bool;

    fn default_placeholder(&self) -> Term {
        Term::appl(DEFAULT_PLACEHOLDER_OP, [])
    }
}

/// Recognises roles by operator naming conventions.
///
/// - placeholders are constants whose operator ends in `-Plhdr`
/// - injections are single-argument applications whose operator contains `2`
///   (`Exp2Term`)
/// - literals are strings and applications whose operator contains `-LEX2`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConventionPolicy;

impl PlaceholderPolicy for ConventionPolicy {
    fn is_placeholder(&self, term: &Term) -> bool {
        term.arity() == 0 && term.op().is_some_and(|op| op.ends_with("-Plhdr"))
    }

    fn is_injection(&self, term: &Term) -> bool {
        term.arity() == 1 && term.op().is_some_and(|op| op.contains('2'))
    }

    fn is_literal(&self, term: &Term) -> bool {
        matches!(term, Term::Str(_)) || term.op().is_some_and(|op| op.contains("-LEX2"))
    }
}

/// Roles given by explicit operator sets.
///
/// Strings and integers are always literals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitPolicy {
    #[serde(default)]
    pub placeholders: FxHashSet<String>,
    #[serde(default)]
    pub injections: FxHashSet<String>,
    #[serde(default)]
    pub literals: FxHashSet<String>,
}

impl ExplicitPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, op: impl Into<String>) -> Self {
        self.placeholders.insert(op.into());
        self
    }

    pub fn with_injection(mut self, op: impl Into<String>) -> Self {
        self.injections.insert(op.into());
        self
    }

    pub fn with_literal(mut self, op: impl Into<String>) -> Self {
        self.literals.insert(op.into());
        self
    }
}

impl PlaceholderPolicy for ExplicitPolicy {
    fn is_placeholder(&self, term: &Term) -> bool {
        term.arity() == 0 && term.op().is_some_and(|op| self.placeholders.contains(op))
    }

    fn is_injection(&self, term: &Term) -> bool {
        term.arity() == 1 && term.op().is_some_and(|op| self.injections.contains(op))
    }

    fn is_literal(&self, term: &Term) -> bool {
        term.is_literal() || term.op().is_some_and(|op| self.literals.contains(op))
    }

    /// The first placeholder operator in name order, so that generated holes
    /// are recognised by this policy.
    fn default_placeholder(&self) -> Term {
        let op = self.placeholders.iter().min().map_or(DEFAULT_PLACEHOLDER_OP, String::as_str);
        Term::appl(op, [])
    }
}

/// Variables introduced for placeholders, in order of introduction.
///
/// The map only grows; a variable keeps its placeholder for the whole
/// completion request. Every occurrence of a placeholder gets its own
/// variable, so looking up a placeholder yields all of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderVarMap {
    prefix: String,
    placeholders: IndexMap<TermVar, Term>,
    vars: IndexMap<Term, Vec<TermVar>>,
}

impl Default for PlaceholderVarMap {
    fn default() -> Self {
        Self::new("plhdr")
    }
}

impl PlaceholderVarMap {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            placeholders: IndexMap::new(),
            vars: IndexMap::new(),
        }
    }

    /// A fresh variable for one occurrence of `placeholder`.
    pub fn add_placeholder(&mut self, placeholder: Term) -> TermVar {
        let var = TermVar::new(format!("{}{}", self.prefix, self.placeholders.len()));
        self.vars.entry(placeholder.clone()).or_default().push(var.clone());
        self.placeholders.insert(var.clone(), placeholder);
        var
    }

    pub fn placeholder(&self, var: &TermVar) -> Option<&Term> {
        self.placeholders.get(var)
    }

    /// Variables introduced for `placeholder`, oldest first.
    pub fn vars_of(&self, placeholder: &Term) -> &[TermVar] {
        self.vars.get(placeholder).map_or(&[][..], Vec::as_slice)
    }

    pub fn vars(&self) -> impl Iterator<Item = &TermVar> {
        self.placeholders.keys()
    }

    pub fn len(&self) -> usize {
        self.placeholders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }
}

/// Replaces every placeholder in `term` by a fresh variable.
pub fn replace_placeholders_by_variables(
    term: &Term,
    map: &mut PlaceholderVarMap,
    policy: &dyn PlaceholderPolicy,
) -> Term {
    if policy.is_placeholder(term) {
        return Term::Var(map.add_placeholder(term.clone()));
    }
    match term {
        Term::Appl { op, args } => Term::Appl {
            op: op.clone(),
            args: args
                .iter()
                .map(|arg| replace_placeholders_by_variables(arg, map, policy))
                .collect(),
        },
        Term::List(items) => Term::List(
            items
                .iter()
                .map(|item| replace_placeholders_by_variables(item, map, policy))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Replaces the variables of a proposal by placeholders.
///
/// A chain of injections that ends in a variable is shown as a single
/// placeholder, since the injections carry no syntax of their own.
pub fn replace_variables_by_placeholders(
    term: &Term,
    map: &PlaceholderVarMap,
    policy: &dyn PlaceholderPolicy,
) -> Term {
    match term {
        Term::Var(var) => placeholder_for(var, map, policy),
        Term::Appl { op, args } => {
            if let Some(var) = injected_var(term, policy) {
                return placeholder_for(var, map, policy);
            }
            Term::Appl {
                op: op.clone(),
                args: args
                    .iter()
                    .map(|arg| replace_variables_by_placeholders(arg, map, policy))
                    .collect(),
            }
        }
        Term::List(items) => Term::List(
            items
                .iter()
                .map(|item| replace_variables_by_placeholders(item, map, policy))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn placeholder_for(var: &TermVar, map: &PlaceholderVarMap, policy: &dyn PlaceholderPolicy) -> Term {
    map.placeholder(var)
        .cloned()
        .unwrap_or_else(|| policy.default_placeholder())
}

/// The variable at the bottom of a non-empty chain of injections.
fn injected_var<'a>(term: &'a Term, policy: &dyn PlaceholderPolicy) -> Option<&'a TermVar> {
    let mut current = term;
    let mut depth = 0;
    while policy.is_injection(current) {
        let Some(inner) = current.args().first() else {
            break;
        };
        current = inner;
        depth += 1;
    }
    match current {
        Term::Var(var) if depth > 0 => Some(var),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/placeholder_tests.rs"]
mod tests;
