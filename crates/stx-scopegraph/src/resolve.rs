//! Name resolution.
//!
//! Resolution follows the usual scope-graph algorithm: the label regular
//! expression restricts which paths are well formed, the label order decides
//! which answers shadow which, and a data well-formedness predicate selects
//! the data a path may end in.
//!
//! ## Completeness
//!
//! Before an edge (or the data) of a scope is read, the completeness oracle
//! is asked whether that edge can still be extended. If it can, resolution
//! stops with [`ResolutionError::Incomplete`] naming the critical edge, so a
//! query is never answered while the graph could still grow along a path the
//! query would take.
//!
//! ## Shadowing
//!
//! For a set of allowed labels `L`, every maximal label `l` (one that is not
//! preferred over any other label in `L`) is resolved after the labels that
//! are preferred over it. When the data equivalence is "always", any answer
//! from a preferred label shadows all answers through `l`, and `l` is not
//! explored at all. Otherwise the answers are combined.

use crate::graph::ScopeGraph;
use crate::label::{EdgeOrData, Label, LabelOrder, LabelRegex};
use stx_common::limits;
use stx_terms::{Scope, Term, TermVar};
use thiserror::Error;
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The edge may still be extended; the query must wait for it.
    #[error("edge {edge} of scope {scope} is incomplete")]
    Incomplete { scope: Scope, edge: EdgeOrData },
    /// Data well-formedness cannot be decided until these are instantiated.
    #[error("data well-formedness is undecided")]
    DataUndecided { vars: Vec<TermVar> },
    #[error("resolution path exceeds {0} steps")]
    DepthExceeded(u32),
}

/// Answers whether an edge of a scope may still be extended.
pub trait CompletenessOracle {
    fn is_complete(&self, scope: Scope, edge: &EdgeOrData) -> bool;
}

impl<F> CompletenessOracle for F
where
    F: Fn(Scope, &EdgeOrData) -> bool,
{
    fn is_complete(&self, scope: Scope, edge: &EdgeOrData) -> bool {
        self(scope, edge)
    }
}

/// A resolved datum and the path that reached it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer {
    /// Scopes along the path, starting at the query scope.
    pub scopes: Vec<Scope>,
    /// Labels of the traversed edges; one fewer than `scopes`.
    pub labels: Vec<Label>,
    pub datum: Term,
}

#[derive(Clone, Debug)]
struct Path {
    scopes: Vec<Scope>,
    labels: Vec<Label>,
}

impl Path {
    fn target(&self) -> Scope {
        self.scopes[self.scopes.len() - 1]
    }

    fn step(&self, label: &Label, target: Scope) -> Option<Path> {
        if self.scopes.contains(&target) {
            return None;
        }
        let mut next = self.clone();
        next.labels.push(label.clone());
        next.scopes.push(target);
        Some(next)
    }
}

pub struct NameResolution<'a> {
    graph: &'a ScopeGraph,
    labels: &'a [Label],
    label_wf: &'a LabelRegex,
    label_order: &'a LabelOrder,
    data_wf: &'a dyn Fn(&Term) -> Result<bool, ResolutionError>,
    data_equiv_always: bool,
    oracle: &'a dyn CompletenessOracle,
}

impl<'a> NameResolution<'a> {
    /// `labels` is the full label alphabet of the specification, not just
    /// the labels currently present in the graph.
    pub fn new(
        graph: &'a ScopeGraph,
        labels: &'a [Label],
        label_wf: &'a LabelRegex,
        label_order: &'a LabelOrder,
        data_wf: &'a dyn Fn(&Term) -> Result<bool, ResolutionError>,
        data_equiv_always: bool,
        oracle: &'a dyn CompletenessOracle,
    ) -> Self {
        Self {
            graph,
            labels,
            label_wf,
            label_order,
            data_wf,
            data_equiv_always,
            oracle,
        }
    }

    pub fn resolve(&self, scope: Scope) -> Result<Vec<Answer>, ResolutionError> {
        let path = Path {
            scopes: vec![scope],
            labels: Vec::new(),
        };
        let answers = self.resolve_path(&path, self.label_wf)?;
        trace!(scope = %scope, answers = answers.len(), "resolved");
        Ok(answers)
    }

    fn resolve_path(&self, path: &Path, re: &LabelRegex) -> Result<Vec<Answer>, ResolutionError> {
        if path.labels.len() as u32 >= limits::MAX_RESOLUTION_DEPTH {
            return Err(ResolutionError::DepthExceeded(limits::MAX_RESOLUTION_DEPTH));
        }
        let mut allowed = Vec::new();
        if re.is_nullable() {
            allowed.push(EdgeOrData::Data);
        }
        for label in self.labels {
            if re.can_step(label) {
                allowed.push(EdgeOrData::Edge(label.clone()));
            }
        }
        self.resolve_all(path, re, &allowed)
    }

    fn resolve_all(
        &self,
        path: &Path,
        re: &LabelRegex,
        allowed: &[EdgeOrData],
    ) -> Result<Vec<Answer>, ResolutionError> {
        let mut answers = Vec::new();
        let maximal = allowed
            .iter()
            .filter(|l| !allowed.iter().any(|other| self.label_order.lt(l, other)));
        for label in maximal {
            let preferred: Vec<EdgeOrData> = allowed
                .iter()
                .filter(|other| self.label_order.lt(other, label))
                .cloned()
                .collect();
            let shadowing = self.resolve_all(path, re, &preferred)?;
            let shadowed = if self.data_equiv_always && !shadowing.is_empty() {
                Vec::new()
            } else {
                self.resolve_label(path, re, label)?
            };
            for answer in shadowing.into_iter().chain(shadowed) {
                if !answers.contains(&answer) {
                    answers.push(answer);
                }
            }
        }
        Ok(answers)
    }

    fn resolve_label(
        &self,
        path: &Path,
        re: &LabelRegex,
        label: &EdgeOrData,
    ) -> Result<Vec<Answer>, ResolutionError> {
        let scope = path.target();
        if !self.oracle.is_complete(scope, label) {
            trace!(scope = %scope, edge = %label, "incomplete");
            return Err(ResolutionError::Incomplete {
                scope,
                edge: label.clone(),
            });
        }
        match label {
            EdgeOrData::Data => {
                let mut answers = Vec::new();
                for datum in self.graph.data(scope) {
                    if (self.data_wf)(datum)? {
                        answers.push(Answer {
                            scopes: path.scopes.clone(),
                            labels: path.labels.clone(),
                            datum: datum.clone(),
                        });
                    }
                }
                Ok(answers)
            }
            EdgeOrData::Edge(l) => {
                let next_re = re.derive(l);
                let mut answers = Vec::new();
                for target in self.graph.edges(scope, l) {
                    if let Some(next) = path.step(l, target) {
                        answers.extend(self.resolve_path(&next, &next_re)?);
                    }
                }
                Ok(answers)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/resolve_tests.rs"]
mod tests;
