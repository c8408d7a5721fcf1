//! The completeness index.
//!
//! Every constraint that may still add an edge (or data) to a scope
//! registers a critical edge: the scope term paired with the edge it may
//! extend. The index counts registrations, so an edge is complete exactly
//! when no pending constraint registers it any more.
//!
//! Scope terms are stored unresolved. They are resolved through the unifier
//! when the index is queried; an entry whose term is still an unbound
//! variable does not block any scope.

use crate::constraint::Constraint;
use crate::spec::Spec;
use im::OrdMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use stx_scopegraph::EdgeOrData;
use stx_terms::{Scope, Term, Unifier};

/// A scope (or a term that will become one) and an edge it may gain.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CriticalEdge {
    pub scope: Term,
    pub edge: EdgeOrData,
}

impl CriticalEdge {
    pub fn new(scope: Term, edge: EdgeOrData) -> Self {
        Self { scope, edge }
    }

    /// Whether this entry designates `scope` under `unifier`.
    pub fn is_on(&self, scope: Scope, unifier: &Unifier) -> bool {
        unifier.find(&self.scope) == Term::Scope(scope)
    }
}

impl fmt::Display for CriticalEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.scope, self.edge)
    }
}

/// Critical edges registered by `constraint`.
///
/// Variables bound by an `Exists` register under their bound name. Such
/// entries never designate a scope, and they are replaced by entries for
/// the renamed variables when the existential is solved.
pub fn critical_edges(constraint: &Constraint, spec: &Spec) -> Vec<CriticalEdge> {
    let mut out = Vec::new();
    collect_critical_edges(constraint, spec, &mut out);
    out
}

fn collect_critical_edges(constraint: &Constraint, spec: &Spec, out: &mut Vec<CriticalEdge>) {
    match constraint {
        Constraint::TellEdge { source, label, .. } => {
            out.push(CriticalEdge::new(source.clone(), EdgeOrData::Edge(label.clone())));
        }
        Constraint::TellRel { scope, .. } => {
            out.push(CriticalEdge::new(scope.clone(), EdgeOrData::Data));
        }
        Constraint::User { name, args } => {
            for (index, arg) in args.iter().enumerate() {
                for edge in spec.extensions(name, index) {
                    out.push(CriticalEdge::new(arg.clone(), edge.clone()));
                }
            }
        }
        Constraint::Conj(cs) => {
            for c in cs {
                collect_critical_edges(c, spec, out);
            }
        }
        Constraint::Exists { body, .. } => collect_critical_edges(body, spec, out),
        Constraint::ResolveQuery { .. }
        | Constraint::Equal(..)
        | Constraint::Inequal(..)
        | Constraint::NewScope { .. } => {}
    }
}

/// Multiset of open critical edges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Completeness {
    open: OrdMap<CriticalEdge, usize>,
}

impl Completeness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Registered edges with their multiplicity.
    pub fn iter(&self) -> impl Iterator<Item = (&CriticalEdge, usize)> {
        self.open.iter().map(|(edge, count)| (edge, *count))
    }

    pub fn add(&mut self, edges: impl IntoIterator<Item = CriticalEdge>) {
        for edge in edges {
            let count = self.open.get(&edge).copied().unwrap_or(0);
            self.open.insert(edge, count + 1);
        }
    }

    /// Unregisters one occurrence of each edge and returns the edges that
    /// are no longer registered at all.
    pub fn remove(&mut self, edges: impl IntoIterator<Item = CriticalEdge>) -> Vec<CriticalEdge> {
        let mut closed = Vec::new();
        for edge in edges {
            match self.open.get(&edge).copied() {
                Some(count) if count > 1 => {
                    self.open.insert(edge, count - 1);
                }
                Some(_) => {
                    self.open.remove(&edge);
                    closed.push(edge);
                }
                None => {}
            }
        }
        closed
    }

    pub fn add_constraint(&mut self, constraint: &Constraint, spec: &Spec) {
        self.add(critical_edges(constraint, spec));
    }

    pub fn remove_constraint(&mut self, constraint: &Constraint, spec: &Spec) -> Vec<CriticalEdge> {
        self.remove(critical_edges(constraint, spec))
    }

    /// Whether no pending constraint may add `edge` to `scope`.
    pub fn is_complete(&self, scope: Scope, edge: &EdgeOrData, unifier: &Unifier) -> bool {
        !self
            .open
            .keys()
            .any(|open| &open.edge == edge && open.is_on(scope, unifier))
    }
}

#[cfg(test)]
#[path = "../tests/completeness_tests.rs"]
mod tests;
