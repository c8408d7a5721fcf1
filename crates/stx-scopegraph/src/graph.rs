//! Persistent scope graph.

use crate::label::Label;
use im::{OrdMap, OrdSet, Vector};
use std::fmt;
use stx_terms::{Scope, Term};

/// Scopes, labelled edges between them, and data attached to scopes.
///
/// All operations return a new graph; the old one stays valid and shares
/// structure with the new one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScopeGraph {
    scopes: OrdSet<Scope>,
    edges: OrdMap<(Scope, Label), Vector<Scope>>,
    data: OrdMap<Scope, Vector<Term>>,
}

impl ScopeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(&self, scope: Scope) -> Self {
        let mut graph = self.clone();
        graph.scopes.insert(scope);
        graph
    }

    pub fn with_edge(&self, source: Scope, label: Label, target: Scope) -> Self {
        let mut graph = self.clone();
        graph.scopes.insert(source);
        graph.scopes.insert(target);
        let key = (source, label);
        let mut targets = graph.edges.get(&key).cloned().unwrap_or_default();
        targets.push_back(target);
        graph.edges.insert(key, targets);
        graph
    }

    pub fn with_datum(&self, scope: Scope, datum: Term) -> Self {
        let mut graph = self.clone();
        graph.scopes.insert(scope);
        let mut data = graph.data.get(&scope).cloned().unwrap_or_default();
        data.push_back(datum);
        graph.data.insert(scope, data);
        graph
    }

    pub fn contains_scope(&self, scope: Scope) -> bool {
        self.scopes.contains(&scope)
    }

    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.scopes.iter().copied()
    }

    /// Targets of the `label` edges of `scope`, in insertion order.
    pub fn edges(&self, scope: Scope, label: &Label) -> impl Iterator<Item = Scope> + '_ {
        self.edges
            .get(&(scope, label.clone()))
            .into_iter()
            .flat_map(|targets| targets.iter().copied())
    }

    /// Data of `scope`, in insertion order.
    pub fn data(&self, scope: Scope) -> impl Iterator<Item = &Term> + '_ {
        self.data.get(&scope).into_iter().flat_map(|data| data.iter())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|targets| targets.len()).sum()
    }
}

impl fmt::Display for ScopeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scope in self.scopes.iter() {
            write!(f, "{scope}")?;
            for datum in self.data(*scope) {
                write!(f, " : {datum}")?;
            }
            writeln!(f)?;
            for ((source, label), targets) in self.edges.range((*scope, Label::new(""))..) {
                if source != scope {
                    break;
                }
                for target in targets {
                    writeln!(f, "  -{label}-> {target}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/graph_tests.rs"]
mod tests;
