//! Unifier, scope graph and fresh-name counters of a solver state.

use std::fmt;
use stx_scopegraph::ScopeGraph;
use stx_terms::{Scope, TermVar, Unifier};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Store {
    unifier: Unifier,
    graph: ScopeGraph,
    next_var: u32,
    next_scope: u32,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unifier(&self) -> &Unifier {
        &self.unifier
    }

    pub fn graph(&self) -> &ScopeGraph {
        &self.graph
    }

    pub fn set_unifier(&mut self, unifier: Unifier) {
        self.unifier = unifier;
    }

    pub fn set_graph(&mut self, graph: ScopeGraph) {
        self.graph = graph;
    }

    /// A variable named after `base` that no term of this store mentions.
    pub fn fresh_var(&mut self, base: &TermVar) -> TermVar {
        let var = base.with_index(self.next_var);
        self.next_var += 1;
        var
    }

    /// A new scope, added to the graph.
    pub fn fresh_scope(&mut self) -> Scope {
        let scope = Scope(self.next_scope);
        self.next_scope += 1;
        self.graph = self.graph.with_scope(scope);
        scope
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (var, term) in self.unifier.bindings() {
            writeln!(f, "  {var} := {term}")?;
        }
        for line in self.graph.to_string().lines() {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}
