//! Solver states.
//!
//! A [`SolverState`] is an immutable snapshot of solving progress. Every
//! operation returns a new state; the persistent collections inside share
//! structure with the state they were derived from, so one state can seed
//! many search branches cheaply.
//!
//! # Invariants
//!
//! - Active constraints and delayed constraints are disjoint.
//! - The completeness index holds exactly the critical edges of the active
//!   and delayed constraints.
//! - `existentials`, when present, maps the variables of the most recently
//!   solved top-level existential to their renamings.

use crate::apply::ApplyResult;
use crate::completeness::{Completeness, CriticalEdge};
use crate::constraint::Constraint;
use crate::delay::Delay;
use crate::error::SolverError;
use crate::infer::SolverResult;
use crate::spec::Spec;
use crate::store::Store;
use im::{OrdMap, OrdSet};
use std::fmt;
use stx_common::Message;
use stx_scopegraph::ScopeGraph;
use stx_terms::{Term, TermVar, Unifier};
use tracing::warn;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SolverState {
    constraints: OrdSet<Constraint>,
    delays: OrdMap<Constraint, Delay>,
    completeness: Completeness,
    messages: OrdMap<Constraint, Message>,
    existentials: Option<OrdMap<TermVar, Term>>,
    store: Store,
}

impl SolverState {
    /// A state with `constraints` active and an empty store.
    pub fn of(spec: &Spec, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        let mut state = SolverState::default();
        state.add_active(spec, constraints);
        state
    }

    /// Turns the outcome of inference into a state.
    ///
    /// Constraints delayed only on variables become active again, so that
    /// completion strategies can expand them. Constraints waiting for a
    /// critical edge stay delayed.
    pub fn from_solver_result(result: SolverResult) -> Self {
        let mut constraints = OrdSet::new();
        let mut delays = OrdMap::new();
        for (constraint, delay) in result.delays {
            if delay.is_var_only() {
                constraints.insert(constraint);
            } else {
                delays.insert(constraint, delay);
            }
        }
        SolverState {
            constraints,
            delays,
            completeness: result.completeness,
            messages: result.messages,
            existentials: result.existentials,
            store: result.store,
        }
    }

    pub fn constraints(&self) -> &OrdSet<Constraint> {
        &self.constraints
    }

    pub fn delays(&self) -> &OrdMap<Constraint, Delay> {
        &self.delays
    }

    pub fn completeness(&self) -> &Completeness {
        &self.completeness
    }

    pub fn messages(&self) -> &OrdMap<Constraint, Message> {
        &self.messages
    }

    pub fn existentials(&self) -> Option<&OrdMap<TermVar, Term>> {
        self.existentials.as_ref()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn unifier(&self) -> &Unifier {
        self.store.unifier()
    }

    pub fn graph(&self) -> &ScopeGraph {
        self.store.graph()
    }

    pub fn is_active(&self, constraint: &Constraint) -> bool {
        self.constraints.contains(constraint)
    }

    pub fn is_delayed(&self, constraint: &Constraint) -> bool {
        self.delays.contains_key(constraint)
    }

    /// Adds constraints as active, splitting top-level conjunctions.
    /// Constraints that are already pending are not added twice.
    fn add_active(&mut self, spec: &Spec, constraints: impl IntoIterator<Item = Constraint>) {
        for constraint in constraints {
            match constraint {
                Constraint::Conj(parts) => self.add_active(spec, parts),
                other => {
                    if self.delays.contains_key(&other) || self.constraints.contains(&other) {
                        continue;
                    }
                    self.completeness.add_constraint(&other, spec);
                    self.constraints.insert(other);
                }
            }
        }
    }

    /// Moves delayed constraints whose critical edge is among `closed` and
    /// now complete back to the active set.
    fn reactivate(&mut self, closed: &[CriticalEdge]) {
        if closed.is_empty() {
            return;
        }
        let unifier = self.store.unifier();
        let woken: Vec<Constraint> = self
            .delays
            .iter()
            .filter(|(_, delay)| {
                delay.critical_edge.as_ref().is_some_and(|edge| {
                    let scope = unifier.find(&edge.scope);
                    closed
                        .iter()
                        .any(|c| c.edge == edge.edge && unifier.find(&c.scope) == scope)
                        && scope.as_scope().is_none_or(|s| {
                            self.completeness.is_complete(s, &edge.edge, unifier)
                        })
                })
            })
            .map(|(constraint, _)| constraint.clone())
            .collect();
        for constraint in woken {
            self.delays.remove(&constraint);
            self.constraints.insert(constraint);
        }
    }

    /// Replaces `focus` by the body of a rule application.
    ///
    /// The critical edges of `focus` are released and those of the body
    /// registered; delayed constraints waiting for a released edge that is
    /// now complete become active.
    pub fn with_apply_result(
        &self,
        spec: &Spec,
        focus: &Constraint,
        result: ApplyResult,
    ) -> Result<SolverState, SolverError> {
        if !self.constraints.contains(focus) {
            return Err(SolverError::FocusNotActive(focus.to_string()));
        }
        let mut next = self.clone();
        next.store = result.store;
        next.constraints.remove(focus);
        let closed = next.completeness.remove_constraint(focus, spec);
        next.add_active(spec, [result.body]);
        next.reactivate(&closed);
        Ok(next)
    }

    /// Adds and removes active constraints in one step.
    ///
    /// `add` and `remove` must be disjoint.
    pub fn update_constraints(
        &self,
        spec: &Spec,
        add: impl IntoIterator<Item = Constraint>,
        remove: impl IntoIterator<Item = Constraint>,
    ) -> SolverState {
        let add: Vec<Constraint> = add.into_iter().collect();
        let remove: Vec<Constraint> = remove.into_iter().collect();
        debug_assert!(
            add.iter().all(|c| !remove.contains(c)),
            "added and removed constraints overlap"
        );
        let mut next = self.clone();
        let mut closed = Vec::new();
        for constraint in &remove {
            if next.constraints.remove(constraint).is_some() {
                closed.extend(next.completeness.remove_constraint(constraint, spec));
            }
        }
        next.add_active(spec, add);
        next.reactivate(&closed);
        next
    }

    /// Moves active constraints to the delayed set.
    pub fn delay(&self, entries: impl IntoIterator<Item = (Constraint, Delay)>) -> SolverState {
        let mut next = self.clone();
        for (constraint, delay) in entries {
            if next.constraints.remove(&constraint).is_none() {
                warn!(constraint = %constraint, "cannot delay a constraint that is not active");
                continue;
            }
            next.delays.insert(constraint, delay);
        }
        next
    }

    /// Merges the active constraints into a single conjunction.
    pub fn fold_to_single_constraint(&self) -> SolverState {
        if self.constraints.len() <= 1 {
            return self.clone();
        }
        let mut next = self.clone();
        let folded = Constraint::Conj(self.constraints.iter().cloned().collect());
        next.constraints = OrdSet::unit(folded);
        next
    }

    /// Wraps the active constraints in an existential over `vars`.
    ///
    /// The previous existentials map is dropped; the next inference run
    /// records the renamings of `vars`.
    pub fn with_existentials(&self, vars: impl IntoIterator<Item = TermVar>) -> SolverState {
        if self.constraints.is_empty() {
            return self.clone();
        }
        let folded = self.fold_to_single_constraint();
        let mut next = folded.clone();
        let body = folded
            .constraints
            .iter()
            .next()
            .cloned()
            .unwrap_or_else(Constraint::truth);
        next.constraints = OrdSet::unit(Constraint::exists(vars, body));
        next.existentials = None;
        next
    }

    /// Rebuilds the completeness index from the active and delayed
    /// constraints and the scope extensions of `spec`.
    pub fn precompute_critical_edges(&self, spec: &Spec) -> SolverState {
        let mut completeness = Completeness::new();
        for constraint in self.constraints.iter().chain(self.delays.keys()) {
            completeness.add_constraint(constraint, spec);
        }
        let mut next = self.clone();
        next.completeness = completeness;
        next
    }

    /// The current value of `var`, looked up through the existentials map
    /// first. Returns the variable itself if it is unbound.
    pub fn project(&self, var: &TermVar) -> Term {
        let term = self
            .existentials
            .as_ref()
            .and_then(|existentials| existentials.get(var).cloned())
            .unwrap_or_else(|| Term::Var(var.clone()));
        self.store.unifier().find_recursive(&term)
    }

    pub fn has_errors(&self) -> bool {
        self.messages.values().any(Message::is_error)
    }

    /// Whether there is an error that is not caused by one of `allowed`.
    pub fn has_errors_except(&self, allowed: &OrdSet<Constraint>) -> bool {
        self.messages
            .iter()
            .any(|(constraint, message)| message.is_error() && !allowed.contains(constraint))
    }

    /// Constraints that failed with an error.
    pub fn errors(&self) -> impl Iterator<Item = (&Constraint, &Message)> {
        self.messages.iter().filter(|(_, message)| message.is_error())
    }
}

impl fmt::Display for SolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "constraints:")?;
        for constraint in &self.constraints {
            writeln!(f, "  {constraint}")?;
        }
        writeln!(f, "delays:")?;
        for (constraint, delay) in &self.delays {
            writeln!(f, "  {constraint} waits for {delay}")?;
        }
        writeln!(f, "messages:")?;
        for (constraint, message) in &self.messages {
            writeln!(f, "  {message} ({constraint})")?;
        }
        if let Some(existentials) = &self.existentials {
            writeln!(f, "existentials:")?;
            for (var, term) in existentials {
                writeln!(f, "  {var} -> {term}")?;
            }
        }
        writeln!(f, "store:")?;
        write!(f, "{}", self.store)
    }
}

#[cfg(test)]
#[path = "../tests/state_tests.rs"]
mod tests;
