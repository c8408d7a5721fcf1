//! Reference inference solver.
//!
//! Solves constraints with a FIFO worklist until nothing changes:
//!
//! - Constraints that fail are recorded as error messages and dropped.
//! - Constraints that cannot be decided yet are delayed.
//! - After every pass that solved or failed something, the delayed
//!   constraints are retried.
//!
//! Predicate calls are expanded with strict rule application, so a call is
//! only expanded when exactly one rule applies. Queries are answered only
//! when the completeness index shows that no pending constraint can extend
//! the graph along a path the query would take.

use crate::apply::{Application, ApplyMode, apply_rules};
use crate::completeness::{Completeness, CriticalEdge};
use crate::constraint::Constraint;
use crate::delay::Delay;
use crate::error::SolverError;
use crate::query::{DataWfMode, data_equiv_is_always, resolve_query};
use crate::spec::Spec;
use crate::state::SolverState;
use crate::store::Store;
use im::OrdMap;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use stx_common::diagnostics::{format_message, templates};
use stx_common::{Message, limits};
use stx_scopegraph::ResolutionError;
use stx_terms::{Term, TermVar};
use tracing::{debug, trace};

/// Outcome of an inference run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverResult {
    pub store: Store,
    /// Every constraint that could not be solved yet.
    pub delays: OrdMap<Constraint, Delay>,
    pub completeness: Completeness,
    pub messages: OrdMap<Constraint, Message>,
    pub existentials: Option<OrdMap<TermVar, Term>>,
}

impl SolverResult {
    pub fn has_errors(&self) -> bool {
        self.messages.values().any(Message::is_error)
    }
}

enum Step {
    Solved(Vec<Constraint>),
    Failed(Message),
    Delayed(Delay),
}

struct Solver<'a> {
    spec: &'a Spec,
    store: Store,
    completeness: Completeness,
    messages: OrdMap<Constraint, Message>,
    existentials: Option<OrdMap<TermVar, Term>>,
    record_existentials: bool,
}

/// Solves the active and delayed constraints of `state`.
pub fn infer(spec: &Spec, state: &SolverState) -> Result<SolverResult, SolverError> {
    let record_existentials = state.existentials().is_none()
        && state.delays().is_empty()
        && state.constraints().len() == 1
        && state
            .constraints()
            .iter()
            .all(|c| matches!(c, Constraint::Exists { .. }));
    let mut solver = Solver {
        spec,
        store: state.store().clone(),
        completeness: state.completeness().clone(),
        messages: state.messages().clone(),
        existentials: state.existentials().cloned(),
        record_existentials,
    };

    let mut queue: VecDeque<Constraint> = state
        .constraints()
        .iter()
        .chain(state.delays().keys())
        .cloned()
        .collect();
    let mut delayed: OrdMap<Constraint, Delay> = OrdMap::new();
    let mut steps: u32 = 0;
    loop {
        let mut progress = false;
        while let Some(constraint) = queue.pop_front() {
            steps += 1;
            if steps > limits::MAX_INFERENCE_STEPS {
                return Err(SolverError::StepLimitExceeded(limits::MAX_INFERENCE_STEPS));
            }
            match solver.step(&constraint)? {
                Step::Solved(produced) => {
                    solver.completeness.remove_constraint(&constraint, spec);
                    for c in &produced {
                        solver.completeness.add_constraint(c, spec);
                    }
                    queue.extend(produced);
                    progress = true;
                }
                Step::Failed(message) => {
                    trace!(constraint = %constraint, message = %message, "failed");
                    solver.completeness.remove_constraint(&constraint, spec);
                    solver.messages.insert(constraint, message);
                    progress = true;
                }
                Step::Delayed(delay) => {
                    if delayed.contains_key(&constraint) {
                        // Identical pending constraints are one constraint.
                        solver.completeness.remove_constraint(&constraint, spec);
                    } else {
                        delayed.insert(constraint, delay);
                    }
                }
            }
        }
        if !progress || delayed.is_empty() {
            break;
        }
        queue.extend(delayed.keys().cloned());
        delayed = OrdMap::new();
    }

    debug!(
        steps,
        delayed = delayed.len(),
        errors = solver.messages.values().filter(|m| m.is_error()).count(),
        "inference finished"
    );
    Ok(SolverResult {
        store: solver.store,
        delays: delayed,
        completeness: solver.completeness,
        messages: solver.messages,
        existentials: solver.existentials,
    })
}

impl Solver<'_> {
    fn find(&self, term: &Term) -> Term {
        self.store.unifier().find(term)
    }

    fn show(&self, term: &Term) -> String {
        self.store.unifier().find_recursive(term).to_string()
    }

    fn delay_on(&self, terms: &[&Term]) -> Step {
        let unifier = self.store.unifier();
        Step::Delayed(Delay::on_vars(terms.iter().flat_map(|t| unifier.free_vars(t))))
    }

    fn not_a_scope(&self, term: &Term) -> Step {
        Step::Failed(Message::error(format_message(
            templates::NOT_A_SCOPE,
            &[self.show(term).as_str()],
        )))
    }

    fn step(&mut self, constraint: &Constraint) -> Result<Step, SolverError> {
        let step = match constraint {
            Constraint::Conj(parts) => Step::Solved(parts.clone()),
            Constraint::Exists { vars, body } => {
                let subst: FxHashMap<TermVar, Term> = vars
                    .iter()
                    .map(|var| (var.clone(), Term::Var(self.store.fresh_var(var))))
                    .collect();
                if self.record_existentials {
                    self.existentials = Some(
                        vars.iter()
                            .filter_map(|var| Some((var.clone(), subst.get(var)?.clone())))
                            .collect(),
                    );
                    self.record_existentials = false;
                }
                Step::Solved(vec![body.substitute(&subst)])
            }
            Constraint::Equal(left, right) => match self.store.unifier().unify(left, right) {
                Ok(unifier) => {
                    self.store.set_unifier(unifier);
                    Step::Solved(Vec::new())
                }
                Err(_) => Step::Failed(Message::error(format_message(
                    templates::CANNOT_UNIFY,
                    &[self.show(left).as_str(), self.show(right).as_str()],
                ))),
            },
            Constraint::Inequal(left, right) => {
                let unifier = self.store.unifier();
                if unifier.are_equal(left, right) {
                    Step::Failed(Message::error(format_message(
                        templates::TERMS_EQUAL,
                        &[self.show(left).as_str(), self.show(right).as_str()],
                    )))
                } else if !unifier.are_unifiable(left, right) {
                    Step::Solved(Vec::new())
                } else {
                    self.delay_on(&[left, right])
                }
            }
            Constraint::NewScope { var } => {
                let term = Term::Var(var.clone());
                match self.find(&term) {
                    Term::Var(unbound) => {
                        let scope = self.store.fresh_scope();
                        let unifier = self.store.unifier().unify(&Term::Var(unbound), &Term::Scope(scope));
                        match unifier {
                            Ok(unifier) => {
                                self.store.set_unifier(unifier);
                                Step::Solved(Vec::new())
                            }
                            Err(_) => self.not_a_scope(&term),
                        }
                    }
                    bound => Step::Failed(Message::error(format_message(
                        templates::SCOPE_ALREADY_BOUND,
                        &[var.to_string().as_str(), self.show(&bound).as_str()],
                    ))),
                }
            }
            Constraint::TellEdge {
                source,
                label,
                target,
            } => match (self.find(source), self.find(target)) {
                (Term::Scope(s), Term::Scope(t)) => {
                    let graph = self.store.graph().with_edge(s, label.clone(), t);
                    self.store.set_graph(graph);
                    Step::Solved(Vec::new())
                }
                (Term::Var(_), _) | (_, Term::Var(_)) => self.delay_on(&[source, target]),
                (Term::Scope(_), _) => self.not_a_scope(target),
                _ => self.not_a_scope(source),
            },
            Constraint::TellRel { scope, datum } => match self.find(scope) {
                Term::Scope(s) => {
                    let datum = self.store.unifier().find_recursive(datum);
                    let graph = self.store.graph().with_datum(s, datum);
                    self.store.set_graph(graph);
                    Step::Solved(Vec::new())
                }
                Term::Var(_) => self.delay_on(&[scope]),
                _ => self.not_a_scope(scope),
            },
            Constraint::User { name, args } => {
                match apply_rules(self.spec, &self.store, name, args, ApplyMode::Strict)? {
                    Application::Expanded(mut results) => match results.pop() {
                        Some(result) => {
                            self.store = result.store;
                            Step::Solved(vec![result.body])
                        }
                        None => {
                            let shown = Term::tuple(args.iter().cloned());
                            Step::Failed(Message::error(format_message(
                                templates::NO_RULE_APPLIES,
                                &[&**name, self.show(&shown).as_str()],
                            )))
                        }
                    },
                    Application::Delayed(vars) => Step::Delayed(Delay::on_vars(vars)),
                }
            }
            Constraint::ResolveQuery {
                scope,
                filter,
                min,
                result,
            } => {
                let s = match self.find(scope) {
                    Term::Scope(s) => s,
                    Term::Var(_) => return Ok(self.delay_on(&[scope])),
                    _ => return Ok(self.not_a_scope(scope)),
                };
                let Some(always) = data_equiv_is_always(self.spec, &min.data_equiv) else {
                    return Ok(Step::Delayed(Delay::default()));
                };
                match resolve_query(
                    self.spec,
                    &self.store,
                    &self.completeness,
                    s,
                    filter,
                    &min.label_order,
                    always,
                    DataWfMode::Strict,
                ) {
                    Ok(data) => Step::Solved(vec![Constraint::Equal(result.clone(), Term::list(data))]),
                    Err(ResolutionError::Incomplete { scope, edge }) => Step::Delayed(
                        Delay::on_critical_edge(CriticalEdge::new(Term::Scope(scope), edge)),
                    ),
                    Err(ResolutionError::DataUndecided { vars }) => {
                        Step::Delayed(Delay::on_vars(vars))
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };
        Ok(step)
    }
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
