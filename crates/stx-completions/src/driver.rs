//! Round-robin completion of every placeholder of a program.
//!
//! The driver keeps one [`CompletionExpectation`]: the program with its
//! open placeholder variables and the solver state of the accepted
//! proposals so far. Each round visits the variables that were open when
//! the round started:
//!
//! - a variable that a stuck query is waiting for is skipped
//! - no candidate: insert the expected literal, or fail
//! - one candidate: accept it
//! - several candidates: accept the one that leaves the fewest open
//!   variables, the first one on a tie
//!
//! Completion succeeds when no variable is open. A round in which every
//! variable was skipped fails.

use crate::completer::{Proposal, TermCompleter};
use crate::expand::assert_valid;
use crate::expectation::{CompletionExpectation, ExpectationError};
use crate::placeholder::PlaceholderVarMap;
use crate::stats::CompletionStats;
use crate::stuck::stuck_queries;
use im::OrdSet;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use stx_common::limits;
use stx_solver::{Constraint, SolverContext, SolverError, SolverState, infer};
use stx_strategies::SearchError;
use stx_terms::{Term, TermVar};
use thiserror::Error;
use tracing::{debug, debug_span, info};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no completion of {var} can produce {expected}")]
    NoCandidates { var: TermVar, expected: Term },
    #[error("could not insert literal {literal} for {var}")]
    CouldNotInsertLiteral { var: TermVar, literal: Term },
    #[error("stuck on delaying variables: {}", display_vars(.vars))]
    StuckOnDelayingVariables { vars: Vec<TermVar> },
    #[error("completion did not finish within {0} rounds")]
    RoundLimitExceeded(u32),
    #[error("root predicate `{0}` must take exactly one argument")]
    InvalidRoot(String),
    #[error("the input program has errors: {}", .0.join("; "))]
    InvalidInputProgram(Vec<String>),
    #[error("the input program has no placeholders")]
    NothingToComplete,
    #[error("the expectation has not been analyzed")]
    NotAnalyzed,
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Expectation(#[from] ExpectationError),
}

fn display_vars(vars: &[TermVar]) -> String {
    vars.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverOptions {
    pub max_rounds: u32,
    /// Insert the expected literal for a variable without candidates.
    pub literal_fallback: bool,
    /// Accept input programs that already have errors; those errors are
    /// then ignored by validation.
    pub allow_input_errors: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            max_rounds: limits::DEFAULT_MAX_COMPLETION_ROUNDS,
            literal_fallback: true,
            allow_input_errors: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompletionOutcome {
    pub expectation: CompletionExpectation,
    pub stats: CompletionStats,
}

impl CompletionOutcome {
    /// The completed program.
    pub fn program(&self) -> &Term {
        self.expectation.incomplete_ast()
    }
}

#[derive(Clone, Debug)]
pub struct CompletionDriver {
    completer: TermCompleter,
    options: DriverOptions,
}

impl CompletionDriver {
    pub fn new(completer: TermCompleter, options: DriverOptions) -> Self {
        Self { completer, options }
    }

    pub fn completer(&self) -> &TermCompleter {
        &self.completer
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// Solves `root(program)` once, with the placeholder variables of `map`
    /// under an existential, and delays the queries that are stuck.
    ///
    /// Returns the context to complete in, which tolerates the errors the
    /// input already has when the options allow them.
    pub fn analyze(
        &self,
        ctx: &SolverContext,
        root: &str,
        program: &Term,
        map: &PlaceholderVarMap,
    ) -> Result<(SolverContext, SolverState), CompletionError> {
        let spec = ctx.spec();
        match spec.arity(root) {
            None => return Err(SolverError::UnknownPredicate(root.to_string()).into()),
            Some(1) => {}
            Some(_) => return Err(CompletionError::InvalidRoot(root.to_string())),
        }
        let start = SolverState::of(spec, [Constraint::user(root, [program.clone()])])
            .with_existentials(map.vars().cloned())
            .precompute_critical_edges(spec);
        let state = SolverState::from_solver_result(infer(spec, &start)?);
        let state = state.delay(stuck_queries(spec, &state)?);
        let errors: OrdSet<Constraint> = state.errors().map(|(c, _)| c.clone()).collect();
        if !errors.is_empty() && !self.options.allow_input_errors {
            return Err(CompletionError::InvalidInputProgram(
                state.errors().map(|(_, m)| m.text.clone()).collect(),
            ));
        }
        debug!(root, errors = errors.len(), constraints = state.constraints().len(), "analyzed");
        Ok((ctx.with_allowed_errors(errors), state))
    }

    /// Completes `incomplete` towards `expected` under the root predicate.
    pub fn complete_program(
        &self,
        ctx: &SolverContext,
        root: &str,
        incomplete: &Term,
        expected: &Term,
    ) -> Result<CompletionOutcome, CompletionError> {
        let mut map = PlaceholderVarMap::default();
        let expectation =
            CompletionExpectation::from_term(incomplete, expected, &mut map, self.completer.policy().as_ref())?;
        if expectation.is_complete() {
            return Err(CompletionError::NothingToComplete);
        }
        let (ctx, state) = self.analyze(ctx, root, expectation.incomplete_ast(), &map)?;
        self.run(&ctx, expectation.with_state(state))
    }

    /// Runs rounds until no variable of `expectation` is open.
    pub fn run(
        &self,
        ctx: &SolverContext,
        expectation: CompletionExpectation,
    ) -> Result<CompletionOutcome, CompletionError> {
        let mut expectation = expectation;
        let mut stats = CompletionStats::default();
        while !expectation.is_complete() {
            if stats.rounds >= self.options.max_rounds {
                return Err(CompletionError::RoundLimitExceeded(self.options.max_rounds));
            }
            let _span = debug_span!("round", round = stats.rounds + 1).entered();
            let started = Instant::now();
            let mut progress = false;
            let mut skipped = Vec::new();
            let open: Vec<TermVar> = expectation.vars().cloned().collect();
            for var in open {
                let Some(expected) = expectation.expected(&var).cloned() else {
                    continue;
                };
                let state = expectation.state().ok_or(CompletionError::NotAnalyzed)?;
                if is_delayed(state, &var) {
                    debug!(var = %var, "delayed");
                    stats.skipped += 1;
                    skipped.push(var);
                    continue;
                }
                let proposals = self.completer.complete(ctx, state, &var)?;
                stats.proposals += proposals.len();
                let candidates: Vec<CompletionExpectation> = proposals
                    .iter()
                    .filter_map(|proposal| expectation.try_replace(&var, proposal))
                    .collect();
                stats.candidates += candidates.len();
                debug!(var = %var, proposals = proposals.len(), candidates = candidates.len(), "completed variable");
                expectation = match choose(candidates) {
                    Some(next) => next,
                    None => {
                        let next = self.insert_literal(ctx, &expectation, &var, expected)?;
                        stats.inserted_literals += 1;
                        next
                    }
                };
                progress = true;
            }
            stats.end_round(started.elapsed());
            if !progress {
                return Err(CompletionError::StuckOnDelayingVariables { vars: skipped });
            }
        }
        info!(rounds = stats.rounds, micros = stats.total_micros(), "completion finished");
        Ok(CompletionOutcome { expectation, stats })
    }

    fn insert_literal(
        &self,
        ctx: &SolverContext,
        expectation: &CompletionExpectation,
        var: &TermVar,
        expected: Term,
    ) -> Result<CompletionExpectation, CompletionError> {
        if !self.options.literal_fallback || !self.completer.policy().is_literal(&expected) {
            return Err(CompletionError::NoCandidates {
                var: var.clone(),
                expected,
            });
        }
        let state = expectation.state().ok_or(CompletionError::NotAnalyzed)?;
        let forced = state.update_constraints(
            ctx.spec(),
            [Constraint::equal(state.project(var), expected.clone())],
            [],
        );
        let valid = assert_valid(var).eval(ctx, forced).collect_all()?;
        let next = valid.into_iter().next().and_then(|state| {
            expectation.try_replace(
                var,
                &Proposal {
                    state,
                    term: expected.clone(),
                },
            )
        });
        match next {
            Some(next) => {
                debug!(var = %var, literal = %expected, "inserted literal");
                Ok(next)
            }
            None => Err(CompletionError::CouldNotInsertLiteral {
                var: var.clone(),
                literal: expected,
            }),
        }
    }
}

/// Whether a delayed constraint waits for a variable of `var`'s value.
fn is_delayed(state: &SolverState, var: &TermVar) -> bool {
    let vars = state.project(var).vars();
    state
        .delays()
        .values()
        .any(|delay| vars.iter().any(|v| delay.vars.contains(v)))
}

/// The candidate with the fewest open variables; the first one on a tie.
fn choose(candidates: Vec<CompletionExpectation>) -> Option<CompletionExpectation> {
    candidates
        .into_iter()
        .reduce(|best, next| if next.open_count() < best.open_count() { next } else { best })
}

#[cfg(test)]
#[path = "../tests/driver_tests.rs"]
mod tests;
