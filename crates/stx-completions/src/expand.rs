//! Expansion strategies for completing one placeholder variable.
//!
//! Completion of a variable `v` runs four stages, each to a fixpoint:
//!
//! 1. predicate expansion: expand the predicate calls that mention `v`
//!    until `v` is bound
//! 2. injection expansion: when `v` is bound to an injection around a
//!    variable, complete that variable as well
//! 3. query expansion: replace queries by their answers
//! 4. deterministic expansion: expand calls on the variables of `v`'s
//!    value that have exactly one valid expansion
//!
//! Every expansion step is followed by [`assert_valid`], which re-runs
//! inference and discards states with new errors.

use crate::placeholder::PlaceholderPolicy;
use crate::stuck::delay_stuck_queries;
use im::OrdSet;
use std::sync::Arc;
use stx_scopegraph::ResolutionError;
use stx_solver::{
    Application, ApplyMode, Constraint, CriticalEdge, DataWfMode, Delay, FocusedState,
    SolverContext, SolverError, SolverState, apply_rules, data_equiv_is_always, focus_constraint,
    infer, resolve_query,
};
use stx_strategies::{
    SearchError, Seq, Strategy, assert_that, distinct, fix_set, glc, id, limit, named, rec, seq,
    single, try_,
};
use stx_terms::{Term, TermVar};
use tracing::trace;

type StateStrategy = Strategy<SolverContext, SolverState, SolverState>;

/// Operators of the injections already unwrapped in the current branch.
pub type VisitedInjections = OrdSet<Arc<str>>;

/// Runs inference on the state.
pub fn infer_state() -> StateStrategy {
    Strategy::new("infer", |ctx: &SolverContext, state: SolverState| {
        match infer(ctx.spec(), &state) {
            Ok(result) => Seq::of(SolverState::from_solver_result(result)),
            Err(err) => Seq::error(err.into()),
        }
    })
}

/// Infers, drops states with errors that were not in the input, and delays
/// stuck queries.
pub fn assert_valid(var: &TermVar) -> StateStrategy {
    let var = var.clone();
    let no_new_errors = assert_that("no_new_errors", move |ctx: &SolverContext, state: &SolverState| {
        let valid = !state.has_errors_except(ctx.allowed_errors());
        if !valid {
            trace!(var = %var, value = %state.project(&var), "rejected");
        }
        valid
    });
    named("assert_valid", infer_state().then(no_new_errors).then(delay_stuck_queries()))
}

/// Whether an argument of the call `constraint` shares an unbound variable
/// with the current value of `var`.
fn mentions_value_of(state: &SolverState, constraint: &Constraint, var: &TermVar) -> bool {
    let vars = state.project(var).vars();
    let unifier = state.unifier();
    !vars.is_empty()
        && constraint
            .user_args()
            .iter()
            .any(|arg| unifier.free_vars(arg).iter().any(|v| vars.contains(v)))
}

/// Expands the focused call with every rule that may apply to it.
pub fn expand_predicate() -> Strategy<SolverContext, FocusedState, SolverState> {
    Strategy::new("expand_predicate", |ctx: &SolverContext, focused: FocusedState| {
        let Constraint::User { name, args } = focused.focus() else {
            return Seq::empty();
        };
        let results = match apply_rules(ctx.spec(), focused.state().store(), name, args, ApplyMode::Relaxed) {
            Ok(Application::Expanded(results)) => results,
            Ok(Application::Delayed(_)) => Vec::new(),
            Err(err) => return Seq::error(err.into()),
        };
        trace!(focus = %focused.focus(), branches = results.len(), "expand predicate");
        let spec = ctx.shared_spec().clone();
        let (state, focus) = (focused.state().clone(), focused.focus().clone());
        Seq::new(
            results
                .into_iter()
                .map(move |result| state.with_apply_result(&spec, &focus, result).map_err(SearchError::from)),
        )
    })
}

/// Replaces the focused query by its answers, one branch per answer.
///
/// A query without answers becomes `result == []`. A query that hits an
/// incomplete edge is delayed on that edge.
pub fn expand_query() -> Strategy<SolverContext, FocusedState, SolverState> {
    Strategy::new("expand_query", |ctx: &SolverContext, focused: FocusedState| {
        let focus = focused.focus().clone();
        let Constraint::ResolveQuery { scope, filter, min, result } = &focus else {
            return Seq::empty();
        };
        let spec = ctx.spec();
        let state = focused.into_state();
        let Some(scope) = state.unifier().find(scope).as_scope() else {
            return Seq::empty();
        };
        let always = data_equiv_is_always(spec, &min.data_equiv).unwrap_or(false);
        let answers = match resolve_query(
            spec,
            state.store(),
            state.completeness(),
            scope,
            filter,
            &min.label_order,
            always,
            DataWfMode::Relaxed,
        ) {
            Ok(answers) => answers,
            Err(ResolutionError::Incomplete { scope, edge }) => {
                let delay = Delay::on_critical_edge(CriticalEdge::new(Term::Scope(scope), edge));
                return Seq::of(state.delay([(focus.clone(), delay)]));
            }
            Err(err) => return Seq::error(SolverError::from(err).into()),
        };
        trace!(focus = %focus, answers = answers.len(), "expand query");
        let bindings: Vec<Term> = if answers.is_empty() {
            vec![Term::list([])]
        } else {
            answers.into_iter().map(|answer| Term::list([answer])).collect()
        };
        let (spec, result) = (ctx.shared_spec().clone(), result.clone());
        Seq::values(bindings).map(move |binding| {
            state.update_constraints(&spec, [Constraint::equal(result.clone(), binding)], [focus.clone()])
        })
    })
}

/// Expands calls that mention `var` until `var` is bound.
pub fn expand_all_predicates(var: &TermVar) -> StateStrategy {
    let var = var.clone();
    rec("expand_all_predicates", move |this| {
        let target = var.clone();
        let select = focus_constraint("focus_call", move |_, state, c| {
            c.is_user() && mentions_value_of(state, c, &target)
        });
        let bound = var.clone();
        let still_open = assert_that("still_open", move |_: &SolverContext, state: &SolverState| {
            state.project(&bound).is_var()
        });
        glc(
            limit(1, select),
            expand_predicate().then(assert_valid(&var)).then(glc(still_open, this, id())),
            id(),
        )
    })
}

struct Injection {
    op: Arc<str>,
    inner: TermVar,
    state: SolverState,
}

/// The injection `var` is bound to, if it wraps a variable.
fn unwrap_injection(var: &TermVar, policy: Arc<dyn PlaceholderPolicy>) -> Strategy<SolverContext, SolverState, Injection> {
    let var = var.clone();
    Strategy::new("unwrap_injection", move |_: &SolverContext, state: SolverState| {
        let value = state.project(&var);
        match &value {
            Term::Appl { op, args } if policy.is_injection(&value) => match args.first() {
                Some(Term::Var(inner)) => Seq::of(Injection {
                    op: op.clone(),
                    inner: inner.clone(),
                    state,
                }),
                _ => Seq::empty(),
            },
            _ => Seq::empty(),
        }
    })
}

/// Completes the variable inside an injection not yet unwrapped in this
/// branch.
fn expand_injection(
    visited: VisitedInjections,
    policy: Arc<dyn PlaceholderPolicy>,
) -> Strategy<SolverContext, Injection, SolverState> {
    Strategy::new("expand_injection", move |ctx: &SolverContext, injection: Injection| {
        if visited.contains(&injection.op) {
            return Seq::empty();
        }
        trace!(op = %injection.op, inner = %injection.inner, "expand injection");
        let visited = visited.update(injection.op.clone());
        complete(&injection.inner, visited, policy.clone()).eval(ctx, injection.state)
    })
}

/// Unwraps injections around `var` until none is left.
pub fn expand_all_injections(
    var: &TermVar,
    visited: VisitedInjections,
    policy: Arc<dyn PlaceholderPolicy>,
) -> StateStrategy {
    let step = seq(unwrap_injection(var, policy.clone()), expand_injection(visited, policy));
    fix_set(try_(step)).then(assert_valid(var))
}

/// Answers the active queries one at a time.
pub fn expand_all_queries(var: &TermVar) -> StateStrategy {
    let select = focus_constraint("focus_query", |_, _, c| c.is_query());
    fix_set(glc(limit(1, select), expand_query().then(assert_valid(var)), id()))
}

/// Expands calls on the variables of `var`'s value that have exactly one
/// valid expansion.
pub fn expand_deterministic(var: &TermVar, policy: Arc<dyn PlaceholderPolicy>) -> StateStrategy {
    let target = var.clone();
    let select = focus_constraint("focus_related", move |_, state, c| {
        c.is_user() && mentions_value_of(state, c, &target)
    });
    let step = limit(1, seq(select, single(expand_predicate().then(assert_valid(var)))));
    let value = var.clone();
    let not_placeholder = assert_that("not_placeholder", move |_: &SolverContext, state: &SolverState| {
        !policy.is_placeholder(&state.project(&value))
    });
    fix_set(try_(step)).then(not_placeholder)
}

/// All distinct states in which `var` has been completed as far as the
/// rules allow.
pub fn complete(var: &TermVar, visited: VisitedInjections, policy: Arc<dyn PlaceholderPolicy>) -> StateStrategy {
    let stages = expand_all_predicates(var)
        .then(expand_all_injections(var, visited, policy.clone()))
        .then(expand_all_queries(var))
        .then(expand_deterministic(var, policy));
    distinct(named(format!("complete {var}"), stages))
}

#[cfg(test)]
#[path = "../tests/expand_tests.rs"]
mod tests;
