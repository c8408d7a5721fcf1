//! Detection of queries that cannot be answered yet.
//!
//! A query is stuck when its scope is not known or when resolving it would
//! read an edge that may still be extended. Stuck queries are delayed so
//! that the expansion strategies do not answer them prematurely; the state
//! reactivates them once the blocking edge is closed.

use stx_scopegraph::ResolutionError;
use stx_solver::{
    Constraint, CriticalEdge, DataWfMode, Delay, SolverContext, SolverError, SolverState, Spec,
    data_equiv_is_always, resolve_query,
};
use stx_strategies::{Seq, Strategy};
use stx_terms::Term;
use tracing::trace;

/// The delay for `query` if it is stuck in `state`.
fn stuck_delay(spec: &Spec, state: &SolverState, query: &Constraint) -> Result<Option<Delay>, SolverError> {
    let Constraint::ResolveQuery { scope, filter, min, .. } = query else {
        return Ok(None);
    };
    let unifier = state.unifier();
    if !unifier.is_ground(scope) {
        return Ok(Some(Delay::on_vars(unifier.free_vars(scope))));
    }
    // Inference reports a query on a non-scope; nothing to wait for.
    let Some(scope) = unifier.find(scope).as_scope() else {
        return Ok(None);
    };
    // Undecidable equivalence leaves the query as it is.
    let Some(always) = data_equiv_is_always(spec, &min.data_equiv) else {
        return Ok(None);
    };
    match resolve_query(
        spec,
        state.store(),
        state.completeness(),
        scope,
        filter,
        &min.label_order,
        always,
        DataWfMode::Relaxed,
    ) {
        Ok(_) => Ok(None),
        Err(ResolutionError::Incomplete { scope, edge }) => Ok(Some(Delay::on_critical_edge(
            CriticalEdge::new(Term::Scope(scope), edge),
        ))),
        Err(err) => Err(err.into()),
    }
}

/// Active queries of `state` that are stuck, with the reason.
pub fn stuck_queries(spec: &Spec, state: &SolverState) -> Result<Vec<(Constraint, Delay)>, SolverError> {
    let mut stuck = Vec::new();
    for query in state.constraints().iter().filter(|c| c.is_query()) {
        if let Some(delay) = stuck_delay(spec, state, query)? {
            trace!(query = %query, delay = %delay, "stuck query");
            stuck.push((query.clone(), delay));
        }
    }
    Ok(stuck)
}

/// Delays every stuck query of the input state.
pub fn delay_stuck_queries() -> Strategy<SolverContext, SolverState, SolverState> {
    Strategy::new("delay_stuck_queries", |ctx: &SolverContext, state: SolverState| {
        match stuck_queries(ctx.spec(), &state) {
            Ok(stuck) if stuck.is_empty() => Seq::of(state),
            Ok(stuck) => Seq::of(state.delay(stuck)),
            Err(err) => Seq::error(err.into()),
        }
    })
}

#[cfg(test)]
#[path = "../tests/stuck_tests.rs"]
mod tests;
