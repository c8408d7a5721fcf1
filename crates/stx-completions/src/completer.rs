//! Completion of a single placeholder variable.

use crate::expand::{VisitedInjections, complete};
use crate::placeholder::{PlaceholderPolicy, PlaceholderVarMap, replace_variables_by_placeholders};
use std::sync::Arc;
use stx_solver::{SolverContext, SolverState};
use stx_strategies::SearchError;
use stx_terms::{Term, TermVar};
use tracing::{debug, debug_span};

/// A candidate value for a placeholder and the state it was found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    pub state: SolverState,
    pub term: Term,
}

/// Computes proposals for placeholder variables.
#[derive(Clone, Debug)]
pub struct TermCompleter {
    policy: Arc<dyn PlaceholderPolicy>,
}

impl TermCompleter {
    pub fn new(policy: Arc<dyn PlaceholderPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Arc<dyn PlaceholderPolicy> {
        &self.policy
    }

    /// Proposals for `var` in `state`.
    ///
    /// A variable that is already bound has its value as the only proposal.
    /// Otherwise every distinct state found by the expansion strategies in
    /// which `var` is no longer a bare variable yields one proposal, in the
    /// order the strategies found them. No proposals means `var` has no
    /// sound completion.
    pub fn complete(
        &self,
        ctx: &SolverContext,
        state: &SolverState,
        var: &TermVar,
    ) -> Result<Vec<Proposal>, SearchError> {
        let _span = debug_span!("complete", var = %var).entered();
        let current = state.project(var);
        if !current.is_var() {
            debug!(value = %current, "already bound");
            return Ok(vec![Proposal {
                state: state.clone(),
                term: current,
            }]);
        }
        let ctx = ctx.with_focus(var.clone());
        let proposals: Vec<Proposal> = complete(var, VisitedInjections::new(), self.policy.clone())
            .eval(&ctx, state.clone())
            .collect_all()?
            .into_iter()
            .filter_map(|state| {
                let term = state.project(var);
                (!term.is_var()).then_some(Proposal { state, term })
            })
            .collect();
        debug!(proposals = proposals.len(), "completed");
        Ok(proposals)
    }

    /// Proposals for `var`, written with the caller's placeholders.
    pub fn proposal_terms(
        &self,
        ctx: &SolverContext,
        state: &SolverState,
        var: &TermVar,
        map: &PlaceholderVarMap,
    ) -> Result<Vec<Term>, SearchError> {
        let proposals = self.complete(ctx, state, var)?;
        let mut terms: Vec<Term> = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let term = replace_variables_by_placeholders(&proposal.term, map, self.policy.as_ref());
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        Ok(terms)
    }
}

#[cfg(test)]
#[path = "../tests/completer_tests.rs"]
mod tests;
