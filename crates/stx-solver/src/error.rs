//! Solver errors.
//!
//! These are the unexpected outcomes that terminate a completion request.
//! Constraint failures are not errors; they become messages in the state.

use stx_scopegraph::ResolutionError;
use stx_strategies::SearchError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("call of undefined predicate `{0}`")]
    UnknownPredicate(String),
    /// A strategy focused a constraint that is not active in its own state.
    #[error("focused constraint {0} is not active")]
    FocusNotActive(String),
    #[error("inference did not reach a fixpoint within {0} steps")]
    StepLimitExceeded(u32),
    /// Resolution failed with something other than an incomplete edge.
    #[error("unexpected resolution outcome: {0}")]
    Resolution(#[from] ResolutionError),
}

impl From<SolverError> for SearchError {
    fn from(err: SolverError) -> Self {
        SearchError::fatal(err)
    }
}
