//! Search context for strategies over solver states.

use crate::constraint::Constraint;
use crate::spec::Spec;
use im::OrdSet;
use std::sync::Arc;
use stx_strategies::{CancellationToken, SearchContext};
use stx_terms::TermVar;

/// Immutable context of a completion search.
///
/// Carries the specification, the placeholder variable being completed
/// (for diagnostics only), the errors that were already present in the
/// input and a cancellation token. A new context is built when the focus
/// changes.
#[derive(Clone, Debug)]
pub struct SolverContext {
    spec: Arc<Spec>,
    focus: Option<TermVar>,
    allowed_errors: OrdSet<Constraint>,
    cancellation: CancellationToken,
}

impl SolverContext {
    pub fn new(spec: Arc<Spec>) -> Self {
        Self {
            spec,
            focus: None,
            allowed_errors: OrdSet::new(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_focus(&self, var: TermVar) -> Self {
        Self {
            focus: Some(var),
            ..self.clone()
        }
    }

    /// Errors caused by these constraints do not invalidate a state.
    pub fn with_allowed_errors(&self, allowed: OrdSet<Constraint>) -> Self {
        Self {
            allowed_errors: allowed,
            ..self.clone()
        }
    }

    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancellation: token,
            ..self.clone()
        }
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn shared_spec(&self) -> &Arc<Spec> {
        &self.spec
    }

    pub fn focus(&self) -> Option<&TermVar> {
        self.focus.as_ref()
    }

    pub fn allowed_errors(&self) -> &OrdSet<Constraint> {
        &self.allowed_errors
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl SearchContext for SolverContext {
    fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
