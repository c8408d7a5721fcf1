//! Focusing on a single active constraint.

use crate::constraint::Constraint;
use crate::context::SolverContext;
use crate::error::SolverError;
use crate::state::SolverState;
use std::fmt;
use std::rc::Rc;
use stx_strategies::{Seq, Strategy};

/// A state together with one of its active constraints.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FocusedState {
    state: SolverState,
    focus: Constraint,
}

impl FocusedState {
    pub fn new(state: SolverState, focus: Constraint) -> Result<Self, SolverError> {
        if !state.is_active(&focus) {
            return Err(SolverError::FocusNotActive(focus.to_string()));
        }
        Ok(Self { state, focus })
    }

    pub fn state(&self) -> &SolverState {
        &self.state
    }

    pub fn focus(&self) -> &Constraint {
        &self.focus
    }

    pub fn into_state(self) -> SolverState {
        self.state
    }
}

impl fmt::Display for FocusedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "focus: {}", self.focus)?;
        write!(f, "{}", self.state)
    }
}

/// Focuses every active constraint accepted by `select`, in set order.
pub fn focus_constraint(
    name: &str,
    select: impl Fn(&SolverContext, &SolverState, &Constraint) -> bool + 'static,
) -> Strategy<SolverContext, SolverState, FocusedState> {
    let select = Rc::new(select);
    Strategy::new(name, move |ctx: &SolverContext, state: SolverState| {
        let (select, ctx) = (select.clone(), ctx.clone());
        let candidates = state.constraints().clone();
        let selecting = state.clone();
        Seq::values(candidates)
            .filter(move |constraint| select(&ctx, &selecting, constraint))
            .map(move |constraint| FocusedState {
                state: state.clone(),
                focus: constraint,
            })
    })
}

/// Forgets the focus.
pub fn unfocus() -> Strategy<SolverContext, FocusedState, SolverState> {
    Strategy::new("unfocus", |_, focused: FocusedState| Seq::of(focused.state))
}

#[cfg(test)]
#[path = "../tests/focus_tests.rs"]
mod tests;
