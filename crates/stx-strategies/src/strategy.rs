//! Strategies and search contexts.

use crate::sequence::{SearchError, Seq};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

/// Context threaded through every strategy evaluation.
pub trait SearchContext {
    /// Polled before every advance of a strategy's output.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl SearchContext for () {}

/// Shared cancellation flag.
///
/// Cloning shares the flag, so a token handed to a running search can be
/// cancelled from the outside.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl SearchContext for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

/// A pure function from a context and an input to a lazy sequence of outputs.
pub struct Strategy<C, I, O> {
    name: Rc<str>,
    run: Rc<dyn Fn(&C, I) -> Seq<O>>,
}

impl<C, I, O> Clone for Strategy<C, I, O> {
    fn clone(&self) -> Self {
        Strategy {
            name: self.name.clone(),
            run: self.run.clone(),
        }
    }
}

impl<C, I, O> fmt::Debug for Strategy<C, I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Strategy").field(&self.name).finish()
    }
}

impl<C, I, O> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: 'static,
    O: 'static,
{
    pub fn new(name: impl AsRef<str>, run: impl Fn(&C, I) -> Seq<O> + 'static) -> Self {
        Strategy {
            name: Rc::from(name.as_ref()),
            run: Rc::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the strategy.
    ///
    /// The returned sequence stops with [`SearchError::Cancelled`] as soon
    /// as the context reports cancellation.
    pub fn eval(&self, ctx: &C, input: I) -> Seq<O> {
        if ctx.is_cancelled() {
            return Seq::error(SearchError::Cancelled);
        }
        trace!(strategy = %self.name, "eval");
        let watch = ctx.clone();
        (self.run)(ctx, input).interruptible(move || watch.is_cancelled())
    }

    /// Feeds every output of `self` into `next`.
    pub fn then<P: 'static>(&self, next: Strategy<C, O, P>) -> Strategy<C, I, P> {
        crate::combinators::seq(self.clone(), next)
    }
}

#[cfg(test)]
#[path = "../tests/strategy_tests.rs"]
mod tests;
