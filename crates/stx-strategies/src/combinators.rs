//! The combinator library.
//!
//! All combinators are lazy: they evaluate their argument strategies only
//! as far as the consumer pulls the resulting sequence. The exception is
//! [`glc`], whose condition is evaluated in full before either branch runs.

use crate::sequence::{SearchError, Seq};
use crate::strategy::{SearchContext, Strategy};
use rustc_hash::FxHashSet;
use std::cell::OnceCell;
use std::hash::Hash;
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Yields the input.
pub fn id<C, T>() -> Strategy<C, T, T>
where
    C: SearchContext + Clone + 'static,
    T: 'static,
{
    Strategy::new("id", |_, input| Seq::of(input))
}

/// Yields nothing.
pub fn fail<C, I, O>() -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: 'static,
    O: 'static,
{
    Strategy::new("fail", |_, _| Seq::empty())
}

/// Succeeds only if both strategies succeed; yields all of `first`, then
/// all of `second`.
pub fn and<C, I, O>(first: Strategy<C, I, O>, second: Strategy<C, I, O>) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: Clone + 'static,
    O: 'static,
{
    Strategy::new("and", move |ctx: &C, input: I| {
        let (first, second, ctx) = (first.clone(), second.clone(), ctx.clone());
        Seq::lazy(move || {
            let lead = match first.eval(&ctx, input.clone()).uncons() {
                Ok(Some(lead)) => lead,
                Ok(None) => return Seq::empty(),
                Err(err) => return Seq::error(err),
            };
            let tail = match second.eval(&ctx, input).uncons() {
                Ok(Some(tail)) => tail,
                Ok(None) => return Seq::empty(),
                Err(err) => return Seq::error(err),
            };
            Seq::of(lead.0)
                .chain(lead.1)
                .chain(Seq::of(tail.0))
                .chain(tail.1)
        })
    })
}

/// Yields all of `first`, then all of `second`.
pub fn or<C, I, O>(first: Strategy<C, I, O>, second: Strategy<C, I, O>) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: Clone + 'static,
    O: 'static,
{
    Strategy::new("or", move |ctx: &C, input: I| {
        let (second, ctx) = (second.clone(), ctx.clone());
        let rest = input.clone();
        first
            .eval(&ctx, input)
            .chain(Seq::lazy(move || second.eval(&ctx, rest)))
    })
}

/// Guarded choice.
///
/// Evaluates `condition` fully. If it yields anything, `on_success` is
/// applied to each of its outputs; otherwise `on_failure` is applied to the
/// original input.
pub fn glc<C, I, M, O>(
    condition: Strategy<C, I, M>,
    on_success: Strategy<C, M, O>,
    on_failure: Strategy<C, I, O>,
) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: Clone + 'static,
    M: 'static,
    O: 'static,
{
    Strategy::new("glc", move |ctx: &C, input: I| {
        let values = match condition.eval(ctx, input.clone()).collect_all() {
            Ok(values) => values,
            Err(err) => return Seq::error(err),
        };
        if values.is_empty() {
            return on_failure.eval(ctx, input);
        }
        let (on_success, ctx) = (on_success.clone(), ctx.clone());
        Seq::values(values).flat_map(move |value| on_success.eval(&ctx, value))
    })
}

/// At most `n` outputs of `strategy`.
pub fn limit<C, I, O>(n: usize, strategy: Strategy<C, I, O>) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: 'static,
    O: 'static,
{
    Strategy::new("limit", move |ctx: &C, input: I| {
        if n == 0 {
            return Seq::empty();
        }
        strategy.eval(ctx, input).take(n)
    })
}

/// The only output of `strategy`, if it has exactly one.
///
/// At most two outputs are forced to decide.
pub fn single<C, I, O>(strategy: Strategy<C, I, O>) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: 'static,
    O: 'static,
{
    Strategy::new("single", move |ctx: &C, input: I| {
        let (strategy, ctx) = (strategy.clone(), ctx.clone());
        Seq::lazy(move || {
            let mut outputs = strategy.eval(&ctx, input);
            let only = match outputs.next() {
                None => return Seq::empty(),
                Some(Err(err)) => return Seq::error(err),
                Some(Ok(only)) => only,
            };
            match outputs.next() {
                None => Seq::of(only),
                Some(Err(err)) => Seq::error(err),
                Some(Ok(_)) => Seq::empty(),
            }
        })
    })
}

/// Sequential composition: every output of `first` is fed into `second`.
pub fn seq<C, I, M, O>(first: Strategy<C, I, M>, second: Strategy<C, M, O>) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: 'static,
    M: 'static,
    O: 'static,
{
    let name = format!("{} ; {}", first.name(), second.name());
    Strategy::new(name, move |ctx: &C, input: I| {
        let (second, ctx) = (second.clone(), ctx.clone());
        first
            .eval(&ctx, input)
            .flat_map(move |value| second.eval(&ctx, value))
    })
}

/// The outputs of `strategy`, or the input if there are none.
pub fn try_<C, T>(strategy: Strategy<C, T, T>) -> Strategy<C, T, T>
where
    C: SearchContext + Clone + 'static,
    T: Clone + 'static,
{
    Strategy::new("try", move |ctx: &C, input: T| {
        let (strategy, ctx) = (strategy.clone(), ctx.clone());
        Seq::lazy(move || match strategy.eval(&ctx, input.clone()).uncons() {
            Ok(Some((first, rest))) => Seq::of(first).chain(rest),
            Ok(None) => Seq::of(input),
            Err(err) => Seq::error(err),
        })
    })
}

/// Applies `f` to every output of `strategy`.
pub fn map<C, I, M, O>(
    strategy: Strategy<C, I, M>,
    f: impl Fn(&C, M) -> O + 'static,
) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: 'static,
    M: 'static,
    O: 'static,
{
    let f = Rc::new(f);
    Strategy::new(strategy.name().to_string(), move |ctx: &C, input: I| {
        let (f, owned) = (f.clone(), ctx.clone());
        strategy.eval(ctx, input).map(move |value| f(&owned, value))
    })
}

/// Yields the input if `predicate` holds for it.
pub fn assert_that<C, T>(
    name: impl AsRef<str>,
    predicate: impl Fn(&C, &T) -> bool + 'static,
) -> Strategy<C, T, T>
where
    C: SearchContext + Clone + 'static,
    T: 'static,
{
    Strategy::new(name, move |ctx: &C, input: T| {
        if predicate(ctx, &input) {
            Seq::of(input)
        } else {
            Seq::empty()
        }
    })
}

/// Outputs of `strategy` with duplicates removed, first occurrence kept.
pub fn distinct<C, I, O>(strategy: Strategy<C, I, O>) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: 'static,
    O: Clone + Eq + Hash + 'static,
{
    Strategy::new("distinct", move |ctx: &C, input: I| {
        let mut seen = FxHashSet::default();
        strategy
            .eval(ctx, input)
            .filter(move |value| seen.insert(value.clone()))
    })
}

/// `strategy` under a different name in trace output.
pub fn named<C, I, O>(name: impl AsRef<str>, strategy: Strategy<C, I, O>) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: 'static,
    O: 'static,
{
    Strategy::new(name, move |ctx: &C, input: I| strategy.eval(ctx, input))
}

/// A strategy that is built afresh on every evaluation.
pub fn defer<C, I, O>(build: impl Fn() -> Strategy<C, I, O> + 'static) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: 'static,
    O: 'static,
{
    Strategy::new("defer", move |ctx: &C, input: I| build().eval(ctx, input))
}

// =============================================================================
// Repetition
// =============================================================================

/// Depth-first iteration of `strategy` until it fails.
///
/// Values on which `strategy` fails are yielded; values on which it
/// succeeds are replaced by its outputs. There is no cycle detection, so a
/// cyclic relation makes the sequence infinite.
pub fn repeat<C, T>(strategy: Strategy<C, T, T>) -> Strategy<C, T, T>
where
    C: SearchContext + Clone + 'static,
    T: Clone + 'static,
{
    Strategy::new("repeat", move |ctx: &C, input: T| {
        let (strategy, ctx) = (strategy.clone(), ctx.clone());
        let mut stack = vec![Seq::of(input)];
        Seq::new(std::iter::from_fn(move || {
            loop {
                let next = stack.last_mut()?.next();
                let value = match next {
                    None => {
                        stack.pop();
                        continue;
                    }
                    Some(Err(err)) => {
                        stack.clear();
                        return Some(Err(err));
                    }
                    Some(Ok(value)) => value,
                };
                match strategy.eval(&ctx, value.clone()).uncons() {
                    Ok(None) => return Some(Ok(value)),
                    Ok(Some((first, rest))) => stack.push(Seq::of(first).chain(rest)),
                    Err(err) => {
                        stack.clear();
                        return Some(Err(err));
                    }
                }
            }
        }))
    })
}

/// Cycle-safe [`repeat`].
///
/// A value seen for the first time is expanded by `strategy` (or yielded if
/// `strategy` fails on it). A value seen again is yielded once if it has
/// not been yielded yet and skipped otherwise, which cuts every cycle.
pub fn fix_set<C, T>(strategy: Strategy<C, T, T>) -> Strategy<C, T, T>
where
    C: SearchContext + Clone + 'static,
    T: Clone + Eq + Hash + 'static,
{
    Strategy::new("fix_set", move |ctx: &C, input: T| {
        let (strategy, ctx) = (strategy.clone(), ctx.clone());
        let mut stack = vec![Seq::of(input)];
        let mut visited: FxHashSet<T> = FxHashSet::default();
        let mut yielded: FxHashSet<T> = FxHashSet::default();
        Seq::new(std::iter::from_fn(move || {
            loop {
                let next = stack.last_mut()?.next();
                let value = match next {
                    None => {
                        stack.pop();
                        continue;
                    }
                    Some(Err(err)) => {
                        stack.clear();
                        return Some(Err(err));
                    }
                    Some(Ok(value)) => value,
                };
                if visited.contains(&value) {
                    if yielded.insert(value.clone()) {
                        return Some(Ok(value));
                    }
                    continue;
                }
                visited.insert(value.clone());
                match strategy.eval(&ctx, value.clone()).uncons() {
                    Ok(None) => {
                        yielded.insert(value.clone());
                        return Some(Ok(value));
                    }
                    Ok(Some((first, rest))) => stack.push(Seq::of(first).chain(rest)),
                    Err(err) => {
                        stack.clear();
                        return Some(Err(err));
                    }
                }
            }
        }))
    })
}

// =============================================================================
// Recursion
// =============================================================================

#[derive(Debug, Error)]
#[error("recursive strategy `{0}` used outside of its definition")]
struct DanglingRecursion(String);

/// A self-referential strategy.
///
/// `build` receives a handle that evaluates the strategy being built. The
/// handle must only be evaluated, not stored beyond the returned strategy.
pub fn rec<C, I, O>(
    name: impl AsRef<str>,
    build: impl FnOnce(Strategy<C, I, O>) -> Strategy<C, I, O>,
) -> Strategy<C, I, O>
where
    C: SearchContext + Clone + 'static,
    I: 'static,
    O: 'static,
{
    let name = name.as_ref().to_string();
    let cell: Rc<OnceCell<Strategy<C, I, O>>> = Rc::new(OnceCell::new());
    let weak: Weak<OnceCell<Strategy<C, I, O>>> = Rc::downgrade(&cell);
    let handle_name = name.clone();
    let handle = Strategy::new(&name, move |ctx: &C, input: I| {
        match weak.upgrade().and_then(|cell| cell.get().cloned()) {
            Some(body) => body.eval(ctx, input),
            None => Seq::error(SearchError::fatal(DanglingRecursion(handle_name.clone()))),
        }
    });
    let body = build(handle);
    let _ = cell.set(body.clone());
    Strategy::new(name, move |ctx: &C, input: I| {
        body.eval(ctx, input).keep_alive(cell.clone())
    })
}

#[cfg(test)]
#[path = "../tests/combinators_tests.rs"]
mod tests;
