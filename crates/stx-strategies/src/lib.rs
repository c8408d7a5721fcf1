//! Nondeterministic search as lazy sequences.
//!
//! A [`Strategy`] maps a context and an input to a [`Seq`] of outputs.
//! Failure is an empty sequence. The only errors that travel through a
//! sequence are [`SearchError::Cancelled`] and [`SearchError::Fatal`].
//!
//! - [`sequence`]: the sequence type and its error
//! - [`strategy`]: strategies, search contexts and cancellation
//! - [`combinators`]: `id`, `fail`, `and`, `or`, `glc`, `limit`, `single`,
//!   `repeat`, `fix_set`, `rec` and friends

pub mod sequence;
pub use sequence::{SearchError, Seq};

pub mod strategy;
pub use strategy::{CancellationToken, SearchContext, Strategy};

pub mod combinators;
pub use combinators::{
    and, assert_that, defer, distinct, fail, fix_set, glc, id, limit, map, named, or, rec,
    repeat, seq, single, try_,
};
