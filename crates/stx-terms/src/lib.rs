//! Terms and unification for the stx completion engine.
//!
//! - [`Term`]: immutable structural values (applications, lists, literals,
//!   scopes and logic variables) with a textual syntax (`Op(?x, "s", [1])`)
//! - [`Unifier`]: persistent substitution; every extension returns a new
//!   unifier and shares structure with the old one
//! - [`match_term`]: one-way matching that distinguishes "definitely not"
//!   from "not until some variable is instantiated"

pub mod term;
pub use term::{Scope, Term, TermVar};

pub mod parse;
pub use parse::ParseError;

pub mod unifier;
pub use unifier::{UnifyError, Unifier};

pub mod matching;
pub use matching::{MatchResult, match_term};
