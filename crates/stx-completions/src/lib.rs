//! Code completion by constraint solving.
//!
//! Placeholders in an incomplete program become logic variables. The
//! program is solved against the type-system rules, and the expansion
//! strategies explore the rule applications that can bind a variable; every
//! valid state they reach proposes a value for it.
//!
//! - [`placeholder`]: placeholder policy and the placeholder/variable map
//! - [`stuck`]: detection of queries that must wait for the scope graph
//! - [`expand`]: the expansion strategies
//! - [`TermCompleter`]: proposals for one variable
//! - [`CompletionExpectation`], [`CompletionDriver`]: completion of every
//!   placeholder of a program towards a known result

pub mod placeholder;
pub use placeholder::{
    ConventionPolicy, ExplicitPolicy, PlaceholderPolicy, PlaceholderVarMap,
    replace_placeholders_by_variables, replace_variables_by_placeholders,
};

pub mod stuck;
pub use stuck::{delay_stuck_queries, stuck_queries};

pub mod expand;

pub mod completer;
pub use completer::{Proposal, TermCompleter};

pub mod expectation;
pub use expectation::{CompletionExpectation, ExpectationError, all_alternatives};

pub mod stats;
pub use stats::CompletionStats;

pub mod driver;
pub use driver::{CompletionDriver, CompletionError, CompletionOutcome, DriverOptions};
