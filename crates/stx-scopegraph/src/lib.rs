//! Scope graphs and name resolution.
//!
//! - [`ScopeGraph`]: persistent graph of scopes, labelled edges and data
//! - [`LabelRegex`], [`LabelOrder`]: path well-formedness and shadowing order
//! - [`NameResolution`]: query evaluation that refuses to answer while an
//!   edge on a reachable path may still be extended

pub mod label;
pub use label::{EdgeOrData, Label, LabelOrder, LabelParseError, LabelRegex};

pub mod graph;
pub use graph::ScopeGraph;

pub mod resolve;
pub use resolve::{Answer, CompletenessOracle, NameResolution, ResolutionError};
