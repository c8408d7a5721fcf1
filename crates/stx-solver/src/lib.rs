//! Constraint solving for the stx completion engine.
//!
//! - [`Constraint`]: the closed set of constraint kinds
//! - [`Spec`]: predicate rules, label alphabet, scope extensions
//! - [`apply_rules`]: strict and relaxed rule application
//! - [`Completeness`]: index of critical edges that may still be extended
//! - [`SolverState`]: immutable snapshot of solving progress
//! - [`infer`]: reference inference solver
//! - [`SolverContext`], [`FocusedState`]: search context and focused states
//!   for strategies over solver states

pub mod constraint;
pub use constraint::{Constraint, DataEquiv, DataWf, QueryFilter, QueryMin};

pub mod spec;
pub use spec::{Rule, Spec, SpecDef, SpecError};

pub mod store;
pub use store::Store;

pub mod error;
pub use error::SolverError;

pub mod apply;
pub use apply::{Application, ApplyMode, ApplyResult, apply_rules};

pub mod completeness;
pub use completeness::{Completeness, CriticalEdge, critical_edges};

pub mod delay;
pub use delay::Delay;

pub mod query;
pub use query::{DataWfMode, data_equiv_is_always, resolve_query};

pub mod state;
pub use state::SolverState;

pub mod infer;
pub use infer::{SolverResult, infer};

pub mod context;
pub use context::SolverContext;

pub mod focus;
pub use focus::{FocusedState, focus_constraint, unfocus};
