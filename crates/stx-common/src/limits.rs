//! Centralized limits and thresholds for the completion engine.
//!
//! Search over constraint states is unbounded in general: rule expansion can
//! recurse forever and a specification may describe infinitely many terms.
//! The combinators bound search explicitly (`limit`, `single`) or implicitly
//! (`fix_set`); the limits below bound the remaining loops that live outside
//! the combinator library.
//!
//! # Categories
//!
//! - **Solver**: inference fixpoint and specification analysis
//! - **Resolution**: scope-graph traversal
//! - **Driver**: multi-placeholder completion rounds

// =============================================================================
// Solver Limits
// =============================================================================

/// Maximum number of constraint steps a single inference run may take.
///
/// Each step solves, delays or fails one constraint. A specification whose
/// rules keep producing new solvable constraints (for example
/// `P(x) :- P(S(x)).` applied to a ground argument) never reaches a fixpoint;
/// the solver reports `SolverError::StepLimitExceeded` instead of looping.
pub const MAX_INFERENCE_STEPS: u32 = 100_000;

/// Maximum iterations of the scope-extension fixpoint.
///
/// Every iteration adds at least one (predicate, parameter, edge) triple, so
/// the fixpoint is reached after at most `rules * params * labels` rounds.
/// The bound only protects against a broken monotonicity argument.
pub const MAX_EXTENSION_ITERATIONS: u32 = 1_000;

// =============================================================================
// Resolution Limits
// =============================================================================

/// Maximum path length explored by name resolution.
///
/// Paths never revisit a scope, so this only matters for very large graphs.
/// When exceeded, resolution fails with `ResolutionError::DepthExceeded`.
pub const MAX_RESOLUTION_DEPTH: u32 = 256;

// =============================================================================
// Driver Limits
// =============================================================================

/// Default maximum number of round-robin rounds of the completion driver.
///
/// A round that makes no progress already terminates the driver; this bound
/// catches specifications where every round makes "progress" by introducing
/// new placeholders forever.
pub const DEFAULT_MAX_COMPLETION_ROUNDS: u32 = 1_000;
