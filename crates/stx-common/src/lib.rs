//! Common types and utilities for the stx completion engine.
//!
//! This crate provides foundational types used across all stx crates:
//! - Diagnostic messages attached to constraints (`Message`, `Severity`)
//! - Engine limits and thresholds

// Diagnostics carried by solver states
pub mod diagnostics;
pub use diagnostics::{Message, Severity};

// Centralized limits and thresholds
pub mod limits;
