//! Diagnostic messages produced by constraint solving.
//!
//! Messages are keyed by the constraint that produced them and live inside
//! the solver state. Only [`Severity::Error`] invalidates a state for
//! completion; warnings and notes are informational.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    pub const fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

impl Message {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, text)
    }

    pub fn note(text: impl Into<String>) -> Self {
        Self::new(Severity::Note, text)
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.text)
    }
}

/// Replace `{0}`, `{1}`, ... placeholders in a message template.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Message templates used by the inference solver.
pub mod templates {
    pub const CANNOT_UNIFY: &str = "Cannot unify {0} with {1}";
    pub const TERMS_EQUAL: &str = "Expected {0} to differ from {1}";
    pub const NO_RULE_APPLIES: &str = "No rule of {0} applies to {1}";
    pub const SCOPE_ALREADY_BOUND: &str = "Cannot create a new scope for {0}: already bound to {1}";
    pub const NOT_A_SCOPE: &str = "Expected a scope, got {0}";
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
