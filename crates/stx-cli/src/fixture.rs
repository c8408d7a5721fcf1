//! Completion fixtures.
//!
//! A fixture is a JSON file with a specification, the name of its root
//! predicate and a program with placeholders. Terms are written in the
//! textual term syntax:
//!
//! ```json
//! {
//!   "spec": { "rules": [ ... ] },
//!   "root": "Program",
//!   "input": "Prog(Def(\"a\"), Ref(ID-Plhdr()))",
//!   "expected": "Prog(Def(\"a\"), Ref(\"a\"))",
//!   "options": { "max_rounds": 10 }
//! }
//! ```
//!
//! Without `policy` placeholders, injections and literals are recognised by
//! naming convention. Without `input`, the whole program is one default
//! placeholder.

use crate::args::DriverOverrides;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use stx_completions::{ConventionPolicy, DriverOptions, ExplicitPolicy, PlaceholderPolicy};
use stx_solver::Spec;
use stx_terms::Term;

#[derive(Clone, Debug, Deserialize)]
pub struct Fixture {
    #[serde(skip)]
    pub name: String,
    pub spec: Spec,
    pub root: String,
    #[serde(default)]
    pub input: Option<Term>,
    #[serde(default)]
    pub expected: Option<Term>,
    #[serde(default)]
    pub policy: Option<ExplicitPolicy>,
    #[serde(default)]
    pub options: DriverOptions,
}

impl Fixture {
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Fixture> {
        let name = name.into();
        let mut fixture: Fixture =
            serde_json::from_str(json).with_context(|| format!("invalid fixture `{name}`"))?;
        fixture.name = name;
        Ok(fixture)
    }

    /// Reads a fixture; its name is the file stem.
    pub fn load(path: &Path) -> Result<Fixture> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Fixture::from_json(name, &json)
    }

    pub fn policy(&self) -> Arc<dyn PlaceholderPolicy> {
        match &self.policy {
            Some(policy) => Arc::new(policy.clone()),
            None => Arc::new(ConventionPolicy),
        }
    }

    /// The program to complete.
    pub fn input(&self) -> Term {
        match &self.input {
            Some(input) => input.clone(),
            None => self.policy().default_placeholder(),
        }
    }

    pub fn options(&self, overrides: &DriverOverrides) -> DriverOptions {
        let mut options = self.options.clone();
        if let Some(max_rounds) = overrides.max_rounds {
            options.max_rounds = max_rounds;
        }
        if overrides.no_literal_fallback {
            options.literal_fallback = false;
        }
        if overrides.allow_input_errors {
            options.allow_input_errors = true;
        }
        options
    }
}

#[cfg(test)]
#[path = "../tests/fixture_tests.rs"]
mod tests;
