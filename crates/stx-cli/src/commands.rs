//! The `complete` and `check` commands.

use crate::args::DriverOverrides;
use crate::fixture::Fixture;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::sync::Arc;
use stx_completions::{
    CompletionDriver, CompletionStats, PlaceholderVarMap, TermCompleter, all_alternatives,
    replace_placeholders_by_variables,
};
use stx_solver::SolverContext;
use stx_terms::Term;
use tracing::info;

/// Proposals for one placeholder of the input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlaceholderProposals {
    pub var: String,
    pub placeholder: Term,
    pub proposals: Vec<Term>,
}

/// Computes the proposals for every placeholder of the fixture's input, or
/// for `only` if given.
pub fn complete_fixture(fixture: &Fixture, only: Option<&str>) -> Result<Vec<PlaceholderProposals>> {
    let policy = fixture.policy();
    let driver = CompletionDriver::new(TermCompleter::new(policy.clone()), fixture.options.clone());
    let ctx = SolverContext::new(Arc::new(fixture.spec.clone()));

    let mut map = PlaceholderVarMap::default();
    let program = replace_placeholders_by_variables(&fixture.input(), &mut map, policy.as_ref());
    if map.is_empty() {
        bail!("the input of `{}` has no placeholders", fixture.name);
    }
    let (ctx, state) = driver
        .analyze(&ctx, &fixture.root, &program, &map)
        .with_context(|| format!("failed to analyze `{}`", fixture.name))?;

    let mut results = Vec::new();
    for var in map.vars() {
        if only.is_some_and(|name| name != var.name()) {
            continue;
        }
        let proposals = driver
            .completer()
            .proposal_terms(&ctx, &state, var, &map)
            .with_context(|| format!("failed to complete {var}"))?;
        let placeholder = map.placeholder(var).cloned().unwrap_or_else(|| policy.default_placeholder());
        results.push(PlaceholderProposals {
            var: var.name().to_string(),
            placeholder,
            proposals,
        });
    }
    if let Some(name) = only {
        if results.is_empty() {
            bail!("`{}` has no placeholder variable `{name}`", fixture.name);
        }
    }
    Ok(results)
}

/// Outcome of completing one fixture towards its expected program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<Term>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CompletionStats>,
}

/// Completes the fixture's input towards its expected program.
///
/// Completion failures are reported, not returned; only a fixture without
/// an expected program is an error.
pub fn check_fixture(fixture: &Fixture, overrides: &DriverOverrides) -> Result<CheckReport> {
    let expected = expected_program(fixture)?;
    let driver = CompletionDriver::new(TermCompleter::new(fixture.policy()), fixture.options(overrides));
    let ctx = SolverContext::new(Arc::new(fixture.spec.clone()));
    Ok(check_input(&driver, &ctx, fixture, fixture.name.clone(), &fixture.input(), expected))
}

/// Checks one case per node of the expected program: the program with that
/// node replaced by a placeholder. Cases are named `<fixture>#<index>`.
pub fn check_all_holes(fixture: &Fixture, overrides: &DriverOverrides) -> Result<Vec<CheckReport>> {
    let expected = expected_program(fixture)?;
    let policy = fixture.policy();
    let driver = CompletionDriver::new(TermCompleter::new(policy.clone()), fixture.options(overrides));
    let ctx = SolverContext::new(Arc::new(fixture.spec.clone()));
    let reports = all_alternatives(expected, &policy.default_placeholder())
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let name = format!("{}#{index:04}", fixture.name);
            check_input(&driver, &ctx, fixture, name, input, expected)
        })
        .collect();
    Ok(reports)
}

fn expected_program(fixture: &Fixture) -> Result<&Term> {
    match &fixture.expected {
        Some(expected) => Ok(expected),
        None => bail!("fixture `{}` has no expected program", fixture.name),
    }
}

fn check_input(
    driver: &CompletionDriver,
    ctx: &SolverContext,
    fixture: &Fixture,
    name: String,
    input: &Term,
    expected: &Term,
) -> CheckReport {
    let report = match driver.complete_program(ctx, &fixture.root, input, expected) {
        Ok(outcome) => CheckReport {
            name,
            passed: outcome.program() == expected,
            program: Some(outcome.program().clone()),
            error: None,
            stats: Some(outcome.stats),
        },
        Err(err) => CheckReport {
            name,
            passed: false,
            program: None,
            error: Some(err.to_string()),
            stats: None,
        },
    };
    info!(case = %report.name, passed = report.passed, "checked");
    report
}

#[cfg(test)]
#[path = "../tests/commands_tests.rs"]
mod tests;
