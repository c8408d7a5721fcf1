//! Expected completions of an incomplete program.
//!
//! The completeness harness starts from a complete program, cuts holes into
//! it with [`all_alternatives`] and checks that completion can fill them in
//! again. A [`CompletionExpectation`] holds the program with holes, the
//! subterm each hole is expected to become, and the solver state of the
//! last accepted proposal.

use crate::completer::Proposal;
use crate::placeholder::{PlaceholderPolicy, PlaceholderVarMap};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use stx_solver::SolverState;
use stx_terms::{MatchResult, Term, TermVar, Unifier, match_term};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExpectationError {
    #[error("incomplete term {incomplete} does not fit expected term {expected}")]
    Mismatch { incomplete: Term, expected: Term },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionExpectation {
    incomplete_ast: Term,
    expectations: IndexMap<TermVar, Term>,
    state: Option<SolverState>,
}

impl CompletionExpectation {
    /// Pairs the placeholders of `incomplete` with the subterms of `expected`
    /// at the same positions.
    ///
    /// Placeholders are replaced by fresh variables from `map`. Outside of
    /// placeholders both terms must be equal.
    pub fn from_term(
        incomplete: &Term,
        expected: &Term,
        map: &mut PlaceholderVarMap,
        policy: &dyn PlaceholderPolicy,
    ) -> Result<Self, ExpectationError> {
        let mut expectations = IndexMap::new();
        let incomplete_ast = pair(incomplete, expected, map, policy, &mut expectations)?;
        Ok(Self {
            incomplete_ast,
            expectations,
            state: None,
        })
    }

    pub fn with_state(self, state: SolverState) -> Self {
        Self {
            state: Some(state),
            ..self
        }
    }

    pub fn incomplete_ast(&self) -> &Term {
        &self.incomplete_ast
    }

    pub fn state(&self) -> Option<&SolverState> {
        self.state.as_ref()
    }

    pub fn expectations(&self) -> &IndexMap<TermVar, Term> {
        &self.expectations
    }

    pub fn expected(&self, var: &TermVar) -> Option<&Term> {
        self.expectations.get(var)
    }

    /// Open variables, oldest first.
    pub fn vars(&self) -> impl Iterator<Item = &TermVar> {
        self.expectations.keys()
    }

    pub fn open_count(&self) -> usize {
        self.expectations.len()
    }

    pub fn is_complete(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Fills in `var` with `proposal` if it fits the expected subterm.
    ///
    /// Variables of the proposal become open variables, expected to be the
    /// subterms they were matched against. Returns `None` if the proposal
    /// cannot produce the expected subterm.
    pub fn try_replace(&self, var: &TermVar, proposal: &Proposal) -> Option<Self> {
        let expected = self.expectations.get(var)?;
        let term = proposal.state.unifier().find_recursive(&proposal.term);
        let MatchResult::Yes(bindings) = match_term(&term, &|_| true, expected, &Unifier::new()) else {
            return None;
        };

        let mut expectations = self.expectations.clone();
        expectations.shift_remove(var);
        for new_var in term.vars() {
            let Some(sub) = bindings.get(&new_var) else {
                continue;
            };
            match expectations.get(&new_var) {
                Some(existing) if existing != sub => return None,
                Some(_) => {}
                None => {
                    expectations.insert(new_var, sub.clone());
                }
            }
        }

        let mut subst = FxHashMap::default();
        subst.insert(var.clone(), term);
        Some(Self {
            incomplete_ast: self.incomplete_ast.substitute(&subst),
            expectations,
            state: Some(proposal.state.clone()),
        })
    }
}

/// Every copy of `term` in which exactly one node is replaced by
/// `placeholder`, in pre-order: the first alternative is the placeholder
/// itself. There is one alternative per node of `term`.
pub fn all_alternatives(term: &Term, placeholder: &Term) -> Vec<Term> {
    let mut alternatives = Vec::with_capacity(term.size());
    alternatives.push(placeholder.clone());
    match term {
        Term::Appl { op, args } => {
            for (index, arg) in args.iter().enumerate() {
                for alternative in all_alternatives(arg, placeholder) {
                    let mut args = args.clone();
                    args[index] = alternative;
                    alternatives.push(Term::Appl { op: op.clone(), args });
                }
            }
        }
        Term::List(items) => {
            for (index, item) in items.iter().enumerate() {
                for alternative in all_alternatives(item, placeholder) {
                    let mut items = items.clone();
                    items[index] = alternative;
                    alternatives.push(Term::List(items));
                }
            }
        }
        Term::Str(_) | Term::Int(_) | Term::Var(_) | Term::Scope(_) => {}
    }
    alternatives
}

fn pair(
    incomplete: &Term,
    expected: &Term,
    map: &mut PlaceholderVarMap,
    policy: &dyn PlaceholderPolicy,
    expectations: &mut IndexMap<TermVar, Term>,
) -> Result<Term, ExpectationError> {
    if policy.is_placeholder(incomplete) {
        let var = map.add_placeholder(incomplete.clone());
        expectations.insert(var.clone(), expected.clone());
        return Ok(Term::Var(var));
    }
    let mismatch = || ExpectationError::Mismatch {
        incomplete: incomplete.clone(),
        expected: expected.clone(),
    };
    match (incomplete, expected) {
        (Term::Appl { op, args }, Term::Appl { op: expected_op, args: expected_args })
            if op == expected_op && args.len() == expected_args.len() =>
        {
            let args = args
                .iter()
                .zip(expected_args)
                .map(|(arg, expected)| pair(arg, expected, map, policy, expectations))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Term::Appl { op: op.clone(), args })
        }
        (Term::List(items), Term::List(expected_items)) if items.len() == expected_items.len() => {
            let items = items
                .iter()
                .zip(expected_items)
                .map(|(item, expected)| pair(item, expected, map, policy, expectations))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Term::List(items))
        }
        (a, b) if a == b => Ok(a.clone()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
#[path = "../tests/expectation_tests.rs"]
mod tests;
