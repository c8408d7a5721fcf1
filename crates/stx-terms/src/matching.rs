//! One-way matching of patterns against terms.
//!
//! Rule heads and data well-formedness patterns are matched against terms
//! that may still contain unbound variables. Matching never binds a variable
//! of the matched term; when the outcome depends on how such a variable is
//! instantiated the result is [`MatchResult::Maybe`] with the variables that
//! block the decision.
//!
//! Pattern variables for which `bindable` returns `true` are bound by the
//! match. Other pattern variables are rigid: they are looked up in the
//! unifier and must be equal to the corresponding subterm.

use crate::term::{Term, TermVar};
use crate::unifier::Unifier;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchResult {
    /// The pattern matches; bindings for the bindable pattern variables.
    Yes(FxHashMap<TermVar, Term>),
    /// The pattern can never match, whatever the instantiation.
    No,
    /// The pattern matches only under some instantiation of these variables.
    Maybe(Vec<TermVar>),
}

impl MatchResult {
    pub fn is_yes(&self) -> bool {
        matches!(self, MatchResult::Yes(_))
    }

    pub fn is_no(&self) -> bool {
        matches!(self, MatchResult::No)
    }

    /// Whether the pattern matches now or may match later.
    pub fn is_possible(&self) -> bool {
        !self.is_no()
    }
}

struct Matcher<'a> {
    bindable: &'a dyn Fn(&TermVar) -> bool,
    unifier: &'a Unifier,
    bindings: FxHashMap<TermVar, Term>,
    blocking: Vec<TermVar>,
    seen: FxHashSet<TermVar>,
    failed: bool,
}

impl Matcher<'_> {
    fn block_on(&mut self, term: &Term) {
        for var in self.unifier.free_vars(term) {
            if self.seen.insert(var.clone()) {
                self.blocking.push(var);
            }
        }
    }

    fn go(&mut self, pattern: &Term, term: &Term) {
        if self.failed {
            return;
        }
        if let Term::Var(pv) = pattern {
            if (self.bindable)(pv) {
                match self.bindings.get(pv).cloned() {
                    // Non-linear pattern: both occurrences must agree.
                    Some(prev) => {
                        let a = self.unifier.find_recursive(&prev);
                        let b = self.unifier.find_recursive(term);
                        if a != b {
                            if self.unifier.are_unifiable(&a, &b) {
                                self.block_on(&a);
                                self.block_on(&b);
                            } else {
                                self.failed = true;
                            }
                        }
                    }
                    None => {
                        self.bindings.insert(pv.clone(), term.clone());
                    }
                }
                return;
            }
        }

        let p = self.unifier.find(pattern);
        let t = self.unifier.find(term);
        match (&p, &t) {
            (Term::Var(a), Term::Var(b)) if a == b => {}
            (Term::Var(_), _) => {
                if self.unifier.are_unifiable(&p, &t) {
                    self.block_on(&p);
                    self.block_on(&t);
                } else {
                    self.failed = true;
                }
            }
            (_, Term::Var(_)) => self.block_on(&t),
            (Term::Appl { op: pop, args: pargs }, Term::Appl { op: top, args: targs }) => {
                if pop != top || pargs.len() != targs.len() {
                    self.failed = true;
                    return;
                }
                for (pa, ta) in pargs.iter().zip(targs) {
                    self.go(pa, ta);
                }
            }
            (Term::List(pitems), Term::List(titems)) => {
                if pitems.len() != titems.len() {
                    self.failed = true;
                    return;
                }
                for (pa, ta) in pitems.iter().zip(titems) {
                    self.go(pa, ta);
                }
            }
            (p, t) => {
                if p != t {
                    self.failed = true;
                }
            }
        }
    }
}

/// Match `pattern` against `term` under `unifier`.
///
/// A structural mismatch anywhere makes the result [`MatchResult::No`], even
/// when other positions are undecided.
pub fn match_term(
    pattern: &Term,
    bindable: &dyn Fn(&TermVar) -> bool,
    term: &Term,
    unifier: &Unifier,
) -> MatchResult {
    let mut matcher = Matcher {
        bindable,
        unifier,
        bindings: FxHashMap::default(),
        blocking: Vec::new(),
        seen: FxHashSet::default(),
        failed: false,
    };
    matcher.go(pattern, term);
    if matcher.failed {
        MatchResult::No
    } else if !matcher.blocking.is_empty() {
        MatchResult::Maybe(matcher.blocking)
    } else {
        MatchResult::Yes(matcher.bindings)
    }
}

#[cfg(test)]
#[path = "../tests/matching_tests.rs"]
mod tests;
