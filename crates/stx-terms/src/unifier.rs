//! Persistent unifier.
//!
//! The unifier is a triangular substitution stored in an `im::OrdMap`:
//! a variable may be bound to a term that itself contains bound variables,
//! and lookups walk the chain. Extending the unifier returns a new value
//! that shares all untouched nodes with the old one, so solver states that
//! branch from a common ancestor only pay for their own bindings.
//!
//! The occurs check is always performed, so `find_recursive` terminates.

use crate::term::{Term, TermVar};
use im::OrdMap;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UnifyError {
    /// Two terms with different structure were unified.
    #[error("cannot unify {left} with {right}")]
    Mismatch { left: Term, right: Term },
    /// Binding the variable would create an infinite term.
    #[error("{var} occurs in {term}")]
    OccursCheck { var: TermVar, term: Term },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Unifier {
    bindings: OrdMap<TermVar, Term>,
}

impl Unifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn is_bound(&self, var: &TermVar) -> bool {
        self.bindings.contains_key(var)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&TermVar, &Term)> {
        self.bindings.iter()
    }

    /// Resolve the outermost variable chain of `term`.
    ///
    /// The result is either an unbound variable or a non-variable term whose
    /// subterms may still contain bound variables.
    pub fn find(&self, term: &Term) -> Term {
        let mut current = term;
        while let Term::Var(v) = current {
            match self.bindings.get(v) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.clone()
    }

    /// Fully instantiate `term`.
    pub fn find_recursive(&self, term: &Term) -> Term {
        match self.find(term) {
            Term::Appl { op, args } => Term::Appl {
                op,
                args: args.iter().map(|a| self.find_recursive(a)).collect(),
            },
            Term::List(items) => Term::List(items.iter().map(|a| self.find_recursive(a)).collect()),
            other => other,
        }
    }

    pub fn is_ground(&self, term: &Term) -> bool {
        match self.find(term) {
            Term::Var(_) => false,
            Term::Appl { args, .. } | Term::List(args) => args.iter().all(|a| self.is_ground(a)),
            Term::Str(_) | Term::Int(_) | Term::Scope(_) => true,
        }
    }

    /// Unbound variables of the instantiated term, in order of first occurrence.
    pub fn free_vars(&self, term: &Term) -> Vec<TermVar> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.find_recursive(term).collect_vars(&mut seen, &mut out);
        out
    }

    fn occurs(&self, var: &TermVar, term: &Term) -> bool {
        match self.find(term) {
            Term::Var(v) => &v == var,
            Term::Appl { args, .. } | Term::List(args) => args.iter().any(|a| self.occurs(var, a)),
            Term::Str(_) | Term::Int(_) | Term::Scope(_) => false,
        }
    }

    fn bind(&mut self, var: TermVar, term: Term) -> Result<(), UnifyError> {
        if self.occurs(&var, &term) {
            return Err(UnifyError::OccursCheck {
                var,
                term: self.find_recursive(&term),
            });
        }
        trace!(var = %var, term = %term, "bind");
        self.bindings.insert(var, term);
        Ok(())
    }

    /// Unify two terms, returning the extended unifier.
    pub fn unify(&self, left: &Term, right: &Term) -> Result<Unifier, UnifyError> {
        let mut result = self.clone();
        let mut work = vec![(left.clone(), right.clone())];
        while let Some((l, r)) = work.pop() {
            let l = result.find(&l);
            let r = result.find(&r);
            match (l, r) {
                (Term::Var(a), Term::Var(b)) if a == b => {}
                (Term::Var(v), t) | (t, Term::Var(v)) => result.bind(v, t)?,
                (Term::Appl { op: lop, args: largs }, Term::Appl { op: rop, args: rargs })
                    if lop == rop && largs.len() == rargs.len() =>
                {
                    work.extend(largs.into_iter().zip(rargs).rev());
                }
                (Term::List(litems), Term::List(ritems)) if litems.len() == ritems.len() => {
                    work.extend(litems.into_iter().zip(ritems).rev());
                }
                (l, r) if l == r => {}
                (l, r) => {
                    return Err(UnifyError::Mismatch {
                        left: result.find_recursive(&l),
                        right: result.find_recursive(&r),
                    });
                }
            }
        }
        Ok(result)
    }

    /// Unify pairwise; fails on the first pair that does not unify.
    pub fn unify_all<'a>(
        &self,
        pairs: impl IntoIterator<Item = (&'a Term, &'a Term)>,
    ) -> Result<Unifier, UnifyError> {
        let mut result = self.clone();
        for (l, r) in pairs {
            result = result.unify(l, r)?;
        }
        Ok(result)
    }

    pub fn are_unifiable(&self, left: &Term, right: &Term) -> bool {
        self.unify(left, right).is_ok()
    }

    /// Whether the two terms are equal under this unifier without binding anything.
    pub fn are_equal(&self, left: &Term, right: &Term) -> bool {
        self.find_recursive(left) == self.find_recursive(right)
    }
}

#[cfg(test)]
#[path = "../tests/unifier_tests.rs"]
mod tests;
