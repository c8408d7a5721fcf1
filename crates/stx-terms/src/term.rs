//! Term representation.
//!
//! Terms are plain immutable values compared structurally. Operators and
//! strings are reference counted so cloning a term is cheap relative to the
//! size of the tree.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A logic variable.
///
/// Variables created by the engine carry a `#n` suffix on top of the name
/// they were derived from (`x` becomes `x#3`). [`TermVar::base_name`] strips
/// that suffix again.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermVar {
    name: Arc<str>,
}

impl TermVar {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without the `#n` suffix added by [`TermVar::with_index`].
    pub fn base_name(&self) -> &str {
        match self.name.rsplit_once('#') {
            Some((base, index)) if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => {
                base
            }
            _ => &self.name,
        }
    }

    /// A variable derived from this one, numbered `index`.
    pub fn with_index(&self, index: u32) -> Self {
        Self::new(format!("{}#{index}", self.base_name()))
    }
}

impl fmt::Display for TermVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

/// A scope of the scope graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Scope(pub u32);

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An immutable term.
///
/// Tuples are applications with an empty operator. In serialized form a
/// term is its textual syntax, see [`crate::parse`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Term {
    Appl { op: Arc<str>, args: Vec<Term> },
    List(Vec<Term>),
    Str(Arc<str>),
    Int(i64),
    Var(TermVar),
    Scope(Scope),
}

impl Term {
    pub fn appl(op: impl AsRef<str>, args: impl IntoIterator<Item = Term>) -> Self {
        Term::Appl {
            op: Arc::from(op.as_ref()),
            args: args.into_iter().collect(),
        }
    }

    pub fn tuple(args: impl IntoIterator<Item = Term>) -> Self {
        Self::appl("", args)
    }

    pub fn list(items: impl IntoIterator<Item = Term>) -> Self {
        Term::List(items.into_iter().collect())
    }

    pub fn string(value: impl AsRef<str>) -> Self {
        Term::Str(Arc::from(value.as_ref()))
    }

    pub fn int(value: i64) -> Self {
        Term::Int(value)
    }

    pub fn var(name: impl AsRef<str>) -> Self {
        Term::Var(TermVar::new(name))
    }

    pub fn scope(scope: Scope) -> Self {
        Term::Scope(scope)
    }

    pub fn as_var(&self) -> Option<&TermVar> {
        match self {
            Term::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_scope(&self) -> Option<Scope> {
        match self {
            Term::Scope(s) => Some(*s),
            _ => None,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// Operator of an application, `None` for other terms.
    pub fn op(&self) -> Option<&str> {
        match self {
            Term::Appl { op, .. } => Some(op),
            _ => None,
        }
    }

    /// Arguments of an application, empty for other terms.
    pub fn args(&self) -> &[Term] {
        match self {
            Term::Appl { args, .. } => args,
            _ => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.args().len()
    }

    /// Whether the term is a string or integer literal.
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Str(_) | Term::Int(_))
    }

    /// Whether the term contains no variables, without consulting a unifier.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Var(_) => false,
            Term::Appl { args, .. } | Term::List(args) => args.iter().all(Term::is_ground),
            Term::Str(_) | Term::Int(_) | Term::Scope(_) => true,
        }
    }

    pub fn contains_var(&self, var: &TermVar) -> bool {
        match self {
            Term::Var(v) => v == var,
            Term::Appl { args, .. } | Term::List(args) => args.iter().any(|a| a.contains_var(var)),
            Term::Str(_) | Term::Int(_) | Term::Scope(_) => false,
        }
    }

    /// Variables of the term in order of first occurrence.
    pub fn vars(&self) -> Vec<TermVar> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.collect_vars(&mut seen, &mut out);
        out
    }

    pub(crate) fn collect_vars(&self, seen: &mut FxHashSet<TermVar>, out: &mut Vec<TermVar>) {
        match self {
            Term::Var(v) => {
                if seen.insert(v.clone()) {
                    out.push(v.clone());
                }
            }
            Term::Appl { args, .. } | Term::List(args) => {
                for arg in args {
                    arg.collect_vars(seen, out);
                }
            }
            Term::Str(_) | Term::Int(_) | Term::Scope(_) => {}
        }
    }

    /// Replace variables by the terms they map to. Unmapped variables stay.
    pub fn substitute(&self, subst: &FxHashMap<TermVar, Term>) -> Term {
        if subst.is_empty() {
            return self.clone();
        }
        match self {
            Term::Var(v) => subst.get(v).cloned().unwrap_or_else(|| self.clone()),
            Term::Appl { op, args } => Term::Appl {
                op: op.clone(),
                args: args.iter().map(|a| a.substitute(subst)).collect(),
            },
            Term::List(items) => Term::List(items.iter().map(|a| a.substitute(subst)).collect()),
            Term::Str(_) | Term::Int(_) | Term::Scope(_) => self.clone(),
        }
    }

    /// Number of nodes in the term.
    pub fn size(&self) -> usize {
        match self {
            Term::Appl { args, .. } | Term::List(args) => 1 + args.iter().map(Term::size).sum::<usize>(),
            _ => 1,
        }
    }
}

impl From<TermVar> for Term {
    fn from(var: TermVar) -> Self {
        Term::Var(var)
    }
}

impl From<Scope> for Term {
    fn from(scope: Scope) -> Self {
        Term::Scope(scope)
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Term]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Appl { op, args } => {
                write!(f, "{op}(")?;
                write_args(f, args)?;
                f.write_str(")")
            }
            Term::List(items) => {
                f.write_str("[")?;
                write_args(f, items)?;
                f.write_str("]")
            }
            Term::Str(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Term::Int(i) => write!(f, "{i}"),
            Term::Var(v) => write!(f, "{v}"),
            Term::Scope(s) => write!(f, "{s}"),
        }
    }
}

impl From<Term> for String {
    fn from(term: Term) -> Self {
        term.to_string()
    }
}

#[cfg(test)]
#[path = "../tests/term_tests.rs"]
mod tests;
