//! Constraints.
//!
//! A closed set of constraint kinds. Every consumer matches exhaustively, so
//! adding a kind is a compile error at each place that has to handle it.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use stx_scopegraph::{Label, LabelOrder, LabelRegex};
use stx_terms::{Term, TermVar};

/// Data well-formedness of a query: a datum is accepted if `pattern`
/// matches it. `locals` are bound by the match; every other variable of
/// `pattern` refers to the enclosing constraint.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DataWf {
    #[serde(default)]
    pub locals: Vec<TermVar>,
    pub pattern: Term,
}

impl DataWf {
    /// Accepts every datum.
    pub fn any() -> Self {
        let local = TermVar::new("d");
        DataWf {
            locals: vec![local.clone()],
            pattern: Term::Var(local),
        }
    }

    /// Variables of the pattern that are not local.
    pub fn free_vars(&self) -> Vec<TermVar> {
        self.pattern
            .vars()
            .into_iter()
            .filter(|v| !self.locals.contains(v))
            .collect()
    }

    fn substitute(&self, subst: &FxHashMap<TermVar, Term>) -> DataWf {
        let subst = without(subst, &self.locals);
        DataWf {
            locals: self.locals.clone(),
            pattern: self.pattern.substitute(&subst),
        }
    }
}

/// Data equivalence used for shadowing.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataEquiv {
    /// Any two data are equivalent; preferred answers shadow all others.
    Always,
    /// No two data are equivalent; nothing is shadowed.
    Never,
    /// Equivalence given by a binary predicate of the specification.
    Rule(Arc<str>),
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryFilter {
    pub label_wf: LabelRegex,
    pub data_wf: DataWf,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryMin {
    #[serde(default)]
    pub label_order: LabelOrder,
    pub data_equiv: DataEquiv,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Constraint {
    /// Call of a user-defined predicate.
    User { name: Arc<str>, args: Vec<Term> },
    /// Name resolution query; `result` is unified with the list of answers.
    ResolveQuery {
        scope: Term,
        filter: QueryFilter,
        min: QueryMin,
        result: Term,
    },
    Equal(Term, Term),
    Inequal(Term, Term),
    /// Conjunction; the empty conjunction is `true`.
    Conj(Vec<Constraint>),
    Exists { vars: Vec<TermVar>, body: Box<Constraint> },
    /// Binds `var` to a new scope.
    NewScope { var: TermVar },
    TellEdge { source: Term, label: Label, target: Term },
    /// Adds `datum` to the data of `scope`.
    TellRel { scope: Term, datum: Term },
}

impl Constraint {
    pub fn truth() -> Self {
        Constraint::Conj(Vec::new())
    }

    pub fn user(name: impl AsRef<str>, args: impl IntoIterator<Item = Term>) -> Self {
        Constraint::User {
            name: Arc::from(name.as_ref()),
            args: args.into_iter().collect(),
        }
    }

    pub fn equal(left: Term, right: Term) -> Self {
        Constraint::Equal(left, right)
    }

    pub fn exists(vars: impl IntoIterator<Item = TermVar>, body: Constraint) -> Self {
        Constraint::Exists {
            vars: vars.into_iter().collect(),
            body: Box::new(body),
        }
    }

    /// A conjunction, flattened; a single constraint is returned as is.
    pub fn conj(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        let mut flat = Vec::new();
        for c in constraints {
            match c {
                Constraint::Conj(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Constraint::Conj(flat)
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Constraint::User { .. })
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Constraint::ResolveQuery { .. })
    }

    /// Arguments of a predicate call, empty for other constraints.
    pub fn user_args(&self) -> &[Term] {
        match self {
            Constraint::User { args, .. } => args,
            _ => &[],
        }
    }

    /// Free variables in order of first occurrence.
    pub fn free_vars(&self) -> Vec<TermVar> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.collect_free_vars(&[], &mut seen, &mut out);
        out
    }

    fn collect_free_vars(
        &self,
        bound: &[TermVar],
        seen: &mut FxHashSet<TermVar>,
        out: &mut Vec<TermVar>,
    ) {
        match self {
            Constraint::User { args, .. } => {
                for arg in args {
                    push_vars(arg, bound, seen, out);
                }
            }
            Constraint::ResolveQuery {
                scope,
                filter,
                result,
                ..
            } => {
                push_vars(scope, bound, seen, out);
                let mut inner = bound.to_vec();
                inner.extend(filter.data_wf.locals.iter().cloned());
                push_vars(&filter.data_wf.pattern, &inner, seen, out);
                push_vars(result, bound, seen, out);
            }
            Constraint::Equal(l, r) | Constraint::Inequal(l, r) => {
                push_vars(l, bound, seen, out);
                push_vars(r, bound, seen, out);
            }
            Constraint::Conj(cs) => {
                for c in cs {
                    c.collect_free_vars(bound, seen, out);
                }
            }
            Constraint::Exists { vars, body } => {
                let mut inner = bound.to_vec();
                inner.extend(vars.iter().cloned());
                body.collect_free_vars(&inner, seen, out);
            }
            Constraint::NewScope { var } => push_vars(&Term::Var(var.clone()), bound, seen, out),
            Constraint::TellEdge { source, target, .. } => {
                push_vars(source, bound, seen, out);
                push_vars(target, bound, seen, out);
            }
            Constraint::TellRel { scope, datum } => {
                push_vars(scope, bound, seen, out);
                push_vars(datum, bound, seen, out);
            }
        }
    }

    /// Replace free variables. Variables bound by `Exists` or by data
    /// well-formedness locals are left alone.
    pub fn substitute(&self, subst: &FxHashMap<TermVar, Term>) -> Constraint {
        if subst.is_empty() {
            return self.clone();
        }
        match self {
            Constraint::User { name, args } => Constraint::User {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(subst)).collect(),
            },
            Constraint::ResolveQuery {
                scope,
                filter,
                min,
                result,
            } => Constraint::ResolveQuery {
                scope: scope.substitute(subst),
                filter: QueryFilter {
                    label_wf: filter.label_wf.clone(),
                    data_wf: filter.data_wf.substitute(subst),
                },
                min: min.clone(),
                result: result.substitute(subst),
            },
            Constraint::Equal(l, r) => Constraint::Equal(l.substitute(subst), r.substitute(subst)),
            Constraint::Inequal(l, r) => {
                Constraint::Inequal(l.substitute(subst), r.substitute(subst))
            }
            Constraint::Conj(cs) => Constraint::Conj(cs.iter().map(|c| c.substitute(subst)).collect()),
            Constraint::Exists { vars, body } => Constraint::Exists {
                vars: vars.clone(),
                body: Box::new(body.substitute(&without(subst, vars))),
            },
            Constraint::NewScope { var } => match subst.get(var) {
                // Renaming only; a new scope cannot be created for a non-variable.
                Some(Term::Var(renamed)) => Constraint::NewScope {
                    var: renamed.clone(),
                },
                _ => self.clone(),
            },
            Constraint::TellEdge {
                source,
                label,
                target,
            } => Constraint::TellEdge {
                source: source.substitute(subst),
                label: label.clone(),
                target: target.substitute(subst),
            },
            Constraint::TellRel { scope, datum } => Constraint::TellRel {
                scope: scope.substitute(subst),
                datum: datum.substitute(subst),
            },
        }
    }

    /// Predicate calls directly or transitively contained in this constraint.
    pub fn calls(&self) -> Vec<(&str, usize)> {
        let mut out = Vec::new();
        self.collect_calls(&mut out);
        out
    }

    fn collect_calls<'a>(&'a self, out: &mut Vec<(&'a str, usize)>) {
        match self {
            Constraint::User { name, args } => out.push((&**name, args.len())),
            Constraint::ResolveQuery { min, .. } => {
                if let DataEquiv::Rule(name) = &min.data_equiv {
                    out.push((&**name, 2));
                }
            }
            Constraint::Conj(cs) => {
                for c in cs {
                    c.collect_calls(out);
                }
            }
            Constraint::Exists { body, .. } => body.collect_calls(out),
            Constraint::Equal(..)
            | Constraint::Inequal(..)
            | Constraint::NewScope { .. }
            | Constraint::TellEdge { .. }
            | Constraint::TellRel { .. } => {}
        }
    }

    /// Edge labels mentioned by this constraint.
    pub fn labels(&self) -> Vec<Label> {
        let mut out = Vec::new();
        self.collect_labels(&mut out);
        out
    }

    fn collect_labels(&self, out: &mut Vec<Label>) {
        match self {
            Constraint::TellEdge { label, .. } => {
                if !out.contains(label) {
                    out.push(label.clone());
                }
            }
            Constraint::ResolveQuery { filter, min, .. } => {
                let mut mentioned = filter.label_wf.labels();
                mentioned.extend(min.label_order.labels());
                for label in mentioned {
                    if !out.contains(&label) {
                        out.push(label);
                    }
                }
            }
            Constraint::Conj(cs) => {
                for c in cs {
                    c.collect_labels(out);
                }
            }
            Constraint::Exists { body, .. } => body.collect_labels(out),
            Constraint::User { .. }
            | Constraint::Equal(..)
            | Constraint::Inequal(..)
            | Constraint::NewScope { .. }
            | Constraint::TellRel { .. } => {}
        }
    }
}

fn push_vars(
    term: &Term,
    bound: &[TermVar],
    seen: &mut FxHashSet<TermVar>,
    out: &mut Vec<TermVar>,
) {
    for v in term.vars() {
        if !bound.contains(&v) && seen.insert(v.clone()) {
            out.push(v);
        }
    }
}

fn without(subst: &FxHashMap<TermVar, Term>, bound: &[TermVar]) -> FxHashMap<TermVar, Term> {
    if bound.iter().any(|v| subst.contains_key(v)) {
        subst
            .iter()
            .filter(|(v, _)| !bound.contains(v))
            .map(|(v, t)| (v.clone(), t.clone()))
            .collect()
    } else {
        subst.clone()
    }
}

fn write_terms(f: &mut fmt::Formatter<'_>, terms: &[Term]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{term}")?;
    }
    Ok(())
}

impl fmt::Display for DataEquiv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataEquiv::Always => f.write_str("true"),
            DataEquiv::Never => f.write_str("false"),
            DataEquiv::Rule(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::User { name, args } => {
                write!(f, "{name}(")?;
                write_terms(f, args)?;
                f.write_str(")")
            }
            Constraint::ResolveQuery {
                scope,
                filter,
                min,
                result,
            } => {
                write!(f, "query {scope} filter {} and {{", filter.label_wf)?;
                for (i, local) in filter.data_wf.locals.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{local}")?;
                }
                write!(
                    f,
                    " :- {}}} min {} and {} in {result}",
                    filter.data_wf.pattern, min.label_order, min.data_equiv
                )
            }
            Constraint::Equal(l, r) => write!(f, "{l} == {r}"),
            Constraint::Inequal(l, r) => write!(f, "{l} != {r}"),
            Constraint::Conj(cs) if cs.is_empty() => f.write_str("true"),
            Constraint::Conj(cs) => {
                f.write_str("(")?;
                for (i, c) in cs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str(")")
            }
            Constraint::Exists { vars, body } => {
                f.write_str("{")?;
                for (i, v) in vars.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "}} {body}")
            }
            Constraint::NewScope { var } => write!(f, "new {var}"),
            Constraint::TellEdge {
                source,
                label,
                target,
            } => write!(f, "{source} -{label}-> {target}"),
            Constraint::TellRel { scope, datum } => write!(f, "!rel[{datum}] in {scope}"),
        }
    }
}

#[cfg(test)]
#[path = "../tests/constraint_tests.rs"]
mod tests;
