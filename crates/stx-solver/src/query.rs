//! Evaluation of resolution queries against a solver store.

use crate::completeness::Completeness;
use crate::constraint::{DataEquiv, QueryFilter};
use crate::spec::Spec;
use crate::store::Store;
use stx_scopegraph::{EdgeOrData, LabelOrder, NameResolution, ResolutionError};
use stx_terms::{MatchResult, Scope, Term, TermVar, match_term};

/// How data well-formedness treats a datum whose match is undecided.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DataWfMode {
    /// Fail resolution with [`ResolutionError::DataUndecided`].
    Strict,
    /// Accept the datum; it may become well-formed.
    Relaxed,
}

/// Whether `equiv` identifies all data, if that can be decided statically.
pub fn data_equiv_is_always(spec: &Spec, equiv: &DataEquiv) -> Option<bool> {
    match equiv {
        DataEquiv::Always => Some(true),
        DataEquiv::Never => Some(false),
        DataEquiv::Rule(name) => spec.is_always(name),
    }
}

/// Resolves a query from `scope` and returns the accepted data, fully
/// instantiated, in resolution order.
pub fn resolve_query(
    spec: &Spec,
    store: &Store,
    completeness: &Completeness,
    scope: Scope,
    filter: &QueryFilter,
    label_order: &LabelOrder,
    data_equiv_always: bool,
    mode: DataWfMode,
) -> Result<Vec<Term>, ResolutionError> {
    let unifier = store.unifier();
    let locals = &filter.data_wf.locals;
    let bindable = |v: &TermVar| locals.contains(v);
    let data_wf = |datum: &Term| match match_term(&filter.data_wf.pattern, &bindable, datum, unifier) {
        MatchResult::Yes(_) => Ok(true),
        MatchResult::No => Ok(false),
        MatchResult::Maybe(vars) => match mode {
            DataWfMode::Strict => Err(ResolutionError::DataUndecided { vars }),
            DataWfMode::Relaxed => Ok(true),
        },
    };
    let oracle = |s: Scope, edge: &EdgeOrData| completeness.is_complete(s, edge, unifier);
    let resolution = NameResolution::new(
        store.graph(),
        spec.labels(),
        &filter.label_wf,
        label_order,
        &data_wf,
        data_equiv_always,
        &oracle,
    );
    let answers = resolution.resolve(scope)?;
    Ok(answers
        .into_iter()
        .map(|answer| unifier.find_recursive(&answer.datum))
        .collect())
}
