use super::*;
use std::sync::Arc;
use stx_scopegraph::{EdgeOrData, Label, LabelOrder};
use stx_solver::{DataEquiv, DataWf, QueryFilter, QueryMin, Rule, infer};
use stx_terms::{Scope, TermVar};

fn t(src: &str) -> Term {
    src.parse().expect("term should parse")
}

fn query(scope: &str, result: &str, equiv: DataEquiv) -> Constraint {
    Constraint::ResolveQuery {
        scope: t(scope),
        filter: QueryFilter {
            label_wf: "P*".parse().expect("regex should parse"),
            data_wf: DataWf::any(),
        },
        min: QueryMin {
            label_order: LabelOrder::default(),
            data_equiv: equiv,
        },
        result: t(result),
    }
}

fn edge(source: &str, target: &str) -> Constraint {
    Constraint::TellEdge {
        source: t(source),
        label: Label::new("P"),
        target: t(target),
    }
}

fn solved(spec: &Spec, constraints: impl IntoIterator<Item = Constraint>) -> SolverState {
    let state = SolverState::of(spec, constraints);
    SolverState::from_solver_result(infer(spec, &state).expect("inference succeeds"))
}

fn label_spec() -> Spec {
    Spec::new([Label::new("P")], []).expect("valid spec")
}

#[test]
fn test_query_on_unknown_scope_waits_for_it() {
    let spec = label_spec();
    let pending = query("?s", "?r", DataEquiv::Always);
    let state = SolverState::of(&spec, [pending.clone()]);
    let stuck = stuck_queries(&spec, &state).expect("no resolution failure");
    assert_eq!(stuck, vec![(pending, Delay::on_vars([TermVar::new("s")]))]);
}

#[test]
fn test_query_on_open_edge_waits_for_the_edge() {
    let spec = label_spec();
    // The edge to ?q cannot be added until ?q is known, so #0 -P-> stays open.
    let base = solved(&spec, [Constraint::NewScope { var: TermVar::new("s") }, edge("?s", "?q")]);
    let pending = query("?s", "?r", DataEquiv::Always);
    let state = base.update_constraints(&spec, [pending.clone()], []);

    let stuck = stuck_queries(&spec, &state).expect("no resolution failure");
    let expected = Delay::on_critical_edge(CriticalEdge::new(
        Term::Scope(Scope(0)),
        EdgeOrData::Edge(Label::new("P")),
    ));
    assert_eq!(stuck, vec![(pending.clone(), expected.clone())]);

    let ctx = SolverContext::new(Arc::new(spec));
    let delayed = delay_stuck_queries()
        .eval(&ctx, state)
        .collect_all()
        .expect("no search error");
    assert_eq!(delayed.len(), 1);
    assert!(!delayed[0].is_active(&pending));
    assert_eq!(delayed[0].delays().get(&pending), Some(&expected));
}

#[test]
fn test_answerable_query_is_not_stuck() {
    let spec = label_spec();
    let base = solved(&spec, [Constraint::NewScope { var: TermVar::new("s") }]);
    let pending = query("?s", "?r", DataEquiv::Always);
    let state = base.update_constraints(&spec, [pending.clone()], []);
    assert!(stuck_queries(&spec, &state).expect("no resolution failure").is_empty());

    let ctx = SolverContext::new(Arc::new(spec));
    let out = delay_stuck_queries()
        .eval(&ctx, state.clone())
        .collect_all()
        .expect("no search error");
    assert_eq!(out, vec![state]);
}

#[test]
fn test_undecidable_equivalence_stays_active() {
    let spec = Spec::new(
        [Label::new("P")],
        [
            Rule::new("eq", [t("?a"), t("?a")], Constraint::truth()),
            Rule::new("eq", [t("?a"), t("?b")], Constraint::equal(t("?a"), t("?b"))),
        ],
    )
    .expect("valid spec");
    let pending = query("?s", "?r", DataEquiv::Rule("eq".into()));
    let state = solved(&spec, [Constraint::NewScope { var: TermVar::new("s") }, pending.clone()]);
    assert!(state.is_active(&pending));
    assert!(stuck_queries(&spec, &state).expect("no resolution failure").is_empty());
}
