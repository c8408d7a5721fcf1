use super::*;
use crate::placeholder::{ConventionPolicy, replace_placeholders_by_variables};
use stx_solver::{Constraint, Rule, Spec, infer};
use stx_strategies::CancellationToken;

fn t(src: &str) -> Term {
    src.parse().expect("term should parse")
}

fn completer() -> TermCompleter {
    TermCompleter::new(Arc::new(ConventionPolicy))
}

/// `Root(program)` solved once, with the placeholders of `program` replaced
/// by variables.
fn analyze(spec: Spec, program: &str) -> (SolverContext, SolverState, PlaceholderVarMap) {
    let mut map = PlaceholderVarMap::default();
    let program = replace_placeholders_by_variables(&t(program), &mut map, &ConventionPolicy);
    let state = SolverState::of(&spec, [Constraint::user("Root", [program])])
        .with_existentials(map.vars().cloned())
        .precompute_critical_edges(&spec);
    let state = SolverState::from_solver_result(infer(&spec, &state).expect("inference succeeds"));
    (SolverContext::new(Arc::new(spec)), state, map)
}

fn choice_spec() -> Spec {
    Spec::new(
        [],
        [
            Rule::new("Root", [t("?x")], Constraint::user("P", [t("?x")])),
            Rule::new("P", [t("?x")], Constraint::equal(t("?x"), t("1"))),
            Rule::new("P", [t("?x")], Constraint::equal(t("?x"), t("2"))),
        ],
    )
    .expect("valid spec")
}

#[test]
fn test_deterministic_proposal() {
    let spec = Spec::new(
        [],
        [
            Rule::new("Root", [t("?x")], Constraint::user("P", [t("?x")])),
            Rule::new("P", [t("?x")], Constraint::equal(t("?x"), t("1"))),
        ],
    )
    .expect("valid spec");
    let (ctx, state, _) = analyze(spec, "Exp-Plhdr()");
    let proposals = completer()
        .complete(&ctx, &state, &TermVar::new("plhdr0"))
        .expect("no search error");
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].term, t("1"));
    assert!(!proposals[0].state.has_errors());
    // Inference already bound the variable; the analyzed state is reused.
    assert_eq!(proposals[0].state, state);
}

#[test]
fn test_ambiguous_proposals() {
    let (ctx, state, map) = analyze(choice_spec(), "Exp-Plhdr()");
    let var = TermVar::new("plhdr0");
    let proposals = completer().complete(&ctx, &state, &var).expect("no search error");
    let terms: Vec<Term> = proposals.iter().map(|p| p.term.clone()).collect();
    assert_eq!(terms, vec![t("1"), t("2")]);
    assert!(proposals.iter().all(|p| !p.state.has_errors()));

    let rendered = completer()
        .proposal_terms(&ctx, &state, &var, &map)
        .expect("no search error");
    assert_eq!(rendered, vec![t("1"), t("2")]);
}

#[test]
fn test_no_sound_proposal() {
    let spec = Spec::new(
        [],
        [
            Rule::new("Root", [t("?x")], Constraint::user("P", [t("?x")])),
            Rule::new("P", [t("?x")], Constraint::equal(t("?x"), t("1"))),
            Rule::new("P", [t("?x")], Constraint::equal(t("?x"), t("2"))),
        ],
    )
    .expect("valid spec");
    // `?y` is shared with a second call that rules out both values.
    let state = SolverState::of(
        &spec,
        [
            Constraint::user("P", [t("?y")]),
            Constraint::Inequal(t("?y"), t("1")),
            Constraint::Inequal(t("?y"), t("2")),
        ],
    );
    let ctx = SolverContext::new(Arc::new(spec));
    let proposals = completer()
        .complete(&ctx, &state, &TermVar::new("y"))
        .expect("no search error");
    assert!(proposals.is_empty());
}

#[test]
fn test_proposals_are_rendered_with_placeholders() {
    let spec = Spec::new(
        [],
        [
            Rule::new("Root", [t("?x")], Constraint::user("A", [t("?x")])),
            Rule::new("A", [t("A2B(?b)")], Constraint::user("B", [t("?b")])),
            Rule::new("B", [t("B2C(?c)")], Constraint::user("C", [t("?c")])),
            Rule::new("C", [t("Lit(?s)")], Constraint::truth()),
        ],
    )
    .expect("valid spec");
    let (ctx, state, map) = analyze(spec, "Exp-Plhdr()");
    let rendered = completer()
        .proposal_terms(&ctx, &state, &TermVar::new("plhdr0"), &map)
        .expect("no search error");
    let hole = ConventionPolicy.default_placeholder();
    assert_eq!(
        rendered,
        vec![Term::appl("A2B", [Term::appl("B2C", [Term::appl("Lit", [hole])])])]
    );
}

#[test]
fn test_cancelled_completion() {
    let (ctx, state, _) = analyze(choice_spec(), "Exp-Plhdr()");
    let token = CancellationToken::new();
    token.cancel();
    let err = completer()
        .complete(&ctx.with_cancellation(token), &state, &TermVar::new("plhdr0"))
        .expect_err("completion is cancelled");
    assert!(err.is_cancelled());
}
