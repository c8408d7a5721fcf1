//! End-to-end completion of small languages.

use std::sync::Arc;
use stx_completions::{
    CompletionDriver, CompletionError, ConventionPolicy, DriverOptions, TermCompleter,
};
use stx_scopegraph::LabelOrder;
use stx_solver::{Constraint, DataEquiv, DataWf, QueryFilter, QueryMin, Rule, SolverContext, Spec};
use stx_terms::{Term, TermVar};

fn t(src: &str) -> Term {
    src.parse().expect("term should parse")
}

fn v(name: &str) -> TermVar {
    TermVar::new(name)
}

fn context(rules: impl IntoIterator<Item = Rule>) -> SolverContext {
    SolverContext::new(Arc::new(Spec::new([], rules).expect("valid spec")))
}

fn driver(options: DriverOptions) -> CompletionDriver {
    CompletionDriver::new(TermCompleter::new(Arc::new(ConventionPolicy)), options)
}

fn choice_rules(values: &[&str]) -> Vec<Rule> {
    let mut rules = vec![Rule::new("Root", [t("?x")], Constraint::user("P", [t("?x")]))];
    for value in values {
        rules.push(Rule::new("P", [t("?x")], Constraint::equal(t("?x"), t(value))));
    }
    rules
}

/// `A`, `B` and `C` sorts connected by the injections `A2B` and `B2C`.
/// `C` terms are literals wrapped in `Lit`; `?s != "bad"` rejects one name.
fn injection_rules() -> Vec<Rule> {
    vec![
        Rule::new("Root", [t("?x")], Constraint::user("A", [t("?x")])),
        Rule::new("A", [t("A2B(?b)")], Constraint::user("B", [t("?b")])),
        Rule::new("B", [t("B2C(?c)")], Constraint::user("C", [t("?c")])),
        Rule::new("C", [t("Lit(?s)")], Constraint::Inequal(t("?s"), t("\"bad\""))),
    ]
}

#[test]
fn deterministic_placeholder() {
    let ctx = context(choice_rules(&["1"]));
    let outcome = driver(DriverOptions::default())
        .complete_program(&ctx, "Root", &t("Exp-Plhdr()"), &t("1"))
        .expect("completes");
    assert_eq!(outcome.program(), &t("1"));
    assert_eq!(outcome.stats.rounds, 1);
    assert_eq!(outcome.stats.proposals, 1);
    assert_eq!(outcome.stats.inserted_literals, 0);
    let state = outcome.expectation.state().expect("analyzed");
    assert!(!state.has_errors());
}

#[test]
fn ambiguous_placeholder_follows_expectation() {
    let ctx = context(choice_rules(&["1", "2"]));
    for expected in ["1", "2"] {
        let outcome = driver(DriverOptions::default())
            .complete_program(&ctx, "Root", &t("Exp-Plhdr()"), &t(expected))
            .expect("completes");
        assert_eq!(outcome.program(), &t(expected));
        assert_eq!(outcome.stats.proposals, 2);
        assert_eq!(outcome.stats.candidates, 1);
    }

    let err = driver(DriverOptions::default())
        .complete_program(&ctx, "Root", &t("Exp-Plhdr()"), &t("3"))
        .expect_err("3 is never proposed");
    match err {
        CompletionError::NoCandidates { var, expected } => {
            assert_eq!(var, v("plhdr0"));
            assert_eq!(expected, t("3"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn injection_chain_then_literal() {
    let ctx = context(injection_rules());
    let expected = t("A2B(B2C(Lit(\"x\")))");
    let outcome = driver(DriverOptions::default())
        .complete_program(&ctx, "Root", &t("A-Plhdr()"), &expected)
        .expect("completes");
    assert_eq!(outcome.program(), &expected);
    // The chain is found in one round; the name is inserted in the next.
    assert_eq!(outcome.stats.rounds, 2);
    assert_eq!(outcome.stats.inserted_literals, 1);
    assert_eq!(outcome.stats.round_micros.len(), 2);
}

#[test]
fn literal_fallback_can_be_disabled() {
    let ctx = context(injection_rules());
    let options = DriverOptions {
        literal_fallback: false,
        ..DriverOptions::default()
    };
    let err = driver(options)
        .complete_program(&ctx, "Root", &t("A-Plhdr()"), &t("A2B(B2C(Lit(\"x\")))"))
        .expect_err("the name has no candidates");
    assert!(matches!(err, CompletionError::NoCandidates { expected, .. } if expected == t("\"x\"")));
}

#[test]
fn rejected_literal() {
    let ctx = context(injection_rules());
    let err = driver(DriverOptions::default())
        .complete_program(&ctx, "Root", &t("A-Plhdr()"), &t("A2B(B2C(Lit(\"bad\")))"))
        .expect_err("the rules reject the name");
    assert!(matches!(err, CompletionError::CouldNotInsertLiteral { literal, .. } if literal == t("\"bad\"")));
}

fn query_from(scope: &str, data_wf: DataWf, result: &str) -> Constraint {
    Constraint::ResolveQuery {
        scope: t(scope),
        filter: QueryFilter {
            label_wf: "e".parse().expect("regex should parse"),
            data_wf,
        },
        min: QueryMin {
            label_order: LabelOrder::default(),
            data_equiv: DataEquiv::Always,
        },
        result: t(result),
    }
}

/// A program is one definition and one reference in a shared scope.
fn reference_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "Root",
            [t("Prog(?d, ?e)")],
            Constraint::exists(
                [v("s")],
                Constraint::conj([
                    Constraint::NewScope { var: v("s") },
                    Constraint::user("Decl", [t("?s"), t("?d")]),
                    Constraint::user("Exp", [t("?s"), t("?e")]),
                ]),
            ),
        ),
        Rule::new(
            "Decl",
            [t("?s"), t("Def(?x)")],
            Constraint::TellRel {
                scope: t("?s"),
                datum: t("Var(?x)"),
            },
        ),
        Rule::new(
            "Exp",
            [t("?s"), t("Ref(?x)")],
            Constraint::exists(
                [v("r")],
                Constraint::conj([
                    query_from(
                        "?s",
                        DataWf {
                            locals: Vec::new(),
                            pattern: t("Var(?x)"),
                        },
                        "?r",
                    ),
                    Constraint::equal(t("?r"), t("[Var(?x)]")),
                ]),
            ),
        ),
    ]
}

#[test]
fn reference_resolves_through_query() {
    let ctx = context(reference_rules());
    let expected = t("Prog(Def(\"a\"), Ref(\"a\"))");
    let outcome = driver(DriverOptions::default())
        .complete_program(&ctx, "Root", &t("Prog(Def(\"a\"), Ref(ID-Plhdr()))"), &expected)
        .expect("completes");
    assert_eq!(outcome.program(), &expected);
    assert_eq!(outcome.stats.inserted_literals, 0);
}

#[test]
fn query_on_unknown_scope_is_stuck() {
    let ctx = context([Rule::new(
        "Root",
        [t("?x")],
        Constraint::exists([v("r")], query_from("?x", DataWf::any(), "?r")),
    )]);
    let err = driver(DriverOptions::default())
        .complete_program(&ctx, "Root", &t("Scope-Plhdr()"), &t("\"s\""))
        .expect_err("the placeholder is the scope of a query");
    match err {
        CompletionError::StuckOnDelayingVariables { vars } => assert_eq!(vars, vec![v("plhdr0")]),
        other => panic!("unexpected error: {other}"),
    }
}
