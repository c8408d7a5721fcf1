use super::*;

fn t(src: &str) -> Term {
    src.parse().expect("term should parse")
}

fn typing_spec() -> Spec {
    Spec::new(
        [],
        [
            Rule::new("Typed", [t("Int()"), t("?t")], Constraint::equal(t("?t"), t("Num()"))),
            Rule::new("Typed", [t("Str()"), t("?t")], Constraint::equal(t("?t"), t("Text()"))),
            Rule::new("Any", [t("?x")], Constraint::truth()),
        ],
    )
    .expect("valid spec")
}

fn expanded(application: Application) -> Vec<ApplyResult> {
    match application {
        Application::Expanded(results) => results,
        Application::Delayed(vars) => panic!("unexpectedly delayed on {vars:?}"),
    }
}

#[test]
fn test_strict_expands_single_matching_rule() {
    let spec = typing_spec();
    let store = Store::new();
    let results = expanded(
        apply_rules(&spec, &store, "Typed", &[t("Int()"), t("?r")], ApplyMode::Strict)
            .expect("known predicate"),
    );
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.rule.as_ref(), Some(&spec.rules("Typed")[0]));
    assert_eq!(result.body.to_string(), "?t#0 == Num()");
    // The renamed parameter is bound to the argument; the argument stays free.
    assert_eq!(result.store.unifier().find(&t("?t#0")), t("?r"));
    assert!(!result.store.unifier().is_bound(&TermVar::new("r")));
    assert!(store.unifier().is_empty());
}

#[test]
fn test_strict_delays_on_unbound_argument() {
    let spec = typing_spec();
    let application =
        apply_rules(&spec, &Store::new(), "Typed", &[t("?e"), t("?r")], ApplyMode::Strict)
            .expect("known predicate");
    assert_eq!(application, Application::Delayed(vec![TermVar::new("e"), TermVar::new("r")]));
}

#[test]
fn test_strict_without_possible_rule() {
    let spec = typing_spec();
    let results = expanded(
        apply_rules(&spec, &Store::new(), "Typed", &[t("Bool()"), t("?r")], ApplyMode::Strict)
            .expect("known predicate"),
    );
    assert!(results.is_empty());
}

#[test]
fn test_strict_resolves_arguments_through_unifier() {
    let spec = typing_spec();
    let mut store = Store::new();
    let unifier = store.unifier().unify(&t("?e"), &t("Str()")).expect("unifiable");
    store.set_unifier(unifier);
    let results = expanded(
        apply_rules(&spec, &store, "Typed", &[t("?e"), t("?r")], ApplyMode::Strict)
            .expect("known predicate"),
    );
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].rule.as_ref(), Some(&spec.rules("Typed")[1]));
}

#[test]
fn test_relaxed_branches_in_declaration_order() {
    let spec = typing_spec();
    let results = expanded(
        apply_rules(&spec, &Store::new(), "Typed", &[t("?e"), t("?r")], ApplyMode::Relaxed)
            .expect("known predicate"),
    );
    let rules: Vec<_> = results.iter().map(|r| r.rule.clone()).collect();
    assert_eq!(
        rules,
        vec![Some(spec.rules("Typed")[0].clone()), Some(spec.rules("Typed")[1].clone())]
    );
}

#[test]
fn test_relaxed_drops_non_unifiable_rules() {
    let spec = typing_spec();
    let results = expanded(
        apply_rules(&spec, &Store::new(), "Typed", &[t("?e"), t("Text()")], ApplyMode::Relaxed)
            .expect("known predicate"),
    );
    // Both heads unify; bodies are checked later by inference.
    assert_eq!(results.len(), 2);

    let results = expanded(
        apply_rules(&spec, &Store::new(), "Typed", &[t("Str()"), t("?r")], ApplyMode::Relaxed)
            .expect("known predicate"),
    );
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].rule.as_ref(), Some(&spec.rules("Typed")[1]));
}

#[test]
fn test_relaxed_instantiates_arguments() {
    let spec = Spec::new(
        [],
        [
            Rule::new("Exp", [t("Num(?n)")], Constraint::truth()),
            Rule::new("Exp", [t("Neg(?e)")], Constraint::user("Exp", [t("?e")])),
        ],
    )
    .expect("valid spec");
    let results = expanded(
        apply_rules(&spec, &Store::new(), "Exp", &[t("?h")], ApplyMode::Relaxed)
            .expect("known predicate"),
    );
    let values: Vec<Term> = results
        .iter()
        .map(|r| r.store.unifier().find_recursive(&t("?h")))
        .collect();
    assert_eq!(values, vec![t("Num(?n#0)"), t("Neg(?e#0)")]);
    assert_eq!(results[1].body, Constraint::user("Exp", [t("?e#0")]));
}

#[test]
fn test_fresh_names_differ_between_applications() {
    let spec = typing_spec();
    let first = expanded(
        apply_rules(&spec, &Store::new(), "Any", &[t("1")], ApplyMode::Strict).expect("known"),
    );
    let second = expanded(
        apply_rules(&spec, &first[0].store, "Any", &[t("2")], ApplyMode::Strict).expect("known"),
    );
    assert_eq!(first[0].body, Constraint::truth());
    assert_eq!(second[0].store.unifier().find(&t("?x#0")), t("1"));
    assert_eq!(second[0].store.unifier().find(&t("?x#1")), t("2"));
}

#[test]
fn test_unknown_predicate() {
    let spec = typing_spec();
    let err = apply_rules(&spec, &Store::new(), "Missing", &[], ApplyMode::Relaxed)
        .expect_err("unknown predicate");
    assert!(matches!(err, SolverError::UnknownPredicate(name) if name == "Missing"));
}
