use super::*;

fn t(src: &str) -> Term {
    src.parse().expect("term should parse")
}

fn edge(source: &str, label: &str, target: &str) -> Constraint {
    Constraint::TellEdge {
        source: t(source),
        label: Label::new(label),
        target: t(target),
    }
}

#[test]
fn test_rules_keep_declaration_order() {
    let spec = Spec::new(
        [],
        [
            Rule::new("P", [t("?x")], Constraint::equal(t("?x"), t("1"))),
            Rule::new("Q", [], Constraint::truth()),
            Rule::new("P", [t("?x")], Constraint::equal(t("?x"), t("2"))),
        ],
    )
    .expect("valid spec");
    let bodies: Vec<String> = spec.rules("P").iter().map(|r| r.body.to_string()).collect();
    assert_eq!(bodies, vec!["?x == 1", "?x == 2"]);
    assert_eq!(spec.predicates().collect::<Vec<_>>(), vec!["P", "Q"]);
    assert_eq!(spec.rule_count(), 3);
    assert!(spec.rules("R").is_empty());
}

#[test]
fn test_arity_mismatch_between_rules() {
    let err = Spec::new(
        [],
        [
            Rule::new("P", [t("?x")], Constraint::truth()),
            Rule::new("P", [t("?x"), t("?y")], Constraint::truth()),
        ],
    )
    .expect_err("arity mismatch");
    assert_eq!(
        err,
        SpecError::ArityMismatch {
            name: "P".to_string(),
            expected: 1,
            found: 2
        }
    );
}

#[test]
fn test_unbound_body_variable() {
    let err = Spec::new([], [Rule::new("P", [t("?x")], Constraint::equal(t("?y"), t("?x")))])
        .expect_err("unbound variable");
    assert_eq!(
        err,
        SpecError::UnboundVariable {
            rule: "P".to_string(),
            var: TermVar::new("y")
        }
    );
}

#[test]
fn test_existential_binds_body_variable() {
    let body = Constraint::exists([TermVar::new("y")], Constraint::equal(t("?y"), t("?x")));
    assert!(Spec::new([], [Rule::new("P", [t("?x")], body)]).is_ok());
}

#[test]
fn test_undefined_and_misused_callees() {
    let undefined = Spec::new([], [Rule::new("P", [t("?x")], Constraint::user("Q", [t("?x")]))]);
    assert!(matches!(undefined, Err(SpecError::UndefinedPredicate { .. })));

    let misused = Spec::new(
        [],
        [
            Rule::new("P", [t("?x")], Constraint::user("Q", [t("?x"), t("?x")])),
            Rule::new("Q", [t("?x")], Constraint::truth()),
        ],
    );
    assert!(matches!(misused, Err(SpecError::ArityMismatch { .. })));
}

#[test]
fn test_is_always() {
    let spec = Spec::new(
        [],
        [
            Rule::new("any", [t("?a"), t("?b")], Constraint::truth()),
            Rule::new("same", [t("?a"), t("?a")], Constraint::truth()),
            Rule::new("cond", [t("?a"), t("?b")], Constraint::equal(t("?a"), t("?b"))),
        ],
    )
    .expect("valid spec");
    assert_eq!(spec.is_always("any"), Some(true));
    assert_eq!(spec.is_always("none"), Some(false));
    assert_eq!(spec.is_always("same"), None);
    assert_eq!(spec.is_always("cond"), None);
}

#[test]
fn test_scope_extensions_reach_fixpoint() {
    let spec = Spec::new(
        [],
        [
            Rule::new("Intro", [t("?s"), t("?t")], edge("?s", "P", "?t")),
            Rule::new(
                "Declare",
                [t("?s"), t("?d")],
                Constraint::TellRel {
                    scope: t("?s"),
                    datum: t("?d"),
                },
            ),
            Rule::new(
                "Block",
                [t("?s")],
                Constraint::exists(
                    [TermVar::new("inner")],
                    Constraint::conj([
                        Constraint::NewScope {
                            var: TermVar::new("inner"),
                        },
                        Constraint::user("Intro", [t("?inner"), t("?s")]),
                        Constraint::user("Wrap", [t("?s")]),
                    ]),
                ),
            ),
            Rule::new("Wrap", [t("?s")], Constraint::user("Declare", [t("?s"), t("X")])),
        ],
    )
    .expect("valid spec");
    assert_eq!(spec.extensions("Intro", 0), &[EdgeOrData::Edge(Label::new("P"))]);
    assert!(spec.extensions("Intro", 1).is_empty());
    assert_eq!(spec.extensions("Declare", 0), &[EdgeOrData::Data]);
    assert_eq!(spec.extensions("Wrap", 0), &[EdgeOrData::Data]);
    // `?s` is only passed to Intro as target, which Intro never extends.
    assert_eq!(spec.extensions("Block", 0), &[EdgeOrData::Data]);
    assert!(spec.extensions("Missing", 0).is_empty());
}

#[test]
fn test_labels_include_declared_and_used() {
    let spec = Spec::new(
        [Label::new("I")],
        [Rule::new("Intro", [t("?s"), t("?t")], edge("?s", "P", "?t"))],
    )
    .expect("valid spec");
    assert_eq!(spec.labels(), &[Label::new("I"), Label::new("P")]);
}

#[test]
fn test_deserialize_spec() {
    let spec: Spec = serde_json::from_str(
        r#"{
            "labels": ["P"],
            "rules": [
                {"name": "P", "params": ["?x"], "body": {"Equal": ["?x", "1"]}},
                {"name": "Q", "params": []}
            ]
        }"#,
    )
    .expect("spec should deserialize");
    assert_eq!(spec.rule_count(), 2);
    assert_eq!(spec.rules("Q")[0].body, Constraint::truth());
    assert_eq!(spec.rules("P")[0].to_string(), "P(?x) :- ?x == 1.");
}

#[test]
fn test_invalid_spec_fails_to_deserialize() {
    let result: Result<Spec, _> = serde_json::from_str(
        r#"{"rules": [{"name": "P", "params": ["?x"], "body": {"User": {"name": "Q", "args": []}}}]}"#,
    );
    assert!(result.is_err());
}
