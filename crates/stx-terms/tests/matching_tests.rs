use super::*;

fn t(src: &str) -> Term {
    src.parse().expect("term should parse")
}

fn rule_vars(names: &'static [&'static str]) -> impl Fn(&TermVar) -> bool {
    move |v: &TermVar| names.contains(&v.name())
}

#[test]
fn test_pattern_var_matches_anything() {
    let bindable = rule_vars(&["x"]);
    let result = match_term(&t("?x"), &bindable, &t("?v"), &Unifier::new());
    let MatchResult::Yes(bindings) = result else {
        panic!("expected a match, got {result:?}");
    };
    assert_eq!(bindings.get(&TermVar::new("x")), Some(&t("?v")));
}

#[test]
fn test_structure_against_unbound_var_is_maybe() {
    let bindable = rule_vars(&["b"]);
    let result = match_term(&t("A2B(?b)"), &bindable, &t("?v"), &Unifier::new());
    assert_eq!(result, MatchResult::Maybe(vec![TermVar::new("v")]));
}

#[test]
fn test_mismatch_beats_maybe() {
    let bindable = rule_vars(&[]);
    let result = match_term(&t("F(G(), 1)"), &bindable, &t("F(?v, 2)"), &Unifier::new());
    assert_eq!(result, MatchResult::No);
}

#[test]
fn test_match_through_unifier() {
    let bindable = rule_vars(&["n"]);
    let u = Unifier::new().unify(&t("?v"), &t("Lit(\"1\")")).expect("unify");
    let result = match_term(&t("Lit(?n)"), &bindable, &t("?v"), &u);
    let MatchResult::Yes(bindings) = result else {
        panic!("expected a match, got {result:?}");
    };
    assert_eq!(bindings.get(&TermVar::new("n")), Some(&t("\"1\"")));
}

#[test]
fn test_non_linear_pattern() {
    let bindable = rule_vars(&["x"]);
    let u = Unifier::new();
    assert!(match_term(&t("P(?x, ?x)"), &bindable, &t("P(1, 1)"), &u).is_yes());
    assert!(match_term(&t("P(?x, ?x)"), &bindable, &t("P(1, 2)"), &u).is_no());
    assert_eq!(
        match_term(&t("P(?x, ?x)"), &bindable, &t("P(1, ?v)"), &u),
        MatchResult::Maybe(vec![TermVar::new("v")])
    );
}

#[test]
fn test_rigid_pattern_var() {
    let bindable = rule_vars(&["d"]);
    let u = Unifier::new();
    // ?name is not bindable: the datum only matches once ?name is known.
    let result = match_term(&t("Decl(?name, ?d)"), &bindable, &t("Decl(\"x\", Int())"), &u);
    assert_eq!(result, MatchResult::Maybe(vec![TermVar::new("name")]));

    let bound = u.unify(&t("?name"), &t("\"x\"")).expect("unify");
    assert!(match_term(&t("Decl(?name, ?d)"), &bindable, &t("Decl(\"x\", Int())"), &bound).is_yes());
    assert!(match_term(&t("Decl(?name, ?d)"), &bindable, &t("Decl(\"y\", Int())"), &bound).is_no());
}
