use super::*;

fn t(src: &str) -> Term {
    src.parse().expect("term should parse")
}

#[test]
fn test_unify_binds_variable() {
    let u = Unifier::new().unify(&t("?x"), &t("F(1)")).expect("unify");
    assert_eq!(u.find_recursive(&t("?x")), t("F(1)"));
    assert!(u.is_bound(&TermVar::new("x")));
}

#[test]
fn test_unify_structural() {
    let u = Unifier::new()
        .unify(&t("Pair(?a, G(?b))"), &t("Pair(1, G([?c]))"))
        .expect("unify");
    assert_eq!(u.find_recursive(&t("?a")), t("1"));
    assert_eq!(u.find_recursive(&t("?b")), t("[?c]"));
}

#[test]
fn test_unify_is_persistent() {
    let base = Unifier::new();
    let extended = base.unify(&t("?x"), &t("1")).expect("unify");
    assert!(base.is_empty());
    assert_eq!(extended.len(), 1);
}

#[test]
fn test_unify_mismatch() {
    let err = Unifier::new()
        .unify(&t("F(?x)"), &t("G(1)"))
        .expect_err("F and G differ");
    assert!(matches!(err, UnifyError::Mismatch { .. }));
}

#[test]
fn test_unify_arity_mismatch() {
    assert!(!Unifier::new().are_unifiable(&t("F(1)"), &t("F(1, 2)")));
    assert!(!Unifier::new().are_unifiable(&t("[1]"), &t("[]")));
}

#[test]
fn test_occurs_check() {
    let err = Unifier::new()
        .unify(&t("?x"), &t("F(?x)"))
        .expect_err("occurs check");
    assert!(matches!(err, UnifyError::OccursCheck { .. }));
}

#[test]
fn test_occurs_check_through_chain() {
    let u = Unifier::new().unify(&t("?y"), &t("G(?x)")).expect("unify");
    assert!(u.unify(&t("?x"), &t("?y")).is_err());
}

#[test]
fn test_var_var_chain() {
    let u = Unifier::new()
        .unify(&t("?x"), &t("?y"))
        .and_then(|u| u.unify(&t("?y"), &t("\"s\"")))
        .expect("unify");
    assert_eq!(u.find_recursive(&t("?x")), t("\"s\""));
    assert!(u.is_ground(&t("F(?x, ?y)")));
}

#[test]
fn test_free_vars_after_instantiation() {
    let u = Unifier::new().unify(&t("?x"), &t("F(?z, ?y)")).expect("unify");
    assert_eq!(
        u.free_vars(&t("P(?x, ?w)")),
        vec![TermVar::new("z"), TermVar::new("y"), TermVar::new("w")]
    );
}

#[test]
fn test_are_equal_does_not_bind() {
    let u = Unifier::new();
    assert!(!u.are_equal(&t("?x"), &t("1")));
    assert!(u.are_equal(&t("F(?x)"), &t("F(?x)")));
}
