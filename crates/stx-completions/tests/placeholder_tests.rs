use super::*;

fn t(src: &str) -> Term {
    src.parse().expect("term should parse")
}

#[test]
fn test_convention_roles() {
    let policy = ConventionPolicy;
    assert!(policy.is_placeholder(&t("Exp-Plhdr()")));
    assert!(!policy.is_placeholder(&t("Exp-Plhdr(1)")));
    assert!(!policy.is_placeholder(&t("Exp()")));

    assert!(policy.is_injection(&t("Exp2Term(?x)")));
    assert!(!policy.is_injection(&t("Exp2Term(?x, ?y)")));
    assert!(!policy.is_injection(&t("Neg(?x)")));

    assert!(policy.is_literal(&t("\"x\"")));
    assert!(policy.is_literal(&t("ID-LEX2Str(\"x\")")));
    assert!(!policy.is_literal(&t("Var(\"x\")")));
    assert_eq!(policy.default_placeholder(), Term::appl(DEFAULT_PLACEHOLDER_OP, []));
}

#[test]
fn test_explicit_roles() {
    let policy = ExplicitPolicy::new()
        .with_placeholder("Hole")
        .with_injection("Up")
        .with_literal("Name");
    assert!(policy.is_placeholder(&t("Hole()")));
    assert!(!policy.is_placeholder(&t("Exp-Plhdr()")));
    assert!(policy.is_injection(&t("Up(?x)")));
    assert!(!policy.is_injection(&t("Exp2Term(?x)")));
    assert!(policy.is_literal(&t("Name(\"x\")")));
    assert!(policy.is_literal(&t("42")));
    assert_eq!(policy.default_placeholder(), t("Hole()"));
    assert_eq!(ExplicitPolicy::new().default_placeholder(), Term::appl(DEFAULT_PLACEHOLDER_OP, []));
}

#[test]
fn test_explicit_policy_from_json() {
    let policy: ExplicitPolicy =
        serde_json::from_str(r#"{"placeholders": ["Hole"], "injections": ["Up"]}"#).expect("valid policy");
    assert!(policy.is_placeholder(&t("Hole()")));
    assert!(policy.is_injection(&t("Up(1)")));
    assert!(policy.literals.is_empty());
}

#[test]
fn test_placeholders_become_fresh_variables() {
    let policy = ConventionPolicy;
    let mut map = PlaceholderVarMap::default();
    let term = replace_placeholders_by_variables(&t("Add(Exp-Plhdr(), [Exp-Plhdr(), 1])"), &mut map, &policy);
    assert_eq!(term, t("Add(?plhdr0, [?plhdr1, 1])"));
    assert_eq!(map.len(), 2);
    assert_eq!(map.placeholder(&TermVar::new("plhdr1")), Some(&t("Exp-Plhdr()")));

    // The map keeps growing across terms.
    let next = replace_placeholders_by_variables(&t("Stmt-Plhdr()"), &mut map, &policy);
    assert_eq!(next, t("?plhdr2"));
    let vars: Vec<&str> = map.vars().map(TermVar::name).collect();
    assert_eq!(vars, ["plhdr0", "plhdr1", "plhdr2"]);

    assert_eq!(map.vars_of(&t("Exp-Plhdr()")), [TermVar::new("plhdr0"), TermVar::new("plhdr1")]);
    assert_eq!(map.vars_of(&t("Stmt-Plhdr()")), [TermVar::new("plhdr2")]);
    assert!(map.vars_of(&t("Decl-Plhdr()")).is_empty());
}

#[test]
fn test_variables_become_placeholders() {
    let policy = ConventionPolicy;
    let mut map = PlaceholderVarMap::new("h");
    replace_placeholders_by_variables(&t("Exp-Plhdr()"), &mut map, &policy);

    let proposal = t("Add(?h0, ?x#3)");
    assert_eq!(
        replace_variables_by_placeholders(&proposal, &map, &policy),
        Term::appl("Add", [t("Exp-Plhdr()"), policy.default_placeholder()])
    );
}

#[test]
fn test_injection_chain_becomes_one_placeholder() {
    let policy = ConventionPolicy;
    let mut map = PlaceholderVarMap::default();
    replace_placeholders_by_variables(&t("Term-Plhdr()"), &mut map, &policy);

    let chained = t("Call(Exp2Term(Term2Atom(?plhdr0)), Exp2Term(Int(1)))");
    assert_eq!(
        replace_variables_by_placeholders(&chained, &map, &policy),
        t("Call(Term-Plhdr(), Exp2Term(Int(1)))")
    );
}

/// Treats every `Wrap` as an injection, whatever its arity.
#[derive(Debug)]
struct LooseInjections;

impl PlaceholderPolicy for LooseInjections {
    fn is_placeholder(&self, term: &Term) -> bool {
        ConventionPolicy.is_placeholder(term)
    }

    fn is_injection(&self, term: &Term) -> bool {
        term.op() == Some("Wrap")
    }

    fn is_literal(&self, term: &Term) -> bool {
        ConventionPolicy.is_literal(term)
    }
}

#[test]
fn test_injection_without_argument() {
    let map = PlaceholderVarMap::default();
    let term = t("Pair(Wrap(), Wrap(?x))");
    assert_eq!(
        replace_variables_by_placeholders(&term, &map, &LooseInjections),
        Term::appl("Pair", [t("Wrap()"), Term::appl(DEFAULT_PLACEHOLDER_OP, [])])
    );
}
