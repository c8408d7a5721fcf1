use super::*;

fn re(src: &str) -> LabelRegex {
    src.parse().expect("regex should parse")
}

fn l(name: &str) -> Label {
    Label::new(name)
}

#[test]
fn test_parse_and_display() {
    assert_eq!(re("P* I").to_string(), "P* I");
    assert_eq!(re("(P | I)*").to_string(), "(P | I)*");
    assert_eq!(re("e"), LabelRegex::Epsilon);
    assert_eq!(re("0"), LabelRegex::Empty);
}

#[test]
fn test_optional_and_plus() {
    let opt = re("I?");
    assert!(opt.is_nullable());
    assert!(opt.can_step(&l("I")));

    let plus = re("P+");
    assert!(!plus.is_nullable());
    assert!(plus.derive(&l("P")).is_nullable());
}

#[test]
fn test_nullable() {
    assert!(re("P*").is_nullable());
    assert!(!re("P").is_nullable());
    assert!(re("P* I*").is_nullable());
    assert!(!re("P* I").is_nullable());
}

#[test]
fn test_derivatives() {
    let r = re("P* I");
    assert_eq!(r.derive(&l("P")), r);
    assert_eq!(r.derive(&l("I")), LabelRegex::Epsilon);
    assert!(r.derive(&l("X")).is_empty());
    assert!(!r.derive(&l("I")).can_step(&l("P")));
}

#[test]
fn test_smart_constructors_simplify() {
    assert_eq!(
        LabelRegex::concat(LabelRegex::Epsilon, LabelRegex::label("P")),
        LabelRegex::label("P")
    );
    assert_eq!(
        LabelRegex::concat(LabelRegex::Empty, LabelRegex::label("P")),
        LabelRegex::Empty
    );
    assert_eq!(
        LabelRegex::or(LabelRegex::label("P"), LabelRegex::label("P")),
        LabelRegex::label("P")
    );
}

#[test]
fn test_parse_errors() {
    assert!(matches!("(P".parse::<LabelRegex>(), Err(LabelParseError::UnexpectedEnd)));
    assert!(matches!(
        "P )".parse::<LabelRegex>(),
        Err(LabelParseError::UnexpectedChar { found: ')', .. })
    ));
}

#[test]
fn test_label_order_is_transitive() {
    let order: LabelOrder = "$ < I, I < P".parse().expect("order should parse");
    let data = EdgeOrData::Data;
    let i = EdgeOrData::Edge(l("I"));
    let p = EdgeOrData::Edge(l("P"));
    assert!(order.lt(&data, &i));
    assert!(order.lt(&data, &p));
    assert!(order.lt(&i, &p));
    assert!(!order.lt(&p, &i));
}

#[test]
fn test_label_order_rejects_garbage() {
    assert!(matches!(
        "$ > P".parse::<LabelOrder>(),
        Err(LabelParseError::InvalidOrder(_))
    ));
}

#[test]
fn test_serde_uses_text() {
    let json = serde_json::to_string(&re("P* I")).expect("serialize");
    assert_eq!(json, "\"P* I\"");
    let order: LabelOrder = serde_json::from_str("\"$ < P\"").expect("deserialize");
    assert!(order.lt(&EdgeOrData::Data, &EdgeOrData::Edge(l("P"))));
}

#[test]
fn test_mentioned_labels() {
    assert_eq!(re("P* (I | P) Q?").labels(), vec![l("P"), l("I"), l("Q")]);
    let order: LabelOrder = "$ < I, I < P".parse().expect("order should parse");
    let mut labels = order.labels();
    labels.sort();
    assert_eq!(labels, vec![l("I"), l("P")]);
}
