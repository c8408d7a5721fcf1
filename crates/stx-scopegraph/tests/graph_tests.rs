use super::*;

#[test]
fn test_graph_is_persistent() {
    let empty = ScopeGraph::new();
    let one = empty.with_edge(Scope(0), Label::new("P"), Scope(1));
    assert_eq!(empty.edge_count(), 0);
    assert_eq!(one.edge_count(), 1);
    assert!(one.contains_scope(Scope(1)));
}

#[test]
fn test_edges_keep_insertion_order() {
    let graph = ScopeGraph::new()
        .with_edge(Scope(0), Label::new("I"), Scope(2))
        .with_edge(Scope(0), Label::new("I"), Scope(1));
    let targets: Vec<_> = graph.edges(Scope(0), &Label::new("I")).collect();
    assert_eq!(targets, vec![Scope(2), Scope(1)]);
    assert_eq!(graph.edges(Scope(0), &Label::new("P")).count(), 0);
}

#[test]
fn test_data() {
    let graph = ScopeGraph::new()
        .with_datum(Scope(0), Term::string("x"))
        .with_datum(Scope(0), Term::string("y"));
    let data: Vec<_> = graph.data(Scope(0)).cloned().collect();
    assert_eq!(data, vec![Term::string("x"), Term::string("y")]);
}

#[test]
fn test_display_lists_edges_per_scope() {
    let graph = ScopeGraph::new()
        .with_datum(Scope(1), Term::string("x"))
        .with_edge(Scope(1), Label::new("P"), Scope(0));
    assert_eq!(graph.to_string(), "#0\n#1 : \"x\"\n  -P-> #0\n");
}
