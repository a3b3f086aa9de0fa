use std::cmp::Ordering;

use crate::ComparisonGraph;

fn graph(nodes: &[&'static str]) -> ComparisonGraph<&'static str> {
    let mut graph = ComparisonGraph::new();
    for node in nodes {
        graph.add_node(*node);
    }
    graph
}

#[test]
fn weights_sort_descending() {
    let mut g = graph(&["B", "A"]);
    g.set_weight("A", 10);
    g.set_weight("B", 5);

    assert_eq!(g.compare(&"A", &"B"), Ordering::Greater);
    assert_eq!(g.sorted(true), vec!["A", "B"]);
    assert_eq!(g.sorted(false), vec!["B", "A"]);
}

#[test]
fn relation_without_weights() {
    let mut g = graph(&["A", "B"]);
    g.connect("A", "B", Ordering::Less);

    assert_eq!(g.compare(&"A", &"B"), Ordering::Less);
    assert_eq!(g.compare(&"B", &"A"), Ordering::Greater);
    assert_eq!(g.sorted(true), vec!["B", "A"]);
}

#[test]
fn connect_inserts_inverse() {
    let mut g = ComparisonGraph::new();
    g.connect("x", "y", Ordering::Greater);
    assert_eq!(g.relation(&"y", &"x"), Some(Ordering::Less));
    assert_eq!(g.nodes().count(), 0);
}

#[test]
fn equal_arc_propagates_weight() {
    let mut g = graph(&["A", "B", "C"]);
    g.set_weight("B", 5);
    g.set_weight("C", 3);
    g.connect("A", "B", Ordering::Equal);

    assert_eq!(g.compare(&"A", &"C"), Ordering::Greater);
    assert_eq!(g.compare(&"C", &"A"), Ordering::Less);
}

#[test]
fn less_arc_is_transitive() {
    let mut g = graph(&["A", "B", "C"]);
    g.connect("A", "B", Ordering::Less);
    g.connect("B", "C", Ordering::Less);

    assert_eq!(g.compare(&"A", &"C"), Ordering::Less);
    assert_eq!(g.sorted(true), vec!["C", "B", "A"]);
}

#[test]
fn unrelated_nodes_keep_input_order() {
    let mut g = graph(&["ID", "NUM", "KEYWORD"]);
    g.connect("ID", "KEYWORD", Ordering::Less);

    assert_eq!(g.compare(&"NUM", &"ID"), Ordering::Equal);
    assert_eq!(g.sorted(true), vec!["NUM", "KEYWORD", "ID"]);
}

#[test]
fn sort_subset() {
    let mut g = graph(&["a", "b", "c"]);
    g.set_weight("a", 1);
    g.set_weight("c", 9);
    assert_eq!(g.sort(vec!["a", "c"], true), vec!["c", "a"]);
}

#[test]
fn cycle_is_reported_and_sort_terminates() {
    let mut g = graph(&["A", "B", "C"]);
    g.connect("A", "B", Ordering::Less);
    g.connect("B", "C", Ordering::Less);
    g.connect("C", "A", Ordering::Less);

    assert_eq!(g.sorted(true), vec!["A", "C", "B"]);
    assert_eq!(g.conflicts(), vec![("A", "B"), ("A", "C"), ("B", "C")]);
}

#[test]
fn cycle_through_unregistered_nodes_conflicts() {
    let mut g = graph(&["A", "B"]);
    g.connect("A", "X", Ordering::Less);
    g.connect("X", "B", Ordering::Less);
    g.connect("B", "Y", Ordering::Less);
    g.connect("Y", "A", Ordering::Less);

    assert_eq!(g.conflicts(), vec![("A", "B")]);
}

#[test]
fn consistent_graph_has_no_conflicts() {
    let mut g = graph(&["A", "B", "C"]);
    g.set_weight("A", 1);
    g.set_weight("B", 2);
    g.connect("C", "A", Ordering::Equal);
    assert!(g.conflicts().is_empty());
}

#[test]
fn long_relation_chain_sorts() {
    let names: Vec<String> = (0..120).map(|i| format!("R{i}")).collect();
    let mut g = ComparisonGraph::new();
    for name in &names {
        g.add_node(name.clone());
    }
    for pair in names.windows(2) {
        g.connect(pair[1].clone(), pair[0].clone(), Ordering::Less);
    }

    assert_eq!(g.sorted(true), names);
    let mut ascending = names.clone();
    ascending.reverse();
    assert_eq!(g.sorted(false), ascending);
}
