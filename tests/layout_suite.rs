use serde_json::{Value, json};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tiered_graph_layout::{
    C2Category, Edge, GraphInput, LayoutConfig, Node, Position, Relationship, arrange_nodes,
    layout_graph,
};

fn assert_placed(node: &Node, context: &str) {
    let position = node
        .position
        .unwrap_or_else(|| panic!("{context}: `{}` has no position", node.id));
    assert!(position.is_finite(), "{context}: `{}` position not finite", node.id);
    assert!(node.x.is_some() && node.y.is_some(), "{context}: `{}` missing x/y", node.id);
}

fn all_positions(result: &tiered_graph_layout::LayoutResult) -> Vec<(String, Position)> {
    let mut out = Vec::new();
    for node in result.nodes.iter().chain(&result.c1_categories) {
        out.push((node.id.clone(), node.position.unwrap()));
    }
    for category in &result.c2_categories {
        out.push((category.node.id.clone(), category.node.position.unwrap()));
    }
    out
}

fn finishes_within<T, F>(limit: Duration, job: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(job());
    });
    rx.recv_timeout(limit)
        .unwrap_or_else(|_| panic!("layout did not finish within {limit:?}"))
}

fn sibling_categories() -> GraphInput {
    GraphInput {
        nodes: (0..8).map(|idx| Node::new(format!("n{idx}"))).collect(),
        c1_categories: vec![Node::new("c1")],
        c2_categories: vec![
            C2Category::new("c2-a", "c1").with_nodes(["n0", "n1", "n2", "n3"]),
            C2Category::new("c2-b", "c1").with_nodes(["n4", "n5", "n6", "n7"]),
        ],
        cross_relationships: vec![Relationship::new("x", "c2-a", "c2-b")],
        ..Default::default()
    }
}

fn minimal_input() -> GraphInput {
    GraphInput {
        nodes: vec![Node::new("n1")],
        c1_categories: vec![Node::new("c1-a")],
        c2_categories: vec![C2Category::new("c2-a", "c1-a").with_nodes(["n1"])],
        ..Default::default()
    }
}

#[test]
fn end_to_end_minimal_hierarchy() {
    let result = layout_graph(&minimal_input(), &LayoutConfig::default());

    let edge_ids: Vec<&str> = result.edges.iter().map(|edge| edge.id.as_str()).collect();
    assert_eq!(edge_ids, vec!["c1-c1-a-to-c2-c2-a", "c2-c2-a-to-node-n1"]);

    assert_placed(&result.nodes[0], "raw");
    assert_placed(&result.c1_categories[0], "c1");
    assert_placed(&result.c2_categories[0].node, "c2");

    // Top-to-bottom flow: category above sub-category above member.
    let c1 = result.c1_categories[0].y.unwrap();
    let c2 = result.c2_categories[0].node.y.unwrap();
    let n1 = result.nodes[0].y.unwrap();
    assert!(c1 < c2 && c2 < n1, "expected c1 < c2 < n1, got {c1} {c2} {n1}");
}

#[test]
fn relationship_resolves_name_and_passes_raw_id() {
    let mut billing = C2Category::new("c2-x", "c1-a");
    billing.node.label = Some("Billing".to_string());
    let input = GraphInput {
        c1_categories: vec![Node::new("c1-a")],
        c2_categories: vec![billing],
        c2_relationships: vec![Relationship::new("r1", "Billing", "c2-y")],
        ..Default::default()
    };
    let result = layout_graph(&input, &LayoutConfig::default());
    let edge = result.edges.iter().find(|edge| edge.id == "r1").unwrap();
    assert_eq!(edge.source, "c2-x");
    assert_eq!(edge.target, "c2-y");
    assert_placed(&result.c2_categories[0].node, "dangling relationship");
}

#[test]
fn containment_edges_cover_every_membership() {
    let input = GraphInput {
        nodes: (1..=4).map(|idx| Node::new(format!("n{idx}"))).collect(),
        c1_categories: vec![Node::new("c1-a"), Node::new("c1-b")],
        c2_categories: vec![
            C2Category::new("c2-a", "c1-a").with_nodes(["n1", "n2"]),
            C2Category::new("c2-b", "c1-b").with_nodes(["n3", "n4", "n1"]),
        ],
        ..Default::default()
    };
    let result = layout_graph(&input, &LayoutConfig::default());

    for category in &input.c2_categories {
        let owner = result
            .edges
            .iter()
            .filter(|edge| {
                edge.source == category.c1_category_id
                    && edge.target == category.id()
                    && edge.label.as_deref() == Some("contains")
            })
            .count();
        assert_eq!(owner, 1, "owner edge for {}", category.id());
        for member in &category.node_ids {
            let members = result
                .edges
                .iter()
                .filter(|edge| {
                    edge.source == category.id()
                        && &edge.target == member
                        && edge.label.as_deref() == Some("contains")
                })
                .count();
            assert_eq!(members, 1, "member edge {} -> {member}", category.id());
        }
    }
    assert_eq!(result.edges.len(), 2 + 5);
}

#[test]
fn unresolvable_relationships_are_dropped_but_broken_edges_kept() {
    let mut input = minimal_input();
    input.cross_relationships = vec![
        Relationship::new("empty", "", "c2-a"),
        Relationship::new("kept", "c2-a", "n1"),
    ];
    input.edges = vec![Edge::new("half", "n1", "")];
    let result = layout_graph(&input, &LayoutConfig::default());

    let ids: Vec<&str> = result.edges.iter().map(|edge| edge.id.as_str()).collect();
    assert!(!ids.contains(&"empty"));
    assert!(ids.contains(&"kept"));
    assert!(ids.contains(&"half"));
}

#[test]
fn opaque_fields_survive_the_pipeline() {
    let input: GraphInput = serde_json::from_value(json!({
        "nodes": [{"id": "n1", "label": "parse_args", "loc": 42, "meta": {"file": "cli.py"}}],
        "c1Categories": [{"id": "c1-a", "color": "#ff0000"}],
        "c2Categories": [{
            "id": "c2-a",
            "name": "Parsing",
            "c1CategoryId": "c1-a",
            "nodeIds": ["n1"],
            "collapsed": true
        }]
    }))
    .unwrap();
    let result = layout_graph(&input, &LayoutConfig::default());

    let node = &result.nodes[0];
    assert_eq!(node.label.as_deref(), Some("parse_args"));
    assert_eq!(node.extra.get("loc"), Some(&json!(42)));
    assert_eq!(node.extra.get("meta"), Some(&json!({"file": "cli.py"})));
    assert_eq!(result.c1_categories[0].extra.get("color"), Some(&json!("#ff0000")));

    let c2 = &result.c2_categories[0];
    assert_eq!(c2.name.as_deref(), Some("Parsing"));
    assert_eq!(c2.node.extra.get("collapsed"), Some(&Value::Bool(true)));

    let out = serde_json::to_value(c2).unwrap();
    assert_eq!(out["c1CategoryId"], "c1-a");
    assert_eq!(out["collapsed"], true);
    assert!(out["position"]["x"].is_number());
}

#[test]
fn duplicate_ids_fall_back_to_their_own_coordinates() {
    let mut input = minimal_input();
    // Raw `n1` comes first in the unified order and keeps the layout slot.
    input.nodes.push(Node::new("n1"));
    let mut hinted = Node::new("n1");
    hinted.x = Some(12.0);
    hinted.y = Some(34.0);
    input.c1_categories.push(hinted);

    // No separation pass, so fallback coordinates come through untouched.
    let config = LayoutConfig {
        min_distance: 0.0,
        ..Default::default()
    };
    let result = layout_graph(&input, &config);

    let hinted = &result.c1_categories[1];
    assert_eq!((hinted.x, hinted.y), (Some(12.0), Some(34.0)));
    assert_eq!(hinted.position, Some(Position::new(12.0, 34.0)));

    let bare = &result.nodes[1];
    assert_eq!((bare.x, bare.y), (Some(0.0), Some(0.0)));
    assert_eq!(bare.position, Some(Position::ORIGIN));

    assert_placed(&result.nodes[0], "slot owner");
    assert_ne!(result.nodes[0].position, Some(Position::ORIGIN));
}

#[test]
fn repeated_id_within_raw_nodes_keeps_each_placement() {
    let mut hinted = Node::new("dup");
    hinted.position = Some(Position::new(900.0, 900.0));
    let input = GraphInput {
        nodes: vec![Node::new("dup"), hinted],
        ..Default::default()
    };
    let config = LayoutConfig {
        min_distance: 0.0,
        ..Default::default()
    };
    let result = layout_graph(&input, &config);
    assert_eq!(result.nodes[1].position, Some(Position::new(900.0, 900.0)));
    assert_ne!(result.nodes[0].position, result.nodes[1].position);
}

#[test]
fn sibling_relationship_layout_terminates() {
    let input = sibling_categories();
    let result = finishes_within(Duration::from_secs(60), move || {
        layout_graph(&input, &LayoutConfig::default())
    });
    assert_eq!(result.node_count(), 11);
    for node in result.nodes.iter().chain(&result.c1_categories) {
        assert_placed(node, "sibling relationship");
    }
    let c1 = result.c1_categories[0].y.unwrap();
    let c2 = result.c2_categories[0].node.y.unwrap();
    assert!(c1 < c2, "expected c1 above c2, got {c1} {c2}");
}

#[test]
fn composed_nodes_respect_minimum_distance() {
    let input = sibling_categories();
    let config = LayoutConfig {
        overlap_passes: 100,
        ..Default::default()
    };
    let job_config = config.clone();
    let result = finishes_within(Duration::from_secs(60), move || {
        layout_graph(&input, &job_config)
    });
    let positions = all_positions(&result);
    assert_eq!(positions.len(), 11);
    for (i, (a_id, a)) in positions.iter().enumerate() {
        for (b_id, b) in &positions[i + 1..] {
            assert!(
                a.distance(*b) >= config.min_distance - 0.01,
                "{a_id} and {b_id} closer than minimum"
            );
        }
    }
}

#[test]
fn arrangement_places_flat_graph() {
    let nodes: Vec<Node> = ["a", "b", "c"].into_iter().map(Node::new).collect();
    let edges = vec![Edge::new("ab", "a", "b"), Edge::new("bc", "b", "c")];
    let arranged = arrange_nodes(&nodes, &edges, &LayoutConfig::default());
    assert_eq!(arranged.len(), 3);
    for node in &arranged {
        assert_placed(node, "arrange");
    }
    assert!(arranged[0].y.unwrap() < arranged[2].y.unwrap());
}
