use crate::model::{
    C2Category, Edge, EdgeOrigin, GraphInput, GraphNode, NodeTier, Relationship,
    RelationshipOrigin,
};
use crate::resolver::NameResolver;

pub const CONTAINS_LABEL: &str = "contains";

/// The merged node and edge sets handed to the layout oracle.
#[derive(Debug, Clone, Default)]
pub struct UnifiedGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

/// Merge every node partition and edge source of `input` into one graph.
///
/// Never fails: dangling references are kept as edges and left for the
/// layout step to skip, and relationships whose endpoints resolve to nothing
/// are dropped.
pub fn compose(input: &GraphInput) -> UnifiedGraph {
    let resolver = NameResolver::from_categories(&input.c2_categories);

    let mut nodes = Vec::with_capacity(
        input.nodes.len() + input.c1_categories.len() + input.c2_categories.len(),
    );
    nodes.extend(
        input
            .nodes
            .iter()
            .map(|node| GraphNode::from_node(node, NodeTier::Entity)),
    );
    nodes.extend(
        input
            .c1_categories
            .iter()
            .map(|category| GraphNode::from_node(category, NodeTier::Category)),
    );
    nodes.extend(
        input
            .c2_categories
            .iter()
            .map(|category| GraphNode::from_node(&category.node, NodeTier::SubCategory)),
    );

    let mut edges = input.edges.clone();
    edges.extend(input.c2_categories.iter().map(category_edge));
    for category in &input.c2_categories {
        edges.extend(member_edges(category));
    }
    edges.extend(relationship_edges(
        &input.c2_relationships,
        &resolver,
        RelationshipOrigin::SameTier,
    ));
    edges.extend(relationship_edges(
        &input.cross_relationships,
        &resolver,
        RelationshipOrigin::Cross,
    ));

    log::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        names = resolver.len();
        "Composed unified graph"
    );
    UnifiedGraph { nodes, edges }
}

/// Containment edge from the owning tier-1 category to `category`.
pub fn category_edge(category: &C2Category) -> Edge {
    let c1 = &category.c1_category_id;
    let c2 = category.id();
    containment_edge(format!("c1-{c1}-to-c2-{c2}"), c1, c2)
}

/// Containment edges from `category` to each of its member nodes, in order.
pub fn member_edges(category: &C2Category) -> impl Iterator<Item = Edge> + '_ {
    let c2 = category.id();
    category
        .node_ids
        .iter()
        .map(move |node_id| containment_edge(format!("c2-{c2}-to-node-{node_id}"), c2, node_id))
}

fn containment_edge(id: String, source: &str, target: &str) -> Edge {
    let mut edge = Edge::new(id, source, target);
    edge.label = Some(CONTAINS_LABEL.to_string());
    edge.origin = EdgeOrigin::Containment;
    edge
}

/// Resolve relationship endpoints into edges, dropping any relationship with
/// an endpoint that resolves to an empty id.
pub fn relationship_edges(
    relationships: &[Relationship],
    resolver: &NameResolver,
    origin: RelationshipOrigin,
) -> Vec<Edge> {
    relationships
        .iter()
        .filter_map(|relationship| {
            let source = resolver.resolve(&relationship.from_c2);
            let target = resolver.resolve(&relationship.to_c2);
            if source.is_empty() || target.is_empty() {
                log::debug!(
                    id = relationship.id.as_str(),
                    from = relationship.from_c2.as_str(),
                    to = relationship.to_c2.as_str();
                    "Dropping relationship with unresolved endpoint"
                );
                return None;
            }
            Some(Edge {
                id: relationship.id.clone(),
                source: source.to_string(),
                target: target.to_string(),
                label: relationship.label.clone(),
                origin: origin.into(),
                extra: relationship.extra.clone(),
            })
        })
        .collect()
}
