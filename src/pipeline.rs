use crate::compose::compose;
use crate::config::LayoutConfig;
use crate::layout::{DagreOracle, Fallback, LayoutOracle, apply_layout};
use crate::model::{Edge, GraphInput, GraphNode, LayoutResult, Node, NodeTier};
use crate::overlap::resolve_overlaps;
use crate::projection::project;

/// Compose, lay out, separate and project `input` with the dagre engine.
pub fn layout_graph(input: &GraphInput, config: &LayoutConfig) -> LayoutResult {
    layout_graph_with(&mut DagreOracle::new(), input, config)
}

/// [`layout_graph`] with a caller-supplied layout engine.
///
/// Nodes the engine does not place keep their own coordinates, or sit at the
/// origin when they have none.
pub fn layout_graph_with<O: LayoutOracle>(
    oracle: &mut O,
    input: &GraphInput,
    config: &LayoutConfig,
) -> LayoutResult {
    let graph = compose(input);
    let mut placed = apply_layout(
        oracle,
        &graph.nodes,
        &graph.edges,
        config.composition_footprint,
        &config.layout_options(),
        config.duplicate_ids,
        Fallback::Origin,
    );
    let adjustments = resolve_overlaps(&mut placed, config.min_distance, config.overlap_passes);
    log::debug!(adjustments; "Resolved node overlaps");

    project(input, &placed, graph.edges)
}

/// Lay out an already composed set of nodes and edges with the dagre engine.
pub fn arrange_nodes(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Vec<Node> {
    arrange_nodes_with(&mut DagreOracle::new(), nodes, edges, config)
}

/// [`arrange_nodes`] with a caller-supplied layout engine.
///
/// Uses the arrangement footprint. Nodes the engine does not place keep their
/// own coordinates, or are scattered over the configured square when they have
/// none.
pub fn arrange_nodes_with<O: LayoutOracle>(
    oracle: &mut O,
    nodes: &[Node],
    edges: &[Edge],
    config: &LayoutConfig,
) -> Vec<Node> {
    let graph_nodes: Vec<GraphNode> = nodes
        .iter()
        .map(|node| GraphNode::from_node(node, NodeTier::Entity))
        .collect();
    let mut placed = apply_layout(
        oracle,
        &graph_nodes,
        edges,
        config.arrangement_footprint,
        &config.layout_options(),
        config.duplicate_ids,
        Fallback::Scatter {
            extent: config.scatter_extent,
            seed: config.scatter_seed,
        },
    );
    resolve_overlaps(&mut placed, config.min_distance, config.overlap_passes);

    nodes
        .iter()
        .zip(&placed)
        .map(|(node, placed)| {
            let mut node = node.clone();
            node.place(placed);
            node
        })
        .collect()
}
