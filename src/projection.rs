use crate::model::{C2Category, Edge, GraphInput, LayoutResult, Node, PlacedNode};

/// Placements of the unified graph split back into the three input partitions.
///
/// Composition lays nodes out as raw nodes, then tier-1 then tier-2
/// categories, one entry per input record, so each record is paired with its
/// placement by index. Repeated ids therefore keep their own placements.
#[derive(Debug, Clone, Copy)]
pub struct PartitionPlacements<'a> {
    nodes: &'a [PlacedNode],
    c1_categories: &'a [PlacedNode],
    c2_categories: &'a [PlacedNode],
}

impl<'a> PartitionPlacements<'a> {
    pub fn split(input: &GraphInput, placed: &'a [PlacedNode]) -> Self {
        let (nodes, rest) = placed.split_at(input.nodes.len().min(placed.len()));
        let (c1_categories, c2_categories) =
            rest.split_at(input.c1_categories.len().min(rest.len()));
        Self {
            nodes,
            c1_categories,
            c2_categories,
        }
    }
}

fn place_all(records: &[Node], placed: &[PlacedNode]) -> Vec<Node> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| place_one(record, placed.get(idx)))
        .collect()
}

fn place_one(record: &Node, placed: Option<&PlacedNode>) -> Node {
    let mut node = record.clone();
    if let Some(placed) = placed {
        node.place(placed);
    }
    node
}

/// Copy computed coordinates back onto the caller's three node partitions.
///
/// Every field of the input records is kept; only `x`, `y` and `position`
/// are overwritten. Records without a placement pass through unchanged.
pub fn project(input: &GraphInput, placed: &[PlacedNode], edges: Vec<Edge>) -> LayoutResult {
    let partitions = PartitionPlacements::split(input, placed);
    let nodes = place_all(&input.nodes, partitions.nodes);
    let c1_categories = place_all(&input.c1_categories, partitions.c1_categories);
    let c2_categories = input
        .c2_categories
        .iter()
        .enumerate()
        .map(|(idx, category)| C2Category {
            node: place_one(&category.node, partitions.c2_categories.get(idx)),
            ..category.clone()
        })
        .collect();

    LayoutResult {
        nodes,
        c1_categories,
        c2_categories,
        edges,
    }
}
