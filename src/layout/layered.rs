//! Deterministic layered placement.
//!
//! Ranks follow the longest path from the sources, nodes inside a rank are
//! ordered by the median slot of their neighbours, and the cross axis is
//! packed by sweeping down and up the ranks. Always terminates, so it backs
//! the dagre engine when that cannot finish.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use super::{Direction, LayoutOptions, LayoutOracle, Placement, RegisteredGraph};
use crate::error::LayoutError;
use crate::model::{Position, Size};

const ORDER_PASSES: usize = 2;
const PLACEMENT_SWEEPS: usize = 2;

/// [`LayoutOracle`] that runs the layered placement directly.
#[derive(Debug, Default)]
pub struct LayeredOracle {
    graph: RegisteredGraph,
}

impl LayeredOracle {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayoutOracle for LayeredOracle {
    fn register_node(&mut self, id: &str, footprint: Size) {
        self.graph.add_node(id, footprint);
    }

    fn register_edge(&mut self, source: &str, target: &str) {
        self.graph.add_edge(source, target);
    }

    fn compute_layout(
        &mut self,
        options: &LayoutOptions,
    ) -> Result<HashMap<String, Placement>, LayoutError> {
        Ok(place_layered(&self.graph, options))
    }
}

fn is_horizontal(direction: Direction) -> bool {
    matches!(direction, Direction::LeftRight | Direction::RightLeft)
}

pub(crate) fn place_layered(
    graph: &RegisteredGraph,
    options: &LayoutOptions,
) -> HashMap<String, Placement> {
    let count = graph.nodes.len();
    if count == 0 {
        return HashMap::new();
    }

    let mut incoming = vec![Vec::new(); count];
    let mut outgoing = vec![Vec::new(); count];
    for &(from, to) in &graph.edges {
        outgoing[from].push(to);
        incoming[to].push(from);
    }

    let ranks = assign_ranks(count, &outgoing);
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    for (node, rank) in ranks.iter().enumerate() {
        buckets[*rank].push(node);
    }
    order_ranks(&mut buckets, &incoming, &outgoing, count);

    let horizontal = is_horizontal(options.direction);
    let (main_size, cross_half): (Vec<f32>, Vec<f32>) = graph
        .nodes
        .iter()
        .map(|(_, size)| {
            if horizontal {
                (size.width, size.height / 2.0)
            } else {
                (size.height, size.width / 2.0)
            }
        })
        .unzip();

    let mut main = vec![0.0f32; count];
    let mut cursor = options.margin;
    for bucket in &buckets {
        let extent = bucket
            .iter()
            .map(|node| main_size[*node])
            .fold(0.0f32, f32::max);
        for node in bucket {
            main[*node] = cursor + extent / 2.0;
        }
        cursor += extent + options.rank_separation;
    }
    if matches!(options.direction, Direction::BottomTop | Direction::RightLeft) {
        let span_end = cursor - options.rank_separation;
        for value in &mut main {
            *value = options.margin + span_end - *value;
        }
    }

    let cross = place_cross(
        &buckets,
        &incoming,
        &outgoing,
        &cross_half,
        options.node_separation,
    );
    let low = cross
        .iter()
        .zip(&cross_half)
        .map(|(center, half)| center - half)
        .fold(f32::INFINITY, f32::min);
    let offset = options.margin - low;

    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(node, (id, footprint))| {
            let across = cross[node] + offset;
            let center = if horizontal {
                Position::new(main[node], across)
            } else {
                Position::new(across, main[node])
            };
            (
                id.clone(),
                Placement {
                    center,
                    footprint: *footprint,
                },
            )
        })
        .collect()
}

/// Longest-path ranks over a topological order. Cycles are broken at the
/// earliest registered node still waiting, treating its incoming edges as
/// back-edges.
fn assign_ranks(count: usize, outgoing: &[Vec<usize>]) -> Vec<usize> {
    let mut indegree = vec![0usize; count];
    for targets in outgoing {
        for target in targets {
            indegree[*target] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..count)
        .filter(|node| indegree[*node] == 0)
        .map(Reverse)
        .collect();
    let mut processed = vec![false; count];
    let mut order = Vec::with_capacity(count);
    loop {
        while let Some(Reverse(node)) = ready.pop() {
            if processed[node] {
                continue;
            }
            processed[node] = true;
            order.push(node);
            for next in &outgoing[node] {
                if processed[*next] {
                    continue;
                }
                indegree[*next] = indegree[*next].saturating_sub(1);
                if indegree[*next] == 0 {
                    ready.push(Reverse(*next));
                }
            }
        }
        match (0..count).find(|node| !processed[*node]) {
            Some(node) => ready.push(Reverse(node)),
            None => break,
        }
    }

    let mut slot = vec![0usize; count];
    for (idx, node) in order.iter().enumerate() {
        slot[*node] = idx;
    }
    let mut ranks = vec![0usize; count];
    for node in &order {
        for next in &outgoing[*node] {
            if slot[*next] > slot[*node] {
                ranks[*next] = ranks[*next].max(ranks[*node] + 1);
            }
        }
    }
    ranks
}

fn order_ranks(
    buckets: &mut [Vec<usize>],
    incoming: &[Vec<usize>],
    outgoing: &[Vec<usize>],
    count: usize,
) {
    let mut slot = vec![0usize; count];
    for bucket in buckets.iter() {
        for (idx, node) in bucket.iter().enumerate() {
            slot[*node] = idx;
        }
    }
    if buckets.len() <= 1 {
        return;
    }
    for _ in 0..ORDER_PASSES {
        for rank in 1..buckets.len() {
            sort_bucket(&mut buckets[rank], incoming, &mut slot);
        }
        for rank in (0..buckets.len() - 1).rev() {
            sort_bucket(&mut buckets[rank], outgoing, &mut slot);
        }
    }
}

fn sort_bucket(bucket: &mut Vec<usize>, neighbors: &[Vec<usize>], slot: &mut [usize]) {
    if bucket.len() <= 1 {
        return;
    }
    let mut keyed: Vec<(f32, usize, usize)> = bucket
        .iter()
        .map(|node| (median_slot(*node, neighbors, slot), slot[*node], *node))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    bucket.clear();
    bucket.extend(keyed.into_iter().map(|(_, _, node)| node));
    for (idx, node) in bucket.iter().enumerate() {
        slot[*node] = idx;
    }
}

fn median_slot(node: usize, neighbors: &[Vec<usize>], slot: &[usize]) -> f32 {
    let mut values: Vec<f32> = neighbors[node]
        .iter()
        .map(|neighbor| slot[*neighbor] as f32)
        .collect();
    if values.is_empty() {
        return slot[node] as f32;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) * 0.5
    }
}

fn place_cross(
    buckets: &[Vec<usize>],
    incoming: &[Vec<usize>],
    outgoing: &[Vec<usize>],
    half: &[f32],
    separation: f32,
) -> Vec<f32> {
    let mut cross: Vec<Option<f32>> = vec![None; half.len()];
    for _ in 0..PLACEMENT_SWEEPS {
        for bucket in buckets {
            place_rank(bucket, incoming, half, separation, &mut cross);
        }
        for bucket in buckets.iter().rev() {
            place_rank(bucket, outgoing, half, separation, &mut cross);
        }
    }
    cross.into_iter().map(|value| value.unwrap_or(0.0)).collect()
}

/// Pull each node of `bucket` towards the mean of its placed neighbours,
/// then pack the rank left to right and recentre it on the desired mean.
fn place_rank(
    bucket: &[usize],
    neighbors: &[Vec<usize>],
    half: &[f32],
    separation: f32,
    cross: &mut [Option<f32>],
) {
    if bucket.is_empty() {
        return;
    }
    let desired: Vec<f32> = bucket
        .iter()
        .map(|node| {
            let placed: Vec<f32> = neighbors[*node]
                .iter()
                .filter_map(|neighbor| cross[*neighbor])
                .collect();
            if placed.is_empty() {
                cross[*node].unwrap_or(0.0)
            } else {
                placed.iter().sum::<f32>() / placed.len() as f32
            }
        })
        .collect();
    let desired_mean = desired.iter().sum::<f32>() / desired.len() as f32;

    let mut assigned = Vec::with_capacity(bucket.len());
    let mut previous: Option<(f32, f32)> = None;
    for (node, want) in bucket.iter().zip(&desired) {
        let center = match previous {
            Some((prev_center, prev_half)) => {
                want.max(prev_center + prev_half + half[*node] + separation)
            }
            None => *want,
        };
        assigned.push(center);
        previous = Some((center, half[*node]));
    }

    let actual_mean = assigned.iter().sum::<f32>() / assigned.len() as f32;
    let delta = desired_mean - actual_mean;
    for (node, center) in bucket.iter().zip(assigned) {
        cross[*node] = Some(center + delta);
    }
}
