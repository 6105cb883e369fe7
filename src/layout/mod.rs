//! Coordinate assignment through a hierarchical layout engine.
//!
//! The engine is consumed through [`LayoutOracle`] so composition never
//! depends on a particular implementation. [`apply_layout`] drives an oracle
//! over a unified graph and reads back one placement per node, falling back
//! to coordinate hints for nodes the oracle did not place.

pub mod dagre;
pub mod layered;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DuplicatePolicy;
use crate::error::LayoutError;
use crate::model::{Edge, GraphNode, PlacedNode, Position, Size};

pub use self::dagre::DagreOracle;
pub use self::layered::LayeredOracle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "TB" | "TD" => Some(Self::TopBottom),
            "BT" => Some(Self::BottomTop),
            "LR" => Some(Self::LeftRight),
            "RL" => Some(Self::RightLeft),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub direction: Direction,
    pub node_separation: f32,
    pub rank_separation: f32,
    pub margin: f32,
    /// How long an engine may run before its result is abandoned.
    pub time_limit: Duration,
}

/// Centre and effective footprint reported by the oracle for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub center: Position,
    pub footprint: Size,
}

/// A hierarchical layout engine.
pub trait LayoutOracle {
    /// Register a node. Registering an id twice is a no-op.
    fn register_node(&mut self, id: &str, footprint: Size);

    /// Register a directed edge. No-op unless both ids were registered.
    fn register_edge(&mut self, source: &str, target: &str);

    fn compute_layout(
        &mut self,
        options: &LayoutOptions,
    ) -> Result<HashMap<String, Placement>, LayoutError>;
}

/// Nodes and edges handed to an engine, deduplicated, in registration order.
///
/// Edges are stored as index pairs into `nodes` and never form self-loops.
#[derive(Debug, Clone, Default)]
pub(crate) struct RegisteredGraph {
    pub(crate) nodes: Vec<(String, Size)>,
    index: HashMap<String, usize>,
    pub(crate) edges: Vec<(usize, usize)>,
    edge_set: HashSet<(usize, usize)>,
}

impl RegisteredGraph {
    pub(crate) fn add_node(&mut self, id: &str, footprint: Size) {
        if self.index.contains_key(id) {
            return;
        }
        self.index.insert(id.to_string(), self.nodes.len());
        self.nodes.push((id.to_string(), footprint));
    }

    pub(crate) fn add_edge(&mut self, source: &str, target: &str) {
        let (Some(&from), Some(&to)) = (self.index.get(source), self.index.get(target)) else {
            return;
        };
        if from != to && self.edge_set.insert((from, to)) {
            self.edges.push((from, to));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Where nodes without oracle output and without coordinate hints end up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    Origin,
    /// Uniformly scattered in a square of the given side.
    Scatter { extent: f32, seed: Option<u64> },
}

impl Fallback {
    fn rng(&self) -> Option<StdRng> {
        match *self {
            Fallback::Origin => None,
            Fallback::Scatter { seed: Some(seed), .. } => Some(StdRng::seed_from_u64(seed)),
            Fallback::Scatter { seed: None, .. } => Some(StdRng::from_os_rng()),
        }
    }
}

/// Lay out `nodes` and `edges` with `oracle`, returning one placement per
/// node in input order.
///
/// Every node is registered with the same `footprint`. Of several nodes
/// sharing an id only one, chosen by `duplicates`, is registered; the others
/// fall back to their coordinate hint, then to `fallback`. Edges are only
/// registered when both endpoints are non-empty. An oracle failure sends every
/// node down the fallback path.
pub fn apply_layout<O: LayoutOracle>(
    oracle: &mut O,
    nodes: &[GraphNode],
    edges: &[Edge],
    footprint: Size,
    options: &LayoutOptions,
    duplicates: DuplicatePolicy,
    fallback: Fallback,
) -> Vec<PlacedNode> {
    let owners = slot_owners(nodes, duplicates);
    for (idx, node) in nodes.iter().enumerate() {
        if owners.get(node.id.as_str()) == Some(&idx) {
            oracle.register_node(&node.id, footprint);
        } else if !node.id.is_empty() {
            log::debug!(id = node.id.as_str(), tier = node.tier.as_str(); "Duplicate node id lost its layout slot");
        }
    }

    for edge in edges {
        if !edge.has_endpoints() {
            log::debug!(id = edge.id.as_str(); "Edge with missing endpoint kept out of layout");
            continue;
        }
        if edge.source == edge.target {
            continue;
        }
        oracle.register_edge(&edge.source, &edge.target);
    }

    let placements = oracle.compute_layout(options).unwrap_or_else(|err| {
        log::warn!(err:% = err; "Layout engine failed, using fallback positions");
        HashMap::new()
    });

    let mut rng = fallback.rng();
    nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            let placement = (owners.get(node.id.as_str()) == Some(&idx))
                .then(|| placements.get(&node.id))
                .flatten();
            match placement {
                Some(placement) => {
                    let size = if placement.footprint.width > 0.0 && placement.footprint.height > 0.0 {
                        placement.footprint
                    } else {
                        footprint
                    };
                    PlacedNode::at(placement.center, size)
                }
                None => fallback_placement(node, fallback, rng.as_mut()),
            }
        })
        .collect()
}

fn slot_owners(nodes: &[GraphNode], duplicates: DuplicatePolicy) -> HashMap<&str, usize> {
    let mut owners = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        if node.id.is_empty() {
            continue;
        }
        match duplicates {
            DuplicatePolicy::KeepFirst => {
                owners.entry(node.id.as_str()).or_insert(idx);
            }
            DuplicatePolicy::KeepLast => {
                owners.insert(node.id.as_str(), idx);
            }
        }
    }
    owners
}

fn fallback_placement(node: &GraphNode, fallback: Fallback, rng: Option<&mut StdRng>) -> PlacedNode {
    log::debug!(id = node.id.as_str(); "No layout output for node, using fallback position");
    if let Some(hint) = node.hint {
        return PlacedNode::pinned(hint, node.anchor);
    }
    match (fallback, rng) {
        (Fallback::Scatter { extent, .. }, Some(rng)) => {
            let x = rng.random::<f32>() * extent;
            let y = rng.random::<f32>() * extent;
            PlacedNode::fixed(Position::new(x, y))
        }
        _ => PlacedNode::fixed(Position::ORIGIN),
    }
}
