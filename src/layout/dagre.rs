use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::{Once, mpsc};
use std::thread;
use std::time::Duration;

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};

use super::layered::place_layered;
use super::{Direction, LayoutOptions, LayoutOracle, Placement, RegisteredGraph};
use crate::error::LayoutError;
use crate::model::{Position, Size};

/// Name of the thread dagre runs on. Panics raised there are reported as
/// [`LayoutError::EnginePanicked`] instead of being printed.
const WORKER_NAME: &str = "dagre-layout";

/// The iterative rankers can cycle forever on graphs with long edges.
const RANKER: &str = "longest-path";

static QUIET_WORKER_PANICS: Once = Once::new();

/// [`LayoutOracle`] backed by the dagre layered layout.
///
/// Dagre runs on a worker thread bounded by [`LayoutOptions::time_limit`].
/// When it panics, overruns, or places nothing, the layered placement lays
/// out the same graph instead. Each instance lays out exactly one graph.
#[derive(Debug, Default)]
pub struct DagreOracle {
    graph: RegisteredGraph,
}

impl DagreOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edges.len()
    }

    fn run_dagre(
        &self,
        options: &LayoutOptions,
    ) -> Result<HashMap<String, Placement>, LayoutError> {
        let nodes = self.graph.nodes.clone();
        let edges = self.graph.edges.clone();
        let job_options = *options;
        let placements = run_bounded(options.time_limit, move || {
            dagre_placements(&nodes, &edges, &job_options)
        })?;
        if placements.is_empty() {
            return Err(LayoutError::NoCoordinates(self.graph.nodes.len()));
        }
        Ok(placements)
    }
}

impl LayoutOracle for DagreOracle {
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
        if self.graph.is_empty() {
            return Ok(HashMap::new());
        }
        match self.run_dagre(options) {
            Ok(placements) => {
                log::debug!(
                    nodes = self.graph.nodes.len(),
                    edges = self.graph.edges.len(),
                    placed = placements.len();
                    "Dagre layout finished"
                );
                Ok(placements)
            }
            Err(err) => {
                log::warn!(err:% = err; "Dagre layout failed, using layered placement");
                Ok(place_layered(&self.graph, options))
            }
        }
    }
}

fn dagre_placements(
    nodes: &[(String, Size)],
    edges: &[(usize, usize)],
    options: &LayoutOptions,
) -> HashMap<String, Placement> {
    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some(dagre_rankdir(options.direction).to_string());
    graph_config.ranker = Some(RANKER.to_string());
    graph_config.nodesep = Some(options.node_separation);
    graph_config.ranksep = Some(options.rank_separation);
    graph_config.marginx = Some(options.margin);
    graph_config.marginy = Some(options.margin);
    dagre_graph.set_graph(graph_config);

    for (order, (node_id, footprint)) in nodes.iter().enumerate() {
        let mut node = DagreNode::default();
        node.width = footprint.width;
        node.height = footprint.height;
        node.order = Some(order);
        dagre_graph.set_node(node_id.clone(), Some(node));
    }
    for (from, to) in edges {
        let (Some((from, _)), Some((to, _))) = (nodes.get(*from), nodes.get(*to)) else {
            continue;
        };
        let edge_label = DagreEdge::default();
        let _ = dagre_graph.set_edge(from, to, Some(edge_label), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut placements = HashMap::with_capacity(nodes.len());
    for (node_id, _) in nodes {
        let Some(dagre_node) = dagre_graph.node(node_id) else {
            continue;
        };
        let center = Position::new(dagre_node.x, dagre_node.y);
        if !center.is_finite() {
            continue;
        }
        placements.insert(
            node_id.clone(),
            Placement {
                center,
                footprint: Size::new(dagre_node.width, dagre_node.height),
            },
        );
    }
    placements
}

/// Run `job` on a fresh worker thread and wait at most `limit` for it.
///
/// A job that overruns keeps its thread; only its result is dropped.
fn run_bounded<T, F>(limit: Duration, job: F) -> Result<T, LayoutError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    quiet_worker_panics();
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name(WORKER_NAME.to_string())
        .spawn(move || {
            let _ = tx.send(panic::catch_unwind(AssertUnwindSafe(job)));
        })
        .map_err(|err| LayoutError::Worker(err.to_string()))?;

    match rx.recv_timeout(limit) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(payload)) => Err(LayoutError::EnginePanicked(panic_message(&*payload))),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(LayoutError::TimedOut(limit)),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(LayoutError::Worker("worker exited without a result".to_string()))
        }
    }
}

/// Keep the default panic report for every thread except the layout worker.
fn quiet_worker_panics() {
    QUIET_WORKER_PANICS.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            if thread::current().name() != Some(WORKER_NAME) {
                previous(info);
            }
        }));
    });
}

fn dagre_rankdir(direction: Direction) -> &'static str {
    match direction {
        Direction::TopBottom => "tb",
        Direction::BottomTop => "bt",
        Direction::LeftRight => "lr",
        Direction::RightLeft => "rl",
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_string()
}
