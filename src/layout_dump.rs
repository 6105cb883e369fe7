use crate::model::{Edge, LayoutResult, Node, NodeTier, Position};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const SAMPLE_SIZE: usize = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub rf_nodes: Vec<NodeDump>,
    pub rf_edges: Vec<EdgeDump>,
    pub counts: CountsDump,
    pub sample_nodes: Vec<SampleDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub position: Position,
    pub data: NodeDataDump,
}

#[derive(Debug, Serialize)]
pub struct NodeDataDump {
    pub label: String,
    pub tier: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountsDump {
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Serialize)]
pub struct SampleDump {
    pub id: String,
    pub pos: Position,
}

impl LayoutDump {
    pub fn from_result(result: &LayoutResult) -> Self {
        let mut rf_nodes = Vec::with_capacity(result.node_count());
        rf_nodes.extend(
            result
                .nodes
                .iter()
                .map(|node| node_dump(node, node_label(node), NodeTier::Entity)),
        );
        rf_nodes.extend(
            result
                .c1_categories
                .iter()
                .map(|node| node_dump(node, node_label(node), NodeTier::Category)),
        );
        rf_nodes.extend(result.c2_categories.iter().map(|category| {
            node_dump(
                &category.node,
                category.display_label().to_string(),
                NodeTier::SubCategory,
            )
        }));

        Self::from_parts(rf_nodes, &result.edges)
    }

    /// Dump for the standalone arrangement step, where every node is an entity.
    pub fn from_arranged(nodes: &[Node], edges: &[Edge]) -> Self {
        let rf_nodes = nodes
            .iter()
            .map(|node| node_dump(node, node_label(node), NodeTier::Entity))
            .collect();
        Self::from_parts(rf_nodes, edges)
    }

    fn from_parts(rf_nodes: Vec<NodeDump>, edges: &[Edge]) -> Self {
        let rf_edges: Vec<EdgeDump> = edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: edge.label.clone(),
            })
            .collect();
        let sample_nodes = rf_nodes
            .iter()
            .take(SAMPLE_SIZE)
            .map(|node| SampleDump {
                id: node.id.clone(),
                pos: node.position,
            })
            .collect();

        LayoutDump {
            counts: CountsDump {
                nodes: rf_nodes.len(),
                edges: rf_edges.len(),
            },
            rf_nodes,
            rf_edges,
            sample_nodes,
        }
    }
}

fn node_label(node: &Node) -> String {
    node.label
        .as_deref()
        .filter(|label| !label.is_empty())
        .unwrap_or(node.id.as_str())
        .to_string()
}

fn node_dump(node: &Node, label: String, tier: NodeTier) -> NodeDump {
    NodeDump {
        id: node.id.clone(),
        position: node.coordinate_hint().unwrap_or(Position::ORIGIN),
        data: NodeDataDump {
            label,
            tier: tier.as_str(),
        },
    }
}

pub fn write_layout_dump(path: Option<&Path>, dump: &LayoutDump) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
