use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unknown fields carried through composition and projection untouched.
pub type Extra = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Top-left corner of a box of this size centred on `center`.
    pub fn top_left(self, center: Position) -> Position {
        Position::new(center.x - self.width / 2.0, center.y - self.height / 2.0)
    }
}

/// A raw entity node, also used for tier-1 categories.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Coordinate hint supplied by the caller: `position` first, then `x`/`y`.
    pub fn coordinate_hint(&self) -> Option<Position> {
        self.position.or_else(|| self.center_hint())
    }

    /// The caller's `x`/`y` pair, when both are set.
    pub fn center_hint(&self) -> Option<Position> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Position::new(x, y)),
            _ => None,
        }
    }

    pub(crate) fn place(&mut self, placed: &PlacedNode) {
        self.x = Some(placed.center.x);
        self.y = Some(placed.center.y);
        self.position = Some(placed.position);
    }
}

pub type C1Category = Node;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct C2Category {
    #[serde(flatten)]
    pub node: Node,
    /// Display name, preferred over `label` when resolving relationships.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub c1_category_id: String,
    #[serde(default)]
    pub node_ids: Vec<String>,
}

impl C2Category {
    pub fn new(id: impl Into<String>, c1_category_id: impl Into<String>) -> Self {
        Self {
            node: Node::new(id),
            c1_category_id: c1_category_id.into(),
            ..Default::default()
        }
    }

    pub fn with_nodes<I, S>(mut self, node_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node_ids = node_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    /// The string relationships use to refer to this category: name, then label, then id.
    pub fn resolution_key(&self) -> &str {
        [self.name.as_deref(), self.node.label.as_deref()]
            .into_iter()
            .flatten()
            .find(|key| !key.is_empty())
            .unwrap_or(self.node.id.as_str())
    }

    pub fn display_label(&self) -> &str {
        self.resolution_key()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTier {
    Entity,
    Category,
    SubCategory,
}

impl NodeTier {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeTier::Entity => "node",
            NodeTier::Category => "c1",
            NodeTier::SubCategory => "c2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeOrigin {
    #[default]
    Explicit,
    Containment,
    C2Relationship,
    CrossRelationship,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip)]
    pub origin: EdgeOrigin,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn has_endpoints(&self) -> bool {
        !self.source.is_empty() && !self.target.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipOrigin {
    SameTier,
    Cross,
}

impl From<RelationshipOrigin> for EdgeOrigin {
    fn from(origin: RelationshipOrigin) -> Self {
        match origin {
            RelationshipOrigin::SameTier => EdgeOrigin::C2Relationship,
            RelationshipOrigin::Cross => EdgeOrigin::CrossRelationship,
        }
    }
}

/// A name-keyed relationship between sub-categories.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from_c2: String,
    #[serde(default)]
    pub to_c2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Relationship {
    pub fn new(id: impl Into<String>, from_c2: impl Into<String>, to_c2: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from_c2: from_c2.into(),
            to_c2: to_c2.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphInput {
    #[serde(default, alias = "graphNodes")]
    pub nodes: Vec<Node>,
    #[serde(default, alias = "graphEdges")]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub c1_categories: Vec<C1Category>,
    #[serde(default)]
    pub c2_categories: Vec<C2Category>,
    #[serde(default)]
    pub c2_relationships: Vec<Relationship>,
    #[serde(default)]
    pub cross_relationships: Vec<Relationship>,
}

/// A node of the unified graph, tagged with the partition it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub tier: NodeTier,
    /// Corner used when the engine does not place this node.
    pub hint: Option<Position>,
    /// The caller's own `x`/`y`, kept as the centre of a hinted fallback.
    pub anchor: Option<Position>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, tier: NodeTier) -> Self {
        Self {
            id: id.into(),
            tier,
            hint: None,
            anchor: None,
        }
    }

    pub fn from_node(node: &Node, tier: NodeTier) -> Self {
        Self {
            id: node.id.clone(),
            tier,
            hint: node.coordinate_hint(),
            anchor: node.center_hint(),
        }
    }
}

/// Coordinates computed for one unified node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedNode {
    pub center: Position,
    pub position: Position,
}

impl PlacedNode {
    pub fn at(center: Position, footprint: Size) -> Self {
        Self {
            center,
            position: footprint.top_left(center),
        }
    }

    /// A node without oracle output: its hint serves as both centre and corner.
    pub fn fixed(point: Position) -> Self {
        Self::pinned(point, None)
    }

    /// A node kept at caller-supplied coordinates. `anchor` overrides the
    /// centre when the caller gave `x`/`y` separately from `position`.
    pub fn pinned(corner: Position, anchor: Option<Position>) -> Self {
        Self {
            center: anchor.unwrap_or(corner),
            position: corner,
        }
    }

    pub(crate) fn shift(&mut self, dx: f32, dy: f32) {
        self.center.x += dx;
        self.center.y += dy;
        self.position.x += dx;
        self.position.y += dy;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutResult {
    pub nodes: Vec<Node>,
    pub c1_categories: Vec<C1Category>,
    pub c2_categories: Vec<C2Category>,
    pub edges: Vec<Edge>,
}

impl LayoutResult {
    pub fn node_count(&self) -> usize {
        self.nodes.len() + self.c1_categories.len() + self.c2_categories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c2_category_reads_camel_case_fields() {
        let json = r#"{"id":"c2-a","name":"Billing","c1CategoryId":"c1-a","nodeIds":["n1","n2"],"color":"red"}"#;
        let c2: C2Category = serde_json::from_str(json).unwrap();
        assert_eq!(c2.id(), "c2-a");
        assert_eq!(c2.c1_category_id, "c1-a");
        assert_eq!(c2.node_ids, vec!["n1", "n2"]);
        assert_eq!(c2.node.extra.get("color"), Some(&Value::from("red")));
        assert!(!c2.node.extra.contains_key("c1CategoryId"));
    }

    #[test]
    fn resolution_key_prefers_name_then_label_then_id() {
        let mut c2 = C2Category::new("c2-a", "c1-a");
        assert_eq!(c2.resolution_key(), "c2-a");
        c2.node.label = Some("Label".to_string());
        assert_eq!(c2.resolution_key(), "Label");
        c2.name = Some("Name".to_string());
        assert_eq!(c2.resolution_key(), "Name");
        c2.name = Some(String::new());
        assert_eq!(c2.resolution_key(), "Label");
    }

    #[test]
    fn coordinate_hint_prefers_position() {
        let mut node = Node::new("n1");
        assert_eq!(node.coordinate_hint(), None);
        node.x = Some(3.0);
        node.y = Some(4.0);
        assert_eq!(node.coordinate_hint(), Some(Position::new(3.0, 4.0)));
        node.position = Some(Position::new(7.0, 8.0));
        assert_eq!(node.coordinate_hint(), Some(Position::new(7.0, 8.0)));
        assert_eq!(node.center_hint(), Some(Position::new(3.0, 4.0)));
    }

    #[test]
    fn graph_node_keeps_separate_anchor() {
        let mut node = Node::new("n1");
        node.position = Some(Position::new(900.0, 900.0));
        node.x = Some(5.0);
        node.y = Some(6.0);
        let graph_node = GraphNode::from_node(&node, NodeTier::Entity);
        assert_eq!(graph_node.hint, Some(Position::new(900.0, 900.0)));
        assert_eq!(graph_node.anchor, Some(Position::new(5.0, 6.0)));

        let pinned = PlacedNode::pinned(graph_node.hint.unwrap(), graph_node.anchor);
        assert_eq!(pinned.center, Position::new(5.0, 6.0));
        assert_eq!(pinned.position, Position::new(900.0, 900.0));
        assert_eq!(PlacedNode::pinned(Position::new(1.0, 2.0), None).center, Position::new(1.0, 2.0));
    }

    #[test]
    fn graph_input_accepts_analysis_aliases() {
        let json = r#"{"graphNodes":[{"id":"a"}],"graphEdges":[{"id":"e","source":"a","target":"b"}]}"#;
        let input: GraphInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.nodes.len(), 1);
        assert_eq!(input.edges[0].target, "b");
        assert!(input.c2_categories.is_empty());
    }
}
