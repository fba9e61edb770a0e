use crate::graph::raw::EdgeRole;
use serde::{Deserialize, Serialize};

/// Styling class the graph widget applies to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Input,
    Empty,
}

/// A node as the graph widget consumes it. `id` is the raw node index and is
/// never renumbered, so selections map straight back to the backend graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderNode {
    pub id: usize,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderEdge {
    pub source: usize,
    pub target: usize,
    #[serde(rename = "type")]
    pub role: EdgeRole,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderGraph {
    pub fn node(&self, id: usize) -> Option<&RenderNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn incoming(&self, id: usize) -> Vec<RenderEdge> {
        self.edges
            .iter()
            .copied()
            .filter(|edge| edge.target == id)
            .collect()
    }

    pub fn outgoing(&self, id: usize) -> Vec<RenderEdge> {
        self.edges
            .iter()
            .copied()
            .filter(|edge| edge.source == id)
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
