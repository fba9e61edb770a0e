use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeType {
    Bfv,
}

/// One operation node in the backend's compiled program graph. The serde
/// representation must match the backend wire format exactly: indexed inputs
/// serialize as `{"InputCiphertext": 0}`, everything else as a bare string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    InputCiphertext(usize),
    InputPlaintext(usize),
    Multiply,
    MultiplyPlaintext,
    Add,
    AddPlaintext,
    Sub,
    SubPlaintext,
    Negate,
    Relinearize,
    OutputCiphertext,
    ShiftLeft,
    ShiftRight,
    SwapRows,
}

impl Operation {
    pub fn is_relinearize(self) -> bool {
        matches!(self, Operation::Relinearize)
    }

    pub fn is_input_ciphertext(self) -> bool {
        matches!(self, Operation::InputCiphertext(_))
    }

    /// Operations taking a Left and a Right operand.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Operation::Multiply
                | Operation::MultiplyPlaintext
                | Operation::Add
                | Operation::AddPlaintext
                | Operation::Sub
                | Operation::SubPlaintext
        )
    }

    /// Operations taking a single Unary operand.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Operation::Negate | Operation::Relinearize | Operation::OutputCiphertext
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::InputCiphertext(id) => write!(f, "InputCiphertext({id})"),
            Operation::InputPlaintext(id) => write!(f, "InputPlaintext({id})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Which operand slot of the target an edge feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeRole {
    Left,
    Right,
    Unary,
}

/// An edge as it appears on the wire: `[source, target, role]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEdge(pub usize, pub usize, pub EdgeRole);

impl RawEdge {
    pub fn source(&self) -> usize {
        self.0
    }

    pub fn target(&self) -> usize {
        self.1
    }

    pub fn role(&self) -> EdgeRole {
        self.2
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNode {
    pub operation: Operation,
}

/// The backend's stable-graph serialization. `node_holes` and `edge_property`
/// are carried so a payload round-trips byte-compatibly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGraph {
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub node_holes: Vec<usize>,
    #[serde(default = "default_edge_property")]
    pub edge_property: String,
    pub edges: Vec<RawEdge>,
}

fn default_edge_property() -> String {
    "directed".to_string()
}

impl RawGraph {
    pub fn new(nodes: Vec<RawNode>, edges: Vec<RawEdge>) -> Self {
        RawGraph {
            nodes,
            node_holes: Vec::new(),
            edge_property: default_edge_property(),
            edges,
        }
    }

    pub fn operation(&self, index: usize) -> Option<Operation> {
        self.nodes.get(index).map(|node| node.operation)
    }

    pub fn is_relinearize(&self, index: usize) -> bool {
        self.operation(index)
            .map(Operation::is_relinearize)
            .unwrap_or(false)
    }

    pub fn relinearize_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.operation.is_relinearize())
            .count()
    }

    pub fn input_indices(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.operation.is_input_ciphertext())
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerGraph {
    pub graph: RawGraph,
}

/// The metadata wrapper around a session graph: `{"graph":{"graph":…},"data":"Bfv"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEnvelope {
    pub graph: InnerGraph,
    pub data: SchemeType,
}

impl GraphEnvelope {
    pub fn new(graph: RawGraph, scheme: SchemeType) -> Self {
        GraphEnvelope {
            graph: InnerGraph { graph },
            data: scheme,
        }
    }

    pub fn raw(&self) -> &RawGraph {
        &self.graph.graph
    }

    pub fn scheme(&self) -> SchemeType {
        self.data
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
