use crate::graph::raw::{GraphEnvelope, RawGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-node runtime summary the backend reports for a ciphertext or
/// plaintext flowing through the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDetail {
    pub value: i64,
    pub noise_budget: Option<u32>,
    pub coefficients: Vec<u64>,
    pub multiplicative_depth: u32,
}

/// One debugging session: the compiled graph, the program source it came
/// from, and whatever per-node data the backend captured. `node_data` is
/// indexed by raw node index; `None` means the backend recorded nothing for
/// that node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugSession {
    pub name: String,
    pub envelope: GraphEnvelope,
    pub source_code: String,
    pub node_data: Vec<Option<NodeDetail>>,
}

impl DebugSession {
    pub fn new(name: impl Into<String>, envelope: GraphEnvelope, source_code: String) -> Self {
        let node_count = envelope.raw().nodes.len();
        DebugSession {
            name: name.into(),
            envelope,
            source_code,
            node_data: vec![None; node_count],
        }
    }

    pub fn raw_graph(&self) -> &RawGraph {
        self.envelope.raw()
    }

    pub fn node_detail(&self, node: usize) -> Option<&NodeDetail> {
        self.node_data.get(node).and_then(|detail| detail.as_ref())
    }
}

/// In-memory session registry the backend server exposes.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, DebugSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    pub fn insert(&mut self, session: DebugSession) {
        self.sessions.insert(session.name.clone(), session);
    }

    pub fn get(&self, name: &str) -> Option<&DebugSession> {
        self.sessions.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
