use crate::graph::raw::{EdgeRole, RawGraph};
use std::collections::VecDeque;
use thiserror::Error;

/// A structural defect in a fetched or loaded computation graph, naming the
/// offending node or edge index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGraphError {
    #[error("edge {edge} references node {node}, but the graph has {node_count} nodes")]
    EdgeOutOfRange {
        edge: usize,
        node: usize,
        node_count: usize,
    },
    #[error("node {node} ({operation}) expects {expected} operands but has {actual}")]
    WrongOperandCount {
        node: usize,
        operation: String,
        expected: usize,
        actual: usize,
    },
    #[error("node {node} ({operation}) is missing its {role:?} operand")]
    MissingOperand {
        node: usize,
        operation: String,
        role: EdgeRole,
    },
    #[error("the computation graph has a cycle through node {node}")]
    CycleDetected { node: usize },
    #[error("the payload contains node holes, which the debugger does not accept")]
    UnsupportedNodeHoles,
}

/// Collects every structural error in the graph. Bounds errors short-circuit
/// the per-node checks since operand inspection is meaningless with dangling
/// edges.
pub fn validation_errors(graph: &RawGraph) -> Vec<MalformedGraphError> {
    let mut errors = Vec::new();

    if !graph.node_holes.is_empty() {
        errors.push(MalformedGraphError::UnsupportedNodeHoles);
    }

    let node_count = graph.nodes.len();
    for (index, edge) in graph.edges.iter().enumerate() {
        for endpoint in [edge.source(), edge.target()] {
            if endpoint >= node_count {
                errors.push(MalformedGraphError::EdgeOutOfRange {
                    edge: index,
                    node: endpoint,
                    node_count,
                });
            }
        }
    }
    if !errors.is_empty() {
        return errors;
    }

    errors.extend(operand_errors(graph));
    errors.extend(cycle_errors(graph));

    errors
}

/// First structural error, if any. Ingest paths call this before handing the
/// graph to the transformer.
pub fn validate(graph: &RawGraph) -> Result<(), MalformedGraphError> {
    match validation_errors(graph).into_iter().next() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn operand_errors(graph: &RawGraph) -> Vec<MalformedGraphError> {
    let mut errors = Vec::new();

    for (index, node) in graph.nodes.iter().enumerate() {
        let incoming: Vec<_> = graph
            .edges
            .iter()
            .filter(|edge| edge.target() == index)
            .collect();

        if node.operation.is_binary() {
            if incoming.len() != 2 {
                errors.push(MalformedGraphError::WrongOperandCount {
                    node: index,
                    operation: node.operation.to_string(),
                    expected: 2,
                    actual: incoming.len(),
                });
                continue;
            }
            for role in [EdgeRole::Left, EdgeRole::Right] {
                if !incoming.iter().any(|edge| edge.role() == role) {
                    errors.push(MalformedGraphError::MissingOperand {
                        node: index,
                        operation: node.operation.to_string(),
                        role,
                    });
                }
            }
        } else if node.operation.is_unary() {
            if incoming.len() != 1 {
                errors.push(MalformedGraphError::WrongOperandCount {
                    node: index,
                    operation: node.operation.to_string(),
                    expected: 1,
                    actual: incoming.len(),
                });
                continue;
            }
            if incoming[0].role() != EdgeRole::Unary {
                errors.push(MalformedGraphError::MissingOperand {
                    node: index,
                    operation: node.operation.to_string(),
                    role: EdgeRole::Unary,
                });
            }
        }
    }

    errors
}

// Kahn's algorithm; any node left unprocessed sits on a cycle.
fn cycle_errors(graph: &RawGraph) -> Vec<MalformedGraphError> {
    let node_count = graph.nodes.len();
    let mut indegree = vec![0usize; node_count];
    for edge in &graph.edges {
        indegree[edge.target()] += 1;
    }

    let mut queue: VecDeque<usize> = (0..node_count).filter(|&n| indegree[n] == 0).collect();
    let mut processed = vec![false; node_count];

    while let Some(node) = queue.pop_front() {
        processed[node] = true;
        for edge in graph.edges.iter().filter(|edge| edge.source() == node) {
            indegree[edge.target()] -= 1;
            if indegree[edge.target()] == 0 {
                queue.push_back(edge.target());
            }
        }
    }

    match processed.iter().position(|&done| !done) {
        Some(node) => vec![MalformedGraphError::CycleDetected { node }],
        None => Vec::new(),
    }
}
