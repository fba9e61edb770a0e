use crate::graph::raw::{Operation, RawGraph};
use crate::graph::render::{NodeKind, RenderEdge, RenderGraph, RenderNode};
use crate::graph::validate::{self, MalformedGraphError};
use std::collections::HashMap;
use thiserror::Error;

/// Structural assumptions the relinearization fold relies on: each
/// Relinearize node has exactly one producer and producer chains terminate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelinearizeFoldError {
    #[error("relinearize node {node} has {count} producers, expected exactly one")]
    MultipleProducers { node: usize, count: usize },
    #[error("relinearize node {node} has no producer to splice through")]
    MissingProducer { node: usize },
    #[error("relinearize nodes reachable from node {node} never resolve to a producer")]
    RelinearizeCycle { node: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error(transparent)]
    Malformed(#[from] MalformedGraphError),
    #[error(transparent)]
    Fold(#[from] RelinearizeFoldError),
}

/// Converts a raw computation graph into the node/edge shape the graph widget
/// consumes. With `include_relinearize` the result is a structural echo of the
/// input; without it, Relinearize bookkeeping nodes are folded away and their
/// producer is wired straight to each consumer.
pub fn render_graph(
    raw: &RawGraph,
    include_relinearize: bool,
) -> Result<RenderGraph, TransformError> {
    validate::validate(raw)?;

    if include_relinearize {
        Ok(relabel(raw))
    } else {
        Ok(fold_relinearize(raw)?)
    }
}

/// The label the widget displays: the raw input index for ciphertext inputs,
/// the JSON wire text of the operation for everything else.
pub fn node_title(operation: &Operation) -> String {
    match operation {
        Operation::InputCiphertext(id) => id.to_string(),
        other => serde_json::to_string(other).expect("operation serializes to JSON"),
    }
}

fn render_node(index: usize, operation: &Operation) -> RenderNode {
    let kind = if operation.is_input_ciphertext() {
        NodeKind::Input
    } else {
        NodeKind::Empty
    };
    RenderNode {
        id: index,
        title: node_title(operation),
        kind,
    }
}

fn relabel(raw: &RawGraph) -> RenderGraph {
    let nodes = raw
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| render_node(index, &node.operation))
        .collect();

    let edges = raw
        .edges
        .iter()
        .map(|edge| RenderEdge {
            source: edge.source(),
            target: edge.target(),
            role: edge.role(),
        })
        .collect();

    RenderGraph { nodes, edges }
}

/// Mode B primitive. Assumes in-range edge indices; `render_graph` validates
/// before calling this, direct callers are on their own.
pub fn fold_relinearize(raw: &RawGraph) -> Result<RenderGraph, RelinearizeFoldError> {
    let nodes = raw
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| !node.operation.is_relinearize())
        .map(|(index, node)| render_node(index, &node.operation))
        .collect();

    // Producer lookup keyed by node index: each Relinearize node's single
    // inbound source.
    let mut producers: HashMap<usize, usize> = HashMap::new();
    for edge in &raw.edges {
        if raw.is_relinearize(edge.target()) {
            if producers.insert(edge.target(), edge.source()).is_some() {
                let count = raw
                    .edges
                    .iter()
                    .filter(|candidate| candidate.target() == edge.target())
                    .count();
                return Err(RelinearizeFoldError::MultipleProducers {
                    node: edge.target(),
                    count,
                });
            }
        }
    }

    let mut edges = Vec::with_capacity(raw.edges.len());
    for edge in &raw.edges {
        if raw.is_relinearize(edge.target()) || raw.is_relinearize(edge.source()) {
            continue;
        }
        edges.push(RenderEdge {
            source: edge.source(),
            target: edge.target(),
            role: edge.role(),
        });
    }

    // Splice: every edge leaving a Relinearize node is rewired to start at the
    // first non-Relinearize ancestor. Edges between two Relinearize nodes are
    // consumed by the chain resolution itself.
    for edge in &raw.edges {
        if !raw.is_relinearize(edge.source()) || raw.is_relinearize(edge.target()) {
            continue;
        }
        let producer = resolve_producer(raw, &producers, edge.source())?;
        edges.push(RenderEdge {
            source: producer,
            target: edge.target(),
            role: edge.role(),
        });
    }

    Ok(RenderGraph { nodes, edges })
}

fn resolve_producer(
    raw: &RawGraph,
    producers: &HashMap<usize, usize>,
    start: usize,
) -> Result<usize, RelinearizeFoldError> {
    let mut current = start;
    let mut hops = 0usize;
    loop {
        let producer = *producers
            .get(&current)
            .ok_or(RelinearizeFoldError::MissingProducer { node: current })?;
        if !raw.is_relinearize(producer) {
            return Ok(producer);
        }
        current = producer;
        hops += 1;
        if hops > producers.len() {
            return Err(RelinearizeFoldError::RelinearizeCycle { node: start });
        }
    }
}
