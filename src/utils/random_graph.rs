use crate::graph::raw::{
    EdgeRole, GraphEnvelope, Operation, RawEdge, RawGraph, RawNode, SchemeType,
};
use rand::{rng, Rng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramParameters {
    pub inputs: u32,
    pub operations: u32,
    pub relinearize_nodes: u32,
    pub output_nodes: u32,
}

/// Generates a random well-formed program payload: ciphertext inputs, random
/// binary arithmetic over live values, a relinearize after every multiply
/// (matching what the compiler inserts), and an output for every sink. The
/// result always passes validation.
pub fn generate_random_program(inputs: u32, operations: u32) -> (GraphEnvelope, ProgramParameters) {
    let inputs = inputs.max(1);
    let operations = operations.max(1);
    let mut rng = rng();

    let mut nodes: Vec<RawNode> = Vec::new();
    let mut edges: Vec<RawEdge> = Vec::new();
    let mut live: Vec<usize> = Vec::new();

    for id in 0..inputs as usize {
        nodes.push(RawNode {
            operation: Operation::InputCiphertext(id),
        });
        live.push(id);
    }

    let mut relinearize_nodes = 0u32;
    for _ in 0..operations {
        let operation = match rng.random_range(0..3) {
            0 => Operation::Multiply,
            1 => Operation::Add,
            _ => Operation::Sub,
        };
        let left = live[rng.random_range(0..live.len())];
        let right = live[rng.random_range(0..live.len())];

        let node = nodes.len();
        nodes.push(RawNode { operation });
        edges.push(RawEdge(left, node, EdgeRole::Left));
        edges.push(RawEdge(right, node, EdgeRole::Right));

        if operation == Operation::Multiply {
            let relin = nodes.len();
            nodes.push(RawNode {
                operation: Operation::Relinearize,
            });
            edges.push(RawEdge(node, relin, EdgeRole::Unary));
            relinearize_nodes += 1;
            live.push(relin);
        } else {
            live.push(node);
        }
    }

    // Terminate every non-input sink with an output node.
    let consumed: HashSet<usize> = edges.iter().map(|edge| edge.source()).collect();
    let sinks: Vec<usize> = (inputs as usize..nodes.len())
        .filter(|index| !consumed.contains(index))
        .collect();
    let mut output_nodes = 0u32;
    for sink in sinks {
        let output = nodes.len();
        nodes.push(RawNode {
            operation: Operation::OutputCiphertext,
        });
        edges.push(RawEdge(sink, output, EdgeRole::Unary));
        output_nodes += 1;
    }

    let params = ProgramParameters {
        inputs,
        operations,
        relinearize_nodes,
        output_nodes,
    };
    let envelope = GraphEnvelope::new(RawGraph::new(nodes, edges), SchemeType::Bfv);

    (envelope, params)
}
