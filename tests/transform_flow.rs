use fhe_debugger::graph::raw::{
    EdgeRole, GraphEnvelope, Operation, RawEdge, RawGraph, RawNode, SchemeType,
};
use fhe_debugger::graph::render::{NodeKind, RenderEdge};
use fhe_debugger::graph::validate::{validation_errors, MalformedGraphError};
use fhe_debugger::transform::{fold_relinearize, render_graph, RelinearizeFoldError};
use fhe_debugger::utils::sample::{sample_envelope, SAMPLE_GRAPH_JSON};

fn sample_raw() -> RawGraph {
    sample_envelope().raw().clone()
}

fn node(operation: Operation) -> RawNode {
    RawNode { operation }
}

#[test]
fn sample_payload_parses_and_validates() {
    let envelope = GraphEnvelope::from_json(SAMPLE_GRAPH_JSON).expect("sample parses");
    assert_eq!(envelope.scheme(), SchemeType::Bfv);
    assert_eq!(envelope.raw().nodes.len(), 13);
    assert_eq!(envelope.raw().edges.len(), 13);
    assert_eq!(envelope.raw().relinearize_count(), 3);
    assert_eq!(envelope.raw().input_indices(), vec![0, 1, 2, 3]);
    assert!(validation_errors(envelope.raw()).is_empty());
}

#[test]
fn envelope_round_trips_through_json() {
    let envelope = sample_envelope();
    let text = envelope.to_json().expect("serializes");
    let reparsed = GraphEnvelope::from_json(&text).expect("reparses");
    assert_eq!(reparsed, envelope);
}

#[test]
fn keeping_relinearize_echoes_raw_structure() {
    let raw = sample_raw();
    let rendered = render_graph(&raw, true).expect("transform succeeds");

    assert_eq!(rendered.nodes.len(), 13);
    assert_eq!(rendered.edges.len(), 13);
    for (index, node) in rendered.nodes.iter().enumerate() {
        assert_eq!(node.id, index);
    }
    assert_eq!(rendered.nodes[0].kind, NodeKind::Input);
    assert_eq!(rendered.nodes[0].title, "0");
    assert_eq!(rendered.nodes[4].kind, NodeKind::Empty);
    assert_eq!(rendered.nodes[4].title, "\"Multiply\"");
    assert_eq!(rendered.nodes[10].title, "\"Relinearize\"");
    assert_eq!(
        rendered.edges[0],
        RenderEdge {
            source: 0,
            target: 4,
            role: EdgeRole::Left,
        }
    );
}

#[test]
fn render_nodes_serialize_with_widget_field_names() {
    let rendered = render_graph(&sample_raw(), true).expect("transform succeeds");
    let node = serde_json::to_value(&rendered.nodes[0]).expect("serializes");
    assert_eq!(node["type"], "input");
    let edge = serde_json::to_value(&rendered.edges[0]).expect("serializes");
    assert_eq!(edge["type"], "Left");
}

#[test]
fn folding_removes_relinearize_and_splices_edges() {
    let raw = sample_raw();
    let rendered = render_graph(&raw, false).expect("transform succeeds");

    assert_eq!(rendered.nodes.len(), 10);
    assert_eq!(rendered.edges.len(), 10);
    for id in [10, 11, 12] {
        assert!(rendered.node(id).is_none(), "node {id} should be folded");
    }
    for spliced in [
        RenderEdge {
            source: 4,
            target: 7,
            role: EdgeRole::Left,
        },
        RenderEdge {
            source: 5,
            target: 7,
            role: EdgeRole::Right,
        },
        RenderEdge {
            source: 6,
            target: 9,
            role: EdgeRole::Unary,
        },
    ] {
        assert!(
            rendered.edges.contains(&spliced),
            "missing spliced edge {spliced:?}"
        );
    }
    assert!(
        rendered
            .edges
            .iter()
            .all(|edge| edge.source < 10 && edge.target < 10),
        "no edge may touch a folded node"
    );
}

#[test]
fn counts_drop_by_the_relinearize_count() {
    let raw = sample_raw();
    let folded = render_graph(&raw, false).expect("transform succeeds");
    let relinearize = raw.relinearize_count();
    assert_eq!(folded.nodes.len(), raw.nodes.len() - relinearize);
    assert_eq!(folded.edges.len(), raw.edges.len() - relinearize);
}

#[test]
fn modes_agree_without_relinearize() {
    let raw = RawGraph::new(
        vec![
            node(Operation::InputCiphertext(0)),
            node(Operation::InputCiphertext(1)),
            node(Operation::Add),
            node(Operation::OutputCiphertext),
        ],
        vec![
            RawEdge(0, 2, EdgeRole::Left),
            RawEdge(1, 2, EdgeRole::Right),
            RawEdge(2, 3, EdgeRole::Unary),
        ],
    );
    let kept = render_graph(&raw, true).expect("mode A succeeds");
    let folded = render_graph(&raw, false).expect("mode B succeeds");
    assert_eq!(kept, folded);
}

#[test]
fn folding_is_idempotent() {
    let raw = sample_raw();
    let folded = render_graph(&raw, false).expect("first fold succeeds");

    // Rebuild a raw graph from the folded output; its ids are dense here, so
    // they map straight back to node positions.
    let nodes = folded
        .nodes
        .iter()
        .map(|rendered| node(raw.operation(rendered.id).expect("id maps to a raw node")))
        .collect();
    let edges = folded
        .edges
        .iter()
        .map(|edge| RawEdge(edge.source, edge.target, edge.role))
        .collect();
    let refolded =
        render_graph(&RawGraph::new(nodes, edges), false).expect("second fold succeeds");

    assert_eq!(refolded, folded);
}

#[test]
fn ids_survive_folding() {
    let raw = sample_raw();
    let folded = render_graph(&raw, false).expect("transform succeeds");
    for rendered in &folded.nodes {
        let operation = raw.operation(rendered.id).expect("id maps to a raw node");
        assert!(!operation.is_relinearize());
        match operation {
            Operation::InputCiphertext(id) => {
                assert_eq!(rendered.kind, NodeKind::Input);
                assert_eq!(rendered.title, id.to_string());
            }
            other => {
                assert_eq!(rendered.kind, NodeKind::Empty);
                assert_eq!(
                    rendered.title,
                    serde_json::to_string(&other).expect("operation serializes")
                );
            }
        }
    }
}

#[test]
fn relinearize_chain_splices_to_first_producer() {
    let raw = RawGraph::new(
        vec![
            node(Operation::InputCiphertext(0)),
            node(Operation::Relinearize),
            node(Operation::Relinearize),
            node(Operation::OutputCiphertext),
        ],
        vec![
            RawEdge(0, 1, EdgeRole::Unary),
            RawEdge(1, 2, EdgeRole::Unary),
            RawEdge(2, 3, EdgeRole::Unary),
        ],
    );
    let folded = render_graph(&raw, false).expect("chain folds");
    assert_eq!(folded.nodes.len(), 2);
    assert_eq!(
        folded.edges,
        vec![RenderEdge {
            source: 0,
            target: 3,
            role: EdgeRole::Unary,
        }]
    );
}

#[test]
fn multi_producer_relinearize_is_rejected() {
    let raw = RawGraph::new(
        vec![
            node(Operation::InputCiphertext(0)),
            node(Operation::InputCiphertext(1)),
            node(Operation::Relinearize),
            node(Operation::OutputCiphertext),
        ],
        vec![
            RawEdge(0, 2, EdgeRole::Unary),
            RawEdge(1, 2, EdgeRole::Unary),
            RawEdge(2, 3, EdgeRole::Unary),
        ],
    );

    // The fold itself reports the structural violation.
    let folded = fold_relinearize(&raw);
    assert_eq!(
        folded,
        Err(RelinearizeFoldError::MultipleProducers { node: 2, count: 2 })
    );

    // The checked entry point already rejects it as an arity error.
    assert!(render_graph(&raw, false).is_err());
}

#[test]
fn dangling_relinearize_is_missing_its_producer() {
    let raw = RawGraph::new(
        vec![
            node(Operation::InputCiphertext(0)),
            node(Operation::Relinearize),
            node(Operation::OutputCiphertext),
        ],
        vec![RawEdge(1, 2, EdgeRole::Unary)],
    );
    let folded = fold_relinearize(&raw);
    assert_eq!(
        folded,
        Err(RelinearizeFoldError::MissingProducer { node: 1 })
    );
}

#[test]
fn out_of_range_edge_names_the_edge() {
    let raw = RawGraph::new(
        vec![node(Operation::InputCiphertext(0))],
        vec![RawEdge(0, 5, EdgeRole::Left)],
    );
    let errors = validation_errors(&raw);
    assert_eq!(
        errors,
        vec![MalformedGraphError::EdgeOutOfRange {
            edge: 0,
            node: 5,
            node_count: 1,
        }]
    );
}

#[test]
fn cycles_are_detected() {
    let raw = RawGraph::new(
        vec![
            node(Operation::InputCiphertext(0)),
            node(Operation::InputCiphertext(1)),
            node(Operation::Add),
        ],
        vec![
            RawEdge(0, 2, EdgeRole::Left),
            RawEdge(1, 2, EdgeRole::Right),
            RawEdge(2, 0, EdgeRole::Unary),
        ],
    );
    let errors = validation_errors(&raw);
    assert!(errors
        .iter()
        .any(|error| matches!(error, MalformedGraphError::CycleDetected { .. })));
}

#[test]
fn wrong_operand_count_is_reported() {
    let raw = RawGraph::new(
        vec![
            node(Operation::InputCiphertext(0)),
            node(Operation::InputCiphertext(1)),
            node(Operation::Add),
        ],
        vec![RawEdge(0, 2, EdgeRole::Left)],
    );
    let errors = validation_errors(&raw);
    assert_eq!(
        errors,
        vec![MalformedGraphError::WrongOperandCount {
            node: 2,
            operation: "Add".to_string(),
            expected: 2,
            actual: 1,
        }]
    );
}

#[test]
fn missing_right_operand_is_reported() {
    let raw = RawGraph::new(
        vec![
            node(Operation::InputCiphertext(0)),
            node(Operation::InputCiphertext(1)),
            node(Operation::Add),
        ],
        vec![
            RawEdge(0, 2, EdgeRole::Left),
            RawEdge(1, 2, EdgeRole::Left),
        ],
    );
    let errors = validation_errors(&raw);
    assert_eq!(
        errors,
        vec![MalformedGraphError::MissingOperand {
            node: 2,
            operation: "Add".to_string(),
            role: EdgeRole::Right,
        }]
    );
}

#[test]
fn node_holes_are_rejected() {
    let mut raw = RawGraph::new(vec![node(Operation::InputCiphertext(0))], Vec::new());
    raw.node_holes = vec![3];
    let errors = validation_errors(&raw);
    assert_eq!(errors, vec![MalformedGraphError::UnsupportedNodeHoles]);
}
