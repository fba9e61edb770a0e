use fhe_debugger::graph::validate::validation_errors;
use fhe_debugger::transform::render_graph;
use fhe_debugger::utils::random_graph::generate_random_program;

fn assert_fold_invariants(inputs: u32, operations: u32) {
    let (envelope, params) = generate_random_program(inputs, operations);
    let raw = envelope.raw();

    assert!(
        validation_errors(raw).is_empty(),
        "generated program must validate"
    );
    assert_eq!(raw.relinearize_count() as u32, params.relinearize_nodes);
    assert_eq!(raw.input_indices().len() as u32, params.inputs);

    let kept = render_graph(raw, true).expect("mode A succeeds");
    assert_eq!(kept.nodes.len(), raw.nodes.len());
    assert_eq!(kept.edges.len(), raw.edges.len());

    let folded = render_graph(raw, false).expect("mode B succeeds");
    assert_eq!(
        folded.nodes.len(),
        raw.nodes.len() - raw.relinearize_count()
    );
    assert_eq!(
        folded.edges.len(),
        raw.edges.len() - raw.relinearize_count()
    );
    assert!(
        folded
            .edges
            .iter()
            .all(|edge| !raw.is_relinearize(edge.source) && !raw.is_relinearize(edge.target)),
        "folded edges may not touch relinearize nodes"
    );
}

#[test]
fn random_programs_validate_and_fold() {
    for _ in 0..32 {
        assert_fold_invariants(4, 12);
    }
}

#[test]
fn single_input_programs_fold() {
    for _ in 0..8 {
        assert_fold_invariants(1, 3);
    }
}

#[cfg_attr(
    not(feature = "stress-tests"),
    ignore = "set --features stress-tests to enable large program runs"
)]
#[test]
fn large_random_programs_fold() {
    for _ in 0..4 {
        assert_fold_invariants(16, 400);
    }
}
