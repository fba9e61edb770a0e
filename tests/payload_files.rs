use fhe_debugger::transform::render_graph;
use fhe_debugger::utils::sample::sample_envelope;
use fhe_debugger::utils::serialization::{
    load_envelope, load_render_graph, save_envelope, save_render_graph,
};

#[test]
fn payloads_round_trip_through_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("cross_terms.json");

    let envelope = sample_envelope();
    save_envelope(&path, &envelope).expect("save payload");
    let loaded = load_envelope(&path).expect("load payload");
    assert_eq!(loaded, envelope);
}

#[test]
fn render_graphs_round_trip_through_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("rendered.json");

    let envelope = sample_envelope();
    let rendered = render_graph(envelope.raw(), false).expect("transform succeeds");
    save_render_graph(&path, &rendered).expect("save render graph");
    let loaded = load_render_graph(&path).expect("load render graph");
    assert_eq!(loaded, rendered);
}

#[test]
fn loading_a_missing_payload_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(load_envelope(dir.path().join("absent.json")).is_err());
}
