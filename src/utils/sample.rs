use crate::graph::raw::GraphEnvelope;
use crate::session::{DebugSession, NodeDetail};

pub const SAMPLE_SESSION_NAME: &str = "cross_terms";

/// The payload the backend serves for the sample program below: four
/// ciphertext inputs, three multiplies (each followed by a relinearize), one
/// add, two outputs.
pub const SAMPLE_GRAPH_JSON: &str = r#"{"graph":{"graph":{"nodes":[{"operation":{"InputCiphertext":0}},{"operation":{"InputCiphertext":1}},{"operation":{"InputCiphertext":2}},{"operation":{"InputCiphertext":3}},{"operation":"Multiply"},{"operation":"Multiply"},{"operation":"Multiply"},{"operation":"Add"},{"operation":"OutputCiphertext"},{"operation":"OutputCiphertext"},{"operation":"Relinearize"},{"operation":"Relinearize"},{"operation":"Relinearize"}],"node_holes":[],"edge_property":"directed","edges":[[0,4,"Left"],[3,4,"Right"],[1,5,"Left"],[2,5,"Right"],[1,6,"Left"],[3,6,"Right"],[12,7,"Left"],[10,7,"Right"],[7,8,"Unary"],[11,9,"Unary"],[5,10,"Unary"],[6,11,"Unary"],[4,12,"Unary"]]}},"data":"Bfv"}"#;

pub const SAMPLE_PROGRAM: &str = r#"#[fhe_program(scheme = "bfv")]
fn cross_terms(
    a: Cipher<Signed>,
    b: Cipher<Signed>,
    c: Cipher<Signed>,
    d: Cipher<Signed>,
) -> (Cipher<Signed>, Cipher<Signed>) {
    let paired = a * d + b * c;
    let tail = b * d;

    (paired, tail)
}
"#;

pub fn sample_envelope() -> GraphEnvelope {
    GraphEnvelope::from_json(SAMPLE_GRAPH_JSON).expect("embedded sample payload parses")
}

/// The default session: the sample graph, its program source, and captured
/// node data for inputs a=2, b=3, c=4, d=5.
pub fn sample_session() -> DebugSession {
    let mut session = DebugSession::new(SAMPLE_SESSION_NAME, sample_envelope(), SAMPLE_PROGRAM.to_string());
    let details = [
        detail(2, 55, 0),  // InputCiphertext 0
        detail(3, 55, 0),  // InputCiphertext 1
        detail(4, 55, 0),  // InputCiphertext 2
        detail(5, 55, 0),  // InputCiphertext 3
        detail(10, 32, 1), // Multiply a*d
        detail(12, 32, 1), // Multiply b*c
        detail(15, 32, 1), // Multiply b*d
        detail(22, 28, 1), // Add
        detail(22, 28, 1), // OutputCiphertext
        detail(15, 30, 1), // OutputCiphertext
        detail(12, 30, 1), // Relinearize
        detail(15, 30, 1), // Relinearize
        detail(10, 30, 1), // Relinearize
    ];
    session.node_data = details.into_iter().map(Some).collect();
    session
}

fn detail(value: i64, noise_budget: u32, multiplicative_depth: u32) -> NodeDetail {
    NodeDetail {
        value,
        noise_budget: Some(noise_budget),
        coefficients: vec![value as u64],
        multiplicative_depth,
    }
}
