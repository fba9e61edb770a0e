use fhe_debugger::client::{ClientConfig, DebuggerClient, FetchError};
use fhe_debugger::server::spawn_server;
use fhe_debugger::session::SessionStore;
use fhe_debugger::utils::sample::{sample_session, SAMPLE_SESSION_NAME};
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[test]
fn backend_serves_sessions_to_the_client() {
    let mut store = SessionStore::new();
    store.insert(sample_session());
    let store = Arc::new(RwLock::new(store));

    let (handle, shutdown, addr) = spawn_server(store, 0).expect("backend starts");
    let client = DebuggerClient::new(&ClientConfig {
        base_url: format!("http://{addr}"),
        timeout: Duration::from_secs(5),
    })
    .expect("client starts");

    let sessions = client.sessions().expect("list sessions");
    assert_eq!(sessions, vec![SAMPLE_SESSION_NAME.to_string()]);

    let envelope = client
        .session_graph(SAMPLE_SESSION_NAME)
        .expect("fetch session graph");
    assert_eq!(envelope.raw().nodes.len(), 13);
    assert_eq!(envelope.raw().relinearize_count(), 3);

    let source = client
        .program_source(SAMPLE_SESSION_NAME)
        .expect("fetch program source");
    assert!(source.contains("fhe_program"));

    let detail = client
        .node_data(SAMPLE_SESSION_NAME, 4)
        .expect("fetch node data");
    assert_eq!(detail.value, 10);
    assert_eq!(detail.multiplicative_depth, 1);

    let missing_node = client.node_data(SAMPLE_SESSION_NAME, 99);
    assert!(matches!(
        missing_node,
        Err(FetchError::Status { status: 404, .. })
    ));

    let missing_session = client.session_graph("does-not-exist");
    assert!(matches!(
        missing_session,
        Err(FetchError::Status { status: 404, .. })
    ));

    // Close the client's pooled connection so graceful shutdown drains.
    drop(client);
    shutdown.send(()).expect("backend accepts shutdown");
    handle.join().expect("backend thread joins");
}
