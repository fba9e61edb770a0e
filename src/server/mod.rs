use crate::session::SessionStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    serve, Json, Router,
};
use std::io;
use std::net::SocketAddr;
use std::sync::{mpsc, Arc, RwLock};
use std::thread;
use tokio::{net::TcpListener, runtime::Runtime, sync::oneshot};

#[derive(Clone)]
struct AppState {
    store: Arc<RwLock<SessionStore>>,
}

pub fn router(store: Arc<RwLock<SessionStore>>) -> Router {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/:session", get(session_graph))
        .route("/sessions/:session/:node", get(node_data))
        .route("/programs/:session", get(program_source))
        .with_state(AppState { store })
}

/// Runs the backend on a background thread and hands back the join handle, a
/// shutdown sender, and the bound address. Binding port 0 picks a free port,
/// which is what the tests use.
pub fn spawn_server(
    store: Arc<RwLock<SessionStore>>,
    port: u16,
) -> io::Result<(thread::JoinHandle<()>, oneshot::Sender<()>, SocketAddr)> {
    let (ready_tx, ready_rx) = mpsc::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = thread::spawn(move || {
        let runtime = Runtime::new().expect("failed to start tokio runtime for debugger backend");
        runtime.block_on(async move {
            let app = router(store);
            let bind_addr = SocketAddr::from(([127, 0, 0, 1], port));
            let listener = TcpListener::bind(bind_addr)
                .await
                .expect("failed to bind debugger backend port");
            let addr = listener.local_addr().expect("backend listener addr");
            let _ = ready_tx.send(addr);
            tracing::info!(%addr, "debugger backend listening");

            let server = serve(listener, app);
            let shutdown = async move {
                let _ = shutdown_rx.await;
            };

            if let Err(err) = server.with_graceful_shutdown(shutdown).await {
                tracing::error!("debugger backend exited with error: {err}");
            }
        });
    });

    let address = ready_rx
        .recv()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "debugger backend failed to start"))?;

    Ok((handle, shutdown_tx, address))
}

/// Runs the backend on the caller's thread until the process is killed.
pub fn serve_blocking(store: Arc<RwLock<SessionStore>>, port: u16) -> io::Result<()> {
    let runtime = Runtime::new()?;
    runtime.block_on(async move {
        let app = router(store);
        let bind_addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = TcpListener::bind(bind_addr).await?;
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "debugger backend listening");
        println!("Debugger backend running on http://{addr}");
        serve(listener, app)
            .await
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    })
}

async fn list_sessions(State(state): State<AppState>) -> Json<Vec<String>> {
    let store = state.store.read().expect("session store poisoned");
    Json(store.names())
}

async fn session_graph(State(state): State<AppState>, Path(session): Path<String>) -> Response {
    let store = state.store.read().expect("session store poisoned");
    match store.get(&session) {
        Some(session) => Json(session.envelope.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Session not found.".to_string()).into_response(),
    }
}

async fn program_source(State(state): State<AppState>, Path(session): Path<String>) -> Response {
    let store = state.store.read().expect("session store poisoned");
    match store.get(&session) {
        Some(session) => session.source_code.clone().into_response(),
        None => (StatusCode::NOT_FOUND, "Session not found.".to_string()).into_response(),
    }
}

async fn node_data(
    State(state): State<AppState>,
    Path((session, node)): Path<(String, usize)>,
) -> Response {
    let store = state.store.read().expect("session store poisoned");
    match store.get(&session) {
        Some(found) => match found.node_detail(node) {
            Some(detail) => Json(detail.clone()).into_response(),
            None => (StatusCode::NOT_FOUND, format!("Node {node} not found")).into_response(),
        },
        None => (StatusCode::NOT_FOUND, format!("Session {session} not found")).into_response(),
    }
}
