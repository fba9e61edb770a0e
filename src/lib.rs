pub mod client;
pub mod config;
pub mod graph;
pub mod server;
pub mod session;
pub mod transform;
pub mod ui;
pub mod utils;

pub use client::{ClientConfig, DebuggerClient, FetchError};
pub use config::DebuggerConfig;
pub use graph::{
    EdgeRole, GraphEnvelope, MalformedGraphError, NodeKind, Operation, RawEdge, RawGraph, RawNode,
    RenderEdge, RenderGraph, RenderNode, SchemeType,
};
pub use server::{serve_blocking, spawn_server};
pub use session::{DebugSession, NodeDetail, SessionStore};
pub use transform::{fold_relinearize, render_graph, RelinearizeFoldError, TransformError};
pub use ui::DebuggerTui;
