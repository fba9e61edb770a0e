use crate::graph::raw::GraphEnvelope;
use crate::graph::render::RenderGraph;
use std::fs;
use std::io;
use std::path::Path;

pub fn save_envelope<P: AsRef<Path>>(path: P, envelope: &GraphEnvelope) -> io::Result<()> {
    let text = envelope
        .to_json()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("serialize payload: {err}")))?;
    fs::write(path, text)
}

pub fn load_envelope<P: AsRef<Path>>(path: P) -> io::Result<GraphEnvelope> {
    let text = fs::read_to_string(path)?;
    GraphEnvelope::from_json(&text).map_err(|err| {
        io::Error::new(io::ErrorKind::Other, format!("deserialize payload: {err}"))
    })
}

pub fn save_render_graph<P: AsRef<Path>>(path: P, graph: &RenderGraph) -> io::Result<()> {
    let text = graph.to_json().map_err(|err| {
        io::Error::new(io::ErrorKind::Other, format!("serialize render graph: {err}"))
    })?;
    fs::write(path, text)
}

pub fn load_render_graph<P: AsRef<Path>>(path: P) -> io::Result<RenderGraph> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|err| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("deserialize render graph: {err}"),
        )
    })
}
