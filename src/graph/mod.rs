pub mod raw;
pub mod render;
pub mod validate;

pub use raw::{
    EdgeRole, GraphEnvelope, InnerGraph, Operation, RawEdge, RawGraph, RawNode, SchemeType,
};
pub use render::{NodeKind, RenderEdge, RenderGraph, RenderNode};
pub use validate::{validate, validation_errors, MalformedGraphError};
