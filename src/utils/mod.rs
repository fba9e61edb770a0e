pub mod random_graph;
pub mod sample;
pub mod serialization;

pub use random_graph::{generate_random_program, ProgramParameters};
pub use sample::{sample_envelope, sample_session, SAMPLE_SESSION_NAME};
pub use serialization::{load_envelope, load_render_graph, save_envelope, save_render_graph};
