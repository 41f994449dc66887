mod engine;
mod reader;
mod renderer;
mod writer;

// Lexing, parsing and graph reconciliation
pub mod graph;

pub use engine::Engine;
pub use reader::Reader;
pub use renderer::{ImageRenderer, OUTPUT_FORMATS};
pub use writer::GraphWriter;
