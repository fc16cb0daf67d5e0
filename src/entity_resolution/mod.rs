// src/entity_resolution/mod.rs
pub mod graph;
pub mod preparer;
pub mod renderer;
pub mod runner;

// Re-export the main types for easy importing
pub use graph::{build_graph, EntityGraph};
pub use preparer::{load_prepared_records, EntityType, PreparedRecord};
pub use renderer::render_network;
pub use runner::{EntityResolutionRunner, ErSummary};
