pub mod cli;
pub mod run;
pub mod run_crawler;
pub mod run_entity_resolution;
pub mod view_graph;

pub use cli::MenuAction;
