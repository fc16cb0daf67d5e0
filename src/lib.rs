//! Scrapes a state business registry for active companies and resolves the
//! ownership relationships between them into an interactive network graph.

pub mod cli;
pub mod config;
pub mod entity_resolution;
pub mod models;
pub mod registry_crawler;

pub use models::{CliApp, CompanyRecord, Result};
