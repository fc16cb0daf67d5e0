// src/registry_crawler/mod.rs
pub mod crawler;
pub mod feed;
pub mod parser;
pub mod retry;
pub mod types;

// Re-export the main types for easy importing
pub use crawler::RegistryCrawler;
pub use feed::{open_feed, FeedExporter, FeedFormat};
pub use parser::RecordParser;
pub use retry::RetryPolicy;
pub use types::{CompanyMetaInfo, CrawlOutcome, SearchResponse};
