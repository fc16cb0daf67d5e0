use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
    pub output: OutputConfig,
    pub entity_resolution: EntityResolutionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    pub search_url: String,
    pub owner_status_url: String,
    pub filing_detail_url: String,
    pub source_type_id: u32,
    pub default_search_term: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub concurrent_requests: usize,
    pub respect_robots: bool,
    /// Cumulative fatal error count at which the crawl aborts. The target
    /// site degrades badly under load, so the default tolerance is 1.
    pub error_count_limit: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    pub enabled: bool,
    pub retry_times: u32,
    pub retry_http_codes: Vec<u16>,
    pub backoff_base_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub data_dir: String,
    pub file_name: String,
    pub file_format: String,
    /// When set, the feed is also copied here after a successful crawl.
    pub latest_feed_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntityResolutionConfig {
    pub plot_dir: String,
    pub plot_format: String,
    pub publish_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig {
                search_url: "https://firststop.sos.nd.gov/api/Records/businesssearch"
                    .to_string(),
                owner_status_url: "https://firststop.sos.nd.gov/api/Common/ownerstatus"
                    .to_string(),
                filing_detail_url: "https://firststop.sos.nd.gov/api/FilingDetail/business"
                    .to_string(),
                source_type_id: 1,
                default_search_term: "X".to_string(),
                user_agent: "Mozilla/5.0 (compatible; RegistryScraper/1.0)".to_string(),
                timeout_seconds: 30,
                concurrent_requests: 16,
                respect_robots: true,
                error_count_limit: 1,
            },
            retry: RetryConfig {
                enabled: true,
                retry_times: 2,
                retry_http_codes: vec![500, 502, 503, 504, 522, 524, 408, 400, 405],
                backoff_base_ms: 1000,
            },
            output: OutputConfig {
                data_dir: "tmp/data".to_string(),
                file_name: "active_companies".to_string(),
                file_format: "csv".to_string(),
                latest_feed_path: None,
            },
            entity_resolution: EntityResolutionConfig {
                plot_dir: "tmp/plot".to_string(),
                plot_format: "html".to_string(),
                publish_path: "docs/index.html".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

pub async fn load_config(
    path: &str,
) -> std::result::Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}
