// src/registry_crawler/crawler.rs
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use texting_robots::Robot;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::{CrawlerConfig, RetryConfig};
use crate::models::{CompanyRecord, Result};
use crate::registry_crawler::feed::FeedExporter;
use crate::registry_crawler::parser::RecordParser;
use crate::registry_crawler::retry::RetryPolicy;
use crate::registry_crawler::types::{
    CompanyMetaInfo, CrawlOutcome, FilingDetailResponse, SearchResponse,
};

/// Crawler for the Secretary of State business registry REST API.
///
/// One crawl is a three-stage chain: a business search POST yields candidate
/// companies, then for each company passing the prefix filter an owner-status
/// POST yields the token needed to GET its filing detail, which the parser
/// merges with the search meta-info into a `CompanyRecord`. Stages for one
/// company run strictly in order; different companies run concurrently.
pub struct RegistryCrawler {
    client: Client,
    config: CrawlerConfig,
    retry: RetryPolicy,
    parser: RecordParser,
}

impl RegistryCrawler {
    pub fn new(config: CrawlerConfig, retry: &RetryConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("undefined"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            retry: RetryPolicy::new(retry),
            parser: RecordParser::new(),
            config,
        })
    }

    /// Runs one crawl for `search_param`, writing records to `feed` as they
    /// arrive. Transient failures drop the affected company only; fatal
    /// errors abort the whole run once `error_count_limit` is reached.
    pub async fn run(&self, search_param: &str, feed: &mut dyn FeedExporter) -> Result<CrawlOutcome> {
        let start_time = Instant::now();
        info!(
            "🕷️  Pulling active companies list starting with letter: {}...",
            search_param
        );

        let robots = if self.config.respect_robots {
            self.fetch_robots().await
        } else {
            None
        };

        let mut outcome = CrawlOutcome::default();

        if !self.request_allowed(robots.as_ref(), &self.config.search_url) {
            warn!("Business search blocked by robots.txt, nothing to crawl");
            return Ok(outcome);
        }

        let payload = json!({
            "SEARCH_VALUE": search_param,
            "STARTS_WITH_YN": "true",
            "ACTIVE_ONLY_YN": true,
        });
        let response = self
            .retry
            .send("business search", || {
                self.client.post(&self.config.search_url).json(&payload)
            })
            .await?;
        let Some(response) = response else {
            warn!("Business search abandoned after retries, nothing to crawl");
            return Ok(outcome);
        };
        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| format!("business search response is not valid JSON: {}", e))?;

        let candidates = search.rows.len();
        let mut fatal_errors = 0usize;
        let companies = self.filter_companies(search.rows, search_param, &mut fatal_errors)?;
        outcome.companies_matched = companies.len();
        outcome.fatal_errors = fatal_errors;
        info!(
            "📋 {} of {} active companies match the '{}' prefix",
            companies.len(),
            candidates,
            search_param
        );

        let concurrency = self.config.concurrent_requests.max(1);
        let mut records = stream::iter(companies)
            .map(|(company_id, meta)| self.process_company(company_id, meta, robots.as_ref()))
            .buffer_unordered(concurrency);

        while let Some(result) = records.next().await {
            match result {
                Ok(Some(record)) => {
                    feed.write_record(&record).await?;
                    outcome.records_scraped += 1;
                }
                Ok(None) => outcome.branches_dropped += 1,
                Err(e) => {
                    error!("❌ Crawl error: {}", e);
                    outcome.fatal_errors += 1;
                    if outcome.fatal_errors >= self.config.error_count_limit {
                        return Err(format!(
                            "aborting crawl after {} fatal error(s): {}",
                            outcome.fatal_errors, e
                        )
                        .into());
                    }
                }
            }
        }

        outcome.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "🎯 Crawl complete: {} records scraped, {} branch(es) dropped in {}ms",
            outcome.records_scraped, outcome.branches_dropped, outcome.duration_ms
        );
        info!("Done...");
        Ok(outcome)
    }

    /// Keeps companies whose first TITLE entry starts with the search term,
    /// case-insensitively, in stable id order. A company without a TITLE is
    /// a fatal error counted against the error budget.
    fn filter_companies(
        &self,
        rows: HashMap<String, CompanyMetaInfo>,
        search_param: &str,
        fatal_errors: &mut usize,
    ) -> Result<Vec<(String, CompanyMetaInfo)>> {
        let term = search_param.to_lowercase();
        let mut companies = Vec::new();

        for (company_id, meta) in rows {
            match meta.title.first() {
                Some(title) if title.to_lowercase().starts_with(&term) => {
                    companies.push((company_id, meta));
                }
                Some(_) => {
                    debug!("Company {} does not match the search prefix", company_id);
                }
                None => {
                    error!("❌ Company {} meta-info is missing TITLE", company_id);
                    *fatal_errors += 1;
                    if *fatal_errors >= self.config.error_count_limit {
                        return Err(format!(
                            "aborting crawl after {} fatal error(s): company {} meta-info is missing TITLE",
                            *fatal_errors, company_id
                        )
                        .into());
                    }
                }
            }
        }

        companies.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(companies)
    }

    /// Stages two and three for a single company. `Ok(None)` means the
    /// branch was dropped (retries exhausted or robots.txt said no).
    async fn process_company(
        &self,
        company_id: String,
        meta: CompanyMetaInfo,
        robots: Option<&Robot>,
    ) -> Result<Option<CompanyRecord>> {
        if !self.request_allowed(robots, &self.config.owner_status_url) {
            return Ok(None);
        }
        let payload = json!({
            "SOURCE_TYPE_ID": self.config.source_type_id,
            "SOURCE_ID": company_id,
        });
        let label = format!("owner status for company {}", company_id);
        let Some(response) = self
            .retry
            .send(&label, || {
                self.client
                    .post(&self.config.owner_status_url)
                    .json(&payload)
            })
            .await?
        else {
            return Ok(None);
        };
        let status_value: Value = response.json().await.map_err(|e| {
            format!(
                "owner status response for company {} is not valid JSON: {}",
                company_id, e
            )
        })?;
        let owner_status = owner_status_token(&status_value);

        let detail_url = format!(
            "{}/{}/{}",
            self.config.filing_detail_url, company_id, owner_status
        );
        if !self.request_allowed(robots, &detail_url) {
            return Ok(None);
        }
        let label = format!("filing detail for company {}", company_id);
        let Some(response) = self
            .retry
            .send(&label, || self.client.get(&detail_url))
            .await?
        else {
            return Ok(None);
        };
        let filing: FilingDetailResponse = response.json().await.map_err(|e| {
            format!(
                "filing detail response for company {} is not valid JSON: {}",
                company_id, e
            )
        })?;

        let record = self
            .parser
            .parse(&filing, &meta)
            .map_err(|e| format!("failed to parse record for company {}: {}", company_id, e))?;
        debug!(
            "Parsed record for company {} ({})",
            record.company_id, record.company_name
        );
        Ok(Some(record))
    }

    /// Fetches robots.txt once from the search URL's origin. Any failure to
    /// fetch or parse it means all paths are treated as allowed.
    async fn fetch_robots(&self) -> Option<Robot> {
        let robots_url = match Url::parse(&self.config.search_url)
            .and_then(|base| base.join("/robots.txt"))
        {
            Ok(url) => url,
            Err(e) => {
                warn!(
                    "Could not derive a robots.txt URL from {}: {}",
                    self.config.search_url, e
                );
                return None;
            }
        };

        match self.client.get(robots_url.clone()).send().await {
            Ok(response) if response.status().is_success() => match response.bytes().await {
                Ok(body) => match Robot::new(&self.config.user_agent, &body) {
                    Ok(robot) => {
                        info!("🤖 Loaded robots.txt from {}", robots_url);
                        Some(robot)
                    }
                    Err(e) => {
                        warn!("Failed to parse robots.txt from {}: {}", robots_url, e);
                        None
                    }
                },
                Err(e) => {
                    warn!("Failed to read robots.txt from {}: {}", robots_url, e);
                    None
                }
            },
            Ok(response) => {
                debug!(
                    "No robots.txt at {} (status {})",
                    robots_url,
                    response.status()
                );
                None
            }
            Err(e) => {
                warn!("Could not fetch robots.txt from {}: {}", robots_url, e);
                None
            }
        }
    }

    fn request_allowed(&self, robots: Option<&Robot>, url: &str) -> bool {
        match robots {
            Some(robot) if !robot.allowed(url) => {
                warn!("🚫 robots.txt disallows {}; skipping", url);
                false
            }
            _ => true,
        }
    }
}

/// The owner-status token is the response body rendered as a string and
/// lower-cased: a JSON string contributes its contents, any other value its
/// JSON rendering.
pub(crate) fn owner_status_token(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_crawler() -> RegistryCrawler {
        let config = Config::default();
        RegistryCrawler::new(config.crawler, &config.retry).unwrap()
    }

    fn meta(title: &[&str]) -> CompanyMetaInfo {
        serde_json::from_value(json!({"TITLE": title, "ID": "1"})).unwrap()
    }

    #[test]
    fn owner_status_token_lowercases_strings() {
        assert_eq!(owner_status_token(&json!("FALSE")), "false");
        assert_eq!(owner_status_token(&json!("True")), "true");
    }

    #[test]
    fn owner_status_token_renders_non_strings_as_json() {
        assert_eq!(owner_status_token(&json!(false)), "false");
        assert_eq!(owner_status_token(&json!(42)), "42");
        assert_eq!(owner_status_token(&json!({"OK": true})), "{\"ok\":true}");
    }

    #[test]
    fn filter_keeps_prefix_matches_in_id_order() {
        let crawler = test_crawler();
        let mut rows = HashMap::new();
        rows.insert("20".to_string(), meta(&["Acme LLC"]));
        rows.insert("10".to_string(), meta(&["Atlas Corp"]));
        rows.insert("30".to_string(), meta(&["Zenith Inc"]));

        let mut fatal_errors = 0;
        let companies = crawler.filter_companies(rows, "a", &mut fatal_errors).unwrap();

        let ids: Vec<&str> = companies.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["10", "20"]);
        assert_eq!(fatal_errors, 0);
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let crawler = test_crawler();
        let mut rows = HashMap::new();
        rows.insert("1".to_string(), meta(&["acme llc"]));

        let mut fatal_errors = 0;
        let companies = crawler
            .filter_companies(rows, "ACME", &mut fatal_errors)
            .unwrap();
        assert_eq!(companies.len(), 1);
    }

    #[test]
    fn missing_title_exhausts_the_error_budget() {
        let crawler = test_crawler();
        let mut rows = HashMap::new();
        rows.insert(
            "1".to_string(),
            serde_json::from_value(json!({"ID": "1"})).unwrap(),
        );

        let mut fatal_errors = 0;
        let err = crawler
            .filter_companies(rows, "a", &mut fatal_errors)
            .unwrap_err();
        assert!(err.to_string().contains("TITLE"));
        assert_eq!(fatal_errors, 1);
    }
}
