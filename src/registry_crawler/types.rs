use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Body of the business-search response: a map of company id to the
/// company's meta-info blob.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub rows: HashMap<String, CompanyMetaInfo>,
}

/// Raw meta-info for one company as returned by the search endpoint. The
/// `TITLE` array is typed because the prefix filter and the parser need it;
/// everything else stays dynamic until the parser projects it onto the
/// record schema.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyMetaInfo {
    #[serde(rename = "TITLE", default)]
    pub title: Vec<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

/// Filing-detail response: a drawer of LABEL/VALUE rows.
#[derive(Debug, Clone, Deserialize)]
pub struct FilingDetailResponse {
    #[serde(rename = "DRAWER_DETAIL_LIST")]
    pub drawer_detail_list: Option<Vec<FilingDetailEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilingDetailEntry {
    #[serde(rename = "LABEL", default)]
    pub label: String,
    #[serde(rename = "VALUE", default)]
    pub value: String,
}

/// Counters reported back to the CLI after a crawl run.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    pub companies_matched: usize,
    pub records_scraped: usize,
    pub branches_dropped: usize,
    pub fatal_errors: usize,
    pub duration_ms: u64,
}
