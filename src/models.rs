use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// One fully scraped registry record: the merge of a company's search
/// meta-info and its filing detail drawer. Field order here is the column
/// order of the exported feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_id: String,
    pub company_name: String,
    pub title: Option<String>,
    pub owner_name: Option<String>,
    pub filing_type: Option<String>,
    pub filing_date: Option<String>,
    pub record_num: Option<String>,
    pub status: Option<String>,
    pub standing: Option<String>,
    pub standing_ar: Option<String>,
    pub standing_ra: Option<String>,
    pub standing_other: Option<String>,
    pub formed_in: Option<String>,
    pub term_of_duration: Option<String>,
    pub initial_filing_date: Option<String>,
    pub delayed_effective_date: Option<String>,
    pub principal_address: Option<String>,
    pub mailing_address: Option<String>,
    pub ar_due_date: Option<String>,
    pub registered_agent: Option<String>,
    pub commercial_registered_agent: Option<String>,
    pub alert: Option<bool>,
    pub can_reinstate: Option<bool>,
    pub can_file_ar: Option<bool>,
    pub can_always_file_ar: Option<bool>,
    pub can_file_reinstatement: Option<bool>,
    pub retrieved_at: DateTime<Utc>,
}

impl CompanyRecord {
    /// Blank record carrying only the identifiers every record must have.
    /// The parser fills the optional fields from the filing detail drawer.
    pub fn new(company_id: String, company_name: String) -> Self {
        Self {
            company_id,
            company_name,
            title: None,
            owner_name: None,
            filing_type: None,
            filing_date: None,
            record_num: None,
            status: None,
            standing: None,
            standing_ar: None,
            standing_ra: None,
            standing_other: None,
            formed_in: None,
            term_of_duration: None,
            initial_filing_date: None,
            delayed_effective_date: None,
            principal_address: None,
            mailing_address: None,
            ar_due_date: None,
            registered_agent: None,
            commercial_registered_agent: None,
            alert: None,
            can_reinstate: None,
            can_file_ar: None,
            can_always_file_ar: None,
            can_file_reinstatement: None,
            retrieved_at: Utc::now(),
        }
    }
}

pub struct CliApp {
    pub config: Config,
}
