use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{CompanyRecord, Result};
use crate::registry_crawler::types::{CompanyMetaInfo, FilingDetailResponse};

/// Turns one filing-detail response plus the company's search meta-info
/// into a single flat `CompanyRecord`.
///
/// Filing labels are snake-cased into field keys and filing values win over
/// meta-info values for overlapping keys, since the filing drawer is the more
/// specific source. Malformed input (missing drawer, missing TITLE or ID)
/// fails loudly instead of producing a partial record.
pub struct RecordParser;

impl RecordParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(
        &self,
        filing: &FilingDetailResponse,
        meta: &CompanyMetaInfo,
    ) -> Result<CompanyRecord> {
        let drawer = filing
            .drawer_detail_list
            .as_ref()
            .ok_or("filing detail response is missing DRAWER_DETAIL_LIST")?;

        let mut filing_fields: HashMap<String, String> = HashMap::new();
        for entry in drawer {
            filing_fields.insert(snakecase(&entry.label), normalize_text(&entry.value));
        }

        let mut meta_fields: HashMap<String, Value> = HashMap::new();
        for (key, value) in &meta.fields {
            meta_fields.insert(snakecase(key), value.clone());
        }

        let company_id = match meta_fields.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(format!("company meta-info has a non-scalar ID: {}", other).into())
            }
            None => return Err("company meta-info is missing ID".into()),
        };
        let company_name = meta
            .title
            .first()
            .cloned()
            .ok_or("company meta-info is missing TITLE")?;

        let text = |key: &str| -> Option<String> {
            filing_fields
                .get(key)
                .cloned()
                .or_else(|| meta_fields.get(key).and_then(value_as_text))
        };
        let flag = |key: &str| -> Option<bool> {
            filing_fields
                .get(key)
                .and_then(|v| parse_bool(v))
                .or_else(|| meta_fields.get(key).and_then(value_as_flag))
        };

        Ok(CompanyRecord {
            company_id,
            company_name,
            title: filing_fields
                .get("title")
                .cloned()
                .or_else(|| Some(meta.title.join("; "))),
            owner_name: text("owner_name"),
            filing_type: text("filing_type"),
            filing_date: text("filing_date"),
            record_num: text("record_num"),
            status: text("status"),
            standing: text("standing"),
            standing_ar: text("standing_ar"),
            standing_ra: text("standing_ra"),
            standing_other: text("standing_other"),
            formed_in: text("formed_in"),
            term_of_duration: text("term_of_duration"),
            initial_filing_date: text("initial_filing_date"),
            delayed_effective_date: text("delayed_effective_date"),
            principal_address: text("principal_address"),
            mailing_address: text("mailing_address"),
            ar_due_date: text("ar_due_date"),
            registered_agent: text("registered_agent"),
            commercial_registered_agent: text("commercial_registered_agent"),
            alert: flag("alert"),
            can_reinstate: flag("can_reinstate"),
            can_file_ar: flag("can_file_ar"),
            can_always_file_ar: flag("can_always_file_ar"),
            can_file_reinstatement: flag("can_file_reinstatement"),
            retrieved_at: Utc::now(),
        })
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Snake-cases a filing label or meta-info key. The replacements run in this
/// exact order so that `Standing - AR` becomes `standing_ar`.
fn snakecase(text: &str) -> String {
    text.replace(' ', "_")
        .replace('-', "_")
        .replace("___", "_")
        .to_lowercase()
}

/// Collapses newlines to spaces, drops carriage returns and trims.
fn normalize_text(text: &str) -> String {
    text.replace('\n', " ").replace('\r', "").trim().to_string()
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn value_as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_bool(s),
        _ => None,
    }
}
