use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

use crate::models::Result;

/// Columns the input feed must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "company_id",
    "company_name",
    "owner_name",
    "registered_agent",
    "commercial_registered_agent",
    "principal_address",
];

/// Which of the three agent/owner columns won the priority rule for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    CommercialRegisteredAgent,
    RegisteredAgent,
    Owner,
}

impl EntityType {
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::CommercialRegisteredAgent => "Commercial Registered Agent",
            EntityType::RegisteredAgent => "Registered Agent",
            EntityType::Owner => "Owner",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One feed row with its resolved entity attached.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecord {
    pub company_id: String,
    pub company_name: String,
    pub entity_name: String,
    pub entity_type: EntityType,
    pub principal_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PreparedData {
    pub records: Vec<PreparedRecord>,
    pub total_rows: usize,
}

/// Applies the strict priority commercial > registered > owner. Rows where
/// all three are absent have no resolvable entity.
pub fn resolve_entity(
    commercial_registered_agent: Option<String>,
    registered_agent: Option<String>,
    owner_name: Option<String>,
) -> Option<(String, EntityType)> {
    commercial_registered_agent
        .map(|name| (name, EntityType::CommercialRegisteredAgent))
        .or_else(|| registered_agent.map(|name| (name, EntityType::RegisteredAgent)))
        .or_else(|| owner_name.map(|name| (name, EntityType::Owner)))
}

/// Loads the crawl feed and derives the entity per row, dropping rows with
/// no resolvable entity. A missing required column fails with a message
/// naming it; empty cells count as absent.
pub fn load_prepared_records(path: &str) -> Result<PreparedData> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| format!("failed to read input file {}: {}", path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| format!("failed to read the header row of {}: {}", path, e))?
        .clone();

    let mut columns: HashMap<&str, usize> = HashMap::new();
    for column in REQUIRED_COLUMNS {
        match headers.iter().position(|header| header == column) {
            Some(index) => {
                columns.insert(column, index);
            }
            None => {
                return Err(format!(
                    "input file {} is missing required column '{}'",
                    path, column
                )
                .into())
            }
        }
    }

    let mut records = Vec::new();
    let mut total_rows = 0usize;

    for row in reader.records() {
        let row = row?;
        total_rows += 1;

        let cell = |name: &str| -> Option<String> {
            row.get(columns[name])
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let resolved = resolve_entity(
            cell("commercial_registered_agent"),
            cell("registered_agent"),
            cell("owner_name"),
        );
        match resolved {
            Some((entity_name, entity_type)) => records.push(PreparedRecord {
                company_id: cell("company_id").unwrap_or_default(),
                company_name: cell("company_name").unwrap_or_default(),
                entity_name,
                entity_type,
                principal_address: cell("principal_address"),
            }),
            None => debug!("Row {} has no resolvable entity, dropping it", total_rows),
        }
    }

    info!(
        "📊 Prepared {} of {} rows from {}",
        records.len(),
        total_rows,
        path
    );
    Ok(PreparedData {
        records,
        total_rows,
    })
}
