use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};

const DEFAULT_WORKBOOK: &str = "gastos.xlsx";
const DEFAULT_PEOPLE: &str = "Mohamed,Evelyn";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8050";

/// A tracked person and the workbook sheet holding their expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSheet {
    pub person: String,
    pub sheet: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub workbook_path: PathBuf,
    pub people: Vec<PersonSheet>,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let workbook_path = var("EXPENSE_WORKBOOK")
            .unwrap_or_else(|| DEFAULT_WORKBOOK.to_string());
        let people = parse_people(&var("EXPENSE_PEOPLE")
            .unwrap_or_else(|| DEFAULT_PEOPLE.to_string()))?;
        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid BIND_ADDR '{}': {}", bind_addr, e))?;

        Ok(Config {
            workbook_path: PathBuf::from(workbook_path),
            people,
            bind_addr,
        })
    }
}

pub fn load_config() -> Result<Config> {
    let config = Config::new()?;
    tracing::info!(
        "Config loaded: workbook={}, people={:?}, bind={}",
        config.workbook_path.display(),
        config.people.iter().map(|p| p.person.as_str()).collect::<Vec<_>>(),
        config.bind_addr
    );
    Ok(config)
}

/// Parses `Name` or `Name=Sheet` entries separated by commas.
pub fn parse_people(value: &str) -> Result<Vec<PersonSheet>> {
    let mut seen = HashSet::new();
    let mut people = Vec::new();

    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (person, sheet) = match entry.split_once('=') {
            Some((person, sheet)) => (person.trim(), sheet.trim()),
            None => (entry, entry),
        };
        if person.is_empty() || sheet.is_empty() {
            bail!("Invalid EXPENSE_PEOPLE entry '{}'", entry);
        }
        if !seen.insert(person.to_string()) {
            bail!("Person '{}' listed more than once in EXPENSE_PEOPLE", person);
        }
        people.push(PersonSheet {
            person: person.to_string(),
            sheet: sheet.to_string(),
        });
    }

    if people.is_empty() {
        bail!("EXPENSE_PEOPLE must name at least one person");
    }
    Ok(people)
}
