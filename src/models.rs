use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire value selecting every person at once.
pub const COMBINED_SCOPE: &str = "combined";
/// Wire value meaning "no category restriction".
pub const ALL_CATEGORIES: &str = "all";

/// One normalized expense line. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRecord {
    pub person: String,
    pub month: String,
    pub category: String,
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonTable {
    pub person: String,
    pub sheet: String,
    pub records: Vec<ExpenseRecord>,
}

impl PersonTable {
    /// Distinct months in first-seen order.
    pub fn months(&self) -> Vec<String> {
        let mut months: Vec<String> = Vec::new();
        for record in &self.records {
            if !months.contains(&record.month) {
                months.push(record.month.clone());
            }
        }
        months
    }
}

/// All person tables of one load, plus their concatenation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    tables: Vec<PersonTable>,
    combined: Vec<ExpenseRecord>,
}

impl Dataset {
    pub fn from_tables(tables: Vec<PersonTable>) -> Self {
        let combined = tables
            .iter()
            .flat_map(|table| table.records.iter().cloned())
            .collect();
        Self { tables, combined }
    }

    pub fn tables(&self) -> &[PersonTable] {
        &self.tables
    }

    pub fn table(&self, person: &str) -> Option<&PersonTable> {
        self.tables.iter().find(|table| table.person == person)
    }

    pub fn combined(&self) -> &[ExpenseRecord] {
        &self.combined
    }

    pub fn people(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.person.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    Person(String),
    Combined,
}

impl Scope {
    pub fn person(name: &str) -> Self {
        Scope::Person(name.to_string())
    }
}

impl From<&str> for Scope {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case(COMBINED_SCOPE) {
            Scope::Combined
        } else {
            Scope::Person(value.to_string())
        }
    }
}

impl From<String> for Scope {
    fn from(value: String) -> Self {
        Scope::from(value.as_str())
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Person(name) => write!(f, "{}", name),
            Scope::Combined => write!(f, "{}", COMBINED_SCOPE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_CATEGORIES) {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        CategoryFilter::from(value.as_str())
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => ALL_CATEGORIES.to_string(),
            CategoryFilter::Only(category) => category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(rename = "person")]
    pub scope: Scope,
    pub month: Option<String>,
    #[serde(default)]
    pub category: CategoryFilter,
    pub expense: Option<String>,
}

impl FilterSelection {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            month: None,
            category: CategoryFilter::All,
            expense: None,
        }
    }
}

/// One group of an aggregate. `series` is the second grouping dimension
/// (the person, in combined scope).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Total {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    pub amount: f64,
}
