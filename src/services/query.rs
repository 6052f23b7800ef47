//! Filtering and aggregation over a loaded dataset.
//!
//! Every function here is a pure `(dataset, selection) -> result` pass; nothing
//! is cached between calls, so a reload is visible to the very next query.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::models::{
    CategoryFilter, Dataset, ExpenseRecord, FilterSelection, Scope, Total, ALL_CATEGORIES,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown person '{0}'")]
    UnknownPerson(String),
}

/// Dropdown contents for one scope, plus the selection to start from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub months: Vec<String>,
    pub categories: Vec<String>,
    pub expenses: Vec<String>,
    pub defaults: FilterSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: FilterSelection,
    pub rows: Vec<ExpenseRecord>,
    /// By category over the filtered rows.
    pub by_category: Vec<Total>,
    /// By expense description over the filtered rows.
    pub by_expense: Vec<Total>,
    /// By month over the whole scope, for the trend line.
    pub trend: Vec<Total>,
    /// By month over the whole scope, for the monthly bars.
    pub monthly_totals: Vec<Total>,
    /// `None` until an expense is selected.
    pub comparison: Option<Vec<Total>>,
}

fn scoped_rows<'a>(
    dataset: &'a Dataset,
    scope: &Scope,
) -> Result<&'a [ExpenseRecord], QueryError> {
    match scope {
        Scope::Combined => Ok(dataset.combined()),
        Scope::Person(name) => dataset
            .table(name)
            .map(|table| table.records.as_slice())
            .ok_or_else(|| QueryError::UnknownPerson(name.clone())),
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

pub fn available_options(dataset: &Dataset, scope: &Scope) -> Result<FilterOptions, QueryError> {
    let rows = scoped_rows(dataset, scope)?;

    let months = distinct(rows.iter().map(|r| r.month.as_str()));
    let mut categories = distinct(rows.iter().map(|r| r.category.as_str()));
    if !categories.is_empty() && !categories.iter().any(|c| c == ALL_CATEGORIES) {
        categories.push(ALL_CATEGORIES.to_string());
    }
    let expenses = distinct(rows.iter().map(|r| r.description.as_str()));

    let defaults = FilterSelection {
        scope: scope.clone(),
        month: months.first().cloned(),
        category: CategoryFilter::All,
        expense: None,
    };

    Ok(FilterOptions { months, categories, expenses, defaults })
}

/// Scope, then month, then category; original relative order is kept.
pub fn filtered_rows(
    dataset: &Dataset,
    selection: &FilterSelection,
) -> Result<Vec<ExpenseRecord>, QueryError> {
    let scoped = scoped_rows(dataset, &selection.scope)?;
    Ok(apply_filters(scoped, selection))
}

fn apply_filters(scoped: &[ExpenseRecord], selection: &FilterSelection) -> Vec<ExpenseRecord> {
    scoped
        .iter()
        .filter(|r| selection.month.as_deref().map_or(true, |month| r.month == month))
        .filter(|r| selection.category.matches(&r.category))
        .cloned()
        .collect()
}

pub fn filtered_view(
    dataset: &Dataset,
    selection: &FilterSelection,
) -> Result<DashboardView, QueryError> {
    let scoped = scoped_rows(dataset, &selection.scope)?;
    let by_person = selection.scope == Scope::Combined;
    let rows = apply_filters(scoped, selection);

    let by_category = group_totals(&rows, |r| r.category.as_str(), by_person);
    let by_expense = group_totals(&rows, |r| r.description.as_str(), by_person);
    // Month totals ignore the month and category filters.
    let trend = group_totals(scoped, |r| r.month.as_str(), by_person);
    let monthly_totals = trend.clone();
    let comparison = selection.expense.as_deref().map(|expense| {
        group_totals(
            scoped.iter().filter(|r| r.description == expense),
            |r| r.month.as_str(),
            by_person,
        )
    });

    tracing::debug!(
        "View {}: {} of {} rows, comparison={}",
        selection.scope,
        rows.len(),
        scoped.len(),
        comparison.is_some()
    );

    Ok(DashboardView {
        selection: selection.clone(),
        rows,
        by_category,
        by_expense,
        trend,
        monthly_totals,
        comparison,
    })
}

/// Sums amounts by `key` (and by person when `by_person`), keeping groups in
/// the order they first appear.
fn group_totals<'a>(
    rows: impl IntoIterator<Item = &'a ExpenseRecord>,
    key: fn(&ExpenseRecord) -> &str,
    by_person: bool,
) -> Vec<Total> {
    let mut totals: Vec<Total> = Vec::new();
    let mut index: HashMap<(&'a str, Option<&'a str>), usize> = HashMap::new();

    for record in rows {
        let series = by_person.then_some(record.person.as_str());
        let group = (key(record), series);
        match index.get(&group) {
            Some(&idx) => totals[idx].amount += record.amount,
            None => {
                index.insert(group, totals.len());
                totals.push(Total {
                    key: group.0.to_string(),
                    series: series.map(str::to_string),
                    amount: record.amount,
                });
            }
        }
    }
    totals
}
