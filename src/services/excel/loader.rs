use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use bytes::Bytes;
use calamine::{open_workbook_auto, open_workbook_from_rs, Data, Reader, Xlsx};

use super::columns::SheetColumns;
use super::types::LoadError;
use super::utils::{cell_text_at, parse_amount};
use crate::config::PersonSheet;
use crate::models::{Dataset, ExpenseRecord, PersonTable};

/// Reads one sheet per configured person and builds a fresh dataset.
/// Any sheet failing to normalize fails the whole load.
pub fn load_workbook(path: &Path, people: &[PersonSheet]) -> Result<Dataset, LoadError> {
    tracing::info!("Opening workbook {}", path.display());

    let mut workbook = open_workbook_auto(path).map_err(|e| {
        tracing::error!("Failed to open workbook {}: {}", path.display(), e);
        LoadError::Workbook {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    })?;

    read_people(&mut workbook, people)
}

/// Same as [`load_workbook`] for an xlsx file already held in memory.
pub fn load_workbook_from_bytes(
    file_data: Bytes,
    people: &[PersonSheet],
) -> Result<Dataset, LoadError> {
    tracing::info!("Opening workbook from {} bytes", file_data.len());

    let cursor = Cursor::new(file_data);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor).map_err(|e: calamine::XlsxError| {
        tracing::error!("Failed to open uploaded workbook: {}", e);
        LoadError::Workbook {
            path: "<upload>".to_string(),
            reason: e.to_string(),
        }
    })?;

    read_people(&mut workbook, people)
}

fn read_people<RS, R>(workbook: &mut R, people: &[PersonSheet]) -> Result<Dataset, LoadError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let start = std::time::Instant::now();
    let mut tables = Vec::with_capacity(people.len());
    for person in people {
        let rows = read_sheet(workbook, &person.sheet)?;
        tables.push(normalize_sheet(&person.person, &person.sheet, &rows)?);
    }

    let dataset = Dataset::from_tables(tables);
    tracing::info!(
        "Workbook loaded in {:?}: {} people, {} rows",
        start.elapsed(),
        dataset.tables().len(),
        dataset.combined().len()
    );
    Ok(dataset)
}

fn read_sheet<RS, R>(workbook: &mut R, sheet: &str) -> Result<Vec<Vec<Data>>, LoadError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(LoadError::MissingSheet(sheet.to_string()));
    }

    let range = workbook.worksheet_range(sheet).map_err(|e| LoadError::Sheet {
        sheet: sheet.to_string(),
        reason: e.to_string(),
    })?;

    Ok(range.rows().map(|row| row.to_vec()).collect())
}

/// Turns raw sheet rows (header first) into a person table: columns are
/// matched through the alias table, rows without a numeric amount or a month
/// are dropped, and months whose total is not positive are excluded.
pub fn normalize_sheet(
    person: &str,
    sheet: &str,
    rows: &[Vec<Data>],
) -> Result<PersonTable, LoadError> {
    let (header, body) = rows
        .split_first()
        .ok_or_else(|| LoadError::EmptySheet(sheet.to_string()))?;
    let columns = SheetColumns::resolve(sheet, header)?;

    let mut records = Vec::with_capacity(body.len());
    let mut dropped = 0usize;
    for row in body {
        let Some(amount) = row.get(columns.amount).and_then(parse_amount) else {
            dropped += 1;
            continue;
        };
        let month = cell_text_at(row, columns.month);
        if month.is_empty() {
            dropped += 1;
            continue;
        }

        records.push(ExpenseRecord {
            person: person.to_string(),
            month,
            category: cell_text_at(row, columns.category),
            description: cell_text_at(row, columns.description),
            amount,
        });
    }
    if dropped > 0 {
        tracing::debug!(
            "Sheet {}: dropped {} rows without amount or month",
            sheet,
            dropped
        );
    }

    let records = drop_non_positive_months(sheet, records);
    tracing::info!("Sheet {} normalized for {}: {} rows kept", sheet, person, records.len());

    Ok(PersonTable {
        person: person.to_string(),
        sheet: sheet.to_string(),
        records,
    })
}

fn drop_non_positive_months(sheet: &str, records: Vec<ExpenseRecord>) -> Vec<ExpenseRecord> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for record in &records {
        let total = totals.entry(record.month.as_str()).or_insert_with(|| {
            order.push(record.month.as_str());
            0.0
        });
        *total += record.amount;
    }

    let excluded: HashSet<String> = order
        .into_iter()
        .filter(|month| totals[month] <= 0.0)
        .map(|month| {
            tracing::warn!(
                "Sheet {}: excluding month {} (total {:.2})",
                sheet,
                month,
                totals[month]
            );
            month.to_string()
        })
        .collect();

    if excluded.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| !excluded.contains(&record.month))
        .collect()
}
