use crate::models::ExpenseRecord;

pub const EXPORT_FILE_NAME: &str = "expenses_export.csv";

/// Serializes rows as UTF-8 CSV with a `person,month,category,description,amount`
/// header. Returns `None` when there is nothing to export.
pub fn export_csv(rows: &[ExpenseRecord]) -> Result<Option<Vec<u8>>, csv::Error> {
    if rows.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in rows {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    tracing::info!("Exported {} rows ({} bytes)", rows.len(), bytes.len());
    Ok(Some(bytes))
}
