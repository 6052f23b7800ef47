use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open workbook {path}: {reason}")]
    Workbook { path: String, reason: String },

    #[error("sheet '{0}' not found in workbook")]
    MissingSheet(String),

    #[error("failed to read sheet '{sheet}': {reason}")]
    Sheet { sheet: String, reason: String },

    #[error("sheet '{0}' has no header row")]
    EmptySheet(String),

    #[error("sheet '{sheet}' is missing required column '{field}'")]
    MissingColumn { sheet: String, field: &'static str },
}
