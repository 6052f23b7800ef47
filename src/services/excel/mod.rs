pub mod columns;
pub mod loader;
pub mod types;
pub mod utils;

pub use loader::{load_workbook, load_workbook_from_bytes};
pub use types::LoadError;
