use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use crate::config::PersonSheet;
use crate::models::Dataset;
use crate::services::excel::{self, LoadError};

/// Holds the current dataset. Queries work on an `Arc` snapshot; reloads are
/// serialized and only swap the handle once the new dataset is complete.
#[derive(Debug, Default)]
pub struct DatasetStore {
    current: RwLock<Option<Arc<Dataset>>>,
    reload_lock: Mutex<()>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<Arc<Dataset>> {
        self.current.read().clone()
    }

    /// Runs `load` and installs its result. On error the previous dataset,
    /// if any, stays in place.
    pub fn reload_with<F>(&self, load: F) -> Result<Arc<Dataset>, LoadError>
    where
        F: FnOnce() -> Result<Dataset, LoadError>,
    {
        let _guard = self.reload_lock.lock();
        match load() {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                *self.current.write() = Some(Arc::clone(&dataset));
                tracing::info!("Dataset replaced: {} rows", dataset.combined().len());
                Ok(dataset)
            }
            Err(e) => {
                tracing::error!("Reload failed, keeping previous dataset: {}", e);
                Err(e)
            }
        }
    }

    pub fn reload(&self, path: &Path, people: &[PersonSheet]) -> Result<Arc<Dataset>, LoadError> {
        self.reload_with(|| excel::load_workbook(path, people))
    }

    pub fn reload_from_bytes(
        &self,
        file_data: Bytes,
        people: &[PersonSheet],
    ) -> Result<Arc<Dataset>, LoadError> {
        self.reload_with(|| excel::load_workbook_from_bytes(file_data, people))
    }
}

#[cfg(test)]
impl DatasetStore {
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(dataset))),
            reload_lock: Mutex::new(()),
        }
    }
}
