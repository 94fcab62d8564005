use std::path::PathBuf;

use tracing::info;

use postbox_types::models::StoredRecord;
use postbox_types::sink::{RecordSink, SinkError};

use crate::Database;

/// `RecordSink` backed by an SQLite file.
///
/// The database is opened for every insert and closed afterwards; no
/// connection is held between records.
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSink for SqliteSink {
    fn insert(&self, record: &StoredRecord) -> Result<(), SinkError> {
        let id = Database::open(&self.path)
            .and_then(|db| db.insert_record(record))
            .map_err(|e| SinkError::new(format!("{}: {:#}", self.path.display(), e)))?;

        info!("Record {} saved to {}", id, self.path.display());
        Ok(())
    }
}
