use thiserror::Error;

use crate::models::StoredRecord;

#[derive(Debug, Error)]
#[error("persistence sink failed: {reason}")]
pub struct SinkError {
    pub reason: String,
}

impl SinkError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Destination for ingested records.
///
/// Implementations may block; the ingestion server calls them off the async
/// runtime. A failed insert is logged by the caller and the record is dropped.
pub trait RecordSink: Send + Sync {
    fn insert(&self, record: &StoredRecord) -> Result<(), SinkError>;
}
