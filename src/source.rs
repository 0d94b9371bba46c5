//! Record source interfaces for import pipelines.
//!
//! A source pages records out of an import transport (CSV upload, directory
//! export) so the pipeline can reconcile bounded batches instead of one
//! unbounded load. For a fixed dataset and cursor, fetch output should be
//! deterministic.

use crate::data::ImportRecord;
use crate::errors::ReconcileError;
use crate::types::SourceId;

/// Paging position; pass the returned cursor into the next fetch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SourceCursor {
    /// Records consumed so far.
    pub offset: usize,
}

/// Result of a single fetch call.
#[derive(Clone, Debug)]
pub struct SourceSnapshot {
    /// Records returned by this page.
    pub records: Vec<ImportRecord>,
    /// Cursor for the next fetch.
    pub cursor: SourceCursor,
    /// `true` when the source has no records past `cursor`.
    pub exhausted: bool,
}

/// Pipeline-facing record source interface.
pub trait RecordSource: Send + Sync {
    /// Stable source identifier used in reports and telemetry.
    fn id(&self) -> &str;
    /// Fetch up to `limit` records starting at `cursor`.
    fn fetch(&self, cursor: SourceCursor, limit: usize)
        -> Result<SourceSnapshot, ReconcileError>;
}

/// Source over a pre-fetched in-memory batch.
pub struct InMemorySource {
    id: SourceId,
    records: Vec<ImportRecord>,
}

impl InMemorySource {
    /// Create a source serving `records` in order.
    pub fn new(id: impl Into<SourceId>, records: Vec<ImportRecord>) -> Self {
        Self {
            id: id.into(),
            records,
        }
    }
}

impl RecordSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(
        &self,
        cursor: SourceCursor,
        limit: usize,
    ) -> Result<SourceSnapshot, ReconcileError> {
        let start = cursor.offset.min(self.records.len());
        let end = start.saturating_add(limit).min(self.records.len());
        Ok(SourceSnapshot {
            records: self.records[start..end].to_vec(),
            cursor: SourceCursor { offset: end },
            exhausted: end >= self.records.len(),
        })
    }
}
