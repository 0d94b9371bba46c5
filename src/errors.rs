use thiserror::Error;

use crate::types::SourceId;

/// Error type for record source and pipeline failures.
///
/// The core components (encoding repair, clustering, role matching) are total
/// and never produce errors; only the batch-fetching layer is fallible.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("record source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: SourceId, reason: String },
    #[error("record source '{source_id}' returned inconsistent state: {details}")]
    SourceInconsistent {
        source_id: SourceId,
        details: String,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
}
