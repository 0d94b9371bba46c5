#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Pipeline and normalization configuration.
pub mod config;
/// Centralized constants for repair, clustering, and field catalogues.
pub mod constants;
/// Record, patch, and result types.
pub mod data;
/// Duplicate clustering and phone/name normalization.
pub mod dedup;
/// Mojibake detection and repair.
pub mod encoding;
/// Aggregate reconciliation metrics.
pub mod metrics;
/// Batch reconciliation pipeline for importers.
pub mod pipeline;
/// Fuzzy role-vocabulary matching.
pub mod roles;
/// Record source traits and the in-memory source.
pub mod source;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;

mod errors;

pub use config::{DedupConfig, ReconcilerConfig};
pub use data::{CanonicalRole, DuplicateGroup, FieldPatch, ImportRecord, MatchReason};
pub use dedup::{find_duplicate_groups, merge_fields, normalize_name, normalize_phone};
pub use encoding::{has_issues, repair, repair_record_fields};
pub use errors::ReconcileError;
pub use metrics::{reason_breakdown, BatchMetrics, ReasonBreakdown, ReasonShare};
pub use pipeline::{BatchReport, Reconciler};
pub use roles::{core_name, find_best, matches};
pub use source::{InMemorySource, RecordSource, SourceCursor, SourceSnapshot};
pub use types::{
    CoreName, FieldName, NormalizedName, NormalizedPhone, RecordId, RoleId, SourceId,
};
