//! Reconciliation pipeline wiring repair, clustering, and merging together.
//!
//! Importers hand the pipeline a batch (or a paged [`RecordSource`]) and get
//! back one [`BatchReport`] describing everything the library proposes:
//! per-record field repairs, duplicate groups, and merge patches onto each
//! group's canonical record. Nothing is persisted or mutated here; applying
//! the report is the caller's job.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ReconcilerConfig;
use crate::data::{DuplicateGroup, FieldPatch, ImportRecord};
use crate::dedup::{find_duplicate_groups, merge_fields};
use crate::encoding::repair_record_fields;
use crate::errors::ReconcileError;
use crate::metrics::BatchMetrics;
use crate::source::{RecordSource, SourceCursor};
use crate::types::RecordId;

/// Everything one reconciliation run proposes, for the caller to apply.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchReport {
    /// Minimal encoding-repair patch per affected record.
    pub repairs: Vec<(RecordId, FieldPatch)>,
    /// Duplicate clusters found in the batch.
    pub groups: Vec<DuplicateGroup>,
    /// Merge patches onto canonical records, one per contributing duplicate.
    pub merges: Vec<(RecordId, FieldPatch)>,
    /// Aggregate counters for the run.
    pub metrics: BatchMetrics,
}

impl BatchReport {
    /// Fold another report into this one.
    pub fn absorb(&mut self, other: BatchReport) {
        self.repairs.extend(other.repairs);
        self.groups.extend(other.groups);
        self.merges.extend(other.merges);
        self.metrics.absorb(&other.metrics);
    }
}

/// Synchronous reconciliation driver.
pub struct Reconciler {
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a reconciler with the given configuration.
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Repair, cluster, and compute merges for one in-memory batch.
    ///
    /// Clustering sees the repaired view of every record, so two rows that
    /// differ only by mojibake still land in the same group.
    pub fn reconcile_batch(&self, records: &[ImportRecord]) -> BatchReport {
        let mut report = BatchReport::default();
        report.metrics.records_seen = records.len();

        let mut repaired: Vec<ImportRecord> = Vec::with_capacity(records.len());
        for record in records {
            let patch = repair_record_fields(record, &self.config.repair_fields);
            let mut clean = record.clone();
            if !patch.is_empty() {
                report.metrics.records_repaired += 1;
                report.metrics.fields_repaired += patch.len();
                patch.apply(&mut clean);
                report.repairs.push((record.id.clone(), patch));
            }
            repaired.push(clean);
        }

        report.groups = find_duplicate_groups(&repaired, &self.config.dedup);
        report.metrics.groups = report.groups.len();

        let by_id: HashMap<&str, &ImportRecord> = repaired
            .iter()
            .map(|record| (record.id.as_str(), record))
            .collect();
        for group in &report.groups {
            report.metrics.duplicates += group.duplicates.len();
            let Some(canonical) = by_id.get(group.canonical.as_str()) else {
                continue;
            };
            // Duplicates contribute in ranked order; each accepted patch is
            // visible to the next one so proposals never conflict.
            let mut merged = (*canonical).clone();
            for duplicate_id in &group.duplicates {
                let Some(duplicate) = by_id.get(duplicate_id.as_str()) else {
                    continue;
                };
                let patch = merge_fields(&merged, duplicate);
                if !patch.is_empty() {
                    patch.apply(&mut merged);
                    report.merges.push((group.canonical.clone(), patch));
                }
            }
        }

        debug!(
            records = report.metrics.records_seen,
            repaired = report.metrics.records_repaired,
            groups = report.metrics.groups,
            duplicates = report.metrics.duplicates,
            "batch reconciled"
        );
        report
    }

    /// Drain a source page by page and reconcile each page.
    ///
    /// Pages are clustered independently: duplicates spanning two pages are
    /// not detected within one run, which keeps memory bounded for very large
    /// imports. Pick `batch_size` accordingly.
    pub fn run(&self, source: &dyn RecordSource) -> Result<BatchReport, ReconcileError> {
        if self.config.batch_size == 0 {
            return Err(ReconcileError::Configuration(
                "batch_size must be at least 1".into(),
            ));
        }
        let mut report = BatchReport::default();
        let mut cursor = SourceCursor::default();
        loop {
            let snapshot = match source.fetch(cursor, self.config.batch_size) {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    warn!(source = source.id(), %error, "record source fetch failed");
                    return Err(error);
                }
            };
            if snapshot.records.is_empty() && !snapshot.exhausted {
                return Err(ReconcileError::SourceInconsistent {
                    source_id: source.id().to_string(),
                    details: "empty page from a non-exhausted source".into(),
                });
            }
            if !snapshot.records.is_empty() {
                report.absorb(self.reconcile_batch(&snapshot.records));
            }
            cursor = snapshot.cursor;
            if snapshot.exhausted {
                break;
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn build_record(id: &str, day: u32, name: Option<&str>, phone: Option<&str>) -> ImportRecord {
        let created_at = Utc.with_ymd_and_hms(2024, 5, day, 10, 0, 0).unwrap();
        let mut record = ImportRecord::new(id, created_at);
        record.name = name.map(str::to_string);
        record.phone = phone.map(str::to_string);
        record
    }

    #[test]
    fn batch_report_carries_repairs_groups_and_merges() {
        let reconciler = Reconciler::new(ReconcilerConfig::default());
        let mut corrupted = build_record("a", 1, Some("MÃ¼ller GmbH"), Some("+41 79 123 45 67"));
        corrupted.city = Some("ZÃ¼rich".into());
        let mut twin = build_record("b", 2, Some("Müller GmbH"), Some("079 123 45 67"));
        twin.email = Some("info@mueller.ch".into());
        twin.street = Some("Bahnhofstrasse 1".into());

        let report = reconciler.reconcile_batch(&[corrupted, twin]);

        assert_eq!(report.repairs.len(), 1);
        let (repaired_id, patch) = &report.repairs[0];
        assert_eq!(repaired_id, "a");
        assert_eq!(patch.get(crate::constants::fields::FIELD_NAME), Some("Müller GmbH"));
        assert_eq!(patch.get(crate::constants::fields::FIELD_CITY), Some("Zürich"));

        assert_eq!(report.groups.len(), 1);
        // After repair both the name and the phone collide.
        assert_eq!(report.groups[0].reason, crate::data::MatchReason::Both);
        // "b" carries the extra email and wins canonical selection.
        assert_eq!(report.groups[0].canonical, "b");

        assert_eq!(report.merges.len(), 1);
        let (canonical_id, merge) = &report.merges[0];
        assert_eq!(canonical_id, "b");
        assert_eq!(merge.get(crate::constants::fields::FIELD_CITY), Some("Zürich"));

        assert_eq!(report.metrics.records_seen, 2);
        assert_eq!(report.metrics.records_repaired, 1);
        assert_eq!(report.metrics.fields_repaired, 2);
        assert_eq!(report.metrics.groups, 1);
        assert_eq!(report.metrics.duplicates, 1);
    }

    #[test]
    fn empty_batch_yields_an_empty_report() {
        let reconciler = Reconciler::new(ReconcilerConfig::default());
        let report = reconciler.reconcile_batch(&[]);
        assert!(report.repairs.is_empty());
        assert!(report.groups.is_empty());
        assert!(report.merges.is_empty());
        assert_eq!(report.metrics, BatchMetrics::default());
    }

    #[test]
    fn zero_batch_size_is_a_configuration_error() {
        let mut config = ReconcilerConfig::default();
        config.batch_size = 0;
        let reconciler = Reconciler::new(config);
        let source = crate::source::InMemorySource::new("unit", Vec::new());
        let error = reconciler.run(&source).unwrap_err();
        assert!(matches!(error, ReconcileError::Configuration(_)));
    }
}
