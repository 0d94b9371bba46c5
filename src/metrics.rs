use serde::Serialize;

use crate::data::{DuplicateGroup, MatchReason};

/// Aggregate counters for one reconciliation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchMetrics {
    /// Records pulled through the pipeline.
    pub records_seen: usize,
    /// Records with at least one repaired field.
    pub records_repaired: usize,
    /// Total repaired field values.
    pub fields_repaired: usize,
    /// Duplicate groups found.
    pub groups: usize,
    /// Records marked as duplicates of a canonical.
    pub duplicates: usize,
}

impl BatchMetrics {
    /// Fold another run's counters into this one.
    pub fn absorb(&mut self, other: &BatchMetrics) {
        self.records_seen += other.records_seen;
        self.records_repaired += other.records_repaired;
        self.fields_repaired += other.fields_repaired;
        self.groups += other.groups;
        self.duplicates += other.duplicates;
    }
}

/// Per-reason share of the duplicate groups in a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReasonShare {
    /// Match reason this share covers.
    pub reason: MatchReason,
    /// Number of groups with this reason.
    pub groups: usize,
    /// Fraction of all groups, 0–1.
    pub share: f64,
}

/// Breakdown of duplicate groups by match reason.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReasonBreakdown {
    /// Total number of groups.
    pub total: usize,
    /// Shares sorted by group count, largest first.
    pub shares: Vec<ReasonShare>,
}

/// Compute the per-reason breakdown for a set of groups.
///
/// `None` for an empty set, so callers can skip reporting entirely.
pub fn reason_breakdown(groups: &[DuplicateGroup]) -> Option<ReasonBreakdown> {
    if groups.is_empty() {
        return None;
    }
    let total = groups.len();
    let mut shares: Vec<ReasonShare> = [MatchReason::Phone, MatchReason::Name, MatchReason::Both]
        .into_iter()
        .filter_map(|reason| {
            let count = groups.iter().filter(|group| group.reason == reason).count();
            (count > 0).then(|| ReasonShare {
                reason,
                groups: count,
                share: count as f64 / total as f64,
            })
        })
        .collect();
    shares.sort_by(|a, b| b.groups.cmp(&a.groups));
    Some(ReasonBreakdown { total, shares })
}
