//! Duplicate clustering over imported record batches.
//!
//! Two records are connected when they share a normalized phone number or a
//! normalized display name; connections are transitive, so a batch partitions
//! into equivalence classes (union-find). Each class with two or more members
//! yields one [`DuplicateGroup`] naming the canonical survivor. Clustering is
//! pure analysis: records are only read, and all merging stays with the
//! caller via [`merge_fields`] patches.

use std::cmp::Ordering;
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::config::DedupConfig;
use crate::constants::{dedup, fields};
use crate::data::{DuplicateGroup, FieldPatch, ImportRecord, MatchReason};
use crate::encoding;
use crate::types::{NormalizedName, NormalizedPhone, RecordId};
use crate::utils::{digits_only, normalize_inline_whitespace};

/// Reduce a phone number to its canonical national digit form.
///
/// Keeps ASCII digits only; a leading `+` stands for the international `00`
/// prefix, and the home country code collapses to the national `0` form, so
/// `+41 79 123 45 67` and `079 123 45 67` compare equal. Foreign
/// international numbers keep their full prefix. Numbers with fewer than
/// `min_phone_digits` digits are unusable for matching.
pub fn normalize_phone(raw: &str, config: &DedupConfig) -> Option<NormalizedPhone> {
    let mut digits = digits_only(raw);
    if raw.trim_start().starts_with('+') {
        digits = format!("{}{digits}", dedup::INTL_PREFIX);
    }
    let home_prefix = format!("{}{}", dedup::INTL_PREFIX, config.country_code);
    if let Some(national) = digits.strip_prefix(&home_prefix) {
        digits = format!("0{national}");
    }
    if digits.len() < config.min_phone_digits {
        return None;
    }
    Some(digits)
}

/// Reduce a display name to its canonical comparison form.
///
/// Applies the exact mojibake substitution pass (table only, no speculative
/// fallback), collapses whitespace, and lowercases. Names shorter than
/// `min_name_chars` are too generic to match on.
pub fn normalize_name(raw: &str, config: &DedupConfig) -> Option<NormalizedName> {
    let repaired = encoding::apply_substitutions(raw);
    let normalized = normalize_inline_whitespace(&repaired).to_lowercase();
    if normalized.chars().count() < config.min_name_chars {
        return None;
    }
    Some(normalized)
}

/// Disjoint-set arena keyed by record id: parent map plus rank map, path
/// compression on find, union by rank.
#[derive(Default)]
struct UnionFind {
    parent: HashMap<RecordId, RecordId>,
    rank: HashMap<RecordId, u32>,
}

impl UnionFind {
    fn insert(&mut self, id: &RecordId) {
        if !self.parent.contains_key(id) {
            self.parent.insert(id.clone(), id.clone());
            self.rank.insert(id.clone(), 0);
        }
    }

    fn contains(&self, id: &RecordId) -> bool {
        self.parent.contains_key(id)
    }

    fn find(&mut self, id: &RecordId) -> RecordId {
        let mut root = id.clone();
        while self.parent[&root] != root {
            root = self.parent[&root].clone();
        }
        let mut current = id.clone();
        while current != root {
            let next = self.parent[&current].clone();
            self.parent.insert(current, root.clone());
            current = next;
        }
        root
    }

    fn union(&mut self, a: &RecordId, b: &RecordId) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        let (parent, child) = match self.rank[&root_a].cmp(&self.rank[&root_b]) {
            Ordering::Less => (root_b, root_a),
            Ordering::Greater => (root_a, root_b),
            Ordering::Equal => {
                *self.rank.get_mut(&root_a).expect("root has a rank") += 1;
                (root_a, root_b)
            }
        };
        self.parent.insert(child, parent);
    }
}

/// Match attribute(s) accumulated for one unordered record pair.
#[derive(Clone, Copy, Debug, Default)]
struct PairReasons {
    phone: bool,
    name: bool,
}

impl PairReasons {
    fn merge(&mut self, other: PairReasons) {
        self.phone |= other.phone;
        self.name |= other.name;
    }
}

/// Stable key for an unordered record pair.
fn pair_key(a: &RecordId, b: &RecordId) -> (RecordId, RecordId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Partition a batch into duplicate groups.
///
/// Records with no usable phone and no usable name never join a group;
/// batches of zero or one record yield nothing. Connections are transitive:
/// a phone link A–B plus a name link B–C puts A, B, and C in one group.
pub fn find_duplicate_groups(
    records: &[ImportRecord],
    config: &DedupConfig,
) -> Vec<DuplicateGroup> {
    if records.len() < 2 {
        return Vec::new();
    }

    let mut by_phone: IndexMap<NormalizedPhone, Vec<&ImportRecord>> = IndexMap::new();
    let mut by_name: IndexMap<NormalizedName, Vec<&ImportRecord>> = IndexMap::new();
    for record in records {
        if let Some(phone) = record
            .phone
            .as_deref()
            .and_then(|raw| normalize_phone(raw, config))
        {
            by_phone.entry(phone).or_default().push(record);
        }
        if let Some(name) = record
            .name
            .as_deref()
            .and_then(|raw| normalize_name(raw, config))
        {
            by_name.entry(name).or_default().push(record);
        }
    }

    let mut sets = UnionFind::default();
    let mut reasons: HashMap<(RecordId, RecordId), PairReasons> = HashMap::new();
    link_buckets(&by_phone, MatchReason::Phone, &mut sets, &mut reasons);
    link_buckets(&by_name, MatchReason::Name, &mut sets, &mut reasons);

    let mut classes: IndexMap<RecordId, Vec<&ImportRecord>> = IndexMap::new();
    for record in records {
        if sets.contains(&record.id) {
            let root = sets.find(&record.id);
            classes.entry(root).or_default().push(record);
        }
    }

    let mut groups = Vec::new();
    for members in classes.values() {
        if members.len() < 2 {
            continue;
        }
        let mut ranked = members.clone();
        ranked.sort_by(|a, b| {
            b.completeness_score()
                .cmp(&a.completeness_score())
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        let canonical = ranked[0].id.clone();
        let duplicates: Vec<RecordId> = ranked[1..].iter().map(|record| record.id.clone()).collect();
        let member_ids: Vec<RecordId> = members.iter().map(|record| record.id.clone()).collect();
        let reason = group_reason(&canonical, &duplicates, &member_ids, &reasons);
        groups.push(DuplicateGroup {
            canonical,
            duplicates,
            reason,
        });
    }
    groups
}

fn link_buckets(
    index: &IndexMap<String, Vec<&ImportRecord>>,
    reason: MatchReason,
    sets: &mut UnionFind,
    reasons: &mut HashMap<(RecordId, RecordId), PairReasons>,
) {
    for bucket in index.values().filter(|bucket| bucket.len() >= 2) {
        for (pos, first) in bucket.iter().enumerate() {
            for second in &bucket[pos + 1..] {
                sets.insert(&first.id);
                sets.insert(&second.id);
                sets.union(&first.id, &second.id);
                let entry = reasons.entry(pair_key(&first.id, &second.id)).or_default();
                match reason {
                    MatchReason::Phone => entry.phone = true,
                    MatchReason::Name => entry.name = true,
                    MatchReason::Both => unreachable!("buckets carry a single reason"),
                }
            }
        }
    }
}

/// Overall reason for one group.
///
/// `Both` requires a single canonical/duplicate pair connected by phone and
/// name at once. Pairs only linked transitively fall back to the reasons the
/// duplicate accumulated against any other member. When different pairs
/// contribute different single reasons, phone wins: exact digit identity is
/// the stronger signal.
fn group_reason(
    canonical: &RecordId,
    duplicates: &[RecordId],
    members: &[RecordId],
    reasons: &HashMap<(RecordId, RecordId), PairReasons>,
) -> MatchReason {
    let mut any_phone = false;
    for duplicate in duplicates {
        let pair = match reasons.get(&pair_key(canonical, duplicate)) {
            Some(direct) => *direct,
            None => {
                let mut merged = PairReasons::default();
                for other in members {
                    if other == duplicate {
                        continue;
                    }
                    if let Some(linked) = reasons.get(&pair_key(duplicate, other)) {
                        merged.merge(*linked);
                    }
                }
                merged
            }
        };
        if pair.phone && pair.name {
            return MatchReason::Both;
        }
        any_phone |= pair.phone;
    }
    if any_phone {
        MatchReason::Phone
    } else {
        MatchReason::Name
    }
}

/// Minimal patch moving information from a duplicate onto its canonical.
///
/// Only fields empty on the canonical and populated on the duplicate are
/// proposed; an existing canonical value is never overwritten.
pub fn merge_fields(primary: &ImportRecord, duplicate: &ImportRecord) -> FieldPatch {
    let mut patch = FieldPatch::new();
    for name in fields::COMPLETENESS_FIELDS {
        if primary.has_value(name) {
            continue;
        }
        if let Some(value) = duplicate.field(name) {
            if !value.trim().is_empty() {
                patch.set(name, value);
            }
        }
    }
    patch
}
