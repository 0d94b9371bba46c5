use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::fields;
use crate::types::{FieldName, RecordId, RoleId};

/// In-memory view of an imported contact/company record.
///
/// The reconciliation components only read records; every proposed change is
/// emitted as a [`FieldPatch`] for the caller to apply.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Stable record identifier.
    pub id: RecordId,
    /// Creation time; the oldest record wins canonical-selection ties.
    pub created_at: DateTime<Utc>,
    /// Display name (company or person).
    pub name: Option<String>,
    /// Phone number as imported, any formatting.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Street address.
    pub street: Option<String>,
    /// Postal code.
    pub zip: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Free-form note.
    pub note: Option<String>,
}

impl ImportRecord {
    /// Create an empty record with only identity and creation time set.
    pub fn new(id: impl Into<RecordId>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
            name: None,
            phone: None,
            email: None,
            street: None,
            zip: None,
            city: None,
            website: None,
            note: None,
        }
    }

    /// Look up a field value by canonical field name.
    pub fn field(&self, name: FieldName) -> Option<&str> {
        let value = match name {
            fields::FIELD_NAME => &self.name,
            fields::FIELD_PHONE => &self.phone,
            fields::FIELD_EMAIL => &self.email,
            fields::FIELD_STREET => &self.street,
            fields::FIELD_ZIP => &self.zip,
            fields::FIELD_CITY => &self.city,
            fields::FIELD_WEBSITE => &self.website,
            fields::FIELD_NOTE => &self.note,
            _ => &None,
        };
        value.as_deref()
    }

    /// Replace a field value by canonical field name.
    ///
    /// Unknown field names are ignored.
    pub fn set_field(&mut self, name: FieldName, value: impl Into<String>) {
        let slot = match name {
            fields::FIELD_NAME => &mut self.name,
            fields::FIELD_PHONE => &mut self.phone,
            fields::FIELD_EMAIL => &mut self.email,
            fields::FIELD_STREET => &mut self.street,
            fields::FIELD_ZIP => &mut self.zip,
            fields::FIELD_CITY => &mut self.city,
            fields::FIELD_WEBSITE => &mut self.website,
            fields::FIELD_NOTE => &mut self.note,
            _ => return,
        };
        *slot = Some(value.into());
    }

    /// Whether a field holds a non-blank value.
    pub fn has_value(&self, name: FieldName) -> bool {
        self.field(name)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    }

    /// Count of populated fields among the canonical completeness field list.
    ///
    /// Used to rank cluster members when selecting the canonical survivor.
    pub fn completeness_score(&self) -> usize {
        fields::COMPLETENESS_FIELDS
            .into_iter()
            .filter(|&name| self.has_value(name))
            .count()
    }
}

/// Minimal set of field changes proposed for one record.
///
/// Iteration order is the order fields were proposed in, so callers can turn
/// a patch into a deterministic update statement.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FieldPatch {
    changes: IndexMap<FieldName, String>,
}

impl FieldPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose a value for a field, replacing any earlier proposal.
    pub fn set(&mut self, name: FieldName, value: impl Into<String>) {
        self.changes.insert(name, value.into());
    }

    /// Proposed value for a field, if any.
    pub fn get(&self, name: FieldName) -> Option<&str> {
        self.changes.get(name).map(String::as_str)
    }

    /// `true` when the patch proposes no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of proposed field changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Iterate proposed changes in proposal order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.changes.iter().map(|(name, value)| (*name, value.as_str()))
    }

    /// Apply every proposed change to `record`.
    pub fn apply(&self, record: &mut ImportRecord) {
        for (&name, value) in &self.changes {
            record.set_field(name, value.clone());
        }
    }
}

/// Attribute(s) that connected the records of a duplicate group.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchReason {
    /// Shared normalized phone number.
    Phone,
    /// Shared normalized display name.
    Name,
    /// At least one pair of the group shared both attributes.
    Both,
}

/// One cluster of duplicate records and its chosen survivor.
///
/// Ephemeral analysis output; nothing is merged or deleted by the library.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Record selected to represent the cluster.
    pub canonical: RecordId,
    /// Remaining cluster members, duplicates of `canonical`.
    pub duplicates: Vec<RecordId>,
    /// What connected the cluster.
    pub reason: MatchReason,
}

/// A role tag from the organization's controlled vocabulary.
///
/// Supplied by the caller and read-only to the matcher.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanonicalRole {
    /// Stable role identifier.
    pub id: RoleId,
    /// Display name, e.g. `Elektro Installateur`.
    pub name: String,
    /// UI badge color, e.g. `#1f77b4`.
    pub color: String,
    /// Optional free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
