/// Unique record identifier (stable across runs).
/// Example: `import_2024_q3::row_118`
pub type RecordId = String;
/// Identifier for the source that produced a batch of records.
/// Examples: `csv_upload`, `directory_sync`
pub type SourceId = String;
/// Canonical name of a record text field.
/// Examples: `name`, `phone`, `street`
pub type FieldName = &'static str;
/// Phone number reduced to its canonical national digit form.
/// Example: `0791234567`
pub type NormalizedPhone = String;
/// Display name reduced to its canonical comparison form.
/// Example: `mueller gmbh`
pub type NormalizedName = String;
/// Identifier for a canonical role tag.
/// Example: `role_elektro_installateur`
pub type RoleId = String;
/// Job title with qualification tokens stripped, used for fuzzy comparison.
/// Example: `elektro installateur`
pub type CoreName = String;
