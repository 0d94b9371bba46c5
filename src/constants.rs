use crate::types::FieldName;

/// Constants used by encoding repair.
pub mod encoding {
    /// Maximum number of table-then-fallback repair passes over one value.
    ///
    /// Two passes resolve a double-encoded value; the third catches a final
    /// table substitution exposed by the second fallback.
    pub const MAX_REPAIR_PASSES: usize = 3;
    /// Unicode replacement character; a fallback result containing one that
    /// the input did not contain is discarded.
    pub const REPLACEMENT_CHAR: char = '\u{FFFD}';
}

/// Constants used by duplicate clustering and normalization.
pub mod dedup {
    /// Minimum digit count for a phone number to participate in matching.
    pub const MIN_PHONE_DIGITS: usize = 6;
    /// Minimum character count for a display name to participate in matching.
    pub const MIN_NAME_CHARS: usize = 3;
    /// International call prefix substituted for a leading `+`.
    pub const INTL_PREFIX: &str = "00";
    /// Home country calling code rewritten to the national `0` form.
    pub const DEFAULT_COUNTRY_CODE: &str = "41";
}

/// Canonical record field names and field groupings.
pub mod fields {
    use super::FieldName;

    /// Display name field.
    pub const FIELD_NAME: FieldName = "name";
    /// Phone number field.
    pub const FIELD_PHONE: FieldName = "phone";
    /// Email address field.
    pub const FIELD_EMAIL: FieldName = "email";
    /// Street address field.
    pub const FIELD_STREET: FieldName = "street";
    /// Postal code field.
    pub const FIELD_ZIP: FieldName = "zip";
    /// City field.
    pub const FIELD_CITY: FieldName = "city";
    /// Website field.
    pub const FIELD_WEBSITE: FieldName = "website";
    /// Free-form note field.
    pub const FIELD_NOTE: FieldName = "note";

    /// Fields that carry free text and are eligible for encoding repair.
    pub const TEXT_FIELDS: [FieldName; 6] = [
        FIELD_NAME,
        FIELD_STREET,
        FIELD_ZIP,
        FIELD_CITY,
        FIELD_WEBSITE,
        FIELD_NOTE,
    ];

    /// Fields counted by the completeness score used for canonical selection.
    pub const COMPLETENESS_FIELDS: [FieldName; 8] = [
        FIELD_NAME,
        FIELD_PHONE,
        FIELD_EMAIL,
        FIELD_STREET,
        FIELD_ZIP,
        FIELD_CITY,
        FIELD_WEBSITE,
        FIELD_NOTE,
    ];
}

/// Constants used by role matching.
pub mod roles {
    /// Qualification and certification tokens ignored when reducing a job
    /// title to its core name.
    ///
    /// Only whole tokens are stripped; a token carrying attached punctuation
    /// (`dipl.`) is kept as-is.
    pub const IGNORE_TOKENS: [&str; 16] = [
        "efz", "eba", "fa", "fh", "hf", "ba", "bsc", "msc", "mba", "phd", "dipl", "eidg", "dip",
        "lap", "ts", "uni",
    ];
}
