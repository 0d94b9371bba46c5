use crate::constants::{dedup, fields};
use crate::types::FieldName;

/// Controls phone and name normalization for duplicate matching.
#[derive(Clone, Debug)]
pub struct DedupConfig {
    /// Home country calling code; international numbers carrying it are
    /// rewritten to the national `0` form so `+41 79 ...` and `079 ...`
    /// compare equal.
    pub country_code: String,
    /// Phones with fewer digits than this are excluded from matching.
    pub min_phone_digits: usize,
    /// Names with fewer characters than this (after normalization) are
    /// excluded from matching.
    pub min_name_chars: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            country_code: dedup::DEFAULT_COUNTRY_CODE.to_string(),
            min_phone_digits: dedup::MIN_PHONE_DIGITS,
            min_name_chars: dedup::MIN_NAME_CHARS,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Clone, Debug)]
pub struct ReconcilerConfig {
    /// Max records pulled from a source per fetch when draining.
    ///
    /// Clustering is in-memory and non-streaming, so very large imports
    /// should arrive in pages rather than one batch.
    pub batch_size: usize,
    /// Fields repaired on every incoming record.
    pub repair_fields: Vec<FieldName>,
    /// Normalization thresholds used by the clusterer.
    pub dedup: DedupConfig,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            batch_size: 256,
            repair_fields: fields::TEXT_FIELDS.to_vec(),
            dedup: DedupConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_text_fields() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.repair_fields, fields::TEXT_FIELDS.to_vec());
        assert_eq!(config.dedup.country_code, "41");
        assert_eq!(config.dedup.min_phone_digits, 6);
        assert_eq!(config.dedup.min_name_chars, 3);
    }
}
