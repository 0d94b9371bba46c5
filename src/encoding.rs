//! Detection and repair of UTF-8 text mis-decoded as Latin-1/Windows-1252.
//!
//! Imported spreadsheets and directory exports regularly arrive with fields
//! like `MÃ¼ller GmbH` where the original UTF-8 bytes were decoded with the
//! wrong codepage. Repair is layered:
//!
//! 1. An exact substitution catalogue maps known mojibake sequences back to
//!    the intended character (safe, never speculative).
//! 2. If issues remain, the whole value is re-encoded byte-for-byte and
//!    decoded as UTF-8. This is lossy in theory, so the result is accepted
//!    only when it contains no replacement character and strictly reduces
//!    the mojibake marker count.
//!
//! The catalogue-then-fallback cycle runs up to
//! [`MAX_REPAIR_PASSES`](crate::constants::encoding::MAX_REPAIR_PASSES)
//! times so double-encoded values converge too. Everything here is total:
//! unrepairable input is returned as-is, never an error.

use crate::constants::encoding::{MAX_REPAIR_PASSES, REPLACEMENT_CHAR};
use crate::data::{FieldPatch, ImportRecord};
use crate::types::FieldName;

/// Mojibake sequences with a dedicated substitution.
///
/// Covers the typographic punctuation family (`â€¦`), the euro/trademark
/// signs, and Latin Extended letters whose UTF-8 lead byte is 0xC4/0xC5.
/// Two-byte sequences with lead `Ã`/`Â` (the Latin-1 Supplement: umlauts,
/// eszett, accented vowels, symbols) are decoded by [`decode_latin_pair`]
/// instead of being enumerated here.
///
/// Confusable or invisible characters are written as escapes; each entry
/// notes the repaired character.
const SEQUENCES: [(&str, &str); 25] = [
    // E2 80/82/84 family: typographic punctuation and signs.
    ("â€™", "\u{2019}"),          // right single quote
    ("â€\u{2DC}", "\u{2018}"),    // left single quote
    ("â€œ", "\u{201C}"),          // left double quote
    ("â€\u{9D}", "\u{201D}"),     // right double quote
    ("â€ž", "\u{201E}"),          // low double quote
    ("â€š", "\u{201A}"),          // low single quote
    ("â€\u{201C}", "\u{2013}"),   // en dash
    ("â€\u{201D}", "\u{2014}"),   // em dash
    ("â€\u{A0}", "\u{2020}"),     // dagger
    ("â€¡", "\u{2021}"),          // double dagger
    ("â€¢", "\u{2022}"),          // bullet
    ("â€¦", "\u{2026}"),          // ellipsis
    ("â€°", "\u{2030}"),          // per mille
    ("â€¹", "\u{2039}"),          // single left guillemet
    ("â€º", "\u{203A}"),          // single right guillemet
    ("â‚¬", "\u{20AC}"),          // euro sign
    ("â„¢", "\u{2122}"),          // trademark sign
    // C5 family: Latin Extended-A.
    ("Å\u{A0}", "Š"),
    ("Å¡", "š"),
    ("Å½", "Ž"),
    ("Å¾", "ž"),
    ("Å\u{2019}", "Œ"),
    ("Å\u{201C}", "œ"),
    ("Å¸", "Ÿ"),
    ("Å\u{203A}", "ś"),
];

/// High-frequency lead sequences of mis-decoded UTF-8 multi-byte characters.
///
/// Presence of a marker flags a value as suspicious; the count of markers is
/// the progress metric for the generic fallback.
const MARKERS: [&str; 5] = ["Ã", "Â", "â€", "â‚", "â„"];

/// Byte that produced `ch` under a Windows-1252 decode, if any.
///
/// Identity for the Latin-1 range; the 27 C1-region typographic codepoints
/// map back to their 0x80–0x9F bytes.
fn cp1252_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    if code < 0x100 {
        return Some(code as u8);
    }
    Some(match ch {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    })
}

/// Decode a mis-decoded two-byte UTF-8 sequence with lead byte 0xC2/0xC3.
///
/// `Ã` + continuation covers U+00C0..=U+00FF (umlauts, eszett, accents);
/// `Â` + continuation covers U+00A0..=U+00BF (degree sign, guillemets, ...).
/// Pairs whose follow character does not map to a continuation byte are left
/// alone, so legitimate text like `SÃO PAULO` never matches.
fn decode_latin_pair(lead: char, follow: char) -> Option<char> {
    let lead_byte: u32 = match lead {
        'Ã' => 0xC3,
        'Â' => 0xC2,
        _ => return None,
    };
    let follow_byte = cp1252_byte(follow)?;
    if !(0x80..=0xBF).contains(&follow_byte) {
        return None;
    }
    let code = ((lead_byte & 0x1F) << 6) | (follow_byte as u32 & 0x3F);
    // Never synthesize C1 control characters.
    if code < 0xA0 {
        return None;
    }
    char::from_u32(code)
}

/// Apply the exact substitution catalogue in one left-to-right scan.
///
/// Replacements are emitted to the output and never re-scanned, so each call
/// unwinds exactly one encoding level of a double-encoded value.
fn apply_catalogue(text: &str) -> String {
    let mut repaired = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while !rest.is_empty() {
        for (sequence, replacement) in &SEQUENCES {
            if rest.starts_with(sequence) {
                repaired.push_str(replacement);
                rest = &rest[sequence.len()..];
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        let first = chars.next().expect("scan loop requires non-empty rest");
        if let Some(second) = chars.next() {
            if let Some(decoded) = decode_latin_pair(first, second) {
                repaired.push(decoded);
                rest = &rest[first.len_utf8() + second.len_utf8()..];
                continue;
            }
        }
        repaired.push(first);
        rest = &rest[first.len_utf8()..];
    }
    repaired
}

/// Exact catalogue pass only, without the generic fallback.
///
/// Used by name normalization, where a speculative repair could make two
/// distinct names collide. One call unwinds one encoding level.
pub fn apply_substitutions(text: &str) -> String {
    apply_catalogue(text)
}

/// `true` when the text contains any catalogue sequence or lead marker.
///
/// Markers over-trigger on rare legitimate text (`SÃO PAULO`); [`repair`]
/// guarantees such values pass through unchanged.
pub fn has_issues(text: &str) -> bool {
    MARKERS.iter().any(|marker| text.contains(marker))
        || SEQUENCES
            .iter()
            .any(|(sequence, _)| text.contains(sequence))
}

/// Number of lead-marker occurrences in the text.
pub fn marker_count(text: &str) -> usize {
    MARKERS
        .iter()
        .map(|marker| text.matches(marker).count())
        .sum()
}

/// Reinterpret each character as the byte it came from and decode as UTF-8.
///
/// Returns `None` when the byte buffer is not valid UTF-8. The conversion
/// maps Latin-1 characters to their identical byte and the Windows-1252
/// typographic codepoints to their original 0x80–0x9F bytes; anything else
/// is masked to 8 bits (and then, in practice, rejected by the decode).
fn reinterpret_as_utf8(text: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let byte = cp1252_byte(ch).unwrap_or((ch as u32 & 0xFF) as u8);
        bytes.push(byte);
    }
    String::from_utf8(bytes).ok()
}

/// Repair a mis-decoded text value, best effort.
///
/// Total over all input: clean values come back unchanged (same bytes), and
/// values the guards refuse to touch come back as-is rather than corrupted.
/// Idempotent: repairing a repaired value is a no-op.
pub fn repair(text: &str) -> String {
    if text.is_empty() || !has_issues(text) {
        return text.to_owned();
    }
    let mut current = text.to_owned();
    for _ in 0..MAX_REPAIR_PASSES {
        let before = current.clone();
        current = apply_catalogue(&current);
        if !has_issues(&current) {
            break;
        }
        if let Some(candidate) = reinterpret_as_utf8(&current) {
            let introduces_replacement = candidate.contains(REPLACEMENT_CHAR);
            if !introduces_replacement && marker_count(&candidate) < marker_count(&current) {
                current = candidate;
            }
        }
        if current == before {
            // Fixed point: neither the catalogue nor the fallback made progress.
            break;
        }
        if !has_issues(&current) {
            break;
        }
    }
    current
}

/// Repair the named fields of a record, returning only actual changes.
///
/// Absent fields are skipped; an empty patch means nothing needed repair, so
/// callers can turn the result directly into a minimal update.
pub fn repair_record_fields(record: &ImportRecord, field_names: &[FieldName]) -> FieldPatch {
    let mut patch = FieldPatch::new();
    for &name in field_names {
        if let Some(value) = record.field(name) {
            let repaired = repair(value);
            if repaired != value {
                patch.set(name, repaired);
            }
        }
    }
    patch
}
