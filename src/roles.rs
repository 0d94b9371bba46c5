//! Fuzzy matching of free-text job titles against a role vocabulary.
//!
//! Imported position titles carry qualification suffixes (`Elektriker EFZ`,
//! `Pflegefachfrau HF`) that the controlled role vocabulary does not. Titles
//! and role names are reduced to a core name with those tokens stripped and
//! compared by containment, preferring the most specific matching role.

use crate::constants::roles::IGNORE_TOKENS;
use crate::data::CanonicalRole;
use crate::types::CoreName;

/// Reduce a title to its core name: lowercase, whitespace-tokenized, with
/// qualification tokens dropped.
///
/// Only bare tokens are stripped; a token fused with punctuation (`dipl.`,
/// `efz,`) is kept so abbreviations inside composite tokens survive.
pub fn core_name(text: &str) -> CoreName {
    let lowered = text.to_lowercase();
    lowered
        .split_whitespace()
        .filter(|token| !IGNORE_TOKENS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether two titles refer to the same role.
///
/// Both core names must be non-empty and one must contain the other, so
/// `Elektro Installateur EFZ` matches the role `Elektro Installateur` as well
/// as the broader `Installateur`. Empty inputs never match.
pub fn matches(a: &str, b: &str) -> bool {
    let core_a = core_name(a);
    let core_b = core_name(b);
    if core_a.is_empty() || core_b.is_empty() {
        return false;
    }
    core_a.contains(&core_b) || core_b.contains(&core_a)
}

/// Pick the best role for a position title from the caller's vocabulary.
///
/// Among all matching roles the one with the longest core name wins, so a
/// specific role is preferred over a broader one that also matches. Ties keep
/// the earliest role in the input list. `None` when the title is empty, the
/// vocabulary is empty, or nothing matches; the result is advisory.
pub fn find_best<'a>(position_title: &str, roles: &'a [CanonicalRole]) -> Option<&'a CanonicalRole> {
    if position_title.trim().is_empty() || roles.is_empty() {
        return None;
    }
    let mut best: Option<(&CanonicalRole, usize)> = None;
    for role in roles {
        if !matches(position_title, &role.name) {
            continue;
        }
        let specificity = core_name(&role.name).chars().count();
        match best {
            Some((_, current)) if specificity <= current => {}
            _ => best = Some((role, specificity)),
        }
    }
    best.map(|(role, _)| role)
}
