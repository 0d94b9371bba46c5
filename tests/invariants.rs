use chrono::{TimeZone, Utc};

use reconcile::{
    find_best, find_duplicate_groups, has_issues, merge_fields, repair, CanonicalRole,
    DedupConfig, ImportRecord, MatchReason, RecordId,
};

fn build_record(id: &str, day: u32, name: Option<&str>, phone: Option<&str>) -> ImportRecord {
    let created_at = Utc.with_ymd_and_hms(2024, 8, day, 9, 0, 0).unwrap();
    let mut record = ImportRecord::new(id, created_at);
    record.name = name.map(str::to_string);
    record.phone = phone.map(str::to_string);
    record
}

fn build_role(id: &str, name: &str) -> CanonicalRole {
    CanonicalRole {
        id: id.to_string(),
        name: name.to_string(),
        color: "#9467bd".to_string(),
        note: None,
    }
}

const SAMPLES: [&str; 10] = [
    "",
    "plain ascii",
    "Müller GmbH",
    "MÃ¼ller GmbH",
    "MÃƒÂ¼ller GmbH",
    "ZÃ¼rcher StraÃŸe 12, ZÃ¼rich",
    "SÃO PAULO",
    "Kunde sagt: â€žpasstâ€œ â€¦",
    "Budget â‚¬ 500",
    "Restmarker Ã am Ende Ã",
];

#[test]
fn repair_is_idempotent_over_sample_corpus() {
    for sample in SAMPLES {
        let once = repair(sample);
        let twice = repair(&once);
        assert_eq!(twice, once, "repair not idempotent for {sample:?}");
    }
}

#[test]
fn repair_is_a_no_op_on_clean_text() {
    for sample in SAMPLES {
        if !has_issues(sample) {
            assert_eq!(repair(sample), sample, "clean text changed: {sample:?}");
        }
    }
}

#[test]
fn repair_never_introduces_replacement_characters() {
    for sample in SAMPLES {
        assert!(
            !repair(sample).contains('\u{FFFD}'),
            "replacement char introduced for {sample:?}"
        );
    }
}

#[test]
fn mojibake_name_is_repaired_to_intended_text() {
    assert_eq!(repair("M\u{C3}\u{BC}ller GmbH"), "Müller GmbH");
}

#[test]
fn duplicate_groups_are_transitive() {
    let config = DedupConfig::default();
    let records = vec![
        build_record("a", 1, Some("Alpha Bau AG"), Some("079 555 66 77")),
        build_record("b", 2, Some("Brunner Bau"), Some("0795556677")),
        build_record("c", 3, Some("BRUNNER  BAU"), Some("031 300 00 00")),
    ];
    let groups = find_duplicate_groups(&records, &config);
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    let mut members: Vec<RecordId> = group.duplicates.clone();
    members.push(group.canonical.clone());
    members.sort();
    assert_eq!(members, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
}

#[test]
fn unrelated_records_yield_no_groups() {
    let config = DedupConfig::default();
    let records = vec![
        build_record("a", 1, Some("Alpha AG"), Some("079 111 11 11")),
        build_record("b", 2, Some("Beta AG"), Some("079 222 22 22")),
        build_record("c", 3, Some("Gamma AG"), Some("079 333 33 33")),
    ];
    assert!(find_duplicate_groups(&records, &config).is_empty());
}

#[test]
fn canonical_selection_ignores_input_order() {
    let config = DedupConfig::default();
    let sparse = build_record("sparse", 1, Some("Muster AG"), Some("079 111 11 11"));
    let mut complete = build_record("complete", 5, Some("Muster AG"), Some("079 111 11 11"));
    complete.email = Some("hallo@muster.ch".into());

    let forward = find_duplicate_groups(&[sparse.clone(), complete.clone()], &config);
    let backward = find_duplicate_groups(&[complete, sparse], &config);
    assert_eq!(forward[0].canonical, "complete");
    assert_eq!(backward[0].canonical, "complete");
}

#[test]
fn merge_patch_only_fills_gaps() {
    let mut primary = build_record("a", 1, Some("Muster AG"), None);
    primary.city = Some("Bern".into());
    let mut duplicate =
        build_record("b", 2, Some("Muster Aktiengesellschaft"), Some("031 111 22 33"));
    duplicate.city = Some("Biel".into());

    let patch = merge_fields(&primary, &duplicate);
    for (field, _) in patch.iter() {
        assert!(
            !primary.has_value(field),
            "patch touches populated field {field}"
        );
    }
    assert_eq!(patch.get("phone"), Some("031 111 22 33"));
    assert_eq!(patch.get("city"), None);
}

#[test]
fn swiss_phone_spellings_group_with_phone_reason() {
    let config = DedupConfig::default();
    let records = vec![
        build_record("a", 1, Some("Müller GmbH"), Some("+41 79 123 45 67")),
        build_record("b", 2, Some("Mueller GmbH"), Some("0791234567")),
    ];
    let groups = find_duplicate_groups(&records, &config);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].reason, MatchReason::Phone);
}

#[test]
fn role_matching_prefers_the_most_specific_role() {
    let roles = vec![
        build_role("r1", "Elektriker"),
        build_role("r2", "Elektro Installateur"),
    ];
    let best = find_best("Elektro Installateur EFZ", &roles).expect("role match");
    assert_eq!(best.name, "Elektro Installateur");
}

#[test]
fn role_matching_returns_none_without_a_candidate() {
    let roles = vec![build_role("r1", "Elektriker"), build_role("r2", "Schreiner")];
    assert!(find_best("Maler EFZ", &roles).is_none());
}
