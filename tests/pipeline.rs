use chrono::{TimeZone, Utc};

use reconcile::{
    reason_breakdown, ImportRecord, InMemorySource, MatchReason, ReconcileError, Reconciler,
    ReconcilerConfig, RecordSource, SourceCursor, SourceSnapshot,
};

fn build_record(id: &str, day: u32, name: &str, phone: Option<&str>) -> ImportRecord {
    let created_at = Utc.with_ymd_and_hms(2024, 9, day, 8, 0, 0).unwrap();
    let mut record = ImportRecord::new(id, created_at);
    record.name = Some(name.to_string());
    record.phone = phone.map(str::to_string);
    record
}

struct FailingSource;

impl RecordSource for FailingSource {
    fn id(&self) -> &str {
        "failing"
    }

    fn fetch(
        &self,
        _cursor: SourceCursor,
        _limit: usize,
    ) -> Result<SourceSnapshot, ReconcileError> {
        Err(ReconcileError::SourceUnavailable {
            source_id: "failing".to_string(),
            reason: "transport closed".to_string(),
        })
    }
}

#[test]
fn run_drains_a_source_page_by_page() {
    let mut config = ReconcilerConfig::default();
    config.batch_size = 4;
    let reconciler = Reconciler::new(config);

    // Two duplicate pairs and two singletons, all within the first page;
    // the second page holds unrelated records.
    let records = vec![
        build_record("a1", 1, "MÃ¼ller GmbH", Some("+41 79 123 45 67")),
        build_record("a2", 2, "Mueller GmbH", Some("079 123 45 67")),
        build_record("b1", 3, "Huber Treuhand", Some("044 555 66 77")),
        build_record("b2", 4, "huber treuhand", Some("044 888 99 00")),
        build_record("c1", 5, "Keller Informatik", Some("031 111 11 11")),
        build_record("c2", 6, "Steiner Gartenbau", Some("031 222 22 22")),
    ];
    let source = InMemorySource::new("import", records);

    let report = reconciler.run(&source).expect("run succeeds");
    assert_eq!(report.metrics.records_seen, 6);
    assert_eq!(report.metrics.groups, 2);
    assert_eq!(report.metrics.duplicates, 2);
    assert_eq!(report.repairs.len(), 1);

    let breakdown = reason_breakdown(&report.groups).expect("groups exist");
    assert_eq!(breakdown.total, 2);
    let reasons: Vec<MatchReason> = breakdown.shares.iter().map(|share| share.reason).collect();
    assert!(reasons.contains(&MatchReason::Phone));
    assert!(reasons.contains(&MatchReason::Name));
}

#[test]
fn run_reports_every_page_in_one_aggregate() {
    let mut config = ReconcilerConfig::default();
    config.batch_size = 2;
    let reconciler = Reconciler::new(config);

    let records = vec![
        build_record("p1", 1, "Alpha AG", Some("079 111 11 11")),
        build_record("p2", 2, "alpha ag", Some("079 999 99 99")),
        build_record("q1", 3, "Beta AG", Some("078 111 11 11")),
        build_record("q2", 4, "beta  ag", Some("078 999 99 99")),
    ];
    let source = InMemorySource::new("import", records);

    let report = reconciler.run(&source).expect("run succeeds");
    assert_eq!(report.metrics.records_seen, 4);
    // Each page carries one name-linked pair.
    assert_eq!(report.metrics.groups, 2);
    assert!(report
        .groups
        .iter()
        .all(|group| group.reason == MatchReason::Name));
}

#[test]
fn source_failure_propagates() {
    let reconciler = Reconciler::new(ReconcilerConfig::default());
    let error = reconciler.run(&FailingSource).unwrap_err();
    assert!(matches!(error, ReconcileError::SourceUnavailable { .. }));
}

#[test]
fn empty_source_produces_an_empty_report() {
    let reconciler = Reconciler::new(ReconcilerConfig::default());
    let source = InMemorySource::new("import", Vec::new());
    let report = reconciler.run(&source).expect("run succeeds");
    assert_eq!(report.metrics.records_seen, 0);
    assert!(report.groups.is_empty());
}

#[test]
fn report_serializes_for_api_consumers() {
    let reconciler = Reconciler::new(ReconcilerConfig::default());
    let records = vec![
        build_record("a", 1, "MÃ¼ller GmbH", Some("079 123 45 67")),
        build_record("b", 2, "Müller GmbH", Some("+41 79 123 45 67")),
    ];
    let report = reconciler.reconcile_batch(&records);

    let json = serde_json::to_value(&report).expect("report serializes");
    assert_eq!(json["metrics"]["records_seen"], 2);
    assert_eq!(json["groups"][0]["reason"], "both");
    assert_eq!(json["repairs"][0][0], "a");
    assert_eq!(json["repairs"][0][1]["changes"]["name"], "Müller GmbH");
}
