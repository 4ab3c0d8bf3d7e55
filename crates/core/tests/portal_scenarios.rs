use chrono::{DateTime, Duration, TimeZone, Utc};
use shipguard_core::{
    resolve, BlockingReason, ButtonIntent, FixedClock, LifecycleState, PortalEngine, QuoteStatus,
    ReportWindow, Severity, Snapshot, Subject,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 12, 15, 0, 0).single().expect("valid")
}

fn engine() -> PortalEngine<FixedClock> {
    PortalEngine::new(FixedClock::at(now()))
}

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339()
}

fn claim_snapshot(bill_of_lading_status: &str) -> Snapshot {
    let raw = serde_json::json!({
        "quotes": [],
        "policies": [{
            "id": "pol-7",
            "policy_number": "POL-2026-0007",
            "status": "active",
            "coverage_start": iso(now() - Duration::days(10)),
            "coverage_end": iso(now() + Duration::days(20)),
        }],
        "documents": [{
            "policy_id": "pol-7",
            "commercial_invoice_status": "approved",
            "packing_list_status": "approved",
            "bill_of_lading_status": bill_of_lading_status,
            "bill_of_lading_rejected_reason": "illegible scan",
        }],
        "payments": [{
            "policy_id": "pol-7",
            "payment_status": "paid",
            "completed_at": iso(now() - Duration::days(11)),
        }],
    });
    Snapshot::from_json_str(&raw.to_string()).expect("snapshot")
}

#[test]
fn paid_approval_survives_a_passed_expiry() {
    let raw = serde_json::json!({
        "quotes": [{
            "id": "q-a",
            "status": "approved",
            "payment_status": "paid",
            "created_at": iso(now() - Duration::days(5)),
            "quote_expires_at": iso(now() - Duration::days(1)),
        }],
    });
    let snapshot = Snapshot::from_json_str(&raw.to_string()).expect("snapshot");

    let feed = engine().activity_feed(&snapshot.quotes, &snapshot.policies);
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].status_view.label, "Approved & Paid");
    assert!(!feed[0].status_view.is_expired);
    assert_eq!(feed[0].status_view.severity, Severity::Success);
}

#[test]
fn payment_on_converted_policy_settles_its_quote() {
    let raw = serde_json::json!({
        "quotes": [{
            "id": "q-c",
            "status": "approved",
            "created_at": iso(now() - Duration::days(2)),
            "quote_expires_at": iso(now() - Duration::days(1)),
        }],
        "policies": [{
            "id": "pol-c",
            "status": "active",
            "quote_id": "q-c",
            "coverage_start": iso(now() - Duration::days(1)),
            "coverage_end": iso(now() + Duration::days(90)),
        }],
        "payments": [{
            "policy_id": "pol-c",
            "payment_status": "completed",
            "completed_at": iso(now() - Duration::days(1)),
        }],
    });
    let snapshot = Snapshot::from_json_str(&raw.to_string()).expect("snapshot");
    let engine = engine();

    let feed = engine.activity_feed(&snapshot.quotes, &snapshot.policies);
    let quote = feed.iter().find(|item| item.record_id == "q-c").expect("quote item");
    assert_eq!(quote.status_view.label, "Approved & Paid");
    assert!(!quote.status_view.is_expired);

    let report = engine.conversion_report(&snapshot.quotes);
    let tally = &report[&ReportWindow::ThisWeek];
    assert_eq!((tally.approved, tally.expired), (1, 0));
}

#[test]
fn draft_without_expiry_continues_quote() {
    let raw = serde_json::json!({
        "quotes": [{"id": "q-b", "status": "draft", "created_at": iso(now())}],
    });
    let snapshot = Snapshot::from_json_str(&raw.to_string()).expect("snapshot");

    let feed = engine().activity_feed(&snapshot.quotes, &snapshot.policies);
    assert_eq!(feed[0].status_view.label, "Continue Quote");
    assert_eq!(feed[0].button, ButtonIntent::ContinueQuote);
    assert_eq!(feed[0].button_label, "Continue Quote");
    assert_eq!(feed[0].expiring_days, None);
}

#[test]
fn active_paid_policy_with_approved_documents_can_file_claim() {
    let verdict = engine().claim_eligibility("pol-7", &claim_snapshot("approved"));

    assert!(verdict.policy_active);
    assert!(verdict.payment_completed);
    assert!(verdict.coverage_valid);
    assert!(verdict.documents_complete);
    assert!(verdict.can_file_claim);
    assert!(verdict.blocking_reasons().is_empty());
}

#[test]
fn rejected_bill_of_lading_blocks_claim() {
    let verdict = engine().claim_eligibility("POL-2026-0007", &claim_snapshot("rejected"));

    assert!(!verdict.can_file_claim);
    assert_eq!(verdict.missing_documents, vec!["Bill of Lading".to_string()]);
    assert_eq!(
        verdict.blocking_reasons(),
        vec![BlockingReason::DocumentsMissing { labels: vec!["Bill of Lading".to_string()] }]
    );
}

#[test]
fn empty_last_quarter_reports_zeroes() {
    let raw = serde_json::json!({
        "quotes": [{"id": "q-e", "status": "rejected", "created_at": iso(now())}],
    });
    let snapshot = Snapshot::from_json_str(&raw.to_string()).expect("snapshot");

    let report = engine().conversion_report(&snapshot.quotes);
    let quarter = report[&ReportWindow::LastQuarter];
    assert_eq!((quarter.approved, quarter.declined, quarter.expired), (0, 0, 0));
    assert_eq!(quarter.conversion_rate(), rust_decimal::Decimal::ZERO);
    assert_eq!(report[&ReportWindow::ThisMonth].declined, 1);
}

#[test]
fn passed_expiry_overrides_every_unpaid_status() {
    let statuses = [
        "draft",
        "submitted",
        "under_review",
        "approved",
        "rejected",
        "fix_and_resubmit",
        "pay_to_activate",
        "waiting_for_review",
        "documents_under_review",
        "expired",
        "converted",
        "waiting_for_docs",
        "something_new",
    ];
    let payments = [None, Some("pending"), Some("failed"), Some("refunded")];

    for raw in statuses {
        let status = QuoteStatus::parse(raw);
        for payment in payments {
            let payment = payment.map(shipguard_core::PaymentStatus::parse);
            let view = resolve(
                Subject::Quote(&status),
                payment.as_ref(),
                Some(now() - Duration::seconds(1)),
                now(),
            );
            assert!(view.is_expired, "{raw} with {payment:?} should read as expired");
            assert_eq!(view.state, LifecycleState::Expired { kind: shipguard_core::ObjectKind::Quote });
        }
    }
}

#[test]
fn unknown_status_falls_back_without_failing() {
    let raw = serde_json::json!({
        "quotes": [{"id": "q-x", "status": "escalated_to_underwriter", "created_at": iso(now())}],
        "policies": [{"id": "pol-x", "status": "suspended", "created_at": iso(now())}],
    });
    let snapshot = Snapshot::from_json_str(&raw.to_string()).expect("snapshot");

    let feed = engine().activity_feed(&snapshot.quotes, &snapshot.policies);
    assert_eq!(feed.len(), 2);
    for item in &feed {
        assert_eq!(item.status_view.severity, Severity::Neutral);
        assert!(item.status_view.allowed_actions.is_empty());
        assert_eq!(item.button, ButtonIntent::ViewDetails);
    }
}

#[test]
fn feed_is_idempotent_for_identical_inputs() {
    let raw = serde_json::json!({
        "quotes": [
            {"id": "q-1", "status": "submitted", "created_at": iso(now() - Duration::days(1)),
             "quote_expires_at": iso(now() + Duration::days(3)), "cargo_type": "Electronics"},
            {"id": "q-2", "status": "approved", "created_at": iso(now() - Duration::days(1))},
        ],
        "policies": [
            {"id": "pol-1", "status": "active", "quote_id": "q-2",
             "coverage_start": iso(now() - Duration::days(1)), "coverage_end": iso(now() + Duration::days(60))},
        ],
    });
    let snapshot = Snapshot::from_json_str(&raw.to_string()).expect("snapshot");
    let engine = engine();

    let first = engine.activity_feed(&snapshot.quotes, &snapshot.policies);
    let second = engine.activity_feed(&snapshot.quotes, &snapshot.policies);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("json"),
        serde_json::to_string(&second).expect("json")
    );
}

#[test]
fn window_tallies_never_exceed_totals() {
    let statuses = ["draft", "approved", "rejected", "expired", "under_review", "converted"];
    let quotes: Vec<serde_json::Value> = (0..60)
        .map(|index: i64| {
            let status = statuses[index as usize % statuses.len()];
            let payment = if index % 4 == 0 { "paid" } else { "pending" };
            serde_json::json!({
                "id": format!("q-{index}"),
                "status": status,
                "payment_status": payment,
                "created_at": iso(now() - Duration::days(index * 3)),
                "quote_expires_at": iso(now() + Duration::days(10 - index)),
            })
        })
        .collect();
    let raw = serde_json::json!({ "quotes": quotes });
    let snapshot = Snapshot::from_json_str(&raw.to_string()).expect("snapshot");

    let report = engine().conversion_report(&snapshot.quotes);
    assert_eq!(report.len(), 4);
    for tally in report.values() {
        assert!(tally.approved + tally.declined + tally.expired <= tally.total);
    }
}
