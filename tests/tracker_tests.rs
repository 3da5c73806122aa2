mod common;

use chrono::{Duration, Utc};
use common::{harness, primary_wallet, standard_lease};
use rentflow::domain::lease::{Lease, LeaseStatus};
use rentflow::domain::payment::{Amount, Payment, PaymentKind, PaymentStatus};
use rentflow::error::OrchestratorError;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_unknown_lease_is_not_found() {
    let h = harness();
    let result = h.tracker.snapshot("missing", Utc::now()).await;
    assert!(matches!(result, Err(OrchestratorError::NotFound(_))));
}

#[tokio::test]
async fn test_snapshot_lists_required_payments_in_due_order() {
    let h = harness();
    standard_lease(&h).await;

    let obligations = h.tracker.snapshot("l1", Utc::now()).await.unwrap();
    assert_eq!(obligations.lease_status, LeaseStatus::AwaitingPayment);
    assert_eq!(obligations.payments.len(), 2);
    assert!(!obligations.all_required_complete);

    // Same due date: ordered by id, deposit before rent.
    let ids: Vec<&str> = obligations
        .payments
        .iter()
        .map(|t| t.payment.id.as_str())
        .collect();
    assert_eq!(ids, vec!["l1-deposit", "l1-rent"]);
}

#[tokio::test]
async fn test_non_required_kinds_are_excluded_and_do_not_block() {
    let h = harness();
    standard_lease(&h).await;
    primary_wallet(&h, "tenant-1").await;

    // An ad hoc late fee exists alongside the move-in set.
    h.payments
        .insert(Payment::new(
            "l1-fee",
            "l1",
            "tenant-1",
            PaymentKind::LateFee,
            Amount::new(dec!(50)).unwrap(),
            Utc::now(),
        ))
        .await
        .unwrap();

    let obligations = h.tracker.snapshot("l1", Utc::now()).await.unwrap();
    assert!(
        obligations
            .payments
            .iter()
            .all(|t| t.payment.kind.is_required())
    );

    // Completing only the required payments activates the lease; the
    // pending late fee does not hold activation back.
    h.orchestrator.initiate("l1-deposit", None).await.unwrap();
    h.orchestrator.initiate("l1-rent", None).await.unwrap();
    let lease = h.leases.get("l1").await.unwrap().unwrap();
    assert_eq!(lease.status, LeaseStatus::Active);
}

#[tokio::test]
async fn test_missing_required_record_counts_as_open_obligation() {
    // A lease in awaiting_payment with only a deposit record on file is not
    // complete even if that deposit is paid: the rent obligation exists even
    // though its record was never generated.
    let h = harness();
    let mut lease = Lease::new(
        "l2",
        "tenant-2",
        "prop-2",
        Amount::new(dec!(1000)).unwrap(),
        Amount::new(dec!(1000)).unwrap(),
        "GLANDLORD",
        Utc::now(),
    );
    lease.tenant_signed = true;
    lease.landlord_signed = true;
    lease.status = LeaseStatus::AwaitingPayment;
    h.leases.insert(lease).await.unwrap();

    let mut deposit = Payment::new(
        "l2-deposit",
        "l2",
        "tenant-2",
        PaymentKind::SecurityDeposit,
        Amount::new(dec!(1000)).unwrap(),
        Utc::now(),
    );
    deposit.status = PaymentStatus::Completed;
    h.payments.insert(deposit).await.unwrap();

    let obligations = h.tracker.snapshot("l2", Utc::now()).await.unwrap();
    assert!(!obligations.all_required_complete);
}

#[tokio::test]
async fn test_no_records_outside_payment_stage_is_vacuously_complete() {
    // An active lease with no required-payment records has no obligation.
    let h = harness();
    let mut lease = Lease::new(
        "l3",
        "tenant-3",
        "prop-3",
        Amount::new(dec!(1000)).unwrap(),
        Amount::new(dec!(1000)).unwrap(),
        "GLANDLORD",
        Utc::now(),
    );
    lease.status = LeaseStatus::Active;
    h.leases.insert(lease).await.unwrap();

    let obligations = h.tracker.snapshot("l3", Utc::now()).await.unwrap();
    assert!(obligations.all_required_complete);
    assert!(obligations.payments.is_empty());
}

#[tokio::test]
async fn test_overdue_annotation() {
    let h = harness();
    standard_lease(&h).await;
    primary_wallet(&h, "tenant-1").await;
    h.orchestrator.initiate("l1-deposit", None).await.unwrap();

    // Move-in payments fall due 7 days after signing; look 30 days ahead.
    let later = Utc::now() + Duration::days(30);
    let obligations = h.tracker.snapshot("l1", later).await.unwrap();

    for tracked in &obligations.payments {
        match tracked.payment.kind {
            // Completed payments are never overdue.
            PaymentKind::SecurityDeposit => assert!(!tracked.is_overdue),
            PaymentKind::Rent => assert!(tracked.is_overdue),
            _ => unreachable!(),
        }
    }
}

#[tokio::test]
async fn test_dashboard_overview_serializes() {
    let h = harness();
    standard_lease(&h).await;

    let overview = h.dashboard.lease_overview("l1", Utc::now()).await.unwrap();
    assert_eq!(overview.lease_id, "l1");
    assert_eq!(overview.required_payments.len(), 2);
    assert!(!overview.all_required_complete);

    let json = serde_json::to_value(&overview).unwrap();
    assert_eq!(json["status"], "awaiting_payment");
    assert_eq!(json["required_payments"][0]["kind"], "security_deposit");
    assert_eq!(json["required_payments"][0]["status"], "pending");
    assert_eq!(json["required_payments"][0]["is_overdue"], false);
}
