mod common;

use chrono::Utc;
use common::{harness, primary_wallet, standard_lease};
use rentflow::application::signing::MOVE_IN_DUE_DAYS;
use rentflow::domain::lease::{Lease, LeaseStatus, Party};
use rentflow::domain::payment::{Amount, PaymentKind, PaymentStatus};
use rentflow::error::OrchestratorError;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_second_signature_opens_payment_stage() {
    let h = harness();
    h.signing
        .create_lease(Lease::new(
            "l1",
            "tenant-1",
            "prop-1",
            Amount::new(dec!(1500)).unwrap(),
            Amount::new(dec!(2000)).unwrap(),
            "GLANDLORD",
            Utc::now(),
        ))
        .await
        .unwrap();

    let after_first = h.signing.sign("l1", Party::Tenant).await.unwrap();
    assert_eq!(after_first.status, LeaseStatus::AwaitingSignatures);
    assert!(h.payments.for_lease("l1").await.unwrap().is_empty());

    let after_second = h.signing.sign("l1", Party::Landlord).await.unwrap();
    assert_eq!(after_second.status, LeaseStatus::AwaitingPayment);

    let mut payments = h.payments.for_lease("l1").await.unwrap();
    payments.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(payments.len(), 2);

    let deposit = &payments[0];
    assert_eq!(deposit.id, "l1-deposit");
    assert_eq!(deposit.kind, PaymentKind::SecurityDeposit);
    assert_eq!(deposit.amount, Amount::new(dec!(2000)).unwrap());
    assert_eq!(deposit.status, PaymentStatus::Pending);

    let rent = &payments[1];
    assert_eq!(rent.id, "l1-rent");
    assert_eq!(rent.kind, PaymentKind::Rent);
    assert_eq!(rent.amount, Amount::new(dec!(1500)).unwrap());

    // Due roughly MOVE_IN_DUE_DAYS out from signing.
    let days_out = (rent.due_date - Utc::now()).num_days();
    assert!((MOVE_IN_DUE_DAYS - 1..=MOVE_IN_DUE_DAYS).contains(&days_out));
}

#[tokio::test]
async fn test_concurrent_signatures_both_recorded() {
    let h = harness();
    h.signing
        .create_lease(Lease::new(
            "l1",
            "tenant-1",
            "prop-1",
            Amount::new(dec!(1500)).unwrap(),
            Amount::new(dec!(2000)).unwrap(),
            "GLANDLORD",
            Utc::now(),
        ))
        .await
        .unwrap();

    // Both parties sign at the same time. Neither flag may be lost to the
    // other writer, and the move-in obligations are generated exactly once.
    let (tenant, landlord) = tokio::join!(
        h.signing.sign("l1", Party::Tenant),
        h.signing.sign("l1", Party::Landlord),
    );
    tenant.unwrap();
    landlord.unwrap();

    let lease = h.leases.get("l1").await.unwrap().unwrap();
    assert!(lease.tenant_signed);
    assert!(lease.landlord_signed);
    assert_eq!(lease.status, LeaseStatus::AwaitingPayment);
    assert_eq!(h.payments.for_lease("l1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_lease_rejected() {
    let h = harness();
    standard_lease(&h).await;
    let result = h
        .signing
        .create_lease(Lease::new(
            "l1",
            "tenant-9",
            "prop-9",
            Amount::new(dec!(1)).unwrap(),
            Amount::new(dec!(1)).unwrap(),
            "GX",
            Utc::now(),
        ))
        .await;
    assert!(matches!(result, Err(OrchestratorError::Validation(_))));
}

#[tokio::test]
async fn test_sign_twice_by_same_party_rejected() {
    let h = harness();
    h.signing
        .create_lease(Lease::new(
            "l1",
            "tenant-1",
            "prop-1",
            Amount::new(dec!(1500)).unwrap(),
            Amount::new(dec!(2000)).unwrap(),
            "GLANDLORD",
            Utc::now(),
        ))
        .await
        .unwrap();

    h.signing.sign("l1", Party::Tenant).await.unwrap();
    let result = h.signing.sign("l1", Party::Tenant).await;
    assert!(matches!(result, Err(OrchestratorError::Validation(_))));
}

#[tokio::test]
async fn test_terminate_only_from_active() {
    let h = harness();
    standard_lease(&h).await;

    let blocked = h.signing.terminate("l1").await;
    assert!(matches!(blocked, Err(OrchestratorError::Validation(_))));

    primary_wallet(&h, "tenant-1").await;
    h.orchestrator.initiate("l1-deposit", None).await.unwrap();
    h.orchestrator.initiate("l1-rent", None).await.unwrap();

    let terminated = h.signing.terminate("l1").await.unwrap();
    assert_eq!(terminated.status, LeaseStatus::Terminated);

    // Termination is final.
    let again = h.signing.terminate("l1").await;
    assert!(matches!(again, Err(OrchestratorError::Validation(_))));
}
