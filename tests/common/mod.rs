#![allow(dead_code)]

use chrono::Utc;
use rentflow::application::activation::ActivationTrigger;
use rentflow::application::dashboard::DashboardReadModel;
use rentflow::application::orchestrator::PaymentOrchestrator;
use rentflow::application::signing::LeaseSigning;
use rentflow::application::tracker::PaymentTracker;
use rentflow::application::wallets::WalletService;
use rentflow::domain::lease::{Lease, Party};
use rentflow::domain::payment::Amount;
use rentflow::domain::ports::{LeaseStoreRef, PaymentStoreRef, WalletStoreRef};
use rentflow::domain::wallet::{Wallet, WalletKind};
use rentflow::infrastructure::gateway::{RecordingPromoter, ScriptedGateway};
use rentflow::infrastructure::in_memory::{
    InMemoryLeaseStore, InMemoryPaymentStore, InMemoryWalletStore,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// A fully wired in-memory orchestration stack.
pub struct Harness {
    pub leases: LeaseStoreRef,
    pub payments: PaymentStoreRef,
    pub wallets: WalletStoreRef,
    pub gateway: Arc<ScriptedGateway>,
    pub promoter: Arc<RecordingPromoter>,
    pub tracker: PaymentTracker,
    pub activation: ActivationTrigger,
    pub orchestrator: PaymentOrchestrator,
    pub signing: LeaseSigning,
    pub wallet_service: WalletService,
    pub dashboard: DashboardReadModel,
}

pub fn harness() -> Harness {
    harness_with_gateway(Arc::new(ScriptedGateway::new()))
}

pub fn harness_with_gateway(gateway: Arc<ScriptedGateway>) -> Harness {
    let leases: LeaseStoreRef = Arc::new(InMemoryLeaseStore::new());
    let payments: PaymentStoreRef = Arc::new(InMemoryPaymentStore::new());
    let wallets: WalletStoreRef = Arc::new(InMemoryWalletStore::new());
    let promoter = Arc::new(RecordingPromoter::new());

    let tracker = PaymentTracker::new(leases.clone(), payments.clone());
    let activation = ActivationTrigger::new(leases.clone(), tracker.clone(), promoter.clone());
    let wallet_service = WalletService::new(wallets.clone());
    let orchestrator = PaymentOrchestrator::new(
        payments.clone(),
        leases.clone(),
        wallet_service.clone(),
        gateway.clone(),
        activation.clone(),
    );
    let signing = LeaseSigning::new(leases.clone(), payments.clone());
    let dashboard = DashboardReadModel::new(tracker.clone());

    Harness {
        leases,
        payments,
        wallets,
        gateway,
        promoter,
        tracker,
        activation,
        orchestrator,
        signing,
        wallet_service,
        dashboard,
    }
}

/// Creates a lease, signs for both parties and returns it in
/// `awaiting_payment` with the move-in payments generated
/// (`<id>-deposit`, `<id>-rent`).
pub async fn signed_lease(
    h: &Harness,
    id: &str,
    tenant: &str,
    rent: Decimal,
    deposit: Decimal,
) -> Lease {
    h.signing
        .create_lease(Lease::new(
            id,
            tenant,
            "prop-1",
            Amount::new(rent).unwrap(),
            Amount::new(deposit).unwrap(),
            "GLANDLORD",
            Utc::now(),
        ))
        .await
        .unwrap();
    h.signing.sign(id, Party::Tenant).await.unwrap();
    h.signing.sign(id, Party::Landlord).await.unwrap()
}

/// The standard test lease: $1500 rent, $2000 deposit, tenant-1.
pub async fn standard_lease(h: &Harness) -> Lease {
    signed_lease(h, "l1", "tenant-1", dec!(1500), dec!(2000)).await
}

/// Registers a primary wallet `w1` for the given owner.
pub async fn primary_wallet(h: &Harness, owner: &str) -> Wallet {
    let wallet = Wallet::new("w1", owner, "GTENANT", WalletKind::External);
    h.wallet_service.register(wallet.clone()).await.unwrap();
    wallet
}
