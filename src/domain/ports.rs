use crate::domain::lease::{Lease, LeaseStatus, Party};
use crate::domain::payment::{Amount, Payment, PaymentStatus, PaymentUpdate};
use crate::domain::wallet::Wallet;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Outcome of a guarded (compare-and-swap) update.
#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome<T> {
    /// The guard matched and the record was updated.
    Swapped(T),
    /// Another writer got there first; `current` is the record as found.
    Raced { current: T },
}

#[async_trait]
pub trait LeaseStore: Send + Sync {
    async fn insert(&self, lease: Lease) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Lease>>;
    async fn all(&self) -> Result<Vec<Lease>>;
    /// Runs `Lease::record_signature` under the store's write lock and
    /// returns the updated record. Keeping the read-modify-write inside the
    /// lock means two parties signing at the same time cannot overwrite each
    /// other's flag.
    async fn record_signature(&self, id: &str, party: Party) -> Result<Lease>;
    /// Guarded status transition, the only write path for `Lease::status`.
    async fn set_status_if(
        &self,
        id: &str,
        expected: LeaseStatus,
        next: LeaseStatus,
    ) -> Result<CasOutcome<Lease>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Payment>>;
    async fn for_lease(&self, lease_id: &str) -> Result<Vec<Payment>>;
    async fn all(&self) -> Result<Vec<Payment>>;
    /// Guarded field update, the only write path for `Payment::status`.
    async fn update_if(
        &self,
        id: &str,
        expected: &[PaymentStatus],
        update: PaymentUpdate,
    ) -> Result<CasOutcome<Payment>>;
}

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn insert(&self, wallet: Wallet) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Wallet>>;
    async fn for_owner(&self, owner: &str) -> Result<Vec<Wallet>>;
    /// Atomically moves the primary flag to `wallet_id` within one owner's
    /// wallet set.
    async fn set_primary(&self, owner: &str, wallet_id: &str) -> Result<()>;
    async fn remove(&self, id: &str) -> Result<()>;
}

pub type LeaseStoreRef = Arc<dyn LeaseStore>;
pub type PaymentStoreRef = Arc<dyn PaymentStore>;
pub type WalletStoreRef = Arc<dyn WalletStore>;

/// A successful funds transfer on the settlement rail.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub tx_ref: String,
}

/// Failure modes of the settlement rail, as seen at the orchestrator
/// boundary. `TimedOut` means the outcome is unknown on our side.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("timed out waiting for settlement outcome")]
    TimedOut,
}

/// External service that moves funds between wallet addresses. Calls are not
/// assumed idempotent; retries are always a new explicit initiation.
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    async fn execute(
        &self,
        source_address: &str,
        destination_address: &str,
        amount: Amount,
    ) -> std::result::Result<Settlement, GatewayError>;
}

/// Sink for the activation event that upgrades a prospective tenant to
/// tenant. Consumed by the account-role subsystem.
#[async_trait]
pub trait RolePromotion: Send + Sync {
    async fn promote(&self, tenant: &str, lease_id: &str) -> Result<()>;
}

pub type SettlementGatewayRef = Arc<dyn SettlementGateway>;
pub type RolePromotionRef = Arc<dyn RolePromotion>;
