use crate::domain::lease::{Lease, LeaseStatus, Party};
use crate::domain::payment::{Payment, PaymentStatus, PaymentUpdate};
use crate::domain::ports::{CasOutcome, LeaseStore, PaymentStore, WalletStore};
use crate::domain::wallet::Wallet;
use crate::error::{OrchestratorError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory lease store.
///
/// The guarded transition runs entirely under the write lock, which is what
/// makes `set_status_if` an actual compare-and-swap.
#[derive(Default, Clone)]
pub struct InMemoryLeaseStore {
    leases: Arc<RwLock<HashMap<String, Lease>>>,
}

impl InMemoryLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaseStore for InMemoryLeaseStore {
    async fn insert(&self, lease: Lease) -> Result<()> {
        let mut leases = self.leases.write().await;
        leases.insert(lease.id.clone(), lease);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Lease>> {
        let leases = self.leases.read().await;
        Ok(leases.get(id).cloned())
    }

    async fn all(&self) -> Result<Vec<Lease>> {
        let leases = self.leases.read().await;
        Ok(leases.values().cloned().collect())
    }

    async fn record_signature(&self, id: &str, party: Party) -> Result<Lease> {
        let mut leases = self.leases.write().await;
        let lease = leases
            .get_mut(id)
            .ok_or_else(|| OrchestratorError::NotFound(format!("lease {id}")))?;
        lease.record_signature(party)?;
        Ok(lease.clone())
    }

    async fn set_status_if(
        &self,
        id: &str,
        expected: LeaseStatus,
        next: LeaseStatus,
    ) -> Result<CasOutcome<Lease>> {
        let mut leases = self.leases.write().await;
        let current = leases
            .get(id)
            .ok_or_else(|| OrchestratorError::NotFound(format!("lease {id}")))?;
        match current.transition(expected, next, Utc::now()) {
            Some(updated) => {
                leases.insert(id.to_string(), updated.clone());
                Ok(CasOutcome::Swapped(updated))
            }
            None => Ok(CasOutcome::Raced {
                current: current.clone(),
            }),
        }
    }
}

/// A thread-safe in-memory payment store.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<String, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id.clone(), payment);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(id).cloned())
    }

    async fn for_lease(&self, lease_id: &str) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| p.lease == lease_id)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.values().cloned().collect())
    }

    async fn update_if(
        &self,
        id: &str,
        expected: &[PaymentStatus],
        update: PaymentUpdate,
    ) -> Result<CasOutcome<Payment>> {
        let mut payments = self.payments.write().await;
        let current = payments
            .get(id)
            .ok_or_else(|| OrchestratorError::NotFound(format!("payment {id}")))?;
        match current.apply_update(expected, &update) {
            Some(updated) => {
                payments.insert(id.to_string(), updated.clone());
                Ok(CasOutcome::Swapped(updated))
            }
            None => Ok(CasOutcome::Raced {
                current: current.clone(),
            }),
        }
    }
}

/// A thread-safe in-memory wallet store.
#[derive(Default, Clone)]
pub struct InMemoryWalletStore {
    wallets: Arc<RwLock<HashMap<String, Wallet>>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn insert(&self, wallet: Wallet) -> Result<()> {
        let mut wallets = self.wallets.write().await;
        wallets.insert(wallet.id.clone(), wallet);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Wallet>> {
        let wallets = self.wallets.read().await;
        Ok(wallets.get(id).cloned())
    }

    async fn for_owner(&self, owner: &str) -> Result<Vec<Wallet>> {
        let wallets = self.wallets.read().await;
        Ok(wallets
            .values()
            .filter(|w| w.owner == owner)
            .cloned()
            .collect())
    }

    async fn set_primary(&self, owner: &str, wallet_id: &str) -> Result<()> {
        let mut wallets = self.wallets.write().await;
        match wallets.get(wallet_id) {
            Some(w) if w.owner == owner => {}
            _ => {
                return Err(OrchestratorError::NotFound(format!(
                    "wallet {wallet_id} for owner {owner}"
                )));
            }
        }
        for w in wallets.values_mut().filter(|w| w.owner == owner) {
            w.primary = w.id == wallet_id;
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let mut wallets = self.wallets.write().await;
        wallets
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| OrchestratorError::NotFound(format!("wallet {id}")))
    }
}
