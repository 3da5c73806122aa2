use crate::domain::lease::{Lease, LeaseStatus, Party};
use crate::domain::payment::{Payment, PaymentStatus, PaymentUpdate};
use crate::domain::ports::{CasOutcome, LeaseStore, PaymentStore, WalletStore};
use crate::domain::wallet::Wallet;
use crate::error::{OrchestratorError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column family for lease records.
pub const CF_LEASES: &str = "leases";
/// Column family for payment records.
pub const CF_PAYMENTS: &str = "payments";
/// Column family for wallet records.
pub const CF_WALLETS: &str = "wallets";

fn internal<E: std::error::Error + Send + Sync + 'static>(e: E) -> OrchestratorError {
    OrchestratorError::Internal(Box::new(e))
}

/// A persistent ledger store backed by RocksDB.
///
/// One column family per record type, JSON-encoded values keyed by id.
/// RocksDB has no native compare-and-swap, so the guarded updates hold
/// `write_guard` across the read-check-write; the store assumes a single
/// process owns the database directory.
#[derive(Clone)]
pub struct RocksDbLedger {
    db: Arc<DB>,
    write_guard: Arc<Mutex<()>>,
}

impl RocksDbLedger {
    /// Opens or creates a RocksDB instance at `path`, ensuring the three
    /// column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_LEASES, Options::default()),
            ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_WALLETS, Options::default()),
        ];
        let db = DB::open_cf_descriptors(&opts, path, cfs).map_err(internal)?;

        Ok(Self {
            db: Arc::new(db),
            write_guard: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            internal(std::io::Error::other(format!(
                "column family {name} not found"
            )))
        })
    }

    fn put<T: Serialize>(&self, cf_name: &str, key: &str, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key.as_bytes(), bytes).map_err(internal)
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key.as_bytes()).map_err(internal)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item.map_err(internal)?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl LeaseStore for RocksDbLedger {
    async fn insert(&self, lease: Lease) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        self.put(CF_LEASES, &lease.id, &lease)
    }

    async fn get(&self, id: &str) -> Result<Option<Lease>> {
        self.read(CF_LEASES, id)
    }

    async fn all(&self) -> Result<Vec<Lease>> {
        self.scan(CF_LEASES)
    }

    async fn record_signature(&self, id: &str, party: Party) -> Result<Lease> {
        let _guard = self.write_guard.lock().await;
        let mut lease: Lease = self
            .read(CF_LEASES, id)?
            .ok_or_else(|| OrchestratorError::NotFound(format!("lease {id}")))?;
        lease.record_signature(party)?;
        self.put(CF_LEASES, id, &lease)?;
        Ok(lease)
    }

    async fn set_status_if(
        &self,
        id: &str,
        expected: LeaseStatus,
        next: LeaseStatus,
    ) -> Result<CasOutcome<Lease>> {
        let _guard = self.write_guard.lock().await;
        let current: Lease = self
            .read(CF_LEASES, id)?
            .ok_or_else(|| OrchestratorError::NotFound(format!("lease {id}")))?;
        match current.transition(expected, next, Utc::now()) {
            Some(updated) => {
                self.put(CF_LEASES, id, &updated)?;
                Ok(CasOutcome::Swapped(updated))
            }
            None => Ok(CasOutcome::Raced { current }),
        }
    }
}

#[async_trait]
impl PaymentStore for RocksDbLedger {
    async fn insert(&self, payment: Payment) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        self.put(CF_PAYMENTS, &payment.id, &payment)
    }

    async fn get(&self, id: &str) -> Result<Option<Payment>> {
        self.read(CF_PAYMENTS, id)
    }

    async fn for_lease(&self, lease_id: &str) -> Result<Vec<Payment>> {
        Ok(self
            .scan::<Payment>(CF_PAYMENTS)?
            .into_iter()
            .filter(|p| p.lease == lease_id)
            .collect())
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        self.scan(CF_PAYMENTS)
    }

    async fn update_if(
        &self,
        id: &str,
        expected: &[PaymentStatus],
        update: PaymentUpdate,
    ) -> Result<CasOutcome<Payment>> {
        let _guard = self.write_guard.lock().await;
        let current: Payment = self
            .read(CF_PAYMENTS, id)?
            .ok_or_else(|| OrchestratorError::NotFound(format!("payment {id}")))?;
        match current.apply_update(expected, &update) {
            Some(updated) => {
                self.put(CF_PAYMENTS, id, &updated)?;
                Ok(CasOutcome::Swapped(updated))
            }
            None => Ok(CasOutcome::Raced { current }),
        }
    }
}

#[async_trait]
impl WalletStore for RocksDbLedger {
    async fn insert(&self, wallet: Wallet) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        self.put(CF_WALLETS, &wallet.id, &wallet)
    }

    async fn get(&self, id: &str) -> Result<Option<Wallet>> {
        self.read(CF_WALLETS, id)
    }

    async fn for_owner(&self, owner: &str) -> Result<Vec<Wallet>> {
        Ok(self
            .scan::<Wallet>(CF_WALLETS)?
            .into_iter()
            .filter(|w| w.owner == owner)
            .collect())
    }

    async fn set_primary(&self, owner: &str, wallet_id: &str) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        let target: Option<Wallet> = self.read(CF_WALLETS, wallet_id)?;
        match target {
            Some(w) if w.owner == owner => {}
            _ => {
                return Err(OrchestratorError::NotFound(format!(
                    "wallet {wallet_id} for owner {owner}"
                )));
            }
        }
        for mut wallet in self
            .scan::<Wallet>(CF_WALLETS)?
            .into_iter()
            .filter(|w| w.owner == owner)
        {
            wallet.primary = wallet.id == wallet_id;
            self.put(CF_WALLETS, &wallet.id, &wallet)?;
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        if self.read::<Wallet>(CF_WALLETS, id)?.is_none() {
            return Err(OrchestratorError::NotFound(format!("wallet {id}")));
        }
        let cf = self.cf(CF_WALLETS)?;
        self.db.delete_cf(cf, id.as_bytes()).map_err(internal)
    }
}
