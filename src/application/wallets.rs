use crate::domain::ports::WalletStoreRef;
use crate::domain::wallet::Wallet;
use crate::error::{OrchestratorError, Result};

/// Wallet registration, primary-flag management and source-wallet selection.
#[derive(Clone)]
pub struct WalletService {
    store: WalletStoreRef,
}

impl WalletService {
    pub fn new(store: WalletStoreRef) -> Self {
        Self { store }
    }

    /// Registers a wallet. The owner's first wallet becomes the primary.
    pub async fn register(&self, mut wallet: Wallet) -> Result<()> {
        if self.store.get(&wallet.id).await?.is_some() {
            return Err(OrchestratorError::Validation(format!(
                "wallet {} already exists",
                wallet.id
            )));
        }
        let existing = self.store.for_owner(&wallet.owner).await?;
        wallet.primary = existing.is_empty();
        self.store.insert(wallet).await
    }

    /// Moves the primary flag to `wallet_id` within `owner`'s wallet set.
    pub async fn set_primary(&self, owner: &str, wallet_id: &str) -> Result<()> {
        self.store.set_primary(owner, wallet_id).await
    }

    /// Resolves the wallet a payment is funded from. An explicit wallet must
    /// belong to the payer; without one, only the primary wallet is used,
    /// never an implicit non-primary fallback.
    pub async fn select_source(&self, owner: &str, explicit: Option<&str>) -> Result<Wallet> {
        match explicit {
            Some(id) => {
                let wallet = self.store.get(id).await?.ok_or_else(|| {
                    OrchestratorError::InvalidWallet(format!("wallet {id} does not exist"))
                })?;
                if wallet.owner != owner {
                    return Err(OrchestratorError::InvalidWallet(format!(
                        "wallet {id} does not belong to the paying tenant"
                    )));
                }
                Ok(wallet)
            }
            None => {
                let wallets = self.store.for_owner(owner).await?;
                wallets
                    .into_iter()
                    .find(|w| w.primary)
                    .ok_or(OrchestratorError::NoWalletConfigured)
            }
        }
    }

    /// Removes a wallet. Removing the primary is rejected while the owner
    /// still has other wallets; a replacement primary must be designated
    /// first. The owner's last wallet may always be removed.
    pub async fn remove(&self, wallet_id: &str) -> Result<()> {
        let wallet = self
            .store
            .get(wallet_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("wallet {wallet_id}")))?;
        if wallet.primary {
            let siblings = self.store.for_owner(&wallet.owner).await?;
            if siblings.len() > 1 {
                return Err(OrchestratorError::Validation(format!(
                    "wallet {wallet_id} is the primary wallet; designate another primary before removing it"
                )));
            }
        }
        self.store.remove(wallet_id).await
    }
}
