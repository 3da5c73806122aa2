use crate::application::activation::ActivationTrigger;
use crate::application::wallets::WalletService;
use crate::domain::payment::{Payment, PaymentStatus, PaymentUpdate};
use crate::domain::ports::{
    CasOutcome, GatewayError, LeaseStoreRef, PaymentStoreRef, SettlementGatewayRef,
};
use crate::error::{OrchestratorError, Result};
use chrono::Utc;

/// Failure note recorded when the gateway call times out with an unknown
/// result. Distinguishable from ordinary rejections so a reconciliation
/// against the settlement ledger can pick these up.
pub const UNKNOWN_OUTCOME_NOTE: &str =
    "settlement outcome unknown; verify with the settlement ledger before retrying";

/// Executes the transition of a single payment from `pending`/`failed` to
/// `completed`/`failed` via the settlement gateway, with at-most-one-in-flight
/// semantics per payment.
#[derive(Clone)]
pub struct PaymentOrchestrator {
    payments: PaymentStoreRef,
    leases: LeaseStoreRef,
    wallets: WalletService,
    gateway: SettlementGatewayRef,
    activation: ActivationTrigger,
}

impl PaymentOrchestrator {
    pub fn new(
        payments: PaymentStoreRef,
        leases: LeaseStoreRef,
        wallets: WalletService,
        gateway: SettlementGatewayRef,
        activation: ActivationTrigger,
    ) -> Self {
        Self {
            payments,
            leases,
            wallets,
            gateway,
            activation,
        }
    }

    /// Initiates settlement of `payment_id` from `source_wallet` (the
    /// payer's primary wallet when `None`).
    ///
    /// The processing claim is a compare-and-swap on the prior status, so
    /// two concurrent calls on the same payment reach the gateway at most
    /// once; the loser gets `AlreadyInProgress` without a gateway call.
    /// Whatever the gateway does, the payment is never left `processing`
    /// past the return of this call.
    pub async fn initiate(&self, payment_id: &str, source_wallet: Option<&str>) -> Result<Payment> {
        let payment = self
            .payments
            .get(payment_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("payment {payment_id}")))?;
        let lease = self
            .leases
            .get(&payment.lease)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("lease {}", payment.lease)))?;

        // Resolve both endpoints before touching the status so a wallet
        // mistake never claims the payment.
        let wallet = self
            .wallets
            .select_source(&payment.tenant, source_wallet)
            .await?;

        let claimed = match self
            .payments
            .update_if(
                payment_id,
                &[PaymentStatus::Pending, PaymentStatus::Failed],
                PaymentUpdate::processing(),
            )
            .await?
        {
            CasOutcome::Swapped(p) => p,
            CasOutcome::Raced { current } => {
                return Err(match current.status {
                    PaymentStatus::Completed => OrchestratorError::Validation(format!(
                        "payment {payment_id} is already completed"
                    )),
                    _ => OrchestratorError::AlreadyInProgress(payment_id.to_string()),
                });
            }
        };

        match self
            .gateway
            .execute(&wallet.address, &lease.landlord_address, claimed.amount)
            .await
        {
            Ok(settlement) => {
                let completed = self
                    .finish(
                        payment_id,
                        PaymentUpdate::completed(settlement.tx_ref, Utc::now()),
                    )
                    .await?;
                // The settlement is already committed at this point; an
                // activation failure must not make the caller believe the
                // payment failed. The next completed payment or poll retries
                // the activation check.
                if let Err(e) = self.activation.try_activate(&completed.lease).await {
                    tracing::warn!(
                        lease = %completed.lease,
                        error = %e,
                        "activation check failed after settlement; will be retried"
                    );
                }
                Ok(completed)
            }
            Err(GatewayError::Rejected(reason)) => {
                self.finish(payment_id, PaymentUpdate::failed(reason.clone()))
                    .await?;
                Err(OrchestratorError::GatewayRejected(reason))
            }
            Err(GatewayError::Unavailable(reason)) => {
                self.finish(payment_id, PaymentUpdate::failed(reason.clone()))
                    .await?;
                Err(OrchestratorError::GatewayUnavailable(reason))
            }
            Err(GatewayError::TimedOut) => {
                // Unknown result. Terminate in `failed` with the marker note
                // rather than leaving the claim wedged in `processing`.
                self.finish(payment_id, PaymentUpdate::failed(UNKNOWN_OUTCOME_NOTE))
                    .await?;
                Err(OrchestratorError::GatewayRejected(
                    UNKNOWN_OUTCOME_NOTE.to_string(),
                ))
            }
        }
    }

    /// Records the terminal outcome of an attempt this orchestrator claimed.
    /// Only the claim holder writes here, so a lost swap means the guarded
    /// write paths were bypassed.
    async fn finish(&self, payment_id: &str, update: PaymentUpdate) -> Result<Payment> {
        match self
            .payments
            .update_if(payment_id, &[PaymentStatus::Processing], update)
            .await?
        {
            CasOutcome::Swapped(p) => Ok(p),
            CasOutcome::Raced { current } => {
                Err(OrchestratorError::Internal(Box::new(std::io::Error::other(
                    format!(
                        "payment {payment_id} left processing while a settlement was in flight (found {})",
                        current.status
                    ),
                ))))
            }
        }
    }
}
