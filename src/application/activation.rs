use crate::application::tracker::PaymentTracker;
use crate::domain::lease::LeaseStatus;
use crate::domain::ports::{CasOutcome, LeaseStoreRef, RolePromotionRef};
use crate::error::{OrchestratorError, Result};
use chrono::Utc;

/// Evaluates whether a lease's required obligations are fully satisfied and,
/// if so, performs the activation transition exactly once.
#[derive(Clone)]
pub struct ActivationTrigger {
    leases: LeaseStoreRef,
    tracker: PaymentTracker,
    promoter: RolePromotionRef,
}

impl ActivationTrigger {
    pub fn new(leases: LeaseStoreRef, tracker: PaymentTracker, promoter: RolePromotionRef) -> Self {
        Self {
            leases,
            tracker,
            promoter,
        }
    }

    /// Returns `true` iff this call performed the activation.
    ///
    /// The status CAS serializes concurrent payment completions: of two
    /// callers that both observe a fully paid lease, exactly one swap
    /// succeeds and emits the role-promotion event. A promotion failure is
    /// logged and left to the account-role subsystem's own retry; the lease
    /// stays active.
    pub async fn try_activate(&self, lease_id: &str) -> Result<bool> {
        let lease = self
            .leases
            .get(lease_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("lease {lease_id}")))?;

        if lease.status != LeaseStatus::AwaitingPayment || !lease.both_signed() {
            return Ok(false);
        }

        let obligations = self.tracker.snapshot(lease_id, Utc::now()).await?;
        if !obligations.all_required_complete {
            return Ok(false);
        }

        match self
            .leases
            .set_status_if(lease_id, LeaseStatus::AwaitingPayment, LeaseStatus::Active)
            .await?
        {
            CasOutcome::Swapped(active) => {
                tracing::info!(lease = %active.id, tenant = %active.tenant, "lease activated");
                if let Err(e) = self.promoter.promote(&active.tenant, &active.id).await {
                    tracing::warn!(
                        lease = %active.id,
                        tenant = %active.tenant,
                        error = %e,
                        "role promotion failed after activation"
                    );
                }
                Ok(true)
            }
            CasOutcome::Raced { .. } => Ok(false),
        }
    }
}
