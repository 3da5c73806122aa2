use crate::domain::lease::{Lease, LeaseStatus, Party};
use crate::domain::payment::{Payment, PaymentKind};
use crate::domain::ports::{CasOutcome, LeaseStoreRef, PaymentStoreRef};
use crate::error::{OrchestratorError, Result};
use chrono::{Duration, Utc};

/// How long after signing the move-in obligations fall due.
pub const MOVE_IN_DUE_DAYS: i64 = 7;

/// Deterministic id for a move-in obligation record, so callers can address
/// the generated payments without a lookup.
pub fn move_in_payment_id(lease_id: &str, kind: PaymentKind) -> String {
    match kind {
        PaymentKind::SecurityDeposit => format!("{lease_id}-deposit"),
        PaymentKind::Rent => format!("{lease_id}-rent"),
        other => format!("{lease_id}-{}", other.as_str()),
    }
}

/// Lease creation, signature recording and termination.
///
/// Signing is externally driven in production; this service captures the
/// part the payment orchestration depends on: the moment the second
/// signature lands, the lease moves to `awaiting_payment` and the move-in
/// obligation records (security deposit plus first rent) are generated.
#[derive(Clone)]
pub struct LeaseSigning {
    leases: LeaseStoreRef,
    payments: PaymentStoreRef,
}

impl LeaseSigning {
    pub fn new(leases: LeaseStoreRef, payments: PaymentStoreRef) -> Self {
        Self { leases, payments }
    }

    pub async fn create_lease(&self, lease: Lease) -> Result<()> {
        if self.leases.get(&lease.id).await?.is_some() {
            return Err(OrchestratorError::Validation(format!(
                "lease {} already exists",
                lease.id
            )));
        }
        self.leases.insert(lease).await
    }

    /// Records one party's signature and, once both parties have signed,
    /// opens the payment stage. The flag write runs under the store's write
    /// lock and the status change is a CAS, so two signature calls landing
    /// together keep both flags and generate the obligation records exactly
    /// once.
    pub async fn sign(&self, lease_id: &str, party: Party) -> Result<Lease> {
        let lease = self.leases.record_signature(lease_id, party).await?;

        if !lease.both_signed() {
            return Ok(lease);
        }

        match self
            .leases
            .set_status_if(
                lease_id,
                LeaseStatus::AwaitingSignatures,
                LeaseStatus::AwaitingPayment,
            )
            .await?
        {
            CasOutcome::Swapped(lease) => {
                self.generate_move_in_payments(&lease).await?;
                tracing::info!(lease = %lease.id, "both parties signed; move-in payments generated");
                Ok(lease)
            }
            // The other signer's call opened the payment stage first.
            CasOutcome::Raced { current } => Ok(current),
        }
    }

    /// Terminates an active lease. Any other starting status is rejected.
    pub async fn terminate(&self, lease_id: &str) -> Result<Lease> {
        match self
            .leases
            .set_status_if(lease_id, LeaseStatus::Active, LeaseStatus::Terminated)
            .await?
        {
            CasOutcome::Swapped(lease) => Ok(lease),
            CasOutcome::Raced { current } => Err(OrchestratorError::Validation(format!(
                "lease {lease_id} cannot be terminated from {}",
                current.status
            ))),
        }
    }

    async fn generate_move_in_payments(&self, lease: &Lease) -> Result<()> {
        let due = Utc::now() + Duration::days(MOVE_IN_DUE_DAYS);
        let deposit = Payment::new(
            move_in_payment_id(&lease.id, PaymentKind::SecurityDeposit),
            &lease.id,
            &lease.tenant,
            PaymentKind::SecurityDeposit,
            lease.security_deposit,
            due,
        );
        let rent = Payment::new(
            move_in_payment_id(&lease.id, PaymentKind::Rent),
            &lease.id,
            &lease.tenant,
            PaymentKind::Rent,
            lease.monthly_rent,
            due,
        );
        self.payments.insert(deposit).await?;
        self.payments.insert(rent).await
    }
}
