use crate::domain::lease::LeaseStatus;
use crate::domain::payment::{Payment, PaymentKind, PaymentStatus};
use crate::domain::ports::{LeaseStoreRef, PaymentStoreRef};
use crate::error::{OrchestratorError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A required payment annotated with its overdue flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedPayment {
    pub payment: Payment,
    pub is_overdue: bool,
}

/// The move-in obligation set for one lease, as derived from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaseObligations {
    pub lease_id: String,
    pub lease_status: LeaseStatus,
    pub payments: Vec<TrackedPayment>,
    pub all_required_complete: bool,
}

/// Read-only derivation of a lease's outstanding required payments.
#[derive(Clone)]
pub struct PaymentTracker {
    leases: LeaseStoreRef,
    payments: PaymentStoreRef,
}

impl PaymentTracker {
    pub fn new(leases: LeaseStoreRef, payments: PaymentStoreRef) -> Self {
        Self { leases, payments }
    }

    /// Returns the required payments (security deposit and move-in rent) for
    /// `lease_id`, ordered by due date, plus the derived completion flag.
    ///
    /// While the lease is `awaiting_payment`, a required kind with no record
    /// on file counts as an open obligation; in any other status an absent
    /// record means no obligation was ever generated.
    pub async fn snapshot(&self, lease_id: &str, now: DateTime<Utc>) -> Result<LeaseObligations> {
        let lease = self
            .leases
            .get(lease_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("lease {lease_id}")))?;

        let mut required: Vec<Payment> = self
            .payments
            .for_lease(lease_id)
            .await?
            .into_iter()
            .filter(|p| p.kind.is_required())
            .collect();
        required.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));

        let all_completed = required
            .iter()
            .all(|p| p.status == PaymentStatus::Completed);
        let all_required_complete = if lease.status == LeaseStatus::AwaitingPayment {
            let deposit_on_file = required
                .iter()
                .any(|p| p.kind == PaymentKind::SecurityDeposit);
            let rent_on_file = required.iter().any(|p| p.kind == PaymentKind::Rent);
            deposit_on_file && rent_on_file && all_completed
        } else {
            all_completed
        };

        let payments = required
            .into_iter()
            .map(|p| TrackedPayment {
                is_overdue: p.is_overdue(now),
                payment: p,
            })
            .collect();

        Ok(LeaseObligations {
            lease_id: lease.id,
            lease_status: lease.status,
            payments,
            all_required_complete,
        })
    }
}
