use crate::application::tracker::PaymentTracker;
use crate::domain::lease::LeaseStatus;
use crate::domain::payment::{Amount, PaymentKind, PaymentStatus};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentView {
    pub id: String,
    pub kind: PaymentKind,
    pub amount: Amount,
    pub status: PaymentStatus,
    pub due_date: DateTime<Utc>,
    pub is_overdue: bool,
    pub tx_ref: Option<String>,
    pub failure_note: Option<String>,
}

/// Per-lease projection consumed by presentation layers via polling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaseOverview {
    pub lease_id: String,
    pub status: LeaseStatus,
    pub all_required_complete: bool,
    pub required_payments: Vec<PaymentView>,
}

/// Assembles orchestrator state into a read-only view. No writes.
#[derive(Clone)]
pub struct DashboardReadModel {
    tracker: PaymentTracker,
}

impl DashboardReadModel {
    pub fn new(tracker: PaymentTracker) -> Self {
        Self { tracker }
    }

    pub async fn lease_overview(&self, lease_id: &str, now: DateTime<Utc>) -> Result<LeaseOverview> {
        let obligations = self.tracker.snapshot(lease_id, now).await?;
        let required_payments = obligations
            .payments
            .into_iter()
            .map(|tracked| PaymentView {
                id: tracked.payment.id,
                kind: tracked.payment.kind,
                amount: tracked.payment.amount,
                status: tracked.payment.status,
                due_date: tracked.payment.due_date,
                is_overdue: tracked.is_overdue,
                tx_ref: tracked.payment.tx_ref,
                failure_note: tracked.payment.failure_note,
            })
            .collect();
        Ok(LeaseOverview {
            lease_id: obligations.lease_id,
            status: obligations.lease_status,
            all_required_complete: obligations.all_required_complete,
            required_payments,
        })
    }
}
