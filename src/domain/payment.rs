use crate::error::OrchestratorError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A positive monetary amount, denominated in the settlement stablecoin.
///
/// Wrapper around `rust_decimal::Decimal` so that non-positive amounts are
/// rejected at construction instead of at settlement time.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, OrchestratorError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(OrchestratorError::Validation(
                "amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = OrchestratorError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    SecurityDeposit,
    Rent,
    LateFee,
    Other,
}

impl PaymentKind {
    /// Whether this kind belongs to the mandatory move-in obligation set.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::SecurityDeposit | Self::Rent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityDeposit => "security_deposit",
            Self::Rent => "rent",
            Self::LateFee => "late_fee",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Legal forward edges of the payment state machine.
    ///
    /// `Failed -> Processing` is the retry claim: `failed -> pending ->
    /// processing` collapsed into a single guarded step so a retry never
    /// exposes an unguarded intermediate state.
    pub fn can_transition(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Failed, Pending)
                | (Failed, Processing)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single monetary obligation tied to a lease.
///
/// Status transitions are driven exclusively by the orchestrator through the
/// guarded `PaymentStore::update_if` path; a completed payment is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub lease: String,
    pub tenant: String,
    pub amount: Amount,
    pub kind: PaymentKind,
    pub status: PaymentStatus,
    pub due_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub tx_ref: Option<String>,
    pub failure_note: Option<String>,
}

impl Payment {
    pub fn new(
        id: impl Into<String>,
        lease: impl Into<String>,
        tenant: impl Into<String>,
        kind: PaymentKind,
        amount: Amount,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            lease: lease.into(),
            tenant: tenant.into(),
            amount,
            kind,
            status: PaymentStatus::Pending,
            due_date,
            completed_at: None,
            tx_ref: None,
            failure_note: None,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now && self.status != PaymentStatus::Completed
    }

    /// Returns the updated record iff the current status is in `expected`
    /// and the requested edge is legal. Store adapters run this under their
    /// write lock; a `None` is reported to callers as a lost race.
    pub fn apply_update(
        &self,
        expected: &[PaymentStatus],
        update: &PaymentUpdate,
    ) -> Option<Payment> {
        if !expected.contains(&self.status) {
            return None;
        }
        if !self.status.can_transition(update.status) {
            return None;
        }
        let mut next = self.clone();
        next.status = update.status;
        next.tx_ref = update.tx_ref.clone();
        next.completed_at = update.completed_at;
        next.failure_note = update.failure_note.clone();
        Some(next)
    }
}

/// The fields a guarded payment update is allowed to touch.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentUpdate {
    pub status: PaymentStatus,
    pub tx_ref: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failure_note: Option<String>,
}

impl PaymentUpdate {
    /// Claims the payment for an in-flight settlement attempt. Clears any
    /// note left by a previous failed attempt.
    pub fn processing() -> Self {
        Self {
            status: PaymentStatus::Processing,
            tx_ref: None,
            completed_at: None,
            failure_note: None,
        }
    }

    pub fn completed(tx_ref: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: PaymentStatus::Completed,
            tx_ref: Some(tx_ref.into()),
            completed_at: Some(at),
            failure_note: None,
        }
    }

    pub fn failed(note: impl Into<String>) -> Self {
        Self {
            status: PaymentStatus::Failed,
            tx_ref: None,
            completed_at: None,
            failure_note: Some(note.into()),
        }
    }
}
