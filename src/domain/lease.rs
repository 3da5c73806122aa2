use crate::domain::payment::Amount;
use crate::error::{OrchestratorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    AwaitingSignatures,
    AwaitingPayment,
    Active,
    Terminated,
}

impl LeaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingSignatures => "awaiting_signatures",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Active => "active",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signing party on the lease agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Tenant,
    Landlord,
}

impl std::str::FromStr for Party {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tenant" => Ok(Self::Tenant),
            "landlord" => Ok(Self::Landlord),
            other => Err(OrchestratorError::Validation(format!(
                "unknown signing party: {other}"
            ))),
        }
    }
}

/// The agreement record governing a tenancy.
///
/// `status` may only be written through the guarded `LeaseStore::set_status_if`
/// path; `landlord_address` is the settlement destination for every payment
/// owed under this lease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    pub id: String,
    pub tenant: String,
    pub property: String,
    pub monthly_rent: Amount,
    pub security_deposit: Amount,
    pub landlord_address: String,
    pub tenant_signed: bool,
    pub landlord_signed: bool,
    pub status: LeaseStatus,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
}

impl Lease {
    pub fn new(
        id: impl Into<String>,
        tenant: impl Into<String>,
        property: impl Into<String>,
        monthly_rent: Amount,
        security_deposit: Amount,
        landlord_address: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant: tenant.into(),
            property: property.into(),
            monthly_rent,
            security_deposit,
            landlord_address: landlord_address.into(),
            tenant_signed: false,
            landlord_signed: false,
            status: LeaseStatus::AwaitingSignatures,
            created_at,
            activated_at: None,
        }
    }

    pub fn both_signed(&self) -> bool {
        self.tenant_signed && self.landlord_signed
    }

    /// Records one party's signature. Rejected once the lease has left the
    /// signing stage, and rejected for a party that already signed.
    pub fn record_signature(&mut self, party: Party) -> Result<()> {
        if self.status != LeaseStatus::AwaitingSignatures {
            return Err(OrchestratorError::Validation(format!(
                "lease {} is not awaiting signatures",
                self.id
            )));
        }
        let signed = match party {
            Party::Tenant => &mut self.tenant_signed,
            Party::Landlord => &mut self.landlord_signed,
        };
        if *signed {
            return Err(OrchestratorError::Validation(format!(
                "lease {} already signed by that party",
                self.id
            )));
        }
        *signed = true;
        Ok(())
    }

    /// Returns the transitioned record iff the current status matches
    /// `expected`. Store adapters run this under their write lock; entering
    /// `Active` stamps `activated_at`.
    pub fn transition(
        &self,
        expected: LeaseStatus,
        next: LeaseStatus,
        now: DateTime<Utc>,
    ) -> Option<Lease> {
        if self.status != expected {
            return None;
        }
        let mut updated = self.clone();
        updated.status = next;
        if next == LeaseStatus::Active {
            updated.activated_at = Some(now);
        }
        Some(updated)
    }
}
