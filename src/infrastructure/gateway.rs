use crate::domain::payment::Amount;
use crate::domain::ports::{GatewayError, RolePromotion, Settlement, SettlementGateway};
use crate::error::{OrchestratorError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Scripted outcome for one settlement attempt, parsed from the scenario
/// grammar: `ok[:txref]`, `rejected:<reason>`, `unavailable:<reason>`,
/// `timeout`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedOutcome {
    Settle(Option<String>),
    Reject(String),
    Unavailable(String),
    TimeOut,
}

impl ScriptedOutcome {
    pub fn parse(cell: &str) -> Result<Self> {
        let (head, detail) = match cell.split_once(':') {
            Some((head, detail)) => (head, Some(detail)),
            None => (cell, None),
        };
        match head {
            "ok" => Ok(Self::Settle(detail.map(str::to_string))),
            "rejected" => Ok(Self::Reject(
                detail.unwrap_or("rejected by gateway").to_string(),
            )),
            "unavailable" => Ok(Self::Unavailable(
                detail.unwrap_or("gateway unreachable").to_string(),
            )),
            "timeout" => Ok(Self::TimeOut),
            other => Err(OrchestratorError::Validation(format!(
                "unknown gateway outcome: {other}"
            ))),
        }
    }
}

/// A settlement gateway driven by a queue of scripted outcomes.
///
/// Used by the CLI to replay scenario files and by tests that need to steer
/// the rail. An empty queue settles with a generated transaction reference.
#[derive(Default)]
pub struct ScriptedGateway {
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
    calls: AtomicU64,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holds each `execute` call open for `delay` before resolving, to give
    /// concurrency tests a window where the payment is in flight.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn push(&self, outcome: ScriptedOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Number of transfers that reached the rail.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettlementGateway for ScriptedGateway {
    async fn execute(
        &self,
        _source_address: &str,
        _destination_address: &str,
        _amount: Amount,
    ) -> std::result::Result<Settlement, GatewayError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let outcome = self
            .outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or(ScriptedOutcome::Settle(None));
        match outcome {
            ScriptedOutcome::Settle(Some(tx_ref)) => Ok(Settlement { tx_ref }),
            ScriptedOutcome::Settle(None) => Ok(Settlement {
                tx_ref: format!("tx-{call:04}"),
            }),
            ScriptedOutcome::Reject(reason) => Err(GatewayError::Rejected(reason)),
            ScriptedOutcome::Unavailable(reason) => Err(GatewayError::Unavailable(reason)),
            ScriptedOutcome::TimeOut => Err(GatewayError::TimedOut),
        }
    }
}

/// Promotion sink for the CLI: the account-role subsystem is out of process,
/// so the event is only logged here.
pub struct LoggingPromoter;

#[async_trait]
impl RolePromotion for LoggingPromoter {
    async fn promote(&self, tenant: &str, lease_id: &str) -> Result<()> {
        tracing::info!(tenant, lease = lease_id, "tenant role promotion emitted");
        Ok(())
    }
}

/// Records every promotion event; tests assert on the call list.
#[derive(Default)]
pub struct RecordingPromoter {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingPromoter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<(String, String)> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl RolePromotion for RecordingPromoter {
    async fn promote(&self, tenant: &str, lease_id: &str) -> Result<()> {
        self.events
            .lock()
            .await
            .push((tenant.to_string(), lease_id.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_outcome_parsing() {
        assert_eq!(ScriptedOutcome::parse("ok").unwrap(), ScriptedOutcome::Settle(None));
        assert_eq!(
            ScriptedOutcome::parse("ok:tx-99").unwrap(),
            ScriptedOutcome::Settle(Some("tx-99".to_string()))
        );
        assert_eq!(
            ScriptedOutcome::parse("rejected:insufficient funds").unwrap(),
            ScriptedOutcome::Reject("insufficient funds".to_string())
        );
        assert_eq!(
            ScriptedOutcome::parse("unavailable:rpc down").unwrap(),
            ScriptedOutcome::Unavailable("rpc down".to_string())
        );
        assert_eq!(ScriptedOutcome::parse("timeout").unwrap(), ScriptedOutcome::TimeOut);
        assert!(ScriptedOutcome::parse("maybe").is_err());
    }

    #[tokio::test]
    async fn test_scripted_gateway_queue_and_counter() {
        let gateway = ScriptedGateway::new();
        gateway
            .push(ScriptedOutcome::Reject("no funds".to_string()))
            .await;

        let amount = Amount::new(dec!(10)).unwrap();
        let first = gateway.execute("GA", "GB", amount).await;
        assert_eq!(first, Err(GatewayError::Rejected("no funds".to_string())));

        // Queue exhausted: settles with a generated reference.
        let second = gateway.execute("GA", "GB", amount).await.unwrap();
        assert_eq!(second.tx_ref, "tx-0002");
        assert_eq!(gateway.calls(), 2);
    }
}
