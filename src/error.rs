use thiserror::Error;

/// Errors surfaced at the orchestrator boundary.
///
/// Gateway and store failures are translated into this taxonomy before they
/// reach a caller; no raw transport error crosses a component boundary.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("payment {0} already has a settlement in flight")]
    AlreadyInProgress(String),
    #[error("invalid wallet: {0}")]
    InvalidWallet(String),
    #[error("settlement rejected: {0}")]
    GatewayRejected(String),
    #[error("settlement rail unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("no wallet configured for this account")]
    NoWalletConfigured,
    #[error("validation error: {0}")]
    Validation(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
