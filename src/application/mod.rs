//! Application layer: the orchestration services that sit between "lease is
//! signed" and "lease is active".
//!
//! All lease and payment status writes funnel through the guarded store
//! paths; services here own the decision logic, never the locks.

pub mod activation;
pub mod dashboard;
pub mod orchestrator;
pub mod signing;
pub mod tracker;
pub mod wallets;
