//! Domain layer: ledger entities, value objects and the ports they are
//! stored and settled through.

pub mod lease;
pub mod payment;
pub mod ports;
pub mod wallet;
