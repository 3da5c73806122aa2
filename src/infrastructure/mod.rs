//! Infrastructure adapters: ledger store backends and settlement-rail
//! collaborators.

pub mod gateway;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
