use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Custodial,
    External,
}

/// An address capable of sending and receiving funds, owned by a user.
///
/// Whenever an owner has at least one wallet, exactly one of them carries
/// `primary = true`; the wallet service maintains that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub owner: String,
    pub address: String,
    pub kind: WalletKind,
    pub primary: bool,
}

impl Wallet {
    pub fn new(
        id: impl Into<String>,
        owner: impl Into<String>,
        address: impl Into<String>,
        kind: WalletKind,
    ) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            address: address.into(),
            kind,
            primary: false,
        }
    }
}
