use crate::domain::lease::Party;
use crate::domain::payment::Amount;
use crate::domain::wallet::WalletKind;
use crate::error::{OrchestratorError, Result};
use crate::infrastructure::gateway::ScriptedOutcome;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::io::Read;

/// One parsed scenario instruction.
///
/// Row grammar (positional, no header; `#` starts a comment line):
///
/// ```text
/// lease,    <id>, <tenant>, <property>, <rent>, <deposit>, <landlord-address>
/// sign,     <lease>, tenant|landlord
/// wallet,   <id>, <owner>, <address> [, custodial|external]
/// primary,  <owner>, <wallet>
/// initiate, <payment> [, <wallet>] [, ok[:txref]|rejected:<r>|unavailable:<r>|timeout]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateLease {
        id: String,
        tenant: String,
        property: String,
        rent: Amount,
        deposit: Amount,
        landlord_address: String,
    },
    Sign {
        lease: String,
        party: Party,
    },
    RegisterWallet {
        id: String,
        owner: String,
        address: String,
        kind: WalletKind,
    },
    SetPrimary {
        owner: String,
        wallet: String,
    },
    Initiate {
        payment: String,
        wallet: Option<String>,
        outcome: ScriptedOutcome,
    },
}

fn cell(record: &StringRecord, index: usize) -> Option<&str> {
    record.get(index).filter(|s| !s.is_empty())
}

fn require<'a>(record: &'a StringRecord, index: usize, what: &str) -> Result<&'a str> {
    cell(record, index)
        .ok_or_else(|| OrchestratorError::Validation(format!("missing {what} column")))
}

fn amount(record: &StringRecord, index: usize, what: &str) -> Result<Amount> {
    let raw = require(record, index, what)?;
    let value: Decimal = raw
        .parse()
        .map_err(|_| OrchestratorError::Validation(format!("invalid {what}: {raw}")))?;
    Amount::new(value)
}

impl Command {
    pub fn parse(record: &StringRecord) -> Result<Self> {
        let op = require(record, 0, "op")?;
        match op {
            "lease" => Ok(Self::CreateLease {
                id: require(record, 1, "lease id")?.to_string(),
                tenant: require(record, 2, "tenant")?.to_string(),
                property: require(record, 3, "property")?.to_string(),
                rent: amount(record, 4, "monthly rent")?,
                deposit: amount(record, 5, "security deposit")?,
                landlord_address: require(record, 6, "landlord address")?.to_string(),
            }),
            "sign" => Ok(Self::Sign {
                lease: require(record, 1, "lease id")?.to_string(),
                party: require(record, 2, "signing party")?.parse()?,
            }),
            "wallet" => Ok(Self::RegisterWallet {
                id: require(record, 1, "wallet id")?.to_string(),
                owner: require(record, 2, "owner")?.to_string(),
                address: require(record, 3, "address")?.to_string(),
                kind: match cell(record, 4) {
                    None | Some("external") => WalletKind::External,
                    Some("custodial") => WalletKind::Custodial,
                    Some(other) => {
                        return Err(OrchestratorError::Validation(format!(
                            "unknown wallet kind: {other}"
                        )));
                    }
                },
            }),
            "primary" => Ok(Self::SetPrimary {
                owner: require(record, 1, "owner")?.to_string(),
                wallet: require(record, 2, "wallet id")?.to_string(),
            }),
            "initiate" => Ok(Self::Initiate {
                payment: require(record, 1, "payment id")?.to_string(),
                wallet: cell(record, 2).map(str::to_string),
                outcome: match cell(record, 3) {
                    Some(raw) => ScriptedOutcome::parse(raw)?,
                    None => ScriptedOutcome::Settle(None),
                },
            }),
            other => Err(OrchestratorError::Validation(format!(
                "unknown op: {other}"
            ))),
        }
    }
}

/// Reads scenario commands from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// and yields commands lazily so large scenario files stream.
pub struct ScenarioReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScenarioReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .has_headers(false)
            .comment(Some(b'#'))
            .from_reader(source);
        Self { reader }
    }

    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader.into_records().map(|result| {
            let record = result.map_err(OrchestratorError::from)?;
            Command::parse(&record)
        })
    }
}
