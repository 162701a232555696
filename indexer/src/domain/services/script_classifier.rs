//! Output classification for the ingestion pipeline.
//!
//! An output is either skipped entirely (unspendable), or resolved to a
//! [`Destination`]. Two policies then decide where a destination shows up:
//! [`UtxoInclusionPolicy`] admits every destination, so richlist aggregation
//! sees non-standard and zerocoin value too, while [`RecordInclusionPolicy`]
//! hides `NON_STANDARD` outputs from the transaction record.

use rust_decimal::Decimal;

use crate::domain::models::RawOutput;

/// Address placeholder for outputs without a resolvable address
pub const NON_STANDARD: &str = "NON_STANDARD";
/// Address placeholder for zerocoin mints
pub const ZEROCOIN: &str = "ZEROCOIN";

/// `scriptPubKey.type` as reported by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Any type with a spendable address (`pubkeyhash`, `scripthash`, ...)
    Standard,
    NonStandard,
    NullData,
    ZerocoinMint,
}

impl ScriptKind {
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "nonstandard" => ScriptKind::NonStandard,
            "nulldata" => ScriptKind::NullData,
            "zerocoinmint" => ScriptKind::ZerocoinMint,
            _ => ScriptKind::Standard,
        }
    }
}

/// Where an output's value is attributed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Address(String),
    NonStandard,
    Zerocoin,
}

impl Destination {
    pub fn as_str(&self) -> &str {
        match self {
            Destination::Address(address) => address,
            Destination::NonStandard => NON_STANDARD,
            Destination::Zerocoin => ZEROCOIN,
        }
    }

    pub fn into_address(self) -> String {
        match self {
            Destination::Address(address) => address,
            other => other.as_str().to_string(),
        }
    }
}

/// Resolve an output, or `None` when it must be skipped everywhere
/// (`value <= 0` or `nulldata`).
pub fn classify_output(output: &RawOutput) -> Option<Destination> {
    let kind = ScriptKind::from_type(&output.script_pub_key.kind);
    if output.value <= Decimal::ZERO || kind == ScriptKind::NullData {
        return None;
    }

    let destination = match kind {
        ScriptKind::ZerocoinMint => Destination::Zerocoin,
        // Only the first address is kept for multi-address scripts
        ScriptKind::Standard => match output.script_pub_key.first_address() {
            Some(address) => Destination::Address(address.to_string()),
            None => Destination::NonStandard,
        },
        ScriptKind::NonStandard | ScriptKind::NullData => Destination::NonStandard,
    };

    Some(destination)
}

/// Which destinations get a row in the UTXO store
#[derive(Debug, Clone, Copy, Default)]
pub struct UtxoInclusionPolicy;

impl UtxoInclusionPolicy {
    pub fn admits(&self, _destination: &Destination) -> bool {
        true
    }
}

/// Which destinations appear on the transaction record
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordInclusionPolicy;

impl RecordInclusionPolicy {
    pub fn admits(&self, destination: &Destination) -> bool {
        *destination != Destination::NonStandard
    }
}
