use serde::{Deserialize, Deserializer};

/// One collection in the wallet's portfolio.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionHolding {
    pub id: String,
    pub name: String,
    pub mint_count: u64,
}

/// A standing offer to buy any item from a collection.
///
/// `amount` is lamports. Tensor serializes it as a JSON string, so the
/// boundary accepts either a string or a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionBid {
    pub address: String,
    #[serde(deserialize_with = "lamports_from_string_or_number")]
    pub amount: u64,
    pub quantity: u64,
    pub filled_quantity: u64,
}

impl CollectionBid {
    /// A bid with no unfilled capacity can no longer be hit.
    pub fn has_capacity(&self) -> bool {
        self.quantity > self.filled_quantity
    }
}

/// One owned item inside a collection.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedMint {
    pub mint: String,
}

/// One unsigned sale transaction as returned by the transaction builder.
///
/// Exactly one of the two encodings is expected: `tx` (legacy wire format)
/// or `txV0` (versioned wire format), both base64.
#[derive(Debug, Clone, Deserialize)]
pub struct EncodedSaleTx {
    #[serde(default)]
    pub tx: Option<String>,
    #[serde(default, rename = "txV0")]
    pub tx_v0: Option<String>,
}

/// Accept a lamport amount encoded as either a JSON string or a number.
fn lamports_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.parse::<u64>().map_err(serde::de::Error::custom),
        StringOrNumber::Number(n) => Ok(n),
    }
}
