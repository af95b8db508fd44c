use serde::{Deserialize, Serialize};

/// The projection of ledger state the pool reads for admission
/// decisions. The account store owns the full record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: String,
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_public_key: Option<String>,
    /// Confirmed balance in sub-units.
    pub balance: u64,
    /// Public keys of the account's multisignature group, empty for
    /// plain accounts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multisignatures: Vec<String>,
    #[serde(default)]
    pub multimin: u8,
    #[serde(default)]
    pub multilifetime: u16,
}

impl Account {
    pub fn has_multisig_group(&self) -> bool {
        !self.multisignatures.is_empty()
    }
}
