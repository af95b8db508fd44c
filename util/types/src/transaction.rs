use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical transaction identifier: the content hash in its wire form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new<S: ToString>(id: S) -> Self {
        TransactionId(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        TransactionId(id.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(id: String) -> Self {
        TransactionId(id)
    }
}

/// Transaction kinds understood by the protocol. The pool only
/// special-cases `Send` and `MultisigRegistration`; everything else
/// passes through untouched.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[default]
    Send = 0,
    SecondSignature = 1,
    DelegateRegistration = 2,
    Vote = 3,
    MultisigRegistration = 4,
    Dapp = 5,
    InTransfer = 6,
    OutTransfer = 7,
}

/// The `multisignature` asset payload of a `MultisigRegistration`
/// transaction. `lifetime` is in hours.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigGroup {
    pub min: u8,
    pub lifetime: u16,
    pub keysgroup: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAsset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multisignature: Option<MultisigGroup>,
}

/// A transaction as it travels through gossip and the pool. The pool
/// treats it as opaque apart from the routing keys, the monetary
/// fields, and the multisignature asset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub sender_id: String,
    pub sender_public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    /// Transferred value in sub-units; zero for kinds that move none.
    pub amount: u64,
    pub fee: u64,
    /// Protocol-epoch seconds. Signed: time-locked transactions are
    /// stamped in the future.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Co-signer signatures; non-empty means the multisignature path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<String>,
    #[serde(default)]
    pub asset: TransactionAsset,
}

impl Transaction {
    pub fn is_send(&self) -> bool {
        self.kind == TransactionKind::Send
    }

    pub fn is_multisig_registration(&self) -> bool {
        self.kind == TransactionKind::MultisigRegistration
    }

    pub fn has_cosignatures(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// Registration lifetime in hours, when the multisignature asset is
    /// present.
    pub fn multisig_lifetime(&self) -> Option<u16> {
        self.asset.multisignature.as_ref().map(|group| group.lifetime)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TransactionBuilder {
    inner: Transaction,
}

impl TransactionBuilder {
    pub fn id<I: Into<TransactionId>>(mut self, id: I) -> Self {
        self.inner.id = id.into();
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.inner.kind = kind;
        self
    }

    pub fn sender_id<S: ToString>(mut self, address: S) -> Self {
        self.inner.sender_id = address.to_string();
        self
    }

    pub fn sender_public_key<S: ToString>(mut self, key: S) -> Self {
        self.inner.sender_public_key = key.to_string();
        self
    }

    pub fn requester_public_key<S: ToString>(mut self, key: S) -> Self {
        self.inner.requester_public_key = Some(key.to_string());
        self
    }

    pub fn recipient_id<S: ToString>(mut self, address: S) -> Self {
        self.inner.recipient_id = Some(address.to_string());
        self
    }

    pub fn amount(mut self, amount: u64) -> Self {
        self.inner.amount = amount;
        self
    }

    pub fn fee(mut self, fee: u64) -> Self {
        self.inner.fee = fee;
        self
    }

    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.inner.timestamp = timestamp;
        self
    }

    pub fn signature<S: ToString>(mut self, signature: S) -> Self {
        self.inner.signature = Some(signature.to_string());
        self
    }

    pub fn signatures<I, S>(mut self, signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.inner.signatures = signatures.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn multisig_group(mut self, group: MultisigGroup) -> Self {
        self.inner.asset.multisignature = Some(group);
        self
    }

    pub fn build(self) -> Transaction {
        self.inner
    }
}
