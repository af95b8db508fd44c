use boreal_types::TransactionId;
use thiserror::Error;

/// Errors surfaced by the transaction pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The union of the body partitions reached the configured limit.
    #[error("transaction pool is full")]
    Full,
    /// The id failed verification earlier and stays rejected until the
    /// next blacklist reset.
    #[error("transaction {0} is already processed as invalid")]
    Blacklisted(TransactionId),
    /// The id is already present in a body partition.
    #[error("transaction {0} is already in pool")]
    Duplicated(TransactionId),
    /// The verifier pipeline rejected the transaction.
    #[error("verification failed: {0}")]
    Verification(String),
    /// Projected balance cannot cover amount plus fee. Values are in
    /// display units.
    #[error("account does not have enough currency: balance {balance}, requires {required}")]
    InsufficientBalance { balance: String, required: String },
    /// The sender has a multisignature group and named a requester the
    /// ledger does not know.
    #[error("requester not found")]
    RequesterNotFound,
    /// The account store failed.
    #[error("account error: {0}")]
    Account(String),
    /// Unknown `get_all` filter name.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}
