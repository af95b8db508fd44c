use boreal_types::constants::{EPOCH_UNIX_SECS, SIGNED_TX_TIMEOUT_FACTOR, UNCONFIRMED_TX_TIMEOUT};
use boreal_types::Transaction;

/// An entry in one of the pool partitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolEntry {
    /// Transaction
    pub transaction: Transaction,
    /// Wall-clock admission stamp in milliseconds, written by the pool
    /// on admission and again on promotion out of `unverified`.
    pub received_at: u64,
}

impl PoolEntry {
    pub fn new(transaction: Transaction, received_at: u64) -> PoolEntry {
        PoolEntry {
            transaction,
            received_at,
        }
    }

    /// Pool residency allowance for this entry, in seconds.
    ///
    /// Multisignature registrations live for their declared lifetime;
    /// co-signed transactions wait on their co-signers and get the
    /// extended timeout; everything else gets the default.
    pub fn timeout_secs(&self) -> u64 {
        if self.transaction.is_multisig_registration() {
            self.transaction
                .multisig_lifetime()
                .map(|hours| u64::from(hours) * 3_600)
                .unwrap_or(UNCONFIRMED_TX_TIMEOUT)
        } else if self.transaction.has_cosignatures() {
            UNCONFIRMED_TX_TIMEOUT * SIGNED_TX_TIMEOUT_FACTOR
        } else {
            UNCONFIRMED_TX_TIMEOUT
        }
    }

    /// Age at `now_ms` in whole seconds, both instants floored.
    pub fn age_secs(&self, now_ms: u64) -> u64 {
        (now_ms / 1_000).saturating_sub(self.received_at / 1_000)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.age_secs(now_ms) > self.timeout_secs()
    }

    /// Stamped before its own protocol timestamp: a time-locked
    /// transaction that is not yet schedulable.
    pub fn is_future_dated(&self) -> bool {
        let received_secs = (self.received_at / 1_000).saturating_sub(EPOCH_UNIX_SECS);
        (received_secs as i64) < self.transaction.timestamp
    }

    /// Routes to `pending` instead of `ready`: multisignature
    /// registration, carried co-signatures, or future-dated. Any one
    /// condition defers.
    pub fn is_deferred(&self) -> bool {
        self.transaction.is_multisig_registration()
            || self.transaction.has_cosignatures()
            || self.is_future_dated()
    }
}
