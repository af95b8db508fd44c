//! Protocol constants consumed across crates.

/// Sub-units per display unit; balances render with 8 decimal places.
pub const COIN: u64 = 100_000_000;

/// Offset of the protocol epoch (2020-01-01T00:00:00Z) from the Unix
/// epoch, in seconds. Transaction timestamps count from here.
pub const EPOCH_UNIX_SECS: u64 = 1_577_836_800;

/// Default pool residency for an unconfirmed transaction, in seconds.
pub const UNCONFIRMED_TX_TIMEOUT: u64 = 10_800;

/// Residency multiplier for transactions carrying co-signer signatures.
pub const SIGNED_TX_TIMEOUT_FACTOR: u64 = 8;
