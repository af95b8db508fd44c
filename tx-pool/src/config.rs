use serde::{Deserialize, Serialize};

/// Transaction pool configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Milliseconds between broadcast bundles. Recorded for the
    /// broadcast layer; the pool itself does not consume it.
    pub broadcast_interval: u64,
    /// Max transactions handed to the broadcast layer per bundle.
    pub release_limit: usize,
    /// Maximum size of the union of the unverified, pending and ready
    /// partitions.
    pub storage_limit: usize,
    /// Milliseconds between processing ticks.
    pub process_interval: u64,
    /// Milliseconds between expiry ticks. The invalid blacklist is
    /// cleared every ten expiry intervals.
    pub expiry_interval: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            broadcast_interval: 5_000,
            release_limit: 25,
            storage_limit: 4_000,
            process_interval: 30_000,
            expiry_interval: 30_000,
        }
    }
}
