//! The pool state: three body partitions plus the invalid negative
//! cache, and every operation that touches them.

use crate::component::entry::PoolEntry;
use crate::component::queue::TxQueue;
use crate::config::PoolConfig;
use crate::error::PoolError;
use boreal_types::{Transaction, TransactionId};
use fnv::FnvHashSet;
use log::{debug, warn};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which partition a transaction currently occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Unverified,
    Pending,
    Ready,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TxStatus::Unverified => write!(f, "unverified"),
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Ready => write!(f, "ready"),
        }
    }
}

/// Partition counts reported by `usage`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUsage {
    pub unverified: usize,
    pub pending: usize,
    pub ready: usize,
}

impl PoolUsage {
    pub fn total(&self) -> usize {
        self.unverified + self.pending + self.ready
    }
}

/// Optional parameters accompanying a `get_all` filter name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub reverse: bool,
    pub limit: Option<usize>,
    /// Address argument for the `sender_id` / `recipient_id` filters.
    pub id: Option<String>,
}

/// A parsed `get_all` query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxFilter {
    List {
        status: TxStatus,
        reverse: bool,
        limit: Option<usize>,
    },
    SenderId(String),
    RecipientId(String),
}

impl TxFilter {
    /// Build a filter from its wire name. Unknown names yield
    /// [`PoolError::InvalidFilter`] as a value rather than panicking.
    pub fn parse(name: &str, params: QueryParams) -> Result<TxFilter, PoolError> {
        let status = match name {
            "unverified" => Some(TxStatus::Unverified),
            "pending" => Some(TxStatus::Pending),
            "ready" => Some(TxStatus::Ready),
            _ => None,
        };
        if let Some(status) = status {
            return Ok(TxFilter::List {
                status,
                reverse: params.reverse,
                limit: params.limit,
            });
        }
        match name {
            "sender_id" => params
                .id
                .map(TxFilter::SenderId)
                .ok_or_else(|| PoolError::InvalidFilter(name.to_string())),
            "recipient_id" => params
                .id
                .map(TxFilter::RecipientId)
                .ok_or_else(|| PoolError::InvalidFilter(name.to_string())),
            other => Err(PoolError::InvalidFilter(other.to_string())),
        }
    }
}

/// Transactions matching an address query, tagged by partition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartitionedTransactions {
    pub unverified: Vec<Transaction>,
    pub pending: Vec<Transaction>,
    pub ready: Vec<Transaction>,
}

/// Result of a `get_all` query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxReport {
    Ids(Vec<TransactionId>),
    ByAddress(PartitionedTransactions),
}

/// The pool itself.
///
/// A transaction id lives in at most one of `unverified`, `pending`
/// and `ready` between operations; `invalid` holds ids only and is
/// disjoint from all three.
#[derive(Clone, Debug)]
pub struct Pool {
    config: PoolConfig,
    unverified: TxQueue,
    pending: TxQueue,
    ready: TxQueue,
    invalid: FnvHashSet<TransactionId>,
}

impl Pool {
    pub fn new(config: PoolConfig) -> Pool {
        Pool {
            config,
            unverified: TxQueue::new(),
            pending: TxQueue::new(),
            ready: TxQueue::new(),
            invalid: FnvHashSet::default(),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of transactions across the body partitions.
    pub fn total_size(&self) -> usize {
        self.unverified.len() + self.pending.len() + self.ready.len()
    }

    pub fn usage(&self) -> PoolUsage {
        PoolUsage {
            unverified: self.unverified.len(),
            pending: self.pending.len(),
            ready: self.ready.len(),
        }
    }

    pub fn invalid_size(&self) -> usize {
        self.invalid.len()
    }

    /// Whether the id occupies any body partition.
    pub fn contains(&self, id: &TransactionId) -> bool {
        self.unverified.contains_key(id)
            || self.pending.contains_key(id)
            || self.ready.contains_key(id)
    }

    pub fn is_invalid(&self, id: &TransactionId) -> bool {
        self.invalid.contains(id)
    }

    /// Admit one raw transaction into `unverified`.
    pub fn add(&mut self, tx: Transaction, received_at: u64) -> Result<(), PoolError> {
        if self.total_size() >= self.config.storage_limit {
            return Err(PoolError::Full);
        }
        if self.invalid.contains(&tx.id) {
            return Err(PoolError::Blacklisted(tx.id));
        }
        if self.contains(&tx.id) {
            return Err(PoolError::Duplicated(tx.id));
        }
        self.unverified.insert(PoolEntry::new(tx, received_at));
        Ok(())
    }

    /// Force a transaction into `ready`. The ledger layer calls this
    /// when applying or rolling back blocks and its view wins: no
    /// capacity or duplicate checks, and any copy already staged in a
    /// body partition is displaced first.
    pub fn add_ready(&mut self, tx: Transaction, received_at: u64) {
        let id = tx.id.clone();
        self.unverified.remove(&id);
        self.pending.remove(&id);
        self.ready.remove(&id);
        self.ready.insert(PoolEntry::new(tx, received_at));
    }

    /// Delete the id from every partition it occurs in; returns the
    /// partitions it was actually deleted from.
    pub fn remove(&mut self, id: &TransactionId) -> Vec<TxStatus> {
        let mut removed = Vec::new();
        if self.unverified.remove(id).is_some() {
            removed.push(TxStatus::Unverified);
        }
        if self.pending.remove(id).is_some() {
            removed.push(TxStatus::Pending);
        }
        if self.ready.remove(id).is_some() {
            removed.push(TxStatus::Ready);
        }
        if removed.len() > 1 {
            warn!(
                target: "tx-pool",
                "transaction {} occupied multiple partitions: {:?}", id, removed
            );
        }
        removed
    }

    pub fn get(&self, id: &TransactionId) -> Option<(&PoolEntry, TxStatus)> {
        if let Some(entry) = self.unverified.get(id) {
            return Some((entry, TxStatus::Unverified));
        }
        if let Some(entry) = self.pending.get(id) {
            return Some((entry, TxStatus::Pending));
        }
        self.ready.get(id).map(|entry| (entry, TxStatus::Ready))
    }

    pub fn get_all(&self, filter: &TxFilter) -> TxReport {
        match filter {
            TxFilter::List {
                status,
                reverse,
                limit,
            } => TxReport::Ids(self.queue(*status).ids(*reverse, *limit)),
            TxFilter::SenderId(address) => {
                TxReport::ByAddress(self.partitioned(|tx| tx.sender_id == *address))
            }
            TxFilter::RecipientId(address) => TxReport::ByAddress(
                self.partitioned(|tx| tx.recipient_id.as_deref() == Some(address.as_str())),
            ),
        }
    }

    /// The block producer's draw: a snapshot of `ready` ordered by fee
    /// descending, then admission stamp ascending, truncated to
    /// `limit`. The ordering is a hard contract.
    pub fn get_ready(&self, limit: usize) -> Vec<Transaction> {
        let mut entries: Vec<&PoolEntry> = self.ready.values().collect();
        entries.sort_by(|a, b| {
            b.transaction
                .fee
                .cmp(&a.transaction.fee)
                .then(a.received_at.cmp(&b.received_at))
        });
        entries
            .into_iter()
            .take(limit)
            .map(|entry| entry.transaction.clone())
            .collect()
    }

    /// Net effect of the pool's own entries on `address`, in
    /// sub-units. Spends subtract amount plus fee from every partition;
    /// only `Send` transactions credit their recipient.
    pub fn pool_balance(&self, address: &str) -> BigInt {
        let mut balance = BigInt::from(0u8);
        for entry in self.entries() {
            let tx = &entry.transaction;
            if tx.sender_id == address {
                balance -= BigInt::from(tx.amount) + BigInt::from(tx.fee);
            }
            if tx.is_send() && tx.recipient_id.as_deref() == Some(address) {
                balance += BigInt::from(tx.amount);
            }
        }
        balance
    }

    /// Evict aged entries, scanning unverified, pending and ready in
    /// that order. Returns expired ids in scan order.
    pub fn expire(&mut self, now_ms: u64) -> Vec<TransactionId> {
        let mut expired = Vec::new();
        for queue in [&mut self.unverified, &mut self.pending, &mut self.ready] {
            let aged: Vec<TransactionId> = queue
                .values()
                .filter(|entry| entry.is_expired(now_ms))
                .map(|entry| entry.transaction.id.clone())
                .collect();
            for id in aged {
                queue.remove(&id);
                debug!(target: "tx-pool", "expired transaction {}", id);
                expired.push(id);
            }
        }
        expired
    }

    /// Blacklist an id. The caller must have deleted its body first.
    pub fn mark_invalid(&mut self, id: TransactionId) {
        self.invalid.insert(id);
    }

    /// Clear the blacklist; returns the number of ids dropped.
    pub fn reset_invalid(&mut self) -> usize {
        let cleared = self.invalid.len();
        self.invalid.clear();
        cleared
    }

    pub(crate) fn drain_unverified(&mut self) -> Vec<PoolEntry> {
        self.unverified.drain()
    }

    pub(crate) fn drain_pending(&mut self) -> Vec<PoolEntry> {
        self.pending.drain()
    }

    pub(crate) fn insert_pending(&mut self, entry: PoolEntry) {
        self.pending.insert(entry);
    }

    pub(crate) fn insert_ready(&mut self, entry: PoolEntry) {
        self.ready.insert(entry);
    }

    fn queue(&self, status: TxStatus) -> &TxQueue {
        match status {
            TxStatus::Unverified => &self.unverified,
            TxStatus::Pending => &self.pending,
            TxStatus::Ready => &self.ready,
        }
    }

    fn entries(&self) -> impl Iterator<Item = &PoolEntry> {
        self.unverified
            .values()
            .chain(self.pending.values())
            .chain(self.ready.values())
    }

    fn partitioned<F>(&self, matches: F) -> PartitionedTransactions
    where
        F: Fn(&Transaction) -> bool,
    {
        PartitionedTransactions {
            unverified: Self::filter_queue(&self.unverified, &matches),
            pending: Self::filter_queue(&self.pending, &matches),
            ready: Self::filter_queue(&self.ready, &matches),
        }
    }

    fn filter_queue<F>(queue: &TxQueue, matches: &F) -> Vec<Transaction>
    where
        F: Fn(&Transaction) -> bool,
    {
        queue
            .values()
            .filter(|entry| matches(&entry.transaction))
            .map(|entry| entry.transaction.clone())
            .collect()
    }
}
