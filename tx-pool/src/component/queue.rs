use crate::component::entry::PoolEntry;
use boreal_types::TransactionId;
use linked_hash_map::{LinkedHashMap, Values};

/// Insertion-ordered id-keyed storage backing one pool partition.
/// O(1) insert, lookup and delete; iteration visits entries in the
/// order they were admitted.
#[derive(Clone, Debug, Default)]
pub struct TxQueue {
    inner: LinkedHashMap<TransactionId, PoolEntry>,
}

impl TxQueue {
    pub fn new() -> TxQueue {
        TxQueue::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains_key(&self, id: &TransactionId) -> bool {
        self.inner.contains_key(id)
    }

    pub fn get(&self, id: &TransactionId) -> Option<&PoolEntry> {
        self.inner.get(id)
    }

    /// Insert keyed by the transaction id; a re-inserted id moves to
    /// the back and the previous entry is returned.
    pub fn insert(&mut self, entry: PoolEntry) -> Option<PoolEntry> {
        self.inner.insert(entry.transaction.id.clone(), entry)
    }

    pub fn remove(&mut self, id: &TransactionId) -> Option<PoolEntry> {
        self.inner.remove(id)
    }

    pub fn values(&self) -> Values<'_, TransactionId, PoolEntry> {
        self.inner.values()
    }

    /// Ids in insertion order, optionally reversed, truncated to
    /// `limit` from the head of the resulting order.
    pub fn ids(&self, reverse: bool, limit: Option<usize>) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = self.inner.keys().cloned().collect();
        if reverse {
            ids.reverse();
        }
        if let Some(limit) = limit {
            ids.truncate(limit);
        }
        ids
    }

    /// Take every entry out, preserving insertion order.
    pub fn drain(&mut self) -> Vec<PoolEntry> {
        let mut entries = Vec::with_capacity(self.inner.len());
        while let Some((_, entry)) = self.inner.pop_front() {
            entries.push(entry);
        }
        entries
    }
}
