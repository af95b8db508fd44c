//! The pool actor. One thread owns the partitions and both
//! collaborators; everything else talks to it through the controller.
//! Periodic work rides the same `select!` loop on tick channels, so a
//! tick that fires while the loop body is busy is coalesced instead of
//! overlapping.

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::pool::{Pool, PoolUsage, TxFilter, TxReport, TxStatus};
use crate::traits::{AccountProvider, TransactionLogic};
use boreal_notify::NotifyController;
use boreal_types::service::{Request, DEFAULT_CHANNEL_SIZE};
use boreal_types::{Transaction, TransactionId};
use crossbeam_channel::{self as channel, select, Receiver, Sender};
use faketime::unix_time_as_millis;
use log::{debug, info, warn};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Expiry ticks between invalid-blacklist resets.
const INVALID_RESET_FACTOR: u64 = 10;

type AddTransactionsRequest = Request<Vec<Transaction>, Result<(), PoolError>>;
type AddReadyRequest = Request<Vec<Transaction>, ()>;
type RemoveRequest = Request<TransactionId, Vec<TxStatus>>;
type GetRequest = Request<TransactionId, Option<(Transaction, TxStatus)>>;
type GetAllRequest = Request<TxFilter, TxReport>;
type GetReadyRequest = Request<usize, Vec<Transaction>>;
type UsageRequest = Request<(), PoolUsage>;
type ProcessRequest = Request<(), ()>;
type ExpireRequest = Request<(), Vec<TransactionId>>;
type ResetInvalidRequest = Request<(), usize>;

#[derive(Clone)]
pub struct TxPoolController {
    add_transactions_sender: Sender<AddTransactionsRequest>,
    add_ready_sender: Sender<AddReadyRequest>,
    remove_sender: Sender<RemoveRequest>,
    get_sender: Sender<GetRequest>,
    get_all_sender: Sender<GetAllRequest>,
    get_ready_sender: Sender<GetReadyRequest>,
    usage_sender: Sender<UsageRequest>,
    process_sender: Sender<ProcessRequest>,
    expire_sender: Sender<ExpireRequest>,
    reset_invalid_sender: Sender<ResetInvalidRequest>,
    signal: Sender<()>,
}

pub struct TxPoolReceivers {
    add_transactions_receiver: Receiver<AddTransactionsRequest>,
    add_ready_receiver: Receiver<AddReadyRequest>,
    remove_receiver: Receiver<RemoveRequest>,
    get_receiver: Receiver<GetRequest>,
    get_all_receiver: Receiver<GetAllRequest>,
    get_ready_receiver: Receiver<GetReadyRequest>,
    usage_receiver: Receiver<UsageRequest>,
    process_receiver: Receiver<ProcessRequest>,
    expire_receiver: Receiver<ExpireRequest>,
    reset_invalid_receiver: Receiver<ResetInvalidRequest>,
    signal_receiver: Receiver<()>,
}

impl TxPoolController {
    pub fn build() -> (TxPoolController, TxPoolReceivers) {
        let (add_transactions_sender, add_transactions_receiver) =
            channel::bounded(DEFAULT_CHANNEL_SIZE);
        let (add_ready_sender, add_ready_receiver) = channel::bounded(DEFAULT_CHANNEL_SIZE);
        let (remove_sender, remove_receiver) = channel::bounded(DEFAULT_CHANNEL_SIZE);
        let (get_sender, get_receiver) = channel::bounded(DEFAULT_CHANNEL_SIZE);
        let (get_all_sender, get_all_receiver) = channel::bounded(DEFAULT_CHANNEL_SIZE);
        let (get_ready_sender, get_ready_receiver) = channel::bounded(DEFAULT_CHANNEL_SIZE);
        let (usage_sender, usage_receiver) = channel::bounded(DEFAULT_CHANNEL_SIZE);
        let (process_sender, process_receiver) = channel::bounded(DEFAULT_CHANNEL_SIZE);
        let (expire_sender, expire_receiver) = channel::bounded(DEFAULT_CHANNEL_SIZE);
        let (reset_invalid_sender, reset_invalid_receiver) = channel::bounded(DEFAULT_CHANNEL_SIZE);
        let (signal, signal_receiver) = channel::bounded(1);

        (
            TxPoolController {
                add_transactions_sender,
                add_ready_sender,
                remove_sender,
                get_sender,
                get_all_sender,
                get_ready_sender,
                usage_sender,
                process_sender,
                expire_sender,
                reset_invalid_sender,
                signal,
            },
            TxPoolReceivers {
                add_transactions_receiver,
                add_ready_receiver,
                remove_receiver,
                get_receiver,
                get_all_receiver,
                get_ready_receiver,
                usage_receiver,
                process_receiver,
                expire_receiver,
                reset_invalid_receiver,
                signal_receiver,
            },
        )
    }

    /// Admit raw transactions. The batch stops at the first rejected
    /// transaction and its error is returned; earlier admissions stand.
    pub fn add_transactions(&self, txs: Vec<Transaction>) -> Result<(), PoolError> {
        Request::call(&self.add_transactions_sender, txs).expect("add_transactions() failed")
    }

    /// Force transactions into `ready` on block apply or rollback.
    pub fn add_ready(&self, txs: Vec<Transaction>) {
        Request::call(&self.add_ready_sender, txs).expect("add_ready() failed")
    }

    /// Delete a transaction, usually after block inclusion. Returns the
    /// partitions it was deleted from.
    pub fn remove(&self, id: TransactionId) -> Vec<TxStatus> {
        Request::call(&self.remove_sender, id).expect("remove() failed")
    }

    pub fn get(&self, id: TransactionId) -> Option<(Transaction, TxStatus)> {
        Request::call(&self.get_sender, id).expect("get() failed")
    }

    pub fn get_all(&self, filter: TxFilter) -> TxReport {
        Request::call(&self.get_all_sender, filter).expect("get_all() failed")
    }

    /// Schedulable transactions ordered by fee descending, admission
    /// stamp ascending.
    pub fn get_ready(&self, limit: usize) -> Vec<Transaction> {
        Request::call(&self.get_ready_sender, limit).expect("get_ready() failed")
    }

    pub fn usage(&self) -> PoolUsage {
        Request::call(&self.usage_sender, ()).expect("usage() failed")
    }

    /// Run one processing tick now instead of waiting for the timer.
    pub fn process_pool(&self) {
        Request::call(&self.process_sender, ()).expect("process_pool() failed")
    }

    /// Run one expiry scan now; returns the evicted ids.
    pub fn expire_transactions(&self) -> Vec<TransactionId> {
        Request::call(&self.expire_sender, ()).expect("expire_transactions() failed")
    }

    /// Clear the invalid blacklist now; returns the count cleared.
    pub fn reset_invalid_transactions(&self) -> usize {
        Request::call(&self.reset_invalid_sender, ()).expect("reset_invalid_transactions() failed")
    }

    pub fn stop(self) {
        let _ = self.signal.send(());
    }
}

/// The service side: owns the pool and the collaborators.
pub struct TxPoolService<A, L> {
    pub(crate) pool: Pool,
    pub(crate) accounts: A,
    pub(crate) logic: L,
    pub(crate) notify: NotifyController,
}

impl<A, L> TxPoolService<A, L>
where
    A: AccountProvider + Send + 'static,
    L: TransactionLogic + Send + 'static,
{
    pub fn new(
        config: PoolConfig,
        accounts: A,
        logic: L,
        notify: NotifyController,
    ) -> TxPoolService<A, L> {
        TxPoolService {
            pool: Pool::new(config),
            accounts,
            logic,
            notify,
        }
    }

    pub fn start<S: ToString>(
        mut self,
        thread_name: Option<S>,
        receivers: TxPoolReceivers,
    ) -> JoinHandle<()> {
        let mut thread_builder = thread::Builder::new();
        if let Some(name) = thread_name {
            thread_builder = thread_builder.name(name.to_string());
        }

        let config = self.pool.config();
        let process_tick = channel::tick(Duration::from_millis(config.process_interval));
        let expiry_tick = channel::tick(Duration::from_millis(config.expiry_interval));
        let reset_tick = channel::tick(Duration::from_millis(
            config.expiry_interval * INVALID_RESET_FACTOR,
        ));

        thread_builder
            .spawn(move || loop {
                select! {
                    recv(receivers.signal_receiver) -> _ => {
                        break;
                    }
                    recv(process_tick) -> _ => self.process_pool(),
                    recv(expiry_tick) -> _ => {
                        self.expire_transactions();
                    }
                    recv(reset_tick) -> _ => {
                        self.reset_invalid_transactions();
                    }
                    recv(receivers.add_transactions_receiver) -> msg => match msg {
                        Ok(Request { responder, arguments: txs }) => {
                            let _ = responder.send(self.add_transactions(txs));
                        }
                        _ => warn!(target: "tx-pool", "add_transactions channel is closed"),
                    },
                    recv(receivers.add_ready_receiver) -> msg => match msg {
                        Ok(Request { responder, arguments: txs }) => {
                            self.add_ready_transactions(txs);
                            let _ = responder.send(());
                        }
                        _ => warn!(target: "tx-pool", "add_ready channel is closed"),
                    },
                    recv(receivers.remove_receiver) -> msg => match msg {
                        Ok(Request { responder, arguments: id }) => {
                            let _ = responder.send(self.pool.remove(&id));
                        }
                        _ => warn!(target: "tx-pool", "remove channel is closed"),
                    },
                    recv(receivers.get_receiver) -> msg => match msg {
                        Ok(Request { responder, arguments: id }) => {
                            let found = self
                                .pool
                                .get(&id)
                                .map(|(entry, status)| (entry.transaction.clone(), status));
                            let _ = responder.send(found);
                        }
                        _ => warn!(target: "tx-pool", "get channel is closed"),
                    },
                    recv(receivers.get_all_receiver) -> msg => match msg {
                        Ok(Request { responder, arguments: filter }) => {
                            let _ = responder.send(self.pool.get_all(&filter));
                        }
                        _ => warn!(target: "tx-pool", "get_all channel is closed"),
                    },
                    recv(receivers.get_ready_receiver) -> msg => match msg {
                        Ok(Request { responder, arguments: limit }) => {
                            let _ = responder.send(self.pool.get_ready(limit));
                        }
                        _ => warn!(target: "tx-pool", "get_ready channel is closed"),
                    },
                    recv(receivers.usage_receiver) -> msg => match msg {
                        Ok(Request { responder, .. }) => {
                            let _ = responder.send(self.pool.usage());
                        }
                        _ => warn!(target: "tx-pool", "usage channel is closed"),
                    },
                    recv(receivers.process_receiver) -> msg => match msg {
                        Ok(Request { responder, .. }) => {
                            self.process_pool();
                            let _ = responder.send(());
                        }
                        _ => warn!(target: "tx-pool", "process channel is closed"),
                    },
                    recv(receivers.expire_receiver) -> msg => match msg {
                        Ok(Request { responder, .. }) => {
                            let _ = responder.send(self.expire_transactions());
                        }
                        _ => warn!(target: "tx-pool", "expire channel is closed"),
                    },
                    recv(receivers.reset_invalid_receiver) -> msg => match msg {
                        Ok(Request { responder, .. }) => {
                            let _ = responder.send(self.reset_invalid_transactions());
                        }
                        _ => warn!(target: "tx-pool", "reset_invalid channel is closed"),
                    },
                }
            })
            .expect("Start transaction pool service failed")
    }

    /// Batch admission; stops at the first error.
    pub(crate) fn add_transactions(&mut self, txs: Vec<Transaction>) -> Result<(), PoolError> {
        for tx in txs {
            let id = tx.id.clone();
            self.pool.add(tx, unix_time_as_millis())?;
            debug!(target: "tx-pool", "added transaction {} to unverified", id);
        }
        Ok(())
    }

    /// Ledger-driven admission straight into `ready`; the whole batch
    /// shares one admission stamp.
    pub(crate) fn add_ready_transactions(&mut self, txs: Vec<Transaction>) {
        let received_at = unix_time_as_millis();
        for tx in txs {
            self.pool.add_ready(tx, received_at);
        }
    }

    pub(crate) fn expire_transactions(&mut self) -> Vec<TransactionId> {
        let expired = self.pool.expire(unix_time_as_millis());
        if !expired.is_empty() {
            info!(target: "tx-pool", "expired {} transactions", expired.len());
        }
        expired
    }

    pub(crate) fn reset_invalid_transactions(&mut self) -> usize {
        let cleared = self.pool.reset_invalid();
        if cleared > 0 {
            info!(target: "tx-pool", "cleared {} invalid transaction ids", cleared);
        }
        cleared
    }
}
