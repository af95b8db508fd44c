//! The processing engine: drains `unverified` through the verifier
//! pipeline and the projected-balance check, then promotes `pending`.

use crate::component::entry::PoolEntry;
use crate::error::PoolError;
use crate::service::TxPoolService;
use crate::traits::{AccountProvider, TransactionLogic};
use boreal_types::constants::COIN;
use boreal_types::{Account, Transaction};
use faketime::unix_time_as_millis;
use log::{debug, error};
use num_bigint::{BigInt, BigUint, Sign};
use std::sync::Arc;

impl<A, L> TxPoolService<A, L>
where
    A: AccountProvider,
    L: TransactionLogic,
{
    /// One processing tick.
    ///
    /// Phase A takes a snapshot of `unverified` and walks it in
    /// admission order: verification failure blacklists the id, a
    /// balance shortfall drops the transaction silently (the balance
    /// may recover), and survivors are restamped and routed to
    /// `pending` or `ready`. Phase B promotes everything in `pending`.
    /// Entries admitted while the tick runs are only seen next tick,
    /// and per-entry failures never fail the tick.
    pub(crate) fn process_pool(&mut self) {
        for entry in self.pool.drain_unverified() {
            let id = entry.transaction.id.clone();
            match self.process_unverified_transaction(entry.transaction) {
                Ok((tx, sender)) => {
                    if let Err(err) = self.check_balance(&tx, &sender.address) {
                        debug!(target: "tx-pool", "transaction {} dropped: {}", id, err);
                        continue;
                    }
                    let entry = PoolEntry::new(tx, unix_time_as_millis());
                    if entry.is_deferred() {
                        self.pool.insert_pending(entry);
                    } else {
                        self.pool.insert_ready(entry);
                    }
                }
                Err(err) => {
                    error!(
                        target: "tx-pool",
                        "transaction {} failed verification: {}", id, err
                    );
                    self.pool.mark_invalid(id);
                }
            }
        }

        for entry in self.pool.drain_pending() {
            self.pool.insert_ready(entry);
        }
    }

    /// The verifier pipeline; the first failure short-circuits. On
    /// success the transaction is announced on the bus for broadcast.
    pub(crate) fn process_unverified_transaction(
        &mut self,
        mut tx: Transaction,
    ) -> Result<(Transaction, Account), PoolError> {
        let sender = self.accounts.set_account_and_get(&tx.sender_public_key)?;

        let requester = match tx.requester_public_key.as_deref() {
            Some(key) if sender.has_multisig_group() => Some(
                self.accounts
                    .get_account(key)?
                    .ok_or(PoolError::RequesterNotFound)?,
            ),
            _ => None,
        };

        self.logic.process(&tx, &sender, requester.as_ref())?;
        self.logic.object_normalize(&mut tx)?;
        self.logic.verify(&tx, &sender)?;

        self.notify.notify_new_transaction(Arc::new(tx.clone()));
        Ok((tx, sender))
    }

    /// Projected-balance admission predicate: the confirmed balance
    /// adjusted by every spend and `Send` receipt already staged in
    /// the pool must cover `amount + fee`.
    pub(crate) fn check_balance(
        &self,
        tx: &Transaction,
        sender_address: &str,
    ) -> Result<(), PoolError> {
        let confirmed = self.accounts.balance(sender_address)?;
        let effective = BigInt::from(confirmed) + self.pool.pool_balance(sender_address);
        let cost = BigInt::from(tx.amount) + BigInt::from(tx.fee);
        if effective >= cost {
            Ok(())
        } else {
            Err(PoolError::InsufficientBalance {
                balance: format_units(&effective),
                required: format_units(&cost),
            })
        }
    }
}

/// Render a sub-unit amount in display units, 8 decimal places.
fn format_units(amount: &BigInt) -> String {
    let coin = BigUint::from(COIN);
    let sign = if amount.sign() == Sign::Minus { "-" } else { "" };
    let units = amount.magnitude() / &coin;
    let frac = amount.magnitude() % &coin;
    format!("{}{}.{:08}", sign, units, frac)
}
