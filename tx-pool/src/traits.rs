//! Collaborator interfaces. Cryptography and ledger state live outside
//! the pool; it talks to them through these traits, injected at
//! service construction.

use crate::error::PoolError;
use boreal_types::{Account, Transaction};
use std::sync::Arc;

/// Ledger-side account lookup.
pub trait AccountProvider {
    /// Resolve the account for `public_key`, creating it when absent.
    fn set_account_and_get(&self, public_key: &str) -> Result<Account, PoolError>;

    /// Resolve an existing account for `public_key`.
    fn get_account(&self, public_key: &str) -> Result<Option<Account>, PoolError>;

    /// Confirmed balance for `address`, in sub-units.
    fn balance(&self, address: &str) -> Result<u64, PoolError>;
}

/// The transaction logic collaborator: the `process`,
/// `object_normalize`, `verify` pipeline the pool delegates to.
pub trait TransactionLogic {
    fn process(
        &self,
        tx: &Transaction,
        sender: &Account,
        requester: Option<&Account>,
    ) -> Result<(), PoolError>;

    /// Canonicalize `tx` in place.
    fn object_normalize(&self, tx: &mut Transaction) -> Result<(), PoolError>;

    fn verify(&self, tx: &Transaction, sender: &Account) -> Result<(), PoolError>;
}

impl<T: AccountProvider> AccountProvider for Arc<T> {
    fn set_account_and_get(&self, public_key: &str) -> Result<Account, PoolError> {
        (**self).set_account_and_get(public_key)
    }

    fn get_account(&self, public_key: &str) -> Result<Option<Account>, PoolError> {
        (**self).get_account(public_key)
    }

    fn balance(&self, address: &str) -> Result<u64, PoolError> {
        (**self).balance(address)
    }
}

impl<T: TransactionLogic> TransactionLogic for Arc<T> {
    fn process(
        &self,
        tx: &Transaction,
        sender: &Account,
        requester: Option<&Account>,
    ) -> Result<(), PoolError> {
        (**self).process(tx, sender, requester)
    }

    fn object_normalize(&self, tx: &mut Transaction) -> Result<(), PoolError> {
        (**self).object_normalize(tx)
    }

    fn verify(&self, tx: &Transaction, sender: &Account) -> Result<(), PoolError> {
        (**self).verify(tx, sender)
    }
}
