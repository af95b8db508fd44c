//! Builders and dummy collaborators shared across the test modules.

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::service::TxPoolService;
use crate::traits::{AccountProvider, TransactionLogic};
use boreal_notify::{NotifyController, NotifyService};
use boreal_types::constants::EPOCH_UNIX_SECS;
use boreal_types::{
    Account, MultisigGroup, Transaction, TransactionBuilder, TransactionId, TransactionKind,
};
use fnv::FnvHashSet;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub(crate) const MOCK_FEE: u64 = 10_000_000;
pub(crate) const MOCK_RECIPIENT: &str = "16313739661670634666B";

pub(crate) fn pk(address: &str) -> String {
    format!("{address}-pk")
}

fn address_of(public_key: &str) -> String {
    public_key.trim_end_matches("-pk").to_string()
}

pub(crate) fn build_tx(id: &str, sender: &str, amount: u64, fee: u64) -> Transaction {
    build_tx_to(id, sender, MOCK_RECIPIENT, amount, fee)
}

pub(crate) fn build_tx_to(
    id: &str,
    sender: &str,
    recipient: &str,
    amount: u64,
    fee: u64,
) -> Transaction {
    TransactionBuilder::default()
        .id(id)
        .sender_id(sender)
        .sender_public_key(pk(sender))
        .recipient_id(recipient)
        .amount(amount)
        .fee(fee)
        .build()
}

pub(crate) fn build_multisig_tx(id: &str, sender: &str, lifetime: u16) -> Transaction {
    TransactionBuilder::default()
        .id(id)
        .kind(TransactionKind::MultisigRegistration)
        .sender_id(sender)
        .sender_public_key(pk(sender))
        .fee(MOCK_FEE)
        .multisig_group(MultisigGroup {
            min: 2,
            lifetime,
            keysgroup: vec!["+k1".to_string(), "+k2".to_string()],
        })
        .build()
}

pub(crate) fn build_cosigned_tx(id: &str, sender: &str) -> Transaction {
    TransactionBuilder::default()
        .id(id)
        .sender_id(sender)
        .sender_public_key(pk(sender))
        .recipient_id(MOCK_RECIPIENT)
        .amount(1)
        .fee(MOCK_FEE)
        .signatures(["c0s1", "c0s2"])
        .build()
}

/// A transaction time-locked `lead_secs` into the future.
pub(crate) fn build_future_tx(id: &str, sender: &str, lead_secs: i64) -> Transaction {
    let now_secs = (faketime::unix_time_as_millis() / 1_000).saturating_sub(EPOCH_UNIX_SECS);
    TransactionBuilder::default()
        .id(id)
        .sender_id(sender)
        .sender_public_key(pk(sender))
        .recipient_id(MOCK_RECIPIENT)
        .amount(1)
        .fee(MOCK_FEE)
        .timestamp(now_secs as i64 + lead_secs)
        .build()
}

/// In-memory account store. Unknown public keys materialize with the
/// configured default balance, mirroring the ledger's create-on-lookup
/// behavior.
#[derive(Default)]
pub(crate) struct DummyAccounts {
    accounts: Mutex<HashMap<String, Account>>,
    default_balance: u64,
}

impl DummyAccounts {
    pub(crate) fn with_default_balance(default_balance: u64) -> DummyAccounts {
        DummyAccounts {
            accounts: Mutex::default(),
            default_balance,
        }
    }

    pub(crate) fn insert(&self, account: Account) {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.public_key.clone(), account);
    }
}

impl AccountProvider for DummyAccounts {
    fn set_account_and_get(&self, public_key: &str) -> Result<Account, PoolError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .entry(public_key.to_string())
            .or_insert_with(|| Account {
                address: address_of(public_key),
                public_key: public_key.to_string(),
                balance: self.default_balance,
                ..Default::default()
            });
        Ok(account.clone())
    }

    fn get_account(&self, public_key: &str) -> Result<Option<Account>, PoolError> {
        Ok(self.accounts.lock().unwrap().get(public_key).cloned())
    }

    fn balance(&self, address: &str) -> Result<u64, PoolError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|account| account.address == address)
            .map(|account| account.balance)
            .unwrap_or(self.default_balance))
    }
}

/// Transaction logic that accepts everything.
pub(crate) struct OkLogic;

impl TransactionLogic for OkLogic {
    fn process(
        &self,
        _tx: &Transaction,
        _sender: &Account,
        _requester: Option<&Account>,
    ) -> Result<(), PoolError> {
        Ok(())
    }

    fn object_normalize(&self, _tx: &mut Transaction) -> Result<(), PoolError> {
        Ok(())
    }

    fn verify(&self, _tx: &Transaction, _sender: &Account) -> Result<(), PoolError> {
        Ok(())
    }
}

/// Transaction logic that fails `verify` for a configured id set.
pub(crate) struct DenyLogic {
    deny: FnvHashSet<TransactionId>,
}

impl DenyLogic {
    pub(crate) fn denying<I>(ids: I) -> DenyLogic
    where
        I: IntoIterator,
        I::Item: Into<TransactionId>,
    {
        DenyLogic {
            deny: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl TransactionLogic for DenyLogic {
    fn process(
        &self,
        _tx: &Transaction,
        _sender: &Account,
        _requester: Option<&Account>,
    ) -> Result<(), PoolError> {
        Ok(())
    }

    fn object_normalize(&self, _tx: &mut Transaction) -> Result<(), PoolError> {
        Ok(())
    }

    fn verify(&self, tx: &Transaction, _sender: &Account) -> Result<(), PoolError> {
        if self.deny.contains(&tx.id) {
            Err(PoolError::Verification(format!(
                "failed to verify signature of {}",
                tx.id
            )))
        } else {
            Ok(())
        }
    }
}

/// A service wired to a fresh notify bus, for tests that drive it
/// directly instead of through the actor thread.
pub(crate) fn service_with<L>(
    config: PoolConfig,
    accounts: Arc<DummyAccounts>,
    logic: L,
) -> (TxPoolService<Arc<DummyAccounts>, L>, NotifyController)
where
    L: TransactionLogic + Send + 'static,
{
    let (_, notify) = NotifyService::default().start(Some("notify-test"));
    let service = TxPoolService::new(config, accounts, logic, notify.clone());
    (service, notify)
}

pub(crate) fn ok_service(
    accounts: Arc<DummyAccounts>,
) -> (TxPoolService<Arc<DummyAccounts>, OkLogic>, NotifyController) {
    service_with(PoolConfig::default(), accounts, OkLogic)
}
