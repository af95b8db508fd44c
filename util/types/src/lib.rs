//! Core types shared by the boreal node crates.

mod account;
mod transaction;

pub mod constants;
pub mod service;

pub use account::Account;
pub use transaction::{
    MultisigGroup, Transaction, TransactionAsset, TransactionBuilder, TransactionId,
    TransactionKind,
};
