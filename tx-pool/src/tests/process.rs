use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::pool::TxStatus;
use crate::tests::util::{
    build_cosigned_tx, build_future_tx, build_multisig_tx, build_tx, ok_service, pk, service_with,
    DenyLogic, DummyAccounts,
};
use boreal_types::Account;
use faketime::unix_time_as_millis;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_plain_send_promotes_to_ready() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(1_000_000_000));
    let (mut service, _notify) = ok_service(accounts);

    service
        .add_transactions(vec![build_tx("1", "100B", 5, 1)])
        .unwrap();
    assert_eq!(service.pool.get(&"1".into()).unwrap().1, TxStatus::Unverified);

    service.process_pool();

    assert_eq!(service.pool.get(&"1".into()).unwrap().1, TxStatus::Ready);
    assert_eq!(service.pool.usage().unverified, 0);
}

#[test]
fn test_promotion_restamps_received_at() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(1_000_000_000));
    let (mut service, _notify) = ok_service(accounts);
    let old_stamp = unix_time_as_millis() - 60_000;

    service.pool.add(build_tx("1", "100B", 5, 1), old_stamp).unwrap();
    service.process_pool();

    let (entry, _) = service.pool.get(&"1".into()).unwrap();
    assert!(entry.received_at > old_stamp);
}

#[test]
fn test_multisig_registration_waits_one_tick() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(1_000_000_000));
    let (mut service, _notify) = ok_service(accounts);

    service
        .add_transactions(vec![build_multisig_tx("1", "100B", 24)])
        .unwrap();

    service.process_pool();
    assert_eq!(service.pool.get(&"1".into()).unwrap().1, TxStatus::Pending);

    // The promotion pass does not re-check signature completeness.
    service.process_pool();
    assert_eq!(service.pool.get(&"1".into()).unwrap().1, TxStatus::Ready);
}

#[test]
fn test_cosigned_routes_to_pending() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(1_000_000_000));
    let (mut service, _notify) = ok_service(accounts);

    service
        .add_transactions(vec![build_cosigned_tx("1", "100B")])
        .unwrap();
    service.process_pool();

    assert_eq!(service.pool.get(&"1".into()).unwrap().1, TxStatus::Pending);
}

#[test]
fn test_future_dated_routes_to_pending() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(1_000_000_000));
    let (mut service, _notify) = ok_service(accounts);

    service
        .add_transactions(vec![build_future_tx("1", "100B", 3_600)])
        .unwrap();
    service.process_pool();

    assert_eq!(service.pool.get(&"1".into()).unwrap().1, TxStatus::Pending);
}

#[test]
fn test_verification_failure_blacklists_the_id() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(1_000_000_000));
    let (mut service, _notify) = service_with(
        PoolConfig::default(),
        accounts,
        DenyLogic::denying(["bad"]),
    );

    service
        .add_transactions(vec![build_tx("bad", "100B", 5, 1), build_tx("good", "100B", 5, 1)])
        .unwrap();
    service.process_pool();

    assert!(service.pool.get(&"bad".into()).is_none());
    assert!(service.pool.is_invalid(&"bad".into()));
    assert_eq!(service.pool.get(&"good".into()).unwrap().1, TxStatus::Ready);

    // Re-gossip of the id bounces until the blacklist resets.
    assert_eq!(
        service
            .add_transactions(vec![build_tx("bad", "100B", 5, 1)])
            .unwrap_err(),
        PoolError::Blacklisted("bad".into())
    );
    assert_eq!(service.reset_invalid_transactions(), 1);
    service
        .add_transactions(vec![build_tx("bad", "100B", 5, 1)])
        .unwrap();
}

#[test]
fn test_balance_shortfall_drops_without_blacklisting() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(10));
    let (mut service, _notify) = ok_service(accounts);

    service
        .add_transactions(vec![build_tx("1", "100B", 100, 1)])
        .unwrap();
    service.process_pool();

    assert!(service.pool.get(&"1".into()).is_none());
    assert!(!service.pool.is_invalid(&"1".into()));

    // The balance may recover, so the transaction is admissible again.
    service
        .add_transactions(vec![build_tx("1", "100B", 100, 1)])
        .unwrap();
}

#[test]
fn test_requester_not_found_fails_verification() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(1_000_000_000));
    accounts.insert(Account {
        address: "100B".to_string(),
        public_key: pk("100B"),
        balance: 1_000_000_000,
        multisignatures: vec![pk("200B"), pk("300B")],
        ..Default::default()
    });
    let (mut service, _notify) = ok_service(accounts);

    let mut tx = build_tx("1", "100B", 5, 1);
    tx.requester_public_key = Some(pk("999B"));
    service.add_transactions(vec![tx]).unwrap();
    service.process_pool();

    assert!(service.pool.get(&"1".into()).is_none());
    assert!(service.pool.is_invalid(&"1".into()));
}

#[test]
fn test_requester_resolves_when_known() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(1_000_000_000));
    accounts.insert(Account {
        address: "100B".to_string(),
        public_key: pk("100B"),
        balance: 1_000_000_000,
        multisignatures: vec![pk("200B")],
        ..Default::default()
    });
    accounts.insert(Account {
        address: "200B".to_string(),
        public_key: pk("200B"),
        balance: 0,
        ..Default::default()
    });
    let (mut service, _notify) = ok_service(accounts);

    let mut tx = build_tx("1", "100B", 5, 1);
    tx.requester_public_key = Some(pk("200B"));
    service.add_transactions(vec![tx]).unwrap();
    service.process_pool();

    assert_eq!(service.pool.get(&"1".into()).unwrap().1, TxStatus::Ready);
}

#[test]
fn test_effective_balance_counts_staged_spends() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(100));
    let (mut service, _notify) = ok_service(accounts);

    // One staged spend: 30 + 1 already committed from the projection.
    service.pool.add_ready(build_tx("1", "100B", 30, 1), unix_time_as_millis());

    let err = service
        .check_balance(&build_tx("2", "100B", 70, 1), "100B")
        .unwrap_err();
    match err {
        PoolError::InsufficientBalance { balance, required } => {
            assert_eq!(balance, "0.00000069");
            assert_eq!(required, "0.00000071");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    service
        .check_balance(&build_tx("3", "100B", 68, 1), "100B")
        .unwrap();
}

#[test]
fn test_verified_transactions_are_announced() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(1_000_000_000));
    let (mut service, notify) = ok_service(accounts);
    let receiver = notify.subscribe_new_transaction("relay-test");

    service
        .add_transactions(vec![build_tx("1", "100B", 5, 1)])
        .unwrap();
    service.process_pool();

    let announced = receiver
        .recv_timeout(Duration::from_secs(5))
        .expect("expected a broadcast announcement");
    assert_eq!(announced.id, "1".into());
}

#[test]
fn test_expiry_through_the_service() {
    let accounts = Arc::new(DummyAccounts::with_default_balance(1_000_000_000));
    let (mut service, _notify) = ok_service(accounts);
    let stale = unix_time_as_millis() - 11_000_000;

    service.pool.add(build_tx("1", "100B", 5, 1), stale).unwrap();
    assert_eq!(service.expire_transactions(), vec!["1".into()]);
    assert!(service.pool.get(&"1".into()).is_none());
}
