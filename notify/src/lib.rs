//! In-process event bus. Services publish through the controller;
//! protocol handlers subscribe by name and receive on their own
//! bounded channel. Delivery is fire-and-forget: a slow subscriber
//! loses events instead of stalling the publisher.

use boreal_types::service::Request;
use boreal_types::Transaction;
use crossbeam_channel::{self as channel, select, Receiver, RecvError, Sender};
use fnv::FnvHashMap;
use log::{debug, warn};
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

pub const REGISTER_CHANNEL_SIZE: usize = 2;
pub const NOTIFY_CHANNEL_SIZE: usize = 128;

type StopSignal = ();
pub type MsgNewTransaction = Arc<Transaction>;
pub type NotifyRegister<M> = Sender<Request<(String, usize), Receiver<M>>>;

#[derive(Default)]
pub struct NotifyService {}

#[derive(Clone)]
pub struct NotifyController {
    signal: Sender<StopSignal>,
    new_transaction_register: NotifyRegister<MsgNewTransaction>,
    new_transaction_notifier: Sender<MsgNewTransaction>,
}

impl NotifyService {
    pub fn start<S: ToString>(self, thread_name: Option<S>) -> (JoinHandle<()>, NotifyController) {
        let (signal_sender, signal_receiver) = channel::bounded::<StopSignal>(REGISTER_CHANNEL_SIZE);
        let (new_transaction_register, new_transaction_register_receiver) =
            channel::bounded(REGISTER_CHANNEL_SIZE);
        let (new_transaction_sender, new_transaction_receiver) =
            channel::bounded::<MsgNewTransaction>(NOTIFY_CHANNEL_SIZE);

        let mut new_transaction_subscribers = FnvHashMap::default();

        let mut thread_builder = thread::Builder::new();
        // Mainly for test: give a empty thread_name
        if let Some(name) = thread_name {
            thread_builder = thread_builder.name(name.to_string());
        }
        let join_handle = thread_builder
            .spawn(move || loop {
                select! {
                    recv(signal_receiver) -> _ => {
                        break;
                    }
                    recv(new_transaction_register_receiver) -> msg => Self::handle_register_new_transaction(
                        &mut new_transaction_subscribers, msg
                    ),
                    recv(new_transaction_receiver) -> msg => Self::handle_notify_new_transaction(
                        &new_transaction_subscribers, msg
                    ),
                }
            })
            .expect("Start notify service failed");

        (
            join_handle,
            NotifyController {
                new_transaction_register,
                new_transaction_notifier: new_transaction_sender,
                signal: signal_sender,
            },
        )
    }

    fn handle_register_new_transaction(
        subscribers: &mut FnvHashMap<String, Sender<MsgNewTransaction>>,
        msg: Result<Request<(String, usize), Receiver<MsgNewTransaction>>, RecvError>,
    ) {
        match msg {
            Ok(Request {
                responder,
                arguments: (name, capacity),
            }) => {
                debug!(target: "notify", "Register new_transaction {:?}", name);
                let (sender, receiver) = channel::bounded::<MsgNewTransaction>(capacity);
                subscribers.insert(name, sender);
                let _ = responder.send(receiver);
            }
            _ => warn!(target: "notify", "Register new_transaction channel is closed"),
        }
    }

    fn handle_notify_new_transaction(
        subscribers: &FnvHashMap<String, Sender<MsgNewTransaction>>,
        msg: Result<MsgNewTransaction, RecvError>,
    ) {
        match msg {
            Ok(msg) => {
                debug!(target: "notify", "event new transaction {}", msg.id);
                for subscriber in subscribers.values() {
                    let _ = subscriber.try_send(Arc::clone(&msg));
                }
            }
            _ => warn!(target: "notify", "new transaction channel is closed"),
        }
    }
}

impl NotifyController {
    pub fn stop(self) {
        let _ = self.signal.send(());
    }

    pub fn subscribe_new_transaction<S: ToString>(&self, name: S) -> Receiver<MsgNewTransaction> {
        Request::call(
            &self.new_transaction_register,
            (name.to_string(), NOTIFY_CHANNEL_SIZE),
        )
        .expect("Subscribe new transaction failed")
    }

    pub fn notify_new_transaction(&self, tx: MsgNewTransaction) {
        let _ = self.new_transaction_notifier.send(tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boreal_types::TransactionBuilder;

    #[test]
    fn test_new_transaction() {
        let tx = Arc::new(TransactionBuilder::default().id("42").build());

        let (handle, notify) = NotifyService::default().start::<&str>(None);
        let receiver1 = notify.subscribe_new_transaction("relay1");
        let receiver2 = notify.subscribe_new_transaction("relay2");
        notify.notify_new_transaction(Arc::clone(&tx));
        assert_eq!(receiver1.recv(), Ok(Arc::clone(&tx)));
        assert_eq!(receiver2.recv(), Ok(tx));
        notify.stop();
        handle.join().expect("join failed");
    }

    #[test]
    fn test_subscribe_after_stop_events_are_dropped() {
        let (handle, notify) = NotifyService::default().start(Some("notify-test"));
        let receiver = notify.subscribe_new_transaction("relay");
        notify.clone().stop();
        handle.join().expect("join failed");

        // The service is gone; the subscriber sees a closed channel.
        assert!(receiver.recv().is_err());
    }
}
