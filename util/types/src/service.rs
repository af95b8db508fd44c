//! Call envelope for controller/service channel pairs.

use crossbeam_channel::{self as channel, Sender};

const ONESHOT_CHANNEL_SIZE: usize = 1;
pub const DEFAULT_CHANNEL_SIZE: usize = 32;

pub struct Request<A, R> {
    pub responder: Sender<R>,
    pub arguments: A,
}

impl<A, R> Request<A, R> {
    /// Send `arguments` to the service and block on its response.
    /// `None` means the service has shut down.
    pub fn call(sender: &Sender<Request<A, R>>, arguments: A) -> Option<R> {
        let (responder, response) = channel::bounded(ONESHOT_CHANNEL_SIZE);
        sender
            .send(Request {
                responder,
                arguments,
            })
            .ok()?;
        response.recv().ok()
    }
}
