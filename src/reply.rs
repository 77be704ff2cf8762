//! Exactly-once result delivery for host API calls.
//!
//! Some host API calls complete after they return, for instance when the native
//! facility reports through a callback on another thread. Those calls take a
//! [`Reply`] and answer through it. `Reply::success` and `Reply::error` consume the
//! reply, so a result is delivered at most once, and dropping an unanswered reply
//! surfaces as [`BridgeError::ReplyDropped`] on the waiting side.
use tokio::sync::oneshot;

use crate::errors::BridgeError;

/// Creates a connected reply pair.
pub fn reply_channel<T>() -> (Reply<T>, PendingReply<T>) {
    let (tx, rx) = oneshot::channel();
    (Reply { tx }, PendingReply { rx })
}

/// Sending half handed to the host API implementation.
#[derive(Debug)]
pub struct Reply<T> {
    tx: oneshot::Sender<Result<T, BridgeError>>,
}

impl<T> Reply<T> {
    pub fn success(self, value: T) {
        self.send(Ok(value));
    }

    pub fn error(self, err: BridgeError) {
        self.send(Err(err));
    }

    pub fn send(self, result: Result<T, BridgeError>) {
        // The caller may have stopped waiting; nothing to deliver to in that case.
        let _ = self.tx.send(result);
    }

    /// True when nobody is waiting for the result anymore.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half held by the transport.
#[derive(Debug)]
pub struct PendingReply<T> {
    rx: oneshot::Receiver<Result<T, BridgeError>>,
}

impl<T> PendingReply<T> {
    /// Waits for the result.
    pub async fn recv(self) -> Result<T, BridgeError> {
        self.rx.await.map_err(|_| BridgeError::ReplyDropped)?
    }

    /// Returns the result if it has already been delivered.
    pub fn try_recv(&mut self) -> Option<Result<T, BridgeError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(BridgeError::ReplyDropped)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_is_delivered() {
        let (reply, pending) = reply_channel();
        reply.success(true);
        assert!(pending.recv().await.unwrap());
    }

    #[tokio::test]
    async fn error_is_delivered() {
        let (reply, pending) = reply_channel::<bool>();
        reply.error(BridgeError::ReplyDropped);
        assert!(matches!(pending.recv().await, Err(BridgeError::ReplyDropped)));
    }

    #[tokio::test]
    async fn dropped_reply_is_reported() {
        let (reply, pending) = reply_channel::<bool>();
        drop(reply);
        assert!(matches!(pending.recv().await, Err(BridgeError::ReplyDropped)));
    }

    #[test]
    fn try_recv_before_and_after_delivery() {
        let (reply, mut pending) = reply_channel();
        assert!(pending.try_recv().is_none());

        std::thread::spawn(move || reply.success(7u8)).join().unwrap();
        assert_eq!(pending.try_recv().unwrap().unwrap(), 7);
    }

    #[test]
    fn reply_notices_closed_receiver() {
        let (reply, pending) = reply_channel::<u8>();
        assert!(!reply.is_closed());
        drop(pending);
        assert!(reply.is_closed());
    }
}
