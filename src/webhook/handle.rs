//! Completion handles returned by [`WebhookClient::send`](super::WebhookClient::send).

use std::future::Future;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::SendError;
use super::dispatcher::Shared;

/// Result a [`SendHandle`] resolves to.
pub type SendOutcome = Result<SendReceipt, SendError>;

/// Successful delivery of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// The 2xx status returned by the server
    pub status: http::StatusCode,
    /// Id of the created message; `None` when the client does not wait for it
    pub message_id: Option<String>,
    /// Transport invocations it took, including rate-limited ones
    pub attempts: u32,
}

/// Sending half of a handle. Consumed on resolution, so a handle resolves once.
#[derive(Debug)]
pub(crate) struct Completer(oneshot::Sender<SendOutcome>);

impl Completer {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<SendOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    pub(crate) fn complete(self, outcome: SendOutcome) {
        if self.0.send(outcome).is_err() {
            tracing::trace!("Send handle dropped before completion");
        }
    }
}

/// Pending outcome of one queued message.
///
/// Await it, block on it with [`blocking_wait`](Self::blocking_wait), or hand
/// it a callback with [`on_complete`](Self::on_complete). Dropping the handle
/// does not cancel the send.
#[derive(Debug)]
pub struct SendHandle {
    id: u64,
    receiver: oneshot::Receiver<SendOutcome>,
    shared: Weak<Shared>,
}

impl SendHandle {
    pub(crate) const fn new(
        id: u64,
        receiver: oneshot::Receiver<SendOutcome>,
        shared: Weak<Shared>,
    ) -> Self {
        Self {
            id,
            receiver,
            shared,
        }
    }

    /// Client-local id of the request.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Removes the request from the queue if it has not been dispatched yet.
    ///
    /// Returns `true` if the request was removed; the handle then resolves
    /// with [`SendError::Cancelled`]. Returns `false` once the request is in
    /// flight or already resolved.
    pub fn cancel(&self) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        let removed = shared.lock().queue.remove(self.id);

        removed.is_some_and(|request| {
            tracing::debug!("Cancelled queued message #{}", request.id);
            request.completer.complete(Err(SendError::Cancelled));
            // The dispatcher may be waiting out this request's backoff.
            shared.wake();
            true
        })
    }

    /// Blocks the current thread until the request resolves.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn blocking_wait(self) -> SendOutcome {
        self.receiver
            .blocking_recv()
            .unwrap_or(Err(SendError::ClientClosed))
    }

    /// Runs `callback` with the outcome once the request resolves.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn on_complete<F>(self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(SendOutcome) + Send + 'static,
    {
        tokio::spawn(async move { callback(self.await) })
    }
}

impl Future for SendHandle {
    type Output = SendOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A dropped sender means the dispatcher went away without resolving.
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(SendError::ClientClosed)))
    }
}
