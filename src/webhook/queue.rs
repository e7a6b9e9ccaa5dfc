//! Strict FIFO backlog of pending sends for one endpoint.

use std::collections::VecDeque;

use tokio::time::Instant;

use super::SendError;
use super::handle::Completer;
use crate::message::EncodedPayload;

/// One queued message and the means to resolve its handle.
#[derive(Debug)]
pub(crate) struct SendRequest {
    pub(crate) id: u64,
    pub(crate) payload: EncodedPayload,
    /// Counted retries so far; 429 re-entries do not count
    pub(crate) retries: u32,
    /// Every transport invocation, counted or not
    pub(crate) attempts: u32,
    /// 429 responses since the last counted failure
    pub(crate) rate_limit_hits: u32,
    /// Backoff deadline after a counted failure
    pub(crate) not_before: Option<Instant>,
    pub(crate) enqueued_at: Instant,
    pub(crate) completer: Completer,
}

impl SendRequest {
    pub(crate) fn new(id: u64, payload: EncodedPayload, completer: Completer) -> Self {
        Self {
            id,
            payload,
            retries: 0,
            attempts: 0,
            rate_limit_hits: 0,
            not_before: None,
            enqueued_at: Instant::now(),
            completer,
        }
    }
}

/// Ordered backlog of pending work.
///
/// Items are dispatched in the order they were enqueued. A retried item
/// re-enters at the front so nothing submitted after it can overtake it.
/// The queue itself never blocks; waiting is the dispatcher's job.
#[derive(Debug)]
pub struct SendQueue<T> {
    items: VecDeque<T>,
    max_depth: Option<usize>,
}

impl<T> SendQueue<T> {
    /// Creates a queue, bounded when `max_depth` is set.
    #[must_use]
    pub const fn new(max_depth: Option<usize>) -> Self {
        Self {
            items: VecDeque::new(),
            max_depth,
        }
    }

    /// Appends an item.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::QueueFull`] if the queue is at its maximum depth;
    /// the item is dropped.
    pub fn enqueue(&mut self, item: T) -> Result<(), SendError> {
        if let Some(depth) = self.max_depth {
            if self.items.len() >= depth {
                return Err(SendError::QueueFull { depth });
            }
        }
        self.items.push_back(item);
        Ok(())
    }

    /// Puts an item back at the head, ahead of everything still waiting.
    ///
    /// Not subject to the depth limit: the item already held a slot.
    pub fn push_front(&mut self, item: T) {
        self.items.push_front(item);
    }

    /// Removes and returns the head, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Returns the head without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Removes the first item matching `predicate`, preserving the order of the rest.
    pub fn remove_first(&mut self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        let index = self.items.iter().position(predicate)?;
        self.items.remove(index)
    }

    /// Removes every item, in order.
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SendQueue<SendRequest> {
    /// Removes the request with the given id, if it is still waiting.
    pub(crate) fn remove(&mut self, id: u64) -> Option<SendRequest> {
        self.remove_first(|request| request.id == id)
    }
}

impl<T> Default for SendQueue<T> {
    fn default() -> Self {
        Self::new(None)
    }
}
