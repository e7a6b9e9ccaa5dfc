//! The per-client delivery loop.
//!
//! One dispatcher task drains one client's queue, so at most one request is
//! in flight per client. The task sleeps while the queue is empty, while the
//! rate-limit window is exhausted, and during retry backoff; a send, a
//! cancel or a close wakes it. If the task ends for any reason, requests
//! still queued are rejected with `ClientClosed`. The shared lock is never
//! held across an `.await` or while a handle is being resolved.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use super::bucket::RateLimitBucket;
use super::error::FailureCause;
use super::handle::SendReceipt;
use super::queue::{SendQueue, SendRequest};
use super::{
    BackoffPolicy, ClientConfig, HttpClient, HttpError, HttpRequest, HttpResponse, SendError,
};

/// State shared by a client, its handles, and its dispatcher.
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<DispatchState>,
    wake: Notify,
    next_id: AtomicU64,
}

#[derive(Debug)]
pub(crate) struct DispatchState {
    pub(crate) queue: SendQueue<SendRequest>,
    pub(crate) bucket: RateLimitBucket,
    pub(crate) closed: bool,
}

impl Shared {
    pub(crate) fn new(max_queue_depth: Option<usize>) -> Self {
        Self {
            state: Mutex::new(DispatchState {
                queue: SendQueue::new(max_queue_depth),
                bucket: RateLimitBucket::new(),
                closed: false,
            }),
            wake: Notify::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, DispatchState> {
        // Every critical section leaves the state consistent, so a poisoned
        // lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Wakes the dispatcher; the permit is kept if it is not waiting yet.
    pub(crate) fn wake(&self) {
        self.wake.notify_one();
    }
}

impl DispatchState {
    /// How long `head` must still wait; zero if it may go now.
    fn pending_wait(&self, head: &SendRequest, now: Instant) -> Duration {
        let rate_limit = if self.bucket.can_send_at(now) {
            Duration::ZERO
        } else {
            self.bucket.time_until_reset_at(now)
        };
        let backoff = head
            .not_before
            .map_or(Duration::ZERO, |until| until.saturating_duration_since(now));

        rate_limit.max(backoff)
    }
}

/// Rejects whatever is still queued when the dispatcher stops, however it stops.
struct CloseOnExit<'a>(&'a Shared);

impl Drop for CloseOnExit<'_> {
    fn drop(&mut self) {
        let orphaned = {
            let mut state = self.0.lock();
            state.closed = true;
            state.queue.drain()
        };

        if !orphaned.is_empty() {
            tracing::warn!(
                "Dispatcher stopped with {} queued message(s), rejecting them",
                orphaned.len()
            );
        }
        for request in orphaned {
            request.completer.complete(Err(SendError::ClientClosed));
        }
    }
}

/// Drains the queue against a single endpoint.
#[derive(Debug)]
pub(crate) struct Dispatcher<H> {
    shared: Arc<Shared>,
    transport: H,
    url: url::Url,
    max_retries: u32,
    max_rate_limit_retries: u32,
    backoff: BackoffPolicy,
    message_ttl: Option<Duration>,
}

impl<H: HttpClient> Dispatcher<H> {
    pub(crate) fn new(
        shared: Arc<Shared>,
        transport: H,
        url: url::Url,
        config: &ClientConfig,
    ) -> Self {
        Self {
            shared,
            transport,
            url,
            max_retries: config.max_retries,
            max_rate_limit_retries: config.max_rate_limit_retries,
            backoff: config.backoff.clone(),
            message_ttl: config.message_ttl,
        }
    }

    /// Runs until the client is closed.
    ///
    /// The request in flight when the client closes still completes.
    pub(crate) async fn run(self) {
        let _close_on_exit = CloseOnExit(&self.shared);
        tracing::debug!("Dispatcher started");

        while let Some(request) = self.next_request().await {
            self.dispatch(request).await;
        }

        tracing::debug!("Dispatcher stopped");
    }

    /// Waits until the head of the queue may be sent and takes it.
    ///
    /// Returns `None` once the client is closed.
    async fn next_request(&self) -> Option<SendRequest> {
        loop {
            let wait = {
                let mut state = self.shared.lock();
                if state.closed {
                    return None;
                }
                let now = Instant::now();
                // An expired head is taken at once; dispatch rejects it.
                let wait = state.queue.peek().map(|head| {
                    if self.expired_for(head, now).is_some() {
                        Duration::ZERO
                    } else {
                        state.pending_wait(head, now)
                    }
                });
                match wait {
                    Some(wait) if wait.is_zero() => return state.queue.dequeue(),
                    wait => wait,
                }
            };

            match wait {
                None => self.shared.wake.notified().await,
                Some(delay) => {
                    tracing::debug!("Holding queue for {delay:?}");
                    // A wake-up only means "re-check"; the loop recomputes the wait.
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = self.shared.wake.notified() => {}
                    }
                }
            }
        }
    }

    /// How long `request` has been queued, if that exceeds the message TTL.
    fn expired_for(&self, request: &SendRequest, now: Instant) -> Option<Duration> {
        let queued_for = now.saturating_duration_since(request.enqueued_at);
        self.message_ttl
            .filter(|ttl| queued_for > *ttl)
            .map(|_| queued_for)
    }

    async fn dispatch(&self, mut request: SendRequest) {
        if let Some(queued_for) = self.expired_for(&request, Instant::now()) {
            tracing::warn!(
                "Message #{} expired after {queued_for:?} in the queue",
                request.id
            );
            request
                .completer
                .complete(Err(SendError::Expired { queued_for }));
            return;
        }

        request.attempts += 1;
        tracing::debug!(
            "Sending message #{} (attempt {})",
            request.id,
            request.attempts
        );

        let http_request = HttpRequest::execute(self.url.clone(), &request.payload);

        match self.transport.request(http_request).await {
            Ok(response) => self.handle_response(request, &response),
            Err(error) => self.handle_transport_error(request, error),
        }
    }

    fn handle_response(&self, mut request: SendRequest, response: &HttpResponse) {
        let retry_in = {
            let mut state = self.shared.lock();
            state.bucket.update(response);
            state.bucket.time_until_reset()
        };
        let status = response.status;

        if response.is_success() {
            tracing::info!("Delivered message #{} ({status})", request.id);
            let receipt = SendReceipt {
                status,
                message_id: created_message_id(response),
                attempts: request.attempts,
            };
            request.completer.complete(Ok(receipt));
        } else if response.is_rate_limited() {
            // Rate limiting is flow control: no retry is counted, only capped.
            request.rate_limit_hits += 1;
            if request.rate_limit_hits > self.max_rate_limit_retries {
                let hits = request.rate_limit_hits;
                Self::fail(request, FailureCause::RateLimited { hits });
                return;
            }
            tracing::warn!(
                "Rate limited on message #{}, retrying in {retry_in:?}",
                request.id
            );
            self.requeue(request, None);
        } else if response.is_transient_failure() {
            let cause = FailureCause::ServerError {
                status,
                body: response.body_text().map(ToString::to_string),
            };
            self.retry_or_fail(request, cause);
        } else {
            tracing::error!("Message #{} rejected with {status}", request.id);
            request.completer.complete(Err(SendError::RejectedRequest {
                status,
                body: response.body_text().map(ToString::to_string),
            }));
        }
    }

    fn handle_transport_error(&self, request: SendRequest, error: HttpError) {
        if error.is_retryable() {
            self.retry_or_fail(request, error.into());
        } else {
            Self::fail(request, error.into());
        }
    }

    fn retry_or_fail(&self, mut request: SendRequest, cause: FailureCause) {
        if request.retries >= self.max_retries {
            Self::fail(request, cause);
            return;
        }

        let delay = self.backoff.delay_for_retry(request.retries);
        request.retries += 1;
        request.rate_limit_hits = 0;
        tracing::warn!(
            "Message #{} failed: {cause}; retry {}/{} in {delay:?}",
            request.id,
            request.retries,
            self.max_retries
        );
        self.requeue(request, Some(delay));
    }

    fn fail(request: SendRequest, cause: FailureCause) {
        tracing::error!(
            "Message #{} failed after {} attempt(s): {cause}",
            request.id,
            request.attempts
        );
        let attempts = request.attempts;
        request
            .completer
            .complete(Err(SendError::TransportFailure { attempts, cause }));
    }

    /// Puts a request back at the head, delayed by `backoff` if given.
    ///
    /// The delay belongs to the request, so cancelling it frees the queue.
    fn requeue(&self, mut request: SendRequest, backoff: Option<Duration>) {
        request.not_before = backoff.map(|delay| Instant::now() + delay);
        let rejected = {
            let mut state = self.shared.lock();
            if state.closed {
                Some(request)
            } else {
                state.queue.push_front(request);
                None
            }
        };

        if let Some(request) = rejected {
            tracing::debug!("Client closed; dropping retry of message #{}", request.id);
            request.completer.complete(Err(SendError::ClientClosed));
        }
    }
}

/// Reads `id` from a created-message body. Empty or non-JSON bodies yield `None`.
fn created_message_id(response: &HttpResponse) -> Option<String> {
    let body: serde_json::Value = serde_json::from_slice(&response.body).ok()?;
    match body.get("id")? {
        serde_json::Value::String(id) => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
