//! The webhook client facade.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::bucket::RateLimitSnapshot;
use super::dispatcher::{Dispatcher, Shared};
use super::handle::{Completer, SendHandle};
use super::queue::SendRequest;
use super::{ClientConfig, HttpClient, InvalidWebhookUrl, SendError, WebhookUrl};
use crate::message::{AllowedMentions, EncodedPayload, WebhookEmbed, WebhookMessage};

/// Sends messages to one webhook, in order, within its rate limit.
///
/// Each client owns a queue, a rate-limit bucket, and a dispatcher task.
/// [`send`](Self::send) returns immediately with a [`SendHandle`]; the
/// dispatcher delivers queued messages one at a time, waiting out rate-limit
/// windows and retrying transient failures.
///
/// Two clients for the same webhook do not share rate-limit state.
///
/// Dropping the client closes it: queued messages fail with
/// [`SendError::ClientClosed`].
///
/// # Example
///
/// ```no_run
/// use discord_webhooks::webhook::{ClientConfig, ReqwestClient, WebhookClient, WebhookUrl};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let url = WebhookUrl::parse("https://discord.com/api/webhooks/123/token")?;
/// let client = WebhookClient::new(url, ReqwestClient::new(), ClientConfig::default());
///
/// let receipt = client.send_content("Deploy finished")?.await?;
/// println!("posted message {:?}", receipt.message_id);
///
/// client.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WebhookClient {
    shared: Arc<Shared>,
    url: WebhookUrl,
    allowed_mentions: Option<AllowedMentions>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WebhookClient {
    /// Creates a client and starts its dispatcher on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new<H>(url: WebhookUrl, transport: H, config: ClientConfig) -> Self
    where
        H: HttpClient + 'static,
    {
        Self::new_in(&Handle::current(), url, transport, config)
    }

    /// Creates a client whose dispatcher runs on `runtime`.
    ///
    /// Lets synchronous code own a client and wait on handles with
    /// [`SendHandle::blocking_wait`].
    #[must_use]
    pub fn new_in<H>(runtime: &Handle, url: WebhookUrl, transport: H, config: ClientConfig) -> Self
    where
        H: HttpClient + 'static,
    {
        let shared = Arc::new(Shared::new(config.max_queue_depth));
        let endpoint = url.execute_url(config.wait);
        let dispatcher = Dispatcher::new(Arc::clone(&shared), transport, endpoint, &config);
        let task = runtime.spawn(dispatcher.run());

        tracing::debug!("Webhook client started for {url}");

        Self {
            shared,
            url,
            allowed_mentions: config.allowed_mentions,
            task: Mutex::new(Some(task)),
        }
    }

    /// Creates a client from a webhook id and token.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWebhookUrl`] if the token is malformed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn with_id<H>(
        id: u64,
        token: impl Into<String>,
        transport: H,
        config: ClientConfig,
    ) -> Result<Self, InvalidWebhookUrl>
    where
        H: HttpClient + 'static,
    {
        let url = WebhookUrl::from_parts(id, token)?;
        Ok(Self::new(url, transport, config))
    }

    /// Queues a message.
    ///
    /// The client's default allowed mentions apply when the message sets none.
    ///
    /// # Errors
    ///
    /// Fails synchronously with [`SendError::Validation`] if the message
    /// breaks a Discord limit, [`SendError::QueueFull`] if the queue is at
    /// capacity, or [`SendError::ClientClosed`] after [`close`](Self::close).
    /// Delivery failures arrive through the handle.
    pub fn send(&self, message: &WebhookMessage) -> Result<SendHandle, SendError> {
        let payload = match (&message.allowed_mentions, &self.allowed_mentions) {
            (None, Some(default)) => message
                .clone()
                .with_allowed_mentions(default.clone())
                .encode()?,
            _ => message.encode()?,
        };
        self.send_payload(payload)
    }

    /// Queues a plain text message.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn send_content(&self, content: impl Into<String>) -> Result<SendHandle, SendError> {
        self.send(&WebhookMessage::text(content))
    }

    /// Queues a message made of embeds.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn send_embeds(
        &self,
        embeds: impl IntoIterator<Item = WebhookEmbed>,
    ) -> Result<SendHandle, SendError> {
        self.send(&WebhookMessage::embeds(embeds))
    }

    /// Queues a single file upload.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn send_file(
        &self,
        name: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Result<SendHandle, SendError> {
        self.send(&WebhookMessage::file(name, data))
    }

    /// Queues an already encoded body as is.
    ///
    /// # Errors
    ///
    /// Fails with [`SendError::QueueFull`] or [`SendError::ClientClosed`].
    pub fn send_payload(&self, payload: EncodedPayload) -> Result<SendHandle, SendError> {
        let (completer, receiver) = Completer::channel();
        let id = self.shared.next_id();

        {
            let mut state = self.shared.lock();
            if state.closed {
                return Err(SendError::ClientClosed);
            }
            state
                .queue
                .enqueue(SendRequest::new(id, payload, completer))?;
        }
        self.shared.wake();

        tracing::debug!("Queued message #{id}");
        Ok(SendHandle::new(id, receiver, Arc::downgrade(&self.shared)))
    }

    /// Stops accepting messages and fails everything still queued.
    ///
    /// A request already in flight completes normally. Calling this more
    /// than once has no further effect.
    pub fn close(&self) {
        let drained = {
            let mut state = self.shared.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.queue.drain()
        };

        tracing::info!(
            "Closing webhook client, {} queued message(s) rejected",
            drained.len()
        );
        for request in drained {
            request.completer.complete(Err(SendError::ClientClosed));
        }
        self.shared.wake();
    }

    /// Closes the client and waits for the dispatcher to finish its in-flight request.
    pub async fn shutdown(&self) {
        self.close();

        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!("Dispatcher task failed: {e}");
            }
        }
    }

    /// Returns true once [`close`](Self::close) has been called or the dispatcher has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Number of messages waiting to be sent, excluding the one in flight.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Last known rate-limit state, or `None` if unknown.
    #[must_use]
    pub fn rate_limit(&self) -> Option<RateLimitSnapshot> {
        self.shared.lock().bucket.snapshot()
    }

    /// The webhook this client posts to.
    #[must_use]
    pub const fn url(&self) -> &WebhookUrl {
        &self.url
    }
}

impl Drop for WebhookClient {
    fn drop(&mut self) {
        self.close();
    }
}
