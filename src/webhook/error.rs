//! Error types for the transport and the send queue.

use std::time::Duration;

use thiserror::Error;

use crate::message::ValidationError;

/// Error type for transport operations.
///
/// Describes what went wrong without dictating recovery strategy;
/// the dispatcher decides whether to retry.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    ///
    /// This indicates a configuration error rather than a transient failure.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    /// Returns true if the failure is potentially transient.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            // Configuration issue; retrying cannot help
            Self::InvalidUrl(_) => false,
        }
    }
}

/// The last transient failure seen before retries ran out.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// The transport itself failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The server answered with a 5xx status.
    #[error("Server error {status}")]
    ServerError {
        /// The 5xx status code
        status: http::StatusCode,
        /// Response body, if it was valid UTF-8
        body: Option<String>,
    },

    /// The server kept answering 429 past the rate-limit retry cap.
    #[error("Still rate limited after {hits} consecutive 429 responses")]
    RateLimited {
        /// Consecutive 429 responses for this request
        hits: u32,
    },
}

/// Outcome of a failed send.
///
/// Transient conditions (transport failures, 5xx, rate limiting) are
/// retried inside the dispatcher and only show up here as
/// [`SendError::TransportFailure`] once retries run out. Everything else
/// surfaces immediately.
#[derive(Debug, Error)]
pub enum SendError {
    /// The message failed local validation before any network call.
    #[error("Invalid message: {0}")]
    Validation(#[from] ValidationError),

    /// The request kept failing transiently until retries were exhausted.
    #[error("Delivery failed after {attempts} attempt(s): {cause}")]
    TransportFailure {
        /// Total number of transport invocations for this request
        attempts: u32,
        /// The last failure observed
        #[source]
        cause: FailureCause,
    },

    /// The server rejected the request (4xx other than 429).
    ///
    /// The payload is presumed malformed or the webhook deleted; never retried.
    #[error("Request rejected with status {status}")]
    RejectedRequest {
        /// The rejecting status code
        status: http::StatusCode,
        /// Response body, if it was valid UTF-8
        body: Option<String>,
    },

    /// The queue reached its configured maximum depth.
    #[error("Send queue is full ({depth} pending)")]
    QueueFull {
        /// The configured maximum depth
        depth: usize,
    },

    /// The client was closed before the request could be sent.
    #[error("Webhook client is closed")]
    ClientClosed,

    /// The handle was cancelled before the request was dispatched.
    #[error("Send was cancelled")]
    Cancelled,

    /// The request waited in the queue longer than the configured message TTL.
    #[error("Message expired after waiting {queued_for:?} in the queue")]
    Expired {
        /// How long the request had been queued
        queued_for: Duration,
    },
}

impl SendError {
    /// Returns the HTTP status attached to this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::RejectedRequest { status, .. }
            | Self::TransportFailure {
                cause: FailureCause::ServerError { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

/// Error returned when a string is not a Discord webhook URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid webhook URL '{url}': {reason}")]
pub struct InvalidWebhookUrl {
    /// The rejected input
    pub url: String,
    /// Why it was rejected
    pub reason: &'static str,
}
