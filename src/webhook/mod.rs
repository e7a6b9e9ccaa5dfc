//! Webhook delivery: transport, rate limiting, queueing, and the client.
//!
//! This module provides:
//! - HTTP request/response types and the transport trait ([`HttpRequest`],
//!   [`HttpResponse`], [`HttpClient`])
//! - The production transport ([`ReqwestClient`])
//! - Rate-limit tracking ([`RateLimitBucket`])
//! - The client and its completion handles ([`WebhookClient`], [`SendHandle`])
//! - Retry backoff configuration ([`BackoffPolicy`])

mod backoff;
pub mod bucket;
mod client;
mod dispatcher;
mod error;
mod handle;
mod http;
mod options;
mod queue;
mod transport;
mod url;

#[cfg(test)]
mod backoff_tests;
#[cfg(test)]
mod client_tests;

pub use backoff::BackoffPolicy;
pub use bucket::{RateLimitBucket, RateLimitSnapshot};
pub use client::WebhookClient;
pub use error::{FailureCause, HttpError, InvalidWebhookUrl, SendError};
pub use handle::{SendHandle, SendOutcome, SendReceipt};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use options::{ClientConfig, DEFAULT_MAX_RATE_LIMIT_RETRIES, DEFAULT_MAX_RETRIES};
pub use queue::SendQueue;
pub use transport::{ReqwestClient, USER_AGENT};
pub use url::WebhookUrl;
