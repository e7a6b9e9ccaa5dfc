//! Wire-level request and response types plus the [`HttpClient`] seam.
//!
//! The dispatcher builds one [`HttpRequest`] per attempt from an encoded
//! payload and reads status, rate-limit headers and body back out of the
//! [`HttpResponse`]. Anything that can move those across the network can
//! stand in as the transport.

use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method, StatusCode};

use super::HttpError;
use crate::message::EncodedPayload;

/// A webhook execution request, ready for the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Always POST for webhook execution
    pub method: Method,
    /// Execute URL; the webhook token is part of the path
    pub url: url::Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// An empty POST to `url`.
    #[must_use]
    pub fn post(url: url::Url) -> Self {
        Self {
            method: Method::POST,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// A POST carrying an encoded message, JSON or multipart.
    #[must_use]
    pub fn execute(url: url::Url, payload: &EncodedPayload) -> Self {
        Self::post(url)
            .with_content_type(payload.content_type.clone())
            .with_body(payload.body.clone())
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets `Content-Type`, replacing any previous value.
    #[must_use]
    pub fn with_content_type(mut self, value: HeaderValue) -> Self {
        self.headers.insert(CONTENT_TYPE, value);
        self
    }
}

/// What the webhook endpoint answered, body fully buffered.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// Carries the `X-RateLimit-*` and `Retry-After` headers the bucket reads
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// 2xx: the message was posted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 429: the rate limit was exceeded and the request must be replayed.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }

    /// 5xx or 408: the server failed, the payload may still be fine.
    #[must_use]
    pub fn is_transient_failure(&self) -> bool {
        self.status.is_server_error() || self.status == StatusCode::REQUEST_TIMEOUT
    }

    /// Body as UTF-8, for error reports.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// A header value with surrounding whitespace trimmed.
    ///
    /// Missing headers and values that are not visible ASCII yield `None`.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    }
}

/// Moves one [`HttpRequest`] to the endpoint and returns its answer.
///
/// The dispatcher calls it once per attempt and never concurrently for the
/// same client. Failures are reported, not retried; retry policy lives in
/// the dispatcher.
///
/// # Example
///
/// ```ignore
/// use discord_webhooks::webhook::{HttpClient, HttpRequest, HttpResponse, HttpError};
///
/// struct NoContent;
///
/// impl HttpClient for NoContent {
///     async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
///         Ok(HttpResponse::new(http::StatusCode::NO_CONTENT, http::HeaderMap::new(), vec![]))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends the request.
    ///
    /// # Errors
    ///
    /// [`HttpError::Connection`] and [`HttpError::Timeout`] are retried by
    /// the dispatcher; [`HttpError::InvalidUrl`] fails the message at once.
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send;
}

impl<T: HttpClient> HttpClient for Arc<T> {
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send {
        (**self).request(req)
    }
}
