//! Tests for `WebhookClient` and its dispatcher.
//!
//! All async tests run with paused time, so waits complete instantly while
//! `Instant::now()` still advances by the exact amount slept.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::{HeaderMap, HeaderValue, StatusCode};
use tokio::sync::oneshot;
use tokio::time::Instant;

use super::bucket::{MAX_RESET_WAIT, MIN_RETRY_AFTER};
use super::{
    BackoffPolicy, ClientConfig, FailureCause, HttpClient, HttpError, HttpRequest, HttpResponse,
    SendError, WebhookClient, WebhookUrl,
};
use crate::message::{AllowedMentions, ValidationError, WebhookMessage};

type Reply = Result<HttpResponse, HttpError>;

/// Transport that plays back scripted replies and records every request.
///
/// Once the script runs out it answers `204 No Content`.
#[derive(Debug, Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(Instant, HttpRequest)>>,
    latency: Duration,
}

impl ScriptedClient {
    fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        })
    }

    fn with_latency(replies: Vec<Reply>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            latency,
            ..Self::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }
}

impl HttpClient for ScriptedClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.calls.lock().unwrap().push((Instant::now(), req));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| reply(204, &[], ""))
    }
}

fn reply(status: u16, headers: &[(&'static str, &'static str)], body: &str) -> Reply {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.insert(*name, HeaderValue::from_static(value));
    }
    Ok(HttpResponse::new(
        StatusCode::from_u16(status).unwrap(),
        map,
        body.as_bytes().to_vec(),
    ))
}

fn created(id: &str) -> Reply {
    reply(200, &[], &format!(r#"{{"id":"{id}"}}"#))
}

fn rate_limited(retry_after: &'static str) -> Reply {
    reply(429, &[("retry-after", retry_after)], "")
}

fn webhook_url() -> WebhookUrl {
    WebhookUrl::from_parts(1, "token").unwrap()
}

/// Short deterministic backoff: 100ms, 200ms, 400ms...
fn fast_config() -> ClientConfig {
    ClientConfig::new().with_backoff(
        BackoffPolicy::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(1))
            .with_jitter(0.0),
    )
}

fn start_client(transport: &Arc<ScriptedClient>, config: ClientConfig) -> WebhookClient {
    WebhookClient::new(webhook_url(), Arc::clone(transport), config)
}

fn body_json(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_slice(request.body.as_deref().unwrap()).unwrap()
}

mod delivery {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn resolves_in_submission_order() {
        let transport = ScriptedClient::new(vec![created("1"), created("2"), created("3")]);
        let client = start_client(&transport, fast_config());

        let handles: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|content| client.send_content(content).unwrap())
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            let receipt = handle.await.unwrap();
            assert_eq!(receipt.status, StatusCode::OK);
            assert_eq!(receipt.attempts, 1);
            ids.push(receipt.message_id.unwrap());
        }

        assert_eq!(ids, vec!["1", "2", "3"]);
        let contents: Vec<_> = transport
            .requests()
            .iter()
            .map(|request| body_json(request)["content"].clone())
            .collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn posts_json_with_wait_query() {
        let transport = ScriptedClient::new(vec![created("1")]);
        let client = start_client(&transport, fast_config());

        client.send_content("hello").unwrap().await.unwrap();

        let requests = transport.requests();
        let request = &requests[0];
        assert_eq!(request.method, http::Method::POST);
        assert_eq!(
            request.url.as_str(),
            "https://discord.com/api/webhooks/1/token?wait=true"
        );
        assert_eq!(
            request.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_json(request), serde_json::json!({"content": "hello"}));
    }

    #[tokio::test(start_paused = true)]
    async fn without_wait_receipt_has_no_message_id() {
        let transport = ScriptedClient::new(vec![reply(204, &[], "")]);
        let client = start_client(&transport, fast_config().with_wait(false));

        let receipt = client.send_content("fire and forget").unwrap().await.unwrap();

        assert_eq!(receipt.status, StatusCode::NO_CONTENT);
        assert_eq!(receipt.message_id, None);
        assert_eq!(transport.requests()[0].url.query(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn attachments_are_sent_as_multipart() {
        let transport = ScriptedClient::new(vec![created("1")]);
        let client = start_client(&transport, fast_config());

        client.send_file("report.txt", b"ok".to_vec()).unwrap().await.unwrap();

        let content_type = transport.requests()[0]
            .headers
            .get(http::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[tokio::test(start_paused = true)]
    async fn default_allowed_mentions_fill_unset_messages_only() {
        let transport = ScriptedClient::new(vec![]);
        let config = fast_config().with_allowed_mentions(AllowedMentions::none());
        let client = start_client(&transport, config);

        client.send_content("@everyone").unwrap().await.unwrap();
        let own = WebhookMessage::text("<@1>").with_allowed_mentions(AllowedMentions::all());
        client.send(&own).unwrap().await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            body_json(&requests[0])["allowed_mentions"],
            serde_json::json!({"parse": []})
        );
        assert_eq!(
            body_json(&requests[1])["allowed_mentions"],
            serde_json::json!({"parse": ["users", "roles", "everyone"]})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_senders_all_complete() {
        let transport = ScriptedClient::new(vec![]);
        let client = Arc::new(start_client(&transport, fast_config()));

        let tasks: Vec<_> = (0..10)
            .map(|i| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.send_content(format!("m{i}")).unwrap().await })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(transport.calls(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn with_id_posts_to_canonical_url() {
        let transport = ScriptedClient::new(vec![]);
        let client =
            WebhookClient::with_id(99, "abc", Arc::clone(&transport), fast_config()).unwrap();

        client.send_content("x").unwrap().await.unwrap();

        assert_eq!(client.url().id(), 99);
        assert!(
            transport.requests()[0]
                .url
                .as_str()
                .starts_with("https://discord.com/api/webhooks/99/abc")
        );
    }
}

mod rate_limits {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn rate_limited_request_waits_and_is_not_counted() {
        let transport = ScriptedClient::new(vec![rate_limited("3"), created("9")]);
        // No retries allowed: the 429 must not consume any.
        let client = start_client(&transport, fast_config().with_max_retries(0));

        let receipt = client.send_content("hi").unwrap().await.unwrap();

        assert_eq!(receipt.message_id.as_deref(), Some("9"));
        assert_eq!(receipt.attempts, 2);
        let times = transport.call_times();
        assert!(times[1] - times[0] >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_request_keeps_its_place() {
        let transport =
            ScriptedClient::new(vec![rate_limited("1"), created("a"), created("b")]);
        let client = start_client(&transport, fast_config());

        let first = client.send_content("first").unwrap();
        let second = client.send_content("second").unwrap();

        assert_eq!(first.await.unwrap().message_id.as_deref(), Some("a"));
        assert_eq!(second.await.unwrap().message_id.as_deref(), Some("b"));
        let contents: Vec<_> = transport
            .requests()
            .iter()
            .map(|request| body_json(request)["content"].clone())
            .collect();
        assert_eq!(contents, vec!["first", "first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_window_delays_next_send() {
        let exhausted = reply(
            200,
            &[
                ("x-ratelimit-remaining", "0"),
                ("x-ratelimit-limit", "5"),
                ("x-ratelimit-reset-after", "5"),
            ],
            r#"{"id":"1"}"#,
        );
        let transport = ScriptedClient::new(vec![exhausted, created("2")]);
        let client = start_client(&transport, fast_config());

        let first = client.send_content("a").unwrap();
        let second = client.send_content("b").unwrap();
        first.await.unwrap();
        second.await.unwrap();

        let times = transport.call_times();
        assert!(times[1] - times[0] >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_reflects_last_response() {
        let transport = ScriptedClient::new(vec![reply(
            200,
            &[
                ("x-ratelimit-remaining", "4"),
                ("x-ratelimit-limit", "5"),
                ("x-ratelimit-reset-after", "10"),
            ],
            "",
        )]);
        let client = start_client(&transport, fast_config());
        assert!(client.rate_limit().is_none());

        client.send_content("a").unwrap().await.unwrap();

        let snapshot = client.rate_limit().unwrap();
        assert_eq!(snapshot.remaining, 4);
        assert_eq!(snapshot.limit, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn endless_rate_limiting_fails_after_cap() {
        let transport = ScriptedClient::new((0..4).map(|_| rate_limited("0")).collect());
        let config = fast_config()
            .with_max_retries(0)
            .with_max_rate_limit_retries(3);
        let client = start_client(&transport, config);

        let stuck = client.send_content("stuck").unwrap();
        let next = client.send_content("next").unwrap();

        let err = stuck.await.unwrap_err();
        assert!(matches!(
            err,
            SendError::TransportFailure {
                attempts: 4,
                cause: FailureCause::RateLimited { hits: 4 },
            }
        ));
        assert!(next.await.is_ok());
        assert_eq!(transport.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retry_after_is_not_resent_immediately() {
        let transport = ScriptedClient::new(vec![rate_limited("0"), created("1")]);
        let client = start_client(&transport, fast_config());

        client.send_content("hi").unwrap().await.unwrap();

        let times = transport.call_times();
        assert!(times[1] - times[0] >= MIN_RETRY_AFTER);
    }

    #[tokio::test(start_paused = true)]
    async fn counted_failure_resets_rate_limit_streak() {
        let transport = ScriptedClient::new(vec![
            rate_limited("1"),
            Err(HttpError::Timeout),
            rate_limited("1"),
            created("5"),
        ]);
        let config = fast_config().with_max_rate_limit_retries(1);
        let client = start_client(&transport, config);

        let receipt = client.send_content("hi").unwrap().await.unwrap();

        assert_eq!(receipt.message_id.as_deref(), Some("5"));
        assert_eq!(receipt.attempts, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_reset_timestamp_is_clamped() {
        let far_future = reply(
            200,
            &[("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", "1e20")],
            r#"{"id":"1"}"#,
        );
        let transport = ScriptedClient::new(vec![far_future]);
        let client = start_client(&transport, fast_config());

        let first = client.send_content("a").unwrap();
        let second = client.send_content("b").unwrap();

        assert_eq!(first.await.unwrap().message_id.as_deref(), Some("1"));
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(transport.calls(), 1);
        assert_eq!(client.queue_len(), 1);
        let snapshot = client.rate_limit().unwrap();
        assert!(snapshot.reset_at <= Instant::now() + MAX_RESET_WAIT);

        client.close();
        assert!(matches!(second.await, Err(SendError::ClientClosed)));
    }
}

mod retries {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn two_timeouts_then_success() {
        let transport = ScriptedClient::new(vec![
            Err(HttpError::Timeout),
            Err(HttpError::Timeout),
            created("42"),
        ]);
        let client = start_client(&transport, fast_config().with_max_retries(2));

        let receipt = client.send_content("retry me").unwrap().await.unwrap();

        assert_eq!(receipt.message_id.as_deref(), Some("42"));
        assert_eq!(receipt.attempts, 3);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_fail_and_queue_proceeds() {
        let transport = ScriptedClient::new(vec![
            Err(HttpError::Timeout),
            Err(HttpError::Timeout),
            Err(HttpError::Timeout),
            created("next"),
        ]);
        let client = start_client(&transport, fast_config().with_max_retries(2));

        let doomed = client.send_content("a").unwrap();
        let after = client.send_content("b").unwrap();

        assert!(matches!(
            doomed.await,
            Err(SendError::TransportFailure {
                attempts: 3,
                cause: FailureCause::Http(HttpError::Timeout)
            })
        ));
        assert_eq!(after.await.unwrap().message_id.as_deref(), Some("next"));
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_spaces_out_retries() {
        let transport = ScriptedClient::new(vec![Err(HttpError::Timeout), created("1")]);
        let config = ClientConfig::new().with_backoff(
            BackoffPolicy::new()
                .with_initial_delay(Duration::from_secs(2))
                .with_jitter(0.0),
        );
        let client = start_client(&transport, config);

        client.send_content("a").unwrap().await.unwrap();

        let times = transport.call_times();
        assert!(times[1] - times[0] >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn server_error_is_retried() {
        let transport = ScriptedClient::new(vec![reply(502, &[], "bad gateway"), created("5")]);
        let client = start_client(&transport, fast_config());

        let receipt = client.send_content("a").unwrap().await.unwrap();

        assert_eq!(receipt.message_id.as_deref(), Some("5"));
        assert_eq!(receipt.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn server_error_exhaustion_reports_last_status() {
        let transport =
            ScriptedClient::new(vec![reply(500, &[], ""), reply(503, &[], "unavailable")]);
        let client = start_client(&transport, fast_config().with_max_retries(1));

        let err = client.send_content("a").unwrap().await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(matches!(
            err,
            SendError::TransportFailure { attempts: 2, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn client_error_is_rejected_immediately() {
        let transport = ScriptedClient::new(vec![reply(400, &[], "bad payload")]);
        let client = start_client(&transport, fast_config());

        let err = client.send_content("a").unwrap().await.unwrap_err();

        assert!(matches!(
            err,
            SendError::RejectedRequest { status, body: Some(ref body) }
                if status == StatusCode::BAD_REQUEST && body == "bad payload"
        ));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_url_is_not_retried() {
        let transport =
            ScriptedClient::new(vec![Err(HttpError::InvalidUrl("nope".to_string()))]);
        let client = start_client(&transport, fast_config());

        let err = client.send_content("a").unwrap().await.unwrap_err();

        assert!(matches!(
            err,
            SendError::TransportFailure {
                attempts: 1,
                cause: FailureCause::Http(HttpError::InvalidUrl(_))
            }
        ));
        assert_eq!(transport.calls(), 1);
    }
}

mod rejection {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn invalid_message_fails_synchronously() {
        let transport = ScriptedClient::new(vec![]);
        let client = start_client(&transport, fast_config());

        let result = client.send(&WebhookMessage::default());

        assert!(matches!(
            result,
            Err(SendError::Validation(ValidationError::Empty))
        ));
        assert_eq!(client.queue_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn full_queue_rejects_synchronously() {
        let transport = ScriptedClient::new(vec![]);
        let client = start_client(&transport, fast_config().with_max_queue_depth(1));

        let first = client.send_content("a").unwrap();
        let second = client.send_content("b");

        assert!(matches!(second, Err(SendError::QueueFull { depth: 1 })));
        assert!(first.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_message_expires() {
        let transport = ScriptedClient::new(vec![rate_limited("5")]);
        let config = fast_config().with_message_ttl(Duration::from_secs(1));
        let client = start_client(&transport, config);

        let err = client.send_content("late").unwrap().await.unwrap_err();

        assert!(matches!(err, SendError::Expired { queued_for } if queued_for >= Duration::from_secs(5)));
        assert_eq!(transport.calls(), 1);
    }
}

mod handles {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn cancel_before_dispatch_removes_request() {
        let transport = ScriptedClient::new(vec![]);
        let client = start_client(&transport, fast_config());

        let kept = client.send_content("kept").unwrap();
        let dropped = client.send_content("dropped").unwrap();

        assert!(dropped.cancel());
        assert!(kept.await.is_ok());
        assert!(matches!(dropped.await, Err(SendError::Cancelled)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_completion_has_no_effect() {
        let transport = ScriptedClient::new(vec![created("1")]);
        let client = start_client(&transport, fast_config());

        let mut handle = client.send_content("a").unwrap();
        assert!((&mut handle).await.is_ok());

        assert!(!handle.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_in_flight_returns_false() {
        let transport = ScriptedClient::with_latency(vec![created("1")], Duration::from_secs(1));
        let client = start_client(&transport, fast_config());

        let handle = client.send_content("a").unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!handle.cancel());
        assert!(handle.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_message_in_backoff_frees_the_queue() {
        let transport = ScriptedClient::new(vec![Err(HttpError::Timeout), created("2")]);
        let config = ClientConfig::new().with_backoff(
            BackoffPolicy::new()
                .with_initial_delay(Duration::from_secs(10))
                .with_max_delay(Duration::from_secs(10))
                .with_jitter(0.0),
        );
        let client = start_client(&transport, config);

        let backing_off = client.send_content("a").unwrap();
        let next = client.send_content("b").unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(transport.calls(), 1);

        assert!(backing_off.cancel());
        assert_eq!(next.await.unwrap().message_id.as_deref(), Some("2"));

        let times = transport.call_times();
        assert!(times[1] - times[0] < Duration::from_secs(2));
        assert!(matches!(backing_off.await, Err(SendError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn on_complete_receives_outcome() {
        let transport = ScriptedClient::new(vec![created("77")]);
        let client = start_client(&transport, fast_config());
        let (tx, rx) = oneshot::channel();

        client.send_content("a").unwrap().on_complete(move |outcome| {
            let _ = tx.send(outcome);
        });

        let receipt = rx.await.unwrap().unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("77"));
    }

    #[test]
    fn blocking_wait_from_sync_code() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let transport = ScriptedClient::new(vec![created("7")]);
        let client = WebhookClient::new_in(
            runtime.handle(),
            webhook_url(),
            Arc::clone(&transport),
            fast_config(),
        );

        let receipt = client.send_content("sync").unwrap().blocking_wait().unwrap();

        assert_eq!(receipt.message_id.as_deref(), Some("7"));
    }

    #[tokio::test(start_paused = true)]
    async fn handle_ids_are_unique() {
        let transport = ScriptedClient::new(vec![]);
        let client = start_client(&transport, fast_config());

        let a = client.send_content("a").unwrap();
        let b = client.send_content("b").unwrap();

        assert_ne!(a.id(), b.id());
    }
}

mod closing {
    use super::*;

    /// Transport with a bug: every call panics.
    struct PanickingClient;

    impl HttpClient for PanickingClient {
        async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
            panic!("transport bug")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dispatcher_failure_rejects_every_handle() {
        let client = WebhookClient::new(webhook_url(), PanickingClient, fast_config());

        let in_flight = client.send_content("a").unwrap();
        let queued = client.send_content("b").unwrap();

        assert!(matches!(in_flight.await, Err(SendError::ClientClosed)));
        assert!(matches!(queued.await, Err(SendError::ClientClosed)));
        assert!(client.is_closed());
        assert!(matches!(
            client.send_content("c"),
            Err(SendError::ClientClosed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn close_with_empty_queue() {
        let transport = ScriptedClient::new(vec![]);
        let client = start_client(&transport, fast_config());

        client.close();
        client.close();
        client.shutdown().await;

        assert!(client.is_closed());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn close_rejects_every_queued_message() {
        let transport = ScriptedClient::new(vec![]);
        let client = start_client(&transport, fast_config());

        let handles: Vec<_> = (0..3)
            .map(|i| client.send_content(format!("m{i}")).unwrap())
            .collect();
        client.close();

        for handle in handles {
            assert!(matches!(handle.await, Err(SendError::ClientClosed)));
        }
        assert_eq!(transport.calls(), 0);
        assert_eq!(client.queue_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn send_after_close_fails() {
        let transport = ScriptedClient::new(vec![]);
        let client = start_client(&transport, fast_config());

        client.close();

        assert!(matches!(
            client.send_content("late"),
            Err(SendError::ClientClosed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_lets_in_flight_request_finish() {
        let transport = ScriptedClient::with_latency(vec![created("1")], Duration::from_secs(1));
        let client = start_client(&transport, fast_config());

        let in_flight = client.send_content("a").unwrap();
        let queued = client.send_content("b").unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        client.shutdown().await;

        assert!(in_flight.await.is_ok());
        assert!(matches!(queued.await, Err(SendError::ClientClosed)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_close_is_rejected() {
        let transport = ScriptedClient::with_latency(vec![rate_limited("1")], Duration::from_secs(1));
        let client = start_client(&transport, fast_config());

        let handle = client.send_content("a").unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        client.shutdown().await;

        assert!(matches!(handle.await, Err(SendError::ClientClosed)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_client_closes_it() {
        let transport = ScriptedClient::new(vec![]);
        let client = start_client(&transport, fast_config());

        let handle = client.send_content("a").unwrap();
        drop(client);

        assert!(matches!(handle.await, Err(SendError::ClientClosed)));
        assert_eq!(transport.calls(), 0);
    }
}
