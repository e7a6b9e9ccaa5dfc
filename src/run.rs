//! Application execution logic.
//!
//! This module turns the validated configuration into webhook messages,
//! pushes them through a single [`WebhookClient`], and waits for every
//! delivery outcome before shutting the client down.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::signal;

use discord_webhooks::config::ValidatedConfig;
use discord_webhooks::message::{Attachment, WebhookMessage};
use discord_webhooks::webhook::{HttpError, ReqwestClient, SendHandle, WebhookClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// An attachment could not be read from disk.
    #[error("Failed to read file '{}': {source}", path.display())]
    FileRead {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to build the HTTP transport.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] HttpError),

    /// At least one message was not delivered.
    #[error("{failed} of {total} message(s) failed to send")]
    Undelivered {
        /// Number of messages that failed
        failed: usize,
        /// Number of messages attempted
        total: usize,
    },

    /// Ctrl+C arrived before every message was delivered.
    #[error("Interrupted before all messages were delivered")]
    Interrupted,
}

/// Sends every configured message and reports the outcome.
///
/// This function:
/// 1. Reads the attachments named on the command line
/// 2. Builds one message per `--content` value
/// 3. Queues them all on one client, so rate limits are shared
/// 4. Waits for each outcome, or closes the client on Ctrl+C
///
/// # Errors
///
/// Returns an error if an attachment cannot be read, the transport
/// cannot be created, any message fails, or the run is interrupted.
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let attachments = read_attachments(&config.files)?;
    let messages = build_messages(&config, attachments);

    let transport = ReqwestClient::with_timeout(config.timeout).map_err(RunError::HttpClient)?;
    let client = WebhookClient::new(config.url, transport, config.client);

    tracing::info!("Sending {} message(s) to {}", messages.len(), client.url());

    let outcome = tokio::select! {
        result = deliver(&client, &messages) => result,
        _ = signal::ctrl_c() => {
            tracing::warn!("Received Ctrl+C, discarding queued messages");
            client.close();
            Err(RunError::Interrupted)
        }
    };

    client.shutdown().await;
    outcome
}

/// Queues `messages` on `client` and waits for all of them.
///
/// A message rejected at send time (validation, full queue) counts as a
/// failure; the rest are still delivered.
async fn deliver(client: &WebhookClient, messages: &[WebhookMessage]) -> Result<(), RunError> {
    let total = messages.len();
    let mut failed = 0;
    let mut pending: Vec<(usize, SendHandle)> = Vec::with_capacity(total);

    for (index, message) in messages.iter().enumerate() {
        match client.send(message) {
            Ok(handle) => pending.push((index + 1, handle)),
            Err(e) => {
                tracing::error!("Message {} rejected: {e}", index + 1);
                failed += 1;
            }
        }
    }

    for (number, handle) in pending {
        match handle.await {
            Ok(receipt) => tracing::info!(
                "Message {number} delivered (status {}, id {}, attempts {})",
                receipt.status,
                receipt.message_id.as_deref().unwrap_or("-"),
                receipt.attempts
            ),
            Err(e) => {
                tracing::error!("Message {number} failed: {e}");
                failed += 1;
            }
        }
    }

    if failed == 0 {
        Ok(())
    } else {
        Err(RunError::Undelivered { failed, total })
    }
}

/// Builds the messages to send, in order.
///
/// Files ride on the last text message; with no text they form a
/// message of their own.
fn build_messages(config: &ValidatedConfig, attachments: Vec<Attachment>) -> Vec<WebhookMessage> {
    let mut messages: Vec<WebhookMessage> = config
        .contents
        .iter()
        .map(|content| decorate(config, WebhookMessage::text(content.as_str())))
        .collect();

    if !attachments.is_empty() {
        match messages.last_mut() {
            Some(last) => last.attachments.extend(attachments),
            None => messages.push(decorate(
                config,
                WebhookMessage {
                    attachments,
                    ..WebhookMessage::default()
                },
            )),
        }
    }

    messages
}

fn decorate(config: &ValidatedConfig, mut message: WebhookMessage) -> WebhookMessage {
    if let Some(username) = &config.username {
        message = message.with_username(username.as_str());
    }
    if let Some(avatar_url) = &config.avatar_url {
        message = message.with_avatar_url(avatar_url.as_str());
    }
    message.with_tts(config.tts)
}

/// Reads each file into an attachment named after its final path component.
fn read_attachments(paths: &[PathBuf]) -> Result<Vec<Attachment>, RunError> {
    paths
        .iter()
        .map(|path| {
            let data = std::fs::read(path).map_err(|source| RunError::FileRead {
                path: path.clone(),
                source,
            })?;
            Ok(Attachment::new(attachment_name(path), data))
        })
        .collect()
}

fn attachment_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || "file".to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
