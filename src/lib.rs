//! discord-webhooks: rate-limit aware Discord webhook client
//!
//! A library for posting messages to Discord webhooks. Messages are
//! queued per webhook and delivered in order, waiting out the server's
//! rate-limit windows and retrying transient failures, with a completion
//! handle for every message.

pub mod config;
pub mod message;
pub mod time;
pub mod webhook;
