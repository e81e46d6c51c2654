// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

const DEFAULT_CAPACITY: usize = 64;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A user-facing message describing the outcome of a mutation.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receives mutation outcomes. How they reach the user is up to the
/// implementation.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => info!("{}", notice.message),
            NoticeLevel::Error => warn!("{}", notice.message),
        }
    }
}

/// Fans notices out to any number of subscribers.
///
/// Never blocks: with no subscribers a notice is dropped, and slow
/// subscribers lag instead of holding up the sender.
pub struct ChannelNotifier {
    tx: broadcast::Sender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }
}
