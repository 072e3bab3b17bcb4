//! Progress and status messages emitted by filters.
//!
//! A filter never prints. It hands [`FilterMessage`]s to the
//! [`MessageHandler`] it was given: [`TracingMessageHandler`] forwards them to
//! the log, [`ChannelMessageHandler`] to another thread.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Channel capacity for filter messages (filter → observer).
const MSG_CHANNEL_CAPACITY: usize = 1_024;

/// A message from a running filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterMessage {
    /// Free-form status text.
    Info(String),
    /// Work finished so far, out of `total` units.
    Progress { completed: u64, total: u64 },
    /// Something the user should know about, not an error.
    Warning(String),
}

impl FilterMessage {
    pub fn info(text: impl Into<String>) -> Self {
        FilterMessage::Info(text.into())
    }

    pub fn progress(completed: u64, total: u64) -> Self {
        FilterMessage::Progress { completed, total }
    }

    /// Progress in percent; 100 when there is nothing to do.
    pub fn percent(&self) -> Option<u8> {
        match self {
            FilterMessage::Progress { total: 0, .. } => Some(100),
            FilterMessage::Progress { completed, total } => {
                Some(((*completed).min(*total) * 100 / total) as u8)
            }
            _ => None,
        }
    }
}

/// Receiver of filter messages.
#[cfg_attr(test, mockall::automock)]
pub trait MessageHandler {
    fn send(&self, message: FilterMessage);
}

/// Forwards messages to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingMessageHandler {
    prefix: String,
}

impl TracingMessageHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every line, usually with the filter's human name.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl MessageHandler for TracingMessageHandler {
    fn send(&self, message: FilterMessage) {
        match &message {
            FilterMessage::Info(text) => tracing::info!("{}{}", self.prefix, text),
            FilterMessage::Progress { completed, total } => {
                tracing::debug!("{}progress {}/{}", self.prefix, completed, total)
            }
            FilterMessage::Warning(text) => tracing::warn!("{}{}", self.prefix, text),
        }
    }
}

/// Sends messages over a bounded crossbeam channel.
///
/// When the channel is full the message is dropped; progress updates are
/// superseded by later ones anyway.
#[derive(Debug, Clone)]
pub struct ChannelMessageHandler {
    tx: Sender<FilterMessage>,
}

impl ChannelMessageHandler {
    /// Create a handler and the receiving end for the observer.
    pub fn new() -> (Self, Receiver<FilterMessage>) {
        let (tx, rx) = bounded(MSG_CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }

    pub fn from_sender(tx: Sender<FilterMessage>) -> Self {
        Self { tx }
    }
}

impl MessageHandler for ChannelMessageHandler {
    fn send(&self, message: FilterMessage) {
        match self.tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::trace!("Message channel full, dropping {:?}", dropped)
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_handler_delivers() {
        let (handler, rx) = ChannelMessageHandler::new();
        handler.send(FilterMessage::info("hello"));
        handler.send(FilterMessage::progress(1, 4));
        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1].percent(), Some(25));
    }

    #[test]
    fn test_channel_handler_survives_disconnect() {
        let (handler, rx) = ChannelMessageHandler::new();
        drop(rx);
        handler.send(FilterMessage::info("nobody listens"));
    }

    #[test]
    fn test_percent() {
        assert_eq!(FilterMessage::progress(0, 0).percent(), Some(100));
        assert_eq!(FilterMessage::progress(5, 4).percent(), Some(100));
        assert_eq!(FilterMessage::info("x").percent(), None);
    }
}
