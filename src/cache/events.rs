//! Eviction Notifications
//!
//! Bounded channel that reports keys leaving the in-memory index.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// Why an item left memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// Write age exceeded the TTL; the backing file was deleted too
    Expired,
    /// Dropped to respect `max_items`; the backing file is kept
    Capacity,
}

/// A key removed from the cache by the cache itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    pub key: String,
    pub reason: EvictionReason,
}

// == Notifier ==
/// Sending half. Never blocks: events that do not fit are dropped.
#[derive(Debug)]
pub(crate) struct EvictionNotifier {
    tx: Option<mpsc::Sender<Eviction>>,
}

impl EvictionNotifier {
    /// Creates the channel, or a disabled notifier when `pipe_size` is zero.
    pub(crate) fn channel(pipe_size: usize) -> (Self, Option<mpsc::Receiver<Eviction>>) {
        if pipe_size == 0 {
            return (Self { tx: None }, None);
        }

        let (tx, rx) = mpsc::channel(pipe_size);
        (Self { tx: Some(tx) }, Some(rx))
    }

    pub(crate) fn notify(&self, key: &str, reason: EvictionReason) {
        let Some(tx) = &self.tx else {
            return;
        };

        let event = Eviction {
            key: key.to_string(),
            reason,
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!(key = %event.key, "Eviction channel full, dropping notification");
            }
            // Nobody is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_channel() {
        let (notifier, rx) = EvictionNotifier::channel(0);
        assert!(rx.is_none());
        notifier.notify("k", EvictionReason::Expired);
    }

    #[test]
    fn test_notify_delivers() {
        let (notifier, rx) = EvictionNotifier::channel(2);
        let mut rx = rx.unwrap();

        notifier.notify("a", EvictionReason::Expired);
        notifier.notify("b", EvictionReason::Capacity);

        assert_eq!(
            rx.try_recv().unwrap(),
            Eviction {
                key: "a".to_string(),
                reason: EvictionReason::Expired
            }
        );
        assert_eq!(rx.try_recv().unwrap().reason, EvictionReason::Capacity);
    }

    #[test]
    fn test_full_channel_drops() {
        let (notifier, rx) = EvictionNotifier::channel(1);
        let mut rx = rx.unwrap();

        notifier.notify("a", EvictionReason::Expired);
        notifier.notify("b", EvictionReason::Expired);

        assert_eq!(rx.try_recv().unwrap().key, "a");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (notifier, rx) = EvictionNotifier::channel(1);
        drop(rx);
        notifier.notify("a", EvictionReason::Capacity);
    }
}
