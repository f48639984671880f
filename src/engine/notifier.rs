//! Change Notifier
//!
//! Single-slot, lossy hand-off of changes to one observer. Publishing
//! never blocks: when the slot is still full the new change is dropped.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::trace;

use crate::game::events::Change;

/// Producer side.
#[derive(Clone, Debug)]
pub struct ChangeNotifier {
    tx: mpsc::Sender<Change>,
}

/// Consumer side.
#[derive(Debug)]
pub struct ChangeStream {
    rx: mpsc::Receiver<Change>,
}

/// Create a connected notifier and stream.
pub fn channel() -> (ChangeNotifier, ChangeStream) {
    let (tx, rx) = mpsc::channel(1);
    (ChangeNotifier { tx }, ChangeStream { rx })
}

impl ChangeNotifier {
    /// Offer a change. Returns false if it was dropped.
    pub fn publish(&self, change: Change) -> bool {
        match self.tx.try_send(change) {
            Ok(()) => true,
            Err(TrySendError::Full(change)) => {
                trace!(?change, "Change stream full, dropping");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

impl ChangeStream {
    /// Wait for the next change. `None` once every notifier is gone.
    pub async fn recv(&mut self) -> Option<Change> {
        self.rx.recv().await
    }

    /// Take the pending change, if any.
    pub fn try_recv(&mut self) -> Option<Change> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_full_slot_drops_newest() {
        let (notifier, mut stream) = channel();
        assert!(notifier.publish(Change::RoundStart { round: 1 }));
        assert!(!notifier.publish(Change::RoundStart { round: 2 }));

        assert_eq!(stream.recv().await, Some(Change::RoundStart { round: 1 }));
        assert_eq!(stream.try_recv(), None);

        // Slot is free again
        assert!(notifier.publish(Change::RoundStart { round: 3 }));
        assert_eq!(stream.try_recv(), Some(Change::RoundStart { round: 3 }));
    }

    #[tokio::test]
    async fn test_closed_stream() {
        let (notifier, stream) = channel();
        drop(stream);
        assert!(!notifier.publish(Change::RoundStart { round: 1 }));

        let (notifier, mut stream) = channel();
        drop(notifier);
        assert_eq!(stream.recv().await, None);
    }
}
