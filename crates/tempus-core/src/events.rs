//! Change notification channel
//!
//! Managers and sync workers announce "something changed, reload" through a
//! no-payload notification. The front end owns the receiving half and
//! re-queries the managers on its own thread; workers never touch UI-facing
//! state directly.

use std::sync::mpsc::{self, Receiver, Sender};

/// A no-payload change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Local data changed; cached lists should be reloaded
    Updated,
}

/// Sending half of the notification channel, cloned into every manager and
/// worker that needs to announce changes.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Sender<Notification>,
}

impl Notifier {
    /// Emit an `Updated` notification.
    ///
    /// A disconnected receiver is not an error; headless callers may drop
    /// the receiving half and poll the managers instead.
    pub fn updated(&self) {
        let _ = self.tx.send(Notification::Updated);
    }
}

/// Create a notification channel.
#[must_use]
pub fn channel() -> (Notifier, Receiver<Notification>) {
    let (tx, rx) = mpsc::channel();
    (Notifier { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updated_reaches_the_receiver() {
        let (notifier, rx) = channel();
        notifier.updated();
        assert_eq!(rx.try_recv(), Ok(Notification::Updated));
    }

    #[test]
    fn updated_ignores_a_dropped_receiver() {
        let (notifier, rx) = channel();
        drop(rx);
        notifier.updated();
    }

    #[test]
    fn notifier_clones_share_the_channel() {
        let (notifier, rx) = channel();
        let clone = notifier.clone();
        std::thread::spawn(move || clone.updated()).join().unwrap();
        assert_eq!(rx.recv(), Ok(Notification::Updated));
    }
}
