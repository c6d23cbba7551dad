//! Table change notification fan-out.
//!
//! Every subscriber owns a bounded channel of capacity one. A pending token
//! means "re-run your query"; a full channel means a refresh is already
//! pending, so further writes coalesce into it. Delivery uses `try_send`
//! and never blocks the writer.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

/// Normalizes a table name for matching.
///
/// `SQLite` table names are case-insensitive, so triggers and subscriptions
/// compare lowercase names.
#[must_use]
pub fn normalize_table(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

struct Subscriber {
    id: u64,
    tables: BTreeSet<String>,
    wake: SyncSender<()>,
}

#[derive(Default)]
struct Registry {
    closed: bool,
    subscribers: Vec<Subscriber>,
}

/// Routes committed table changes to subscribed queries.
#[derive(Default)]
pub(crate) struct ChangeNotifier {
    next_id: AtomicU64,
    registry: Mutex<Registry>,
}

impl ChangeNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers interest in `tables`.
    ///
    /// The returned receiver already holds one token so the first refresh
    /// happens without waiting for a write.
    pub(crate) fn subscribe(&self, tables: BTreeSet<String>) -> Result<(u64, Receiver<()>)> {
        let mut registry = self.registry();
        if registry.closed {
            return Err(Error::UseAfterClose);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (wake, receiver) = mpsc::sync_channel(1);
        // A fresh channel has room for exactly this token
        let _ = wake.try_send(());

        registry.subscribers.push(Subscriber { id, tables, wake });
        Ok((id, receiver))
    }

    pub(crate) fn unsubscribe(&self, id: u64) {
        self.registry().subscribers.retain(|s| s.id != id);
    }

    /// Wakes every subscriber interested in any of `changed`.
    ///
    /// Returns how many subscribers had a new refresh queued; subscribers
    /// whose refresh was already pending are not counted.
    pub(crate) fn notify(&self, changed: &BTreeSet<String>) -> usize {
        self.deliver(|subscriber| !subscriber.tables.is_disjoint(changed))
    }

    /// Wakes every subscriber regardless of tables.
    pub(crate) fn notify_all(&self) -> usize {
        self.deliver(|_| true)
    }

    fn deliver(&self, interested: impl Fn(&Subscriber) -> bool) -> usize {
        let mut queued = 0;
        self.registry().subscribers.retain(|subscriber| {
            if !interested(subscriber) {
                return true;
            }
            match subscriber.wake.try_send(()) {
                Ok(()) => {
                    queued += 1;
                    true
                }
                Err(TrySendError::Full(())) => true,
                Err(TrySendError::Disconnected(())) => false,
            }
        });
        queued
    }

    /// Ends every subscription and rejects new ones.
    pub(crate) fn close(&self) {
        let mut registry = self.registry();
        registry.closed = true;
        registry.subscribers.clear();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.registry().closed
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.registry().subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| normalize_table(n)).collect()
    }

    #[test]
    fn test_normalize_table() {
        assert_eq!(normalize_table(" Users "), "users");
        assert_eq!(normalize_table("posts"), "posts");
    }

    #[test]
    fn test_subscribe_has_initial_token() {
        let notifier = ChangeNotifier::new();
        let (_, rx) = notifier.subscribe(tables(&["users"])).unwrap();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_notify_only_interested() {
        let notifier = ChangeNotifier::new();
        let (_, users) = notifier.subscribe(tables(&["users"])).unwrap();
        let (_, posts) = notifier.subscribe(tables(&["posts"])).unwrap();
        users.try_recv().unwrap();
        posts.try_recv().unwrap();

        assert_eq!(notifier.notify(&tables(&["users"])), 1);
        assert!(users.try_recv().is_ok());
        assert!(posts.try_recv().is_err());
    }

    #[test]
    fn test_bursts_coalesce() {
        let notifier = ChangeNotifier::new();
        let (_, rx) = notifier.subscribe(tables(&["users"])).unwrap();
        rx.try_recv().unwrap();

        assert_eq!(notifier.notify(&tables(&["users"])), 1);
        assert_eq!(notifier.notify(&tables(&["users"])), 0);
        assert_eq!(notifier.notify(&tables(&["users"])), 0);

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let notifier = ChangeNotifier::new();
        let (_, rx) = notifier.subscribe(tables(&["users"])).unwrap();
        drop(rx);
        assert_eq!(notifier.subscriber_count(), 1);

        notifier.notify(&tables(&["users"]));
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let notifier = ChangeNotifier::new();
        let (id, _rx) = notifier.subscribe(tables(&["users"])).unwrap();
        notifier.unsubscribe(id);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_notify_all() {
        let notifier = ChangeNotifier::new();
        let (_, a) = notifier.subscribe(tables(&["users"])).unwrap();
        let (_, b) = notifier.subscribe(tables(&["posts"])).unwrap();
        a.try_recv().unwrap();
        b.try_recv().unwrap();

        assert_eq!(notifier.notify_all(), 2);
    }

    #[test]
    fn test_close_disconnects_and_rejects() {
        let notifier = ChangeNotifier::new();
        let (_, rx) = notifier.subscribe(tables(&["users"])).unwrap();
        rx.try_recv().unwrap();

        notifier.close();
        assert!(matches!(
            rx.recv(),
            Err(mpsc::RecvError)
        ));
        assert!(matches!(
            notifier.subscribe(tables(&["users"])),
            Err(Error::UseAfterClose)
        ));
    }
}
