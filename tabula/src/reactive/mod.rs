//! Reactive query layer.
//!
//! Queries declare the tables they read. Whenever a transaction that
//! touched one of those tables commits, every subscription to the query is
//! woken and re-runs it against the latest committed state.
//!
//! Notifications are delivered on the writer's thread, after `COMMIT` and
//! while the connection lock is still held, so subscribers observe changes
//! in commit order. Delivery never blocks: a subscriber with a refresh
//! already pending simply keeps that one.

mod notifier;
mod query;

pub(crate) use notifier::ChangeNotifier;
pub use notifier::normalize_table;
pub use query::{Query, QueryObservable, Subscription};
