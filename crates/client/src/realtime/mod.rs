//! Realtime synchronization for server-owned collections.
//!
//! Each watched record type gets a manager owning one cached collection.
//! The subscription-driven [`SyncManager`] walks the phases
//! `Idle → Subscribing → Subscribed → (change event) Refetching → Subscribed`,
//! performing a **full refetch** on any change notification rather than
//! applying the diff. That trades efficiency for simplicity and is fine at
//! this catalog's size; it does not scale to large tables.
//!
//! When subscriptions are unavailable, [`PollingManager`] degrades to a
//! fixed-interval refetch loop with a shorter retry interval after failures.
//!
//! Refetches are not guaranteed to complete in notification order. Each
//! completed refetch overwrites the cache as the authoritative snapshot at
//! its completion time (last-writer-by-completion-time wins). Consumers hold
//! read-only [`Collection`] snapshots; only the manager writes.

mod cache;
mod polling;
mod sources;
mod watcher;

pub use cache::Collection;
pub use polling::PollingManager;
pub use sources::{ActiveBanners, ActiveCategories, ActiveProducts};
pub use watcher::SyncManager;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::gateway::RemoteError;

/// Kind of a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A change notification for the watched table.
///
/// No payload diff is consumed: any event means the collection is stale and
/// triggers a full refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// What happened to some row of the watched table.
    pub kind: ChangeKind,
}

/// Phase of a subscription-driven manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// Not subscribed; a retry may be scheduled.
    #[default]
    Idle,
    /// Subscription attempt in flight.
    Subscribing,
    /// Subscribed and up to date.
    Subscribed,
    /// Subscribed with a refetch in flight.
    Refetching,
}

/// Full-collection read used for hydration and refetches.
///
/// Implemented per record type over the gateway (see [`sources`]); tests
/// substitute in-memory fakes.
#[async_trait]
pub trait CollectionSource<T>: Send + Sync {
    /// Fetch the authoritative collection.
    async fn fetch(&self) -> Result<Vec<T>, RemoteError>;
}

/// A backend push channel delivering change notifications.
#[async_trait]
pub trait ChangeFeed: Send {
    /// Connect and return the event stream.
    ///
    /// # Errors
    ///
    /// Returns an error when the subscription cannot be established; the
    /// manager schedules a retry.
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<ChangeEvent>, RemoteError>;
}

/// Pass-through feed over a channel some transport writes into.
///
/// The hosted backend's push channel is consumed as a black box: whatever
/// delivers its events (a websocket task, a bridge from the embedding app)
/// holds the sender half and this feed hands the receiver to the manager.
pub struct ChannelFeed {
    rx: Option<mpsc::Receiver<ChangeEvent>>,
}

impl ChannelFeed {
    /// Create a feed and the sender its transport writes into.
    #[must_use]
    pub fn new(buffer: usize) -> (mpsc::Sender<ChangeEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx: Some(rx) })
    }
}

#[async_trait]
impl ChangeFeed for ChannelFeed {
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<ChangeEvent>, RemoteError> {
        self.rx
            .take()
            .ok_or_else(|| RemoteError::NotFound("change feed already consumed".to_string()))
    }
}
