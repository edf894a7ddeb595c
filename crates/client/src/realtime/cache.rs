//! Read-only snapshots of a synchronized collection.

use std::sync::Arc;

use tokio::sync::watch;

/// Consumer handle to a synchronized collection.
///
/// The owning manager writes snapshots; consumers read them and await
/// changes. Snapshots are immutable - mutating the collection goes through
/// the manager's refetch cycle, never through a consumer.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    rx: watch::Receiver<Arc<Vec<T>>>,
}

impl<T> Collection<T> {
    /// The latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `false` once the manager has shut down and no further
    /// snapshots will arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// Create the writer/reader pair for one collection, starting empty.
pub(crate) fn collection_channel<T>() -> (watch::Sender<Arc<Vec<T>>>, Collection<T>) {
    let (tx, rx) = watch::channel(Arc::new(Vec::new()));
    (tx, Collection { rx })
}
