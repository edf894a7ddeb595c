//! Subscription-driven synchronization manager.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::notify::{Severity, SharedNotifier};

use super::cache::{Collection, collection_channel};
use super::{ChangeFeed, CollectionSource, SyncPhase};

/// Delay before retrying a failed subscription attempt.
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// Background manager that keeps one collection in sync with the backend
/// through change notifications.
///
/// Spawned per watched record type. Any notification triggers a full
/// refetch; refetch tasks run concurrently and each completion overwrites
/// the cache (last completion wins). Dropping the manager via [`shutdown`]
/// disconnects the subscription, stops pending timers, and discards
/// in-flight refetch results.
///
/// [`shutdown`]: SyncManager::shutdown
pub struct SyncManager {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
    phase_rx: watch::Receiver<SyncPhase>,
}

impl SyncManager {
    /// Spawn a manager for one record type.
    ///
    /// Returns the consumer [`Collection`] and the manager handle. The
    /// collection starts empty and fills on the first refetch after
    /// subscribing.
    pub fn spawn<T, F>(
        source: Arc<dyn CollectionSource<T>>,
        feed: F,
        notifier: SharedNotifier,
    ) -> (Collection<T>, Self)
    where
        T: Clone + Send + Sync + 'static,
        F: ChangeFeed + 'static,
    {
        let (tx, collection) = collection_channel();
        let (phase_tx, phase_rx) = watch::channel(SyncPhase::Idle);
        let shutdown = CancellationToken::new();

        let worker = Worker {
            source,
            tx,
            phase_tx,
            notifier,
            shutdown: shutdown.clone(),
        };
        let handle = tokio::spawn(worker.run(feed));

        (
            collection,
            Self {
                shutdown,
                handle,
                phase_rx,
            },
        )
    }

    /// The manager's current phase.
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        *self.phase_rx.borrow()
    }

    /// Stop the manager: disconnect the subscription, cancel pending
    /// timers, and discard in-flight refetch results.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.handle.await;
    }
}

struct Worker<T> {
    source: Arc<dyn CollectionSource<T>>,
    tx: watch::Sender<Arc<Vec<T>>>,
    phase_tx: watch::Sender<SyncPhase>,
    notifier: SharedNotifier,
    shutdown: CancellationToken,
}

impl<T: Clone + Send + Sync + 'static> Worker<T> {
    async fn run<F: ChangeFeed>(self, mut feed: F) {
        loop {
            self.set_phase(SyncPhase::Subscribing);

            let mut events = tokio::select! {
                () = self.shutdown.cancelled() => return,
                result = feed.subscribe() => match result {
                    Ok(events) => events,
                    Err(e) => {
                        tracing::warn!(error = %e, "subscription failed, retrying");
                        self.set_phase(SyncPhase::Idle);
                        tokio::select! {
                            () = self.shutdown.cancelled() => return,
                            () = tokio::time::sleep(RESUBSCRIBE_DELAY) => continue,
                        }
                    }
                },
            };

            self.set_phase(SyncPhase::Subscribed);
            // Hydrate: the collection is stale (or empty) after any
            // subscription gap
            self.spawn_refetch();

            loop {
                tokio::select! {
                    () = self.shutdown.cancelled() => return,
                    event = events.recv() => match event {
                        Some(event) => {
                            tracing::debug!(kind = ?event.kind, "change notification, refetching");
                            self.set_phase(SyncPhase::Refetching);
                            self.spawn_refetch();
                        }
                        // Feed closed underneath us; go resubscribe
                        None => break,
                    },
                }
            }
        }
    }

    /// Run a full refetch off the event loop so a slow fetch never blocks
    /// notification handling. Results landing after shutdown are discarded.
    fn spawn_refetch(&self) {
        let source = self.source.clone();
        let tx = self.tx.clone();
        let phase_tx = self.phase_tx.clone();
        let notifier = self.notifier.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                () = shutdown.cancelled() => return,
                result = source.fetch() => result,
            };
            if shutdown.is_cancelled() {
                return;
            }
            match result {
                Ok(items) => {
                    let _ = tx.send(Arc::new(items));
                    let _ = phase_tx.send(SyncPhase::Subscribed);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "refetch failed");
                    notifier.notify(Severity::Warning, "Could not refresh the catalog");
                    let _ = phase_tx.send(SyncPhase::Subscribed);
                }
            }
        });
    }

    fn set_phase(&self, phase: SyncPhase) {
        let _ = self.phase_tx.send(phase);
    }
}
