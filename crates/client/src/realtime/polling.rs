//! Polling fallback for environments without change subscriptions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::notify::{Severity, SharedNotifier};

use super::cache::{Collection, collection_channel};
use super::CollectionSource;

/// Background manager that refetches one collection on a fixed interval.
///
/// The degraded variant of the realtime manager: no subscription, just a
/// timer. After a failed fetch the loop switches to the shorter retry
/// interval until a fetch succeeds, then resumes the normal cadence.
/// [`shutdown`] stops the pending timer and discards any in-flight fetch.
///
/// [`shutdown`]: PollingManager::shutdown
pub struct PollingManager {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollingManager {
    /// Spawn a polling manager.
    ///
    /// `interval` is the normal cadence (10 s by default), `retry_interval`
    /// the shorter one used after a failure (5 s). The first fetch runs
    /// immediately.
    pub fn spawn<T>(
        source: Arc<dyn CollectionSource<T>>,
        interval: Duration,
        retry_interval: Duration,
        notifier: SharedNotifier,
    ) -> (Collection<T>, Self)
    where
        T: Clone + Send + Sync + 'static,
    {
        let (tx, collection) = collection_channel();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        let handle = tokio::spawn(async move {
            poll_loop(source, tx, interval, retry_interval, notifier, token).await;
        });

        (collection, Self { shutdown, handle })
    }

    /// Stop the manager: cancel the pending timer and discard any in-flight
    /// fetch result.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.handle.await;
    }
}

async fn poll_loop<T: Clone + Send + Sync>(
    source: Arc<dyn CollectionSource<T>>,
    tx: watch::Sender<Arc<Vec<T>>>,
    interval: Duration,
    retry_interval: Duration,
    notifier: SharedNotifier,
    shutdown: CancellationToken,
) {
    // First fetch immediately, then pace by outcome
    let mut delay = Duration::ZERO;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => return,
            () = tokio::time::sleep(delay) => {}
        }

        let result = tokio::select! {
            () = shutdown.cancelled() => return,
            result = source.fetch() => result,
        };

        match result {
            Ok(items) => {
                let _ = tx.send(Arc::new(items));
                delay = interval;
            }
            Err(e) => {
                tracing::warn!(error = %e, retry_secs = retry_interval.as_secs(), "poll failed, retrying sooner");
                notifier.notify(Severity::Warning, "Could not refresh the catalog");
                delay = retry_interval;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::RemoteError;
    use crate::notify::TracingNotifier;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    const NORMAL: Duration = Duration::from_secs(10);
    const RETRY: Duration = Duration::from_secs(5);

    /// Source that fails its first `failures` fetches, recording the instant
    /// of every call.
    struct ScriptedSource {
        failures: AtomicUsize,
        calls: Mutex<Vec<Instant>>,
        rows: Vec<u32>,
    }

    impl ScriptedSource {
        fn new(failures: usize, rows: Vec<u32>) -> Arc<Self> {
            Arc::new(Self {
                failures: AtomicUsize::new(failures),
                calls: Mutex::new(Vec::new()),
                rows,
            })
        }

        fn call_offsets(&self, origin: Instant) -> Vec<Duration> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|at| *at - origin)
                .collect()
        }
    }

    #[async_trait]
    impl CollectionSource<u32> for ScriptedSource {
        async fn fetch(&self) -> Result<Vec<u32>, RemoteError> {
            self.calls.lock().unwrap().push(Instant::now());
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(RemoteError::Backend {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(self.rows.clone())
        }
    }

    fn notifier() -> SharedNotifier {
        Arc::new(TracingNotifier)
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_polls_keep_normal_interval() {
        let origin = Instant::now();
        let source = ScriptedSource::new(0, vec![1]);
        let (mut collection, manager) =
            PollingManager::spawn(source.clone(), NORMAL, RETRY, notifier());

        assert!(collection.changed().await);
        assert_eq!(*collection.snapshot(), vec![1]);

        tokio::time::sleep(Duration::from_secs(25)).await;
        manager.shutdown().await;

        // Fetches at 0s, 10s, 20s
        let offsets = source.call_offsets(origin);
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_secs(10),
                Duration::from_secs(20),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_failures_retry_then_resume_normal_interval() {
        let origin = Instant::now();
        let source = ScriptedSource::new(3, vec![4, 2]);
        let (mut collection, manager) =
            PollingManager::spawn(source.clone(), NORMAL, RETRY, notifier());

        // First snapshot only lands once the fourth attempt succeeds
        assert!(collection.changed().await);
        assert_eq!(*collection.snapshot(), vec![4, 2]);

        tokio::time::sleep(Duration::from_secs(21)).await;
        manager.shutdown().await;

        // Failures at 0s, 5s, 10s (retry cadence); success at 15s; then the
        // normal cadence resumes at 25s, 35s
        let offsets = source.call_offsets(origin);
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_secs(5),
                Duration::from_secs(10),
                Duration::from_secs(15),
                Duration::from_secs(25),
                Duration::from_secs(35),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_pending_timer() {
        let source = ScriptedSource::new(0, vec![1]);
        let (mut collection, manager) =
            PollingManager::spawn(source.clone(), NORMAL, RETRY, notifier());
        assert!(collection.changed().await);

        manager.shutdown().await;
        let polls_at_shutdown = source.calls.lock().unwrap().len();

        // Long after shutdown no further poll has run
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls.lock().unwrap().len(), polls_at_shutdown);
        assert!(!collection.changed().await);
    }
}
