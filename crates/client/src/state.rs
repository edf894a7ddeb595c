//! Application state shared across the storefront's screens.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::config::ClientConfig;
use crate::error::StoreError;
use crate::favorites::FavoritesStore;
use crate::gateway::RemoteGateway;
use crate::models::{Banner, Category, Product, Session};
use crate::notify::{SharedNotifier, TracingNotifier};
use crate::persistence::{LocalStore, PersistenceError};
use crate::realtime::{
    ActiveBanners, ActiveCategories, ActiveProducts, ChangeFeed, Collection, PollingManager,
    SyncManager,
};

/// Application state shared across all screens.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// shared gateway, local store, and notifier. Services are constructed here
/// once and passed by reference; nothing in the client is a process-wide
/// singleton.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    gateway: RemoteGateway,
    local: LocalStore,
    notifier: SharedNotifier,
}

impl AppState {
    /// Create the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the local data directory cannot be created.
    pub fn new(config: ClientConfig, notifier: SharedNotifier) -> Result<Self, PersistenceError> {
        let gateway = RemoteGateway::new(&config);
        let local = LocalStore::open(&config.data_dir)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                local,
                notifier,
            }),
        })
    }

    /// Create state with the tracing-backed notifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the local data directory cannot be created.
    pub fn with_default_notifier(config: ClientConfig) -> Result<Self, PersistenceError> {
        Self::new(config, Arc::new(TracingNotifier))
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the remote gateway.
    #[must_use]
    pub fn gateway(&self) -> &RemoteGateway {
        &self.inner.gateway
    }

    /// Get a reference to the local store.
    #[must_use]
    pub fn local(&self) -> &LocalStore {
        &self.inner.local
    }

    /// Get the shared notifier.
    #[must_use]
    pub fn notifier(&self) -> SharedNotifier {
        self.inner.notifier.clone()
    }

    // =========================================================================
    // Realtime wiring
    // =========================================================================

    /// Watch active products through a change subscription.
    pub fn watch_products<F: ChangeFeed + 'static>(
        &self,
        feed: F,
    ) -> (Collection<Product>, SyncManager) {
        SyncManager::spawn(
            Arc::new(ActiveProducts::new(self.inner.gateway.clone())),
            feed,
            self.notifier(),
        )
    }

    /// Watch categories through a change subscription.
    pub fn watch_categories<F: ChangeFeed + 'static>(
        &self,
        feed: F,
    ) -> (Collection<Category>, SyncManager) {
        SyncManager::spawn(
            Arc::new(ActiveCategories::new(self.inner.gateway.clone())),
            feed,
            self.notifier(),
        )
    }

    /// Watch active banners through a change subscription.
    pub fn watch_banners<F: ChangeFeed + 'static>(
        &self,
        feed: F,
    ) -> (Collection<Banner>, SyncManager) {
        SyncManager::spawn(
            Arc::new(ActiveBanners::new(self.inner.gateway.clone())),
            feed,
            self.notifier(),
        )
    }

    /// Poll active products on the configured cadence (degraded mode, for
    /// hosts without a subscription transport).
    pub fn poll_products(&self) -> (Collection<Product>, PollingManager) {
        PollingManager::spawn(
            Arc::new(ActiveProducts::new(self.inner.gateway.clone())),
            self.inner.config.poll_interval,
            self.inner.config.poll_retry_interval,
            self.notifier(),
        )
    }

    /// Poll categories on the configured cadence.
    pub fn poll_categories(&self) -> (Collection<Category>, PollingManager) {
        PollingManager::spawn(
            Arc::new(ActiveCategories::new(self.inner.gateway.clone())),
            self.inner.config.poll_interval,
            self.inner.config.poll_retry_interval,
            self.notifier(),
        )
    }

    /// Poll active banners on the configured cadence.
    pub fn poll_banners(&self) -> (Collection<Banner>, PollingManager) {
        PollingManager::spawn(
            Arc::new(ActiveBanners::new(self.inner.gateway.clone())),
            self.inner.config.poll_interval,
            self.inner.config.poll_retry_interval,
            self.notifier(),
        )
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// Open the cart for the current session state.
    ///
    /// # Errors
    ///
    /// Returns an error if the authenticated hydration fetch fails.
    pub async fn open_cart(&self, session: Option<Session>) -> Result<CartStore, StoreError> {
        match session {
            Some(session) => {
                CartStore::authenticated(
                    Arc::new(self.inner.gateway.clone()),
                    session,
                    self.notifier(),
                )
                .await
            }
            None => Ok(CartStore::anonymous(
                self.inner.local.clone(),
                self.notifier(),
            )),
        }
    }

    /// Open favorites for the current session state.
    ///
    /// # Errors
    ///
    /// Returns an error if the authenticated hydration fetch fails.
    pub async fn open_favorites(
        &self,
        session: Option<Session>,
    ) -> Result<FavoritesStore, StoreError> {
        match session {
            Some(session) => {
                FavoritesStore::authenticated(
                    Arc::new(self.inner.gateway.clone()),
                    session,
                    self.notifier(),
                )
                .await
            }
            None => Ok(FavoritesStore::anonymous(
                self.inner.local.clone(),
                self.notifier(),
            )),
        }
    }
}
