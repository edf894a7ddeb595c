//! Favorites state engine.
//!
//! Same reducer-plus-observer shape as the cart: a tagged action, a pure
//! transition, and one side-effect path afterwards (local persistence when
//! anonymous, remote writes when signed in). Favorites are a set of products
//! deduplicated by ID; the count always equals the set cardinality.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use souq_core::ProductId;

use crate::error::StoreError;
use crate::gateway::RemoteError;
use crate::models::{Product, Session};
use crate::notify::{Severity, SharedNotifier};
use crate::persistence::{FAVORITES_KEY, LocalStore};

/// An action dispatched against favorites.
#[derive(Debug, Clone)]
pub enum FavoritesAction {
    /// Add a product; a duplicate by ID is ignored.
    Add(Product),
    /// Remove a product, if present.
    Remove(ProductId),
    /// Empty the set unconditionally.
    Clear,
    /// Replace the whole set (hydration), deduplicating by ID.
    Load(Vec<Product>),
}

/// The favorites collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoritesState {
    products: Vec<Product>,
}

impl FavoritesState {
    /// The favorited products in insertion order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Set cardinality; by construction also the displayed badge count.
    #[must_use]
    pub fn count(&self) -> usize {
        self.products.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Whether `product` is favorited.
    #[must_use]
    pub fn contains(&self, product: ProductId) -> bool {
        self.products.iter().any(|p| p.id == product)
    }
}

/// Apply an action to the favorites set, returning the next state.
///
/// Pure: no I/O.
#[must_use]
pub fn reduce(state: &FavoritesState, action: FavoritesAction) -> FavoritesState {
    let mut next = state.clone();
    match action {
        FavoritesAction::Add(product) => {
            if !next.contains(product.id) {
                next.products.push(product);
            }
        }
        FavoritesAction::Remove(product) => {
            next.products.retain(|p| p.id != product);
        }
        FavoritesAction::Clear => next.products.clear(),
        FavoritesAction::Load(products) => {
            next.products.clear();
            for product in products {
                if !next.contains(product.id) {
                    next.products.push(product);
                }
            }
        }
    }
    next
}

/// Remote operations the authenticated favorites set needs.
#[async_trait]
pub trait FavoritesRemote: Send + Sync {
    /// Fetch the user's favorites.
    async fn fetch_favorites(&self, session: &Session) -> Result<Vec<Product>, RemoteError>;

    /// Record a favorite.
    async fn add_favorite(&self, session: &Session, product: ProductId) -> Result<(), RemoteError>;

    /// Delete a favorite.
    async fn remove_favorite(
        &self,
        session: &Session,
        product: ProductId,
    ) -> Result<(), RemoteError>;

    /// Delete all of the user's favorites.
    async fn clear_favorites(&self, session: &Session) -> Result<(), RemoteError>;
}

/// Where favorites mutations are persisted.
enum FavoritesBackend {
    Anonymous {
        local: LocalStore,
    },
    Authenticated {
        remote: Arc<dyn FavoritesRemote>,
        session: Session,
    },
}

/// The favorites store.
pub struct FavoritesStore {
    state: FavoritesState,
    backend: FavoritesBackend,
    notifier: SharedNotifier,
}

impl FavoritesStore {
    /// Open anonymous favorites, hydrating from the local store.
    #[must_use]
    pub fn anonymous(local: LocalStore, notifier: SharedNotifier) -> Self {
        let products: Vec<Product> = local.load(FAVORITES_KEY);
        let state = reduce(&FavoritesState::default(), FavoritesAction::Load(products));
        Self {
            state,
            backend: FavoritesBackend::Anonymous { local },
            notifier,
        }
    }

    /// Open authenticated favorites, hydrating from the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial fetch fails.
    pub async fn authenticated(
        remote: Arc<dyn FavoritesRemote>,
        session: Session,
        notifier: SharedNotifier,
    ) -> Result<Self, StoreError> {
        let products = remote.fetch_favorites(&session).await?;
        let state = reduce(&FavoritesState::default(), FavoritesAction::Load(products));
        Ok(Self {
            state,
            backend: FavoritesBackend::Authenticated { remote, session },
            notifier,
        })
    }

    /// Read-only view of the current set.
    #[must_use]
    pub fn state(&self) -> &FavoritesState {
        &self.state
    }

    /// Whether `product` is favorited.
    #[must_use]
    pub fn is_favorite(&self, product: ProductId) -> bool {
        self.state.contains(product)
    }

    /// Apply an action and run its side effect.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Remote` if the authenticated side effect fails;
    /// the optimistic state is kept and the user notified.
    #[instrument(skip(self, action))]
    pub async fn dispatch(&mut self, action: FavoritesAction) -> Result<(), StoreError> {
        let previous = self.state.clone();
        self.state = reduce(&self.state, action.clone());

        match &self.backend {
            FavoritesBackend::Anonymous { local } => {
                local.save(FAVORITES_KEY, self.state.products());
                Ok(())
            }
            FavoritesBackend::Authenticated { remote, session } => {
                let result =
                    Self::remote_effect(remote.as_ref(), session, &previous, &action).await;
                if let Err(e) = result {
                    tracing::warn!(error = %e, "favorites write failed");
                    self.notifier
                        .notify(Severity::Warning, "Could not update your favorites");
                    return Err(e.into());
                }
                Ok(())
            }
        }
    }

    /// Issue the remote call matching `action` against the pre-transition
    /// state.
    async fn remote_effect(
        remote: &dyn FavoritesRemote,
        session: &Session,
        previous: &FavoritesState,
        action: &FavoritesAction,
    ) -> Result<(), RemoteError> {
        match action {
            FavoritesAction::Add(product) => {
                // Duplicate adds were a reducer no-op; skip the write too
                if previous.contains(product.id) {
                    return Ok(());
                }
                remote.add_favorite(session, product.id).await
            }
            FavoritesAction::Remove(product) => {
                if !previous.contains(*product) {
                    return Ok(());
                }
                remote.remove_favorite(session, *product).await
            }
            FavoritesAction::Clear => remote.clear_favorites(session).await,
            FavoritesAction::Load(_) => Ok(()),
        }
    }

    /// Switch to an authenticated backend, merging the anonymous set into
    /// the remote one (set union). Local storage is cleared only after the
    /// whole merge succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Remote` if hydration or any merge write fails;
    /// the local collection is kept in that case.
    #[instrument(skip_all, fields(user = %session.user))]
    pub async fn login(
        &mut self,
        remote: Arc<dyn FavoritesRemote>,
        session: Session,
    ) -> Result<(), StoreError> {
        let FavoritesBackend::Anonymous { local } = &self.backend else {
            tracing::warn!("login called on already-authenticated favorites");
            return Ok(());
        };
        let local = local.clone();
        let anonymous_products: Vec<Product> = self.state.products().to_vec();

        let remote_products = remote.fetch_favorites(&session).await?;
        self.state = reduce(
            &FavoritesState::default(),
            FavoritesAction::Load(remote_products),
        );
        self.backend = FavoritesBackend::Authenticated { remote, session };

        for product in anonymous_products {
            self.dispatch(FavoritesAction::Add(product)).await?;
        }

        local.clear(FAVORITES_KEY);
        Ok(())
    }

    /// Switch back to an empty anonymous set after sign-out.
    pub fn logout(&mut self, local: LocalStore) {
        self.state = FavoritesState::default();
        self.backend = FavoritesBackend::Anonymous { local };
    }
}
