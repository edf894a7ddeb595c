//! Cart store: reducer dispatch plus side effects.
//!
//! The store owns the [`CartState`] and runs exactly one side-effect path
//! per transition: anonymous sessions persist the whole collection to the
//! local store, authenticated sessions issue the corresponding remote call.
//! The two are mutually exclusive; login migrates the anonymous collection
//! into the remote one and clears local storage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;

use souq_core::{CartLineId, ProductId};

use crate::error::StoreError;
use crate::gateway::RemoteError;
use crate::models::{CartItem, Product, Session};
use crate::notify::{Severity, SharedNotifier};
use crate::persistence::{ANONYMOUS_CART_KEY, LocalStore};

use super::{CartAction, CartState, reduce};

/// Remote operations the authenticated cart needs.
///
/// Implemented by the gateway; tests substitute in-memory fakes.
#[async_trait]
pub trait CartRemote: Send + Sync {
    /// Fetch the user's cart lines.
    async fn fetch_items(&self, session: &Session) -> Result<Vec<CartItem>, RemoteError>;

    /// Create a line, returning it with its server-assigned ID.
    async fn add_item(
        &self,
        session: &Session,
        product: &Product,
        quantity: u32,
    ) -> Result<CartItem, RemoteError>;

    /// Update a line's quantity.
    async fn set_quantity(
        &self,
        session: &Session,
        line: &CartLineId,
        quantity: u32,
    ) -> Result<(), RemoteError>;

    /// Delete a line.
    async fn remove_item(&self, session: &Session, line: &CartLineId) -> Result<(), RemoteError>;

    /// Delete all of the user's lines.
    async fn clear(&self, session: &Session) -> Result<(), RemoteError>;
}

/// Where cart mutations are persisted.
pub enum CartBackend {
    /// No session: the collection lives in the local store.
    Anonymous { local: LocalStore },
    /// Signed in: the collection lives in the backend.
    Authenticated {
        remote: Arc<dyn CartRemote>,
        session: Session,
    },
}

/// The cart store.
pub struct CartStore {
    state: CartState,
    backend: CartBackend,
    notifier: SharedNotifier,
}

impl CartStore {
    /// Open an anonymous cart, hydrating from the local store.
    #[must_use]
    pub fn anonymous(local: LocalStore, notifier: SharedNotifier) -> Self {
        let items: Vec<CartItem> = local.load(ANONYMOUS_CART_KEY);
        let state = reduce(&CartState::default(), CartAction::Load(items), 0);
        Self {
            state,
            backend: CartBackend::Anonymous { local },
            notifier,
        }
    }

    /// Open an authenticated cart, hydrating from the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial fetch fails.
    pub async fn authenticated(
        remote: Arc<dyn CartRemote>,
        session: Session,
        notifier: SharedNotifier,
    ) -> Result<Self, StoreError> {
        let items = remote.fetch_items(&session).await?;
        let state = reduce(&CartState::default(), CartAction::Load(items), 0);
        Ok(Self {
            state,
            backend: CartBackend::Authenticated { remote, session },
            notifier,
        })
    }

    /// Read-only view of the current collection.
    #[must_use]
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Apply an action and run its side effect.
    ///
    /// The state transition always happens; a failed remote write leaves the
    /// optimistic state in place, notifies the user, and surfaces the error.
    /// The next hydration reconciles with the backend.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Remote` if the authenticated side effect fails.
    #[instrument(skip(self, action))]
    pub async fn dispatch(&mut self, action: CartAction) -> Result<(), StoreError> {
        let previous = self.state.clone();
        self.state = reduce(&self.state, action.clone(), Utc::now().timestamp_millis());

        match &self.backend {
            CartBackend::Anonymous { local } => {
                local.save(ANONYMOUS_CART_KEY, self.state.items());
                Ok(())
            }
            CartBackend::Authenticated { remote, session } => {
                let result = Self::remote_effect(remote.as_ref(), session, &previous, &action).await;
                match result {
                    Ok(rekey) => {
                        if let Some((product, id)) = rekey {
                            self.state.rekey_line(product, id);
                        }
                        Ok(())
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "cart write failed");
                        self.notifier
                            .notify(Severity::Warning, "Could not update your cart");
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Issue the remote call matching `action` against the pre-transition
    /// state. Returns a re-key pair when the backend assigned a new line ID.
    async fn remote_effect(
        remote: &dyn CartRemote,
        session: &Session,
        previous: &CartState,
        action: &CartAction,
    ) -> Result<Option<(ProductId, CartLineId)>, RemoteError> {
        match action {
            CartAction::Add { product, quantity } => {
                if *quantity == 0 {
                    return Ok(None);
                }
                match previous.line_for(product.id) {
                    Some(line) => {
                        let merged = line.quantity.saturating_add(*quantity);
                        remote.set_quantity(session, &line.id, merged).await?;
                        Ok(None)
                    }
                    None => {
                        let created = remote.add_item(session, product, *quantity).await?;
                        Ok(Some((product.id, created.id)))
                    }
                }
            }
            CartAction::Remove(product) => {
                if let Some(line) = previous.line_for(*product) {
                    remote.remove_item(session, &line.id).await?;
                }
                Ok(None)
            }
            CartAction::SetQuantity { product, quantity } => {
                let Some(line) = previous.line_for(*product) else {
                    return Ok(None);
                };
                if *quantity <= 0 {
                    remote.remove_item(session, &line.id).await?;
                } else {
                    let quantity = u32::try_from(*quantity).unwrap_or(u32::MAX);
                    remote.set_quantity(session, &line.id, quantity).await?;
                }
                Ok(None)
            }
            CartAction::Clear => {
                remote.clear(session).await?;
                Ok(None)
            }
            // Hydration only; nothing to write back
            CartAction::Load(_) => Ok(None),
        }
    }

    /// Switch to an authenticated backend, merging the anonymous collection
    /// into the remote cart.
    ///
    /// Quantities are summed per product (the `Add` semantics). Local
    /// storage is cleared only after the whole merge succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Remote` if hydration or any merge write fails;
    /// the local collection is kept in that case.
    #[instrument(skip_all, fields(user = %session.user))]
    pub async fn login(
        &mut self,
        remote: Arc<dyn CartRemote>,
        session: Session,
    ) -> Result<(), StoreError> {
        let CartBackend::Anonymous { local } = &self.backend else {
            tracing::warn!("login called on an already-authenticated cart");
            return Ok(());
        };
        let local = local.clone();
        let anonymous_items: Vec<CartItem> = self.state.items().to_vec();

        let remote_items = remote.fetch_items(&session).await?;
        self.state = reduce(&CartState::default(), CartAction::Load(remote_items), 0);
        self.backend = CartBackend::Authenticated { remote, session };

        for item in anonymous_items {
            self.dispatch(CartAction::Add {
                product: item.product,
                quantity: item.quantity,
            })
            .await?;
        }

        local.clear(ANONYMOUS_CART_KEY);
        Ok(())
    }

    /// Switch back to an empty anonymous cart after sign-out.
    pub fn logout(&mut self, local: LocalStore) {
        self.state = CartState::default();
        self.backend = CartBackend::Anonymous { local };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::TracingNotifier;
    use crate::testutil::product;
    use secrecy::SecretString;
    use souq_core::{AccountTier, UserId};
    use std::sync::Mutex;

    fn session() -> Session {
        Session {
            user: UserId::new(uuid::Uuid::nil()),
            access_token: SecretString::from("token"),
            tier: AccountTier::Retail,
        }
    }

    fn notifier() -> SharedNotifier {
        Arc::new(TracingNotifier)
    }

    /// In-memory cart backend tracking lines by product ID.
    #[derive(Default)]
    struct FakeCartRemote {
        lines: Mutex<Vec<CartItem>>,
        next_id: Mutex<i64>,
        fail_writes: bool,
    }

    impl FakeCartRemote {
        fn items(&self) -> Vec<CartItem> {
            self.lines.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CartRemote for FakeCartRemote {
        async fn fetch_items(&self, _session: &Session) -> Result<Vec<CartItem>, RemoteError> {
            Ok(self.items())
        }

        async fn add_item(
            &self,
            _session: &Session,
            product: &Product,
            quantity: u32,
        ) -> Result<CartItem, RemoteError> {
            if self.fail_writes {
                return Err(RemoteError::Backend {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let item = CartItem {
                id: CartLineId::remote(*next_id),
                product: product.clone(),
                quantity,
            };
            self.lines.lock().unwrap().push(item.clone());
            Ok(item)
        }

        async fn set_quantity(
            &self,
            _session: &Session,
            line: &CartLineId,
            quantity: u32,
        ) -> Result<(), RemoteError> {
            let mut lines = self.lines.lock().unwrap();
            if let Some(item) = lines.iter_mut().find(|item| &item.id == line) {
                item.quantity = quantity;
            }
            Ok(())
        }

        async fn remove_item(
            &self,
            _session: &Session,
            line: &CartLineId,
        ) -> Result<(), RemoteError> {
            self.lines.lock().unwrap().retain(|item| &item.id != line);
            Ok(())
        }

        async fn clear(&self, _session: &Session) -> Result<(), RemoteError> {
            self.lines.lock().unwrap().clear();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_anonymous_dispatch_persists_collection() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();
        let mut store = CartStore::anonymous(local.clone(), notifier());

        store
            .dispatch(CartAction::Add {
                product: product(1, 10),
                quantity: 2,
            })
            .await
            .unwrap();

        let persisted: Vec<CartItem> = local.load(ANONYMOUS_CART_KEY);
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].quantity, 2);

        // A fresh store hydrates the same collection
        let rehydrated = CartStore::anonymous(local, notifier());
        assert_eq!(rehydrated.state().items(), persisted.as_slice());
    }

    #[tokio::test]
    async fn test_authenticated_add_rekeys_with_server_id() {
        let remote = Arc::new(FakeCartRemote::default());
        let mut store = CartStore::authenticated(remote.clone(), session(), notifier())
            .await
            .unwrap();

        store
            .dispatch(CartAction::Add {
                product: product(1, 10),
                quantity: 1,
            })
            .await
            .unwrap();

        assert_eq!(store.state().items()[0].id, CartLineId::remote(1));
        assert_eq!(remote.items().len(), 1);
    }

    #[tokio::test]
    async fn test_authenticated_add_merges_via_set_quantity() {
        let remote = Arc::new(FakeCartRemote::default());
        let mut store = CartStore::authenticated(remote.clone(), session(), notifier())
            .await
            .unwrap();

        for _ in 0..2 {
            store
                .dispatch(CartAction::Add {
                    product: product(1, 10),
                    quantity: 2,
                })
                .await
                .unwrap();
        }

        let items = remote.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_login_migrates_anonymous_cart() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();
        let mut store = CartStore::anonymous(local.clone(), notifier());
        store
            .dispatch(CartAction::Add {
                product: product(1, 10),
                quantity: 2,
            })
            .await
            .unwrap();

        let remote = Arc::new(FakeCartRemote::default());
        store.login(remote.clone(), session()).await.unwrap();

        // Remote cart now holds {product 1: qty 2}
        let items = remote.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.id, ProductId::new(1));
        assert_eq!(items[0].quantity, 2);

        // Local key cleared
        let persisted: Vec<CartItem> = local.load(ANONYMOUS_CART_KEY);
        assert!(persisted.is_empty());
    }

    #[tokio::test]
    async fn test_login_sums_quantities_with_remote_cart() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();
        let mut store = CartStore::anonymous(local.clone(), notifier());
        store
            .dispatch(CartAction::Add {
                product: product(1, 10),
                quantity: 2,
            })
            .await
            .unwrap();

        let remote = Arc::new(FakeCartRemote::default());
        remote
            .add_item(&session(), &product(1, 10), 3)
            .await
            .unwrap();

        store.login(remote.clone(), session()).await.unwrap();

        let items = remote.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(store.state().total_quantity(), 5);
    }

    #[tokio::test]
    async fn test_failed_migration_keeps_local_collection() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();
        let mut store = CartStore::anonymous(local.clone(), notifier());
        store
            .dispatch(CartAction::Add {
                product: product(1, 10),
                quantity: 2,
            })
            .await
            .unwrap();

        let remote = Arc::new(FakeCartRemote {
            fail_writes: true,
            ..FakeCartRemote::default()
        });
        let result = store.login(remote, session()).await;
        assert!(result.is_err());

        // Local storage untouched so nothing is lost
        let persisted: Vec<CartItem> = local.load(ANONYMOUS_CART_KEY);
        assert_eq!(persisted.len(), 1);
    }

    #[tokio::test]
    async fn test_logout_resets_to_empty_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();
        let remote = Arc::new(FakeCartRemote::default());
        remote
            .add_item(&session(), &product(1, 10), 3)
            .await
            .unwrap();

        let mut store = CartStore::authenticated(remote, session(), notifier())
            .await
            .unwrap();
        assert_eq!(store.state().len(), 1);

        store.logout(local);
        assert!(store.state().is_empty());
    }
}
