//! Integration tests for the Souq client.
//!
//! The `tests/` directory exercises cross-component scenarios - login
//! migration, refetch-on-notification, polling backoff - against the
//! in-memory backend fakes defined here. No live backend is involved.
//!
//! # Test Categories
//!
//! - `cart_migration` - anonymous/authenticated cart and favorites flows
//! - `realtime_sync` - subscription manager refetch semantics
//! - `polling_fallback` - degraded polling cadence

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::SecretString;

use souq_client::cart::CartRemote;
use souq_client::favorites::FavoritesRemote;
use souq_client::gateway::RemoteError;
use souq_client::models::{CartItem, Product, Session};
use souq_client::realtime::CollectionSource;
use souq_core::{AccountTier, CartLineId, LocalizedText, ProductId, UserId};

/// A retail session for a fixed test user.
#[must_use]
pub fn session() -> Session {
    Session {
        user: UserId::new(uuid::Uuid::nil()),
        access_token: SecretString::from("test-token"),
        tier: AccountTier::Retail,
    }
}

/// A minimal active product with the given ID and integer retail price.
#[must_use]
pub fn product(id: i64, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: LocalizedText::new("منتج", "Product", "מוצר"),
        description: LocalizedText::default(),
        price: Decimal::from(price),
        original_price: None,
        wholesale_price: None,
        in_stock: true,
        stock_quantity: 10,
        rating: 4.5,
        review_count: 3,
        discount_percent: None,
        featured: false,
        active: true,
        tags: Vec::new(),
        image: String::new(),
        images: Vec::new(),
        category: None,
    }
}

// =============================================================================
// Catalog fake
// =============================================================================

/// What one fetch against [`ScriptedCatalog`] should do.
#[derive(Debug, Clone)]
pub enum FetchScript {
    /// Respond with the current rows immediately.
    Respond,
    /// Fail with a backend error.
    Fail,
    /// Sleep before responding with the rows *captured at call time*.
    RespondAfter(Duration),
}

/// In-memory catalog table with a per-call script.
///
/// Calls pop the front of the script; an exhausted script responds
/// immediately.
pub struct ScriptedCatalog {
    rows: Mutex<Vec<Product>>,
    script: Mutex<VecDeque<FetchScript>>,
    calls: AtomicUsize,
}

impl ScriptedCatalog {
    #[must_use]
    pub fn new(rows: Vec<Product>) -> Self {
        Self {
            rows: Mutex::new(rows),
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Append steps to the fetch script.
    pub fn push_script(&self, steps: impl IntoIterator<Item = FetchScript>) {
        self.script
            .lock()
            .expect("script mutex poisoned")
            .extend(steps);
    }

    /// Replace the backend rows.
    pub fn set_rows(&self, rows: Vec<Product>) {
        *self.rows.lock().expect("rows mutex poisoned") = rows;
    }

    /// Number of fetches so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn current_rows(&self) -> Vec<Product> {
        self.rows.lock().expect("rows mutex poisoned").clone()
    }
}

#[async_trait]
impl CollectionSource<Product> for ScriptedCatalog {
    async fn fetch(&self) -> Result<Vec<Product>, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .script
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or(FetchScript::Respond);
        match step {
            FetchScript::Respond => Ok(self.current_rows()),
            FetchScript::Fail => Err(RemoteError::Backend {
                status: 503,
                message: "unavailable".to_string(),
            }),
            FetchScript::RespondAfter(delay) => {
                let rows = self.current_rows();
                tokio::time::sleep(delay).await;
                Ok(rows)
            }
        }
    }
}

// =============================================================================
// Cart fake
// =============================================================================

/// In-memory `cart_items` table.
#[derive(Default)]
pub struct FakeCartRemote {
    lines: Mutex<Vec<CartItem>>,
    next_id: AtomicUsize,
}

impl FakeCartRemote {
    /// Current remote lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lines.lock().expect("lines mutex poisoned").clone()
    }

    /// Seed a line as if created in an earlier session.
    pub fn seed(&self, product: Product, quantity: u32) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.lines
            .lock()
            .expect("lines mutex poisoned")
            .push(CartItem {
                id: CartLineId::remote(id as i64),
                product,
                quantity,
            });
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
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let item = CartItem {
            id: CartLineId::remote(id as i64),
            product: product.clone(),
            quantity,
        };
        self.lines
            .lock()
            .expect("lines mutex poisoned")
            .push(item.clone());
        Ok(item)
    }

    async fn set_quantity(
        &self,
        _session: &Session,
        line: &CartLineId,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        let mut lines = self.lines.lock().expect("lines mutex poisoned");
        match lines.iter_mut().find(|item| &item.id == line) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(RemoteError::NotFound(format!("cart line {line}"))),
        }
    }

    async fn remove_item(&self, _session: &Session, line: &CartLineId) -> Result<(), RemoteError> {
        self.lines
            .lock()
            .expect("lines mutex poisoned")
            .retain(|item| &item.id != line);
        Ok(())
    }

    async fn clear(&self, _session: &Session) -> Result<(), RemoteError> {
        self.lines.lock().expect("lines mutex poisoned").clear();
        Ok(())
    }
}

// =============================================================================
// Favorites fake
// =============================================================================

/// In-memory `favorites` table keyed by product.
#[derive(Default)]
pub struct FakeFavoritesRemote {
    products: Mutex<Vec<Product>>,
}

impl FakeFavoritesRemote {
    /// Seed a favorite as if recorded in an earlier session.
    pub fn seed(&self, product: Product) {
        self.products
            .lock()
            .expect("products mutex poisoned")
            .push(product);
    }

    /// Current favorited product IDs.
    #[must_use]
    pub fn ids(&self) -> Vec<ProductId> {
        self.products
            .lock()
            .expect("products mutex poisoned")
            .iter()
            .map(|p| p.id)
            .collect()
    }
}

#[async_trait]
impl FavoritesRemote for FakeFavoritesRemote {
    async fn fetch_favorites(&self, _session: &Session) -> Result<Vec<Product>, RemoteError> {
        Ok(self
            .products
            .lock()
            .expect("products mutex poisoned")
            .clone())
    }

    async fn add_favorite(&self, session: &Session, product: ProductId) -> Result<(), RemoteError> {
        let _ = session;
        let mut products = self.products.lock().expect("products mutex poisoned");
        if !products.iter().any(|p| p.id == product) {
            // Favorites rows embed the product; the fake only knows the ID,
            // so it stores a stub priced at zero
            products.push(crate::product(product.as_i64(), 0));
        }
        Ok(())
    }

    async fn remove_favorite(
        &self,
        _session: &Session,
        product: ProductId,
    ) -> Result<(), RemoteError> {
        self.products
            .lock()
            .expect("products mutex poisoned")
            .retain(|p| p.id != product);
        Ok(())
    }

    async fn clear_favorites(&self, _session: &Session) -> Result<(), RemoteError> {
        self.products
            .lock()
            .expect("products mutex poisoned")
            .clear();
        Ok(())
    }
}
