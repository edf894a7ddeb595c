//! User-scoped gateway operations: cart, favorites, addresses, orders.
//!
//! Every call here carries the session's bearer token; the backend's row
//! policies scope reads and writes to the signed-in user. The cart and
//! favorites operations implement the store-engine remote traits so the
//! state engines stay decoupled from HTTP.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use souq_core::{AddressId, CartLineId, OrderId, ProductId};

use crate::cart::CartRemote;
use crate::favorites::FavoritesRemote;
use crate::models::{
    Address, AddressDraft, CartItem, Order, OrderLine, OrderStatus, Product, Session,
};

use super::rows::{AddressRow, CartItemRow, FavoriteRow, OrderRow};
use super::{Auth, QuerySpec, RemoteError, RemoteGateway, SortDirection};

/// Columns selected for cart reads (embeds the product snapshot).
const CART_SELECT: &str = "id,quantity,product:products(*)";
/// Columns selected for favorites reads.
const FAVORITES_SELECT: &str = "id,product:products(*)";

#[derive(Serialize)]
struct CartLineInsert {
    user_id: Uuid,
    product_id: i64,
    quantity: u32,
}

#[derive(Serialize)]
struct QuantityPatch {
    quantity: u32,
}

#[derive(Serialize)]
struct FavoriteInsert {
    user_id: Uuid,
    product_id: i64,
}

#[derive(Deserialize)]
struct CreatedRow {
    id: i64,
}

#[derive(Serialize)]
struct AddressInsert<'a> {
    user_id: Uuid,
    #[serde(flatten)]
    draft: &'a AddressDraft,
}

#[derive(Serialize)]
struct DefaultPatch {
    is_default: bool,
}

#[derive(Serialize)]
struct OrderInsert<'a> {
    id: Uuid,
    user_id: Uuid,
    lines: &'a [OrderLine],
    address_id: i64,
    total: Decimal,
    status: OrderStatus,
}

impl RemoteGateway {
    // =========================================================================
    // Addresses
    // =========================================================================

    /// List the user's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session), fields(user = %session.user))]
    pub async fn addresses(&self, session: &Session) -> Result<Vec<Address>, RemoteError> {
        let query = QuerySpec::new()
            .eq("user_id", session.user)
            .order_by("is_default", SortDirection::Descending);
        let rows: Vec<AddressRow> = self
            .get_rows("addresses", &query, Auth::User(session))
            .await?;
        Ok(rows.into_iter().map(Address::from).collect())
    }

    /// Create an address for the user.
    ///
    /// When the draft is flagged default, the user's other addresses lose
    /// their default flag first, so at most one default exists.
    ///
    /// # Errors
    ///
    /// Returns an error if any API request fails.
    #[instrument(skip(self, session, draft), fields(user = %session.user))]
    pub async fn create_address(
        &self,
        session: &Session,
        draft: &AddressDraft,
    ) -> Result<Address, RemoteError> {
        if draft.is_default {
            self.clear_default_addresses(session).await?;
        }
        let body = AddressInsert {
            user_id: session.user.as_uuid(),
            draft,
        };
        let row: AddressRow = self
            .insert_one("addresses", &body, Auth::User(session))
            .await?;
        Ok(row.into())
    }

    /// Update an existing address.
    ///
    /// # Errors
    ///
    /// Returns an error if any API request fails.
    #[instrument(skip(self, session, draft), fields(user = %session.user, address = %id))]
    pub async fn update_address(
        &self,
        session: &Session,
        id: AddressId,
        draft: &AddressDraft,
    ) -> Result<(), RemoteError> {
        if draft.is_default {
            self.clear_default_addresses(session).await?;
        }
        self.patch_rows(
            "addresses",
            &QuerySpec::new().eq("id", id),
            draft,
            Auth::User(session),
        )
        .await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session), fields(user = %session.user, address = %id))]
    pub async fn delete_address(&self, session: &Session, id: AddressId) -> Result<(), RemoteError> {
        self.delete_rows(
            "addresses",
            &QuerySpec::new().eq("id", id),
            Auth::User(session),
        )
        .await
    }

    /// Make `id` the user's only default address.
    ///
    /// # Errors
    ///
    /// Returns an error if any API request fails.
    #[instrument(skip(self, session), fields(user = %session.user, address = %id))]
    pub async fn set_default_address(
        &self,
        session: &Session,
        id: AddressId,
    ) -> Result<(), RemoteError> {
        self.clear_default_addresses(session).await?;
        self.patch_rows(
            "addresses",
            &QuerySpec::new().eq("id", id),
            &DefaultPatch { is_default: true },
            Auth::User(session),
        )
        .await
    }

    async fn clear_default_addresses(&self, session: &Session) -> Result<(), RemoteError> {
        self.patch_rows(
            "addresses",
            &QuerySpec::new()
                .eq("user_id", session.user)
                .eq("is_default", true),
            &DefaultPatch { is_default: false },
            Auth::User(session),
        )
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order from the given cart lines.
    ///
    /// Snapshots names and tier-resolved unit prices so later catalog edits
    /// don't rewrite order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session, items), fields(user = %session.user))]
    pub async fn place_order(
        &self,
        session: &Session,
        items: &[CartItem],
        address: AddressId,
    ) -> Result<Order, RemoteError> {
        let lines: Vec<OrderLine> = items
            .iter()
            .map(|item| OrderLine {
                product: item.product.id,
                name: item.product.name.clone(),
                unit_price: item.product.price_for(session.tier).amount,
                quantity: item.quantity,
            })
            .collect();
        let total: Decimal = lines
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum();

        let body = OrderInsert {
            id: OrderId::generate().as_uuid(),
            user_id: session.user.as_uuid(),
            lines: &lines,
            address_id: address.as_i64(),
            total,
            status: OrderStatus::Pending,
        };
        let row: OrderRow = self.insert_one("orders", &body, Auth::User(session)).await?;
        Ok(row.into())
    }

    /// List the user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session), fields(user = %session.user))]
    pub async fn orders(&self, session: &Session) -> Result<Vec<Order>, RemoteError> {
        let query = QuerySpec::new()
            .eq("user_id", session.user)
            .order_by("created_at", SortDirection::Descending);
        let rows: Vec<OrderRow> = self.get_rows("orders", &query, Auth::User(session)).await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }
}

// =============================================================================
// State-engine remote traits
// =============================================================================

#[async_trait]
impl CartRemote for RemoteGateway {
    async fn fetch_items(&self, session: &Session) -> Result<Vec<CartItem>, RemoteError> {
        let query = QuerySpec::new()
            .select(CART_SELECT)
            .eq("user_id", session.user);
        let rows: Vec<CartItemRow> = self
            .get_rows("cart_items", &query, Auth::User(session))
            .await?;
        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    async fn add_item(
        &self,
        session: &Session,
        product: &Product,
        quantity: u32,
    ) -> Result<CartItem, RemoteError> {
        let body = CartLineInsert {
            user_id: session.user.as_uuid(),
            product_id: product.id.as_i64(),
            quantity,
        };
        let created: CreatedRow = self
            .insert_one("cart_items", &body, Auth::User(session))
            .await?;
        Ok(CartItem {
            id: CartLineId::remote(created.id),
            product: product.clone(),
            quantity,
        })
    }

    async fn set_quantity(
        &self,
        session: &Session,
        line: &CartLineId,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        self.patch_rows(
            "cart_items",
            &QuerySpec::new().eq("id", line),
            &QuantityPatch { quantity },
            Auth::User(session),
        )
        .await
    }

    async fn remove_item(&self, session: &Session, line: &CartLineId) -> Result<(), RemoteError> {
        self.delete_rows(
            "cart_items",
            &QuerySpec::new().eq("id", line),
            Auth::User(session),
        )
        .await
    }

    async fn clear(&self, session: &Session) -> Result<(), RemoteError> {
        self.delete_rows(
            "cart_items",
            &QuerySpec::new().eq("user_id", session.user),
            Auth::User(session),
        )
        .await
    }
}

#[async_trait]
impl FavoritesRemote for RemoteGateway {
    async fn fetch_favorites(&self, session: &Session) -> Result<Vec<Product>, RemoteError> {
        let query = QuerySpec::new()
            .select(FAVORITES_SELECT)
            .eq("user_id", session.user);
        let rows: Vec<FavoriteRow> = self
            .get_rows("favorites", &query, Auth::User(session))
            .await?;
        Ok(rows.into_iter().map(|row| row.product.into()).collect())
    }

    async fn add_favorite(&self, session: &Session, product: ProductId) -> Result<(), RemoteError> {
        let body = FavoriteInsert {
            user_id: session.user.as_uuid(),
            product_id: product.as_i64(),
        };
        let _created: CreatedRow = self
            .insert_one("favorites", &body, Auth::User(session))
            .await?;
        Ok(())
    }

    async fn remove_favorite(
        &self,
        session: &Session,
        product: ProductId,
    ) -> Result<(), RemoteError> {
        self.delete_rows(
            "favorites",
            &QuerySpec::new()
                .eq("user_id", session.user)
                .eq("product_id", product),
            Auth::User(session),
        )
        .await
    }

    async fn clear_favorites(&self, session: &Session) -> Result<(), RemoteError> {
        self.delete_rows(
            "favorites",
            &QuerySpec::new().eq("user_id", session.user),
            Auth::User(session),
        )
        .await
    }
}
