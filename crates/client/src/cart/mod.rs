//! Cart state engine.
//!
//! The cart is a reducer-based state machine: a tagged [`CartAction`] is
//! applied by the pure [`reduce`] function, and side effects (local
//! persistence or remote writes) happen afterwards in [`CartStore`], never
//! inside the transition itself.
//!
//! Invariants enforced by the reducer:
//! - at most one line per distinct product; adding an already-present
//!   product increments its quantity
//! - setting a quantity to zero or below removes the line
//! - `Clear` empties unconditionally; `Load` replaces atomically

mod store;

pub use store::{CartBackend, CartRemote, CartStore};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use souq_core::{AccountTier, CartLineId, ProductId};

use crate::models::{CartItem, Product};

/// An action dispatched against the cart.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// Add `quantity` units of a product, merging into an existing line.
    Add { product: Product, quantity: u32 },
    /// Remove the line for a product, if present.
    Remove(ProductId),
    /// Set a line's quantity; zero or negative is equivalent to `Remove`.
    SetQuantity { product: ProductId, quantity: i64 },
    /// Empty the cart unconditionally.
    Clear,
    /// Replace the whole collection (hydration from persistence or remote).
    Load(Vec<CartItem>),
}

/// The cart collection.
///
/// Owned by a [`CartStore`]; consumers read snapshots and never mutate lines
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    items: Vec<CartItem>,
}

impl CartState {
    /// The lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Cart subtotal for a viewer tier, resolved at read time.
    #[must_use]
    pub fn subtotal(&self, tier: AccountTier) -> Decimal {
        self.items.iter().map(|item| item.line_total(tier)).sum()
    }

    /// The line holding `product`, if any.
    #[must_use]
    pub fn line_for(&self, product: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product)
    }

    /// Re-key the line for `product` with a server-assigned ID.
    ///
    /// Backend bookkeeping used after an authenticated insert; not part of
    /// the action set.
    pub(crate) fn rekey_line(&mut self, product: ProductId, id: CartLineId) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product)
        {
            item.id = id;
        }
    }
}

/// Apply an action to the cart, returning the next state.
///
/// Pure: no I/O, no clock reads. `now_ms` keys synthetic line IDs for newly
/// added lines and is supplied by the caller.
#[must_use]
pub fn reduce(state: &CartState, action: CartAction, now_ms: i64) -> CartState {
    let mut next = state.clone();
    match action {
        CartAction::Add { product, quantity } => {
            if quantity == 0 {
                return next;
            }
            if let Some(item) = next
                .items
                .iter_mut()
                .find(|item| item.product.id == product.id)
            {
                item.quantity = item.quantity.saturating_add(quantity);
            } else {
                next.items.push(CartItem {
                    id: CartLineId::synthetic(product.id, now_ms),
                    product,
                    quantity,
                });
            }
        }
        CartAction::Remove(product) => {
            next.items.retain(|item| item.product.id != product);
        }
        CartAction::SetQuantity { product, quantity } => {
            if quantity <= 0 {
                next.items.retain(|item| item.product.id != product);
            } else if let Some(item) = next
                .items
                .iter_mut()
                .find(|item| item.product.id == product)
            {
                item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
        }
        CartAction::Clear => next.items.clear(),
        CartAction::Load(items) => next.items = items,
    }
    next
}
