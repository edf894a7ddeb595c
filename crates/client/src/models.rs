//! Domain types for the Souq storefront.
//!
//! These types provide a clean, ergonomic API separate from the raw wire
//! rows returned by the hosted backend (see `gateway::rows`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use souq_core::{
    AccountTier, AddressId, BannerId, CartLineId, CategoryId, LocalizedText, OrderId, PriceView,
    ProductId, UserId,
};

// =============================================================================
// Catalog Types
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Localized product name.
    pub name: LocalizedText,
    /// Localized product description.
    pub description: LocalizedText,
    /// Retail price.
    pub price: Decimal,
    /// Pre-discount price, when the product is on sale.
    pub original_price: Option<Decimal>,
    /// Wholesale price, shown to wholesale-tier accounts.
    pub wholesale_price: Option<Decimal>,
    /// Whether the product is currently purchasable.
    pub in_stock: bool,
    /// Units on hand.
    pub stock_quantity: i64,
    /// Average review rating.
    pub rating: f64,
    /// Number of reviews behind the rating.
    pub review_count: i64,
    /// Advertised discount percentage, if any.
    pub discount_percent: Option<i64>,
    /// Whether the product is featured on the home screen.
    pub featured: bool,
    /// Whether the product is visible to customers.
    pub active: bool,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Primary image URL.
    pub image: String,
    /// Additional image URLs.
    pub images: Vec<String>,
    /// Owning category, if assigned.
    pub category: Option<CategoryId>,
}

impl Product {
    /// Resolve the price this viewer sees.
    ///
    /// Wholesale accounts get the wholesale price where one is set; everyone
    /// else gets the retail price, with the original price kept for
    /// strike-through display when discounted.
    #[must_use]
    pub fn price_for(&self, tier: AccountTier) -> PriceView {
        PriceView::for_tier(tier, self.price, self.original_price, self.wholesale_price)
    }
}

/// A product category.
///
/// `product_count` is derived at fetch time by counting active products that
/// reference the category; the backend never stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Localized category name.
    pub name: LocalizedText,
    /// Category image URL.
    pub image: String,
    /// Icon identifier used by the presentation layer.
    pub icon: String,
    /// Number of active products in this category (derived, see above).
    pub product_count: usize,
}

/// A promotional banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    /// Banner ID.
    pub id: BannerId,
    /// Localized banner title.
    pub title: LocalizedText,
    /// Localized banner subtitle.
    pub subtitle: LocalizedText,
    /// Banner image URL.
    pub image: String,
    /// Optional navigation target.
    pub link: Option<String>,
    /// Whether the banner is visible.
    pub active: bool,
    /// Ascending display order.
    pub sort_order: i64,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A single line in a cart.
///
/// Carries a full product snapshot so the cart renders without further
/// catalog lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line ID (synthetic when anonymous, server-assigned once logged in).
    pub id: CartLineId,
    /// The product in this line.
    pub product: Product,
    /// Quantity, always positive.
    pub quantity: u32,
}

impl CartItem {
    /// Line total for this viewer's tier.
    #[must_use]
    pub fn line_total(&self, tier: AccountTier) -> Decimal {
        self.product.price_for(tier).amount * Decimal::from(self.quantity)
    }
}

// =============================================================================
// Account Types
// =============================================================================

/// A delivery address owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Address ID.
    pub id: AddressId,
    /// Owning user.
    pub user: UserId,
    /// Recipient full name.
    pub full_name: String,
    /// Contact phone number.
    pub phone: String,
    /// City.
    pub city: String,
    /// Area or district.
    pub area: String,
    /// Street.
    pub street: String,
    /// Building name or number.
    pub building: String,
    /// Floor, where relevant.
    pub floor: Option<String>,
    /// Apartment, where relevant.
    pub apartment: Option<String>,
    /// Whether this is the user's default address.
    pub is_default: bool,
}

/// Fields for creating or editing an address, before a server ID exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDraft {
    /// Recipient full name.
    pub full_name: String,
    /// Contact phone number.
    pub phone: String,
    /// City.
    pub city: String,
    /// Area or district.
    pub area: String,
    /// Street.
    pub street: String,
    /// Building name or number.
    pub building: String,
    /// Floor, where relevant.
    pub floor: Option<String>,
    /// Apartment, where relevant.
    pub apartment: Option<String>,
    /// Whether this should become the user's default address.
    pub is_default: bool,
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, awaiting confirmation.
    Pending,
    /// Confirmed by the store.
    Confirmed,
    /// Handed to the courier.
    Shipped,
    /// Delivered to the customer.
    Delivered,
    /// Cancelled before delivery.
    Cancelled,
}

/// A line captured on an order at checkout time.
///
/// Snapshots name and unit price so later catalog edits don't rewrite order
/// history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The ordered product.
    pub product: ProductId,
    /// Product name at checkout.
    pub name: LocalizedText,
    /// Unit price charged.
    pub unit_price: Decimal,
    /// Quantity ordered.
    pub quantity: u32,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Ordering user.
    pub user: UserId,
    /// Ordered lines.
    pub lines: Vec<OrderLine>,
    /// Delivery address chosen at checkout.
    pub address: AddressId,
    /// Order total as charged.
    pub total: Decimal,
    /// Current status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// Store contact details shown on the contact screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactInfo {
    /// Store phone number.
    pub phone: Option<String>,
    /// Store email.
    pub email: Option<String>,
    /// WhatsApp number.
    pub whatsapp: Option<String>,
    /// Facebook page URL.
    pub facebook: Option<String>,
    /// Instagram profile URL.
    pub instagram: Option<String>,
}

/// An authenticated session issued by the hosted auth service.
///
/// `SecretString` keeps the bearer token out of `Debug` output.
#[derive(Debug, Clone)]
pub struct Session {
    /// The signed-in user.
    pub user: UserId,
    /// Bearer token sent with user-scoped requests.
    pub access_token: SecretString,
    /// Pricing tier of the account.
    pub tier: AccountTier,
}
